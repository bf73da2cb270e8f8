use std::time::Duration;

/// Backend used while developing (page served from localhost).
pub const DEVELOPMENT_API_URL: &str = "http://45.153.191.250:8001";

/// Backend used by the published Mini App.
pub const PRODUCTION_API_URL: &str = "https://rooneyform.ru:8000";

/// Path prefix of every REST endpoint.
pub const API_PREFIX: &str = "/api";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Where the REST backend lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Scheme + host (+ port), without the `/api` prefix or a trailing slash.
    pub base_url: String,
    /// Request timeout for native builds; browsers apply their own.
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Pick the backend for the host the page was served from.
    ///
    /// A compile-time `KITSHOP_API_URL` overrides everything. Otherwise
    /// local hosts talk to the development backend and anything else to
    /// production.
    pub fn for_host(hostname: &str) -> Self {
        if let Some(url) = option_env!("KITSHOP_API_URL").filter(|u| !u.is_empty()) {
            return Self::new(url);
        }
        Self::new(Self::default_url_for_host(hostname))
    }

    fn default_url_for_host(hostname: &str) -> &'static str {
        match hostname.trim() {
            "" | "localhost" | "127.0.0.1" | "[::1]" => DEVELOPMENT_API_URL,
            _ => PRODUCTION_API_URL,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Absolute URL for an endpoint path such as `/cart/`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{API_PREFIX}{path}", self.base_url)
    }
}
