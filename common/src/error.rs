use crate::product::ProductId;

/// Everything that can stop a storefront action.
///
/// Errors end the action that triggered them; nothing is retried and the
/// cached state stays as it was before the action.
#[derive(Debug, thiserror::Error)]
pub enum ShopError {
    #[error("no Telegram user identity available")]
    MissingIdentity,

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[cfg(feature = "http")]
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid checkout details: {0}")]
    InvalidCheckout(String),

    #[error("the cart is empty")]
    EmptyCart,

    #[error("favorite toggle already in flight for product {0}")]
    ToggleInFlight(ProductId),

    #[error("not found: {0}")]
    NotFound(String),
}

impl ShopError {
    /// Text shown to the user in the error banner.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingIdentity => {
                "Open the shop from Telegram to use the cart, favorites and orders.".into()
            }
            Self::Http { status, message } if message.is_empty() => {
                format!("The shop server answered with an error ({status}).")
            }
            Self::Http { message, .. } => message.clone(),
            #[cfg(feature = "http")]
            Self::Transport(_) => "Could not reach the shop server. Try again.".into(),
            Self::Json(_) => "The shop server sent an unexpected response.".into(),
            Self::InvalidCheckout(reason) => reason.clone(),
            Self::EmptyCart => "Your cart is empty.".into(),
            Self::ToggleInFlight(_) => "Still saving your previous change.".into(),
            Self::NotFound(what) => format!("{what} was not found."),
        }
    }
}

pub type Result<T> = std::result::Result<T, ShopError>;
