//! Bridge to the Telegram Mini App host (`window.Telegram.WebApp`).
//!
//! Outside Telegram, and in non-wasm builds, every call is inert: no host
//! user, no back button, zero inset. The shop then runs in degraded mode
//! with only the cached identity (if any).

use kitshop_common::identity::{HostUser, TelegramId};

/// localStorage key holding the last known Telegram id.
pub const IDENTITY_KEY: &str = "kitshop.telegram_id";

/// What the host told us at startup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostInfo {
    pub in_telegram: bool,
    pub user: Option<HostUser>,
    /// Pixels the host chrome overlaps at the top of the viewport.
    pub safe_area_top: u32,
    pub hostname: String,
}

#[cfg(target_family = "wasm")]
mod wasm_impl {
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::{JsCast, JsValue};

    use kitshop_common::identity::{HostUser, IdentityCache, TelegramId};

    use super::{HostInfo, IDENTITY_KEY};

    fn get(target: &JsValue, key: &str) -> Option<JsValue> {
        js_sys::Reflect::get(target, &JsValue::from_str(key))
            .ok()
            .filter(|v| !v.is_undefined() && !v.is_null())
    }

    fn web_app() -> Option<JsValue> {
        let window = web_sys::window()?;
        let telegram = get(&window, "Telegram")?;
        get(&telegram, "WebApp")
    }

    fn call(target: &JsValue, method: &str, args: &[JsValue]) {
        let Some(func) = get(target, method).and_then(|f| f.dyn_into::<js_sys::Function>().ok()) else {
            return;
        };
        let args: js_sys::Array = args.iter().collect();
        if let Err(e) = func.apply(target, &args) {
            tracing::warn!("Telegram.WebApp.{method} failed: {e:?}");
        }
    }

    fn host_user(app: &JsValue) -> Option<HostUser> {
        let user = get(app, "initDataUnsafe").and_then(|d| get(&d, "user"))?;
        match serde_wasm_bindgen::from_value::<HostUser>(user) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!("unreadable Telegram user: {e}");
                None
            }
        }
    }

    fn number(app: &JsValue, key: &str) -> f64 {
        get(app, key).and_then(|v| v.as_f64()).unwrap_or(0.0)
    }

    pub fn init() -> HostInfo {
        let hostname = web_sys::window()
            .and_then(|w| w.location().hostname().ok())
            .unwrap_or_default();
        let Some(app) = web_app() else {
            return HostInfo {
                hostname,
                ..HostInfo::default()
            };
        };
        call(&app, "ready", &[]);
        call(&app, "expand", &[]);
        lock_page_scroll();

        let inset = number(&app, "viewportHeight") - number(&app, "viewportStableHeight");
        HostInfo {
            in_telegram: true,
            user: host_user(&app),
            safe_area_top: inset.max(0.0).round() as u32,
            hostname,
        }
    }

    /// Keep swipes inside the app from dragging the host sheet around.
    fn lock_page_scroll() {
        let Some(body) = web_sys::window().and_then(|w| w.document()).and_then(|d| d.body()) else {
            return;
        };
        let style = body.style();
        for (property, value) in [("overflow", "hidden"), ("position", "fixed"), ("width", "100%"), ("height", "100%")] {
            if let Err(e) = style.set_property(property, value) {
                tracing::debug!("body style {property}: {e:?}");
            }
        }
    }

    pub fn set_back_button(visible: bool) {
        let Some(button) = web_app().and_then(|app| get(&app, "BackButton")) else {
            return;
        };
        call(&button, if visible { "show" } else { "hide" }, &[]);
    }

    /// Register `handler` for host back presses. Lives for the page lifetime.
    pub fn on_back_button(handler: impl FnMut() + 'static) {
        let Some(button) = web_app().and_then(|app| get(&app, "BackButton")) else {
            return;
        };
        let closure = Closure::<dyn FnMut()>::new(handler);
        call(&button, "onClick", &[closure.as_ref().clone()]);
        closure.forget();
    }

    pub fn close() {
        if let Some(app) = web_app() {
            call(&app, "close", &[]);
        }
    }

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }

    /// Identity slot in the browser's localStorage.
    #[derive(Debug, Default)]
    pub struct StoredIdentity;

    impl IdentityCache for StoredIdentity {
        fn load(&self) -> Option<TelegramId> {
            let raw = storage()?.get_item(IDENTITY_KEY).ok().flatten()?;
            raw.parse().ok()
        }

        fn store(&mut self, id: TelegramId) {
            let Some(storage) = storage() else {
                return;
            };
            if let Err(e) = storage.set_item(IDENTITY_KEY, &id.to_string()) {
                tracing::warn!("could not persist identity: {e:?}");
            }
        }
    }
}

#[cfg(not(target_family = "wasm"))]
mod native_impl {
    use kitshop_common::identity::MemoryIdentityCache;

    use super::HostInfo;

    pub fn init() -> HostInfo {
        HostInfo::default()
    }

    pub fn set_back_button(_visible: bool) {}

    pub fn on_back_button(_handler: impl FnMut() + 'static) {}

    pub fn close() {
        tracing::debug!("close requested outside Telegram");
    }

    pub type StoredIdentity = MemoryIdentityCache;
}

#[cfg(target_family = "wasm")]
pub use wasm_impl::{close, init, on_back_button, set_back_button, StoredIdentity};

#[cfg(not(target_family = "wasm"))]
pub use native_impl::{close, init, on_back_button, set_back_button, StoredIdentity};

/// Host identity (remembered) or the one remembered from an earlier visit.
pub fn resolve(host: &HostInfo) -> Option<TelegramId> {
    let mut cache = StoredIdentity::default();
    let id = kitshop_common::identity::resolve_identity(host.user.as_ref().map(|u| u.id), &mut cache);
    if id.is_none() {
        tracing::info!("no Telegram identity; cart, favorites and orders are unavailable");
    }
    id
}
