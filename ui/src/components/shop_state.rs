use dioxus::prelude::*;

use kitshop_common::state::ShopState;

use super::telegram::HostInfo;

/// The storefront state shared by every component.
pub fn use_shop_state() -> Signal<ShopState> {
    use_context::<Signal<ShopState>>()
}

/// Host facts captured once at startup.
pub fn use_host_info() -> Signal<HostInfo> {
    use_context::<Signal<HostInfo>>()
}
