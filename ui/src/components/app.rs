use dioxus::prelude::*;
use futures::StreamExt;

#[cfg(feature = "offline")]
use kitshop_common::identity::TelegramId;
use kitshop_common::state::{BackOutcome, Panel, ShopState};

use super::cart_view::CartView;
use super::favorites_view::FavoritesView;
use super::filter_panel::FilterPanel;
use super::header::{FloatingButtons, Header};
use super::my_orders::MyOrders;
use super::order_form::OrderForm;
use super::product_grid::ProductGrid;
use super::product_modal::ProductModal;
use super::shop_api::{use_shop_action, use_shop_coroutine, ShopAction};
use super::shop_state::{use_host_info, use_shop_state};
use super::telegram::{self, HostInfo};

/// Identity used by the offline demo when the page is opened outside Telegram.
#[cfg(feature = "offline")]
const DEMO_SHOPPER: TelegramId = TelegramId(1);

fn initial_state(host: &HostInfo) -> ShopState {
    let mut state = ShopState::new();
    state.identity = telegram::resolve(host);
    #[cfg(feature = "offline")]
    {
        state.identity = state.identity.or(Some(DEMO_SHOPPER));
    }
    state
}

#[component]
pub fn App() -> Element {
    let host = use_hook(telegram::init);
    use_context_provider(|| Signal::new(initial_state(&host)));
    use_context_provider(|| Signal::new(host.clone()));
    use_shop_coroutine();
    use_back_button();

    rsx! { Storefront {} }
}

/// Close whatever is on top; with nothing left, leave the app.
pub fn go_back(mut state: Signal<ShopState>) {
    if state.write().back() == BackOutcome::ExitApp {
        telegram::close();
    }
}

/// Wire the host back button to [`go_back`] and keep its visibility in
/// step with the state.
fn use_back_button() {
    let state = use_shop_state();

    use_future(move || async move {
        let (tx, mut presses) = futures::channel::mpsc::unbounded::<()>();
        telegram::on_back_button(move || {
            let _ = tx.unbounded_send(());
        });
        while presses.next().await.is_some() {
            go_back(state);
        }
    });

    use_effect(move || telegram::set_back_button(state.read().can_go_back()));
}

#[component]
fn Storefront() -> Element {
    let state = use_shop_state();
    let host = use_host_info();
    let inset = host.read().safe_area_top;

    let s = state.read();
    let panel = s.panel;
    let selected = s.selected().cloned();
    drop(s);

    rsx! {
        div { class: "kitshop-app", style: "padding-top: {inset}px;",
            Header {}
            StatusBanner {}
            main { ProductGrid {} }
            FloatingButtons {}
            {match panel {
                Panel::Filters => rsx! { FilterPanel {} },
                Panel::Cart => rsx! { CartView {} },
                Panel::Checkout => rsx! { OrderForm {} },
                Panel::Favorites => rsx! { FavoritesView {} },
                Panel::Orders => rsx! { MyOrders {} },
                Panel::None => rsx! {},
            }}
            if let Some(product) = selected {
                ProductModal { key: "{product.id}", product }
            }
        }
    }
}

/// Last error (with retry for a failed catalog load) and the last notice.
#[component]
fn StatusBanner() -> Element {
    let mut state = use_shop_state();
    let shop = use_shop_action();

    let s = state.read();
    let error = s.last_error.clone();
    let notice = s.notice.clone();
    let catalog_missing = s.catalog.is_empty() && !s.catalog_loading;
    drop(s);

    rsx! {
        if let Some(message) = error {
            div { class: "banner banner-error",
                span { "{message}" }
                if catalog_missing {
                    button {
                        onclick: move |_| {
                            state.write().dismiss_error();
                            shop.send(ShopAction::Bootstrap);
                        },
                        "Retry"
                    }
                }
                button {
                    class: "banner-close",
                    onclick: move |_| state.write().dismiss_error(),
                    "×"
                }
            }
        }
        if let Some(message) = notice {
            div { class: "banner banner-notice",
                span { "{message}" }
                button {
                    class: "banner-close",
                    onclick: move |_| state.write().dismiss_notice(),
                    "×"
                }
            }
        }
    }
}
