use dioxus::prelude::*;

use kitshop_common::state::Panel;

use super::app::go_back;
use super::shop_state::use_shop_state;

#[component]
pub fn Header() -> Element {
    let mut state = use_shop_state();
    // Raw text as typed; the state keeps the normalised query.
    let mut search_input = use_signal(String::new);

    let s = state.read();
    let found = s.visible_products().len();
    let total = s.catalog.len();
    let active_filters = s.filters.active_count();
    let can_go_back = s.can_go_back();
    drop(s);

    rsx! {
        header { class: "app-header",
            div { class: "header-top",
                if can_go_back {
                    button {
                        class: "back-button",
                        onclick: move |_| go_back(state),
                        "‹"
                    }
                }
                h1 { "Kit Shop" }
            }
            div { class: "search-row",
                input {
                    r#type: "search",
                    class: "search-input",
                    placeholder: "Search team, brand or league...",
                    value: "{search_input}",
                    oninput: move |evt| {
                        let text = evt.value();
                        state.write().set_search(text.clone());
                        search_input.set(text);
                    },
                }
                button {
                    class: "filter-button",
                    onclick: move |_| state.write().open_panel(Panel::Filters),
                    "Filters"
                    if active_filters > 0 {
                        span { class: "count-badge", "{active_filters}" }
                    }
                }
            }
            p { class: "result-count", "Showing {found} of {total} kits" }
        }
    }
}

/// Title bar shared by the overlay panels.
#[component]
pub fn PanelHeader(title: String) -> Element {
    let mut state = use_shop_state();
    rsx! {
        div { class: "panel-header",
            h2 { "{title}" }
            button {
                class: "panel-close",
                onclick: move |_| state.write().close_panel(),
                "×"
            }
        }
    }
}

/// Cart, favorites and orders shortcuts pinned to the bottom of the screen.
#[component]
pub fn FloatingButtons() -> Element {
    let mut state = use_shop_state();
    let s = state.read();
    let cart_count = s.cart_count();
    let favorites_count = s.favorites_count();
    drop(s);

    rsx! {
        div { class: "floating-buttons",
            button {
                class: "floating-button",
                onclick: move |_| state.write().open_panel(Panel::Favorites),
                "♥"
                if favorites_count > 0 {
                    span { class: "count-badge", "{favorites_count}" }
                }
            }
            button {
                class: "floating-button",
                onclick: move |_| state.write().open_panel(Panel::Orders),
                "Orders"
            }
            button {
                class: "floating-button floating-cart",
                onclick: move |_| state.write().open_panel(Panel::Cart),
                "Cart"
                if cart_count > 0 {
                    span { class: "count-badge", "{cart_count}" }
                }
            }
        }
    }
}
