use dioxus::prelude::*;

use kitshop_common::currency::format_price;
use kitshop_common::product::Product;

use super::shop_api::{request_favorite_toggle, use_shop_action, ShopAction};
use super::shop_state::use_shop_state;

#[component]
pub fn ProductGrid() -> Element {
    let mut state = use_shop_state();

    let s = state.read();
    let loading = s.catalog_loading;
    let filtered = !s.filters.is_empty() || !s.search.is_empty();
    let products = s.visible_products();
    drop(s);

    if loading {
        return rsx! { p { class: "loading", "Loading kits..." } };
    }
    if products.is_empty() {
        return rsx! {
            div { class: "empty-state",
                p { "No kits match your search." }
                if filtered {
                    button {
                        onclick: move |_| {
                            let mut s = state.write();
                            s.reset_filters();
                            s.set_search("");
                        },
                        "Reset filters"
                    }
                }
            }
        };
    }

    rsx! {
        div { class: "product-grid",
            for product in products {
                ProductCard { key: "{product.id}", product }
            }
        }
    }
}

#[component]
pub fn ProductCard(product: Product) -> Element {
    let mut state = use_shop_state();
    let shop = use_shop_action();

    let id = product.id;
    let s = state.read();
    let favorite = s.is_favorite(id);
    let favorite_pending = s.favorite_pending(id);
    drop(s);

    let image = product.primary_image().map(|i| i.url().to_string());
    let price = format_price(product.price);
    let sizes = product.sizes.to_string();
    let available = product.is_available;

    rsx! {
        div { class: "product-card",
            onclick: move |_| state.write().select_product(id),
            div { class: "product-image",
                if let Some(src) = image {
                    img { src: "{src}", alt: "{product.name}", loading: "lazy" }
                } else {
                    div { class: "image-placeholder" }
                }
                div { class: "badges",
                    for badge in product.badges.iter().take(2) {
                        span { class: "badge badge-{badge.kind}", "{badge.value}" }
                    }
                }
                button {
                    class: if favorite { "favorite-button active" } else { "favorite-button" },
                    disabled: favorite_pending,
                    onclick: move |evt| {
                        evt.stop_propagation();
                        request_favorite_toggle(state, shop, id);
                    },
                    if favorite { "♥" } else { "♡" }
                }
            }
            h3 { class: "product-name", "{product.name}" }
            p { class: "product-meta", "{product.manufacturer} · {sizes}" }
            div { class: "product-footer",
                span { class: "price", "{price}" }
                if available {
                    button {
                        class: "add-to-cart",
                        onclick: move |evt| {
                            evt.stop_propagation();
                            shop.send(ShopAction::AddToCart {
                                product: id,
                                size: String::new(),
                                quantity: 1,
                            });
                        },
                        "To cart"
                    }
                } else {
                    span { class: "sold-out", "Sold out" }
                }
            }
        }
    }
}
