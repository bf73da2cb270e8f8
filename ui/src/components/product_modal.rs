use dioxus::prelude::*;

use kitshop_common::currency::format_price;
use kitshop_common::product::Product;

use super::shop_api::{request_favorite_toggle, use_shop_action, ShopAction};
use super::shop_state::use_shop_state;

/// Full product view: image carousel, size picker, cart and favorite.
#[component]
pub fn ProductModal(product: Product) -> Element {
    let mut state = use_shop_state();
    let shop = use_shop_action();
    let mut image_index = use_signal(|| 0usize);
    let default_size = product.default_size().to_string();
    let mut size = use_signal(move || default_size);

    let id = product.id;
    let s = state.read();
    let favorite = s.is_favorite(id);
    let favorite_pending = s.favorite_pending(id);
    let busy = s.busy;
    drop(s);

    let image_count = product.images.len();
    let index = *image_index.read() % image_count.max(1);
    let image = product.images.get(index).map(|i| i.url().to_string());
    let price = format_price(product.price);
    let sizes: Vec<String> = product.sizes.iter().map(str::to_string).collect();
    let chosen = size.read().clone();

    rsx! {
        div { class: "modal-backdrop",
            onclick: move |_| state.write().close_product(),
            div { class: "modal product-modal",
                onclick: move |evt| evt.stop_propagation(),
                button {
                    class: "modal-close",
                    onclick: move |_| state.write().close_product(),
                    "×"
                }
                div { class: "carousel",
                    if let Some(src) = image {
                        img { src: "{src}", alt: "{product.name}" }
                    } else {
                        div { class: "image-placeholder" }
                    }
                    if image_count > 1 {
                        button {
                            class: "carousel-prev",
                            onclick: move |_| image_index.set((index + image_count - 1) % image_count),
                            "‹"
                        }
                        button {
                            class: "carousel-next",
                            onclick: move |_| image_index.set((index + 1) % image_count),
                            "›"
                        }
                        span { class: "carousel-position", "{index + 1} / {image_count}" }
                    }
                }
                h2 { "{product.name}" }
                div { class: "badges",
                    for badge in product.badges.iter() {
                        span { class: "badge badge-{badge.kind}", "{badge.value}" }
                    }
                }
                dl { class: "product-details",
                    dt { "Team" } dd { "{product.team}" }
                    dt { "Brand" } dd { "{product.manufacturer}" }
                    dt { "League" } dd { "{product.league}" }
                    dt { "Season" } dd { "{product.season}" }
                    dt { "Type" } dd { "{product.kit_type}" }
                    dt { "Condition" } dd { "{product.condition}" }
                }
                if !product.description.is_empty() {
                    p { class: "product-description", "{product.description}" }
                }
                div { class: "size-picker",
                    for value in sizes {
                        button {
                            key: "{value}",
                            class: if value == chosen { "size-option selected" } else { "size-option" },
                            onclick: {
                                let value = value.clone();
                                move |_| size.set(value.clone())
                            },
                            "{value}"
                        }
                    }
                }
                p { class: "price", "{price}" }
                div { class: "modal-actions",
                    button {
                        class: if favorite { "favorite-button active" } else { "favorite-button" },
                        disabled: favorite_pending,
                        onclick: move |_| request_favorite_toggle(state, shop, id),
                        if favorite { "♥ In favorites" } else { "♡ Add to favorites" }
                    }
                    if product.is_available {
                        button {
                            class: "primary",
                            disabled: busy,
                            onclick: move |_| {
                                shop.send(ShopAction::AddToCart {
                                    product: id,
                                    size: size.read().clone(),
                                    quantity: 1,
                                });
                            },
                            "Add to cart"
                        }
                    } else {
                        span { class: "sold-out", "Sold out" }
                    }
                }
            }
        }
    }
}
