use dioxus::prelude::*;

use kitshop_common::currency::format_price;
use kitshop_common::error::ShopError;
use kitshop_common::state::Panel;

use super::header::PanelHeader;
use super::shop_api::{use_shop_action, ShopAction};
use super::shop_state::use_shop_state;

#[component]
pub fn CartView() -> Element {
    let mut state = use_shop_state();
    let shop = use_shop_action();

    let s = state.read();
    let lines = s.cart.clone();
    let total = format_price(s.cart_total());
    let units = s.cart_count();
    let busy = s.busy;
    let signed_in = s.identity.is_some();
    drop(s);
    let sign_in_hint = ShopError::MissingIdentity.user_message();

    if !signed_in {
        return rsx! {
            div { class: "panel cart-panel",
                PanelHeader { title: "Cart" }
                p { class: "empty-state", "{sign_in_hint}" }
            }
        };
    }

    rsx! {
        div { class: "panel cart-panel",
            PanelHeader { title: "Cart" }
            if lines.is_empty() {
                p { class: "empty-state", "Your cart is empty." }
            } else {
                div { class: "cart-lines",
                    for line in lines {
                        div { class: "cart-line", key: "{line.id}",
                            if let Some(image) = line.product.primary_image() {
                                img { class: "thumb", src: "{image.url()}", alt: "{line.product.name}" }
                            }
                            div { class: "cart-line-info",
                                p { class: "product-name", "{line.product.name}" }
                                p { class: "product-meta", "Size {line.selected_size}" }
                                p { class: "price", "{format_price(line.line_total())}" }
                            }
                            div { class: "quantity-stepper",
                                button {
                                    disabled: busy || line.quantity <= 1,
                                    onclick: move |_| shop.send(ShopAction::UpdateQuantity {
                                        item: line.id,
                                        quantity: i64::from(line.quantity) - 1,
                                    }),
                                    "−"
                                }
                                span { "{line.quantity}" }
                                button {
                                    disabled: busy,
                                    onclick: move |_| shop.send(ShopAction::UpdateQuantity {
                                        item: line.id,
                                        quantity: i64::from(line.quantity) + 1,
                                    }),
                                    "+"
                                }
                            }
                            button {
                                class: "remove-line",
                                disabled: busy,
                                onclick: move |_| shop.send(ShopAction::RemoveFromCart(line.id)),
                                "Remove"
                            }
                        }
                    }
                }
                div { class: "cart-summary",
                    p { "{units} items" }
                    p { class: "cart-total", "Total: {total}" }
                }
                div { class: "panel-actions",
                    button {
                        class: "secondary",
                        disabled: busy,
                        onclick: move |_| shop.send(ShopAction::ClearCart),
                        "Clear cart"
                    }
                    button {
                        class: "primary",
                        disabled: busy,
                        onclick: move |_| state.write().open_panel(Panel::Checkout),
                        "Checkout"
                    }
                }
            }
        }
    }
}
