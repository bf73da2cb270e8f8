use dioxus::prelude::*;

use kitshop_common::currency::format_price;
use kitshop_common::error::ShopError;

use super::header::PanelHeader;
use super::shop_api::{use_shop_action, ShopAction};
use super::shop_state::use_shop_state;

#[component]
pub fn FavoritesView() -> Element {
    let mut state = use_shop_state();
    let shop = use_shop_action();

    let s = state.read();
    let favorites = s.favorites.clone();
    let busy = s.busy;
    let signed_in = s.identity.is_some();
    drop(s);
    let sign_in_hint = ShopError::MissingIdentity.user_message();

    rsx! {
        div { class: "panel favorites-panel",
            PanelHeader { title: "Favorites" }
            if !signed_in {
                p { class: "empty-state", "{sign_in_hint}" }
            } else if favorites.is_empty() {
                p { class: "empty-state", "Tap ♡ on a kit to keep it here." }
            } else {
                for favorite in favorites {
                    div { class: "favorite-row", key: "{favorite.id}",
                        onclick: move |_| state.write().select_product(favorite.product.id),
                        if let Some(image) = favorite.product.primary_image() {
                            img { class: "thumb", src: "{image.url()}", alt: "{favorite.product.name}" }
                        }
                        div { class: "favorite-info",
                            p { class: "product-name", "{favorite.product.name}" }
                            p { class: "price", "{format_price(favorite.product.price)}" }
                        }
                        if favorite.product.is_available {
                            button {
                                disabled: busy,
                                onclick: move |evt| {
                                    evt.stop_propagation();
                                    shop.send(ShopAction::AddToCart {
                                        product: favorite.product.id,
                                        size: String::new(),
                                        quantity: 1,
                                    });
                                },
                                "To cart"
                            }
                        }
                        button {
                            class: "remove-line",
                            disabled: busy,
                            onclick: move |evt| {
                                evt.stop_propagation();
                                shop.send(ShopAction::RemoveFavorite(favorite.product.id));
                            },
                            "Remove"
                        }
                    }
                }
            }
        }
    }
}
