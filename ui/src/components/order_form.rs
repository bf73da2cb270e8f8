use dioxus::prelude::*;

use kitshop_common::currency::format_price;
use kitshop_common::order::ShippingDetails;
use kitshop_common::state::Panel;

use super::header::PanelHeader;
use super::shop_api::{use_shop_action, ShopAction};
use super::shop_state::use_shop_state;

/// Checkout: delivery details for the server-side cart.
#[component]
pub fn OrderForm() -> Element {
    let mut state = use_shop_state();
    let shop = use_shop_action();
    let mut address = use_signal(String::new);
    let mut phone = use_signal(String::new);
    let mut notes = use_signal(String::new);
    let mut form_error = use_signal(|| None::<String>);

    let s = state.read();
    let total = format_price(s.cart_total());
    let units = s.cart_count();
    let busy = s.busy;
    drop(s);

    let submit = move |_| {
        let details = ShippingDetails {
            shipping_address: address.read().clone(),
            phone_number: phone.read().clone(),
            notes: notes.read().clone(),
        };
        match details.validate() {
            Ok(()) => {
                form_error.set(None);
                shop.send(ShopAction::PlaceOrder(details));
            }
            Err(reason) => form_error.set(Some(reason)),
        }
    };

    rsx! {
        div { class: "panel order-form",
            PanelHeader { title: "Checkout" }
            p { class: "order-summary", "{units} items, {total}" }
            div { class: "form-group",
                label { "Delivery address" }
                textarea {
                    placeholder: "City, street, building, apartment",
                    value: "{address}",
                    oninput: move |evt| address.set(evt.value()),
                }
            }
            div { class: "form-group",
                label { "Phone" }
                input {
                    r#type: "tel",
                    placeholder: "+7 900 000-00-00",
                    value: "{phone}",
                    oninput: move |evt| phone.set(evt.value()),
                }
            }
            div { class: "form-group",
                label { "Notes" }
                textarea {
                    placeholder: "Anything the courier should know",
                    value: "{notes}",
                    oninput: move |evt| notes.set(evt.value()),
                }
            }
            if let Some(err) = form_error.read().as_ref() {
                span { class: "field-error", "{err}" }
            }
            div { class: "panel-actions",
                button {
                    class: "secondary",
                    onclick: move |_| state.write().open_panel(Panel::Cart),
                    "Back to cart"
                }
                button {
                    class: "primary",
                    disabled: busy || units == 0,
                    onclick: submit,
                    if busy { "Placing order..." } else { "Place order" }
                }
            }
        }
    }
}
