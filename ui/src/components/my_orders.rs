use dioxus::prelude::*;

use kitshop_common::currency::format_price;
use kitshop_common::error::ShopError;
use kitshop_common::order::Order;

use super::header::PanelHeader;
use super::shop_api::{use_shop_action, ShopAction};
use super::shop_state::use_shop_state;

#[component]
pub fn MyOrders() -> Element {
    let state = use_shop_state();
    let shop = use_shop_action();

    let s = state.read();
    let orders = s.orders.clone();
    let stats = s.order_stats.clone();
    let busy = s.busy;
    let signed_in = s.identity.is_some();
    drop(s);

    if !signed_in {
        let hint = ShopError::MissingIdentity.user_message();
        return rsx! {
            div { class: "panel orders-panel",
                PanelHeader { title: "My orders" }
                p { class: "empty-state", "{hint}" }
            }
        };
    }

    let spent = format_price(stats.total_spent);

    rsx! {
        div { class: "panel orders-panel",
            PanelHeader { title: "My orders" }
            div { class: "order-stats",
                span { "Orders: {stats.total_orders}" }
                span { "Pending: {stats.pending_orders}" }
                span { "Delivered: {stats.completed_orders}" }
                span { "Spent: {spent}" }
            }
            button {
                class: "secondary",
                disabled: busy,
                onclick: move |_| shop.send(ShopAction::RefreshOrders),
                "Refresh"
            }
            if orders.is_empty() {
                p { class: "empty-state", "You haven't placed any orders yet." }
            } else {
                div { class: "order-list",
                    for order in orders {
                        OrderCard { key: "{order.id}", order, busy }
                    }
                }
            }
        }
    }
}

#[component]
fn OrderCard(order: Order, busy: bool) -> Element {
    let shop = use_shop_action();

    let id = order.id;
    let placed = order.created_at.format("%d.%m.%Y %H:%M").to_string();
    let status = order.status.label();
    let status_class = format!("{:?}", order.status).to_lowercase();
    let total = format_price(order.total_amount);
    let lines: Vec<String> = order
        .items
        .iter()
        .map(|item| {
            format!(
                "{} ({}) × {} · {}",
                item.product.name,
                item.selected_size,
                item.quantity,
                format_price(item.price)
            )
        })
        .collect();

    rsx! {
        div { class: "order-card",
            div { class: "order-header",
                span { class: "order-id", "{order.order_number}" }
                span { class: "order-status status-{status_class}", "{status}" }
            }
            p { class: "order-date", "{placed}" }
            for line in lines {
                p { class: "order-item", "{line}" }
            }
            p { class: "order-address", "{order.shipping_address}" }
            if !order.notes.is_empty() {
                p { class: "order-notes", "{order.notes}" }
            }
            p { class: "order-total", "Total: {total}" }
            if order.status.can_cancel() {
                button {
                    class: "secondary",
                    disabled: busy,
                    onclick: move |_| shop.send(ShopAction::CancelOrder(id)),
                    "Cancel order"
                }
            }
        }
    }
}
