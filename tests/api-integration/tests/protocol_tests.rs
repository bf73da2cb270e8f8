//! Cart, favorites and orders through the refresh protocol over HTTP.

use kitshop_api_integration::{MockBackend, ALICE, BOB};
use kitshop_common::actions;
use kitshop_common::api::{AddCartItem, RegisterUser, StoreApi};
use kitshop_common::cart::CartItemId;
use kitshop_common::error::ShopError;
use kitshop_common::order::{OrderId, OrderStatus, ShippingDetails};
use kitshop_common::product::ProductId;

fn shipping() -> ShippingDetails {
    ShippingDetails {
        shipping_address: "Saint Petersburg, Nevsky 10".into(),
        phone_number: "+7 (921) 000-11-22".into(),
        notes: String::new(),
    }
}

#[tokio::test]
async fn cart_round_trip_over_http() {
    let backend = MockBackend::start().await;
    let api = backend.client();
    let catalog = actions::load_catalog(&api).await.unwrap();
    let me = Some(ALICE);

    let cart = actions::add_to_cart(&api, me, &[], &catalog[2], "M", 1).await.unwrap();
    assert_eq!(cart.len(), 1);
    assert_eq!(cart[0].product.id, ProductId(3));

    // Same product and size again: the existing line grows.
    let cart = actions::add_to_cart(&api, me, &cart, &catalog[2], "M", 2).await.unwrap();
    assert_eq!(cart.len(), 1);
    assert_eq!(cart[0].quantity, 3);

    let cart = actions::update_cart_quantity(&api, me, cart[0].id, 0).await.unwrap();
    assert_eq!(cart[0].quantity, 1);

    let cart = actions::add_to_cart(&api, me, &cart, &catalog[0], "", 1).await.unwrap();
    assert_eq!(cart.len(), 2);
    assert_eq!(cart[1].selected_size, "M");

    let cart = actions::remove_from_cart(&api, me, cart[0].id).await.unwrap();
    assert_eq!(cart.len(), 1);
    assert!(actions::clear_cart(&api, me).await.unwrap().is_empty());
}

#[tokio::test]
async fn record_routes_carry_the_owner() {
    let backend = MockBackend::start().await;
    let api = backend.client();
    let catalog = actions::load_catalog(&api).await.unwrap();

    let cart = actions::add_to_cart(&api, Some(ALICE), &[], &catalog[0], "M", 1).await.unwrap();
    backend.clear_requests().await;
    actions::update_cart_quantity(&api, Some(ALICE), cart[0].id, 2).await.unwrap();

    let requests = backend.requests().await;
    let expected = format!("PATCH /api/cart/{}/?telegram_id={}", cart[0].id, ALICE);
    assert_eq!(requests[0], expected);
    assert_eq!(requests[1], format!("GET /api/cart/by_telegram_id/?telegram_id={ALICE}"));

    // Another user cannot touch the line.
    let err = api.remove_cart_item(BOB, cart[0].id).await.unwrap_err();
    assert!(matches!(err, ShopError::Http { status: 404, .. }));
}

#[tokio::test]
async fn duplicate_post_surfaces_validation_message() {
    let backend = MockBackend::start().await;
    let api = backend.client();
    let request = AddCartItem {
        telegram_id: ALICE,
        product: ProductId(1),
        quantity: 1,
        selected_size: "M".into(),
    };
    api.add_cart_item(&request).await.unwrap();
    match api.add_cart_item(&request).await {
        Err(ShopError::Http { status: 400, message }) => {
            assert_eq!(
                message,
                "non_field_errors: The fields user, product, selected_size must make a unique set."
            );
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_mutation_is_not_followed_by_refetch() {
    let backend = MockBackend::start().await;
    let api = backend.client();
    backend.clear_requests().await;

    // Nobody has a cart yet, so the backend refuses to clear it.
    let err = actions::clear_cart(&api, Some(ALICE)).await.unwrap_err();
    assert_eq!(err.user_message(), "User not found");
    let requests = backend.requests().await;
    assert_eq!(requests.len(), 1);
    assert!(requests[0].starts_with("DELETE /api/cart/clear/"));
}

#[tokio::test]
async fn missing_identity_never_reaches_backend() {
    let backend = MockBackend::start().await;
    let api = backend.client();
    let catalog = actions::load_catalog(&api).await.unwrap();
    backend.clear_requests().await;

    assert!(matches!(
        actions::add_to_cart(&api, None, &[], &catalog[0], "M", 1).await,
        Err(ShopError::MissingIdentity)
    ));
    assert!(actions::toggle_favorite(&api, None, &[], catalog[0].id).await.is_err());
    assert!(actions::refresh_cart(&api, None).await.is_err());
    assert!(actions::refresh_orders(&api, None).await.is_err());
    assert!(actions::place_order(&api, None, &[], &shipping()).await.is_err());
    assert!(actions::update_cart_quantity(&api, None, CartItemId(1), 2).await.is_err());
    assert!(actions::remove_from_cart(&api, None, CartItemId(1)).await.is_err());
    assert!(matches!(actions::clear_cart(&api, None).await, Err(ShopError::MissingIdentity)));
    assert!(actions::remove_favorite(&api, None, &[], catalog[0].id).await.is_err());
    assert!(matches!(
        actions::cancel_order(&api, None, OrderId(1)).await,
        Err(ShopError::MissingIdentity)
    ));
    assert!(backend.requests().await.is_empty());
}

#[tokio::test]
async fn favorites_toggle_and_check() {
    let backend = MockBackend::start().await;
    let api = backend.client();
    let me = Some(ALICE);

    let favs = actions::toggle_favorite(&api, me, &[], ProductId(4)).await.unwrap();
    assert_eq!(favs.len(), 1);
    assert!(api.check_favorite(ALICE, ProductId(4)).await.unwrap());
    assert!(!api.check_favorite(BOB, ProductId(4)).await.unwrap());

    let favs = actions::toggle_favorite(&api, me, &favs, ProductId(2)).await.unwrap();
    let favs = actions::remove_favorite(&api, me, &favs, ProductId(4)).await.unwrap();
    assert_eq!(favs.len(), 1);
    assert_eq!(favs[0].product.id, ProductId(2));

    let favs = actions::toggle_favorite(&api, me, &favs, ProductId(2)).await.unwrap();
    assert!(favs.is_empty());
}

#[tokio::test]
async fn checkout_and_cancel() {
    let backend = MockBackend::start().await;
    let api = backend.client();
    let catalog = actions::load_catalog(&api).await.unwrap();
    let me = Some(ALICE);

    let cart = actions::add_to_cart(&api, me, &[], &catalog[0], "M", 2).await.unwrap();
    let cart = actions::add_to_cart(&api, me, &cart, &catalog[3], "L", 1).await.unwrap();
    let placed = actions::place_order(&api, me, &cart, &shipping()).await.unwrap();

    assert_eq!(placed.order.status, OrderStatus::Pending);
    assert_eq!(placed.order.total_amount, 2 * 6500 + 5500);
    assert_eq!(placed.order.items.len(), 2);
    assert_eq!(placed.order.notes, "");
    assert!(placed.cart.is_empty());
    assert_eq!(placed.history.orders.len(), 1);
    assert_eq!(placed.history.stats.total_spent, 18_500);
    assert_eq!(backend.stock(1).await, Some(3));
    assert_eq!(backend.stock(4).await, Some(0));

    let history = actions::cancel_order(&api, me, placed.order.id).await.unwrap();
    assert_eq!(history.orders[0].status, OrderStatus::Cancelled);
    assert_eq!(history.stats.pending_orders, 0);
    assert_eq!(backend.stock(4).await, Some(1));

    let err = actions::cancel_order(&api, me, placed.order.id).await.unwrap_err();
    assert_eq!(err.user_message(), "Order cannot be cancelled");
}

#[tokio::test]
async fn shipped_orders_cannot_be_cancelled() {
    let backend = MockBackend::start().await;
    let api = backend.client();
    let catalog = actions::load_catalog(&api).await.unwrap();
    let me = Some(ALICE);

    let cart = actions::add_to_cart(&api, me, &[], &catalog[1], "L", 1).await.unwrap();
    let placed = actions::place_order(&api, me, &cart, &shipping()).await.unwrap();
    backend.set_order_status(placed.order.id.0, "shipped").await;

    let history = actions::refresh_orders(&api, me).await.unwrap();
    assert_eq!(history.orders[0].status, OrderStatus::Shipped);
    assert!(!history.orders[0].status.can_cancel());
    assert!(actions::cancel_order(&api, me, placed.order.id).await.is_err());
}

#[tokio::test]
async fn stock_shortage_keeps_cart() {
    let backend = MockBackend::start().await;
    let api = backend.client();
    let catalog = actions::load_catalog(&api).await.unwrap();
    let me = Some(ALICE);

    let cart = actions::add_to_cart(&api, me, &[], &catalog[1], "L", 5).await.unwrap();
    let err = actions::place_order(&api, me, &cart, &shipping()).await.unwrap_err();
    assert_eq!(err.user_message(), "Not enough 'Argentina' in stock");
    assert_eq!(actions::refresh_cart(&api, me).await.unwrap().len(), 1);
}

#[tokio::test]
async fn register_user_round_trip() {
    let backend = MockBackend::start().await;
    let api = backend.client();
    let profile = api
        .register_user(&RegisterUser {
            telegram_id: ALICE,
            username: Some("alice".into()),
            first_name: Some("Alice".into()),
            last_name: None,
            phone_number: None,
        })
        .await
        .unwrap();
    assert_eq!(profile.telegram_id, Some(ALICE));
    assert_eq!(profile.username.as_deref(), Some("alice"));
}
