pub mod app;
pub mod cart_view;
pub mod favorites_view;
pub mod filter_panel;
pub mod header;
pub mod my_orders;
pub mod order_form;
pub mod product_grid;
pub mod product_modal;
pub mod shop_api;
pub mod shop_state;
pub mod telegram;
