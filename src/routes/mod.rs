pub mod admin;
pub mod content;
pub mod health;
pub mod orders;
pub mod products;
pub mod topup;
pub mod validation;
pub mod webhook;

pub use admin::{
    admin_stats, approve_topup, cancel_topup, list_orders, list_topups, update_order_status,
    upsert_package_setting, upsert_product_setting,
};
pub use content::{get_post, list_banners, list_posts, notify_chat};
pub use health::health_check;
pub use orders::create_order;
pub use products::list_products;
pub use topup::create_topup_qr;
pub use validation::{signed_payload, validate_signed_request};
pub use webhook::{gateway_webhook, payment_webhook};
