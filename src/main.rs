use axum::{
    routing::{get, post, put},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use topup_store_server::config::Config;
use topup_store_server::db::create_pool;
use topup_store_server::routes::{
    admin_stats, approve_topup, cancel_topup, create_order, create_topup_qr, gateway_webhook,
    get_post, health_check, list_banners, list_orders, list_posts, list_products, list_topups,
    notify_chat, payment_webhook, update_order_status, upsert_package_setting,
    upsert_product_setting,
};
use topup_store_server::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "topup_store_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Topup Store Server...");

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "Environment: {}, Server: {}",
        config.environment,
        config.server_address()
    );

    // Create database connection pool
    let pool = create_pool(&config.database_url).await?;

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Migrations complete");

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(
            config
                .allowed_origins
                .iter()
                .filter_map(|s| s.parse::<axum::http::HeaderValue>().ok())
                .collect::<Vec<_>>(),
        )
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
        ])
        .allow_headers(Any);

    // Create app state
    let state = AppState::new(pool, config.clone());

    // Build router
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/products", get(list_products))
        .route("/api/banners", get(list_banners))
        .route("/api/posts", get(list_posts))
        .route("/api/posts/:slug", get(get_post))
        .route("/api/orders", post(create_order))
        .route("/api/topup/create-qr", post(create_topup_qr))
        .route("/api/webhook/gateway", post(gateway_webhook))
        .route("/api/webhook/payment", post(payment_webhook))
        .route("/api/notify/chat", post(notify_chat))
        .route("/admin/stats", get(admin_stats))
        .route("/admin/topups", get(list_topups))
        .route("/admin/topups/:id/approve", post(approve_topup))
        .route("/admin/topups/:id/cancel", post(cancel_topup))
        .route("/admin/orders", get(list_orders))
        .route("/admin/orders/:id/status", post(update_order_status))
        .route("/admin/packages", put(upsert_package_setting))
        .route("/admin/products", put(upsert_product_setting))
        .layer(cors)
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.server_address().parse()?;
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
