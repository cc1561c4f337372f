//! Top-up Storefront Server Library
//!
//! This module exports the core types and functions for testing and reuse.

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod gateway;
pub mod models;
pub mod notify;
pub mod routes;
pub mod security;
pub mod supplier;

pub use config::Config;
pub use db::create_pool;
pub use error::{AppError, Result};

use gateway::PaymentGateway;
use notify::AdminNotifier;
use supplier::SupplierCatalog;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::PgPool,
    pub config: Config,
    pub gateway: PaymentGateway,
    pub supplier: SupplierCatalog,
    pub notifier: AdminNotifier,
}

impl AppState {
    /// Create a new AppState with the given pool and configuration.
    /// Outbound clients share one reqwest connection pool.
    pub fn new(pool: sqlx::PgPool, config: Config) -> Self {
        let http = reqwest::Client::new();
        let gateway = PaymentGateway::new(http.clone(), &config);
        let supplier = SupplierCatalog::new(http.clone(), &config);
        let notifier = AdminNotifier::new(http, &config);

        Self {
            pool,
            config,
            gateway,
            supplier,
            notifier,
        }
    }
}
