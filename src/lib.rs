// src/lib.rs
pub mod alphavantage;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod portfolio;
pub mod state;

// Re-export commonly used items
pub use config::Config;
pub use db::DatabasePool;
pub use models::*;
pub use state::AppState;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{
    accounts::{logout, register, token, token_refresh},
    portfolio::{portfolio_metrics, portfolio_value},
    stocks::{create_stock, delete_stock, get_stock, list_stocks, random_stocks, update_stock},
};

/// Build the application router. Kept separate from `main` so tests can
/// drive it directly.
pub fn app(state: AppState) -> Router {
    Router::new()
        // Account routes
        .route("/register", post(register))
        .route("/token", post(token))
        .route("/token/refresh", post(token_refresh))
        .route("/logout", post(logout))
        // Holding routes
        .route("/stocks", get(list_stocks).post(create_stock))
        .route("/stocks/random", get(random_stocks))
        .route(
            "/stocks/:id",
            get(get_stock).put(update_stock).delete(delete_stock),
        )
        // Portfolio routes
        .route("/portfolio/value", get(portfolio_value))
        .route("/portfolio/metrics", get(portfolio_metrics))
        .with_state(state)
}
