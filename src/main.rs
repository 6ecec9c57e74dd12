//! Cafe Order Management Backend
//!
//! Serves the staff-facing HTML pages and a JSON REST API over a shared
//! SQLite database.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod models;
mod web;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Cafe Order Management Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Warn if PSK is not configured
    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (CAFE_API_PSK). API authentication is disabled!");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    // Create application state
    let state = AppState {
        repo,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone PSK for the auth layer
    let psk = state.config.api_psk.clone();

    // API routes
    let api_routes = Router::new()
        // Dish catalog
        .route("/dishes", get(api::list_dishes))
        .route("/dishes", post(api::create_dish))
        .route("/dishes/{id}", get(api::get_dish))
        .route("/dishes/{id}", put(api::update_dish))
        .route("/dishes/{id}", delete(api::delete_dish))
        // Orders
        .route("/orders", get(api::list_orders))
        .route("/orders", post(api::create_order))
        .route("/orders/profit", get(api::total_profit))
        .route("/orders/{id}", get(api::get_order))
        .route("/orders/{id}", delete(api::delete_order))
        .route("/orders/{id}/status", patch(api::update_order_status))
        .route("/orders/{id}/dishes", put(api::replace_order_dishes))
        // Apply PSK auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Staff pages (no auth, the PSK guard covers the API only)
    let web_routes = Router::new()
        .route("/", get(web::root))
        .route("/orders", get(web::order_list_page))
        .route("/orders/new", get(web::order_create_page))
        .route("/orders/new", post(web::order_create_submit))
        .route("/orders/{id}/edit", get(web::order_edit_page))
        .route("/orders/{id}/edit", post(web::order_edit_submit))
        .route("/orders/{id}/status", post(web::order_status_submit))
        .route("/orders/{id}/delete", post(web::order_delete_submit))
        .route("/profit", get(web::profit_page));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(web_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
