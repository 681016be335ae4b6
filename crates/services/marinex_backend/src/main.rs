// File: crates/services/marinex_backend/src/main.rs
use std::sync::Arc;

use axum::http::{header, Method};
use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use marinex_config::load_config;
use marinex_notify::{routes as notify_routes, AppState};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    marinex_common::logging::init();

    let config = Arc::new(load_config().expect("Failed to load config"));
    let state = Arc::new(AppState::from_config(config.clone()));

    // Browser clients call these endpoints directly; preflight must pass.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-queue-secret"),
            header::HeaderName::from_static("x-cron-secret"),
        ]);

    let api_router = Router::new()
        .route("/", get(|| async { "Marinex push service" }))
        .merge(notify_routes(state));

    let app = Router::new().nest("/api", api_router).layer(cors);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Failed to bind server address");
    info!("Starting server at http://{addr}");
    info!("API endpoints available at http://{addr}/api");

    axum::serve(listener, app.into_make_service())
        .await
        .expect("Server error");
}
