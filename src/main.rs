mod agent;
mod auth;
mod config;
mod db;
mod errors;
mod models;
mod routes;
mod sse;

use axum::{routing::get, routing::post, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::agent::AgentService;
use crate::routes::api_routes::{
    agent_chat_handler, list_orders_handler, place_service_request_handler,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (development convenience)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pureair_site=debug,tower_http=debug".into()),
        )
        .init();

    // Agent credentials and the database pool are resolved lazily per use,
    // so a partially configured deployment still serves the other routes.
    let agent = AgentService::new();

    let app = Router::new()
        .route("/api/agent/chat", post(agent_chat_handler))
        .route("/api/demo/orders", get(list_orders_handler))
        .route(
            "/api/demo/place-service-request",
            post(place_service_request_handler),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(agent);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{addr}/");

    axum::serve(listener, app).await?;
    Ok(())
}
