pub mod error;
pub mod handlers;

use crate::core::gateway::LedgerGateway;
use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use handlers::AppState;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn create_router(gateway: LedgerGateway) -> Router {
    let state = Arc::new(AppState { gateway });

    Router::new()
        .route("/", get(handlers::read_root))
        .route("/register_product", post(handlers::register_product))
        .route("/transfer_ownership", post(handlers::transfer_ownership))
        .route(
            "/get_product_details/{product_id}",
            get(handlers::get_product_details),
        )
        // 前端頁面從瀏覽器跨來源呼叫
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 綁定位址並持續服務，直到收到 Ctrl-C
pub async fn serve(listener: tokio::net::TcpListener, gateway: LedgerGateway) -> std::io::Result<()> {
    axum::serve(listener, create_router(gateway))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("🛑 Shutdown signal received");
}
