mod error;
mod handlers;
mod types;

pub use error::RpcError;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use ledgerd_engine::LedgerEngine;
use ledgerd_types::Address;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared state behind every handler: the engine facade and the fixed
/// finance address the faucet mints from.
#[derive(Clone)]
pub struct RpcState {
    pub engine: Arc<LedgerEngine>,
    pub finance_addr: Address,
}

impl RpcState {
    pub fn new(engine: LedgerEngine, finance_addr: Address) -> Self {
        Self { engine: Arc::new(engine), finance_addr }
    }
}

/// Build the `/v1` router of spec §6. Single-transfer bodies are form
/// encoded, bulk bodies are JSON; every response is JSON and every error
/// response is still HTTP 200 (`RpcError`'s `IntoResponse`).
pub fn create_router(state: RpcState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/v1/accounts/", post(handlers::create_account))
        .route("/v1/accounts/{addr}", get(handlers::get_account))
        .route("/v1/accounts/{addr}/asset", post(handlers::trust_asset))
        .route("/v1/accounts/{addr}/sequence", get(handlers::get_sequence))
        .route("/v1/accounts/{addr}/balances", get(handlers::get_balances))
        .route("/v1/accounts/{addr}/transactions", get(handlers::list_transactions))
        .route("/v1/transactions/hash", post(handlers::build_single_handle))
        .route("/v1/transactions/", post(handlers::submit_single))
        .route("/v1/transactions/bulk/hash", post(handlers::build_bulk_handle))
        .route("/v1/transactions/bulk", post(handlers::submit_bulk))
        .route("/v1/transactions/{handle}", get(handlers::get_transaction))
        .route("/v1/faucet/", post(handlers::faucet_mint))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the RPC server, blocking until the listener is closed.
pub async fn start_server(state: RpcState, addr: &str) -> Result<(), std::io::Error> {
    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "ledgerd-rpc listening");
    axum::serve(listener, router).await
}
