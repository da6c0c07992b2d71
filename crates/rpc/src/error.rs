use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ledgerd_engine::LedgerError;
use serde::Serialize;

/// Wraps a `LedgerError` for the HTTP boundary. The handler policy fixes the
/// HTTP status at 200 regardless of outcome; callers distinguish success from
/// failure purely by the envelope's `code` field (spec §6/§7).
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct RpcError(#[from] pub LedgerError);

#[derive(Serialize)]
struct ErrorBody {
    code: u32,
    message: String,
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let code = self.0.code();
        let message = self.0.to_string();
        tracing::warn!(code, %message, "request failed");
        (StatusCode::OK, Json(ErrorBody { code, message })).into_response()
    }
}
