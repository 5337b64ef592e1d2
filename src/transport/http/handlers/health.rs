use crate::infra::wallet::WalletContext;
use crate::transport::http::types::{ApiResponse, AppState};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy (wallet reachable)", body = ApiResponse),
        (status = 503, description = "Service is unhealthy (wallet unreachable)", body = ApiResponse)
    )
)]
pub async fn healthcheck_handler(State(state): State<AppState>) -> impl IntoResponse {
    match WalletContext::read(state.wallet.as_ref()).await {
        Ok(ctx) => (
            StatusCode::OK,
            Json(ApiResponse::ok(serde_json::json!({
                "status": "ok",
                "on_required_network": state.guard.is_on_required_network(ctx.chain_id),
            }))),
        )
            .into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse::err(
                format!("Wallet ping failed: {}", e),
                Some(serde_json::json!({ "status": "unhealthy" })),
            )),
        )
            .into_response(),
    }
}
