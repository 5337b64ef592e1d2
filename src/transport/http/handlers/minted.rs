use crate::app::Outcome;
use crate::transport::http::types::{ApiResponse, AppState};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

#[utoipa::path(
    get,
    path = "/api/minted",
    responses((status = 200, description = "Last minted list snapshot", body = ApiResponse))
)]
pub async fn minted_handler(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.workflow.minted_snapshot().await;
    (
        StatusCode::OK,
        Json(ApiResponse::ok(json!({
            "entries": snapshot.entries(),
            "refreshed_at": snapshot.refreshed_at(),
        }))),
    )
}

#[utoipa::path(
    post,
    path = "/api/refresh",
    responses(
        (status = 200, description = "Minted list rebuilt", body = ApiResponse),
        (status = 502, description = "Refresh failed; previous snapshot kept", body = ApiResponse)
    )
)]
pub async fn refresh_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.workflow.refresh_list().await {
        Outcome::Applied => {
            let entries = state.workflow.minted().await;
            (
                StatusCode::OK,
                Json(ApiResponse::ok(json!({ "entries": entries }))),
            )
        }
        Outcome::Failed(reason) => (StatusCode::BAD_GATEWAY, Json(ApiResponse::err(reason, None))),
        other => (
            StatusCode::CONFLICT,
            Json(ApiResponse::err(format!("refresh not applied: {:?}", other), None)),
        ),
    }
}
