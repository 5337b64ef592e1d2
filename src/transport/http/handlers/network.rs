use crate::infra::network::SwitchOutcome;
use crate::transport::http::types::{ApiResponse, AppState};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

#[utoipa::path(
    post,
    path = "/api/network/switch",
    responses(
        (status = 200, description = "Wallet is on the required network", body = ApiResponse),
        (status = 409, description = "Still on the wrong network", body = ApiResponse)
    )
)]
pub async fn switch_network_handler(State(state): State<AppState>) -> impl IntoResponse {
    let outcome = state.guard.request_switch().await;
    let data = json!({
        "outcome": outcome,
        "required_network": state.guard.required(),
    });
    match outcome {
        SwitchOutcome::AlreadyOnNetwork | SwitchOutcome::Switched | SwitchOutcome::Added => {
            (StatusCode::OK, Json(ApiResponse::ok(data)))
        }
        SwitchOutcome::NoAccount => (
            StatusCode::CONFLICT,
            Json(ApiResponse::err("connect a wallet account first", Some(data))),
        ),
        SwitchOutcome::StillOnWrongNetwork => (
            StatusCode::CONFLICT,
            Json(ApiResponse::err(
                format!("Please switch to {}", state.guard.required().chain_name),
                Some(data),
            )),
        ),
    }
}
