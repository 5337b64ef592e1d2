use crate::app::{Outcome, Skip};
use crate::infra::network::network_name;
use crate::infra::wallet::WalletContext;
use crate::transport::http::types::{ApiResponse, AppState};
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;

pub type HandlerError = (StatusCode, Json<ApiResponse>);

pub fn network_json(state: &AppState, ctx: &WalletContext) -> serde_json::Value {
    json!({
        "chain_id": format!("0x{:x}", ctx.chain_id),
        "network_name": network_name(ctx.chain_id),
        "on_required_network": state.guard.is_on_required_network(ctx.chain_id),
        "required_network": state.guard.required(),
        "account": ctx.account,
    })
}

/// Reads the wallet context without any network gating.
pub async fn read_context(state: &AppState) -> Result<WalletContext, HandlerError> {
    WalletContext::read(state.wallet.as_ref()).await.map_err(|e| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse::err(format!("Wallet unreachable: {}", e), None)),
        )
    })
}

/// Form actions are only offered on the required network; elsewhere the client is told to
/// prompt for a switch instead.
pub async fn require_network(state: &AppState) -> Result<WalletContext, HandlerError> {
    let ctx = read_context(state).await?;
    if !state.guard.is_on_required_network(ctx.chain_id) {
        return Err((
            StatusCode::CONFLICT,
            Json(ApiResponse::err(
                format!("Please switch to {}", state.guard.required().chain_name),
                Some(json!({
                    "switch_required": true,
                    "network": network_json(state, &ctx),
                })),
            )),
        ));
    }
    Ok(ctx)
}

fn skip_message(skip: Skip) -> &'static str {
    match skip {
        Skip::InvalidName => "name must be 3 to 12 characters",
        Skip::Busy => "another action is in progress",
        Skip::WrongState => "action is not available in the current state",
        Skip::NotOwner => "connected account does not own this name",
        Skip::NoAccount => "no account connected",
    }
}

/// Maps a workflow outcome onto the response envelope, always including the current state.
pub async fn outcome_response(
    state: &AppState,
    ctx: &WalletContext,
    outcome: Outcome,
) -> HandlerError {
    let view = state.workflow.view(ctx.account.as_ref()).await;
    let view = serde_json::to_value(&view).unwrap_or_default();

    match outcome {
        Outcome::Applied => (
            StatusCode::OK,
            Json(ApiResponse::ok(json!({ "outcome": "applied", "state": view }))),
        ),
        Outcome::Ignored(skip) => (
            StatusCode::CONFLICT,
            Json(ApiResponse::err(
                skip_message(skip),
                Some(json!({ "outcome": "ignored", "skipped": skip, "state": view })),
            )),
        ),
        Outcome::Failed(reason) => (
            StatusCode::BAD_GATEWAY,
            Json(ApiResponse::err(
                reason,
                Some(json!({ "outcome": "failed", "state": view })),
            )),
        ),
        Outcome::Stale => (
            StatusCode::CONFLICT,
            Json(ApiResponse::err(
                "wallet changed while the action was in flight",
                Some(json!({ "outcome": "stale", "state": view })),
            )),
        ),
    }
}
