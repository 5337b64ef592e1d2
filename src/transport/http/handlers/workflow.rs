use crate::transport::http::handlers::common::{
    network_json, outcome_response, read_context, require_network,
};
use crate::transport::http::types::{
    ApiResponse, AppState, EditFieldRequest, InputRequest, SearchRequest, SelectRequest,
};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

#[utoipa::path(
    get,
    path = "/api/state",
    responses(
        (status = 200, description = "Current workflow state and wallet network", body = ApiResponse),
        (status = 503, description = "Wallet unreachable", body = ApiResponse)
    )
)]
pub async fn state_handler(State(state): State<AppState>) -> impl IntoResponse {
    let ctx = match read_context(&state).await {
        Ok(ctx) => ctx,
        Err(resp) => return resp.into_response(),
    };
    let view = state.workflow.view(ctx.account.as_ref()).await;
    (
        StatusCode::OK,
        Json(ApiResponse::ok(json!({
            "state": view,
            "network": network_json(&state, &ctx),
        }))),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/api/input",
    request_body = InputRequest,
    responses(
        (status = 200, description = "Typed name replaced", body = ApiResponse),
        (status = 409, description = "Wrong network", body = ApiResponse)
    )
)]
pub async fn input_handler(
    State(state): State<AppState>,
    Json(request): Json<InputRequest>,
) -> impl IntoResponse {
    let ctx = match require_network(&state).await {
        Ok(ctx) => ctx,
        Err(resp) => return resp.into_response(),
    };
    state.workflow.input(&request.name).await;
    outcome_response(&state, &ctx, crate::app::Outcome::Applied)
        .await
        .into_response()
}

#[utoipa::path(
    post,
    path = "/api/search",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Name resolved (editable or mintable)", body = ApiResponse),
        (status = 409, description = "Ignored, or wrong network", body = ApiResponse),
        (status = 502, description = "Ledger unreachable", body = ApiResponse)
    )
)]
pub async fn search_handler(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> impl IntoResponse {
    let ctx = match require_network(&state).await {
        Ok(ctx) => ctx,
        Err(resp) => return resp.into_response(),
    };
    let name = match request.name {
        Some(name) => name,
        None => state.workflow.typed_name().await,
    };
    let outcome = state.workflow.search(&name).await;
    outcome_response(&state, &ctx, outcome).await.into_response()
}

#[utoipa::path(
    post,
    path = "/api/minted/select",
    request_body = SelectRequest,
    responses(
        (status = 200, description = "Selected name resolved", body = ApiResponse),
        (status = 409, description = "Ignored, or wrong network", body = ApiResponse)
    )
)]
pub async fn select_handler(
    State(state): State<AppState>,
    Json(request): Json<SelectRequest>,
) -> impl IntoResponse {
    let ctx = match require_network(&state).await {
        Ok(ctx) => ctx,
        Err(resp) => return resp.into_response(),
    };
    let outcome = state.workflow.select_minted(&request.name).await;
    outcome_response(&state, &ctx, outcome).await.into_response()
}

#[utoipa::path(
    post,
    path = "/api/mint",
    responses(
        (status = 200, description = "Name registered", body = ApiResponse),
        (status = 409, description = "Not mintable, busy, or wrong network", body = ApiResponse),
        (status = 502, description = "Transaction declined or failed", body = ApiResponse)
    )
)]
pub async fn mint_handler(State(state): State<AppState>) -> impl IntoResponse {
    let ctx = match require_network(&state).await {
        Ok(ctx) => ctx,
        Err(resp) => return resp.into_response(),
    };
    let outcome = state.workflow.mint().await;
    outcome_response(&state, &ctx, outcome).await.into_response()
}

#[utoipa::path(
    post,
    path = "/api/update",
    responses(
        (status = 200, description = "Records written", body = ApiResponse),
        (status = 409, description = "Not editable, not owner, busy, or wrong network", body = ApiResponse),
        (status = 502, description = "Transaction declined or failed", body = ApiResponse)
    )
)]
pub async fn update_handler(State(state): State<AppState>) -> impl IntoResponse {
    let ctx = match require_network(&state).await {
        Ok(ctx) => ctx,
        Err(resp) => return resp.into_response(),
    };
    let outcome = state.workflow.update().await;
    outcome_response(&state, &ctx, outcome).await.into_response()
}

#[utoipa::path(
    post,
    path = "/api/reverse",
    responses(
        (status = 200, description = "Reverse record set", body = ApiResponse),
        (status = 409, description = "Not editable, busy, or wrong network", body = ApiResponse),
        (status = 502, description = "Transaction declined or failed", body = ApiResponse)
    )
)]
pub async fn reverse_handler(State(state): State<AppState>) -> impl IntoResponse {
    let ctx = match require_network(&state).await {
        Ok(ctx) => ctx,
        Err(resp) => return resp.into_response(),
    };
    let outcome = state.workflow.set_reverse().await;
    outcome_response(&state, &ctx, outcome).await.into_response()
}

#[utoipa::path(
    post,
    path = "/api/records/edit",
    request_body = EditFieldRequest,
    responses(
        (status = 200, description = "Field edited locally (not yet written)", body = ApiResponse),
        (status = 409, description = "Read-only for this account, or wrong network", body = ApiResponse)
    )
)]
pub async fn edit_field_handler(
    State(state): State<AppState>,
    Json(request): Json<EditFieldRequest>,
) -> impl IntoResponse {
    let ctx = match require_network(&state).await {
        Ok(ctx) => ctx,
        Err(resp) => return resp.into_response(),
    };
    let outcome = state.workflow.edit_field(request.field, request.value).await;
    outcome_response(&state, &ctx, outcome).await.into_response()
}

#[utoipa::path(
    post,
    path = "/api/notice/dismiss",
    responses((status = 200, description = "Notice cleared", body = ApiResponse))
)]
pub async fn dismiss_notice_handler(State(state): State<AppState>) -> impl IntoResponse {
    state.workflow.dismiss_notice().await;
    (StatusCode::OK, Json(ApiResponse::ok(json!({ "notice": null })))).into_response()
}
