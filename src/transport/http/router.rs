use crate::app::Skip;
use crate::domain::RecordField;
use crate::infra::network::SwitchOutcome;
use crate::transport::http::handlers::{health, minted, network, workflow};
use crate::transport::http::types::{
    ApiResponse, EditFieldRequest, InputRequest, SearchRequest, SelectRequest,
};
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        workflow::state_handler,
        workflow::input_handler,
        workflow::search_handler,
        workflow::select_handler,
        workflow::mint_handler,
        workflow::update_handler,
        workflow::reverse_handler,
        workflow::edit_field_handler,
        workflow::dismiss_notice_handler,
        minted::minted_handler,
        minted::refresh_handler,
        network::switch_network_handler
    ),
    components(schemas(
        ApiResponse,
        InputRequest,
        SearchRequest,
        SelectRequest,
        EditFieldRequest,
        RecordField,
        Skip,
        SwitchOutcome
    ))
)]
pub struct ApiDoc;

pub fn create_router(app_state: crate::transport::http::types::AppState) -> Router {
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route("/api/state", get(workflow::state_handler))
        .route("/api/input", post(workflow::input_handler))
        .route("/api/search", post(workflow::search_handler))
        .route("/api/mint", post(workflow::mint_handler))
        .route("/api/update", post(workflow::update_handler))
        .route("/api/reverse", post(workflow::reverse_handler))
        .route("/api/records/edit", post(workflow::edit_field_handler))
        .route("/api/notice/dismiss", post(workflow::dismiss_notice_handler))
        .route("/api/minted", get(minted::minted_handler))
        .route("/api/minted/select", post(workflow::select_handler))
        .route("/api/refresh", post(minted::refresh_handler))
        .route("/api/network/switch", post(network::switch_network_handler))
        .with_state(app_state)
}
