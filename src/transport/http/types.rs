use crate::app::ResolutionWorkflow;
use crate::domain::RecordField;
use crate::infra::network::NetworkGuard;
use crate::infra::wallet::WalletProvider;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<ResolutionWorkflow>,
    pub guard: Arc<NetworkGuard>,
    pub wallet: Arc<dyn WalletProvider>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn ok(data: JsonValue) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: impl Into<String>, data: Option<JsonValue>) -> Self {
        Self {
            success: false,
            data,
            error: Some(error.into()),
        }
    }
}

/// Typing into the name field.
#[derive(Deserialize, Debug, ToSchema)]
pub struct InputRequest {
    pub name: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct SearchRequest {
    /// Name to look up. Defaults to the currently typed name.
    #[serde(default)]
    pub name: Option<String>,
}

/// Edit-selection from the minted list.
#[derive(Deserialize, Debug, ToSchema)]
pub struct SelectRequest {
    pub name: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct EditFieldRequest {
    pub field: RecordField,
    pub value: String,
}
