//! API Models
//!
//! This module defines the request and response bodies for the token
//! service, used both for `serde` (de)serialization and for generating
//! OpenAPI documentation with `utoipa`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Request body for `POST /token`.
#[derive(Deserialize, ToSchema, Debug, Clone)]
pub struct TokenRequest {
    #[schema(example = "job-42")]
    pub room_name: String,
    #[schema(example = "user-7")]
    pub participant_identity: String,
    /// Display name; defaults to the participant identity.
    #[serde(default)]
    pub participant_name: Option<String>,
    /// Free-form room configuration. Only inspected to discover an
    /// agent to dispatch; anything else is ignored, and malformed
    /// content is never an error.
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub room_config: Option<serde_json::Value>,
}

/// Response body for `POST /token`.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct TokenResponse {
    pub token: String,
    /// Signalling URL the token is valid against.
    pub url: String,
    pub room_name: String,
    pub participant_identity: String,
    /// Expiry as unix seconds, echoed for convenience. The expiry
    /// embedded in the signed token is authoritative.
    pub expires_at: i64,
}

/// Response body for `GET /health`.
#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub livekit_url: String,
}

/// Parameters for `POST /dispatch-agent`, accepted as query parameters
/// or as a JSON body (query values win).
#[derive(Deserialize, IntoParams, ToSchema, Debug, Clone, Default)]
#[into_params(parameter_in = Query)]
pub struct DispatchParams {
    #[serde(default)]
    pub room_name: Option<String>,
    /// Agent to place; defaults to the well-known worker name.
    #[serde(default)]
    pub agent_name: Option<String>,
}

/// Response body for `POST /dispatch-agent`.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct DispatchResponse {
    #[schema(example = "dispatched")]
    pub status: String,
    pub room_name: String,
    pub agent_name: String,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}
