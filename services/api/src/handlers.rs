//! Axum Handlers for the token service
//!
//! This module contains the logic for the three endpoints: the health
//! probe, token issuance, and explicit agent dispatch. It uses `utoipa`
//! doc comments to generate OpenAPI documentation.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use parley_core::{DEFAULT_AGENT_NAME, TOKEN_TTL, TokenClaims, resolve_agent_name};
use std::sync::Arc;
use tracing::{error, info};

use crate::{
    models::{DispatchParams, DispatchResponse, ErrorResponse, HealthResponse, TokenRequest, TokenResponse},
    state::AppState,
};

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    /// Any failure while constructing or signing a credential, or while
    /// contacting the room server. Full detail is logged; the caller
    /// gets a single 500 with a short message. A partial credential is
    /// never returned.
    Internal {
        context: &'static str,
        source: anyhow::Error,
    },
}

impl ApiError {
    fn internal(context: &'static str, source: impl Into<anyhow::Error>) -> Self {
        Self::Internal {
            context,
            source: source.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { message })).into_response()
            }
            ApiError::Internal { context, source } => {
                error!("{}: {:?}", context, source);
                let message = format!("{}: {}", context, source);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse { message }),
                )
                    .into_response()
            }
        }
    }
}

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        livekit_url: state.config.livekit_url.clone(),
    })
}

/// Generate a room access token for a participant.
///
/// The token grants room join, audio publish/subscribe, and data
/// publish/subscribe, and expires one hour after issuance. When
/// `room_config` names an agent (either `agent_name` directly or the
/// first entry of an `agents` list), the token additionally instructs
/// the room server to dispatch that agent into the room.
#[utoipa::path(
    post,
    path = "/token",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Signed access token", body = TokenResponse),
        (status = 500, description = "Token construction or signing failed", body = ErrorResponse)
    )
)]
pub async fn generate_token(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let agent_name = resolve_agent_name(payload.room_config.as_ref());

    let claims = TokenClaims::new(
        payload.room_name.as_str(),
        payload.participant_identity.as_str(),
        payload.participant_name.as_deref(),
        agent_name,
    );

    let token = state
        .signer
        .sign(&claims)
        .map_err(|e| ApiError::internal("Failed to generate token", e))?;

    let expires_at = Utc::now().timestamp() + TOKEN_TTL.as_secs() as i64;

    info!(
        room = %claims.room,
        identity = %claims.identity,
        agent = ?claims.agent_name,
        "issued access token"
    );

    Ok(Json(TokenResponse {
        token,
        url: state.config.livekit_url.clone(),
        room_name: payload.room_name,
        participant_identity: payload.participant_identity,
        expires_at,
    }))
}

/// Explicitly dispatch an agent to a room.
///
/// Alternative to the automatic dispatch piggybacked on `/token`.
/// Fire-and-forget: the acknowledgement only echoes the command that
/// was issued; it does not confirm the agent joined.
#[utoipa::path(
    post,
    path = "/dispatch-agent",
    params(DispatchParams),
    request_body = DispatchParams,
    responses(
        (status = 200, description = "Dispatch command issued", body = DispatchResponse),
        (status = 400, description = "No room named", body = ErrorResponse),
        (status = 500, description = "Room server call failed", body = ErrorResponse)
    )
)]
pub async fn dispatch_agent(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DispatchParams>,
    body: Option<Json<DispatchParams>>,
) -> Result<Json<DispatchResponse>, ApiError> {
    let body = body.map(|Json(params)| params).unwrap_or_default();

    let room_name = query
        .room_name
        .or(body.room_name)
        .ok_or_else(|| ApiError::BadRequest("room_name is required".to_string()))?;
    let agent_name = query
        .agent_name
        .or(body.agent_name)
        .unwrap_or_else(|| DEFAULT_AGENT_NAME.to_string());

    let ack = state
        .dispatcher
        .dispatch(&room_name, &agent_name)
        .await
        .map_err(|e| ApiError::internal("Failed to dispatch agent", e))?;

    Ok(Json(DispatchResponse {
        status: "dispatched".to_string(),
        room_name: ack.room,
        agent_name: ack.agent_name,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use async_trait::async_trait;
    use parley_core::{AgentDispatcher, CoreError, DispatchAck, TokenSigner};
    use serde_json::json;
    use std::sync::Mutex;
    use tracing::Level;

    struct FakeSigner;

    impl TokenSigner for FakeSigner {
        fn sign(&self, claims: &TokenClaims) -> Result<String, CoreError> {
            Ok(format!(
                "fake-token:{}:{}:{}:{}",
                claims.room,
                claims.identity,
                claims.name,
                claims.agent_name.as_deref().unwrap_or("-")
            ))
        }
    }

    struct FailingSigner;

    impl TokenSigner for FailingSigner {
        fn sign(&self, _claims: &TokenClaims) -> Result<String, CoreError> {
            Err(CoreError::Dispatch("signer exploded".to_string()))
        }
    }

    #[derive(Default)]
    struct RecordingDispatcher {
        calls: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl AgentDispatcher for RecordingDispatcher {
        async fn dispatch(&self, room: &str, agent_name: &str) -> Result<DispatchAck, CoreError> {
            self.calls
                .lock()
                .unwrap()
                .push((room.to_string(), agent_name.to_string()));
            Ok(DispatchAck {
                room: room.to_string(),
                agent_name: agent_name.to_string(),
            })
        }
    }

    struct FailingDispatcher;

    #[async_trait]
    impl AgentDispatcher for FailingDispatcher {
        async fn dispatch(&self, _room: &str, _agent_name: &str) -> Result<DispatchAck, CoreError> {
            Err(CoreError::Dispatch("connection refused".to_string()))
        }
    }

    fn test_config() -> Config {
        Config {
            bind_address: "0.0.0.0:8080".parse().unwrap(),
            livekit_url: "ws://localhost:7880".to_string(),
            api_key: "devkey".to_string(),
            api_secret: "secret".to_string(),
            log_level: Level::INFO,
        }
    }

    fn test_state(
        signer: Arc<dyn TokenSigner>,
        dispatcher: Arc<dyn AgentDispatcher>,
    ) -> Arc<AppState> {
        Arc::new(AppState {
            signer,
            dispatcher,
            config: Arc::new(test_config()),
        })
    }

    async fn response_message(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn health_reports_status_and_endpoint() {
        // The probe must not depend on signing configuration working.
        let state = test_state(Arc::new(FailingSigner), Arc::new(FailingDispatcher));

        let Json(health) = health_check(State(state)).await;

        assert_eq!(health.status, "healthy");
        assert_eq!(health.livekit_url, "ws://localhost:7880");
        assert!((Utc::now() - health.timestamp).num_seconds().abs() < 5);
    }

    #[tokio::test]
    async fn token_response_echoes_request_with_one_hour_expiry() {
        let state = test_state(Arc::new(FakeSigner), Arc::new(RecordingDispatcher::default()));
        let payload = TokenRequest {
            room_name: "job-42".to_string(),
            participant_identity: "user-7".to_string(),
            participant_name: None,
            room_config: None,
        };

        let before = Utc::now().timestamp();
        let Json(response) = generate_token(State(state), Json(payload)).await.unwrap();
        let after = Utc::now().timestamp();

        assert!(!response.token.is_empty());
        assert_eq!(response.url, "ws://localhost:7880");
        assert_eq!(response.room_name, "job-42");
        assert_eq!(response.participant_identity, "user-7");
        assert!(response.expires_at >= before + 3600);
        assert!(response.expires_at <= after + 3600);
    }

    #[tokio::test]
    async fn token_claims_carry_resolved_agent_and_display_name() {
        let state = test_state(Arc::new(FakeSigner), Arc::new(RecordingDispatcher::default()));
        let payload = TokenRequest {
            room_name: "job-42".to_string(),
            participant_identity: "user-7".to_string(),
            participant_name: Some("Alex".to_string()),
            room_config: Some(json!({"agents": [{"agentName": "helper"}]})),
        };

        let Json(response) = generate_token(State(state), Json(payload)).await.unwrap();

        assert_eq!(response.token, "fake-token:job-42:user-7:Alex:helper");
    }

    #[tokio::test]
    async fn token_without_agent_config_signs_no_dispatch_instruction() {
        let state = test_state(Arc::new(FakeSigner), Arc::new(RecordingDispatcher::default()));
        let payload = TokenRequest {
            room_name: "job-42".to_string(),
            participant_identity: "user-7".to_string(),
            participant_name: None,
            room_config: Some(json!({"agents": []})),
        };

        let Json(response) = generate_token(State(state), Json(payload)).await.unwrap();

        assert!(response.token.ends_with(":-"));
    }

    #[tokio::test]
    async fn token_signing_failure_maps_to_500_with_message() {
        let state = test_state(Arc::new(FailingSigner), Arc::new(RecordingDispatcher::default()));
        let payload = TokenRequest {
            room_name: "job-42".to_string(),
            participant_identity: "user-7".to_string(),
            participant_name: None,
            room_config: None,
        };

        let err = generate_token(State(state), Json(payload)).await.unwrap_err();
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let message = response_message(response).await;
        assert!(message.contains("Failed to generate token"));
    }

    #[tokio::test]
    async fn dispatch_uses_default_agent_name() {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let state = test_state(Arc::new(FakeSigner), dispatcher.clone());

        let query = DispatchParams {
            room_name: Some("job-42".to_string()),
            agent_name: None,
        };
        let Json(response) = dispatch_agent(State(state), Query(query), None)
            .await
            .unwrap();

        assert_eq!(response.status, "dispatched");
        assert_eq!(response.room_name, "job-42");
        assert_eq!(response.agent_name, DEFAULT_AGENT_NAME);

        let calls = dispatcher.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), &[("job-42".to_string(), DEFAULT_AGENT_NAME.to_string())]);
    }

    #[tokio::test]
    async fn dispatch_reads_body_when_query_is_empty() {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let state = test_state(Arc::new(FakeSigner), dispatcher.clone());

        let body = DispatchParams {
            room_name: Some("job-42".to_string()),
            agent_name: Some("helper".to_string()),
        };
        let Json(response) = dispatch_agent(
            State(state),
            Query(DispatchParams::default()),
            Some(Json(body)),
        )
        .await
        .unwrap();

        assert_eq!(response.room_name, "job-42");
        assert_eq!(response.agent_name, "helper");
    }

    #[tokio::test]
    async fn dispatch_without_room_is_rejected() {
        let state = test_state(Arc::new(FakeSigner), Arc::new(RecordingDispatcher::default()));

        let err = dispatch_agent(State(state), Query(DispatchParams::default()), None)
            .await
            .unwrap_err();

        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn dispatch_failure_maps_to_500_with_message() {
        let state = test_state(Arc::new(FakeSigner), Arc::new(FailingDispatcher));

        let query = DispatchParams {
            room_name: Some("job-42".to_string()),
            agent_name: None,
        };
        let err = dispatch_agent(State(state), Query(query), None)
            .await
            .unwrap_err();
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let message = response_message(response).await;
        assert!(message.contains("Failed to dispatch agent"));
    }
}
