//! Access-token construction for room credentials.
//!
//! Issued tokens are LiveKit access tokens: an HS256 JWT over the
//! issuer's API key/secret carrying the participant identity, a `video`
//! grants claim, and optionally a `roomConfig` claim instructing the
//! server to dispatch a named agent into the room. That claim layout is
//! the room server's wire format and must stay compatible with it, so
//! construction goes through `livekit-api` rather than a hand-rolled
//! JWT.

use livekit_api::access_token::{AccessToken, VideoGrants};
use livekit_protocol::{RoomAgentDispatch, RoomConfiguration};
use serde_json::Value;
use std::time::Duration;

use crate::error::CoreError;

/// Fixed lifetime of every issued token. Tokens are never renewed or
/// re-signed; a client that needs more time requests a new one.
pub const TOKEN_TTL: Duration = Duration::from_secs(3600);

/// The claim set bound into a single access token.
///
/// Built fresh per request and discarded once signed; there is no state
/// shared between issuances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub room: String,
    pub identity: String,
    /// Display name shown to other participants.
    pub name: String,
    /// Agent to place into the room when the token is used, if any.
    pub agent_name: Option<String>,
}

impl TokenClaims {
    /// Builds the claim set for one participant. An absent or empty
    /// display name falls back to the identity.
    pub fn new(
        room: impl Into<String>,
        identity: impl Into<String>,
        display_name: Option<&str>,
        agent_name: Option<String>,
    ) -> Self {
        let identity = identity.into();
        let name = display_name
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| identity.clone());
        Self {
            room: room.into(),
            identity,
            name,
            agent_name,
        }
    }
}

/// Signs a claim set into an opaque token string.
///
/// Signing is local cryptography over the issuer secret; no network
/// calls. Kept behind a trait so the issuing handler can be exercised
/// against a fake without real credentials.
pub trait TokenSigner: Send + Sync {
    fn sign(&self, claims: &TokenClaims) -> Result<String, CoreError>;
}

/// Resolves the agent to dispatch from a free-form `room_config` value.
///
/// Two request shapes exist in the client population and both must keep
/// working:
///
/// 1. `{"agent_name": "X"}`
/// 2. `{"agents": [{"agentName": "Y"}]}` — some clients spell the field
///    `agent_name` instead, so both spellings are read.
///
/// Absent, empty, or malformed configuration is not an error; it yields
/// `None` and the token simply carries no dispatch instruction.
pub fn resolve_agent_name(room_config: Option<&Value>) -> Option<String> {
    let config = room_config?;

    if let Some(name) = config
        .get("agent_name")
        .and_then(Value::as_str)
        .filter(|n| !n.is_empty())
    {
        return Some(name.to_string());
    }

    let first = config.get("agents")?.as_array()?.first()?;
    let name = first
        .get("agentName")
        .and_then(Value::as_str)
        .filter(|n| !n.is_empty())
        .or_else(|| {
            first
                .get("agent_name")
                .and_then(Value::as_str)
                .filter(|n| !n.is_empty())
        })?;

    Some(name.to_string())
}

/// [`TokenSigner`] backed by the LiveKit access-token scheme.
pub struct LiveKitSigner {
    api_key: String,
    api_secret: String,
}

impl LiveKitSigner {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }
}

impl TokenSigner for LiveKitSigner {
    fn sign(&self, claims: &TokenClaims) -> Result<String, CoreError> {
        let mut token = AccessToken::with_api_key(&self.api_key, &self.api_secret)
            .with_identity(&claims.identity)
            .with_name(&claims.name)
            .with_grants(VideoGrants {
                room_join: true,
                room: claims.room.clone(),
                can_publish: true,
                can_subscribe: true,
                can_publish_data: true,
                ..Default::default()
            })
            .with_ttl(TOKEN_TTL);

        if let Some(agent_name) = &claims.agent_name {
            token = token.with_room_config(RoomConfiguration {
                agents: vec![RoomAgentDispatch {
                    agent_name: agent_name.clone(),
                    ..Default::default()
                }],
                ..Default::default()
            });
        }

        Ok(token.to_jwt()?)
    }
}
