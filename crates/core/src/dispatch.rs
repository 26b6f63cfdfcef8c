//! Agent placement commands against the room server.

use async_trait::async_trait;
use livekit_api::services::agent_dispatch::AgentDispatchClient;
use livekit_protocol::CreateAgentDispatchRequest;
use tracing::info;

use crate::error::CoreError;

/// Well-known agent name used when a dispatch request does not name
/// one. The conversational worker registers under the same name, which
/// is the only contract between it and this backend.
pub const DEFAULT_AGENT_NAME: &str = "parley-voice-agent";

/// Acknowledgement echoed back for a placement command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchAck {
    pub room: String,
    pub agent_name: String,
}

/// Issues a placement command telling the room server to run a named
/// agent in a named room.
///
/// Fire-and-forget: implementations do not check that the room exists,
/// do not look for an existing placement, and do not wait for the agent
/// to join. Duplicate placements are the room server's to resolve.
#[async_trait]
pub trait AgentDispatcher: Send + Sync {
    async fn dispatch(&self, room: &str, agent_name: &str) -> Result<DispatchAck, CoreError>;
}

/// [`AgentDispatcher`] backed by the LiveKit agent-dispatch service.
pub struct LiveKitDispatcher {
    client: AgentDispatchClient,
}

impl LiveKitDispatcher {
    /// `url` is the signalling URL (`wss://...`); the HTTP service
    /// endpoint is derived from it.
    pub fn new(url: &str, api_key: &str, api_secret: &str) -> Self {
        let client = AgentDispatchClient::with_api_key(&service_url(url), api_key, api_secret);
        Self { client }
    }
}

#[async_trait]
impl AgentDispatcher for LiveKitDispatcher {
    async fn dispatch(&self, room: &str, agent_name: &str) -> Result<DispatchAck, CoreError> {
        self.client
            .create_dispatch(CreateAgentDispatchRequest {
                room: room.to_string(),
                agent_name: agent_name.to_string(),
                ..Default::default()
            })
            .await
            .map_err(|e| CoreError::Dispatch(e.to_string()))?;

        info!(room, agent_name, "agent dispatch requested");
        Ok(DispatchAck {
            room: room.to_string(),
            agent_name: agent_name.to_string(),
        })
    }
}

/// Maps a signalling URL to the HTTP endpoint the service APIs live on.
pub fn service_url(url: &str) -> String {
    if let Some(rest) = url.strip_prefix("wss://") {
        format!("https://{rest}")
    } else if let Some(rest) = url.strip_prefix("ws://") {
        format!("http://{rest}")
    } else {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_url_rewrites_websocket_schemes() {
        assert_eq!(
            service_url("wss://voice.example.cloud"),
            "https://voice.example.cloud"
        );
        assert_eq!(service_url("ws://localhost:7880"), "http://localhost:7880");
    }

    #[test]
    fn service_url_leaves_http_schemes_alone() {
        assert_eq!(service_url("http://localhost:7880"), "http://localhost:7880");
        assert_eq!(
            service_url("https://voice.example.cloud"),
            "https://voice.example.cloud"
        );
    }
}
