use thiserror::Error;

/// Errors from credential construction or agent dispatch.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("access token error: {0}")]
    AccessToken(#[from] livekit_api::access_token::AccessTokenError),

    #[error("agent dispatch error: {0}")]
    Dispatch(String),
}
