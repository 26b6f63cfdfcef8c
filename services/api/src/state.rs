//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds the signing
//! and dispatch capabilities plus the process configuration. Handlers
//! only see the two trait objects, so tests can substitute fakes.

use crate::config::Config;
use parley_core::{AgentDispatcher, TokenSigner};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to
/// all handlers.
#[derive(Clone)]
pub struct AppState {
    pub signer: Arc<dyn TokenSigner>,
    pub dispatcher: Arc<dyn AgentDispatcher>,
    pub config: Arc<Config>,
}
