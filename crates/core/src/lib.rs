//! Core credential and dispatch logic for the Parley voice backend.
//!
//! This crate owns the two contracts the HTTP service is built around:
//! signing room access tokens ([`token::TokenSigner`]) and placing a
//! conversational agent into a room ([`dispatch::AgentDispatcher`]).
//! Both are narrow traits with LiveKit-backed implementations, so the
//! issuing logic stays testable without live credentials or a running
//! room server.

pub mod dispatch;
pub mod error;
pub mod token;

pub use dispatch::{AgentDispatcher, DEFAULT_AGENT_NAME, DispatchAck, LiveKitDispatcher};
pub use error::CoreError;
pub use token::{LiveKitSigner, TOKEN_TTL, TokenClaims, TokenSigner, resolve_agent_name};
