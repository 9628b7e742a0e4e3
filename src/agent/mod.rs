//! Agent lifecycle: roster launch, handshake, and the per-agent loop

pub mod runner;
pub mod stats;
pub mod team;

pub use team::{launch, HandshakeError};

use crate::net::LinkError;

/// Reasons an agent stops before playing
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Link error: {0}")]
    Link(#[from] LinkError),

    #[error("Handshake failed: {0}")]
    Handshake(#[from] HandshakeError),
}
