//! Error types for session management and connection handling

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Failures of a create or join request against the registry
///
/// The three variants share a single wire message, so a client cannot
/// distinguish an unknown code from a full session.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("no session with that code")]
    CodeNotFound,
    #[error("session already has two players")]
    SessionFull,
    #[error("every session code is in use")]
    CodesExhausted,
}

/// Outcome of queueing one frame for a connected player
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryError {
    /// The player's outbound queue is full; the frame was dropped
    #[error("outbound queue is full")]
    Backlogged,
    /// The player's writer task has exited
    #[error("player connection is gone")]
    Disconnected,
}

/// Terminal failure of a single inbound connection
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),
    #[error("malformed handshake: {0}")]
    HandshakeMalformed(String),
    #[error("connection closed before handshake")]
    ClosedBeforeHandshake,
}
