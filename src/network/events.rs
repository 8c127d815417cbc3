//! Session events
//!
//! Sessions report what happens to them through an [`EventSink`] instead of
//! logging directly. The server uses [`TracingSink`] by default;
//! [`ChannelSink`] hands events to another thread.

use crossbeam::channel::{self, Receiver, Sender};

use super::CloseReason;
use crate::protocol::Command;

/// Something observable that happened on a connection
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Connection accepted and session created
    Opened { peer: String },

    /// A complete, valid request frame was decoded
    CommandReceived {
        peer: String,
        command: Command,
        payload_len: usize,
    },

    /// Session ended and its connection was released
    Closed { peer: String, reason: CloseReason },
}

/// Consumer of session events
pub trait EventSink: Send + Sync {
    fn emit(&self, event: SessionEvent);
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: SessionEvent) {}
}

/// Writes events as `tracing` records
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: SessionEvent) {
        match event {
            SessionEvent::Opened { peer } => {
                tracing::debug!("Connection established from {}", peer);
            }
            SessionEvent::CommandReceived {
                peer,
                command,
                payload_len,
            } => {
                tracing::trace!(%peer, %command, payload_len, "Received command");
            }
            SessionEvent::Closed { peer, reason } => match &reason {
                CloseReason::ProtocolError(e) => {
                    tracing::warn!("Protocol error from {}: {}", peer, e);
                }
                CloseReason::TransportError(e) => {
                    tracing::warn!("Transport error with {}: {}", peer, e);
                }
                _ => tracing::debug!("Client {} disconnected ({})", peer, reason),
            },
        }
    }
}

/// Forwards events over a crossbeam channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<SessionEvent>,
}

impl ChannelSink {
    pub fn new(tx: Sender<SessionEvent>) -> Self {
        Self { tx }
    }

    /// Create a sink together with the receiving end of an unbounded channel
    pub fn unbounded() -> (Self, Receiver<SessionEvent>) {
        let (tx, rx) = channel::unbounded();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: SessionEvent) {
        // Nobody listening is not the session's problem
        let _ = self.tx.send(event);
    }
}
