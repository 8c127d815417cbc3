//! Error types for framewire
//!
//! Provides a unified error type for codec, session and client operations.

use std::io;

use thiserror::Error;

/// Result type alias using FramewireError
pub type Result<T> = std::result::Result<T, FramewireError>;

/// Unified error type for framewire operations
#[derive(Debug, Error)]
pub enum FramewireError {
    // -------------------------------------------------------------------------
    // Framing Errors
    // -------------------------------------------------------------------------
    /// Peer ended the stream cleanly between two frames
    #[error("Connection closed by peer")]
    ConnectionClosed,

    /// Stream ended inside a header or payload
    #[error("Truncated frame: expected {expected} bytes, got {received}")]
    TruncatedFrame { expected: usize, received: usize },

    #[error("Unknown command type: 0x{0:02x}")]
    UnknownCommand(u8),

    #[error("Payload too large: {len} bytes (max {max})")]
    PayloadTooLarge { len: usize, max: u32 },

    #[error("Encoding error: {0}")]
    Encoding(String),

    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("Write failed: {0}")]
    WriteFailure(#[source] io::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // -------------------------------------------------------------------------
    // Client Errors
    // -------------------------------------------------------------------------
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FramewireError {
    /// True for malformed framing that cannot be resynchronized
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            FramewireError::TruncatedFrame { .. }
                | FramewireError::UnknownCommand(_)
                | FramewireError::PayloadTooLarge { .. }
        )
    }

    /// True when the underlying error means the peer went away
    ///
    /// Reset, abort and broken pipe are treated the same as a clean close.
    pub fn is_disconnect(&self) -> bool {
        match self {
            FramewireError::ConnectionClosed => true,
            FramewireError::Io(e) | FramewireError::WriteFailure(e) => matches!(
                e.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
            ),
            _ => false,
        }
    }

    /// True when a read or write timeout fired
    pub fn is_timeout(&self) -> bool {
        match self {
            // Unix reports WouldBlock for socket timeouts, Windows uses TimedOut
            FramewireError::Io(e) | FramewireError::WriteFailure(e) => matches!(
                e.kind(),
                io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }
}
