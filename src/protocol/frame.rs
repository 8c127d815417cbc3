//! Frame definition
//!
//! One protocol message: a command plus its payload.

use bytes::Bytes;

use super::Command;

/// A single message as carried on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Command code
    pub command: Command,

    /// Command-specific data (conventionally UTF-8 text)
    pub payload: Bytes,
}

impl Frame {
    /// Create a frame from any owned or static byte source
    pub fn new(command: Command, payload: impl Into<Bytes>) -> Self {
        Self {
            command,
            payload: payload.into(),
        }
    }

    pub fn echo(payload: impl Into<Bytes>) -> Self {
        Self::new(Command::Echo, payload)
    }

    pub fn reverse(payload: impl Into<Bytes>) -> Self {
        Self::new(Command::Reverse, payload)
    }

    /// QUIT frames never carry data
    pub fn quit() -> Self {
        Self::new(Command::Quit, Bytes::new())
    }

    /// Size of this frame once encoded
    pub fn encoded_len(&self) -> usize {
        super::HEADER_SIZE + self.payload.len()
    }

    /// Payload decoded as text, replacing invalid sequences
    pub fn payload_text(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}
