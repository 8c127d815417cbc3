//! Command dispatcher
//!
//! Maps a decoded command and payload to a response payload. Pure: no I/O,
//! no state.

use bytes::Bytes;

use super::Command;
use crate::error::Result;

/// Outcome of dispatching one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    /// Payload to send back
    pub payload: Bytes,

    /// Session must close once the response has been written
    pub terminate: bool,
}

/// Dispatch a validated command
pub fn dispatch(command: Command, payload: Bytes) -> Dispatch {
    match command {
        Command::Echo => Dispatch {
            payload,
            terminate: false,
        },
        Command::Reverse => Dispatch {
            payload: reverse_payload(&payload),
            terminate: false,
        },
        Command::Quit => Dispatch {
            payload: Bytes::new(),
            terminate: true,
        },
    }
}

/// Dispatch a raw command code
///
/// Codes outside the command set fail with `UnknownCommand`.
pub fn dispatch_code(code: u8, payload: Bytes) -> Result<Dispatch> {
    let command = Command::try_from(code)?;
    Ok(dispatch(command, payload))
}

/// Reverse a payload by characters when it is UTF-8, by bytes otherwise
pub fn reverse_payload(payload: &[u8]) -> Bytes {
    match std::str::from_utf8(payload) {
        Ok(text) => Bytes::from(text.chars().rev().collect::<String>()),
        Err(_) => payload.iter().rev().copied().collect::<Vec<u8>>().into(),
    }
}
