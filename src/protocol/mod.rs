//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Frame Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Commands
//! - 0x01: ECHO    - Response payload: request payload unchanged
//! - 0x02: REVERSE - Response payload: request payload reversed by character
//! - 0x03: QUIT    - Response payload: empty, then the server closes
//!
//! Responses reuse the request's command code. There is no status byte:
//! every failure is reported by closing the connection.

mod command;
mod frame;
mod codec;
mod dispatch;

pub use command::Command;
pub use frame::Frame;
pub use codec::{
    read_exact, encode_frame, decode_frame, read_frame, write_frame,
    FrameCodec, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
pub use dispatch::{dispatch, dispatch_code, reverse_payload, Dispatch};
