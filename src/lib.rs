//! # framewire
//!
//! A minimal request/response protocol over persistent TCP connections:
//! - Length-prefixed binary framing that survives arbitrary fragmentation
//! - ECHO / REVERSE / QUIT command set
//! - Thread-per-connection server with isolated sessions
//! - Blocking client and interactive CLI
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │             (accept loop, one thread per client)             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Session                                 │
//! │   AwaitingRequest → Processing → Responding → Terminated     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ FrameCodec  │          │  dispatch   │
//!   │ (read/write)│          │   (pure)    │
//!   └─────────────┘          └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{FramewireError, Result};
pub use config::Config;
pub use protocol::{Command, Frame, FrameCodec};
pub use network::{Client, Server};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of framewire
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
