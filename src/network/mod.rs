//! Network Module
//!
//! TCP server, per-connection sessions and the client.
//!
//! ## Architecture
//! - Single acceptor thread
//! - One thread per connection, no state shared between sessions
//! - Session lifecycle reported through an `EventSink`

mod transport;
mod events;
mod session;
mod server;
mod client;

pub use transport::Transport;
pub use events::{ChannelSink, EventSink, NullSink, SessionEvent, TracingSink};
pub use session::{CloseReason, Session, SessionState};
pub use server::{Server, ShutdownHandle};
pub use client::Client;
