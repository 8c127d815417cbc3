//! Session Handler
//!
//! Owns one connection from accept to close.
//!
//! ## State Machine
//! ```text
//!                 ┌──────────────────────────────────────┐
//!                 ▼                                      │
//!   AwaitingRequest ──► Processing ──► Responding ───────┘
//!         │                                │
//!         │ eof / error / timeout          │ quit / write error
//!         ▼                                ▼
//!     Terminated ◄─────────────────────────┘
//! ```
//!
//! A response is always written in full before the next request is read,
//! and QUIT closes the connection only after its acknowledgement is sent.

use std::fmt;
use std::io::BufReader;
use std::sync::Arc;

use super::events::{EventSink, SessionEvent};
use super::Transport;
use crate::error::FramewireError;
use crate::protocol::{dispatch, Frame, FrameCodec};

/// Why a session ended
#[derive(Debug, Clone)]
pub enum CloseReason {
    /// Peer closed the stream between frames (or reset it)
    PeerClosed,

    /// Client sent QUIT and received its acknowledgement
    Quit,

    /// No request arrived within the read timeout
    IdleTimeout,

    /// Malformed framing; the stream cannot be resynchronized
    ProtocolError(Arc<FramewireError>),

    /// Read or write on the transport failed
    TransportError(Arc<FramewireError>),
}

impl CloseReason {
    /// True for endings that are part of normal operation
    pub fn is_clean(&self) -> bool {
        matches!(
            self,
            CloseReason::PeerClosed | CloseReason::Quit | CloseReason::IdleTimeout
        )
    }

    fn from_read_error(error: FramewireError) -> Self {
        if error.is_disconnect() {
            CloseReason::PeerClosed
        } else if error.is_timeout() {
            CloseReason::IdleTimeout
        } else if error.is_protocol_violation() {
            CloseReason::ProtocolError(Arc::new(error))
        } else {
            CloseReason::TransportError(Arc::new(error))
        }
    }

    fn from_write_error(error: FramewireError) -> Self {
        match error {
            FramewireError::Encoding(_) => CloseReason::ProtocolError(Arc::new(error)),
            other => CloseReason::TransportError(Arc::new(other)),
        }
    }
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloseReason::PeerClosed => f.write_str("peer closed"),
            CloseReason::Quit => f.write_str("quit"),
            CloseReason::IdleTimeout => f.write_str("idle timeout"),
            CloseReason::ProtocolError(e) => write!(f, "protocol error: {}", e),
            CloseReason::TransportError(e) => write!(f, "transport error: {}", e),
        }
    }
}

/// Where a session is in its request cycle
#[derive(Debug, Clone)]
pub enum SessionState {
    /// Blocked reading the next request frame
    AwaitingRequest,

    /// Holding a decoded request
    Processing(Frame),

    /// Holding the response to write
    Responding { response: Frame, terminate: bool },

    /// Connection released
    Terminated(CloseReason),
}

impl SessionState {
    pub fn is_terminated(&self) -> bool {
        matches!(self, SessionState::Terminated(_))
    }
}

/// Handles a single client connection
pub struct Session<T: Transport> {
    /// Transport (reads buffered, writes go straight to the stream)
    reader: BufReader<T>,

    codec: FrameCodec,

    sink: Arc<dyn EventSink>,

    /// Peer address for events
    peer: String,

    state: SessionState,

    /// Set once the transport has been released
    closed: bool,
}

impl<T: Transport> Session<T> {
    /// Create a session for a freshly accepted connection
    pub fn new(transport: T, codec: FrameCodec, sink: Arc<dyn EventSink>) -> Self {
        let peer = transport.peer();
        sink.emit(SessionEvent::Opened { peer: peer.clone() });

        Self {
            reader: BufReader::new(transport),
            codec,
            sink,
            peer,
            state: SessionState::AwaitingRequest,
            closed: false,
        }
    }

    /// Run the session until it terminates (blocking)
    pub fn run(mut self) -> CloseReason {
        loop {
            if let SessionState::Terminated(reason) = self.step() {
                return reason.clone();
            }
        }
    }

    /// Perform one state transition
    ///
    /// Once `Terminated`, further calls are no-ops.
    pub fn step(&mut self) -> &SessionState {
        let current = std::mem::replace(&mut self.state, SessionState::AwaitingRequest);

        self.state = match current {
            SessionState::AwaitingRequest => self.await_request(),
            SessionState::Processing(request) => self.process(request),
            SessionState::Responding {
                response,
                terminate,
            } => self.respond(response, terminate),
            terminated @ SessionState::Terminated(_) => terminated,
        };

        let finished = match &self.state {
            SessionState::Terminated(reason) if !self.closed => Some(reason.clone()),
            _ => None,
        };
        if let Some(reason) = finished {
            self.close();
            self.sink.emit(SessionEvent::Closed {
                peer: self.peer.clone(),
                reason,
            });
        }

        &self.state
    }

    /// Current state
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Get the peer address string
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Access the underlying transport
    pub fn transport(&self) -> &T {
        self.reader.get_ref()
    }

    fn await_request(&mut self) -> SessionState {
        match self.codec.decode(&mut self.reader) {
            Ok(request) => {
                self.sink.emit(SessionEvent::CommandReceived {
                    peer: self.peer.clone(),
                    command: request.command,
                    payload_len: request.payload.len(),
                });
                SessionState::Processing(request)
            }
            Err(e) => SessionState::Terminated(CloseReason::from_read_error(e)),
        }
    }

    fn process(&mut self, request: Frame) -> SessionState {
        let outcome = dispatch(request.command, request.payload);
        SessionState::Responding {
            response: Frame::new(request.command, outcome.payload),
            terminate: outcome.terminate,
        }
    }

    fn respond(&mut self, response: Frame, terminate: bool) -> SessionState {
        if let Err(e) = self.codec.write_frame(self.reader.get_mut(), &response) {
            return SessionState::Terminated(CloseReason::from_write_error(e));
        }

        if terminate {
            SessionState::Terminated(CloseReason::Quit)
        } else {
            SessionState::AwaitingRequest
        }
    }

    /// Release the transport exactly once
    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        // Nothing useful to do if shutdown fails; the handle is dropped anyway
        let _ = self.reader.get_mut().close();
    }
}

impl<T: Transport> Drop for Session<T> {
    fn drop(&mut self) {
        self.close();
    }
}
