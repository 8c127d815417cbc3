//! Transport abstraction
//!
//! The byte stream a session runs over.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};

/// A connected, bidirectional byte stream
pub trait Transport: Read + Write + Send {
    /// Peer address for logging
    fn peer(&self) -> String;

    /// Release the connection
    ///
    /// Called at most once per session.
    fn close(&mut self) -> io::Result<()>;
}

impl Transport for TcpStream {
    fn peer(&self) -> String {
        self.peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string())
    }

    fn close(&mut self) -> io::Result<()> {
        match self.shutdown(Shutdown::Both) {
            // Peer already tore the socket down
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            other => other,
        }
    }
}
