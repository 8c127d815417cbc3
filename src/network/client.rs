//! TCP Client
//!
//! Blocking client for a framewire server. One request is in flight at a
//! time: every call writes a frame and then reads exactly one response.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};

use bytes::Bytes;

use super::Transport;
use crate::error::{FramewireError, Result};
use crate::protocol::{Command, Frame, FrameCodec};

/// Client connection to a framewire server
pub struct Client {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered, flushed after every frame)
    writer: BufWriter<TcpStream>,

    codec: FrameCodec,

    /// Server address for logging
    peer_addr: String,

    closed: bool,
}

impl Client {
    /// Connect to a server
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;

        let peer_addr = stream.peer();
        let read_stream = stream.try_clone()?;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
            codec: FrameCodec::default(),
            peer_addr,
            closed: false,
        })
    }

    /// Use a codec with a different payload limit
    pub fn with_codec(mut self, codec: FrameCodec) -> Self {
        self.codec = codec;
        self
    }

    /// Send one request and wait for its response
    pub fn request(&mut self, command: Command, payload: impl Into<Bytes>) -> Result<Frame> {
        if self.closed {
            return Err(FramewireError::ConnectionClosed);
        }

        let request = Frame::new(command, payload);
        self.codec.write_frame(&mut self.writer, &request)?;

        let response = match self.codec.decode(&mut self.reader) {
            Ok(frame) => frame,
            Err(FramewireError::ConnectionClosed) => {
                return Err(FramewireError::UnexpectedResponse(format!(
                    "server {} closed the connection before responding to {}",
                    self.peer_addr, command
                )))
            }
            Err(e) => return Err(e),
        };

        if response.command != command {
            return Err(FramewireError::UnexpectedResponse(format!(
                "sent {} but server answered {}",
                command, response.command
            )));
        }

        Ok(response)
    }

    /// Ask the server to echo a message
    pub fn echo(&mut self, message: &str) -> Result<String> {
        let response = self.request(Command::Echo, message.to_owned())?;
        Ok(response.payload_text())
    }

    /// Ask the server to reverse a message
    pub fn reverse(&mut self, message: &str) -> Result<String> {
        let response = self.request(Command::Reverse, message.to_owned())?;
        Ok(response.payload_text())
    }

    /// Send QUIT, wait for the acknowledgement and close
    pub fn quit(&mut self) -> Result<()> {
        let ack = self.request(Command::Quit, Bytes::new())?;
        self.close();

        if !ack.payload.is_empty() {
            return Err(FramewireError::UnexpectedResponse(format!(
                "QUIT acknowledgement carried {} bytes",
                ack.payload.len()
            )));
        }
        Ok(())
    }

    /// Close the connection (idempotent)
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let _ = self.writer.get_mut().close();
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Get the server address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.close();
    }
}
