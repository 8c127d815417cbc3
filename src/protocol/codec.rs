//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! `Len` is an unsigned big-endian u32 counting payload bytes only. There is
//! no terminator, padding, version byte or checksum. Requests and responses
//! share the same layout.

use std::io::{self, Read, Write};

use bytes::{BufMut, Bytes, BytesMut};

use super::{Command, Frame};
use crate::error::{FramewireError, Result};

/// Header size: 1 byte command + 4 bytes length
pub const HEADER_SIZE: usize = 5;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Exact Reads
// =============================================================================

/// Fill `buf` completely from a streaming source
///
/// A stream may hand data over in arbitrarily small pieces, so this keeps
/// reading until the buffer is full. End of stream before the first byte is
/// `ConnectionClosed`; end of stream or a read timeout after a partial fill is
/// `TruncatedFrame`.
pub fn read_exact<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0;

    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Err(FramewireError::ConnectionClosed),
            Ok(0) => {
                return Err(FramewireError::TruncatedFrame {
                    expected: buf.len(),
                    received: filled,
                })
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if filled > 0 && is_timeout_kind(e.kind()) => {
                return Err(FramewireError::TruncatedFrame {
                    expected: buf.len(),
                    received: filled,
                })
            }
            Err(e) => return Err(FramewireError::Io(e)),
        }
    }

    Ok(())
}

fn is_timeout_kind(kind: io::ErrorKind) -> bool {
    matches!(kind, io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}

// =============================================================================
// Frame Codec
// =============================================================================

/// Frame encoder/decoder bounded by a maximum payload size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameCodec {
    max_payload_size: u32,
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new(MAX_PAYLOAD_SIZE)
    }
}

impl FrameCodec {
    /// Create a codec that rejects payloads above `max_payload_size` bytes
    pub fn new(max_payload_size: u32) -> Self {
        Self { max_payload_size }
    }

    pub fn max_payload_size(&self) -> u32 {
        self.max_payload_size
    }

    /// Encode a frame to bytes
    ///
    /// Format: cmd (1) + payload_len (4) + payload
    pub fn encode(&self, frame: &Frame) -> Result<Bytes> {
        self.encode_parts(frame.command, &frame.payload)
    }

    /// Encode a command and payload without building a `Frame` first
    pub fn encode_parts(&self, command: Command, payload: &[u8]) -> Result<Bytes> {
        if payload.len() > self.max_payload_size as usize {
            return Err(FramewireError::Encoding(format!(
                "payload of {} bytes exceeds limit of {} bytes",
                payload.len(),
                self.max_payload_size
            )));
        }

        let mut message = BytesMut::with_capacity(HEADER_SIZE + payload.len());
        message.put_u8(command.code());
        message.put_u32(payload.len() as u32);
        message.put_slice(payload);

        Ok(message.freeze())
    }

    /// Read exactly one frame from a stream
    ///
    /// The command byte and the declared length are both validated before any
    /// payload byte is read.
    pub fn decode<R: Read + ?Sized>(&self, reader: &mut R) -> Result<Frame> {
        let mut header = [0u8; HEADER_SIZE];
        read_exact(reader, &mut header)?;

        let command = Command::try_from(header[0])?;
        let payload_len = u32::from_be_bytes([header[1], header[2], header[3], header[4]]);

        if payload_len > self.max_payload_size {
            return Err(FramewireError::PayloadTooLarge {
                len: payload_len as usize,
                max: self.max_payload_size,
            });
        }

        let payload_len = payload_len as usize;
        let mut payload = vec![0u8; payload_len];
        if payload_len > 0 {
            // A clean EOF or a stall here is still mid-frame
            read_exact(reader, &mut payload).map_err(|e| match e {
                FramewireError::ConnectionClosed => FramewireError::TruncatedFrame {
                    expected: payload_len,
                    received: 0,
                },
                FramewireError::Io(io_err) if is_timeout_kind(io_err.kind()) => {
                    FramewireError::TruncatedFrame {
                        expected: payload_len,
                        received: 0,
                    }
                }
                other => other,
            })?;
        }

        Ok(Frame {
            command,
            payload: Bytes::from(payload),
        })
    }

    /// Decode one frame from the front of a byte slice
    ///
    /// Returns the frame and the number of bytes consumed
    pub fn decode_slice(&self, bytes: &[u8]) -> Result<(Frame, usize)> {
        let mut remaining = bytes;
        let frame = self.decode(&mut remaining)?;
        Ok((frame, bytes.len() - remaining.len()))
    }

    /// Write a frame to a stream in full, then flush
    pub fn write_frame<W: Write + ?Sized>(&self, writer: &mut W, frame: &Frame) -> Result<()> {
        let bytes = self.encode(frame)?;
        writer
            .write_all(&bytes)
            .map_err(FramewireError::WriteFailure)?;
        writer.flush().map_err(FramewireError::WriteFailure)?;
        Ok(())
    }
}

// =============================================================================
// Default-limit helpers
// =============================================================================

/// Encode a frame with the default payload limit
pub fn encode_frame(frame: &Frame) -> Result<Bytes> {
    FrameCodec::default().encode(frame)
}

/// Decode a frame from bytes with the default payload limit
pub fn decode_frame(bytes: &[u8]) -> Result<(Frame, usize)> {
    FrameCodec::default().decode_slice(bytes)
}

/// Read a complete frame from a stream
///
/// Blocks until a complete frame is received or an error occurs
pub fn read_frame<R: Read + ?Sized>(reader: &mut R) -> Result<Frame> {
    FrameCodec::default().decode(reader)
}

/// Write a frame to a stream
pub fn write_frame<W: Write + ?Sized>(writer: &mut W, frame: &Frame) -> Result<()> {
    FrameCodec::default().write_frame(writer, frame)
}
