//! Codec Tests
//!
//! Tests for frame encoding/decoding and exact stream reads.

use std::io::{self, Cursor, Read};

use bytes::Bytes;
use framewire::protocol::{
    decode_frame, encode_frame, read_exact, read_frame, write_frame, Command, Frame, FrameCodec,
    HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
use framewire::FramewireError;

// =============================================================================
// Helper Readers
// =============================================================================

/// Hands out at most one byte per read call
struct Trickle<R> {
    inner: R,
}

impl<R: Read> Read for Trickle<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.inner.read(&mut buf[..1])
    }
}

/// Fails every other read with `Interrupted`
struct Flaky<R> {
    inner: R,
    interrupt_next: bool,
}

impl<R: Read> Read for Flaky<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.interrupt_next = !self.interrupt_next;
        if self.interrupt_next {
            return Err(io::Error::new(io::ErrorKind::Interrupted, "signal"));
        }
        self.inner.read(buf)
    }
}

/// Returns its data, then fails every read with `WouldBlock` like a timed-out socket
struct Stalling<R> {
    inner: R,
}

impl<R: Read> Read for Stalling<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.inner.read(buf)? {
            0 => Err(io::Error::new(io::ErrorKind::WouldBlock, "timed out")),
            n => Ok(n),
        }
    }
}

// =============================================================================
// Encoding Tests
// =============================================================================

#[test]
fn test_encode_decode_each_command() {
    let frames = vec![
        Frame::echo("Hello, World!"),
        Frame::reverse("custom protocols are fun"),
        Frame::quit(),
    ];

    for frame in frames {
        let encoded = encode_frame(&frame).unwrap();
        let (decoded, consumed) = decode_frame(&encoded).unwrap();

        assert_eq!(decoded, frame);
        assert_eq!(consumed, encoded.len());
    }
}

#[test]
fn test_encode_decode_binary_payload() {
    let payload: Vec<u8> = (0..=255).collect();
    let frame = Frame::echo(payload.clone());

    let encoded = encode_frame(&frame).unwrap();
    let (decoded, _) = decode_frame(&encoded).unwrap();

    assert_eq!(decoded.payload, Bytes::from(payload));
}

#[test]
fn test_encoded_length_is_header_plus_payload() {
    let frame = Frame::echo("abc");
    let encoded = encode_frame(&frame).unwrap();

    assert_eq!(encoded.len(), HEADER_SIZE + 3);
    assert_eq!(frame.encoded_len(), encoded.len());
}

#[test]
fn test_encode_rejects_oversized_payload() {
    let codec = FrameCodec::new(4);
    let result = codec.encode(&Frame::echo("too long"));

    assert!(matches!(result, Err(FramewireError::Encoding(_))));
}

#[test]
fn test_encode_accepts_payload_at_limit() {
    let codec = FrameCodec::new(4);
    assert_eq!(codec.max_payload_size(), 4);
    let encoded = codec.encode(&Frame::echo("four")).unwrap();

    assert_eq!(encoded.len(), HEADER_SIZE + 4);
}

// =============================================================================
// Wire Format Verification Tests
// =============================================================================

#[test]
fn test_wire_format_echo() {
    let encoded = encode_frame(&Frame::echo("hi")).unwrap();

    // Expected: [0x01][0x00 0x00 0x00 0x02][h i]
    //           cmd   payload_len(2)       payload
    assert_eq!(&encoded[..], &[0x01, 0x00, 0x00, 0x00, 0x02, b'h', b'i']);
}

#[test]
fn test_wire_format_quit_is_header_only() {
    let encoded = encode_frame(&Frame::quit()).unwrap();
    assert_eq!(&encoded[..], &[0x03, 0x00, 0x00, 0x00, 0x00]);
}

#[test]
fn test_wire_format_length_is_big_endian() {
    let payload = vec![b'x'; 0x0102];
    let encoded = encode_frame(&Frame::reverse(payload)).unwrap();

    assert_eq!(encoded[0], 0x02);
    assert_eq!(&encoded[1..5], &[0x00, 0x00, 0x01, 0x02]);
}

// =============================================================================
// Error Handling Tests
// =============================================================================

#[test]
fn test_empty_stream_is_connection_closed() {
    let mut cursor = Cursor::new(Vec::<u8>::new());
    let result = read_frame(&mut cursor);

    assert!(matches!(result, Err(FramewireError::ConnectionClosed)));
}

#[test]
fn test_partial_header_is_truncated() {
    let bytes = [0x01, 0x00, 0x00]; // Only 3 bytes, need 5
    let result = decode_frame(&bytes);

    match result {
        Err(FramewireError::TruncatedFrame { expected, received }) => {
            assert_eq!(expected, HEADER_SIZE);
            assert_eq!(received, 3);
        }
        other => panic!("Expected TruncatedFrame, got {:?}", other),
    }
}

#[test]
fn test_missing_payload_is_truncated() {
    // Header says 10 bytes payload, nothing follows
    let bytes = [0x01, 0x00, 0x00, 0x00, 0x0A];
    let result = decode_frame(&bytes);

    assert!(matches!(
        result,
        Err(FramewireError::TruncatedFrame { expected: 10, received: 0 })
    ));
}

#[test]
fn test_short_payload_is_truncated() {
    // Header says 10 bytes payload, only 3 provided
    let bytes = [0x01, 0x00, 0x00, 0x00, 0x0A, b'a', b'b', b'c'];
    let result = decode_frame(&bytes);

    assert!(matches!(
        result,
        Err(FramewireError::TruncatedFrame { expected: 10, received: 3 })
    ));
}

#[test]
fn test_unknown_command_does_not_consume_payload() {
    let bytes = vec![99, 0x00, 0x00, 0x00, 0x05, b'h', b'e', b'l', b'l', b'o'];
    let mut cursor = Cursor::new(bytes);

    let result = read_frame(&mut cursor);

    assert!(matches!(result, Err(FramewireError::UnknownCommand(99))));
    assert_eq!(cursor.position(), HEADER_SIZE as u64);
}

#[test]
fn test_unknown_command_message() {
    let bytes = [0xFF, 0x00, 0x00, 0x00, 0x00];
    let err = decode_frame(&bytes).unwrap_err();

    assert!(err.to_string().contains("Unknown command type: 0xff"));
    assert!(err.is_protocol_violation());
}

#[test]
fn test_payload_too_large_rejected_before_reading() {
    let codec = FrameCodec::new(8);
    let mut bytes = vec![0x01, 0x00, 0x00, 0x00, 0x09];
    bytes.extend_from_slice(b"123456789");
    let mut cursor = Cursor::new(bytes);

    let result = codec.decode(&mut cursor);

    assert!(matches!(
        result,
        Err(FramewireError::PayloadTooLarge { len: 9, max: 8 })
    ));
    assert_eq!(cursor.position(), HEADER_SIZE as u64);
}

#[test]
fn test_default_limit_rejects_huge_length() {
    // A corrupt length field must not trigger a 4 GB allocation
    let bytes = [0x01, 0xFF, 0xFF, 0xFF, 0xFF];
    let result = decode_frame(&bytes);

    match result {
        Err(FramewireError::PayloadTooLarge { len, max }) => {
            assert_eq!(len, u32::MAX as usize);
            assert_eq!(max, MAX_PAYLOAD_SIZE);
        }
        other => panic!("Expected PayloadTooLarge, got {:?}", other),
    }
}

// =============================================================================
// Stream I/O Tests
// =============================================================================

#[test]
fn test_read_exact_fills_buffer_across_small_reads() {
    let mut reader = Trickle {
        inner: Cursor::new(b"abcdef".to_vec()),
    };
    let mut buf = [0u8; 6];

    read_exact(&mut reader, &mut buf).unwrap();
    assert_eq!(&buf, b"abcdef");
}

#[test]
fn test_read_exact_retries_interrupted() {
    let mut reader = Flaky {
        inner: Cursor::new(b"xyz".to_vec()),
        interrupt_next: false,
    };
    let mut buf = [0u8; 3];

    read_exact(&mut reader, &mut buf).unwrap();
    assert_eq!(&buf, b"xyz");
}

#[test]
fn test_fragmented_stream_decodes_same_frame() {
    let frame = Frame::reverse("héllo wörld");
    let encoded = encode_frame(&frame).unwrap();

    let mut whole = Cursor::new(encoded.to_vec());
    let mut trickle = Trickle {
        inner: Cursor::new(encoded.to_vec()),
    };

    let from_whole = read_frame(&mut whole).unwrap();
    let from_trickle = read_frame(&mut trickle).unwrap();

    assert_eq!(from_whole, frame);
    assert_eq!(from_trickle, frame);
}

#[test]
fn test_stream_multiple_frames_then_clean_close() {
    let frames = vec![
        Frame::echo("one"),
        Frame::reverse("two"),
        Frame::echo(""),
        Frame::quit(),
    ];

    // Write all frames to buffer
    let mut buffer = Vec::new();
    for frame in &frames {
        write_frame(&mut buffer, frame).unwrap();
    }

    // Read them back one byte at a time
    let mut reader = Trickle {
        inner: Cursor::new(buffer),
    };
    for expected in &frames {
        let decoded = read_frame(&mut reader).unwrap();
        assert_eq!(&decoded, expected);
    }

    assert!(matches!(
        read_frame(&mut reader),
        Err(FramewireError::ConnectionClosed)
    ));
}

#[test]
fn test_command_codes_match_wire() {
    assert_eq!(Command::Echo.code(), 1);
    assert_eq!(Command::Reverse.code(), 2);
    assert_eq!(Command::Quit.code(), 3);

    for command in Command::ALL {
        assert_eq!(Command::try_from(command.code()).unwrap(), command);
    }
    assert!(matches!(
        Command::try_from(0),
        Err(FramewireError::UnknownCommand(0))
    ));
    assert!(matches!(
        Command::try_from(4),
        Err(FramewireError::UnknownCommand(4))
    ));
}

#[test]
fn test_command_names() {
    assert_eq!(Command::from_name("echo"), Some(Command::Echo));
    assert_eq!(Command::from_name("rev"), Some(Command::Reverse));
    assert_eq!(Command::from_name("quit"), Some(Command::Quit));
    assert_eq!(Command::from_name("ECHO"), Some(Command::Echo));
    assert_eq!(Command::from_name("reverse"), None);
    assert_eq!(Command::from_name(""), None);

    for command in Command::ALL {
        assert_eq!(Command::from_name(command.name()), Some(command));
    }
}

#[test]
fn test_default_codec_limit() {
    assert_eq!(FrameCodec::default().max_payload_size(), MAX_PAYLOAD_SIZE);
}

// =============================================================================
// Read Timeout Tests
// =============================================================================

#[test]
fn test_timeout_between_frames_stays_io_error() {
    let mut reader = Stalling {
        inner: Cursor::new(Vec::<u8>::new()),
    };

    match read_frame(&mut reader) {
        Err(FramewireError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::WouldBlock),
        other => panic!("Expected Io(WouldBlock), got {:?}", other),
    }
}

#[test]
fn test_timeout_inside_header_is_truncated() {
    let mut reader = Stalling {
        inner: Cursor::new(vec![0x01, 0x00]),
    };

    assert!(matches!(
        read_frame(&mut reader),
        Err(FramewireError::TruncatedFrame { expected: 5, received: 2 })
    ));
}

#[test]
fn test_timeout_before_payload_is_truncated() {
    let mut reader = Stalling {
        inner: Cursor::new(vec![0x01, 0x00, 0x00, 0x00, 0x0A]),
    };

    assert!(matches!(
        read_frame(&mut reader),
        Err(FramewireError::TruncatedFrame { expected: 10, received: 0 })
    ));
}

#[test]
fn test_timeout_inside_payload_is_truncated() {
    let mut reader = Stalling {
        inner: Cursor::new(vec![0x01, 0x00, 0x00, 0x00, 0x0A, b'a', b'b', b'c']),
    };

    let err = read_frame(&mut reader).unwrap_err();
    assert!(matches!(
        err,
        FramewireError::TruncatedFrame { expected: 10, received: 3 }
    ));
    assert!(!err.is_timeout());
}
