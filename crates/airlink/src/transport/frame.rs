// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Length-prefix framing for topic-tagged messages over stream transports.
//!
//! TCP is a stream protocol without message boundaries, so each frame is
//! delimited by a 4-byte big-endian length:
//!
//! ```text
//! +----------------+------+------------------+-------+-----------+
//! | Length (4B BE) | kind | topic len (2B BE)| topic | payload   |
//! +----------------+------+------------------+-------+-----------+
//! ```
//!
//! The length covers everything after itself (kind + topic length + topic
//! + payload). `kind` distinguishes data frames from subscription control
//! frames a read channel sends upstream to register topic interest.

use std::io::{self, Read};

/// Frame header size (4 bytes for length).
pub const FRAME_HEADER_SIZE: usize = 4;

/// Default maximum frame body size (64 KB), anti-OOM bound.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 64 * 1024;

/// Frame discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Application payload published on a topic.
    Data = 0x01,
    /// Subscription registration for a topic (no payload).
    Subscribe = 0x02,
}

impl TryFrom<u8> for FrameKind {
    type Error = io::Error;

    fn try_from(value: u8) -> io::Result<Self> {
        match value {
            0x01 => Ok(FrameKind::Data),
            0x02 => Ok(FrameKind::Subscribe),
            other => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unknown frame kind {:#04x}", other),
            )),
        }
    }
}

/// One decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub kind: FrameKind,
    pub topic: String,
    pub payload: Vec<u8>,
}

/// Encode a frame into a fresh byte vector ready for a single write.
pub fn encode(kind: FrameKind, topic: &str, payload: &[u8]) -> io::Result<Vec<u8>> {
    if topic.len() > u16::MAX as usize {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "topic exceeds u16 length",
        ));
    }
    let body_len = 1 + 2 + topic.len() + payload.len();
    let mut out = Vec::with_capacity(FRAME_HEADER_SIZE + body_len);
    out.extend_from_slice(&(body_len as u32).to_be_bytes());
    out.push(kind as u8);
    out.extend_from_slice(&(topic.len() as u16).to_be_bytes());
    out.extend_from_slice(topic.as_bytes());
    out.extend_from_slice(payload);
    Ok(out)
}

/// Decode a frame body (everything after the length prefix).
pub fn decode_body(body: &[u8]) -> io::Result<Frame> {
    if body.len() < 3 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "frame body shorter than fixed fields",
        ));
    }
    let kind = FrameKind::try_from(body[0])?;
    let topic_len = u16::from_be_bytes([body[1], body[2]]) as usize;
    if body.len() < 3 + topic_len {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "frame body shorter than declared topic",
        ));
    }
    let topic = std::str::from_utf8(&body[3..3 + topic_len])
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "topic is not valid utf-8"))?
        .to_string();
    let payload = body[3 + topic_len..].to_vec();
    Ok(Frame {
        kind,
        topic,
        payload,
    })
}

/// Blocking-read one frame from a stream.
///
/// Honors the stream's read timeout; callers map `WouldBlock`/`TimedOut`
/// to their own timeout error. Frames larger than `max_size` are rejected
/// without being read.
pub fn read_frame(stream: &mut impl Read, max_size: usize) -> io::Result<Frame> {
    let mut header = [0u8; FRAME_HEADER_SIZE];
    stream.read_exact(&mut header)?;
    let body_len = u32::from_be_bytes(header) as usize;
    if body_len > max_size {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame of {} bytes exceeds max {}", body_len, max_size),
        ));
    }
    let mut body = vec![0u8; body_len];
    stream.read_exact(&mut body)?;
    decode_body(&body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_then_read_roundtrips() {
        let encoded =
            encode(FrameKind::Data, "afrl.cmasi.MissionCommand", b"payload").expect("encode");
        let mut stream = io::Cursor::new(encoded);
        let frame = read_frame(&mut stream, DEFAULT_MAX_FRAME_SIZE).expect("read");
        assert_eq!(frame.kind, FrameKind::Data);
        assert_eq!(frame.topic, "afrl.cmasi.MissionCommand");
        assert_eq!(frame.payload, b"payload");
    }

    #[test]
    fn subscribe_frame_has_empty_payload() {
        let encoded = encode(FrameKind::Subscribe, "afrl.cmasi.CameraState", &[]).expect("encode");
        let mut stream = io::Cursor::new(encoded);
        let frame = read_frame(&mut stream, DEFAULT_MAX_FRAME_SIZE).expect("read");
        assert_eq!(frame.kind, FrameKind::Subscribe);
        assert!(frame.payload.is_empty());
    }

    #[test]
    fn oversized_frame_is_rejected_before_reading_body() {
        let encoded = encode(FrameKind::Data, "t", &[0u8; 128]).expect("encode");
        let mut stream = io::Cursor::new(encoded);
        let err = read_frame(&mut stream, 16).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn unknown_kind_is_invalid_data() {
        let mut encoded = encode(FrameKind::Data, "t", b"x").expect("encode");
        encoded[FRAME_HEADER_SIZE] = 0x7F;
        let mut stream = io::Cursor::new(encoded);
        let err = read_frame(&mut stream, DEFAULT_MAX_FRAME_SIZE).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
