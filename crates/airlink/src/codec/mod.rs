// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Message codec: typed messages <-> wire bytes.
//!
//! Every serialized message starts with an 8-byte header followed by the
//! root object:
//!
//! ```text
//! +--------+---------+---------+-------+----------+----------+
//! | magic  | ver maj | ver min | flags | reserved | reserved |
//! | u16 LE | u8      | u8      | u8    | u8       | u16      |
//! +--------+---------+---------+-------+----------+----------+
//! | object: present u8 | type name string | fields ...       |
//! +----------------------------------------------------------+
//! ```
//!
//! Strings are u32 length-prefixed UTF-8. Nested objects carry their own
//! presence byte and type-name tag and are instantiated through the
//! [`MessageFactory`](crate::msg::MessageFactory) at decode time, so a
//! reader only needs to know the expected root type.

pub mod cursor;

pub use cursor::{Cursor, CursorMut};

use crate::msg::{Message, MessageFactory, MessageType};
use crate::{Error, Result};
use std::fmt;

/// Wire magic (bytes `41 4C`, "AL", when written little-endian).
const MAGIC: u16 = 0x4C41;
const VERSION_MAJOR: u8 = 0x01;
const VERSION_MINOR: u8 = 0x00;

/// Flags: LE canonical encoding = 0x00.
const FLAGS_LE_CANONICAL: u8 = 0x00;
/// Flags: big-endian bit (bit 0) -> rejected, only LE is produced.
const FLAGS_BE_BIT: u8 = 0x01;

/// Header size in bytes (magic + version + flags + reserved).
pub const HEADER_SIZE: usize = 8;

/// Default serialization/receive buffer budget (64 KB).
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 64 * 1024;

/// Codec-internal error with offset context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    EncoderFailed { reason: String },
    DecoderFailed { reason: String },
    WriteFailed { offset: usize, reason: String },
    ReadFailed { offset: usize, reason: String },
    TypeMismatch { expected: String, actual: String },
    UnknownType { type_name: String },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::EncoderFailed { reason } => write!(f, "encoder failed: {}", reason),
            CodecError::DecoderFailed { reason } => write!(f, "decoder failed: {}", reason),
            CodecError::WriteFailed { offset, reason } => {
                write!(f, "write failed at offset {}: {}", offset, reason)
            }
            CodecError::ReadFailed { offset, reason } => {
                write!(f, "read failed at offset {}: {}", offset, reason)
            }
            CodecError::TypeMismatch { expected, actual } => {
                write!(f, "type mismatch: expected {}, got {}", expected, actual)
            }
            CodecError::UnknownType { type_name } => {
                write!(f, "type {} not registered in factory", type_name)
            }
        }
    }
}

impl std::error::Error for CodecError {}

pub type CodecResult<T> = core::result::Result<T, CodecError>;

/// Encode one object: presence byte, type-name tag, fields.
pub fn encode_object(cur: &mut CursorMut<'_>, msg: &dyn Message) -> CodecResult<()> {
    cur.write_u8(1)?;
    cur.write_string(msg.type_name())?;
    msg.encode_fields(cur)
}

/// Decode one object of a known concrete type.
///
/// The embedded type-name tag is resolved through the factory, the fresh
/// instance is populated from the wire, then downcast to `T`. A tag naming
/// a different type than `T` is a `TypeMismatch`.
pub fn decode_object_as<T: MessageType>(
    cur: &mut Cursor<'_>,
    factory: &MessageFactory,
) -> CodecResult<T> {
    let present = cur.read_u8()?;
    if present == 0 {
        return Err(CodecError::DecoderFailed {
            reason: format!("null object where {} expected", T::TYPE_NAME),
        });
    }
    let type_name = cur.read_string()?;
    if type_name != T::TYPE_NAME {
        return Err(CodecError::TypeMismatch {
            expected: T::TYPE_NAME.to_string(),
            actual: type_name,
        });
    }
    let mut instance = factory
        .create(&type_name)
        .ok_or(CodecError::UnknownType { type_name })?;
    instance.decode_fields(cur, factory)?;
    instance
        .into_any()
        .downcast::<T>()
        .map(|boxed| *boxed)
        .map_err(|_| CodecError::DecoderFailed {
            reason: format!("factory produced wrong type for {}", T::TYPE_NAME),
        })
}

/// Encode a list of objects as u16 count + objects.
pub fn encode_object_list<M: Message>(cur: &mut CursorMut<'_>, list: &[M]) -> CodecResult<()> {
    if list.len() > u16::MAX as usize {
        return Err(CodecError::EncoderFailed {
            reason: format!("object list of {} exceeds u16 count", list.len()),
        });
    }
    cur.write_u16_le(list.len() as u16)?;
    for item in list {
        encode_object(cur, item)?;
    }
    Ok(())
}

/// Decode a list written by [`encode_object_list`].
pub fn decode_object_list_as<T: MessageType>(
    cur: &mut Cursor<'_>,
    factory: &MessageFactory,
) -> CodecResult<Vec<T>> {
    let count = cur.read_u16_le()? as usize;
    let mut list = Vec::with_capacity(count);
    for _ in 0..count {
        list.push(decode_object_as::<T>(cur, factory)?);
    }
    Ok(list)
}

/// Serializer/deserializer for typed messages.
///
/// Stateless aside from the read-only factory reference: safe to reuse
/// across exchange steps, not designed for concurrent simultaneous calls.
pub struct MessageCodec<'f> {
    factory: &'f MessageFactory,
    max_message_size: usize,
}

impl<'f> MessageCodec<'f> {
    pub fn new(factory: &'f MessageFactory) -> Self {
        Self {
            factory,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }

    /// Cap the per-message encoding budget (and scratch buffer size).
    pub fn with_max_message_size(mut self, max_message_size: usize) -> Self {
        self.max_message_size = max_message_size;
        self
    }

    pub fn max_message_size(&self) -> usize {
        self.max_message_size
    }

    /// Serialize `msg` into `buf`, returning the number of bytes written.
    ///
    /// The buffer is cleared and resized at the start of each call and
    /// truncated to the written length on success, so one buffer can be
    /// reused across steps without reallocating.
    ///
    /// # Errors
    ///
    /// `EncodeFailed` if the message violates its encoding contract (for
    /// example the encoded form exceeds the configured budget). This is a
    /// caller bug, not a transient condition.
    pub fn serialize(&self, msg: &dyn Message, buf: &mut Vec<u8>) -> Result<usize> {
        buf.clear();
        buf.resize(self.max_message_size, 0);

        let written = {
            let mut cur = CursorMut::new(buf.as_mut_slice());
            write_header(&mut cur)
                .and_then(|()| encode_object(&mut cur, msg))
                .map(|()| cur.offset())
        };

        match written {
            Ok(n) => {
                buf.truncate(n);
                log::debug!("[CODEC] serialized {} ({} bytes)", msg.type_name(), n);
                Ok(n)
            }
            Err(e) => {
                buf.clear();
                Err(Error::EncodeFailed {
                    type_name: msg.type_name().to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Deserialize `bytes` into `msg`, returning the number of bytes read.
    ///
    /// The wire type-name tag must match `msg.type_name()`. On any error the
    /// contents of `msg` are unspecified and must not be read.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if the wire carries a different type than expected,
    /// `UnknownType` if a nested object names an unregistered type,
    /// `DecodeFailed` for malformed or truncated input.
    pub fn deserialize(&self, bytes: &[u8], msg: &mut dyn Message) -> Result<usize> {
        let mut cur = Cursor::new(bytes);
        match self.deserialize_inner(&mut cur, msg) {
            Ok(()) => {
                log::debug!(
                    "[CODEC] deserialized {} ({} bytes)",
                    msg.type_name(),
                    cur.offset()
                );
                Ok(cur.offset())
            }
            Err(CodecError::TypeMismatch { expected, actual }) => {
                Err(Error::TypeMismatch { expected, actual })
            }
            Err(CodecError::UnknownType { type_name }) => Err(Error::UnknownType(type_name)),
            Err(e) => Err(Error::DecodeFailed {
                type_name: msg.type_name().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    fn deserialize_inner(&self, cur: &mut Cursor<'_>, msg: &mut dyn Message) -> CodecResult<()> {
        read_header(cur)?;

        let present = cur.read_u8()?;
        if present == 0 {
            return Err(CodecError::DecoderFailed {
                reason: "null root object".into(),
            });
        }
        let type_name = cur.read_string()?;
        if type_name != msg.type_name() {
            return Err(CodecError::TypeMismatch {
                expected: msg.type_name().to_string(),
                actual: type_name,
            });
        }
        msg.decode_fields(cur, self.factory)
    }
}

fn write_header(cur: &mut CursorMut<'_>) -> CodecResult<()> {
    cur.write_u16_le(MAGIC)?;
    cur.write_u8(VERSION_MAJOR)?;
    cur.write_u8(VERSION_MINOR)?;
    cur.write_u8(FLAGS_LE_CANONICAL)?;
    cur.write_u8(0x00)?; // reserved
    cur.write_u16_le(0x0000)?; // reserved
    Ok(())
}

fn read_header(cur: &mut Cursor<'_>) -> CodecResult<()> {
    let magic = cur.read_u16_le()?;
    if magic != MAGIC {
        return Err(CodecError::DecoderFailed {
            reason: format!("invalid magic {:#06X}", magic),
        });
    }
    let version_major = cur.read_u8()?;
    if version_major != VERSION_MAJOR {
        return Err(CodecError::DecoderFailed {
            reason: format!("unsupported version {}", version_major),
        });
    }
    let _version_minor = cur.read_u8()?;
    let flags = cur.read_u8()?;
    cur.read_u8()?; // reserved
    cur.read_u16_le()?; // reserved

    if (flags & FLAGS_BE_BIT) != 0 {
        return Err(CodecError::DecoderFailed {
            reason: "big-endian flag set".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msg::cmasi::{GoToWaypointAction, MissionCommand};
    use crate::msg::MessageFactory;

    #[test]
    fn header_bytes_are_canonical() {
        let factory = MessageFactory::cmasi();
        let codec = MessageCodec::new(&factory);
        let mut buf = Vec::new();
        let n = codec
            .serialize(&GoToWaypointAction::default(), &mut buf)
            .expect("serialize");
        assert!(n > HEADER_SIZE);
        assert_eq!(&buf[..2], &[0x41, 0x4C]); // "AL"
        assert_eq!(buf[2], VERSION_MAJOR);
        assert_eq!(buf[4], FLAGS_LE_CANONICAL);
    }

    #[test]
    fn deserialize_rejects_bad_magic() {
        let factory = MessageFactory::cmasi();
        let codec = MessageCodec::new(&factory);
        let mut buf = Vec::new();
        codec
            .serialize(&GoToWaypointAction::default(), &mut buf)
            .expect("serialize");
        buf[0] ^= 0xFF;

        let mut out = GoToWaypointAction::default();
        let err = codec.deserialize(&buf, &mut out).unwrap_err();
        assert!(matches!(err, Error::DecodeFailed { .. }), "got {:?}", err);
    }

    #[test]
    fn deserialize_rejects_wrong_root_type() {
        let factory = MessageFactory::cmasi();
        let codec = MessageCodec::new(&factory);
        let mut buf = Vec::new();
        codec
            .serialize(&MissionCommand::default(), &mut buf)
            .expect("serialize");

        let mut out = GoToWaypointAction::default();
        match codec.deserialize(&buf, &mut out).unwrap_err() {
            Error::TypeMismatch { expected, actual } => {
                assert_eq!(expected, "GoToWaypointAction");
                assert_eq!(actual, "MissionCommand");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn serialize_reports_budget_overflow_as_encode_failure() {
        let factory = MessageFactory::cmasi();
        let codec = MessageCodec::new(&factory).with_max_message_size(8);
        let mut buf = Vec::new();
        let err = codec
            .serialize(&MissionCommand::default(), &mut buf)
            .unwrap_err();
        assert!(matches!(err, Error::EncodeFailed { .. }), "got {:?}", err);
        assert!(buf.is_empty());
    }

    #[test]
    fn truncated_input_is_a_decode_failure() {
        let factory = MessageFactory::cmasi();
        let codec = MessageCodec::new(&factory);
        let mut buf = Vec::new();
        let n = codec
            .serialize(&MissionCommand::default(), &mut buf)
            .expect("serialize");

        let mut out = MissionCommand::default();
        let err = codec.deserialize(&buf[..n - 3], &mut out).unwrap_err();
        assert!(matches!(err, Error::DecodeFailed { .. }), "got {:?}", err);
    }
}
