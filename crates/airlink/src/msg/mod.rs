// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed mission messages.
//!
//! A message is a named unit of domain information (a command, a state
//! report) with typed fields. Messages are constructed empty via `Default`
//! immediately before a send or receive, populated either by the caller
//! (outbound) or by the codec (inbound), and discarded when their exchange
//! step completes.
//!
//! Two traits split the concerns:
//!
//! - [`Message`] is object-safe and carries the per-instance operations the
//!   codec and router need (type name, field encode/decode).
//! - [`MessageType`] adds the compile-time identity (`TYPE_NAME`) used to
//!   register constructors in the [`MessageFactory`] and to derive
//!   subscription topics without an instance in hand.

pub mod cmasi;
mod factory;

pub use factory::MessageFactory;

use crate::codec::{CodecResult, Cursor, CursorMut};
use std::any::Any;
use std::fmt;

/// Object-safe message contract.
pub trait Message: fmt::Debug + Send {
    /// Stable type-identifying name (e.g. `"MissionCommand"`).
    fn type_name(&self) -> &'static str;

    /// Encode this message's fields (header and type tag are the codec's job).
    fn encode_fields(&self, cur: &mut CursorMut<'_>) -> CodecResult<()>;

    /// Populate this message's fields from the wire. Nested objects are
    /// resolved through `factory`.
    fn decode_fields(&mut self, cur: &mut Cursor<'_>, factory: &MessageFactory) -> CodecResult<()>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

/// Compile-time message identity, for factory registration and topic
/// derivation without an instance.
pub trait MessageType: Message + Default + 'static {
    const TYPE_NAME: &'static str;
}

/// Implement the `Any` plumbing plus `type_name` for a concrete message.
///
/// Keeps the hand-written part of each message down to its two field
/// codec methods.
macro_rules! impl_message_identity {
    ($msg:ty, $name:literal) => {
        impl crate::msg::MessageType for $msg {
            const TYPE_NAME: &'static str = $name;
        }

        impl crate::msg::Message for $msg {
            fn type_name(&self) -> &'static str {
                <$msg as crate::msg::MessageType>::TYPE_NAME
            }

            fn encode_fields(
                &self,
                cur: &mut crate::codec::CursorMut<'_>,
            ) -> crate::codec::CodecResult<()> {
                self.encode(cur)
            }

            fn decode_fields(
                &mut self,
                cur: &mut crate::codec::Cursor<'_>,
                factory: &crate::msg::MessageFactory,
            ) -> crate::codec::CodecResult<()> {
                self.decode(cur, factory)
            }

            fn as_any(&self) -> &dyn std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
                self
            }

            fn into_any(self: Box<Self>) -> Box<dyn std::any::Any> {
                self
            }
        }
    };
}

pub(crate) use impl_message_identity;
