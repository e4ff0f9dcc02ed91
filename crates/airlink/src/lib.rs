// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # Airlink - ground-control mission link
//!
//! Directs an autonomous air vehicle through a scripted mission by
//! exchanging typed command/telemetry messages over a publish/subscribe
//! transport. The crate is the message-exchange protocol: typed message
//! serialization, name-derived topic routing, directional channels, and
//! linear mission sequencing with per-step failure policy.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use airlink::codec::MessageCodec;
//! use airlink::exchange::StepContext;
//! use airlink::mission::{MissionScript, RunPolicy};
//! use airlink::msg::cmasi::{AirVehicleState, MissionCommand};
//! use airlink::msg::MessageFactory;
//! use airlink::routing::TopicRouter;
//! use airlink::transport::{ChannelOption, Direction, TcpChannel, Transport};
//! use std::time::Duration;
//!
//! fn main() -> airlink::Result<()> {
//!     let factory = MessageFactory::cmasi();
//!     let codec = MessageCodec::new(&factory);
//!     let router = TopicRouter::default();
//!
//!     let mut tx = TcpChannel::new();
//!     tx.configure(ChannelOption::PublishAddress, "127.0.0.1")?;
//!     tx.open(Direction::Write)?;
//!     let mut rx = TcpChannel::new();
//!     rx.open(Direction::Read)?;
//!     rx.subscribe(&router.topic_for_type::<AirVehicleState>())?;
//!     rx.ready(Duration::from_secs(2))?;
//!
//!     let mut scratch = Vec::new();
//!     let mut ctx = StepContext::new(&codec, &router, &mut scratch)
//!         .with_recv_timeout(Duration::from_secs(5));
//!     let mut script = MissionScript::builder()
//!         .phase("navigate")
//!         .send(MissionCommand::default())
//!         .expect::<AirVehicleState>()
//!         .build();
//!     let report = script.run(&mut ctx, &mut tx, &mut rx, &RunPolicy::default());
//!     std::process::exit(if report.succeeded() { 0 } else { 1 });
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +------------------------------------------------------------------+
//! |                        Mission Script                            |
//! |       ordered phases of send/expect steps, failure policy        |
//! +------------------------------------------------------------------+
//! |                        Exchange Step                             |
//! |   serialize -> topic -> publish   |   receive -> deserialize     |
//! +------------------------------------------------------------------+
//! |    Message Codec     |  Topic Router  |      Channel Pair        |
//! |  typed <-> wire via  |  namespace +   |  configure/open/sub/     |
//! |  the type Factory    |  type name     |  publish/receive         |
//! +------------------------------------------------------------------+
//! |                  Transport (TCP frames, loopback)                |
//! +------------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`mission::MissionScript`] | Ordered phases of exchange steps |
//! | [`exchange::StepContext`] | Codec + router + scratch buffer for a run |
//! | [`codec::MessageCodec`] | Typed message serializer/deserializer |
//! | [`msg::MessageFactory`] | Type-name -> constructor registry |
//! | [`routing::TopicRouter`] | `namespace.TypeName` topic derivation |
//! | [`transport::TcpChannel`] | Directional framed TCP endpoint |
//!
//! The whole stack is single-threaded, synchronous, and blocking; the one
//! concurrency-relevant behavior - the blocking receive - carries an
//! explicit timeout so a lost response surfaces as
//! [`Error::ReceiveTimeout`] instead of stalling the process.

/// Message codec (wire header, object encoding, cursors).
pub mod codec;
/// Endpoint configuration (defaults, environment overlay).
pub mod config;
/// Exchange steps (send/receive units, criticality, step context).
pub mod exchange;
/// Mission scripts (phases, sequencing, failure policy, run reports).
pub mod mission;
/// Typed messages, the CMASI set, and the type factory.
pub mod msg;
/// Topic derivation from message type identity.
pub mod routing;
/// Directional transport channels (TCP, in-process loopback).
pub mod transport;

pub use codec::MessageCodec;
pub use config::StationConfig;
pub use exchange::{Criticality, StepContext};
pub use mission::{MissionScript, RunPolicy, ScriptReport, ScriptStatus};
pub use msg::{Message, MessageFactory, MessageType};
pub use routing::TopicRouter;
pub use transport::{ChannelOption, Direction, TcpChannel, Transport};

use std::fmt;

/// Errors returned by airlink operations.
#[derive(Debug)]
pub enum Error {
    // ========================================================================
    // Configuration
    // ========================================================================
    /// Malformed configuration input (bad option value).
    Config(String),

    // ========================================================================
    // Channel
    // ========================================================================
    /// Operation violates the channel lifecycle (configure after open,
    /// publish on a read channel, ...).
    InvalidState(String),
    /// Transport endpoint could not be opened. Fatal: an unopened channel
    /// can do no useful work.
    OpenFailed(String),
    /// Transport connection not established within the readiness wait.
    NotReady(String),
    /// I/O error with underlying cause.
    IoError(std::io::Error),
    /// Subscription registration failed.
    SubscribeFailed(String),
    /// Best-effort publish failed; the caller decides severity.
    PublishFailed(String),
    /// No message arrived within the receive timeout.
    ReceiveTimeout,
    /// Receive failed for a reason other than timing out.
    ReceiveFailed(String),

    // ========================================================================
    // Codec
    // ========================================================================
    /// Message violated its type's encoding contract (caller bug, not
    /// transient).
    EncodeFailed { type_name: String, reason: String },
    /// Wire bytes could not populate the expected message.
    DecodeFailed { type_name: String, reason: String },
    /// Wire carried a different type than the step expected.
    TypeMismatch { expected: String, actual: String },
    /// A type name on the wire is not registered in the factory.
    UnknownType(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Configuration
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            // Channel
            Error::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            Error::OpenFailed(msg) => write!(f, "Open failed: {}", msg),
            Error::NotReady(msg) => write!(f, "Transport not ready: {}", msg),
            Error::IoError(e) => write!(f, "I/O error: {}", e),
            Error::SubscribeFailed(msg) => write!(f, "Subscribe failed: {}", msg),
            Error::PublishFailed(msg) => write!(f, "Publish failed: {}", msg),
            Error::ReceiveTimeout => write!(f, "Receive timed out"),
            Error::ReceiveFailed(msg) => write!(f, "Receive failed: {}", msg),
            // Codec
            Error::EncodeFailed { type_name, reason } => {
                write!(f, "Failed to serialize {}: {}", type_name, reason)
            }
            Error::DecodeFailed { type_name, reason } => {
                write!(f, "Failed to deserialize {}: {}", type_name, reason)
            }
            Error::TypeMismatch { expected, actual } => {
                write!(f, "Type mismatch: expected {}, got {}", expected, actual)
            }
            Error::UnknownType(name) => {
                write!(f, "Type {} not registered in factory", name)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::IoError(e)
    }
}

/// Convenience alias used across the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Airlink version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
