// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Directional transport channels.
//!
//! A channel is one transport endpoint bound to an address, a port, and a
//! direction (write-only or read-only). The lifecycle is strict:
//!
//! 1. `configure` endpoint options (rejected once open),
//! 2. `open` with a direction, exactly once,
//! 3. read channels `subscribe` to every topic of interest,
//! 4. `ready` confirms the connection is established (replacing any
//!    sleep-and-hope settling delay),
//! 5. `publish` / `receive`.
//!
//! Two implementations ship: [`TcpChannel`] speaks the length-prefix frame
//! protocol to a broker over TCP, [`LoopbackChannel`] runs against an
//! in-process bus for tests and demos.

pub mod frame;
pub mod loopback;
pub mod tcp;

pub use frame::{Frame, FrameKind, DEFAULT_MAX_FRAME_SIZE, FRAME_HEADER_SIZE};
pub use loopback::{LoopbackBus, LoopbackChannel};
pub use tcp::TcpChannel;

use crate::Result;
use std::fmt;
use std::time::Duration;

/// Channel direction, fixed at open time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Publish-only endpoint.
    Write,
    /// Subscribe/receive-only endpoint.
    Read,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Write => write!(f, "write"),
            Direction::Read => write!(f, "read"),
        }
    }
}

/// Endpoint options settable before open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOption {
    SubscribeAddress,
    SubscribePort,
    PublishAddress,
    PublishPort,
}

impl fmt::Display for ChannelOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelOption::SubscribeAddress => write!(f, "SubscribeAddress"),
            ChannelOption::SubscribePort => write!(f, "SubscribePort"),
            ChannelOption::PublishAddress => write!(f, "PublishAddress"),
            ChannelOption::PublishPort => write!(f, "PublishPort"),
        }
    }
}

/// Outcome of a successful receive: which topic the bytes arrived on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Received {
    pub topic: String,
    pub len: usize,
}

/// One directional transport endpoint.
///
/// Object-safe so exchange steps and the mission script can drive any
/// implementation.
pub trait Transport {
    /// Set an endpoint option. `InvalidState` once the channel is open.
    fn configure(&mut self, option: ChannelOption, value: &str) -> Result<()>;

    /// Bind/connect the endpoint. Must be called exactly once;
    /// `OpenFailed` is fatal to the caller (an unopened channel can do no
    /// useful work).
    fn open(&mut self, direction: Direction) -> Result<()>;

    /// Explicit readiness check: returns once the transport connection is
    /// established, or `NotReady` after waiting up to `wait`.
    fn ready(&mut self, wait: Duration) -> Result<()>;

    /// Register interest in a topic. Read channels only, after open,
    /// additive across calls.
    fn subscribe(&mut self, topic: &str) -> Result<()>;

    /// Replay every prior subscription (channel re-validation hook).
    fn resubscribe(&mut self) -> Result<()>;

    /// Best-effort send of `payload` on `topic`. Failure is reported, the
    /// caller decides severity.
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<()>;

    /// Block until a subscribed message arrives or `timeout` elapses.
    ///
    /// The buffer is cleared and sized to the actual byte count received.
    /// `None` blocks indefinitely; prefer an explicit timeout so a lost
    /// response yields `ReceiveTimeout` instead of a stalled process.
    fn receive(&mut self, buf: &mut Vec<u8>, timeout: Option<Duration>) -> Result<Received>;

    /// Largest payload this channel will accept on receive.
    fn max_receive_size(&self) -> usize;
}
