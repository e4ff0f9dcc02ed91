// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Exchange steps: the unit of protocol work.
//!
//! A step either sends one typed message (serialize, derive topic,
//! publish) or receives one expected typed message (blocking receive,
//! deserialize). [`StepContext`] bundles what every step needs - the
//! codec, the topic router, one reusable scratch buffer, and the receive
//! timeout - so steps stay pure functions of their inputs and the buffer
//! is never shared mutable process state.

use crate::codec::MessageCodec;
use crate::msg::Message;
use crate::routing::TopicRouter;
use crate::transport::Transport;
use crate::Result;
use std::fmt;
use std::time::Duration;

/// How a step failure affects the surrounding script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criticality {
    /// Failure aborts the whole script.
    Fatal,
    /// Failure is logged and the script proceeds.
    Recoverable,
}

impl fmt::Display for Criticality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criticality::Fatal => write!(f, "fatal"),
            Criticality::Recoverable => write!(f, "recoverable"),
        }
    }
}

/// Shared state for a run of exchange steps.
///
/// The scratch buffer is logically owned by one step at a time and is
/// cleared/resized at the start of each use, so a whole script reuses one
/// allocation.
pub struct StepContext<'a> {
    codec: &'a MessageCodec<'a>,
    router: &'a TopicRouter,
    scratch: &'a mut Vec<u8>,
    recv_timeout: Option<Duration>,
}

impl<'a> StepContext<'a> {
    pub fn new(
        codec: &'a MessageCodec<'a>,
        router: &'a TopicRouter,
        scratch: &'a mut Vec<u8>,
    ) -> Self {
        Self {
            codec,
            router,
            scratch,
            recv_timeout: None,
        }
    }

    /// Bound every receive in this context; without one, a response that
    /// never arrives stalls the script forever.
    pub fn with_recv_timeout(mut self, timeout: Duration) -> Self {
        self.recv_timeout = Some(timeout);
        self
    }

    pub fn recv_timeout(&self) -> Option<Duration> {
        self.recv_timeout
    }

    pub fn router(&self) -> &TopicRouter {
        self.router
    }

    /// Send step: serialize `msg`, derive its topic, publish.
    ///
    /// A serialization failure returns before any publish call is made, so
    /// an encode bug never causes partial network I/O.
    pub fn send(&mut self, tx: &mut dyn Transport, msg: &dyn Message) -> Result<usize> {
        let type_name = msg.type_name();
        let written = match self.codec.serialize(msg, self.scratch) {
            Ok(n) => n,
            Err(e) => {
                log::error!("[EXCHANGE] failed to serialize {}: {}", type_name, e);
                return Err(e);
            }
        };

        let topic = self.router.topic_for(msg);
        if let Err(e) = tx.publish(&topic, &self.scratch[..written]) {
            log::error!("[EXCHANGE] failed to publish {}: {}", type_name, e);
            return Err(e);
        }

        log::info!(
            "[EXCHANGE] sent {} ({} bytes) on {}",
            type_name,
            written,
            topic
        );
        Ok(written)
    }

    /// Receive step: block for the next subscribed message, deserialize it
    /// into `msg`.
    ///
    /// On failure the contents of `msg` are unspecified and must not be
    /// read.
    pub fn receive(&mut self, rx: &mut dyn Transport, msg: &mut dyn Message) -> Result<usize> {
        let type_name = msg.type_name();
        let received = match rx.receive(self.scratch, self.recv_timeout) {
            Ok(received) => received,
            Err(e) => {
                log::error!("[EXCHANGE] failed to receive bytes for {}: {}", type_name, e);
                return Err(e);
            }
        };
        log::debug!(
            "[EXCHANGE] received {} bytes on {} for {}",
            received.len,
            received.topic,
            type_name
        );

        if let Err(e) = self.codec.deserialize(&self.scratch[..received.len], msg) {
            log::error!("[EXCHANGE] failed to deserialize {}: {}", type_name, e);
            return Err(e);
        }

        log::info!("[EXCHANGE] received {} ({} bytes)", type_name, received.len);
        Ok(received.len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msg::cmasi::{AirVehicleState, MissionCommand};
    use crate::msg::MessageFactory;
    use crate::transport::{ChannelOption, Direction, Received};
    use crate::Error;
    use std::collections::VecDeque;

    /// Records publishes and replays queued receives.
    #[derive(Default)]
    struct RecordingTransport {
        published: Vec<(String, Vec<u8>)>,
        inbound: VecDeque<(String, Vec<u8>)>,
    }

    impl Transport for RecordingTransport {
        fn configure(&mut self, _option: ChannelOption, _value: &str) -> Result<()> {
            Ok(())
        }
        fn open(&mut self, _direction: Direction) -> Result<()> {
            Ok(())
        }
        fn ready(&mut self, _wait: Duration) -> Result<()> {
            Ok(())
        }
        fn subscribe(&mut self, _topic: &str) -> Result<()> {
            Ok(())
        }
        fn resubscribe(&mut self) -> Result<()> {
            Ok(())
        }
        fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<()> {
            self.published.push((topic.to_string(), payload.to_vec()));
            Ok(())
        }
        fn receive(&mut self, buf: &mut Vec<u8>, _timeout: Option<Duration>) -> Result<Received> {
            let (topic, payload) = self.inbound.pop_front().ok_or(Error::ReceiveTimeout)?;
            buf.clear();
            buf.extend_from_slice(&payload);
            Ok(Received {
                topic,
                len: buf.len(),
            })
        }
        fn max_receive_size(&self) -> usize {
            64 * 1024
        }
    }

    #[test]
    fn send_publishes_on_derived_topic() {
        let factory = MessageFactory::cmasi();
        let codec = MessageCodec::new(&factory);
        let router = TopicRouter::default();
        let mut scratch = Vec::new();
        let mut ctx = StepContext::new(&codec, &router, &mut scratch);

        let mut tx = RecordingTransport::default();
        let msg = MissionCommand {
            command_id: 1,
            ..Default::default()
        };
        let written = ctx.send(&mut tx, &msg).expect("send");

        assert_eq!(tx.published.len(), 1);
        assert_eq!(tx.published[0].0, "afrl.cmasi.MissionCommand");
        assert_eq!(tx.published[0].1.len(), written);
    }

    #[test]
    fn encode_failure_skips_publish() {
        let factory = MessageFactory::cmasi();
        let codec = MessageCodec::new(&factory).with_max_message_size(4);
        let router = TopicRouter::default();
        let mut scratch = Vec::new();
        let mut ctx = StepContext::new(&codec, &router, &mut scratch);

        let mut tx = RecordingTransport::default();
        let err = ctx
            .send(&mut tx, &MissionCommand::default())
            .unwrap_err();
        assert!(matches!(err, Error::EncodeFailed { .. }), "got {:?}", err);
        assert!(tx.published.is_empty(), "publish attempted after encode failure");
    }

    #[test]
    fn receive_populates_expected_message() {
        let factory = MessageFactory::cmasi();
        let codec = MessageCodec::new(&factory);
        let router = TopicRouter::default();

        let sent = AirVehicleState {
            id: 400,
            airspeed: 25.0,
            ..Default::default()
        };
        let mut wire = Vec::new();
        codec.serialize(&sent, &mut wire).expect("serialize");

        let mut rx = RecordingTransport::default();
        rx.inbound
            .push_back(("afrl.cmasi.AirVehicleState".to_string(), wire));

        let mut scratch = Vec::new();
        let mut ctx = StepContext::new(&codec, &router, &mut scratch);
        let mut out = AirVehicleState::default();
        ctx.receive(&mut rx, &mut out).expect("receive");
        assert_eq!(out, sent);
    }

    #[test]
    fn receive_propagates_timeout() {
        let factory = MessageFactory::cmasi();
        let codec = MessageCodec::new(&factory);
        let router = TopicRouter::default();
        let mut scratch = Vec::new();
        let mut ctx = StepContext::new(&codec, &router, &mut scratch)
            .with_recv_timeout(Duration::from_millis(10));

        let mut rx = RecordingTransport::default();
        let mut out = AirVehicleState::default();
        let err = ctx.receive(&mut rx, &mut out).unwrap_err();
        assert!(matches!(err, Error::ReceiveTimeout), "got {:?}", err);
    }
}
