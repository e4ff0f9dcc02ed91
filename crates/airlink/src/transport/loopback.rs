// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! In-process loopback transport.
//!
//! A [`LoopbackBus`] routes published frames directly to subscribed read
//! channels in the same process, with no sockets involved. Used by the
//! integration tests and the station's `--loopback` demo mode, where a
//! simulated vehicle answers from another thread.
//!
//! Channels follow the same configure -> open -> subscribe lifecycle as
//! [`TcpChannel`](super::TcpChannel); endpoint options are accepted and
//! ignored since addresses mean nothing in-process.

use super::{ChannelOption, Direction, Received, Transport};
use crate::{Error, Result};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default maximum receive payload (64 KB), matching the TCP channel.
pub const DEFAULT_MAX_RECEIVE_SIZE: usize = 64 * 1024;

#[derive(Default)]
struct SubscriberState {
    topics: Vec<String>,
    queue: VecDeque<(String, Vec<u8>)>,
}

#[derive(Default)]
struct BusState {
    subscribers: Vec<SubscriberState>,
}

struct BusInner {
    state: Mutex<BusState>,
    arrived: Condvar,
}

/// Shared in-process message bus. Cheap to clone; all clones route to the
/// same subscribers.
#[derive(Clone)]
pub struct LoopbackBus {
    inner: Arc<BusInner>,
}

impl LoopbackBus {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BusInner {
                state: Mutex::new(BusState::default()),
                arrived: Condvar::new(),
            }),
        }
    }

    /// A fresh unopened channel on this bus.
    pub fn channel(&self) -> LoopbackChannel {
        LoopbackChannel {
            bus: self.clone(),
            state: ChannelState::Closed,
            subscriptions: Vec::new(),
            max_receive_size: DEFAULT_MAX_RECEIVE_SIZE,
        }
    }

    fn register_subscriber(&self) -> usize {
        let mut state = self.inner.state.lock();
        state.subscribers.push(SubscriberState::default());
        state.subscribers.len() - 1
    }

    fn add_subscription(&self, subscriber: usize, topic: &str) {
        let mut state = self.inner.state.lock();
        let topics = &mut state.subscribers[subscriber].topics;
        if !topics.iter().any(|t| t == topic) {
            topics.push(topic.to_string());
        }
    }

    fn publish(&self, topic: &str, payload: &[u8]) {
        let mut state = self.inner.state.lock();
        let mut delivered = 0usize;
        for subscriber in &mut state.subscribers {
            if subscriber.topics.iter().any(|t| t == topic) {
                subscriber
                    .queue
                    .push_back((topic.to_string(), payload.to_vec()));
                delivered += 1;
            }
        }
        drop(state);
        if delivered > 0 {
            self.inner.arrived.notify_all();
        }
        log::debug!(
            "[LOOPBACK] {} bytes on {} -> {} subscriber(s)",
            payload.len(),
            topic,
            delivered
        );
    }

    fn pop(
        &self,
        subscriber: usize,
        timeout: Option<Duration>,
    ) -> Option<(String, Vec<u8>)> {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut state = self.inner.state.lock();
        loop {
            if let Some(item) = state.subscribers[subscriber].queue.pop_front() {
                return Some(item);
            }
            match deadline {
                Some(deadline) => {
                    if Instant::now() >= deadline {
                        return None;
                    }
                    self.inner.arrived.wait_until(&mut state, deadline);
                }
                None => self.inner.arrived.wait(&mut state),
            }
        }
    }
}

impl Default for LoopbackBus {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy)]
enum ChannelState {
    Closed,
    Open {
        direction: Direction,
        subscriber: Option<usize>,
    },
}

/// One directional endpoint on a [`LoopbackBus`].
pub struct LoopbackChannel {
    bus: LoopbackBus,
    state: ChannelState,
    subscriptions: Vec<String>,
    max_receive_size: usize,
}

impl Transport for LoopbackChannel {
    fn configure(&mut self, option: ChannelOption, _value: &str) -> Result<()> {
        if let ChannelState::Open { .. } = self.state {
            return Err(Error::InvalidState(format!(
                "cannot configure {} after open",
                option
            )));
        }
        Ok(())
    }

    fn open(&mut self, direction: Direction) -> Result<()> {
        if let ChannelState::Open { .. } = self.state {
            return Err(Error::InvalidState("channel already open".into()));
        }
        let subscriber = match direction {
            Direction::Read => Some(self.bus.register_subscriber()),
            Direction::Write => None,
        };
        log::info!("[LOOPBACK] opened {} channel", direction);
        self.state = ChannelState::Open {
            direction,
            subscriber,
        };
        Ok(())
    }

    fn ready(&mut self, _wait: Duration) -> Result<()> {
        match self.state {
            ChannelState::Open { .. } => Ok(()),
            ChannelState::Closed => Err(Error::InvalidState("ready on unopened channel".into())),
        }
    }

    fn subscribe(&mut self, topic: &str) -> Result<()> {
        let ChannelState::Open {
            direction: Direction::Read,
            subscriber: Some(subscriber),
        } = self.state
        else {
            return Err(Error::InvalidState(
                "subscribe requires an open read channel".into(),
            ));
        };
        self.bus.add_subscription(subscriber, topic);
        self.subscriptions.push(topic.to_string());
        log::info!("[LOOPBACK] subscribed to {}", topic);
        Ok(())
    }

    fn resubscribe(&mut self) -> Result<()> {
        let ChannelState::Open {
            direction: Direction::Read,
            subscriber: Some(subscriber),
        } = self.state
        else {
            return Err(Error::InvalidState(
                "resubscribe requires an open read channel".into(),
            ));
        };
        for topic in &self.subscriptions {
            self.bus.add_subscription(subscriber, topic);
        }
        log::info!(
            "[LOOPBACK] replayed {} subscription(s)",
            self.subscriptions.len()
        );
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<()> {
        let ChannelState::Open {
            direction: Direction::Write,
            ..
        } = self.state
        else {
            return Err(Error::InvalidState(
                "publish requires an open write channel".into(),
            ));
        };
        self.bus.publish(topic, payload);
        Ok(())
    }

    fn receive(&mut self, buf: &mut Vec<u8>, timeout: Option<Duration>) -> Result<Received> {
        let ChannelState::Open {
            direction: Direction::Read,
            subscriber: Some(subscriber),
        } = self.state
        else {
            return Err(Error::InvalidState(
                "receive requires an open read channel".into(),
            ));
        };
        let (topic, payload) = self
            .bus
            .pop(subscriber, timeout)
            .ok_or(Error::ReceiveTimeout)?;
        if payload.len() > self.max_receive_size {
            return Err(Error::ReceiveFailed(format!(
                "payload of {} bytes exceeds max {}",
                payload.len(),
                self.max_receive_size
            )));
        }
        buf.clear();
        buf.extend_from_slice(&payload);
        log::debug!("[LOOPBACK] received {} bytes on {}", buf.len(), topic);
        Ok(Received {
            topic,
            len: buf.len(),
        })
    }

    fn max_receive_size(&self) -> usize {
        self.max_receive_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn publish_reaches_subscribed_channel() {
        let bus = LoopbackBus::new();
        let mut tx = bus.channel();
        let mut rx = bus.channel();

        tx.open(Direction::Write).expect("open tx");
        rx.open(Direction::Read).expect("open rx");
        rx.subscribe("afrl.cmasi.AirVehicleState").expect("subscribe");

        tx.publish("afrl.cmasi.AirVehicleState", b"state")
            .expect("publish");
        tx.publish("afrl.cmasi.CameraState", b"ignored")
            .expect("publish");

        let mut buf = Vec::new();
        let received = rx
            .receive(&mut buf, Some(Duration::from_millis(100)))
            .expect("receive");
        assert_eq!(received.topic, "afrl.cmasi.AirVehicleState");
        assert_eq!(buf, b"state");

        // The unsubscribed topic was never queued.
        assert!(matches!(
            rx.receive(&mut buf, Some(Duration::from_millis(20))),
            Err(Error::ReceiveTimeout)
        ));
    }

    #[test]
    fn receive_blocks_until_cross_thread_publish() {
        let bus = LoopbackBus::new();
        let mut tx = bus.channel();
        let mut rx = bus.channel();
        tx.open(Direction::Write).expect("open tx");
        rx.open(Direction::Read).expect("open rx");
        rx.subscribe("t").expect("subscribe");

        let publisher = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            tx.publish("t", b"late").expect("publish");
        });

        let mut buf = Vec::new();
        let received = rx
            .receive(&mut buf, Some(Duration::from_secs(2)))
            .expect("receive");
        assert_eq!(received.len, 4);
        publisher.join().expect("join");
    }

    #[test]
    fn lifecycle_violations_are_invalid_state() {
        let bus = LoopbackBus::new();
        let mut channel = bus.channel();

        assert!(matches!(
            channel.ready(Duration::ZERO),
            Err(Error::InvalidState(_))
        ));

        channel.open(Direction::Write).expect("open");
        assert!(matches!(
            channel.configure(ChannelOption::PublishPort, "6667"),
            Err(Error::InvalidState(_))
        ));
        assert!(matches!(
            channel.open(Direction::Write),
            Err(Error::InvalidState(_))
        ));
        assert!(matches!(
            channel.subscribe("t"),
            Err(Error::InvalidState(_))
        ));
        let mut buf = Vec::new();
        assert!(matches!(
            channel.receive(&mut buf, None),
            Err(Error::InvalidState(_))
        ));
    }
}
