// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! TCP channel speaking the frame protocol to a pub/sub broker.
//!
//! A write channel connects to the broker's publish endpoint and sends
//! data frames; a read channel connects to the subscribe endpoint,
//! registers its topics with subscription frames, then receives data
//! frames filtered to those topics. Connect is synchronous, so a
//! successfully opened channel is already connected - `ready` only
//! verifies the socket is still healthy.

use super::frame::{self, FrameKind};
use super::{ChannelOption, Direction, Received, Transport};
use crate::{Error, Result};
use socket2::{Domain, Protocol, Socket, Type};
use std::io::Write;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Default broker connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default maximum receive payload (64 KB).
pub const DEFAULT_MAX_RECEIVE_SIZE: usize = 64 * 1024;

enum State {
    Closed,
    Open {
        stream: TcpStream,
        direction: Direction,
    },
}

/// One directional TCP endpoint toward the broker.
pub struct TcpChannel {
    subscribe_addr: String,
    subscribe_port: u16,
    publish_addr: String,
    publish_port: u16,
    connect_timeout: Duration,
    max_receive_size: usize,
    subscriptions: Vec<String>,
    state: State,
}

impl TcpChannel {
    pub fn new() -> Self {
        Self {
            subscribe_addr: "127.0.0.1".to_string(),
            subscribe_port: crate::config::DEFAULT_SUBSCRIBE_PORT,
            publish_addr: "127.0.0.1".to_string(),
            publish_port: crate::config::DEFAULT_PUBLISH_PORT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            max_receive_size: DEFAULT_MAX_RECEIVE_SIZE,
            subscriptions: Vec::new(),
            state: State::Closed,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    fn connect(&self, addr: &str, port: u16) -> Result<TcpStream> {
        let target = format!("{}:{}", addr, port);
        let resolved: Vec<SocketAddr> = target
            .to_socket_addrs()
            .map_err(|e| Error::OpenFailed(format!("cannot resolve {}: {}", target, e)))?
            .collect();
        let sock_addr = resolved
            .first()
            .ok_or_else(|| Error::OpenFailed(format!("no address for {}", target)))?;

        let socket = Socket::new(
            Domain::for_address(*sock_addr),
            Type::STREAM,
            Some(Protocol::TCP),
        )
        .map_err(Error::IoError)?;
        socket.set_nodelay(true).map_err(Error::IoError)?;
        socket
            .connect_timeout(&(*sock_addr).into(), self.connect_timeout)
            .map_err(|e| Error::OpenFailed(format!("connect to {} failed: {}", target, e)))?;

        log::debug!("[TCP] connected to {}", target);
        Ok(socket.into())
    }
}

impl Default for TcpChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for TcpChannel {
    fn configure(&mut self, option: ChannelOption, value: &str) -> Result<()> {
        if let State::Open { .. } = self.state {
            return Err(Error::InvalidState(format!(
                "cannot configure {} after open",
                option
            )));
        }
        let parse_port = |value: &str| {
            value
                .parse::<u16>()
                .map_err(|e| Error::Config(format!("invalid port '{}': {}", value, e)))
        };
        match option {
            ChannelOption::SubscribeAddress => self.subscribe_addr = value.to_string(),
            ChannelOption::SubscribePort => self.subscribe_port = parse_port(value)?,
            ChannelOption::PublishAddress => self.publish_addr = value.to_string(),
            ChannelOption::PublishPort => self.publish_port = parse_port(value)?,
        }
        Ok(())
    }

    fn open(&mut self, direction: Direction) -> Result<()> {
        if let State::Open { .. } = self.state {
            return Err(Error::InvalidState("channel already open".into()));
        }
        let stream = match direction {
            Direction::Write => self.connect(&self.publish_addr, self.publish_port)?,
            Direction::Read => self.connect(&self.subscribe_addr, self.subscribe_port)?,
        };
        log::info!("[TCP] opened {} channel", direction);
        self.state = State::Open { stream, direction };
        Ok(())
    }

    fn ready(&mut self, _wait: Duration) -> Result<()> {
        let State::Open { stream, .. } = &self.state else {
            return Err(Error::InvalidState("ready on unopened channel".into()));
        };
        match stream.take_error() {
            Ok(None) => Ok(()),
            Ok(Some(e)) => Err(Error::NotReady(e.to_string())),
            Err(e) => Err(Error::NotReady(e.to_string())),
        }
    }

    fn subscribe(&mut self, topic: &str) -> Result<()> {
        let State::Open { stream, direction } = &mut self.state else {
            return Err(Error::InvalidState("subscribe before open".into()));
        };
        if *direction != Direction::Read {
            return Err(Error::InvalidState(
                "subscribe on a write channel".into(),
            ));
        }
        let encoded = frame::encode(FrameKind::Subscribe, topic, &[])
            .map_err(|e| Error::SubscribeFailed(e.to_string()))?;
        stream
            .write_all(&encoded)
            .map_err(|e| Error::SubscribeFailed(e.to_string()))?;
        self.subscriptions.push(topic.to_string());
        log::info!("[TCP] subscribed to {}", topic);
        Ok(())
    }

    fn resubscribe(&mut self) -> Result<()> {
        let State::Open { stream, direction } = &mut self.state else {
            return Err(Error::InvalidState("resubscribe before open".into()));
        };
        if *direction != Direction::Read {
            return Err(Error::InvalidState(
                "resubscribe on a write channel".into(),
            ));
        }
        for topic in &self.subscriptions {
            let encoded = frame::encode(FrameKind::Subscribe, topic, &[])
                .map_err(|e| Error::SubscribeFailed(e.to_string()))?;
            stream
                .write_all(&encoded)
                .map_err(|e| Error::SubscribeFailed(e.to_string()))?;
        }
        log::info!(
            "[TCP] replayed {} subscription(s)",
            self.subscriptions.len()
        );
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<()> {
        let State::Open { stream, direction } = &mut self.state else {
            return Err(Error::InvalidState("publish before open".into()));
        };
        if *direction != Direction::Write {
            return Err(Error::InvalidState("publish on a read channel".into()));
        }
        let encoded = frame::encode(FrameKind::Data, topic, payload)
            .map_err(|e| Error::PublishFailed(e.to_string()))?;
        stream
            .write_all(&encoded)
            .map_err(|e| Error::PublishFailed(e.to_string()))?;
        log::debug!("[TCP] published {} bytes on {}", payload.len(), topic);
        Ok(())
    }

    fn receive(&mut self, buf: &mut Vec<u8>, timeout: Option<Duration>) -> Result<Received> {
        let max_size = self.max_receive_size;
        let State::Open { stream, direction } = &mut self.state else {
            return Err(Error::InvalidState("receive before open".into()));
        };
        if *direction != Direction::Read {
            return Err(Error::InvalidState("receive on a write channel".into()));
        }
        stream.set_read_timeout(timeout).map_err(Error::IoError)?;

        // Frame bodies carry kind + topic on top of the payload; allow a
        // little headroom so a max-size payload still fits.
        let frame_cap = max_size + 1024;
        loop {
            let frame = match frame::read_frame(stream, frame_cap) {
                Ok(frame) => frame,
                Err(e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    return Err(Error::ReceiveTimeout);
                }
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    return Err(Error::ReceiveFailed("connection closed by broker".into()));
                }
                Err(e) => return Err(Error::ReceiveFailed(e.to_string())),
            };
            if frame.kind != FrameKind::Data {
                log::debug!("[TCP] ignoring non-data frame on {}", frame.topic);
                continue;
            }
            if !self.subscriptions.iter().any(|t| t == &frame.topic) {
                log::debug!("[TCP] dropping frame for unsubscribed {}", frame.topic);
                continue;
            }
            if frame.payload.len() > max_size {
                return Err(Error::ReceiveFailed(format!(
                    "payload of {} bytes exceeds max {}",
                    frame.payload.len(),
                    max_size
                )));
            }
            buf.clear();
            buf.extend_from_slice(&frame.payload);
            log::debug!("[TCP] received {} bytes on {}", buf.len(), frame.topic);
            return Ok(Received {
                topic: frame.topic,
                len: buf.len(),
            });
        }
    }

    fn max_receive_size(&self) -> usize {
        self.max_receive_size
    }
}
