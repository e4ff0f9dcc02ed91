// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Station configuration.
//!
//! Resolution precedence: command-line arguments override environment
//! variables override built-in defaults. The environment layer lives here;
//! CLI overrides are applied by the binary on top of [`StationConfig::from_env`].
//!
//! Malformed environment input is a recoverable condition: it is reported
//! via a warning and the defaults are retained, never escalated into a
//! startup failure.

use std::time::Duration;

/// Broker address default.
pub const DEFAULT_ADDRESS: &str = "127.0.0.1";
/// Default broker publish port.
pub const DEFAULT_PUBLISH_PORT: u16 = 6667;
/// Default broker subscribe port.
pub const DEFAULT_SUBSCRIBE_PORT: u16 = 6668;
/// Default bound on a blocking receive.
pub const DEFAULT_RECV_TIMEOUT: Duration = Duration::from_secs(5);
/// Default bound on the post-open readiness check.
pub const DEFAULT_READY_WAIT: Duration = Duration::from_secs(2);

/// Broker hostname/IP.
pub const ENV_HOSTNAME: &str = "AIRLINK_TRANSPORT_HOSTNAME";
/// Port pair of the form `"<pub>,<sub>"`.
pub const ENV_PORTS: &str = "AIRLINK_TRANSPORT_PORTS";
/// Receive timeout override, milliseconds.
pub const ENV_RECV_TIMEOUT_MS: &str = "AIRLINK_RECV_TIMEOUT_MS";

/// Resolved endpoint configuration for one station process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationConfig {
    pub address: String,
    pub publish_port: u16,
    pub subscribe_port: u16,
    pub recv_timeout: Duration,
    pub ready_wait: Duration,
    pub namespace: String,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            publish_port: DEFAULT_PUBLISH_PORT,
            subscribe_port: DEFAULT_SUBSCRIBE_PORT,
            recv_timeout: DEFAULT_RECV_TIMEOUT,
            ready_wait: DEFAULT_READY_WAIT,
            namespace: crate::routing::DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl StationConfig {
    /// Defaults overlaid with whatever the process environment provides.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Overlay from an environment-shaped lookup. Factored out of
    /// [`from_env`](Self::from_env) so resolution is testable without
    /// touching process-wide state.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(address) = lookup(ENV_HOSTNAME) {
            self.address = address;
        }
        if let Some(ports) = lookup(ENV_PORTS) {
            self.apply_ports_spec(&ports);
        }
        if let Some(ms) = lookup(ENV_RECV_TIMEOUT_MS) {
            match ms.parse::<u64>() {
                Ok(ms) => self.recv_timeout = Duration::from_millis(ms),
                Err(_) => log::warn!(
                    "[CONFIG] ignoring unparsable {} value '{}'",
                    ENV_RECV_TIMEOUT_MS,
                    ms
                ),
            }
        }
    }

    /// Apply a `"<pub>,<sub>"` port pair. Malformed input (missing comma,
    /// unparsable numbers) is warned about and both ports keep their
    /// current values.
    pub fn apply_ports_spec(&mut self, spec: &str) {
        let Some((pub_part, sub_part)) = spec.split_once(',') else {
            log::warn!(
                "[CONFIG] unexpected lack of comma in {} value '{}', keeping defaults",
                ENV_PORTS,
                spec
            );
            return;
        };
        match (
            pub_part.trim().parse::<u16>(),
            sub_part.trim().parse::<u16>(),
        ) {
            (Ok(publish), Ok(subscribe)) => {
                self.publish_port = publish;
                self.subscribe_port = subscribe;
            }
            _ => {
                log::warn!(
                    "[CONFIG] unparsable port pair in {} value '{}', keeping defaults",
                    ENV_PORTS,
                    spec
                );
            }
        }
    }
}
