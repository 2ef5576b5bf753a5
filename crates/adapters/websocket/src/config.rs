//! WebSocket transport configuration.

use std::time::Duration;

use serde::Deserialize;

/// Default cap on one inbound message.
pub const DEFAULT_MAX_FRAME_BYTES: usize = 16 * 1024;

/// Default number of outbound frames queued for the link task.
pub const DEFAULT_SEND_QUEUE_CAPACITY: usize = 64;

/// Where the hub's WebSocket endpoint lives and how hard to try reaching it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WsConfig {
    /// Hub hostname or IP address.
    pub host: String,
    /// Hub port.
    pub port: u16,
    /// Request path of the endpoint.
    pub path: String,
    /// Use `wss://` instead of `ws://`.
    pub tls: bool,
    /// Pause between a dropped link (or failed attempt) and the next attempt, in seconds.
    pub reconnect_delay_secs: u64,
    /// Upper bound for a single connect attempt, handshake included, in seconds.
    pub connect_timeout_secs: u64,
    /// Longest inbound message accepted; a longer one drops the link.
    pub max_frame_bytes: usize,
    /// Outbound frames that may wait for the socket before sends are refused.
    pub send_queue_capacity: usize,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            path: "/".to_string(),
            tls: false,
            reconnect_delay_secs: 5,
            connect_timeout_secs: 10,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
            send_queue_capacity: DEFAULT_SEND_QUEUE_CAPACITY,
        }
    }
}

impl WsConfig {
    /// Return the URL to dial.
    #[must_use]
    pub fn url(&self) -> String {
        let scheme = if self.tls { "wss" } else { "ws" };
        let slash = if self.path.starts_with('/') { "" } else { "/" };
        format!("{scheme}://{}:{}{slash}{}", self.host, self.port, self.path)
    }

    #[must_use]
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
