//! TCP transport configuration.

use std::time::Duration;

use serde::Deserialize;

/// Default cap on one inbound line, terminator excluded.
pub const DEFAULT_MAX_FRAME_BYTES: usize = 16 * 1024;

/// Default number of outbound frames queued for the link task.
pub const DEFAULT_SEND_QUEUE_CAPACITY: usize = 64;

/// Where the hub listens and how hard to try reaching it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TcpConfig {
    /// Hub hostname or IP address.
    pub host: String,
    /// Hub TCP port.
    pub port: u16,
    /// Pause between a dropped link (or failed attempt) and the next attempt, in seconds.
    pub reconnect_delay_secs: u64,
    /// Upper bound for a single connect attempt, in seconds.
    pub connect_timeout_secs: u64,
    /// Longest inbound line accepted; a longer one drops the link.
    pub max_frame_bytes: usize,
    /// Outbound frames that may wait for the socket before sends are refused.
    pub send_queue_capacity: usize,
}

impl Default for TcpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            reconnect_delay_secs: 5,
            connect_timeout_secs: 10,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
            send_queue_capacity: DEFAULT_SEND_QUEUE_CAPACITY,
        }
    }
}

impl TcpConfig {
    /// Return the `host:port` address to dial.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_have_sensible_defaults() {
        let config = TcpConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.reconnect_delay(), Duration::from_secs(5));
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.max_frame_bytes, 16 * 1024);
        assert_eq!(config.send_queue_capacity, 64);
    }

    #[test]
    fn should_deserialize_from_toml() {
        let toml = r#"
            host = "hub.local"
            port = 9000
            reconnect_delay_secs = 1
            connect_timeout_secs = 3
            max_frame_bytes = 2048
            send_queue_capacity = 8
        "#;
        let config: TcpConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.address(), "hub.local:9000");
        assert_eq!(config.reconnect_delay_secs, 1);
        assert_eq!(config.connect_timeout_secs, 3);
        assert_eq!(config.max_frame_bytes, 2048);
        assert_eq!(config.send_queue_capacity, 8);
    }

    #[test]
    fn should_use_defaults_for_missing_fields() {
        let config: TcpConfig = toml::from_str("port = 7000").unwrap();
        assert_eq!(config.address(), "127.0.0.1:7000");
        assert_eq!(config.reconnect_delay_secs, 5);
    }
}
