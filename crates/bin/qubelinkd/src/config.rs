//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `qubelink.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use qubelink_adapter_tcp::TcpConfig;
use qubelink_adapter_virtual::VirtualConfig;
use qubelink_adapter_websocket::WsConfig;
use qubelink_app::protocol::{DEFAULT_MAX_MESSAGE_BYTES, MIN_MESSAGE_BYTES};
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the hub listens.
    pub hub: HubConfig,
    /// Engine tuning.
    pub engine: EngineSettings,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Integration toggles.
    pub integrations: IntegrationsConfig,
}

/// Which transport adapter carries the envelopes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HubTransport {
    /// WebSocket text messages, `ws://` or `wss://`.
    #[default]
    Websocket,
    /// One envelope per line over plain TCP.
    Tcp,
}

impl std::str::FromStr for HubTransport {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "websocket" | "ws" => Ok(Self::Websocket),
            "tcp" => Ok(Self::Tcp),
            other => Err(ConfigError::Validation(format!(
                "unknown hub transport `{other}`, expected `websocket` or `tcp`"
            ))),
        }
    }
}

/// Hub endpoint, shared by both transports.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    pub transport: HubTransport,
    pub host: String,
    pub port: u16,
    /// WebSocket request path; ignored by the TCP transport.
    pub path: String,
    /// Dial `wss://`; ignored by the TCP transport.
    pub tls: bool,
    pub reconnect_delay_secs: u64,
    pub connect_timeout_secs: u64,
    /// Longest inbound frame accepted before the link is dropped.
    pub max_frame_bytes: usize,
    pub send_queue_capacity: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        let ws = WsConfig::default();
        Self {
            transport: HubTransport::default(),
            host: ws.host,
            port: ws.port,
            path: ws.path,
            tls: ws.tls,
            reconnect_delay_secs: ws.reconnect_delay_secs,
            connect_timeout_secs: ws.connect_timeout_secs,
            max_frame_bytes: ws.max_frame_bytes,
            send_queue_capacity: ws.send_queue_capacity,
        }
    }
}

impl HubConfig {
    /// Settings handed to the WebSocket transport.
    #[must_use]
    pub fn websocket(&self) -> WsConfig {
        WsConfig {
            host: self.host.clone(),
            port: self.port,
            path: self.path.clone(),
            tls: self.tls,
            reconnect_delay_secs: self.reconnect_delay_secs,
            connect_timeout_secs: self.connect_timeout_secs,
            max_frame_bytes: self.max_frame_bytes,
            send_queue_capacity: self.send_queue_capacity,
        }
    }

    /// Settings handed to the TCP transport.
    #[must_use]
    pub fn tcp(&self) -> TcpConfig {
        TcpConfig {
            host: self.host.clone(),
            port: self.port,
            reconnect_delay_secs: self.reconnect_delay_secs,
            connect_timeout_secs: self.connect_timeout_secs,
            max_frame_bytes: self.max_frame_bytes,
            send_queue_capacity: self.send_queue_capacity,
        }
    }

    /// Human-readable endpoint for logs.
    #[must_use]
    pub fn endpoint(&self) -> String {
        match self.transport {
            HubTransport::Websocket => self.websocket().url(),
            HubTransport::Tcp => self.tcp().address(),
        }
    }
}

/// Engine tuning.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Diff-tick period in milliseconds.
    pub tick_interval_ms: u64,
    /// Upper bound for one outbound envelope, in bytes.
    pub max_message_bytes: usize,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Per-integration settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct IntegrationsConfig {
    /// Enable the virtual/demo integration.
    pub virtual_enabled: bool,
    /// Duration of a simulated action, in milliseconds.
    pub action_duration_ms: u64,
    /// Period of the simulated thermometer, in seconds (`0` disables it).
    pub sensor_interval_secs: u64,
}

impl Config {
    /// Load configuration from `qubelink.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("qubelink.toml")?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("QUBELINK_TRANSPORT") {
            self.hub.transport = val.parse()?;
        }
        if let Ok(val) = std::env::var("QUBELINK_HUB") {
            self.apply_hub_override(&val)?;
        }
        if let Ok(val) = std::env::var("QUBELINK_TICK_MS") {
            self.apply_tick_override(&val)?;
        }
        if let Ok(val) = std::env::var("QUBELINK_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
        Ok(())
    }

    /// Apply a `host:port` hub override. A value without a port only
    /// replaces the host.
    fn apply_hub_override(&mut self, val: &str) -> Result<(), ConfigError> {
        match val.rsplit_once(':') {
            Some((host, port)) => {
                self.hub.port = port.parse().map_err(|_| {
                    ConfigError::Validation(format!("QUBELINK_HUB port `{port}` is not a valid port"))
                })?;
                self.hub.host = host.to_string();
            }
            None => self.hub.host = val.to_string(),
        }
        Ok(())
    }

    fn apply_tick_override(&mut self, val: &str) -> Result<(), ConfigError> {
        self.engine.tick_interval_ms = val.parse().map_err(|_| {
            ConfigError::Validation(format!(
                "QUBELINK_TICK_MS `{val}` is not a whole number of milliseconds"
            ))
        })?;
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.hub.host.is_empty() {
            return Err(ConfigError::Validation("hub host must not be empty".to_string()));
        }
        if self.hub.port == 0 {
            return Err(ConfigError::Validation("hub port must be non-zero".to_string()));
        }
        if self.engine.tick_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "tick interval must be non-zero".to_string(),
            ));
        }
        if self.hub.max_frame_bytes == 0 {
            return Err(ConfigError::Validation(
                "hub frame limit must be non-zero".to_string(),
            ));
        }
        if self.engine.max_message_bytes < MIN_MESSAGE_BYTES {
            return Err(ConfigError::Validation(format!(
                "max message size must be at least {MIN_MESSAGE_BYTES} bytes"
            )));
        }
        Ok(())
    }
}

impl EngineSettings {
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl IntegrationsConfig {
    /// Settings handed to the virtual integration.
    #[must_use]
    pub fn virtual_config(&self) -> VirtualConfig {
        VirtualConfig {
            action_duration_ms: self.action_duration_ms,
            sensor_interval_secs: self.sensor_interval_secs,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "qubelinkd=info,qubelink=info".to_string(),
        }
    }
}

impl Default for IntegrationsConfig {
    fn default() -> Self {
        let defaults = VirtualConfig::default();
        Self {
            virtual_enabled: true,
            action_duration_ms: defaults.action_duration_ms,
            sensor_interval_secs: defaults.sensor_interval_secs,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
