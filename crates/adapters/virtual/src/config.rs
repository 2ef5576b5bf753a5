//! Virtual integration configuration.

use std::time::Duration;

use serde::Deserialize;

/// Configuration for the virtual integration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VirtualConfig {
    /// How long a simulated action runs before it completes, in milliseconds.
    pub action_duration_ms: u64,
    /// Period of the simulated thermometer, in seconds. `0` disables it.
    pub sensor_interval_secs: u64,
}

impl Default for VirtualConfig {
    fn default() -> Self {
        Self {
            action_duration_ms: 1000,
            sensor_interval_secs: 5,
        }
    }
}

impl VirtualConfig {
    #[must_use]
    pub fn action_duration(&self) -> Duration {
        Duration::from_millis(self.action_duration_ms)
    }

    /// Thermometer period, or `None` when the feed is disabled.
    #[must_use]
    pub fn sensor_interval(&self) -> Option<Duration> {
        (self.sensor_interval_secs > 0).then(|| Duration::from_secs(self.sensor_interval_secs))
    }
}
