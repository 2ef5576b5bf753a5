//! # qubelink-adapter-virtual
//!
//! Virtual/demo integration that provides simulated things for testing and
//! demonstration purposes.
//!
//! ## Provided things
//!
//! | Thing | Id | Behaviour |
//! |-------|----|-----------|
//! | Virtual Lamp | `lamp1` | `on` / `brightness` properties; `fade` (needs `level`) and `blink` actions |
//! | Virtual Thermometer | `thermometer1` | Read-only `temperature` swept by a background feed; raises `overheated` |
//!
//! ## Dependency rule
//!
//! Depends on `qubelink-app` (port traits) and `qubelink-domain` only.

mod config;
mod devices;
mod executor;
mod sensor;

pub use config::VirtualConfig;
pub use devices::{LAMP_ID, THERMOMETER_ID};
pub use executor::VirtualExecutor;
pub use sensor::{Reading, TemperatureFeed};

use qubelink_app::ports::Integration;
use qubelink_app::signal::SignalSender;
use qubelink_domain::device::Device;
use qubelink_domain::error::ThingError;
use tokio::task::JoinHandle;

/// Initial reading of the simulated thermometer, in degrees celsius.
const INITIAL_TEMPERATURE: f64 = 21.5;

/// Virtual integration that creates simulated things.
#[derive(Debug, Default)]
pub struct VirtualIntegration {
    config: VirtualConfig,
    feed: Option<JoinHandle<()>>,
}

impl VirtualIntegration {
    #[must_use]
    pub fn new(config: VirtualConfig) -> Self {
        Self { config, feed: None }
    }

    /// Whether the background temperature feed is running.
    #[must_use]
    pub fn is_feeding(&self) -> bool {
        self.feed.as_ref().is_some_and(|feed| !feed.is_finished())
    }
}

impl Integration for VirtualIntegration {
    type Executor = VirtualExecutor;

    fn name(&self) -> &'static str {
        "virtual"
    }

    async fn setup(&mut self) -> Result<Vec<Device>, ThingError> {
        Ok(vec![devices::lamp()?, devices::thermometer()?])
    }

    fn executor(&self) -> VirtualExecutor {
        VirtualExecutor::new(self.config.action_duration())
    }

    fn start_background(&mut self, signals: SignalSender) {
        if self.feed.is_some() {
            return;
        }
        let Some(interval) = self.config.sensor_interval() else {
            tracing::info!("temperature feed disabled");
            return;
        };
        let feed = TemperatureFeed::new(THERMOMETER_ID, interval, INITIAL_TEMPERATURE);
        self.feed = Some(feed.spawn(signals));
    }

    async fn teardown(&mut self) -> Result<(), ThingError> {
        if let Some(feed) = self.feed.take() {
            feed.abort();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qubelink_app::signal;

    #[tokio::test]
    async fn should_discover_two_things_on_setup() {
        let mut integration = VirtualIntegration::default();
        let devices = integration.setup().await.unwrap();
        let ids: Vec<_> = devices.iter().map(Device::id).collect();
        assert_eq!(ids, vec!["lamp1", "thermometer1"]);
    }

    #[tokio::test]
    async fn should_return_virtual_as_name() {
        let integration = VirtualIntegration::default();
        assert_eq!(integration.name(), "virtual");
    }

    #[tokio::test]
    async fn should_start_and_stop_feed() {
        let mut integration = VirtualIntegration::default();
        let (tx, _rx) = signal::channel();

        integration.start_background(tx);
        assert!(integration.is_feeding());

        integration.teardown().await.unwrap();
        assert!(!integration.is_feeding());
    }

    #[tokio::test]
    async fn should_not_start_feed_when_disabled() {
        let mut integration = VirtualIntegration::new(VirtualConfig {
            sensor_interval_secs: 0,
            ..VirtualConfig::default()
        });
        let (tx, _rx) = signal::channel();

        integration.start_background(tx);
        assert!(!integration.is_feeding());
    }

    #[tokio::test]
    async fn should_teardown_successfully() {
        let mut integration = VirtualIntegration::default();
        assert!(integration.teardown().await.is_ok());
    }
}
