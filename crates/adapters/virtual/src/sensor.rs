//! Simulated temperature feed.
//!
//! Sweeps the reading up and down between two bounds in fixed steps and
//! raises `overheated` each time the reading climbs to the threshold.

use std::time::Duration;

use qubelink_app::signal::SignalSender;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::devices::{OVERHEATED_EVENT, TEMPERATURE_PROPERTY};

const LOW: f64 = 20.0;
const HIGH: f64 = 24.0;
const STEP: f64 = 0.5;
const OVERHEAT_THRESHOLD: f64 = 23.5;

/// Periodic driver for one thermometer.
#[derive(Debug, Clone)]
pub struct TemperatureFeed {
    thing_id: String,
    interval: Duration,
    reading: f64,
    rising: bool,
}

/// One step of the feed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub value: f64,
    /// The reading just reached the threshold on the way up.
    pub overheated: bool,
}

impl TemperatureFeed {
    #[must_use]
    pub fn new(thing_id: impl Into<String>, interval: Duration, initial: f64) -> Self {
        Self {
            thing_id: thing_id.into(),
            interval,
            reading: initial.clamp(LOW, HIGH),
            rising: true,
        }
    }

    /// Advance the sweep by one step.
    pub fn advance(&mut self) -> Reading {
        if self.rising && self.reading >= HIGH {
            self.rising = false;
        } else if !self.rising && self.reading <= LOW {
            self.rising = true;
        }
        let previous = self.reading;
        self.reading = if self.rising {
            (self.reading + STEP).min(HIGH)
        } else {
            (self.reading - STEP).max(LOW)
        };
        Reading {
            value: self.reading,
            overheated: previous < OVERHEAT_THRESHOLD && self.reading >= OVERHEAT_THRESHOLD,
        }
    }

    /// Run the feed on its own task until the engine loop goes away.
    pub fn spawn(mut self, signals: SignalSender) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let reading = self.advance();
                tracing::trace!(thing_id = %self.thing_id, value = reading.value, "temperature reading");
                if !signals.update_property(&self.thing_id, TEMPERATURE_PROPERTY, reading.value) {
                    break;
                }
                if reading.overheated {
                    tracing::debug!(thing_id = %self.thing_id, value = reading.value, "overheated");
                    signals.raise_event(
                        &self.thing_id,
                        OVERHEATED_EVENT,
                        serde_json::json!(reading.value),
                    );
                }
            }
            tracing::debug!(thing_id = %self.thing_id, "temperature feed stopped");
        })
    }
}
