//! Bridge — the single async loop that drives the engine.
//!
//! One `tokio::select!` multiplexes transport events, the diff-tick timer,
//! executor/driver signals and shutdown. Each branch calls exactly one
//! synchronous engine entry point and sends whatever it returns, so the
//! engine is never entered concurrently.

use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::engine::Engine;
use crate::ports::{ActionExecutor, Transport, TransportError, TransportEvent};
use crate::signal::{Signal, SignalReceiver};

/// Default diff-tick period.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Owns the engine and the transport for the lifetime of the daemon.
pub struct Bridge<T, E> {
    transport: T,
    engine: Engine<E>,
    signals: SignalReceiver,
    tick_interval: Duration,
    connected: bool,
}

impl<T, E> Bridge<T, E>
where
    T: Transport,
    E: ActionExecutor,
{
    pub fn new(transport: T, engine: Engine<E>, signals: SignalReceiver) -> Self {
        Self {
            transport,
            engine,
            signals,
            tick_interval: DEFAULT_TICK_INTERVAL,
            connected: false,
        }
    }

    /// Override the diff-tick period.
    #[must_use]
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    /// Run until `shutdown` resolves or the transport closes for good.
    ///
    /// Diff ticks only run while connected: changes made while the channel
    /// is down stay dirty and are reported, coalesced, right after the
    /// next `Connected`.
    ///
    /// # Errors
    ///
    /// Returns the transport's error if the initial connect fails.
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) -> Result<(), TransportError> {
        self.transport.connect().await?;

        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    tracing::info!("shutdown requested");
                    break;
                }
                event = self.transport.next_event() => {
                    let Some(event) = event else {
                        tracing::info!("transport closed");
                        break;
                    };
                    self.on_transport_event(event).await;
                }
                _ = ticker.tick(), if self.connected => {
                    self.flush_changes().await;
                }
                Some(signal) = self.signals.recv() => {
                    self.on_signal(signal).await;
                }
            }
        }
        Ok(())
    }

    async fn on_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Connected => {
                tracing::info!("connected to hub");
                self.connected = true;
                let hello = self.engine.hello();
                self.send(hello).await;
                self.flush_changes().await;
            }
            TransportEvent::Disconnected => {
                if self.connected {
                    tracing::info!("disconnected from hub");
                }
                self.connected = false;
            }
            TransportEvent::Text(text) => {
                let response = self.engine.handle_message(&text);
                self.send(response).await;
            }
            TransportEvent::Error(message) => {
                tracing::warn!(%message, "transport error");
            }
        }
    }

    async fn on_signal(&mut self, signal: Signal) {
        let Some(text) = self.engine.apply_signal(signal) else {
            return;
        };
        if self.connected {
            self.send(text).await;
        } else {
            tracing::debug!("dropping notification while disconnected");
        }
    }

    async fn flush_changes(&mut self) {
        let mut failed = false;
        for mut report in self.engine.tick() {
            if !failed {
                let text = std::mem::take(&mut report.text);
                match self.transport.send_text(text).await {
                    Ok(()) => continue,
                    Err(err) => {
                        tracing::warn!(thing_id = %report.thing_id, error = %err, "property changes kept pending");
                        failed = true;
                    }
                }
            }
            self.engine.requeue(&report);
        }
    }

    async fn send(&mut self, text: String) {
        if let Err(err) = self.transport.send_text(text).await {
            tracing::warn!(error = %err, "failed to send envelope");
        }
    }
}
