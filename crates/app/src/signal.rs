//! Signals — messages posted into the engine loop by external producers.
//!
//! Executors report action outcomes and sensor drivers push readings here
//! instead of touching the registry directly. The bridge drains the channel
//! on the same loop that handles requests, so the core never needs a lock.

use tokio::sync::mpsc;

use qubelink_domain::id::InvocationId;
use qubelink_domain::value::ThingValue;

/// Terminal result of one action invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub thing_id: String,
    pub action_id: String,
    pub invocation_id: InvocationId,
    /// `Err` carries the failure message recorded on the invocation.
    pub result: Result<(), String>,
}

/// A message for the engine loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// An executor finished running an invocation.
    ActionFinished(ActionOutcome),
    /// A driver observed a new property value.
    PropertyChanged {
        thing_id: String,
        property_id: String,
        value: ThingValue,
    },
    /// A driver observed an event occurrence.
    EventRaised {
        thing_id: String,
        event_id: String,
        data: serde_json::Value,
    },
}

/// Create a connected sender/receiver pair.
#[must_use]
pub fn channel() -> (SignalSender, SignalReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (SignalSender(tx), SignalReceiver(rx))
}

/// Cloneable handle for posting [`Signal`]s.
#[derive(Debug, Clone)]
pub struct SignalSender(mpsc::UnboundedSender<Signal>);

impl SignalSender {
    /// Post a signal. Returns `false` when the loop has shut down.
    pub fn send(&self, signal: Signal) -> bool {
        self.0.send(signal).is_ok()
    }

    /// Report the outcome of an invocation.
    pub fn finish_action(
        &self,
        thing_id: impl Into<String>,
        action_id: impl Into<String>,
        invocation_id: InvocationId,
        result: Result<(), String>,
    ) -> bool {
        self.send(Signal::ActionFinished(ActionOutcome {
            thing_id: thing_id.into(),
            action_id: action_id.into(),
            invocation_id,
            result,
        }))
    }

    /// Push a new property value.
    pub fn update_property(
        &self,
        thing_id: impl Into<String>,
        property_id: impl Into<String>,
        value: impl Into<ThingValue>,
    ) -> bool {
        self.send(Signal::PropertyChanged {
            thing_id: thing_id.into(),
            property_id: property_id.into(),
            value: value.into(),
        })
    }

    /// Record an event occurrence.
    pub fn raise_event(
        &self,
        thing_id: impl Into<String>,
        event_id: impl Into<String>,
        data: serde_json::Value,
    ) -> bool {
        self.send(Signal::EventRaised {
            thing_id: thing_id.into(),
            event_id: event_id.into(),
            data,
        })
    }
}

/// Receiving half, owned by the bridge.
#[derive(Debug)]
pub struct SignalReceiver(mpsc::UnboundedReceiver<Signal>);

impl SignalReceiver {
    /// Wait for the next signal. Cancel-safe.
    pub async fn recv(&mut self) -> Option<Signal> {
        self.0.recv().await
    }

    /// Take a signal if one is already queued.
    pub fn try_recv(&mut self) -> Option<Signal> {
        self.0.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_deliver_signals_in_order() {
        let (tx, mut rx) = channel();
        tx.update_property("lamp1", "on", true);
        tx.raise_event("lamp1", "overheated", serde_json::json!(90));

        assert!(matches!(
            rx.recv().await,
            Some(Signal::PropertyChanged { ref property_id, .. }) if property_id == "on"
        ));
        assert!(matches!(
            rx.recv().await,
            Some(Signal::EventRaised { ref event_id, .. }) if event_id == "overheated"
        ));
    }

    #[tokio::test]
    async fn should_deliver_from_cloned_senders() {
        let (tx, mut rx) = channel();
        let other = tx.clone();
        let id = InvocationId::new();
        other.finish_action("lamp1", "fade", id, Ok(()));

        let Some(Signal::ActionFinished(outcome)) = rx.recv().await else {
            panic!("expected an action outcome");
        };
        assert_eq!(outcome.invocation_id, id);
        assert_eq!(outcome.result, Ok(()));
    }

    #[test]
    fn should_report_failure_when_receiver_dropped() {
        let (tx, rx) = channel();
        drop(rx);
        assert!(!tx.update_property("lamp1", "on", true));
    }

    #[test]
    fn should_return_none_when_nothing_queued() {
        let (_tx, mut rx) = channel();
        assert!(rx.try_recv().is_none());
    }
}
