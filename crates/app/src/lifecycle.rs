//! Action lifecycle — starting invocations and applying their outcomes.
//!
//! `performAction` creates an invocation, moves it to `started` and hands it
//! to the [`ActionExecutor`] before the response is built, so the hub always
//! sees `started` first. The executor later posts an [`ActionOutcome`]; the
//! engine loop feeds it back through [`ActionLifecycle::complete`], which
//! applies the terminal transition and produces one `actionStatus`.

use qubelink_domain::device::Device;
use qubelink_domain::error::ThingError;
use qubelink_domain::registry::Registry;

use crate::ports::{ActionExecutor, ActionRequest};
use crate::protocol::Outbound;
use crate::signal::{ActionOutcome, SignalSender};

/// Starts invocations and applies executor outcomes.
pub struct ActionLifecycle<E> {
    executor: E,
    signals: SignalSender,
}

impl<E: ActionExecutor> ActionLifecycle<E> {
    /// Create a lifecycle manager handing work to `executor`, which reports
    /// back through `signals`.
    pub fn new(executor: E, signals: SignalSender) -> Self {
        Self { executor, signals }
    }

    /// Create, start and dispatch a new invocation.
    ///
    /// Returns the `actionStatus` envelope reflecting the `started` state.
    ///
    /// # Errors
    ///
    /// Returns [`ThingError::InvalidAction`] for an unknown action and
    /// [`ThingError::Validation`] when the input is rejected.
    #[tracing::instrument(skip(self, device, input), fields(thing_id = %device.id()))]
    pub fn perform(
        &self,
        device: &mut Device,
        action_id: &str,
        input: serde_json::Value,
    ) -> Result<Outbound, ThingError> {
        let thing_id = device.id().to_string();
        let invocation_id = device.request_action(action_id, input)?;
        let invocation = device.invocation_mut(action_id, invocation_id)?;
        invocation.start()?;

        let response = Outbound::action_status(&thing_id, invocation);
        let request = ActionRequest {
            thing_id,
            action_id: action_id.to_string(),
            invocation_id,
            input: invocation.input().clone(),
        };
        tracing::debug!(%invocation_id, "invocation started");
        self.executor.execute(request, self.signals.clone());
        Ok(response)
    }

    /// Apply an executor outcome.
    ///
    /// Returns the `actionStatus` envelope for the terminal state, or `None`
    /// when the invocation no longer exists (deleted while running) or is
    /// not in a state that accepts the outcome.
    #[tracing::instrument(skip(self, registry, outcome), fields(
        thing_id = %outcome.thing_id,
        action_id = %outcome.action_id,
        invocation_id = %outcome.invocation_id,
    ))]
    pub fn complete(&self, registry: &mut Registry, outcome: ActionOutcome) -> Option<Outbound> {
        let device = registry.find_device_mut(&outcome.thing_id)?;
        let invocation = match device.invocation_mut(&outcome.action_id, outcome.invocation_id) {
            Ok(invocation) => invocation,
            Err(err) => {
                tracing::debug!(error = %err, "dropping outcome for removed invocation");
                return None;
            }
        };

        let transition = match outcome.result {
            Ok(()) => invocation.complete(),
            Err(message) => invocation.fail(message),
        };
        if let Err(err) = transition {
            tracing::warn!(error = %err, "ignoring outcome");
            return None;
        }

        tracing::debug!(status = %invocation.status(), "invocation finished");
        let outbound = Outbound::action_status(&outcome.thing_id, invocation);
        let evicted = device.evict_finished(&outcome.action_id);
        if evicted > 0 {
            tracing::debug!(evicted, "evicted finished invocations");
        }
        Some(outbound)
    }
}
