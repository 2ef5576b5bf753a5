//! Action executor port — runs invocations outside the engine.
//!
//! The engine starts an invocation synchronously and hands it to the
//! executor together with a [`SignalSender`]. Whatever the executor does
//! (spawn a task, talk to hardware), it reports the outcome by posting
//! [`Signal::ActionFinished`](crate::signal::Signal::ActionFinished); the
//! engine never waits for it.

use qubelink_domain::id::InvocationId;

use crate::signal::SignalSender;

/// Everything an executor needs to run one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRequest {
    pub thing_id: String,
    pub action_id: String,
    pub invocation_id: InvocationId,
    pub input: serde_json::Value,
}

/// Runs action invocations.
///
/// `execute` is called from inside the engine loop and must not block.
pub trait ActionExecutor {
    fn execute(&self, request: ActionRequest, signals: SignalSender);
}

/// Executor that completes every invocation successfully at once.
///
/// Suitable for actions with no side effects beyond their status.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantExecutor;

impl ActionExecutor for InstantExecutor {
    fn execute(&self, request: ActionRequest, signals: SignalSender) {
        signals.finish_action(
            request.thing_id,
            request.action_id,
            request.invocation_id,
            Ok(()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::{self, Signal};

    #[test]
    fn should_post_success_immediately() {
        let (tx, mut rx) = signal::channel();
        let request = ActionRequest {
            thing_id: "lamp1".to_string(),
            action_id: "blink".to_string(),
            invocation_id: InvocationId::new(),
            input: serde_json::Value::Null,
        };
        let invocation_id = request.invocation_id;

        InstantExecutor.execute(request, tx);

        let Some(Signal::ActionFinished(outcome)) = rx.try_recv() else {
            panic!("expected an action outcome");
        };
        assert_eq!(outcome.invocation_id, invocation_id);
        assert_eq!(outcome.result, Ok(()));
    }
}
