//! Simulated action runner.
//!
//! Every invocation runs on its own task: it sleeps for the configured
//! duration, pushes whatever property changes the action implies, then
//! reports the outcome. Property pushes are posted before the outcome so the
//! hub sees the new values no later than the completion.

use std::time::Duration;

use qubelink_app::ports::{ActionExecutor, ActionRequest};
use qubelink_app::signal::SignalSender;
use serde_json::Value;

/// Runs the lamp's actions against simulated hardware.
#[derive(Debug, Clone, Copy)]
pub struct VirtualExecutor {
    duration: Duration,
}

impl VirtualExecutor {
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

impl ActionExecutor for VirtualExecutor {
    fn execute(&self, request: ActionRequest, signals: SignalSender) {
        let duration = self.duration;
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let result = simulate(&request, &signals);
            if let Err(message) = &result {
                tracing::warn!(
                    thing_id = %request.thing_id,
                    action_id = %request.action_id,
                    %message,
                    "simulated action failed"
                );
            }
            signals.finish_action(
                request.thing_id,
                request.action_id,
                request.invocation_id,
                result,
            );
        });
    }
}

fn simulate(request: &ActionRequest, signals: &SignalSender) -> Result<(), String> {
    match request.action_id.as_str() {
        "fade" => {
            let level = request
                .input
                .get("level")
                .and_then(Value::as_i64)
                .ok_or_else(|| "level must be an integer".to_string())?;
            if !(0..=100).contains(&level) {
                return Err(format!("level {level} is outside 0..=100"));
            }
            signals.update_property(&request.thing_id, "brightness", level);
            signals.update_property(&request.thing_id, "on", level > 0);
            Ok(())
        }
        "blink" => Ok(()),
        other => Err(format!("no simulation for action `{other}`")),
    }
}
