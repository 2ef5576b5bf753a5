//! Engine — the synchronous core.
//!
//! Owns the registry and exposes the only entry points into it:
//! [`handle_message`](Engine::handle_message), [`tick`](Engine::tick) and
//! [`apply_signal`](Engine::apply_signal). All of them take `&mut self` and
//! run to completion, so driving them from one loop is all the
//! synchronization the model needs. Every return value is already-encoded
//! text that fits the configured size bound.

use qubelink_domain::registry::Registry;

use crate::dispatcher::Dispatcher;
use crate::lifecycle::ActionLifecycle;
use crate::notifier::ChangeNotifier;
use crate::ports::ActionExecutor;
use crate::protocol::{DEFAULT_MAX_MESSAGE_BYTES, Encoder, Outbound};
use crate::signal::{Signal, SignalSender};

/// Engine tuning.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Upper bound for one outbound envelope, in bytes.
    pub max_message_bytes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }
}

/// One rendered `propertyStatus` envelope from a diff tick.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyReport {
    pub thing_id: String,
    /// Properties whose pending change this envelope consumed.
    pub property_ids: Vec<String>,
    pub text: String,
}

/// The registry plus everything that reads or writes it.
pub struct Engine<E> {
    registry: Registry,
    dispatcher: Dispatcher<E>,
    notifier: ChangeNotifier,
    encoder: Encoder,
}

impl<E: ActionExecutor> Engine<E> {
    /// Build an engine. `signals` is handed to the executor with every
    /// invocation; its receiving half belongs to whoever drives the engine.
    pub fn new(registry: Registry, executor: E, signals: SignalSender, config: EngineConfig) -> Self {
        Self {
            registry,
            dispatcher: Dispatcher::new(ActionLifecycle::new(executor, signals)),
            notifier: ChangeNotifier::new(),
            encoder: Encoder::new(config.max_message_bytes),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The greeting sent on every (re)connect.
    #[must_use]
    pub fn hello(&self) -> String {
        self.encoder.render(&Outbound::Hello)
    }

    /// Answer one inbound text frame. Always yields exactly one envelope.
    pub fn handle_message(&mut self, text: &str) -> String {
        let outbound = match self.dispatcher.handle_text(&mut self.registry, text) {
            Ok(outbound) => outbound,
            Err(err) => {
                tracing::warn!(code = err.code(), error = %err, "rejecting request");
                Outbound::Error(err.to_envelope())
            }
        };
        self.encoder.render(&outbound)
    }

    /// Run one diff tick.
    ///
    /// The reported changes are consumed; hand a report back to
    /// [`requeue`](Self::requeue) if it never reached the hub.
    pub fn tick(&mut self) -> Vec<PropertyReport> {
        self.notifier
            .tick(&mut self.registry)
            .into_iter()
            .filter_map(|outbound| {
                let Outbound::PropertyStatus { thing_id, data } = &outbound else {
                    return None;
                };
                Some(PropertyReport {
                    thing_id: thing_id.clone(),
                    property_ids: data.keys().map(ToString::to_string).collect(),
                    text: self.encoder.render(&outbound),
                })
            })
            .collect()
    }

    /// Mark the properties of an undelivered report dirty again.
    pub fn requeue(&mut self, report: &PropertyReport) {
        let Ok(device) = self.registry.require_mut(&report.thing_id) else {
            return;
        };
        for property in device.properties_mut() {
            if report.property_ids.iter().any(|id| id == property.id()) {
                property.mark_dirty();
            }
        }
    }

    /// Apply a signal from an executor or driver.
    ///
    /// Only action outcomes produce an envelope directly; property pushes are
    /// reported by the next diff tick and events are only stored.
    pub fn apply_signal(&mut self, signal: Signal) -> Option<String> {
        match signal {
            Signal::ActionFinished(outcome) => self
                .dispatcher
                .lifecycle()
                .complete(&mut self.registry, outcome)
                .map(|outbound| self.encoder.render(&outbound)),
            Signal::PropertyChanged {
                thing_id,
                property_id,
                value,
            } => {
                let result = self
                    .registry
                    .require_mut(&thing_id)
                    .map_err(Into::into)
                    .and_then(|device| device.set_property(&property_id, value));
                if let Err(err) = result {
                    tracing::warn!(%thing_id, %property_id, error = %err, "dropping property update");
                }
                None
            }
            Signal::EventRaised {
                thing_id,
                event_id,
                data,
            } => {
                let result = self
                    .registry
                    .require_mut(&thing_id)
                    .map_err(Into::into)
                    .and_then(|device| device.push_event(&event_id, data));
                if let Err(err) = result {
                    tracing::warn!(%thing_id, %event_id, error = %err, "dropping event");
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::InstantExecutor;
    use crate::signal::{self, SignalReceiver};
    use qubelink_domain::action::Action;
    use qubelink_domain::device::Device;
    use qubelink_domain::event::Event;
    use qubelink_domain::property::Property;
    use qubelink_domain::value::{ThingValue, ValueType};
    use serde_json::{Value, json};

    fn engine() -> (Engine<InstantExecutor>, SignalReceiver) {
        let lamp = Device::builder()
            .id("lamp1")
            .property(
                Property::builder("on", ValueType::Boolean)
                    .initial(false)
                    .build()
                    .unwrap(),
            )
            .action(Action::builder("blink").build().unwrap())
            .event(Event::builder("overheated").build().unwrap())
            .build()
            .unwrap();
        let mut registry = Registry::new();
        registry.register(lamp).unwrap();
        let (tx, rx) = signal::channel();
        (
            Engine::new(registry, InstantExecutor, tx, EngineConfig::default()),
            rx,
        )
    }

    fn parse(text: &str) -> Value {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn should_follow_set_property_with_exactly_one_status_notification() {
        let (mut engine, _rx) = engine();

        let response = engine.handle_message(
            r#"{"messageType":"setProperty","thingId":"lamp1","data":{"propertyId":"on","value":true}}"#,
        );
        assert_eq!(
            parse(&response),
            json!({"messageType": "updatedProperty", "thingId": "lamp1", "value": true})
        );

        let first = engine.tick();
        assert_eq!(first.len(), 1);
        assert_eq!(
            parse(&first[0].text),
            json!({"messageType": "propertyStatus", "thingId": "lamp1", "data": {"on": true}})
        );

        assert!(engine.tick().is_empty());
    }

    #[test]
    fn should_report_requeued_change_again_on_next_tick() {
        let (mut engine, _rx) = engine();
        engine.handle_message(
            r#"{"messageType":"setProperty","thingId":"lamp1","data":{"propertyId":"on","value":true}}"#,
        );
        let lost = engine.tick().remove(0);
        assert_eq!(lost.thing_id, "lamp1");
        assert_eq!(lost.property_ids, vec!["on".to_string()]);

        engine.requeue(&lost);

        let retried = engine.tick();
        assert_eq!(retried.len(), 1);
        assert_eq!(retried[0].text, lost.text);
        assert!(engine.tick().is_empty());
    }

    #[test]
    fn should_not_notify_when_same_value_written() {
        let (mut engine, _rx) = engine();
        engine.handle_message(
            r#"{"messageType":"setProperty","thingId":"lamp1","data":{"propertyId":"on","value":false}}"#,
        );
        assert!(engine.tick().is_empty());
    }

    #[test]
    fn should_answer_malformed_text_with_error_envelope() {
        let (mut engine, _rx) = engine();
        let response = parse(&engine.handle_message("not json at all"));
        assert_eq!(response["messageType"], "error");
        assert_eq!(response["errorCode"], "400");
    }

    #[test]
    fn should_answer_array_frame_with_400() {
        let (mut engine, _rx) = engine();
        let response = parse(&engine.handle_message(r#"["getAllThings"]"#));
        assert_eq!(response["messageType"], "error");
        assert_eq!(response["errorCode"], "400");
    }

    #[test]
    fn should_answer_unknown_message_type_with_error_envelope() {
        let (mut engine, _rx) = engine();
        let response = parse(&engine.handle_message(r#"{"messageType":"reboot"}"#));
        assert_eq!(response["errorCode"], "400");
    }

    #[test]
    fn should_answer_perform_action_on_unknown_thing_with_404() {
        let (mut engine, mut rx) = engine();
        let response = parse(&engine.handle_message(
            r#"{"messageType":"performAction","thingId":"ghost","data":{"actionId":"blink"}}"#,
        ));
        assert_eq!(response["messageType"], "error");
        assert_eq!(response["errorCode"], "404");
        assert_eq!(response["thingId"], "ghost");
        assert!(rx.try_recv().is_none());
    }

    #[test]
    fn should_name_unknown_action_in_404() {
        let (mut engine, mut rx) = engine();
        let response = parse(&engine.handle_message(
            r#"{"messageType":"performAction","thingId":"lamp1","data":{"actionId":"explode"}}"#,
        ));
        assert_eq!(response["errorCode"], "404");
        assert_eq!(response["actionId"], "explode");
        assert_eq!(response["errorMessage"], "thing `lamp1` has no action `explode`");
        assert!(rx.try_recv().is_none());
    }

    #[test]
    fn should_keep_action_queue_within_limit_after_many_invocations() {
        let (mut engine, mut rx) = engine();
        for _ in 0..40 {
            engine.handle_message(
                r#"{"messageType":"performAction","thingId":"lamp1","data":{"actionId":"blink"}}"#,
            );
            let signal = rx.try_recv().unwrap();
            engine.apply_signal(signal).unwrap();
        }

        let response = parse(&engine.handle_message(
            r#"{"messageType":"getActions","thingId":"lamp1","data":{"actionId":"blink"}}"#,
        ));
        assert_eq!(response["messageType"], "actionQueue");
    }

    #[test]
    fn should_report_completion_after_executor_signal() {
        let (mut engine, mut rx) = engine();
        let started = parse(&engine.handle_message(
            r#"{"messageType":"performAction","thingId":"lamp1","data":{"actionId":"blink"}}"#,
        ));
        assert_eq!(started["data"]["blink"]["status"], "started");

        let signal = rx.try_recv().unwrap();
        let completed = parse(&engine.apply_signal(signal).unwrap());
        assert_eq!(completed["messageType"], "actionStatus");
        assert_eq!(completed["data"]["blink"]["status"], "completed");
        assert_eq!(completed["data"]["blink"]["id"], started["data"]["blink"]["id"]);
    }

    #[test]
    fn should_report_pushed_property_on_next_tick() {
        let (mut engine, _rx) = engine();
        let response = engine.apply_signal(Signal::PropertyChanged {
            thing_id: "lamp1".to_string(),
            property_id: "on".to_string(),
            value: ThingValue::Bool(true),
        });
        assert!(response.is_none());

        let ticks = engine.tick();
        assert_eq!(parse(&ticks[0].text)["data"], json!({"on": true}));
    }

    #[test]
    fn should_ignore_push_for_unknown_thing() {
        let (mut engine, _rx) = engine();
        let response = engine.apply_signal(Signal::PropertyChanged {
            thing_id: "ghost".to_string(),
            property_id: "on".to_string(),
            value: ThingValue::Bool(true),
        });
        assert!(response.is_none());
        assert!(engine.tick().is_empty());
    }

    #[test]
    fn should_store_raised_events() {
        let (mut engine, _rx) = engine();
        engine.apply_signal(Signal::EventRaised {
            thing_id: "lamp1".to_string(),
            event_id: "overheated".to_string(),
            data: json!(95),
        });

        let records = engine
            .registry()
            .find_device("lamp1")
            .unwrap()
            .find_event("overheated")
            .unwrap()
            .records()
            .len();
        assert_eq!(records, 1);
    }

    #[test]
    fn should_render_hello() {
        let (engine, _rx) = engine();
        assert_eq!(engine.hello(), r#"{"messageType":"StartWs"}"#);
    }

    #[test]
    fn should_replace_oversized_response_with_413() {
        let mut builder = Device::builder().id("big");
        for i in 0..40 {
            builder = builder.property(
                Property::builder(format!("property_{i}"), ValueType::String)
                    .title("A property with a fairly long title to pad the description")
                    .build()
                    .unwrap(),
            );
        }
        let mut registry = Registry::new();
        registry.register(builder.build().unwrap()).unwrap();
        let (tx, _rx) = signal::channel();
        let mut engine = Engine::new(
            registry,
            InstantExecutor,
            tx,
            EngineConfig {
                max_message_bytes: 1024,
            },
        );

        let response = engine.handle_message(r#"{"messageType":"getAllThings"}"#);
        assert!(response.len() <= 1024);
        assert_eq!(parse(&response)["errorCode"], "413");
    }
}
