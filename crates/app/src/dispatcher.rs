//! Message dispatcher — one inbound request, one outbound envelope.

use std::iter;

use qubelink_domain::error::{NotFoundError, ValidationError};
use qubelink_domain::ordered::OrderedMap;
use qubelink_domain::registry::Registry;
use qubelink_domain::value::ThingValue;

use crate::error::ProtocolError;
use crate::lifecycle::ActionLifecycle;
use crate::ports::ActionExecutor;
use crate::protocol::{Outbound, Request};

/// Routes requests to the thing model.
///
/// The dispatcher holds no state of its own beyond the action lifecycle; the
/// registry is passed in so the engine keeps sole ownership of it.
pub struct Dispatcher<E> {
    lifecycle: ActionLifecycle<E>,
}

impl<E: ActionExecutor> Dispatcher<E> {
    pub fn new(lifecycle: ActionLifecycle<E>) -> Self {
        Self { lifecycle }
    }

    #[must_use]
    pub fn lifecycle(&self) -> &ActionLifecycle<E> {
        &self.lifecycle
    }

    /// Parse and dispatch one inbound text frame.
    ///
    /// # Errors
    ///
    /// Returns the parse, routing or domain error that prevented a normal
    /// response; the caller turns it into an `error` envelope.
    pub fn handle_text(&self, registry: &mut Registry, text: &str) -> Result<Outbound, ProtocolError> {
        let request = Request::parse(text)?;
        self.dispatch(registry, request)
    }

    /// Dispatch one parsed request.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Domain`] when a lookup misses or the thing
    /// model rejects the operation.
    #[tracing::instrument(skip_all, fields(message_type = request.message_type(), thing_id = request.thing_id()))]
    pub fn dispatch(&self, registry: &mut Registry, request: Request) -> Result<Outbound, ProtocolError> {
        tracing::debug!("dispatching request");
        match request {
            Request::GetAllThings => Ok(Outbound::DescriptionOfThings {
                thing_id: None,
                things: registry.describe_all(),
            }),
            Request::GetThingDescription { thing_id } => {
                let things = vec![find(registry, &thing_id)?.describe()];
                Ok(Outbound::DescriptionOfThings {
                    thing_id: Some(thing_id),
                    things,
                })
            }
            Request::GetProperty {
                thing_id,
                property_id,
            } => get_property(registry, thing_id, property_id),
            Request::SetProperty {
                thing_id,
                property_id,
                value,
            } => set_property(registry, thing_id, &property_id, value),
            Request::PerformAction {
                thing_id,
                action_id,
                input,
            } => {
                let device = registry.require_mut(&thing_id)?;
                Ok(self.lifecycle.perform(device, &action_id, input)?)
            }
            Request::GetActions {
                thing_id,
                action_id,
            } => get_actions(registry, &thing_id, action_id.as_deref()),
            Request::DeleteAction {
                thing_id,
                action_id,
                invocation_id,
            } => {
                registry
                    .require_mut(&thing_id)?
                    .remove_action(&action_id, invocation_id)?;
                Ok(Outbound::ActionDeleted {
                    thing_id,
                    action_id,
                    invocation_id,
                })
            }
            Request::GetEvents { thing_id, event_id } => {
                get_events(registry, &thing_id, event_id.as_deref())
            }
        }
    }
}

fn find<'a>(
    registry: &'a Registry,
    thing_id: &str,
) -> Result<&'a qubelink_domain::device::Device, NotFoundError> {
    registry.find_device(thing_id).ok_or_else(|| NotFoundError::Thing {
        thing_id: thing_id.to_string(),
    })
}

fn get_property(
    registry: &Registry,
    thing_id: String,
    property_id: Option<String>,
) -> Result<Outbound, ProtocolError> {
    let device = find(registry, &thing_id)?;
    let properties = match property_id {
        None => device.property_values(),
        Some(property_id) => {
            let property = device.find_property(&property_id).ok_or_else(|| {
                NotFoundError::Property {
                    thing_id: thing_id.clone(),
                    property_id: property_id.clone(),
                }
            })?;
            iter::once((property_id, property.value().clone())).collect()
        }
    };
    Ok(Outbound::Properties {
        thing_id,
        properties,
    })
}

fn set_property(
    registry: &mut Registry,
    thing_id: String,
    property_id: &str,
    value: ThingValue,
) -> Result<Outbound, ProtocolError> {
    let device = registry.require_mut(&thing_id)?;
    if device
        .find_property(property_id)
        .is_some_and(|property| property.is_read_only())
    {
        return Err(ValidationError::ReadOnly {
            thing_id,
            property_id: property_id.to_string(),
        }
        .into());
    }

    device.set_property(property_id, value)?;
    let stored = device
        .find_property(property_id)
        .map(|property| property.value().clone())
        .ok_or_else(|| NotFoundError::Property {
            thing_id: thing_id.clone(),
            property_id: property_id.to_string(),
        })?;
    Ok(Outbound::UpdatedProperty {
        thing_id,
        value: stored,
    })
}

fn get_actions(
    registry: &Registry,
    thing_id: &str,
    action_id: Option<&str>,
) -> Result<Outbound, ProtocolError> {
    let device = find(registry, thing_id)?;
    match action_id {
        None => Ok(Outbound::action_queue(
            thing_id,
            device.actions().flat_map(|action| action.invocations()),
        )),
        Some(action_id) => {
            let action = device
                .find_action(action_id)
                .ok_or_else(|| NotFoundError::Action {
                    thing_id: thing_id.to_string(),
                    action_id: action_id.to_string(),
                })?;
            Ok(Outbound::action_queue(thing_id, action.invocations()))
        }
    }
}

fn get_events(
    registry: &Registry,
    thing_id: &str,
    event_id: Option<&str>,
) -> Result<Outbound, ProtocolError> {
    let device = find(registry, thing_id)?;
    match event_id {
        None => Ok(Outbound::event_queue(
            thing_id,
            device
                .events()
                .flat_map(|event| event.records().map(move |record| (event.id(), record))),
        )),
        Some(event_id) => {
            let event = device
                .find_event(event_id)
                .ok_or_else(|| NotFoundError::Event {
                    thing_id: thing_id.to_string(),
                    event_id: event_id.to_string(),
                })?;
            Ok(Outbound::event_queue(
                thing_id,
                event.records().map(|record| (event.id(), record)),
            ))
        }
    }
}
