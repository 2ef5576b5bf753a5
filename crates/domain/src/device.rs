//! Device — a thing exposing properties, actions and events.
//!
//! A device owns its children exclusively. The sets of property, action and
//! event ids are fixed at build time; only values, invocation queues and
//! event queues change afterwards.

use crate::action::{Action, ActionInvocation};
use crate::catalog::{Catalog, Identified};
use crate::description::{THING_CONTEXT, ThingDescription, thing_href};
use crate::error::{EntityKind, NotFoundError, ThingError, ValidationError};
use crate::event::Event;
use crate::id::InvocationId;
use crate::ordered::OrderedMap;
use crate::property::Property;
use crate::value::ThingValue;

/// A modeled thing.
#[derive(Debug, Clone)]
pub struct Device {
    id: String,
    title: String,
    types: Vec<String>,
    description: Option<String>,
    properties: Catalog<Property>,
    actions: Catalog<Action>,
    events: Catalog<Event>,
}

impl Device {
    /// Create a builder for constructing a [`Device`].
    #[must_use]
    pub fn builder() -> DeviceBuilder {
        DeviceBuilder::default()
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Semantic type tags (`@type`).
    #[must_use]
    pub fn types(&self) -> &[String] {
        &self.types
    }

    #[must_use]
    pub fn find_property(&self, id: &str) -> Option<&Property> {
        self.properties.get(id)
    }

    #[must_use]
    pub fn find_action(&self, id: &str) -> Option<&Action> {
        self.actions.get(id)
    }

    #[must_use]
    pub fn find_event(&self, id: &str) -> Option<&Event> {
        self.events.get(id)
    }

    /// Properties in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter()
    }

    /// Mutable properties in declaration order.
    pub fn properties_mut(&mut self) -> impl Iterator<Item = &mut Property> {
        self.properties.iter_mut()
    }

    /// Actions in declaration order.
    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }

    /// Events in declaration order.
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    /// Current value of every property, in declaration order.
    #[must_use]
    pub fn property_values(&self) -> OrderedMap<ThingValue> {
        self.properties
            .iter()
            .map(|p| (p.id(), p.value().clone()))
            .collect()
    }

    /// Build the full description document of this device.
    #[must_use]
    pub fn describe(&self) -> ThingDescription {
        ThingDescription {
            id: self.id.clone(),
            title: self.title.clone(),
            context: THING_CONTEXT.to_string(),
            types: self.types.clone(),
            description: self.description.clone(),
            href: thing_href(&self.id),
            properties: self
                .properties
                .iter()
                .map(|p| (p.id(), p.describe(&self.id)))
                .collect(),
            actions: self
                .actions
                .iter()
                .map(|a| (a.id(), a.describe(&self.id)))
                .collect(),
            events: self
                .events
                .iter()
                .map(|e| (e.id(), e.describe(&self.id)))
                .collect(),
        }
    }

    /// Write a property value.
    ///
    /// Returns `true` if the value changed (the property is now dirty) and
    /// `false` if it was equal to the stored one (no-op).
    ///
    /// # Errors
    ///
    /// Returns [`ThingError::NotFound`] for an unknown property and
    /// [`ThingError::Validation`] for a value of the wrong type or range.
    pub fn set_property(&mut self, id: &str, value: ThingValue) -> Result<bool, ThingError> {
        let property = self
            .properties
            .get_mut(id)
            .ok_or_else(|| NotFoundError::Property {
                thing_id: self.id.clone(),
                property_id: id.to_string(),
            })?;
        Ok(property.set_value(&self.id, value)?)
    }

    /// Queue a new invocation of `action_id` in the `Created` state.
    ///
    /// # Errors
    ///
    /// Returns [`ThingError::InvalidAction`] for an unknown action and
    /// [`ThingError::Validation`] when the input lacks a required field.
    pub fn request_action(
        &mut self,
        action_id: &str,
        input: serde_json::Value,
    ) -> Result<InvocationId, ThingError> {
        let action = self
            .actions
            .get_mut(action_id)
            .ok_or_else(|| ThingError::InvalidAction {
                thing_id: self.id.clone(),
                action_id: action_id.to_string(),
            })?;
        Ok(action.request(&self.id, input)?)
    }

    /// Look up an invocation for mutation.
    ///
    /// # Errors
    ///
    /// Returns [`ThingError::NotFound`] when the action or the invocation
    /// does not exist.
    pub fn invocation_mut(
        &mut self,
        action_id: &str,
        invocation_id: InvocationId,
    ) -> Result<&mut ActionInvocation, ThingError> {
        let thing_id = &self.id;
        let action = self
            .actions
            .get_mut(action_id)
            .ok_or_else(|| NotFoundError::Action {
                thing_id: thing_id.clone(),
                action_id: action_id.to_string(),
            })?;
        action.invocation_mut(invocation_id).ok_or_else(|| {
            NotFoundError::Invocation {
                thing_id: thing_id.clone(),
                action_id: action_id.to_string(),
                invocation_id: invocation_id.to_string(),
            }
            .into()
        })
    }

    /// Apply the retention bound of `action_id` to its finished invocations.
    /// Unknown actions are ignored.
    pub fn evict_finished(&mut self, action_id: &str) -> usize {
        self.actions
            .get_mut(action_id)
            .map_or(0, Action::evict_finished)
    }

    /// Remove an invocation from its action's queue, whatever its state.
    ///
    /// This does not signal an executor that may still be running it.
    ///
    /// # Errors
    ///
    /// Returns [`ThingError::NotFound`] when the action or the invocation
    /// does not exist.
    pub fn remove_action(
        &mut self,
        action_id: &str,
        invocation_id: InvocationId,
    ) -> Result<ActionInvocation, ThingError> {
        let action = self
            .actions
            .get_mut(action_id)
            .ok_or_else(|| NotFoundError::Action {
                thing_id: self.id.clone(),
                action_id: action_id.to_string(),
            })?;
        action.remove_invocation(invocation_id).ok_or_else(|| {
            NotFoundError::Invocation {
                thing_id: self.id.clone(),
                action_id: action_id.to_string(),
                invocation_id: invocation_id.to_string(),
            }
            .into()
        })
    }

    /// Record an occurrence of `event_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ThingError::NotFound`] for an unknown event.
    pub fn push_event(&mut self, event_id: &str, data: serde_json::Value) -> Result<(), ThingError> {
        let event = self
            .events
            .get_mut(event_id)
            .ok_or_else(|| NotFoundError::Event {
                thing_id: self.id.clone(),
                event_id: event_id.to_string(),
            })?;
        event.push(data);
        Ok(())
    }
}

impl Identified for Device {
    const KIND: EntityKind = EntityKind::Thing;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Step-by-step builder for [`Device`].
#[derive(Debug, Default)]
pub struct DeviceBuilder {
    id: Option<String>,
    title: Option<String>,
    types: Vec<String>,
    description: Option<String>,
    properties: Vec<Property>,
    actions: Vec<Action>,
    events: Vec<Event>,
}

impl DeviceBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Add a semantic type tag, e.g. `Light` or `OnOffSwitch`.
    #[must_use]
    pub fn type_tag(mut self, tag: impl Into<String>) -> Self {
        self.types.push(tag.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    #[must_use]
    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    #[must_use]
    pub fn event(mut self, event: Event) -> Self {
        self.events.push(event);
        self
    }

    /// Consume the builder, validate, and return a [`Device`].
    ///
    /// The title defaults to the id.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyId`] if the id is missing or empty and
    /// [`ValidationError::DuplicateId`] if two children share an id.
    pub fn build(self) -> Result<Device, ValidationError> {
        let id = self.id.unwrap_or_default();
        if id.is_empty() {
            return Err(ValidationError::EmptyId {
                kind: EntityKind::Thing,
            });
        }

        let mut properties = Catalog::default();
        for property in self.properties {
            properties.insert(property)?;
        }
        let mut actions = Catalog::default();
        for action in self.actions {
            actions.insert(action)?;
        }
        let mut events = Catalog::default();
        for event in self.events {
            events.insert(event)?;
        }

        Ok(Device {
            title: self.title.unwrap_or_else(|| id.clone()),
            id,
            types: self.types,
            description: self.description,
            properties,
            actions,
            events,
        })
    }
}
