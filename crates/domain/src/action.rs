//! Action — a named operation a thing can perform, tracked through a queue
//! of invocations.
//!
//! Finished invocations stay visible to `getActions` until the action has
//! more than `retention` of them; the oldest finished ones are then evicted
//! when the next request is queued or the next invocation finishes. Live
//! invocations are never evicted.

mod invocation;

pub use invocation::{ActionInvocation, InvocationStatus};

use crate::catalog::Identified;
use crate::description::{ActionDescription, child_href};
use crate::error::{EntityKind, ValidationError};
use crate::id::InvocationId;

/// Default number of finished invocations kept per action.
pub const DEFAULT_INVOCATION_RETENTION: usize = 4;

/// An operation exposed by a thing.
#[derive(Debug, Clone)]
pub struct Action {
    id: String,
    semantic_type: Option<String>,
    title: Option<String>,
    description: Option<String>,
    input: Option<serde_json::Value>,
    retention: usize,
    invocations: Vec<ActionInvocation>,
}

impl Action {
    /// Create a builder for an action with the given id.
    #[must_use]
    pub fn builder(id: impl Into<String>) -> ActionBuilder {
        ActionBuilder {
            id: id.into(),
            semantic_type: None,
            title: None,
            description: None,
            input: None,
            retention: DEFAULT_INVOCATION_RETENTION,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Input schema descriptor, if any.
    #[must_use]
    pub fn input_schema(&self) -> Option<&serde_json::Value> {
        self.input.as_ref()
    }

    /// How many finished invocations survive the next request.
    #[must_use]
    pub fn retention(&self) -> usize {
        self.retention
    }

    /// Invocations in request order.
    #[must_use]
    pub fn invocations(&self) -> &[ActionInvocation] {
        &self.invocations
    }

    #[must_use]
    pub fn invocation(&self, id: InvocationId) -> Option<&ActionInvocation> {
        self.invocations.iter().find(|inv| inv.id() == id)
    }

    pub fn invocation_mut(&mut self, id: InvocationId) -> Option<&mut ActionInvocation> {
        self.invocations.iter_mut().find(|inv| inv.id() == id)
    }

    /// Queue a new invocation in [`InvocationStatus::Created`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingInput`] when the input schema lists
    /// a `required` field that `input` does not carry.
    pub fn request(
        &mut self,
        thing_id: &str,
        input: serde_json::Value,
    ) -> Result<InvocationId, ValidationError> {
        if let Some(field) = self.missing_required_field(&input) {
            return Err(ValidationError::MissingInput {
                thing_id: thing_id.to_string(),
                action_id: self.id.clone(),
                field,
            });
        }
        let invocation = ActionInvocation::new(self.id.clone(), input);
        let id = invocation.id();
        self.evict_finished();
        self.invocations.push(invocation);
        Ok(id)
    }

    /// Drop the oldest finished invocations beyond `retention`, returning
    /// how many were dropped.
    pub fn evict_finished(&mut self) -> usize {
        let finished = self
            .invocations
            .iter()
            .filter(|inv| inv.status().is_terminal())
            .count();
        let excess = finished.saturating_sub(self.retention);
        let mut remaining = excess;
        self.invocations.retain(|inv| {
            if remaining > 0 && inv.status().is_terminal() {
                remaining -= 1;
                return false;
            }
            true
        });
        excess
    }

    /// Remove an invocation from the queue, whatever its state.
    pub fn remove_invocation(&mut self, id: InvocationId) -> Option<ActionInvocation> {
        let pos = self.invocations.iter().position(|inv| inv.id() == id)?;
        Some(self.invocations.remove(pos))
    }

    /// Build the description entry for this action.
    #[must_use]
    pub fn describe(&self, thing_id: &str) -> ActionDescription {
        ActionDescription {
            semantic_type: self.semantic_type.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            input: self.input.clone(),
            href: child_href(thing_id, "actions", &self.id),
        }
    }

    fn missing_required_field(&self, input: &serde_json::Value) -> Option<String> {
        let required = self.input.as_ref()?.get("required")?.as_array()?;
        required
            .iter()
            .filter_map(serde_json::Value::as_str)
            .find(|field| input.get(field).is_none())
            .map(ToString::to_string)
    }
}

impl Identified for Action {
    const KIND: EntityKind = EntityKind::Action;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Step-by-step builder for [`Action`].
#[derive(Debug)]
pub struct ActionBuilder {
    id: String,
    semantic_type: Option<String>,
    title: Option<String>,
    description: Option<String>,
    input: Option<serde_json::Value>,
    retention: usize,
}

impl ActionBuilder {
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Semantic annotation, e.g. `FadeAction`.
    #[must_use]
    pub fn semantic_type(mut self, semantic_type: impl Into<String>) -> Self {
        self.semantic_type = Some(semantic_type.into());
        self
    }

    /// JSON-Schema-like descriptor of the accepted input.
    #[must_use]
    pub fn input(mut self, schema: serde_json::Value) -> Self {
        self.input = Some(schema);
        self
    }

    /// Finished invocations to keep around; zero keeps none.
    #[must_use]
    pub fn retention(mut self, retention: usize) -> Self {
        self.retention = retention;
        self
    }

    /// Consume the builder and return an [`Action`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyId`] if the id is empty.
    pub fn build(self) -> Result<Action, ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::EmptyId {
                kind: EntityKind::Action,
            });
        }
        Ok(Action {
            id: self.id,
            semantic_type: self.semantic_type,
            title: self.title,
            description: self.description,
            input: self.input,
            retention: self.retention,
            invocations: Vec::new(),
        })
    }
}
