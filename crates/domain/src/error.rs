//! Error types for the thing model.
//!
//! Every failure carries the identifiers needed to build an `error` envelope
//! at the protocol boundary, so callers never have to re-derive which thing
//! or child entity was at fault.

use crate::action::InvocationStatus;
use crate::value::ValueType;

/// Top-level error for all thing-model operations.
#[derive(Debug, thiserror::Error)]
pub enum ThingError {
    /// A domain invariant was violated by the request.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A thing or one of its children does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// An action was requested that the thing does not expose.
    #[error("thing `{thing_id}` has no action `{action_id}`")]
    InvalidAction { thing_id: String, action_id: String },
}

impl ThingError {
    /// Identifier of the thing the error relates to, if known.
    #[must_use]
    pub fn thing_id(&self) -> Option<&str> {
        match self {
            Self::Validation(err) => err.thing_id(),
            Self::NotFound(err) => Some(err.thing_id()),
            Self::InvalidAction { thing_id, .. } => Some(thing_id),
        }
    }
}

/// Violations of thing-model invariants.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("{kind} id must not be empty")]
    EmptyId { kind: EntityKind },

    #[error("duplicate {kind} id `{id}`")]
    DuplicateId { kind: EntityKind, id: String },

    #[error("property `{property_id}` expects a {expected} value")]
    TypeMismatch {
        thing_id: String,
        property_id: String,
        expected: ValueType,
    },

    #[error("value for property `{property_id}` is outside [{minimum:?}, {maximum:?}]")]
    OutOfRange {
        thing_id: String,
        property_id: String,
        minimum: Option<f64>,
        maximum: Option<f64>,
    },

    #[error("property `{property_id}` is read-only")]
    ReadOnly {
        thing_id: String,
        property_id: String,
    },

    #[error("action `{action_id}` input is missing required field `{field}`")]
    MissingInput {
        thing_id: String,
        action_id: String,
        field: String,
    },

    #[error("invocation cannot move from {from} to {to}")]
    InvalidTransition {
        from: InvocationStatus,
        to: InvocationStatus,
    },

    #[error("event queue capacity must be at least 1")]
    ZeroCapacity,
}

impl ValidationError {
    fn thing_id(&self) -> Option<&str> {
        match self {
            Self::TypeMismatch { thing_id, .. }
            | Self::OutOfRange { thing_id, .. }
            | Self::ReadOnly { thing_id, .. }
            | Self::MissingInput { thing_id, .. } => Some(thing_id),
            Self::EmptyId { .. }
            | Self::DuplicateId { .. }
            | Self::InvalidTransition { .. }
            | Self::ZeroCapacity => None,
        }
    }
}

/// A lookup by identifier that matched nothing.
#[derive(Debug, thiserror::Error)]
pub enum NotFoundError {
    #[error("thing `{thing_id}` not found")]
    Thing { thing_id: String },

    #[error("property `{property_id}` not found on thing `{thing_id}`")]
    Property {
        thing_id: String,
        property_id: String,
    },

    #[error("action `{action_id}` not found on thing `{thing_id}`")]
    Action { thing_id: String, action_id: String },

    #[error("event `{event_id}` not found on thing `{thing_id}`")]
    Event { thing_id: String, event_id: String },

    #[error("invocation `{invocation_id}` of action `{action_id}` not found on thing `{thing_id}`")]
    Invocation {
        thing_id: String,
        action_id: String,
        invocation_id: String,
    },
}

impl NotFoundError {
    /// Identifier of the thing that was searched.
    #[must_use]
    pub fn thing_id(&self) -> &str {
        match self {
            Self::Thing { thing_id }
            | Self::Property { thing_id, .. }
            | Self::Action { thing_id, .. }
            | Self::Event { thing_id, .. }
            | Self::Invocation { thing_id, .. } => thing_id,
        }
    }
}

/// The kind of model entity an identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Thing,
    Property,
    Action,
    Event,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Thing => f.write_str("thing"),
            Self::Property => f.write_str("property"),
            Self::Action => f.write_str("action"),
            Self::Event => f.write_str("event"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_not_found_with_identifiers() {
        let err = NotFoundError::Property {
            thing_id: "lamp1".to_string(),
            property_id: "on".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "property `on` not found on thing `lamp1`"
        );
    }

    #[test]
    fn should_expose_thing_id_for_not_found() {
        let err: ThingError = NotFoundError::Thing {
            thing_id: "ghost".to_string(),
        }
        .into();
        assert_eq!(err.thing_id(), Some("ghost"));
    }

    #[test]
    fn should_expose_thing_id_for_invalid_action() {
        let err = ThingError::InvalidAction {
            thing_id: "lamp1".to_string(),
            action_id: "explode".to_string(),
        };
        assert_eq!(err.thing_id(), Some("lamp1"));
    }

    #[test]
    fn should_not_expose_thing_id_for_builder_errors() {
        let err: ThingError = ValidationError::EmptyId {
            kind: EntityKind::Property,
        }
        .into();
        assert_eq!(err.thing_id(), None);
    }

    #[test]
    fn should_display_duplicate_id() {
        let err = ValidationError::DuplicateId {
            kind: EntityKind::Thing,
            id: "lamp1".to_string(),
        };
        assert_eq!(err.to_string(), "duplicate thing id `lamp1`");
    }
}
