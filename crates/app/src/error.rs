//! Protocol-level errors and their mapping to `error` envelopes.
//!
//! Every failure the engine can hit while answering a request ends up here,
//! and every variant converts into exactly one [`ErrorEnvelope`]. Nothing is
//! retried; the channel stays open.

use qubelink_domain::error::{NotFoundError, ThingError, ValidationError};

use crate::protocol::ErrorEnvelope;

/// Top-level error for request handling and envelope encoding.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The inbound text is not a JSON envelope.
    #[error("malformed envelope")]
    Parse(#[source] serde_json::Error),

    #[error("envelope has no messageType")]
    MissingMessageType { thing_id: Option<String> },

    #[error("unknown messageType `{message_type}`")]
    UnknownMessageType {
        message_type: String,
        thing_id: Option<String>,
    },

    #[error("`{message_type}` requires `{field}`")]
    MissingField {
        message_type: String,
        field: &'static str,
        thing_id: Option<String>,
    },

    #[error("invalid `{field}`: {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
        thing_id: Option<String>,
    },

    /// The thing model rejected the request.
    #[error("thing model rejected the request")]
    Domain(#[from] ThingError),

    /// An encoded envelope exceeds the configured size bound.
    #[error("encoded message of {size} bytes exceeds the {limit}-byte limit")]
    EncodingOverflow { size: usize, limit: usize },

    #[error("failed to encode envelope")]
    Encode(#[source] serde_json::Error),
}

impl From<NotFoundError> for ProtocolError {
    fn from(err: NotFoundError) -> Self {
        Self::Domain(err.into())
    }
}

impl From<ValidationError> for ProtocolError {
    fn from(err: ValidationError) -> Self {
        Self::Domain(err.into())
    }
}

impl ProtocolError {
    /// HTTP-like status code carried in the `errorCode` field.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Parse(_)
            | Self::MissingMessageType { .. }
            | Self::UnknownMessageType { .. }
            | Self::MissingField { .. }
            | Self::InvalidField { .. }
            | Self::Domain(ThingError::Validation(_)) => "400",
            Self::Domain(ThingError::NotFound(_) | ThingError::InvalidAction { .. }) => "404",
            Self::EncodingOverflow { .. } => "413",
            Self::Encode(_) => "500",
        }
    }

    /// Human-readable message for `errorMessage`.
    ///
    /// Domain errors report their innermost cause so the hub sees which
    /// entity was at fault.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Domain(ThingError::Validation(err)) => err.to_string(),
            Self::Domain(ThingError::NotFound(err)) => err.to_string(),
            Self::Domain(err @ ThingError::InvalidAction { .. }) => err.to_string(),
            Self::Parse(err) => format!("{self}: {err}"),
            other => other.to_string(),
        }
    }

    /// Build the `error` envelope, echoing every identifier involved.
    #[must_use]
    pub fn to_envelope(&self) -> ErrorEnvelope {
        let mut envelope = ErrorEnvelope::new(self.code(), self.message());
        match self {
            Self::MissingMessageType { thing_id }
            | Self::UnknownMessageType { thing_id, .. }
            | Self::MissingField { thing_id, .. }
            | Self::InvalidField { thing_id, .. } => envelope.thing_id.clone_from(thing_id),
            Self::Domain(err) => fill_domain_ids(&mut envelope, err),
            Self::Parse(_) | Self::EncodingOverflow { .. } | Self::Encode(_) => {}
        }
        envelope
    }
}

fn fill_domain_ids(envelope: &mut ErrorEnvelope, err: &ThingError) {
    envelope.thing_id = err.thing_id().map(ToString::to_string);
    match err {
        ThingError::NotFound(NotFoundError::Property { property_id, .. })
        | ThingError::Validation(
            ValidationError::TypeMismatch { property_id, .. }
            | ValidationError::OutOfRange { property_id, .. }
            | ValidationError::ReadOnly { property_id, .. },
        ) => envelope.property_id = Some(property_id.clone()),
        ThingError::NotFound(NotFoundError::Action { action_id, .. })
        | ThingError::InvalidAction { action_id, .. }
        | ThingError::Validation(ValidationError::MissingInput { action_id, .. }) => {
            envelope.action_id = Some(action_id.clone());
        }
        ThingError::NotFound(NotFoundError::Event { event_id, .. }) => {
            envelope.event_id = Some(event_id.clone());
        }
        ThingError::NotFound(NotFoundError::Invocation {
            action_id,
            invocation_id,
            ..
        }) => {
            envelope.action_id = Some(action_id.clone());
            envelope.invocation_id = Some(invocation_id.clone());
        }
        ThingError::NotFound(NotFoundError::Thing { .. }) | ThingError::Validation(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_map_parse_errors_to_400() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let envelope = ProtocolError::Parse(err).to_envelope();
        assert_eq!(envelope.error_code, "400");
        assert!(envelope.thing_id.is_none());
    }

    #[test]
    fn should_map_missing_thing_to_404_with_thing_id() {
        let err = ProtocolError::from(NotFoundError::Thing {
            thing_id: "ghost".to_string(),
        });
        let envelope = err.to_envelope();
        assert_eq!(envelope.error_code, "404");
        assert_eq!(envelope.thing_id.as_deref(), Some("ghost"));
        assert_eq!(envelope.error_message, "thing `ghost` not found");
    }

    #[test]
    fn should_map_invalid_action_to_404_with_action_id() {
        let err = ProtocolError::Domain(ThingError::InvalidAction {
            thing_id: "lamp1".to_string(),
            action_id: "explode".to_string(),
        });
        let envelope = err.to_envelope();
        assert_eq!(envelope.error_code, "404");
        assert_eq!(envelope.thing_id.as_deref(), Some("lamp1"));
        assert_eq!(envelope.action_id.as_deref(), Some("explode"));
    }

    #[test]
    fn should_map_validation_errors_to_400_with_property_id() {
        let err = ProtocolError::from(ValidationError::ReadOnly {
            thing_id: "thermo".to_string(),
            property_id: "temperature".to_string(),
        });
        let envelope = err.to_envelope();
        assert_eq!(envelope.error_code, "400");
        assert_eq!(envelope.thing_id.as_deref(), Some("thermo"));
        assert_eq!(envelope.property_id.as_deref(), Some("temperature"));
    }

    #[test]
    fn should_echo_invocation_ids_when_invocation_missing() {
        let err = ProtocolError::from(NotFoundError::Invocation {
            thing_id: "lamp1".to_string(),
            action_id: "fade".to_string(),
            invocation_id: "abc".to_string(),
        });
        let envelope = err.to_envelope();
        assert_eq!(envelope.action_id.as_deref(), Some("fade"));
        assert_eq!(envelope.invocation_id.as_deref(), Some("abc"));
    }

    #[test]
    fn should_name_missing_action_in_message() {
        let err = ProtocolError::Domain(ThingError::InvalidAction {
            thing_id: "lamp1".to_string(),
            action_id: "explode".to_string(),
        });
        let envelope = err.to_envelope();
        assert_eq!(envelope.error_code, "404");
        assert_eq!(envelope.error_message, "thing `lamp1` has no action `explode`");
        assert_eq!(envelope.action_id.as_deref(), Some("explode"));
    }

    #[test]
    fn should_map_overflow_to_413() {
        let err = ProtocolError::EncodingOverflow {
            size: 5000,
            limit: 4096,
        };
        assert_eq!(err.code(), "413");
        assert_eq!(
            err.to_string(),
            "encoded message of 5000 bytes exceeds the 4096-byte limit"
        );
    }

    #[test]
    fn should_echo_thing_id_for_routing_errors() {
        let err = ProtocolError::UnknownMessageType {
            message_type: "reboot".to_string(),
            thing_id: Some("lamp1".to_string()),
        };
        let envelope = err.to_envelope();
        assert_eq!(envelope.error_code, "400");
        assert_eq!(envelope.thing_id.as_deref(), Some("lamp1"));
        assert_eq!(envelope.error_message, "unknown messageType `reboot`");
    }
}
