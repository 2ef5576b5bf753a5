//! Inbound envelopes: `{messageType, thingId?, data?}`.

use serde::Deserialize;

use qubelink_domain::id::InvocationId;
use qubelink_domain::value::ThingValue;

use crate::error::ProtocolError;

/// Raw inbound envelope, before routing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEnvelope {
    #[serde(default)]
    pub message_type: Option<String>,
    #[serde(default)]
    pub thing_id: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// A routable request with all required fields present.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    GetProperty {
        thing_id: String,
        property_id: Option<String>,
    },
    SetProperty {
        thing_id: String,
        property_id: String,
        value: ThingValue,
    },
    GetThingDescription {
        thing_id: String,
    },
    GetAllThings,
    PerformAction {
        thing_id: String,
        action_id: String,
        input: serde_json::Value,
    },
    GetActions {
        thing_id: String,
        action_id: Option<String>,
    },
    DeleteAction {
        thing_id: String,
        action_id: String,
        invocation_id: InvocationId,
    },
    GetEvents {
        thing_id: String,
        event_id: Option<String>,
    },
}

impl Request {
    /// Parse and validate one inbound text frame.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Parse`] for malformed JSON and the
    /// routing errors of [`TryFrom<InboundEnvelope>`] otherwise.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        // Sequence input would otherwise deserialize positionally.
        let object: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(text).map_err(ProtocolError::Parse)?;
        let envelope: InboundEnvelope = serde_json::from_value(serde_json::Value::Object(object))
            .map_err(ProtocolError::Parse)?;
        Self::try_from(envelope)
    }

    /// The `messageType` this request was routed from.
    #[must_use]
    pub fn message_type(&self) -> &'static str {
        match self {
            Self::GetProperty { .. } => "getProperty",
            Self::SetProperty { .. } => "setProperty",
            Self::GetThingDescription { .. } => "getThingDescription",
            Self::GetAllThings => "getAllThings",
            Self::PerformAction { .. } => "performAction",
            Self::GetActions { .. } => "getActions",
            Self::DeleteAction { .. } => "deleteAction",
            Self::GetEvents { .. } => "getEvents",
        }
    }

    #[must_use]
    pub fn thing_id(&self) -> Option<&str> {
        match self {
            Self::GetAllThings => None,
            Self::GetProperty { thing_id, .. }
            | Self::SetProperty { thing_id, .. }
            | Self::GetThingDescription { thing_id }
            | Self::PerformAction { thing_id, .. }
            | Self::GetActions { thing_id, .. }
            | Self::DeleteAction { thing_id, .. }
            | Self::GetEvents { thing_id, .. } => Some(thing_id),
        }
    }
}

impl TryFrom<InboundEnvelope> for Request {
    type Error = ProtocolError;

    fn try_from(envelope: InboundEnvelope) -> Result<Self, Self::Error> {
        let InboundEnvelope {
            message_type,
            thing_id,
            data,
        } = envelope;

        let Some(message_type) = message_type else {
            return Err(ProtocolError::MissingMessageType { thing_id });
        };

        let fields = Fields {
            message_type: message_type.clone(),
            thing_id,
            data,
        };

        match message_type.as_str() {
            "getAllThings" => Ok(Self::GetAllThings),
            "getProperty" => Ok(Self::GetProperty {
                thing_id: fields.thing_id()?,
                property_id: fields.optional_str("propertyId")?,
            }),
            "setProperty" => Ok(Self::SetProperty {
                thing_id: fields.thing_id()?,
                property_id: fields.required_str("propertyId")?,
                value: fields.value()?,
            }),
            "getThingDescription" => Ok(Self::GetThingDescription {
                thing_id: fields.thing_id()?,
            }),
            "performAction" => Ok(Self::PerformAction {
                thing_id: fields.thing_id()?,
                action_id: fields.required_str("actionId")?,
                input: fields.data.get("input").cloned().unwrap_or_default(),
            }),
            "getActions" => Ok(Self::GetActions {
                thing_id: fields.thing_id()?,
                action_id: fields.optional_str("actionId")?,
            }),
            "deleteAction" => Ok(Self::DeleteAction {
                thing_id: fields.thing_id()?,
                action_id: fields.required_str("actionId")?,
                invocation_id: fields.invocation_id()?,
            }),
            "getEvents" => Ok(Self::GetEvents {
                thing_id: fields.thing_id()?,
                event_id: fields.optional_str("eventId")?,
            }),
            _ => Err(ProtocolError::UnknownMessageType {
                message_type: fields.message_type,
                thing_id: fields.thing_id,
            }),
        }
    }
}

/// Field extraction with errors that echo the envelope's `thingId`.
struct Fields {
    message_type: String,
    thing_id: Option<String>,
    data: serde_json::Value,
}

impl Fields {
    fn thing_id(&self) -> Result<String, ProtocolError> {
        match self.thing_id.as_deref() {
            Some(id) if !id.is_empty() => Ok(id.to_string()),
            _ => Err(self.missing("thingId")),
        }
    }

    fn required_str(&self, field: &'static str) -> Result<String, ProtocolError> {
        self.optional_str(field)?.ok_or_else(|| self.missing(field))
    }

    fn optional_str(&self, field: &'static str) -> Result<Option<String>, ProtocolError> {
        match self.data.get(field) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(serde_json::Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(self.invalid(field, "expected a string")),
        }
    }

    fn value(&self) -> Result<ThingValue, ProtocolError> {
        let raw = self.data.get("value").ok_or_else(|| self.missing("value"))?;
        serde_json::from_value(raw.clone())
            .map_err(|_| self.invalid("value", "expected a boolean, number or string"))
    }

    fn invocation_id(&self) -> Result<InvocationId, ProtocolError> {
        self.required_str("invocationId")?
            .parse()
            .map_err(|_| self.invalid("invocationId", "expected a UUID"))
    }

    fn missing(&self, field: &'static str) -> ProtocolError {
        ProtocolError::MissingField {
            message_type: self.message_type.clone(),
            field,
            thing_id: self.thing_id.clone(),
        }
    }

    fn invalid(&self, field: &'static str, reason: &str) -> ProtocolError {
        ProtocolError::InvalidField {
            field,
            reason: reason.to_string(),
            thing_id: self.thing_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Result<Request, ProtocolError> {
        Request::parse(&value.to_string())
    }

    #[test]
    fn should_reject_envelope_sent_as_array() {
        let result = parse(json!(["getAllThings"]));
        assert!(matches!(result, Err(ProtocolError::Parse(_))));

        let result = parse(json!(["setProperty", "lamp1", {"propertyId": "on", "value": true}]));
        assert!(matches!(result, Err(ProtocolError::Parse(_))));
    }

    #[test]
    fn should_reject_bare_scalar_frame() {
        let err = Request::parse("42").unwrap_err();
        assert_eq!(err.code(), "400");
    }

    #[test]
    fn should_parse_set_property() {
        let request = parse(json!({
            "messageType": "setProperty",
            "thingId": "lamp1",
            "data": {"propertyId": "on", "value": true}
        }))
        .unwrap();
        assert_eq!(
            request,
            Request::SetProperty {
                thing_id: "lamp1".to_string(),
                property_id: "on".to_string(),
                value: ThingValue::Bool(true),
            }
        );
    }

    #[test]
    fn should_parse_get_all_things_without_thing_id() {
        let request = parse(json!({"messageType": "getAllThings"})).unwrap();
        assert_eq!(request, Request::GetAllThings);
        assert_eq!(request.thing_id(), None);
    }

    #[test]
    fn should_parse_get_property_with_optional_property_id() {
        let all = parse(json!({"messageType": "getProperty", "thingId": "lamp1"})).unwrap();
        assert_eq!(
            all,
            Request::GetProperty {
                thing_id: "lamp1".to_string(),
                property_id: None
            }
        );

        let one = parse(json!({
            "messageType": "getProperty",
            "thingId": "lamp1",
            "data": {"propertyId": "on"}
        }))
        .unwrap();
        assert!(matches!(
            one,
            Request::GetProperty { property_id: Some(ref id), .. } if id == "on"
        ));
    }

    #[test]
    fn should_default_action_input_to_null() {
        let request = parse(json!({
            "messageType": "performAction",
            "thingId": "lamp1",
            "data": {"actionId": "blink"}
        }))
        .unwrap();
        assert!(matches!(
            request,
            Request::PerformAction { ref input, .. } if input.is_null()
        ));
    }

    #[test]
    fn should_take_action_input_from_data() {
        let request = parse(json!({
            "messageType": "performAction",
            "thingId": "lamp1",
            "data": {"actionId": "fade", "input": {"level": 20}}
        }))
        .unwrap();
        assert!(matches!(
            request,
            Request::PerformAction { ref input, .. } if *input == json!({"level": 20})
        ));
    }

    #[test]
    fn should_parse_delete_action_invocation_id() {
        let id = InvocationId::new();
        let request = parse(json!({
            "messageType": "deleteAction",
            "thingId": "lamp1",
            "data": {"actionId": "fade", "invocationId": id.to_string()}
        }))
        .unwrap();
        assert!(matches!(
            request,
            Request::DeleteAction { invocation_id, .. } if invocation_id == id
        ));
    }

    #[test]
    fn should_fail_with_parse_error_when_json_is_malformed() {
        let result = Request::parse("{not json");
        assert!(matches!(result, Err(ProtocolError::Parse(_))));
    }

    #[test]
    fn should_fail_when_message_type_missing() {
        let result = parse(json!({"thingId": "lamp1"}));
        assert!(matches!(
            result,
            Err(ProtocolError::MissingMessageType { thing_id: Some(ref id) }) if id == "lamp1"
        ));
    }

    #[test]
    fn should_fail_when_message_type_unknown() {
        let result = parse(json!({"messageType": "reboot", "thingId": "lamp1"}));
        assert!(matches!(
            result,
            Err(ProtocolError::UnknownMessageType { ref message_type, .. }) if message_type == "reboot"
        ));
    }

    #[test]
    fn should_fail_when_set_property_lacks_property_id() {
        let result = parse(json!({
            "messageType": "setProperty",
            "thingId": "lamp1",
            "data": {"value": true}
        }));
        assert!(matches!(
            result,
            Err(ProtocolError::MissingField { field: "propertyId", thing_id: Some(_), .. })
        ));
    }

    #[test]
    fn should_fail_when_set_property_lacks_value() {
        let result = parse(json!({
            "messageType": "setProperty",
            "thingId": "lamp1",
            "data": {"propertyId": "on"}
        }));
        assert!(matches!(
            result,
            Err(ProtocolError::MissingField { field: "value", .. })
        ));
    }

    #[test]
    fn should_fail_when_thing_id_missing() {
        let result = parse(json!({"messageType": "getThingDescription"}));
        assert!(matches!(
            result,
            Err(ProtocolError::MissingField { field: "thingId", .. })
        ));
    }

    #[test]
    fn should_fail_when_value_is_not_a_scalar() {
        let result = parse(json!({
            "messageType": "setProperty",
            "thingId": "lamp1",
            "data": {"propertyId": "on", "value": {"nested": true}}
        }));
        assert!(matches!(
            result,
            Err(ProtocolError::InvalidField { field: "value", .. })
        ));
    }

    #[test]
    fn should_fail_when_invocation_id_is_not_a_uuid() {
        let result = parse(json!({
            "messageType": "deleteAction",
            "thingId": "lamp1",
            "data": {"actionId": "fade", "invocationId": "nope"}
        }));
        assert!(matches!(
            result,
            Err(ProtocolError::InvalidField { field: "invocationId", .. })
        ));
    }

    #[test]
    fn should_fail_when_data_is_not_an_object() {
        let result = parse(json!({
            "messageType": "performAction",
            "thingId": "lamp1",
            "data": "blink"
        }));
        assert!(matches!(
            result,
            Err(ProtocolError::MissingField { field: "actionId", .. })
        ));
    }
}
