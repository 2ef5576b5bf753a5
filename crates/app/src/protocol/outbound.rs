//! Outbound envelopes — responses, notifications and errors.

use serde::{Deserialize, Serialize};

use qubelink_domain::action::ActionInvocation;
use qubelink_domain::description::{
    EventRecordDescription, InvocationDescription, ThingDescription,
};
use qubelink_domain::event::EventRecord;
use qubelink_domain::id::InvocationId;
use qubelink_domain::ordered::OrderedMap;
use qubelink_domain::value::ThingValue;

/// Everything the adapter sends to the hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "messageType")]
pub enum Outbound {
    /// Greeting sent whenever the channel (re)connects.
    #[serde(rename = "StartWs")]
    Hello,

    /// Response to `getProperty`.
    #[serde(rename = "getProperty", rename_all = "camelCase")]
    Properties {
        thing_id: String,
        properties: OrderedMap<ThingValue>,
    },

    /// Diff-tick notification carrying the changed properties of one thing.
    #[serde(rename = "propertyStatus", rename_all = "camelCase")]
    PropertyStatus {
        thing_id: String,
        data: OrderedMap<ThingValue>,
    },

    /// Response to `setProperty`, echoing the stored value.
    #[serde(rename = "updatedProperty", rename_all = "camelCase")]
    UpdatedProperty { thing_id: String, value: ThingValue },

    /// Response to `getThingDescription` (with `thingId`) and `getAllThings`.
    #[serde(rename = "descriptionOfThings", rename_all = "camelCase")]
    DescriptionOfThings {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thing_id: Option<String>,
        things: Vec<ThingDescription>,
    },

    /// Snapshot of one invocation, keyed by action id.
    #[serde(rename = "actionStatus", rename_all = "camelCase")]
    ActionStatus {
        thing_id: String,
        data: OrderedMap<InvocationDescription>,
    },

    /// Response to `getActions`.
    #[serde(rename = "actionQueue", rename_all = "camelCase")]
    ActionQueue {
        thing_id: String,
        data: Vec<OrderedMap<InvocationDescription>>,
    },

    /// Response to `deleteAction`.
    #[serde(rename = "actionDeleted", rename_all = "camelCase")]
    ActionDeleted {
        thing_id: String,
        action_id: String,
        invocation_id: InvocationId,
    },

    /// Response to `getEvents`.
    #[serde(rename = "eventQueue", rename_all = "camelCase")]
    EventQueue {
        thing_id: String,
        data: Vec<OrderedMap<EventRecordDescription>>,
    },

    #[serde(rename = "error")]
    Error(ErrorEnvelope),
}

impl Outbound {
    /// `actionStatus` for one invocation.
    #[must_use]
    pub fn action_status(thing_id: &str, invocation: &ActionInvocation) -> Self {
        Self::ActionStatus {
            thing_id: thing_id.to_string(),
            data: invocation_entry(thing_id, invocation),
        }
    }

    /// `actionQueue` for a sequence of invocations.
    #[must_use]
    pub fn action_queue<'a>(
        thing_id: &str,
        invocations: impl IntoIterator<Item = &'a ActionInvocation>,
    ) -> Self {
        Self::ActionQueue {
            thing_id: thing_id.to_string(),
            data: invocations
                .into_iter()
                .map(|inv| invocation_entry(thing_id, inv))
                .collect(),
        }
    }

    /// `eventQueue` for a sequence of `(event_id, record)` pairs.
    #[must_use]
    pub fn event_queue<'a>(
        thing_id: &str,
        records: impl IntoIterator<Item = (&'a str, &'a EventRecord)>,
    ) -> Self {
        Self::EventQueue {
            thing_id: thing_id.to_string(),
            data: records
                .into_iter()
                .map(|(event_id, record)| std::iter::once((event_id, record.describe())).collect())
                .collect(),
        }
    }

    /// The `messageType` discriminator of this envelope.
    #[must_use]
    pub fn message_type(&self) -> &'static str {
        match self {
            Self::Hello => "StartWs",
            Self::Properties { .. } => "getProperty",
            Self::PropertyStatus { .. } => "propertyStatus",
            Self::UpdatedProperty { .. } => "updatedProperty",
            Self::DescriptionOfThings { .. } => "descriptionOfThings",
            Self::ActionStatus { .. } => "actionStatus",
            Self::ActionQueue { .. } => "actionQueue",
            Self::ActionDeleted { .. } => "actionDeleted",
            Self::EventQueue { .. } => "eventQueue",
            Self::Error(_) => "error",
        }
    }

    /// Identifier of the thing this envelope is about, if any.
    #[must_use]
    pub fn thing_id(&self) -> Option<&str> {
        match self {
            Self::Hello => None,
            Self::DescriptionOfThings { thing_id, .. } => thing_id.as_deref(),
            Self::Error(err) => err.thing_id.as_deref(),
            Self::Properties { thing_id, .. }
            | Self::PropertyStatus { thing_id, .. }
            | Self::UpdatedProperty { thing_id, .. }
            | Self::ActionStatus { thing_id, .. }
            | Self::ActionQueue { thing_id, .. }
            | Self::ActionDeleted { thing_id, .. }
            | Self::EventQueue { thing_id, .. } => Some(thing_id),
        }
    }
}

fn invocation_entry(
    thing_id: &str,
    invocation: &ActionInvocation,
) -> OrderedMap<InvocationDescription> {
    std::iter::once((invocation.action_id(), invocation.describe(thing_id))).collect()
}

/// Body of an `error` envelope.
///
/// `errorCode` is an HTTP-like status rendered as a string (`"400"`,
/// `"404"`, `"413"`). The optional identifiers echo whatever the failing
/// request referenced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub error_code: String,
    pub error_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thing_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invocation_id: Option<String>,
}

impl ErrorEnvelope {
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: code.into(),
            error_message: message.into(),
            thing_id: None,
            property_id: None,
            action_id: None,
            event_id: None,
            invocation_id: None,
        }
    }

    /// The same error with every identifier removed.
    #[must_use]
    pub fn without_ids(&self) -> Self {
        Self::new(self.error_code.clone(), self.error_message.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_serialize_hello_as_start_ws() {
        let json = serde_json::to_value(Outbound::Hello).unwrap();
        assert_eq!(json, json!({"messageType": "StartWs"}));
    }

    #[test]
    fn should_serialize_updated_property() {
        let envelope = Outbound::UpdatedProperty {
            thing_id: "lamp1".to_string(),
            value: ThingValue::Bool(true),
        };
        let json = serde_json::to_value(envelope).unwrap();
        assert_eq!(
            json,
            json!({"messageType": "updatedProperty", "thingId": "lamp1", "value": true})
        );
    }

    #[test]
    fn should_serialize_property_status_in_declaration_order() {
        let data: OrderedMap<ThingValue> = [
            ("on", ThingValue::Bool(true)),
            ("brightness", ThingValue::Int(40)),
        ]
        .into_iter()
        .collect();
        let envelope = Outbound::PropertyStatus {
            thing_id: "lamp1".to_string(),
            data,
        };
        let text = serde_json::to_string(&envelope).unwrap();
        assert_eq!(
            text,
            r#"{"messageType":"propertyStatus","thingId":"lamp1","data":{"on":true,"brightness":40}}"#
        );
    }

    #[test]
    fn should_omit_thing_id_for_all_things() {
        let envelope = Outbound::DescriptionOfThings {
            thing_id: None,
            things: Vec::new(),
        };
        let json = serde_json::to_value(envelope).unwrap();
        assert_eq!(json, json!({"messageType": "descriptionOfThings", "things": []}));
    }

    #[test]
    fn should_key_action_status_by_action_id() {
        let invocation = ActionInvocation::new("fade", json!({"level": 10}));
        let envelope = Outbound::action_status("lamp1", &invocation);
        let json = serde_json::to_value(envelope).unwrap();

        let action = &json["data"]["fade"];
        assert_eq!(json["messageType"], "actionStatus");
        assert_eq!(json["thingId"], "lamp1");
        assert_eq!(action["id"], invocation.id().to_string());
        assert_eq!(action["status"], "created");
        assert_eq!(action["input"], json!({"level": 10}));
    }

    #[test]
    fn should_serialize_error_with_only_present_ids() {
        let mut err = ErrorEnvelope::new("404", "thing `ghost` not found");
        err.thing_id = Some("ghost".to_string());
        let json = serde_json::to_value(Outbound::Error(err)).unwrap();
        assert_eq!(
            json,
            json!({
                "messageType": "error",
                "errorCode": "404",
                "errorMessage": "thing `ghost` not found",
                "thingId": "ghost"
            })
        );
    }

    #[test]
    fn should_parse_back_serialized_envelopes() {
        let invocation = ActionInvocation::new("blink", serde_json::Value::Null);
        let envelope = Outbound::action_queue("lamp1", [&invocation]);
        let text = serde_json::to_string(&envelope).unwrap();
        let parsed: Outbound = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, envelope);
        assert_eq!(parsed.thing_id(), Some("lamp1"));
    }
}
