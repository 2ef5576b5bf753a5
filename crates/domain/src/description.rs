//! Thing description documents — the serializable view of a device.
//!
//! A description is rebuilt from the live model on every request, so it
//! never goes stale. It deserializes back into the same shapes, which lets a
//! hub (or a test) recover ids and metadata from the wire.

use serde::{Deserialize, Serialize};

use crate::action::InvocationStatus;
use crate::id::InvocationId;
use crate::ordered::OrderedMap;
use crate::time::Timestamp;
use crate::value::ValueType;

/// JSON-LD context advertised by every thing description.
pub const THING_CONTEXT: &str = "https://webthings.io/schemas";

/// Full description of one thing and its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThingDescription {
    pub id: String,
    pub title: String,
    #[serde(rename = "@context", default = "default_context")]
    pub context: String,
    #[serde(rename = "@type", default)]
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub href: String,
    #[serde(default)]
    pub properties: OrderedMap<PropertyDescription>,
    #[serde(default)]
    pub actions: OrderedMap<ActionDescription>,
    #[serde(default)]
    pub events: OrderedMap<EventDescription>,
}

fn default_context() -> String {
    THING_CONTEXT.to_string()
}

/// Metadata of a single property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDescription {
    #[serde(rename = "type")]
    pub value_type: ValueType,
    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub semantic_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub read_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    pub href: String,
}

/// Metadata of a single action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDescription {
    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub semantic_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<serde_json::Value>,
    pub href: String,
}

/// Metadata of a single event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDescription {
    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub semantic_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
    pub href: String,
}

/// Snapshot of one action invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationDescription {
    pub id: InvocationId,
    pub href: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub input: serde_json::Value,
    pub status: InvocationStatus,
    pub time_requested: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_completed: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Snapshot of one queued event occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecordDescription {
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub data: serde_json::Value,
    pub timestamp: Timestamp,
}

/// href of a thing.
#[must_use]
pub fn thing_href(thing_id: &str) -> String {
    format!("/things/{thing_id}")
}

/// href of a child entity (`properties`, `actions`, `events`) of a thing.
#[must_use]
pub fn child_href(thing_id: &str, collection: &str, child_id: &str) -> String {
    format!("/things/{thing_id}/{collection}/{child_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_thing_and_child_hrefs() {
        assert_eq!(thing_href("lamp1"), "/things/lamp1");
        assert_eq!(
            child_href("lamp1", "properties", "on"),
            "/things/lamp1/properties/on"
        );
    }

    #[test]
    fn should_omit_unset_optional_property_fields() {
        let desc = PropertyDescription {
            value_type: ValueType::Boolean,
            semantic_type: None,
            title: None,
            description: None,
            unit: None,
            read_only: false,
            minimum: None,
            maximum: None,
            href: "/things/lamp1/properties/on".to_string(),
        };
        let json = serde_json::to_value(&desc).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "boolean", "href": "/things/lamp1/properties/on"})
        );
    }

    #[test]
    fn should_default_context_when_missing_from_document() {
        let desc: ThingDescription = serde_json::from_str(
            r#"{"id":"lamp1","title":"Lamp","href":"/things/lamp1"}"#,
        )
        .unwrap();
        assert_eq!(desc.context, THING_CONTEXT);
        assert!(desc.properties.is_empty());
    }
}
