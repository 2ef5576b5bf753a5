//! Property values and their declared types.

use serde::{Deserialize, Serialize};

/// A single scalar value held by a property or carried by an event.
///
/// Serialized as the bare JSON scalar, so `ThingValue::Bool(true)` is `true`
/// on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThingValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl ThingValue {
    /// The type this value naturally belongs to.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Bool(_) => ValueType::Boolean,
            Self::Int(_) => ValueType::Integer,
            Self::Float(_) => ValueType::Number,
            Self::String(_) => ValueType::String,
        }
    }

    /// Numeric view of the value, used for range checks.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Bool(_) | Self::String(_) => None,
        }
    }
}

impl From<bool> for ThingValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ThingValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for ThingValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for ThingValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ThingValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// The declared type of a property or event payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Boolean,
    Integer,
    Number,
    String,
}

impl ValueType {
    /// Convert `value` into this type, or `None` if it is not representable.
    ///
    /// Integers widen to numbers and integral floats narrow to integers;
    /// nothing else converts.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn coerce(self, value: ThingValue) -> Option<ThingValue> {
        match (self, value) {
            (Self::Boolean, v @ ThingValue::Bool(_))
            | (Self::Integer, v @ ThingValue::Int(_))
            | (Self::Number, v @ ThingValue::Float(_))
            | (Self::String, v @ ThingValue::String(_)) => Some(v),
            (Self::Number, ThingValue::Int(i)) => Some(ThingValue::Float(i as f64)),
            (Self::Integer, ThingValue::Float(f))
                if f.is_finite()
                    && f.fract() == 0.0
                    && f >= i64::MIN as f64
                    && f < i64::MAX as f64 =>
            {
                Some(ThingValue::Int(f as i64))
            }
            _ => None,
        }
    }

    /// The zero value of this type.
    #[must_use]
    pub fn default_value(self) -> ThingValue {
        match self {
            Self::Boolean => ThingValue::Bool(false),
            Self::Integer => ThingValue::Int(0),
            Self::Number => ThingValue::Float(0.0),
            Self::String => ThingValue::String(String::new()),
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Boolean => f.write_str("boolean"),
            Self::Integer => f.write_str("integer"),
            Self::Number => f.write_str("number"),
            Self::String => f.write_str("string"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_serialize_bool_variant_as_plain_bool() {
        let json = serde_json::to_string(&ThingValue::Bool(true)).unwrap();
        assert_eq!(json, "true");
    }

    #[test]
    fn should_deserialize_whole_number_as_int() {
        let val: ThingValue = serde_json::from_str("42").unwrap();
        assert_eq!(val, ThingValue::Int(42));
    }

    #[test]
    fn should_deserialize_fraction_as_float() {
        let val: ThingValue = serde_json::from_str("21.5").unwrap();
        assert_eq!(val, ThingValue::Float(21.5));
    }

    #[test]
    fn should_reject_objects_and_arrays() {
        assert!(serde_json::from_str::<ThingValue>(r#"{"a": 1}"#).is_err());
        assert!(serde_json::from_str::<ThingValue>("[1, 2]").is_err());
        assert!(serde_json::from_str::<ThingValue>("null").is_err());
    }

    #[test]
    fn should_widen_int_when_coercing_to_number() {
        let coerced = ValueType::Number.coerce(ThingValue::Int(3));
        assert_eq!(coerced, Some(ThingValue::Float(3.0)));
    }

    #[test]
    fn should_narrow_integral_float_when_coercing_to_integer() {
        let coerced = ValueType::Integer.coerce(ThingValue::Float(7.0));
        assert_eq!(coerced, Some(ThingValue::Int(7)));
    }

    #[test]
    fn should_refuse_fractional_float_for_integer() {
        assert_eq!(ValueType::Integer.coerce(ThingValue::Float(7.5)), None);
    }

    #[test]
    fn should_refuse_string_for_boolean() {
        assert_eq!(ValueType::Boolean.coerce(ThingValue::from("true")), None);
    }

    #[test]
    fn should_report_natural_value_type() {
        assert_eq!(ThingValue::from(1.5).value_type(), ValueType::Number);
        assert_eq!(ThingValue::from("x").value_type(), ValueType::String);
    }

    #[test]
    fn should_serialize_value_type_lowercase() {
        let json = serde_json::to_string(&ValueType::Integer).unwrap();
        assert_eq!(json, "\"integer\"");
    }
}
