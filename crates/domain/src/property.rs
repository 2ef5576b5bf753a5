//! Property — a named, typed, observable value on a thing.

use crate::catalog::Identified;
use crate::description::{PropertyDescription, child_href};
use crate::error::{EntityKind, ValidationError};
use crate::value::{ThingValue, ValueType};

/// A typed value with change tracking.
///
/// The dirty flag is raised by any write that changes the stored value and
/// is lowered only by [`take_change`](Self::take_change), which the change
/// notifier calls once per diff tick.
#[derive(Debug, Clone)]
pub struct Property {
    id: String,
    value_type: ValueType,
    semantic_type: Option<String>,
    title: Option<String>,
    description: Option<String>,
    unit: Option<String>,
    read_only: bool,
    minimum: Option<f64>,
    maximum: Option<f64>,
    value: ThingValue,
    dirty: bool,
}

impl Property {
    /// Create a builder for a property of the given type.
    #[must_use]
    pub fn builder(id: impl Into<String>, value_type: ValueType) -> PropertyBuilder {
        PropertyBuilder {
            id: id.into(),
            value_type,
            semantic_type: None,
            title: None,
            description: None,
            unit: None,
            read_only: false,
            minimum: None,
            maximum: None,
            initial: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    #[must_use]
    pub fn value(&self) -> &ThingValue {
        &self.value
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Whether a change is waiting to be reported.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Store `value` if it differs from the current one.
    ///
    /// Returns `true` when the value changed (and the property is now
    /// dirty), `false` when it was equal and nothing happened.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::TypeMismatch`] when `value` cannot be
    /// coerced to the declared type and [`ValidationError::OutOfRange`] when
    /// a numeric value falls outside the declared bounds.
    pub fn set_value(&mut self, thing_id: &str, value: ThingValue) -> Result<bool, ValidationError> {
        let value = self
            .value_type
            .coerce(value)
            .ok_or_else(|| ValidationError::TypeMismatch {
                thing_id: thing_id.to_string(),
                property_id: self.id.clone(),
                expected: self.value_type,
            })?;

        if !self.in_range(&value) {
            return Err(ValidationError::OutOfRange {
                thing_id: thing_id.to_string(),
                property_id: self.id.clone(),
                minimum: self.minimum,
                maximum: self.maximum,
            });
        }

        if value == self.value {
            return Ok(false);
        }
        self.value = value;
        self.dirty = true;
        Ok(true)
    }

    /// Consume the pending change, if any, returning the current value.
    pub fn take_change(&mut self) -> Option<&ThingValue> {
        if self.dirty {
            self.dirty = false;
            Some(&self.value)
        } else {
            None
        }
    }

    /// Raise the dirty flag again so the next tick reports the current value.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Build the description entry for this property.
    #[must_use]
    pub fn describe(&self, thing_id: &str) -> PropertyDescription {
        PropertyDescription {
            value_type: self.value_type,
            semantic_type: self.semantic_type.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            unit: self.unit.clone(),
            read_only: self.read_only,
            minimum: self.minimum,
            maximum: self.maximum,
            href: child_href(thing_id, "properties", &self.id),
        }
    }

    fn in_range(&self, value: &ThingValue) -> bool {
        let Some(number) = value.as_f64() else {
            return true;
        };
        self.minimum.is_none_or(|min| number >= min) && self.maximum.is_none_or(|max| number <= max)
    }
}

impl Identified for Property {
    const KIND: EntityKind = EntityKind::Property;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Step-by-step builder for [`Property`].
#[derive(Debug)]
pub struct PropertyBuilder {
    id: String,
    value_type: ValueType,
    semantic_type: Option<String>,
    title: Option<String>,
    description: Option<String>,
    unit: Option<String>,
    read_only: bool,
    minimum: Option<f64>,
    maximum: Option<f64>,
    initial: Option<ThingValue>,
}

impl PropertyBuilder {
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

    /// Semantic annotation, e.g. `OnOffProperty`.
    #[must_use]
    pub fn semantic_type(mut self, semantic_type: impl Into<String>) -> Self {
        self.semantic_type = Some(semantic_type.into());
        self
    }

    #[must_use]
    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    #[must_use]
    pub fn minimum(mut self, minimum: f64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    #[must_use]
    pub fn maximum(mut self, maximum: f64) -> Self {
        self.maximum = Some(maximum);
        self
    }

    /// Initial value; defaults to the zero value of the declared type.
    #[must_use]
    pub fn initial(mut self, value: impl Into<ThingValue>) -> Self {
        self.initial = Some(value.into());
        self
    }

    /// Consume the builder, validate, and return a [`Property`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyId`] if the id is empty and
    /// [`ValidationError::TypeMismatch`] if the initial value does not match
    /// the declared type.
    pub fn build(self) -> Result<Property, ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::EmptyId {
                kind: EntityKind::Property,
            });
        }
        let value = match self.initial {
            Some(initial) => {
                self.value_type
                    .coerce(initial)
                    .ok_or_else(|| ValidationError::TypeMismatch {
                        thing_id: String::new(),
                        property_id: self.id.clone(),
                        expected: self.value_type,
                    })?
            }
            None => self.value_type.default_value(),
        };

        Ok(Property {
            id: self.id,
            value_type: self.value_type,
            semantic_type: self.semantic_type,
            title: self.title,
            description: self.description,
            unit: self.unit,
            read_only: self.read_only,
            minimum: self.minimum,
            maximum: self.maximum,
            value,
            dirty: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on_property() -> Property {
        Property::builder("on", ValueType::Boolean)
            .initial(false)
            .build()
            .unwrap()
    }

    #[test]
    fn should_start_clean_with_initial_value() {
        let prop = on_property();
        assert_eq!(prop.value(), &ThingValue::Bool(false));
        assert!(!prop.is_dirty());
    }

    #[test]
    fn should_default_to_zero_value_when_no_initial_given() {
        let prop = Property::builder("level", ValueType::Integer)
            .build()
            .unwrap();
        assert_eq!(prop.value(), &ThingValue::Int(0));
    }

    #[test]
    fn should_mark_dirty_when_value_changes() {
        let mut prop = on_property();
        let changed = prop.set_value("lamp1", ThingValue::Bool(true)).unwrap();
        assert!(changed);
        assert!(prop.is_dirty());
        assert_eq!(prop.value(), &ThingValue::Bool(true));
    }

    #[test]
    fn should_not_mark_dirty_when_value_is_equal() {
        let mut prop = on_property();
        let changed = prop.set_value("lamp1", ThingValue::Bool(false)).unwrap();
        assert!(!changed);
        assert!(!prop.is_dirty());
    }

    #[test]
    fn should_report_change_once_then_nothing() {
        let mut prop = on_property();
        prop.set_value("lamp1", ThingValue::Bool(true)).unwrap();

        assert_eq!(prop.take_change(), Some(&ThingValue::Bool(true)));
        assert_eq!(prop.take_change(), None);
    }

    #[test]
    fn should_report_current_value_again_after_mark_dirty() {
        let mut prop = on_property();
        prop.set_value("lamp1", ThingValue::Bool(true)).unwrap();
        prop.take_change();

        prop.mark_dirty();

        assert!(prop.is_dirty());
        assert_eq!(prop.take_change(), Some(&ThingValue::Bool(true)));
    }

    #[test]
    fn should_coalesce_multiple_writes_into_latest_value() {
        let mut prop = Property::builder("level", ValueType::Integer)
            .build()
            .unwrap();
        prop.set_value("lamp1", ThingValue::Int(10)).unwrap();
        prop.set_value("lamp1", ThingValue::Int(20)).unwrap();
        prop.set_value("lamp1", ThingValue::Int(30)).unwrap();

        assert_eq!(prop.take_change(), Some(&ThingValue::Int(30)));
        assert_eq!(prop.take_change(), None);
    }

    #[test]
    fn should_compare_after_coercion() {
        let mut prop = Property::builder("temp", ValueType::Number)
            .initial(20.0)
            .build()
            .unwrap();
        let changed = prop.set_value("t1", ThingValue::Int(20)).unwrap();
        assert!(!changed);
    }

    #[test]
    fn should_reject_value_of_wrong_type() {
        let mut prop = on_property();
        let result = prop.set_value("lamp1", ThingValue::from("yes"));
        assert!(matches!(
            result,
            Err(ValidationError::TypeMismatch {
                expected: ValueType::Boolean,
                ..
            })
        ));
        assert!(!prop.is_dirty());
    }

    #[test]
    fn should_reject_value_outside_range() {
        let mut prop = Property::builder("level", ValueType::Integer)
            .minimum(0.0)
            .maximum(100.0)
            .build()
            .unwrap();
        let result = prop.set_value("lamp1", ThingValue::Int(150));
        assert!(matches!(result, Err(ValidationError::OutOfRange { .. })));
        assert_eq!(prop.value(), &ThingValue::Int(0));
    }

    #[test]
    fn should_reject_initial_value_of_wrong_type() {
        let result = Property::builder("on", ValueType::Boolean)
            .initial(3_i64)
            .build();
        assert!(matches!(result, Err(ValidationError::TypeMismatch { .. })));
    }

    #[test]
    fn should_reject_empty_id() {
        let result = Property::builder("", ValueType::String).build();
        assert!(matches!(result, Err(ValidationError::EmptyId { .. })));
    }

    #[test]
    fn should_describe_with_href_and_metadata() {
        let prop = Property::builder("temperature", ValueType::Number)
            .title("Temperature")
            .unit("degree celsius")
            .read_only()
            .build()
            .unwrap();
        let desc = prop.describe("thermo");
        assert_eq!(desc.href, "/things/thermo/properties/temperature");
        assert_eq!(desc.value_type, ValueType::Number);
        assert_eq!(desc.title.as_deref(), Some("Temperature"));
        assert!(desc.read_only);
    }
}
