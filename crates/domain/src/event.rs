//! Event — timestamped facts a thing emits, held in a bounded queue.
//!
//! Producers live outside the model (sensor drivers, executors); the queue
//! only stores the most recent `capacity` records and drops the oldest on
//! overflow.

use std::collections::VecDeque;

use crate::catalog::Identified;
use crate::description::{EventDescription, EventRecordDescription, child_href};
use crate::error::{EntityKind, ValidationError};
use crate::time::{Timestamp, now};
use crate::value::ValueType;

/// Default number of records kept per event.
pub const DEFAULT_EVENT_CAPACITY: usize = 10;

/// One occurrence of an event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub data: serde_json::Value,
    pub timestamp: Timestamp,
}

impl EventRecord {
    #[must_use]
    pub fn describe(&self) -> EventRecordDescription {
        EventRecordDescription {
            data: self.data.clone(),
            timestamp: self.timestamp,
        }
    }
}

/// A named event with its bounded record queue.
#[derive(Debug, Clone)]
pub struct Event {
    id: String,
    semantic_type: Option<String>,
    title: Option<String>,
    description: Option<String>,
    value_type: Option<ValueType>,
    capacity: usize,
    records: VecDeque<EventRecord>,
}

impl Event {
    /// Create a builder for an event with the given id.
    #[must_use]
    pub fn builder(id: impl Into<String>) -> EventBuilder {
        EventBuilder {
            id: id.into(),
            semantic_type: None,
            title: None,
            description: None,
            value_type: None,
            capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records, oldest first.
    pub fn records(&self) -> impl ExactSizeIterator<Item = &EventRecord> {
        self.records.iter()
    }

    /// Append a record stamped with the current time.
    pub fn push(&mut self, data: serde_json::Value) {
        self.push_at(data, now());
    }

    /// Append a record with an explicit timestamp, evicting the oldest one
    /// when the queue is full.
    pub fn push_at(&mut self, data: serde_json::Value, timestamp: Timestamp) {
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(EventRecord { data, timestamp });
    }

    /// Build the description entry for this event.
    #[must_use]
    pub fn describe(&self, thing_id: &str) -> EventDescription {
        EventDescription {
            semantic_type: self.semantic_type.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            value_type: self.value_type,
            href: child_href(thing_id, "events", &self.id),
        }
    }
}

impl Identified for Event {
    const KIND: EntityKind = EntityKind::Event;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Step-by-step builder for [`Event`].
#[derive(Debug)]
pub struct EventBuilder {
    id: String,
    semantic_type: Option<String>,
    title: Option<String>,
    description: Option<String>,
    value_type: Option<ValueType>,
    capacity: usize,
}

impl EventBuilder {
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

    #[must_use]
    pub fn semantic_type(mut self, semantic_type: impl Into<String>) -> Self {
        self.semantic_type = Some(semantic_type.into());
        self
    }

    /// Type of the payload carried by each record.
    #[must_use]
    pub fn value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    #[must_use]
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Consume the builder and return an [`Event`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyId`] for an empty id and
    /// [`ValidationError::ZeroCapacity`] for a zero capacity.
    pub fn build(self) -> Result<Event, ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::EmptyId {
                kind: EntityKind::Event,
            });
        }
        if self.capacity == 0 {
            return Err(ValidationError::ZeroCapacity);
        }
        Ok(Event {
            id: self.id,
            semantic_type: self.semantic_type,
            title: self.title,
            description: self.description,
            value_type: self.value_type,
            capacity: self.capacity,
            records: VecDeque::with_capacity(self.capacity),
        })
    }
}
