//! Insertion-ordered collection with O(1) lookup by identifier.
//!
//! Used for the registry's devices and for each device's properties,
//! actions and events. Entries are never removed, so indices stay stable.

use std::collections::HashMap;

use crate::error::{EntityKind, ValidationError};

/// Something addressable by a string identifier.
pub trait Identified {
    /// What kind of entity this is, for error reporting.
    const KIND: EntityKind;

    /// The identifier, unique within its catalog.
    fn id(&self) -> &str;
}

/// Ordered, append-only collection keyed by [`Identified::id`].
#[derive(Debug, Clone)]
pub struct Catalog<T> {
    items: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> Default for Catalog<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Identified> Catalog<T> {
    /// Append `item`, keeping insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyId`] if the id is empty and
    /// [`ValidationError::DuplicateId`] if it is already present.
    pub fn insert(&mut self, item: T) -> Result<(), ValidationError> {
        let id = item.id();
        if id.is_empty() {
            return Err(ValidationError::EmptyId { kind: T::KIND });
        }
        if self.index.contains_key(id) {
            return Err(ValidationError::DuplicateId {
                kind: T::KIND,
                id: id.to_string(),
            });
        }
        self.index.insert(id.to_string(), self.items.len());
        self.items.push(item);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&T> {
        self.index.get(id).map(|&idx| &self.items[idx])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.index.get(id).map(|&idx| &mut self.items[idx])
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }
}

impl<T> Catalog<T> {
    /// Iterate in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Iterate mutably in insertion order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a, T> IntoIterator for &'a Catalog<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
