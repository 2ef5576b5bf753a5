//! Registry — the set of devices exposed to the hub.

use crate::catalog::Catalog;
use crate::description::ThingDescription;
use crate::device::Device;
use crate::error::{NotFoundError, ValidationError};

/// Devices in registration order, looked up by id.
///
/// Device ids are unique; registering a second device with an existing id
/// is rejected.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    devices: Catalog<Device>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a device.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DuplicateId`] if a device with the same id
    /// is already registered.
    pub fn register(&mut self, device: Device) -> Result<(), ValidationError> {
        self.devices.insert(device)
    }

    #[must_use]
    pub fn find_device(&self, id: &str) -> Option<&Device> {
        self.devices.get(id)
    }

    pub fn find_device_mut(&mut self, id: &str) -> Option<&mut Device> {
        self.devices.get_mut(id)
    }

    /// Like [`find_device_mut`](Self::find_device_mut) but fails with a
    /// `NotFound` error carrying the id.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError::Thing`] when no device has this id.
    pub fn require_mut(&mut self, id: &str) -> Result<&mut Device, NotFoundError> {
        self.devices.get_mut(id).ok_or_else(|| NotFoundError::Thing {
            thing_id: id.to_string(),
        })
    }

    /// Devices in registration order. Each call starts a fresh pass.
    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter()
    }

    pub fn devices_mut(&mut self) -> impl Iterator<Item = &mut Device> {
        self.devices.iter_mut()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Descriptions of every device, in registration order.
    #[must_use]
    pub fn describe_all(&self) -> Vec<ThingDescription> {
        self.devices.iter().map(Device::describe).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EntityKind;

    fn device(id: &str) -> Device {
        Device::builder().id(id).build().unwrap()
    }

    #[test]
    fn should_find_registered_device() {
        let mut registry = Registry::new();
        registry.register(device("lamp1")).unwrap();

        assert!(registry.find_device("lamp1").is_some());
        assert!(registry.find_device("ghost").is_none());
    }

    #[test]
    fn should_reject_duplicate_device_id() {
        let mut registry = Registry::new();
        registry.register(device("lamp1")).unwrap();
        let result = registry.register(device("lamp1"));

        assert!(matches!(
            result,
            Err(ValidationError::DuplicateId {
                kind: EntityKind::Thing,
                ..
            })
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn should_iterate_in_registration_order_on_every_pass() {
        let mut registry = Registry::new();
        registry.register(device("b")).unwrap();
        registry.register(device("a")).unwrap();
        registry.register(device("c")).unwrap();

        let first: Vec<_> = registry.devices().map(Device::id).collect();
        let second: Vec<_> = registry.devices().map(Device::id).collect();
        assert_eq!(first, vec!["b", "a", "c"]);
        assert_eq!(first, second);
    }

    #[test]
    fn should_return_not_found_for_unknown_device() {
        let mut registry = Registry::new();
        let err = registry.require_mut("ghost").unwrap_err();
        assert_eq!(err.thing_id(), "ghost");
    }

    #[test]
    fn should_describe_all_devices() {
        let mut registry = Registry::new();
        registry.register(device("lamp1")).unwrap();
        registry.register(device("thermo")).unwrap();

        let ids: Vec<_> = registry.describe_all().into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["lamp1", "thermo"]);
    }

    #[test]
    fn should_describe_nothing_when_empty() {
        let registry = Registry::new();
        assert!(registry.is_empty());
        assert!(registry.describe_all().is_empty());
    }
}
