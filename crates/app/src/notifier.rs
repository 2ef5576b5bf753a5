//! Change notifier — the periodic diff tick.
//!
//! Walks devices in registration order and, within each, properties in
//! declaration order. Every dirty property is consumed exactly once; all
//! changes of one device are coalesced into a single `propertyStatus`
//! envelope carrying only the latest values. Devices with nothing to report
//! produce nothing.

use qubelink_domain::ordered::OrderedMap;
use qubelink_domain::registry::Registry;
use qubelink_domain::value::ThingValue;

use crate::protocol::Outbound;

/// Produces `propertyStatus` envelopes from dirty properties.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeNotifier;

impl ChangeNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Run one diff tick, clearing every dirty flag it reports.
    pub fn tick(&self, registry: &mut Registry) -> Vec<Outbound> {
        let mut notifications = Vec::new();
        for device in registry.devices_mut() {
            let thing_id = device.id().to_string();
            let data: OrderedMap<ThingValue> = device
                .properties_mut()
                .filter_map(|property| {
                    let property_id = property.id().to_string();
                    property
                        .take_change()
                        .map(|value| (property_id, value.clone()))
                })
                .collect();
            if data.is_empty() {
                continue;
            }
            tracing::debug!(%thing_id, changed = data.len(), "reporting property changes");
            notifications.push(Outbound::PropertyStatus { thing_id, data });
        }
        notifications
    }
}
