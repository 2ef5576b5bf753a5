//! Virtual thermometer — a read-only temperature and an `overheated` event.

use qubelink_domain::device::Device;
use qubelink_domain::error::ValidationError;
use qubelink_domain::event::Event;
use qubelink_domain::property::Property;
use qubelink_domain::value::ValueType;

pub const THERMOMETER_ID: &str = "thermometer1";
pub const TEMPERATURE_PROPERTY: &str = "temperature";
pub const OVERHEATED_EVENT: &str = "overheated";

/// Build the thermometer.
///
/// # Errors
///
/// Returns a validation error if a builder rejects its input (should not
/// happen with hardcoded inputs).
pub fn thermometer() -> Result<Device, ValidationError> {
    Device::builder()
        .id(THERMOMETER_ID)
        .title("Virtual Thermometer")
        .type_tag("TemperatureSensor")
        .property(
            Property::builder(TEMPERATURE_PROPERTY, ValueType::Number)
                .title("Temperature")
                .semantic_type("TemperatureProperty")
                .unit("degree celsius")
                .read_only()
                .initial(21.5)
                .build()?,
        )
        .event(
            Event::builder(OVERHEATED_EVENT)
                .title("Overheated")
                .semantic_type("OverheatedEvent")
                .description("The temperature rose above the alarm threshold")
                .value_type(ValueType::Number)
                .build()?,
        )
        .build()
}
