//! Virtual lamp — switchable, dimmable, with a `fade` action.

use qubelink_domain::action::Action;
use qubelink_domain::device::Device;
use qubelink_domain::error::ValidationError;
use qubelink_domain::property::Property;
use qubelink_domain::value::ValueType;
use serde_json::json;

pub const LAMP_ID: &str = "lamp1";

/// Build the lamp.
///
/// # Errors
///
/// Returns a validation error if a builder rejects its input (should not
/// happen with hardcoded inputs).
pub fn lamp() -> Result<Device, ValidationError> {
    Device::builder()
        .id(LAMP_ID)
        .title("Virtual Lamp")
        .type_tag("OnOffSwitch")
        .type_tag("Light")
        .description("A dimmable lamp simulated in memory")
        .property(
            Property::builder("on", ValueType::Boolean)
                .title("On/Off")
                .semantic_type("OnOffProperty")
                .initial(false)
                .build()?,
        )
        .property(
            Property::builder("brightness", ValueType::Integer)
                .title("Brightness")
                .semantic_type("BrightnessProperty")
                .unit("percent")
                .minimum(0.0)
                .maximum(100.0)
                .initial(50_i64)
                .build()?,
        )
        .action(
            Action::builder("fade")
                .title("Fade")
                .semantic_type("FadeAction")
                .description("Fade the lamp to a new brightness")
                .input(json!({
                    "type": "object",
                    "required": ["level"],
                    "properties": {
                        "level": {"type": "integer", "minimum": 0, "maximum": 100, "unit": "percent"}
                    }
                }))
                .build()?,
        )
        .action(
            Action::builder("blink")
                .title("Blink")
                .description("Flash the lamp once")
                .build()?,
        )
        .build()
}
