//! Virtual device definitions — lamp and thermometer.
//!
//! Ids are fixed so the hub sees the same things across restarts.

mod lamp;
mod thermometer;

pub use lamp::{LAMP_ID, lamp};
pub use thermometer::{OVERHEATED_EVENT, TEMPERATURE_PROPERTY, THERMOMETER_ID, thermometer};
