//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the engine and the outside world. They
//! are defined here (in `app`) so that both the engine and the adapter
//! crates can depend on them without creating circular dependencies.

pub mod executor;
pub mod integration;
pub mod transport;

pub use executor::{ActionExecutor, ActionRequest, InstantExecutor};
pub use integration::Integration;
pub use transport::{Transport, TransportError, TransportEvent};
