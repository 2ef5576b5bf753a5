//! # qubelink-adapter-tcp
//!
//! TCP transport adapter — carries the JSON envelopes between the engine and
//! the hub over a plain TCP stream, one envelope per line.
//!
//! ## Responsibilities
//! - Connect to the configured hub address, bounded by a connect timeout
//! - Split inbound bytes into text frames on `\n`, dropping the link when a
//!   line outgrows `max_frame_bytes`
//! - Write outbound frames followed by `\n` from a bounded queue
//! - Reconnect after a fixed delay whenever the link drops, reporting every
//!   transition as a [`TransportEvent`](qubelink_app::ports::TransportEvent)
//!
//! ## Dependency rule
//! Depends on `qubelink-app` (port traits) only.

mod config;
mod error;
mod transport;

pub use config::{DEFAULT_MAX_FRAME_BYTES, DEFAULT_SEND_QUEUE_CAPACITY, TcpConfig};
pub use error::TcpError;
pub use transport::TcpTransport;
