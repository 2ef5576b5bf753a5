//! # qubelink-adapter-websocket
//!
//! WebSocket transport adapter — carries the JSON envelopes between the
//! engine and the hub as WebSocket text messages, one envelope per message.
//!
//! ## Responsibilities
//! - Open `ws://host:port/path`, or `wss://` with TLS, bounded by a connect
//!   timeout
//! - Relay text messages in both directions; binary messages are ignored and
//!   ping/pong is answered by the protocol layer
//! - Drop the link when a message outgrows `max_frame_bytes`
//! - Reconnect after a fixed delay whenever the link drops, reporting every
//!   transition as a [`TransportEvent`](qubelink_app::ports::TransportEvent)
//!
//! ## Dependency rule
//! Depends on `qubelink-app` (port traits) only.

mod config;
mod error;
mod transport;

pub use config::{DEFAULT_MAX_FRAME_BYTES, DEFAULT_SEND_QUEUE_CAPACITY, WsConfig};
pub use error::WsError;
pub use transport::WsTransport;
