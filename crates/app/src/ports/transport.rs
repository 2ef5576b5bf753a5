//! Transport port — a persistent, ordered, duplex text channel to the hub.
//!
//! The engine never sees sockets. Framing, connection setup and the
//! reconnect policy all belong to the adapter; the bridge only reacts to the
//! events it is handed.

use std::future::Future;

/// Something that happened on the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The channel (re)connected to the hub.
    Connected,
    /// The channel went down; the adapter may reconnect on its own.
    Disconnected,
    /// One decoded text frame.
    Text(String),
    /// A non-fatal error reported by the adapter.
    Error(String),
}

/// Failures surfaced by a [`Transport`].
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("transport is not connected")]
    NotConnected,

    #[error("transport is closed")]
    Closed,

    /// The outbound queue is at capacity; the frame was not accepted.
    #[error("transport send queue is full")]
    QueueFull,

    #[error("transport i/o failed")]
    Io(#[from] std::io::Error),
}

/// A duplex text channel.
///
/// Implementations live in adapter crates (`adapter-websocket`, `adapter-tcp`). The bridge
/// calls [`connect`](Self::connect) once, then alternates between
/// [`next_event`](Self::next_event) and [`send_text`](Self::send_text) from
/// a single task.
pub trait Transport {
    /// Start the connection. Returns once the adapter is running; the actual
    /// link is reported later as [`TransportEvent::Connected`].
    fn connect(&mut self) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Queue one text frame for the current link.
    ///
    /// Never waits for the peer: a saturated queue yields
    /// [`TransportError::QueueFull`] instead.
    fn send_text(&mut self, text: String)
    -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Wait for the next channel event. `None` means the transport is gone
    /// for good.
    ///
    /// Must be cancel-safe: the bridge drops this future whenever another
    /// branch of its loop wins.
    fn next_event(&mut self) -> impl Future<Output = Option<TransportEvent>> + Send;
}
