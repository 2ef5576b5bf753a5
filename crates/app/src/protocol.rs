//! Wire protocol — JSON envelopes exchanged with the hub.
//!
//! Every envelope is a JSON object carrying a `messageType` discriminator.
//! Inbound envelopes are parsed into typed [`Request`]s; everything the
//! adapter sends is an [`Outbound`] rendered by the size-bounded
//! [`Encoder`].

mod encoder;
mod inbound;
mod outbound;

pub use encoder::{DEFAULT_MAX_MESSAGE_BYTES, Encoder, MIN_MESSAGE_BYTES};
pub use inbound::{InboundEnvelope, Request};
pub use outbound::{ErrorEnvelope, Outbound};
