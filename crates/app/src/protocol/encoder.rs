//! Size-bounded envelope encoder.
//!
//! Outbound text never exceeds the configured limit. An envelope that would
//! is replaced by an `error` envelope with code `413`; it is never
//! truncated.

use crate::error::ProtocolError;
use crate::protocol::{ErrorEnvelope, Outbound};

/// Default upper bound for one outbound envelope, in bytes.
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 4096;

/// Smallest accepted bound. Large enough for any identifier-free error
/// envelope.
pub const MIN_MESSAGE_BYTES: usize = 256;

/// Serializes [`Outbound`] envelopes under a byte limit.
#[derive(Debug, Clone, Copy)]
pub struct Encoder {
    limit: usize,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MESSAGE_BYTES)
    }
}

impl Encoder {
    /// Create an encoder; limits below [`MIN_MESSAGE_BYTES`] are raised to it.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(MIN_MESSAGE_BYTES),
        }
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Serialize `envelope`, failing if it does not fit.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::EncodingOverflow`] when the encoded text is
    /// longer than the limit and [`ProtocolError::Encode`] if serialization
    /// itself fails.
    pub fn encode(&self, envelope: &Outbound) -> Result<String, ProtocolError> {
        let text = serde_json::to_string(envelope).map_err(ProtocolError::Encode)?;
        if text.len() > self.limit {
            return Err(ProtocolError::EncodingOverflow {
                size: text.len(),
                limit: self.limit,
            });
        }
        Ok(text)
    }

    /// Serialize `envelope`, substituting an `error` envelope on failure.
    ///
    /// The substitute keeps the original envelope's `thingId` when it fits
    /// and drops every identifier otherwise.
    #[must_use]
    pub fn render(&self, envelope: &Outbound) -> String {
        match self.encode(envelope) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(
                    message_type = envelope.message_type(),
                    error = %err,
                    "replacing outbound envelope with error"
                );
                let mut substitute = err.to_envelope();
                substitute.thing_id = envelope.thing_id().map(ToString::to_string);
                self.encode(&Outbound::Error(substitute.clone()))
                    .unwrap_or_else(|_| self.render_minimal(&substitute))
            }
        }
    }

    fn render_minimal(&self, envelope: &ErrorEnvelope) -> String {
        let minimal = Outbound::Error(envelope.without_ids());
        serde_json::to_string(&minimal).unwrap_or_else(|_| {
            format!(
                r#"{{"messageType":"error","errorCode":"{}"}}"#,
                envelope.error_code
            )
        })
    }
}
