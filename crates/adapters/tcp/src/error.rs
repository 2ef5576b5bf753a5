//! TCP adapter error types.

use tokio_util::codec::LinesCodecError;

/// Errors specific to the TCP adapter.
#[derive(Debug, thiserror::Error)]
pub enum TcpError {
    /// The hub refused or reset the connection attempt.
    #[error("failed to connect to {address}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// The connect attempt did not finish in time.
    #[error("timed out connecting to {address}")]
    Timeout { address: String },

    /// The hub sent a line longer than the configured cap.
    #[error("inbound line exceeds the {limit}-byte frame limit")]
    FrameTooLong { limit: usize },

    /// Reading from or writing to an established link failed.
    #[error("link i/o failed")]
    Io(#[source] std::io::Error),
}

impl TcpError {
    pub(crate) fn from_codec(err: LinesCodecError, limit: usize) -> Self {
        match err {
            LinesCodecError::MaxLineLengthExceeded => Self::FrameTooLong { limit },
            LinesCodecError::Io(err) => Self::Io(err),
        }
    }

    /// Render the error together with its source, for transport error events.
    #[must_use]
    pub fn report(&self) -> String {
        match std::error::Error::source(self) {
            Some(source) => format!("{self}: {source}"),
            None => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_timeout_error() {
        let err = TcpError::Timeout {
            address: "hub:80".to_string(),
        };
        assert_eq!(err.to_string(), "timed out connecting to hub:80");
    }

    #[test]
    fn should_map_oversized_line_to_frame_error() {
        let err = TcpError::from_codec(LinesCodecError::MaxLineLengthExceeded, 64);
        assert!(matches!(err, TcpError::FrameTooLong { limit: 64 }));
        assert_eq!(err.report(), "inbound line exceeds the 64-byte frame limit");
    }

    #[test]
    fn should_include_source_in_report() {
        let err = TcpError::Connect {
            address: "hub:80".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
        };
        assert_eq!(err.report(), "failed to connect to hub:80: refused");
    }
}
