//! WebSocket adapter error types.

use tokio_tungstenite::tungstenite;

/// Errors specific to the WebSocket adapter.
#[derive(Debug, thiserror::Error)]
pub enum WsError {
    /// The TCP connect, TLS or upgrade handshake failed.
    #[error("failed to connect to {url}")]
    Connect {
        url: String,
        #[source]
        source: tungstenite::Error,
    },

    /// The connect attempt did not finish in time.
    #[error("timed out connecting to {url}")]
    Timeout { url: String },

    /// An established link failed while reading or writing.
    #[error("websocket link failed")]
    Link(#[source] tungstenite::Error),
}

impl WsError {
    /// Render the error together with its source, for transport error events.
    #[must_use]
    pub fn report(&self) -> String {
        match std::error::Error::source(self) {
            Some(source) => format!("{self}: {source}"),
            None => self.to_string(),
        }
    }
}
