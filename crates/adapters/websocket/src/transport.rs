//! WebSocket implementation of the [`Transport`] port.
//!
//! Same shape as the TCP adapter: `connect` spawns a link task that dials,
//! performs the upgrade handshake, relays text messages and redials after
//! `reconnect_delay` whenever the link drops. The handle keeps only channel
//! ends and the shared "connected" flag.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::{SinkExt, StreamExt};
use qubelink_app::ports::{Transport, TransportError, TransportEvent};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::config::WsConfig;
use crate::error::WsError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket link to the hub.
pub struct WsTransport {
    config: WsConfig,
    connected: Arc<AtomicBool>,
    outgoing: Option<mpsc::Sender<String>>,
    events: Option<mpsc::UnboundedReceiver<TransportEvent>>,
    task: Option<JoinHandle<()>>,
}

impl WsTransport {
    #[must_use]
    pub fn new(config: WsConfig) -> Self {
        Self {
            config,
            connected: Arc::new(AtomicBool::new(false)),
            outgoing: None,
            events: None,
            task: None,
        }
    }

    /// Whether a link to the hub is currently up.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

impl Transport for WsTransport {
    async fn connect(&mut self) -> Result<(), TransportError> {
        if self.task.is_some() {
            return Ok(());
        }
        if self.config.tls {
            install_crypto_provider();
        }
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (outgoing_tx, outgoing_rx) = mpsc::channel(self.config.send_queue_capacity.max(1));
        let link = Link {
            config: self.config.clone(),
            connected: Arc::clone(&self.connected),
            events: event_tx,
            outgoing: outgoing_rx,
        };
        tracing::debug!(url = %self.config.url(), "starting link task");
        self.task = Some(tokio::spawn(link.run()));
        self.outgoing = Some(outgoing_tx);
        self.events = Some(event_rx);
        Ok(())
    }

    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }
        let Some(outgoing) = &self.outgoing else {
            return Err(TransportError::NotConnected);
        };
        outgoing.try_send(text).map_err(|err| match err {
            TrySendError::Full(_) => TransportError::QueueFull,
            TrySendError::Closed(_) => TransportError::Closed,
        })
    }

    async fn next_event(&mut self) -> Option<TransportEvent> {
        match &mut self.events {
            Some(events) => events.recv().await,
            None => None,
        }
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// rustls needs a process-wide provider before the first `wss://` dial.
fn install_crypto_provider() {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        tracing::debug!("crypto provider already installed");
    }
}

/// How one established link ended.
enum LinkEnd {
    /// The hub closed the connection; redial.
    Closed,
    /// The transport handle is gone; stop for good.
    Abandoned,
}

/// State owned by the spawned link task.
struct Link {
    config: WsConfig,
    connected: Arc<AtomicBool>,
    events: mpsc::UnboundedSender<TransportEvent>,
    outgoing: mpsc::Receiver<String>,
}

impl Link {
    async fn run(mut self) {
        let url = self.config.url();
        loop {
            match self.dial(&url).await {
                Ok(stream) => {
                    self.discard_stale_frames();
                    tracing::info!(%url, "link established");
                    self.connected.store(true, Ordering::Release);
                    if !self.emit(TransportEvent::Connected) {
                        return;
                    }

                    let end = self.serve(stream).await;
                    self.connected.store(false, Ordering::Release);
                    match end {
                        Ok(LinkEnd::Closed) => tracing::info!(%url, "hub closed the link"),
                        Ok(LinkEnd::Abandoned) => return,
                        Err(err) => {
                            tracing::warn!(%url, error = %err.report(), "link failed");
                            if !self.emit(TransportEvent::Error(err.report())) {
                                return;
                            }
                        }
                    }
                    if !self.emit(TransportEvent::Disconnected) {
                        return;
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err.report(), "connect attempt failed");
                    if !self.emit(TransportEvent::Error(err.report())) {
                        return;
                    }
                }
            }
            tokio::time::sleep(self.config.reconnect_delay()).await;
        }
    }

    fn protocol_config(&self) -> WebSocketConfig {
        WebSocketConfig {
            max_message_size: Some(self.config.max_frame_bytes),
            max_frame_size: Some(self.config.max_frame_bytes),
            ..WebSocketConfig::default()
        }
    }

    async fn dial(&self, url: &str) -> Result<WsStream, WsError> {
        let attempt =
            tokio_tungstenite::connect_async_with_config(url, Some(self.protocol_config()), true);
        match tokio::time::timeout(self.config.connect_timeout(), attempt).await {
            Ok(Ok((stream, response))) => {
                tracing::debug!(status = %response.status(), "upgrade accepted");
                Ok(stream)
            }
            Ok(Err(source)) => Err(WsError::Connect {
                url: url.to_string(),
                source,
            }),
            Err(_) => Err(WsError::Timeout {
                url: url.to_string(),
            }),
        }
    }

    async fn serve(&mut self, stream: WsStream) -> Result<LinkEnd, WsError> {
        let (mut sink, mut messages) = stream.split();
        loop {
            tokio::select! {
                message = messages.next() => {
                    let Some(message) = message else {
                        return Ok(LinkEnd::Closed);
                    };
                    match message.map_err(WsError::Link)? {
                        Message::Text(text) => {
                            if text.trim().is_empty() {
                                continue;
                            }
                            if !self.emit(TransportEvent::Text(text)) {
                                return Ok(LinkEnd::Abandoned);
                            }
                        }
                        Message::Close(frame) => {
                            tracing::debug!(?frame, "close frame received");
                            return Ok(LinkEnd::Closed);
                        }
                        Message::Binary(bytes) => {
                            tracing::debug!(len = bytes.len(), "ignoring binary message");
                        }
                        Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
                    }
                }
                text = self.outgoing.recv() => {
                    let Some(text) = text else {
                        if let Err(err) = sink.close().await {
                            tracing::debug!(error = %err, "close handshake failed");
                        }
                        return Ok(LinkEnd::Abandoned);
                    };
                    sink.send(Message::Text(text)).await.map_err(WsError::Link)?;
                }
            }
        }
    }

    /// Frames queued for a link that has since dropped are not replayed.
    fn discard_stale_frames(&mut self) -> usize {
        let mut discarded = 0_usize;
        while self.outgoing.try_recv().is_ok() {
            discarded += 1;
        }
        if discarded > 0 {
            tracing::debug!(discarded, "dropped frames queued for previous link");
        }
        discarded
    }

    fn emit(&self, event: TransportEvent) -> bool {
        self.events.send(event).is_ok()
    }
}
