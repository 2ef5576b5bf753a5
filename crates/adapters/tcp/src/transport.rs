//! Newline-framed TCP implementation of the [`Transport`] port.
//!
//! `connect` spawns a link task that owns the socket for its whole life:
//! it dials, relays lines in both directions, and redials after
//! `reconnect_delay` whenever the link drops. The transport handle only
//! holds the two channel ends and a shared "connected" flag, so every
//! method it exposes is cancel-safe.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::{SinkExt, StreamExt};
use qubelink_app::ports::{Transport, TransportError, TransportEvent};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};

use crate::config::TcpConfig;
use crate::error::TcpError;

/// TCP link to the hub.
pub struct TcpTransport {
    config: TcpConfig,
    connected: Arc<AtomicBool>,
    outgoing: Option<mpsc::Sender<String>>,
    events: Option<mpsc::UnboundedReceiver<TransportEvent>>,
    task: Option<JoinHandle<()>>,
}

impl TcpTransport {
    #[must_use]
    pub fn new(config: TcpConfig) -> Self {
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

impl Transport for TcpTransport {
    async fn connect(&mut self) -> Result<(), TransportError> {
        if self.task.is_some() {
            return Ok(());
        }
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (outgoing_tx, outgoing_rx) = mpsc::channel(self.config.send_queue_capacity.max(1));
        let link = Link {
            config: self.config.clone(),
            connected: Arc::clone(&self.connected),
            events: event_tx,
            outgoing: outgoing_rx,
        };
        tracing::debug!(address = %self.config.address(), "starting link task");
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

impl Drop for TcpTransport {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// How one established link ended.
enum LinkEnd {
    /// The hub closed the stream; redial.
    Closed,
    /// The transport handle is gone; stop for good.
    Abandoned,
}

/// State owned by the spawned link task.
struct Link {
    config: TcpConfig,
    connected: Arc<AtomicBool>,
    events: mpsc::UnboundedSender<TransportEvent>,
    outgoing: mpsc::Receiver<String>,
}

impl Link {
    async fn run(mut self) {
        let address = self.config.address();
        loop {
            match self.dial(&address).await {
                Ok(stream) => {
                    self.discard_stale_frames();
                    tracing::info!(%address, "link established");
                    self.connected.store(true, Ordering::Release);
                    if !self.emit(TransportEvent::Connected) {
                        return;
                    }

                    let end = self.serve(stream).await;
                    self.connected.store(false, Ordering::Release);
                    match end {
                        Ok(LinkEnd::Closed) => tracing::info!(%address, "hub closed the link"),
                        Ok(LinkEnd::Abandoned) => return,
                        Err(err) => {
                            tracing::warn!(%address, error = %err.report(), "link failed");
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

    async fn dial(&self, address: &str) -> Result<TcpStream, TcpError> {
        let attempt = TcpStream::connect(address);
        let stream = match tokio::time::timeout(self.config.connect_timeout(), attempt).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => {
                return Err(TcpError::Connect {
                    address: address.to_string(),
                    source,
                });
            }
            Err(_) => {
                return Err(TcpError::Timeout {
                    address: address.to_string(),
                });
            }
        };
        if let Err(err) = stream.set_nodelay(true) {
            tracing::debug!(error = %err, "could not disable nagle");
        }
        Ok(stream)
    }

    async fn serve(&mut self, stream: TcpStream) -> Result<LinkEnd, TcpError> {
        let limit = self.config.max_frame_bytes;
        let (reader, writer) = stream.into_split();
        let mut lines = FramedRead::new(reader, LinesCodec::new_with_max_length(limit));
        let mut sink = FramedWrite::new(writer, LinesCodec::new());
        loop {
            tokio::select! {
                line = lines.next() => {
                    let Some(line) = line else {
                        return Ok(LinkEnd::Closed);
                    };
                    let line = line.map_err(|err| TcpError::from_codec(err, limit))?;
                    if line.trim().is_empty() {
                        continue;
                    }
                    if !self.emit(TransportEvent::Text(line)) {
                        return Ok(LinkEnd::Abandoned);
                    }
                }
                text = self.outgoing.recv() => {
                    let Some(text) = text else {
                        return Ok(LinkEnd::Abandoned);
                    };
                    sink.send(text).await.map_err(|err| TcpError::from_codec(err, limit))?;
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
