//! # qubelinkd — qubelink adapter daemon
//!
//! Composition root that wires all adapters together and runs the bridge.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Install the `tracing` subscriber
//! - Set up integrations and register the things they provide
//! - Construct the engine, injecting the integration's executor
//! - Connect the configured transport (WebSocket or TCP) to the hub and run
//!   the bridge loop
//! - Handle graceful shutdown (Ctrl-C)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no protocol logic belongs here.

mod config;

use qubelink_adapter_tcp::TcpTransport;
use qubelink_adapter_virtual::VirtualIntegration;
use qubelink_adapter_websocket::WsTransport;
use qubelink_app::bridge::Bridge;
use qubelink_app::engine::{Engine, EngineConfig};
use qubelink_app::ports::{ActionExecutor, Integration, Transport, TransportError};
use qubelink_app::signal::{self, SignalReceiver};
use qubelink_domain::registry::Registry;
use tracing_subscriber::EnvFilter;

use config::{Config, HubTransport};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Things
    let (signal_tx, signal_rx) = signal::channel();
    let mut registry = Registry::new();
    let mut integration = VirtualIntegration::new(config.integrations.virtual_config());
    if config.integrations.virtual_enabled {
        for device in integration.setup().await? {
            registry.register(device)?;
        }
        integration.start_background(signal_tx.clone());
        tracing::info!(integration = integration.name(), "integration started");
    }

    // Engine
    let engine = Engine::new(
        registry,
        integration.executor(),
        signal_tx,
        EngineConfig {
            max_message_bytes: config.engine.max_message_bytes,
        },
    );

    // Transport
    tracing::info!(
        hub = %config.hub.endpoint(),
        things = engine.registry().len(),
        "qubelinkd starting"
    );
    match config.hub.transport {
        HubTransport::Websocket => {
            let transport = WsTransport::new(config.hub.websocket());
            run_bridge(transport, engine, signal_rx, &config).await?;
        }
        HubTransport::Tcp => {
            let transport = TcpTransport::new(config.hub.tcp());
            run_bridge(transport, engine, signal_rx, &config).await?;
        }
    }

    integration.teardown().await?;
    tracing::info!("qubelinkd stopped");
    Ok(())
}

async fn run_bridge<T, E>(
    transport: T,
    engine: Engine<E>,
    signals: SignalReceiver,
    config: &Config,
) -> Result<(), TransportError>
where
    T: Transport,
    E: ActionExecutor,
{
    Bridge::new(transport, engine, signals)
        .with_tick_interval(config.engine.tick_interval())
        .run(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
