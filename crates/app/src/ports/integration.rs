//! Integration port — lifecycle for a source of things.
//!
//! An integration contributes devices to the registry at startup, runs their
//! actions through its own [`ActionExecutor`] and may keep background tasks
//! alive that push readings into the engine loop.

use std::future::Future;

use qubelink_domain::device::Device;
use qubelink_domain::error::ThingError;

use super::executor::ActionExecutor;
use crate::signal::SignalSender;

/// A pluggable source of things.
///
/// Implementations live in adapter crates (e.g. `adapter_virtual`).
/// The binary crate calls the lifecycle methods in order:
///
/// 1. [`setup`](Self::setup): build the devices to register
/// 2. [`executor`](Self::executor): obtain the executor handed to the engine
/// 3. [`start_background`](Self::start_background): spawn long-running drivers
/// 4. [`teardown`](Self::teardown): stop them on shutdown
pub trait Integration {
    /// Executor running this integration's actions.
    type Executor: ActionExecutor;

    /// Unique name identifying this integration (e.g. `"virtual"`).
    fn name(&self) -> &'static str;

    /// Build the devices this integration owns.
    fn setup(&mut self) -> impl Future<Output = Result<Vec<Device>, ThingError>> + Send;

    fn executor(&self) -> Self::Executor;

    /// Spawn background drivers that report through `signals`.
    ///
    /// The default implementation is a no-op.
    fn start_background(&mut self, _signals: SignalSender) {}

    /// Called on graceful shutdown.
    fn teardown(&mut self) -> impl Future<Output = Result<(), ThingError>> + Send;
}
