//! # qubelink-app
//!
//! Application layer — the protocol engine and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `Transport` — a persistent duplex text channel to the hub
//!   - `ActionExecutor` — runs action invocations outside the engine
//!   - `Integration` — contributes devices and background drivers
//! - Define the wire **protocol**: inbound requests, outbound envelopes and
//!   the size-bounded encoder
//! - Provide the synchronous core:
//!   - `Dispatcher` — routes one request to one response envelope
//!   - `ChangeNotifier` — the diff tick reporting coalesced property changes
//!   - `ActionLifecycle` — starts invocations and applies their outcomes
//!   - `Engine` — owns the registry and ties the three together
//! - Provide the async `Bridge` that drives the engine from a single loop
//!
//! ## Dependency rule
//! Depends on `qubelink-domain` only (plus `tokio` for channels and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod bridge;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod notifier;
pub mod ports;
pub mod protocol;
pub mod signal;
