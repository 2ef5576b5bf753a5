//! # qubelink-domain
//!
//! Pure thing model for the qubelink device adapter.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Devices** (things with an id, a title and semantic type tags)
//! - Define **Properties** (typed values with change tracking)
//! - Define **Actions** and their **Invocations** (`created → started → completed | error`)
//! - Define **Events** (bounded queues of timestamped records)
//! - Produce **Thing descriptions**, the serializable view of the model
//! - Contain all invariant enforcement: unique ids, type and range checks,
//!   legal lifecycle transitions
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod action;
pub mod catalog;
pub mod description;
pub mod device;
pub mod event;
pub mod ordered;
pub mod property;
pub mod registry;
pub mod value;
