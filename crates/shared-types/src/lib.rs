//! # Shared Types Crate
//!
//! Cross-subsystem types for the fee-oracle core.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All types shared between the registry,
//!   security gate, and consensus engine are defined here.
//! - **Injectable Collaborators**: The clock (`TimeSource`) and the audit
//!   log (`EventSink`) are ports, so every component can run against a
//!   manual clock and an in-memory sink in tests.

pub mod entities;
pub mod events;
pub mod time;

pub use entities::*;
pub use events::{EventSink, InMemoryEventSink, NullEventSink, OracleEvent};
pub use time::{ManualTimeSource, SystemTimeSource, TimeSource};
