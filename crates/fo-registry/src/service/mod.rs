//! Registry services.
//!
//! `NodeRegistry` owns node records, role sets, and metrics.
//! `RotationScheduler` owns the rotation schedule and exposes the
//! lifecycle operations that can move the submitter role (activation,
//! deactivation, suspension, backup failover, rotation), so the schedule
//! is mutated only by rotation operations.

mod registry;
mod scheduler;

#[cfg(test)]
mod tests;

pub use registry::NodeRegistry;
pub use scheduler::RotationScheduler;
