//! # fo-registry
//!
//! Node registry and rotation scheduler for the fee-oracle core.
//!
//! ## Architecture
//!
//! `NodeRegistry` owns node identity, the role state machine, reputation,
//! and performance metrics. `RotationScheduler` owns the single rotation
//! schedule and every operation that can move the submitter seat, so a
//! deactivated or suspended submitter is always rotated away in the same
//! call that removed it.
//!
//! ## Role state machine
//!
//! ```text
//! Unregistered -> Inactive -> {Active, Submitter, Validator, Backup} -> Suspended
//!                     ^                                                    |
//!                     +--------------- reactivate (admin) ----------------+
//! ```
//!
//! A node belongs to exactly one role set at a time; Active, Submitter,
//! and Validator additionally count toward the generic active set.

pub mod domain;
pub mod service;

pub use domain::{
    Node, NodeRole, PerformanceMetrics, RegistryConfig, RegistryError, RegistryResult,
    RotationSchedule,
};
pub use service::{NodeRegistry, RotationScheduler};
