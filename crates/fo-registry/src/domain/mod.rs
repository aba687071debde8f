//! Domain entities for the node registry and rotation scheduler.

mod config;
mod error;
mod node;
mod rotation;

pub use config::{RegistryConfig, MAX_ROTATION_INTERVAL_SECS, MIN_ROTATION_INTERVAL_SECS};
pub use error::{RegistryError, RegistryResult};
pub use node::{Node, NodeRole, PerformanceMetrics};
pub use rotation::RotationSchedule;
