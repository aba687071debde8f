//! Domain entities for the security gate.

mod config;
mod error;
mod profile;
mod threat;

pub use config::SecurityConfig;
pub use error::{SecurityError, SecurityResult};
pub use profile::SecurityProfile;
pub use threat::{ThreatAlert, ThreatState, MAX_THREAT_LEVEL};
