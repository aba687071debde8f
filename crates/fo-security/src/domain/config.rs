//! Security gate configuration.

use serde::{Deserialize, Serialize};

/// Configuration for admission control and threat escalation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Maximum submissions per node per rate window.
    pub rate_limit_max: u32,
    /// Sliding rate window length in seconds.
    pub rate_window_secs: u64,
    /// Lockout applied when the rate ceiling is exceeded, seconds.
    pub lockout_secs: u64,
    /// Replay offenses from one node before it is auto-blacklisted.
    pub auto_blacklist_offenses: u32,
    /// Threat level at which admission pauses system-wide.
    pub auto_pause_level: u8,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            rate_limit_max: 100,
            rate_window_secs: 3_600,
            lockout_secs: 600,
            auto_blacklist_offenses: 3,
            auto_pause_level: 5,
        }
    }
}
