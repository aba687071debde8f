//! Core domain identifiers and value types shared across subsystems.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 32-byte payload hash (SHA-256 of a submission payload).
pub type Hash = [u8; 32];

/// Fee observation in fixed-point basis points.
pub type FeeBps = u64;

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// 160-bit node identifier (address-style).
///
/// Ordering is lexicographic over the raw bytes; role sets iterate in this
/// order, which makes candidate selection deterministic regardless of the
/// order nodes were activated in.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub [u8; 20]);

impl NodeId {
    /// Create a NodeId from a raw 20-byte array.
    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Zero-initialized NodeId.
    pub fn zero() -> Self {
        Self([0u8; 20])
    }

    /// Build a NodeId whose low 8 bytes encode `n` (test/demo helper).
    pub fn from_low_u64(n: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&n.to_be_bytes());
        Self(bytes)
    }
}

impl AsRef<[u8]> for NodeId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({self})")
    }
}
