//! # fo-security
//!
//! Security gate for the fee-oracle core: every candidate submission is
//! admitted or rejected here before it can reach the consensus engine.
//!
//! ## Admission checks, in order
//!
//! 1. Blacklist membership
//! 2. System-wide pause (threat level at maximum)
//! 3. Replay protection (per-node seen payload-hash set, never expires)
//! 4. Signature validation (injected `SignatureVerifier` capability)
//! 5. Lockout + sliding rate window (default 100 submissions/hour)
//!
//! Per-node state lives in a sharded map, so admission checks for
//! different nodes proceed in parallel while each node's own profile is
//! serialized.

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{
    SecurityConfig, SecurityError, SecurityProfile, SecurityResult, ThreatAlert, ThreatState,
};
pub use ports::{DevSignatureVerifier, NullReputationHook, ReputationHook, SignatureVerifier};
pub use service::{hash_payload, SecurityGate};
