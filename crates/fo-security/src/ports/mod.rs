//! Ports for security-gate collaborators.

use shared_types::{Hash, NodeId};

/// Capability interface for signature verification.
///
/// The gate only relies on the contract "a valid signature proves
/// authorship"; the cryptographic primitive behind it is a collaborator
/// concern and is injected.
pub trait SignatureVerifier: Send + Sync {
    fn verify(&self, node: NodeId, payload_hash: &Hash, signature: &[u8]) -> bool;
}

/// Structural development verifier: accepts any signature of at least
/// `min_len` bytes. Stands in until a real verifier is wired.
pub struct DevSignatureVerifier {
    pub min_len: usize,
}

impl Default for DevSignatureVerifier {
    fn default() -> Self {
        Self { min_len: 32 }
    }
}

impl SignatureVerifier for DevSignatureVerifier {
    fn verify(&self, _node: NodeId, _payload_hash: &Hash, signature: &[u8]) -> bool {
        signature.len() >= self.min_len
    }
}

/// Outbound hook for reputation consequences the gate triggers.
pub trait ReputationHook: Send + Sync {
    /// A submission from `node` was rejected at the gate.
    fn record_failed_attempt(&self, node: NodeId);
}

/// Hook that does nothing (standalone gate, tests).
pub struct NullReputationHook;

impl ReputationHook for NullReputationHook {
    fn record_failed_attempt(&self, _node: NodeId) {}
}
