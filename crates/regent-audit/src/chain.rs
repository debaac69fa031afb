//! Hash-chain primitives: hashing and chain integrity verification.
//!
//! Hash input layout (bytes, in order):
//!   1. controller principal as UTF-8 bytes
//!   2. sequence as 8-byte little-endian
//!   3. prev_hash as UTF-8 bytes (64 ASCII hex chars)
//!   4. canonical JSON of the audit record (serde_json, no pretty-printing)

use sha2::{Digest, Sha256};

use regent_contracts::{
    error::{RegentError, RegentResult},
    record::AuditRecord,
};

use crate::event::ChainedEvent;

/// Compute the SHA-256 hash for one chained audit event.
///
/// Returns a lowercase 64-character hex string.
pub fn hash_event(
    controller: &str,
    sequence: u64,
    record: &AuditRecord,
    prev_hash: &str,
) -> RegentResult<String> {
    let record_json = serde_json::to_vec(record).map_err(|e| RegentError::AuditWriteFailed {
        reason: format!("audit record is not serializable: {}", e),
    })?;

    let mut hasher = Sha256::new();
    hasher.update(controller.as_bytes());
    hasher.update(sequence.to_le_bytes());
    hasher.update(prev_hash.as_bytes());
    hasher.update(&record_json);

    Ok(hex::encode(hasher.finalize()))
}

/// Verify the integrity of a hash chain.
///
/// Valid when every event links to its predecessor (or the genesis hash),
/// sequences run 0, 1, 2, … without gaps, and every stored hash matches
/// the recomputed one. An empty chain is valid.
pub fn verify_chain(events: &[ChainedEvent]) -> bool {
    let mut expected_prev = ChainedEvent::GENESIS_HASH.to_string();

    for (position, event) in events.iter().enumerate() {
        if event.sequence != position as u64 || event.prev_hash != expected_prev {
            return false;
        }

        match hash_event(&event.controller, event.sequence, &event.record, &event.prev_hash) {
            Ok(recomputed) if recomputed == event.this_hash => {}
            _ => return false,
        }

        expected_prev = event.this_hash.clone();
    }

    true
}
