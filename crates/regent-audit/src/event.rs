//! Chained audit event and exported log types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use regent_contracts::record::AuditRecord;

/// One entry in a controller's SHA-256 hash chain.
///
/// Modifying any field, including the embedded `record`, invalidates
/// `this_hash` and every later `prev_hash`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainedEvent {
    /// Position in the chain, starting at 0.
    pub sequence: u64,

    /// The controller whose calls this chain records.
    pub controller: String,

    pub record: AuditRecord,

    /// Hash of the previous event, or `GENESIS_HASH` for the first.
    pub prev_hash: String,

    pub this_hash: String,
}

impl ChainedEvent {
    /// The `prev_hash` of the first event in every chain.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";
}

/// An exported snapshot of a controller's audit chain.
///
/// `terminal_hash` is the last event's `this_hash` and commits to the whole
/// log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    pub controller: String,
    pub events: Vec<ChainedEvent>,
    pub exported_at: DateTime<Utc>,
    /// Empty string if the log is empty.
    pub terminal_hash: String,
}
