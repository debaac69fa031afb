//! In-memory implementation of `AuditWriter`.
//!
//! `InMemoryAuditWriter` keeps all chained events in a `Vec` behind a
//! `Mutex`. Hand the controller an `Arc` of it and keep a clone of the `Arc`
//! to export or verify the chain later.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::debug;

use regent_contracts::{
    error::{RegentError, RegentResult},
    record::AuditRecord,
};
use regent_core::traits::AuditWriter;

use crate::{
    chain::{hash_event, verify_chain},
    event::{AuditLog, ChainedEvent},
};

// ── Internal mutable state ────────────────────────────────────────────────────

pub(crate) struct InMemoryState {
    /// All events written so far, in append order.
    pub(crate) events: Vec<ChainedEvent>,

    /// The next sequence number to assign (starts at 0).
    pub(crate) sequence: u64,

    /// `this_hash` of the last event, or `GENESIS_HASH` before any write.
    pub(crate) last_hash: String,
}

// ── Public writer ─────────────────────────────────────────────────────────────

/// An append-only audit writer for one controller, backed by a SHA-256
/// hash chain.
pub struct InMemoryAuditWriter {
    controller: String,
    pub(crate) state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryAuditWriter {
    /// Create a writer that accepts records from `controller` only.
    pub fn new(controller: impl Into<String>) -> Self {
        let state = InMemoryState {
            events: Vec::new(),
            sequence: 0,
            last_hash: ChainedEvent::GENESIS_HASH.to_string(),
        };
        Self {
            controller: controller.into(),
            state: Arc::new(Mutex::new(state)),
        }
    }

    // Readers never observe a half-written event: each write pushes and
    // advances in one critical section with no fallible step in between.
    fn read(&self) -> MutexGuard<'_, InMemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of events written so far.
    pub fn len(&self) -> usize {
        self.read().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The audit records in chain order.
    pub fn records(&self) -> Vec<AuditRecord> {
        self.read().events.iter().map(|e| e.record.clone()).collect()
    }

    /// Export a snapshot containing every event written so far.
    pub fn export_log(&self) -> AuditLog {
        let state = self.read();
        let terminal_hash = state
            .events
            .last()
            .map(|e| e.this_hash.clone())
            .unwrap_or_default();

        AuditLog {
            controller: self.controller.clone(),
            events: state.events.clone(),
            exported_at: Utc::now(),
            terminal_hash,
        }
    }

    /// Verify that the in-memory chain has not been tampered with.
    pub fn verify_integrity(&self) -> bool {
        verify_chain(&self.read().events)
    }
}

// ── AuditWriter impl ──────────────────────────────────────────────────────────

impl AuditWriter for InMemoryAuditWriter {
    /// Append one record to the hash chain.
    ///
    /// Records from any controller other than the one this writer was
    /// created for are refused.
    fn write(&self, record: &AuditRecord) -> RegentResult<()> {
        if record.controller.as_str() != self.controller {
            return Err(RegentError::AuditWriteFailed {
                reason: format!(
                    "record from controller '{}' written to log of '{}'",
                    record.controller, self.controller
                ),
            });
        }

        let mut state = self.state.lock().map_err(|e| RegentError::AuditWriteFailed {
            reason: format!("audit state lock poisoned: {}", e),
        })?;

        let prev_hash = state.last_hash.clone();
        let sequence = state.sequence;
        let this_hash = hash_event(&self.controller, sequence, record, &prev_hash)?;

        state.events.push(ChainedEvent {
            sequence,
            controller: self.controller.clone(),
            record: record.clone(),
            prev_hash,
            this_hash: this_hash.clone(),
        });
        state.sequence += 1;
        state.last_hash = this_hash;

        debug!(
            controller = %self.controller,
            sequence,
            operation = record.operation.tag(),
            "audit event appended"
        );

        Ok(())
    }
}
