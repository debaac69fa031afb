//! # regent-audit
//!
//! Immutable, append-only, SHA-256 hash-chained audit trail for REGENT
//! controllers.
//!
//! Every record a controller commits is wrapped in a `ChainedEvent` that
//! links to the previous event via its SHA-256 hash. Tampering with any
//! event, even a single byte, breaks the chain and is detected by
//! `verify_chain`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use regent_audit::InMemoryAuditWriter;
//!
//! let audit = Arc::new(InMemoryAuditWriter::new("controller-v1"));
//! let controller = Controller::new(principal, resources, bootstrap, audit.clone(), mode)?;
//! // ... privileged calls ...
//! assert!(audit.verify_integrity());
//! let log = audit.export_log();
//! ```

pub mod chain;
pub mod event;
pub mod memory;

pub use chain::{hash_event, verify_chain};
pub use event::{AuditLog, ChainedEvent};
pub use memory::InMemoryAuditWriter;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use regent_contracts::{
        error::RegentError,
        operation::Operation,
        principal::Principal,
        record::{AuditRecord, CallId, ControllerEvent},
    };
    use regent_core::traits::AuditWriter;

    use super::{ChainedEvent, InMemoryAuditWriter};

    // ── Helpers ───────────────────────────────────────────────────────────────

    /// Build a mint record with a distinguishable amount.
    fn make_record(controller: &str, amount: u128) -> AuditRecord {
        AuditRecord {
            call_id: CallId::new(),
            controller: Principal::new(controller),
            operation: Operation::MintTokens,
            event: ControllerEvent::MintTokens {
                sender: Principal::new("scheme-a"),
                beneficiary: Principal::new("alice"),
                amount,
            },
            timestamp: Utc::now(),
        }
    }

    // ── Tests ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_hash_chain_integrity() {
        let writer = InMemoryAuditWriter::new("ctrl");
        writer.write(&make_record("ctrl", 1)).unwrap();
        writer.write(&make_record("ctrl", 2)).unwrap();
        writer.write(&make_record("ctrl", 3)).unwrap();

        assert!(writer.verify_integrity(), "chain must be valid after sequential writes");
        assert_eq!(writer.len(), 3);
    }

    #[test]
    fn test_tamper_detection() {
        let writer = InMemoryAuditWriter::new("ctrl");
        writer.write(&make_record("ctrl", 1)).unwrap();
        writer.write(&make_record("ctrl", 2)).unwrap();

        // Inflate the first mint after the fact.
        {
            let mut state = writer.state.lock().unwrap();
            state.events[0].record.event = ControllerEvent::MintTokens {
                sender: Principal::new("scheme-a"),
                beneficiary: Principal::new("alice"),
                amount: 1_000_000,
            };
        }

        assert!(!writer.verify_integrity(), "chain must detect tampering with a stored event");
    }

    #[test]
    fn test_dropped_event_detected() {
        let writer = InMemoryAuditWriter::new("ctrl");
        writer.write(&make_record("ctrl", 1)).unwrap();
        writer.write(&make_record("ctrl", 2)).unwrap();
        writer.write(&make_record("ctrl", 3)).unwrap();

        let mut log = writer.export_log();
        log.events.remove(1);
        assert!(!super::verify_chain(&log.events));
    }

    #[test]
    fn test_genesis_hash() {
        let writer = InMemoryAuditWriter::new("ctrl");
        writer.write(&make_record("ctrl", 1)).unwrap();

        let log = writer.export_log();
        assert_eq!(log.events[0].prev_hash, ChainedEvent::GENESIS_HASH);
        assert_eq!(log.events[0].sequence, 0);
    }

    #[test]
    fn test_export_log() {
        let writer = InMemoryAuditWriter::new("ctrl");
        writer.write(&make_record("ctrl", 1)).unwrap();
        writer.write(&make_record("ctrl", 2)).unwrap();

        let log = writer.export_log();
        assert_eq!(log.controller, "ctrl");
        assert_eq!(log.events.len(), 2);
        assert_eq!(log.terminal_hash, log.events.last().unwrap().this_hash);
        assert!(super::verify_chain(&log.events));

        let amounts: Vec<u128> = writer
            .records()
            .into_iter()
            .filter_map(|r| match r.event {
                ControllerEvent::MintTokens { amount, .. } => Some(amount),
                _ => None,
            })
            .collect();
        assert_eq!(amounts, vec![1, 2]);
    }

    #[test]
    fn test_foreign_controller_record_refused() {
        let writer = InMemoryAuditWriter::new("ctrl");
        match writer.write(&make_record("other-ctrl", 1)) {
            Err(RegentError::AuditWriteFailed { reason }) => {
                assert!(reason.contains("other-ctrl"), "unexpected reason: {reason}");
            }
            other => panic!("expected AuditWriteFailed, got {:?}", other),
        }
        assert!(writer.is_empty());
    }

    #[test]
    fn test_verify_empty() {
        let writer = InMemoryAuditWriter::new("ctrl");
        assert!(writer.verify_integrity());
        assert!(super::verify_chain(&[]));
        assert_eq!(writer.export_log().terminal_hash, "");
    }
}
