//! Audit events and records.
//!
//! `ControllerEvent` describes one committed privileged operation.
//! `AuditRecord` is what gets handed to the audit writer: one per committed
//! call, never for a rejected one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    operation::Operation,
    permission::Permissions,
    principal::{ConfigHash, ParamsHash, Principal},
};

/// Unique identifier for one privileged call, carried by its audit record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallId(pub uuid::Uuid);

impl CallId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for CallId {
    fn default() -> Self {
        Self::new()
    }
}

/// The observable outcome of a committed operation.
///
/// Every variant carries `sender`, the principal that invoked the
/// controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControllerEvent {
    MintReputation {
        sender: Principal,
        beneficiary: Principal,
        amount: i128,
    },
    MintTokens {
        sender: Principal,
        beneficiary: Principal,
        amount: u128,
    },
    SchemeRegistered {
        sender: Principal,
        scheme: Principal,
        config_hash: ConfigHash,
        permissions: Permissions,
    },
    SchemeUnregistered {
        sender: Principal,
        scheme: Principal,
    },
    GenericAction {
        sender: Principal,
        action: Principal,
        param: serde_json::Value,
    },
    FundsSent {
        sender: Principal,
        to: Principal,
        amount: u128,
    },
    ExternalTransfer {
        sender: Principal,
        token: Principal,
        to: Principal,
        amount: u128,
    },
    ExternalTransferFrom {
        sender: Principal,
        token: Principal,
        from: Principal,
        to: Principal,
        amount: u128,
    },
    ExternalApprove {
        sender: Principal,
        token: Principal,
        spender: Principal,
        amount: u128,
    },
    ConstraintAdded {
        sender: Principal,
        constraint: Principal,
        params: ParamsHash,
        index: usize,
    },
    ConstraintRemoved {
        sender: Principal,
        constraint: Principal,
        index: usize,
    },
    ControllerUpgraded {
        sender: Principal,
        new_controller: Principal,
    },
}

impl ControllerEvent {
    pub fn sender(&self) -> &Principal {
        match self {
            ControllerEvent::MintReputation { sender, .. }
            | ControllerEvent::MintTokens { sender, .. }
            | ControllerEvent::SchemeRegistered { sender, .. }
            | ControllerEvent::SchemeUnregistered { sender, .. }
            | ControllerEvent::GenericAction { sender, .. }
            | ControllerEvent::FundsSent { sender, .. }
            | ControllerEvent::ExternalTransfer { sender, .. }
            | ControllerEvent::ExternalTransferFrom { sender, .. }
            | ControllerEvent::ExternalApprove { sender, .. }
            | ControllerEvent::ConstraintAdded { sender, .. }
            | ControllerEvent::ConstraintRemoved { sender, .. }
            | ControllerEvent::ControllerUpgraded { sender, .. } => sender,
        }
    }
}

/// An immutable record of one committed call, written to the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub call_id: CallId,
    /// The controller that committed the call.
    pub controller: Principal,
    pub operation: Operation,
    pub event: ControllerEvent,
    /// Wall-clock time the record was created (UTC).
    pub timestamp: DateTime<Utc>,
}
