//! Error types for the REGENT controller.
//!
//! All fallible operations return `RegentResult<T>`. Every rejection is an
//! explicit error; nothing is reported through an ignorable `false`.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which side of a guarded operation a constraint hook ran on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HookStage {
    Pre,
    Post,
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookStage::Pre => f.write_str("pre"),
            HookStage::Post => f.write_str("post"),
        }
    }
}

/// The unified error type for REGENT.
#[derive(Debug, Error)]
pub enum RegentError {
    /// The caller lacks the permission bit the operation requires.
    #[error("principal '{principal}' lacks {required} required for '{operation}'")]
    Unauthorized {
        principal: String,
        operation: String,
        required: String,
    },

    /// A registration or unregistration would grant, revoke, or touch bits
    /// the caller does not hold.
    #[error("privilege escalation: '{caller}' may not modify scheme '{scheme}': {reason}")]
    PrivilegeEscalation {
        caller: String,
        scheme: String,
        reason: String,
    },

    /// A global constraint hook refused the operation.
    #[error("global constraint '{constraint}' rejected '{operation}' at {stage}-check")]
    ConstraintRejected {
        constraint: String,
        stage: HookStage,
        operation: String,
    },

    /// The upgrade was already performed or names an invalid target.
    #[error("invalid upgrade: {reason}")]
    InvalidUpgrade { reason: String },

    /// No live global constraint matches the given reference.
    #[error("global constraint '{constraint}' not found")]
    NotFound { constraint: String },

    /// The controller could not be constructed from the given bootstrap.
    #[error("malformed construction: {reason}")]
    MalformedConstruction { reason: String },

    /// The call names no entry point of the controller.
    #[error("unknown entry point '{name}'")]
    UnknownEntryPoint { name: String },

    /// The call names a known entry point but its arguments do not decode.
    #[error("malformed call: {reason}")]
    MalformedCall { reason: String },

    /// The controller was upgraded and no longer accepts privileged calls.
    #[error("controller retired; superseded by '{successor}'")]
    ControllerRetired { successor: String },

    /// A managed resource reported failure for a delegated call.
    #[error("managed resource '{resource}' rejected '{operation}'")]
    ResourceRejected { resource: String, operation: String },

    /// The audit writer could not persist a record.
    ///
    /// Fatal for the enclosing call: an operation that cannot be audited
    /// is not committed.
    #[error("audit write failed: {reason}")]
    AuditWriteFailed { reason: String },

    /// The controller state lock was poisoned by a panicking holder.
    #[error("controller state unavailable: {reason}")]
    StatePoisoned { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },
}

/// Convenience alias used throughout the REGENT crates.
pub type RegentResult<T> = Result<T, RegentError>;
