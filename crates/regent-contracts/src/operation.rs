//! The controller's entry points and their dispatchable call form.
//!
//! Every privileged entry point has a stable string tag. The tag is what
//! global constraints receive, what audit records carry, and what a
//! serialized [`Call`] names. A tag outside this set is never accepted.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    error::{RegentError, RegentResult},
    permission::Permissions,
    principal::{ConfigHash, ParamsHash, Principal},
};

/// Whether global constraint hooks run around guarded operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnforcementMode {
    /// Permission check plus pre- and post-hooks on every guarded call.
    #[default]
    Full,
    /// Permission check only. Registered constraints are stored but never run.
    PermissionOnly,
}

/// A controller entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    MintReputation,
    MintTokens,
    RegisterScheme,
    UnregisterScheme,
    UnregisterSelf,
    AddGlobalConstraint,
    RemoveGlobalConstraint,
    GenericAction,
    SendFunds,
    ExternalTransfer,
    ExternalTransferFrom,
    ExternalApprove,
    UpgradeController,
}

impl Operation {
    pub const ALL: [Operation; 13] = [
        Operation::MintReputation,
        Operation::MintTokens,
        Operation::RegisterScheme,
        Operation::UnregisterScheme,
        Operation::UnregisterSelf,
        Operation::AddGlobalConstraint,
        Operation::RemoveGlobalConstraint,
        Operation::GenericAction,
        Operation::SendFunds,
        Operation::ExternalTransfer,
        Operation::ExternalTransferFrom,
        Operation::ExternalApprove,
        Operation::UpgradeController,
    ];

    /// The tag passed to constraint hooks and written to audit records.
    pub fn tag(self) -> &'static str {
        match self {
            Operation::MintReputation => "mintReputation",
            Operation::MintTokens => "mintTokens",
            Operation::RegisterScheme => "registerScheme",
            Operation::UnregisterScheme => "unregisterScheme",
            Operation::UnregisterSelf => "unregisterSelf",
            Operation::AddGlobalConstraint => "addGlobalConstraint",
            Operation::RemoveGlobalConstraint => "removeGlobalConstraint",
            Operation::GenericAction => "genericAction",
            Operation::SendFunds => "sendFunds",
            Operation::ExternalTransfer => "externalTransfer",
            Operation::ExternalTransferFrom => "externalTransferFrom",
            Operation::ExternalApprove => "externalApprove",
            Operation::UpgradeController => "upgradeController",
        }
    }

    /// Resolve a tag. Exact, case-sensitive match.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.tag() == tag)
    }

    /// The bit the caller must hold. Empty for self-removal, which any
    /// principal may always perform.
    pub fn required(self) -> Permissions {
        match self {
            Operation::RegisterScheme | Operation::UnregisterScheme => {
                Permissions::CAN_MANAGE_SCHEMES
            }
            Operation::AddGlobalConstraint | Operation::RemoveGlobalConstraint => {
                Permissions::CAN_MANAGE_CONSTRAINTS
            }
            Operation::UpgradeController => Permissions::CAN_UPGRADE,
            Operation::UnregisterSelf => Permissions::empty(),
            _ => Permissions::REGISTERED,
        }
    }

    /// Whether global constraint hooks run around this operation.
    ///
    /// Constraint management is gated by permission only, and self-removal
    /// is unconditional.
    pub fn constraint_checked(self) -> bool {
        !matches!(
            self,
            Operation::AddGlobalConstraint
                | Operation::RemoveGlobalConstraint
                | Operation::UnregisterSelf
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A dispatchable controller call.
///
/// Serialized externally tagged by entry-point tag:
///
/// ```json
/// { "mintTokens": { "amount": 100, "beneficiary": "alice" } }
/// "unregisterSelf"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Call {
    MintReputation {
        amount: i128,
        beneficiary: Principal,
    },
    MintTokens {
        amount: u128,
        beneficiary: Principal,
    },
    RegisterScheme {
        scheme: Principal,
        #[serde(default)]
        config_hash: ConfigHash,
        permissions: Permissions,
    },
    UnregisterScheme {
        scheme: Principal,
    },
    UnregisterSelf,
    /// Activates a constraint implementation previously published to the
    /// controller under `constraint`.
    AddGlobalConstraint {
        constraint: Principal,
        #[serde(default)]
        params: ParamsHash,
    },
    RemoveGlobalConstraint {
        constraint: Principal,
    },
    GenericAction {
        action: Principal,
        #[serde(default)]
        param: serde_json::Value,
    },
    SendFunds {
        amount: u128,
        to: Principal,
    },
    ExternalTransfer {
        token: Principal,
        to: Principal,
        amount: u128,
    },
    ExternalTransferFrom {
        token: Principal,
        from: Principal,
        to: Principal,
        amount: u128,
    },
    ExternalApprove {
        token: Principal,
        spender: Principal,
        amount: u128,
    },
    UpgradeController {
        new_controller: Principal,
    },
}

impl Call {
    pub fn operation(&self) -> Operation {
        match self {
            Call::MintReputation { .. } => Operation::MintReputation,
            Call::MintTokens { .. } => Operation::MintTokens,
            Call::RegisterScheme { .. } => Operation::RegisterScheme,
            Call::UnregisterScheme { .. } => Operation::UnregisterScheme,
            Call::UnregisterSelf => Operation::UnregisterSelf,
            Call::AddGlobalConstraint { .. } => Operation::AddGlobalConstraint,
            Call::RemoveGlobalConstraint { .. } => Operation::RemoveGlobalConstraint,
            Call::GenericAction { .. } => Operation::GenericAction,
            Call::SendFunds { .. } => Operation::SendFunds,
            Call::ExternalTransfer { .. } => Operation::ExternalTransfer,
            Call::ExternalTransferFrom { .. } => Operation::ExternalTransferFrom,
            Call::ExternalApprove { .. } => Operation::ExternalApprove,
            Call::UpgradeController { .. } => Operation::UpgradeController,
        }
    }

    /// Decode a call from JSON.
    ///
    /// An entry point outside the defined set fails with
    /// `UnknownEntryPoint`; a known entry point with bad arguments fails with
    /// `MalformedCall`.
    pub fn from_json(s: &str) -> RegentResult<Self> {
        let value: serde_json::Value =
            serde_json::from_str(s).map_err(|e| RegentError::MalformedCall {
                reason: format!("call is not valid JSON: {}", e),
            })?;

        let name = match &value {
            serde_json::Value::String(name) => name.clone(),
            serde_json::Value::Object(map) if map.len() == 1 => {
                map.keys().next().cloned().unwrap_or_default()
            }
            other => {
                return Err(RegentError::MalformedCall {
                    reason: format!("expected a single entry-point tag, got {}", other),
                })
            }
        };

        if Operation::from_tag(&name).is_none() {
            return Err(RegentError::UnknownEntryPoint { name });
        }

        serde_json::from_str(s).map_err(|e| RegentError::MalformedCall {
            reason: format!("bad arguments for '{}': {}", name, e),
        })
    }
}
