//! Trait definitions for everything the controller talks to.
//!
//! These traits define the complete trust boundary:
//!
//! - `Avatar`: the managed resource container (funds, generic actions)
//! - `MintableToken`: the mintable-supply token
//! - `ReputationLedger`: the voting-weight ledger
//! - `GlobalConstraint`: pluggable pre/post invariant hooks
//! - `AuditWriter`: trusted sink, one record per committed call
//!
//! The controller owns none of their internals. It only decides *whether*
//! a call may reach them.

use regent_contracts::{
    error::RegentResult,
    principal::{ParamsHash, Principal},
    record::AuditRecord,
};

/// The managed resource container.
///
/// Every method returns `Ok(false)` when the container declines the action;
/// the controller turns that into `RegentError::ResourceRejected`.
pub trait Avatar: Send + Sync {
    /// Stable identifier of this container, used in errors and logs.
    fn id(&self) -> Principal;

    /// Perform an arbitrary action against `action` on behalf of the
    /// organization. `param` is passed through untouched.
    fn generic_action(&self, action: &Principal, param: &serde_json::Value) -> RegentResult<bool>;

    /// Move native funds held by the container.
    fn send_funds(&self, amount: u128, to: &Principal) -> RegentResult<bool>;

    fn external_transfer(&self, token: &Principal, to: &Principal, amount: u128)
        -> RegentResult<bool>;

    fn external_transfer_from(
        &self,
        token: &Principal,
        from: &Principal,
        to: &Principal,
        amount: u128,
    ) -> RegentResult<bool>;

    fn external_approve(
        &self,
        token: &Principal,
        spender: &Principal,
        amount: u128,
    ) -> RegentResult<bool>;

    /// Hand ownership of the container to `new_owner`.
    fn transfer_ownership(&self, new_owner: &Principal) -> RegentResult<()>;
}

/// The organization's mintable token.
pub trait MintableToken: Send + Sync {
    fn id(&self) -> Principal;

    fn mint(&self, amount: u128, beneficiary: &Principal) -> RegentResult<bool>;

    fn transfer_ownership(&self, new_owner: &Principal) -> RegentResult<()>;
}

/// The reputation (voting weight) ledger.
pub trait ReputationLedger: Send + Sync {
    fn id(&self) -> Principal;

    /// Mint `amount` for `beneficiary`. A negative amount burns, subject to
    /// the ledger's own rules.
    fn mint(&self, amount: i128, beneficiary: &Principal) -> RegentResult<bool>;

    fn transfer_ownership(&self, new_owner: &Principal) -> RegentResult<()>;
}

/// A global constraint consulted around every guarded operation.
///
/// Hooks receive the acting principal, the params hash the constraint was
/// registered with, and the operation tag. Returning `Ok(false)` aborts the
/// call. Hooks run while the controller's state lock is held and must not
/// call back into the same controller.
pub trait GlobalConstraint: Send + Sync {
    /// The reference this constraint is registered and removed under.
    fn id(&self) -> Principal;

    fn pre(&self, caller: &Principal, params: &ParamsHash, tag: &str) -> RegentResult<bool>;

    fn post(&self, caller: &Principal, params: &ParamsHash, tag: &str) -> RegentResult<bool>;
}

/// The audit writer: the immutable record of committed calls.
///
/// A failed write is fatal for the call being recorded: the controller
/// discards its staged state and returns the error.
pub trait AuditWriter: Send + Sync {
    /// Append one record. Implementations must treat this as append-only.
    fn write(&self, record: &AuditRecord) -> RegentResult<()>;
}
