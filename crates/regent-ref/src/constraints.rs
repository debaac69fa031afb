//! Reference global constraints.
//!
//! - [`CallBudget`]: each caller may perform a metered operation at most
//!   `limit` times. Rejects in the pre-hook, counts in the post-hook.
//! - [`OperationFreeze`]: rejects the listed operations outright.
//!
//! Both decide in the pre-hook. A post-hook rejection aborts the call but
//! cannot take back what a managed resource already did.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use regent_contracts::{
    error::RegentResult,
    operation::Operation,
    principal::{ParamsHash, Principal},
};
use regent_core::traits::GlobalConstraint;

// ── CallBudget ────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct CallBudget {
    id: Principal,
    limit: u32,
    /// Metered tags. Empty meters every constraint-checked operation.
    metered: BTreeSet<&'static str>,
    /// (caller, tag) → completed calls.
    spent: Mutex<HashMap<(Principal, String), u32>>,
}

impl CallBudget {
    pub fn new(id: impl Into<Principal>, limit: u32) -> Self {
        Self {
            id: id.into(),
            limit,
            metered: BTreeSet::new(),
            spent: Mutex::new(HashMap::new()),
        }
    }

    /// Meter only `operations`.
    pub fn metering(mut self, operations: &[Operation]) -> Self {
        self.metered.extend(operations.iter().map(|op| op.tag()));
        self
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Calls `caller` has completed for `operation`.
    pub fn spent(&self, caller: &Principal, operation: Operation) -> u32 {
        self.spent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(caller.clone(), operation.tag().to_string()))
            .copied()
            .unwrap_or(0)
    }

    fn meters(&self, tag: &str) -> bool {
        self.metered.is_empty() || self.metered.contains(tag)
    }
}

impl GlobalConstraint for CallBudget {
    fn id(&self) -> Principal {
        self.id.clone()
    }

    fn pre(&self, caller: &Principal, _params: &ParamsHash, tag: &str) -> RegentResult<bool> {
        if !self.meters(tag) {
            return Ok(true);
        }
        let spent = self
            .spent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(caller.clone(), tag.to_string()))
            .copied()
            .unwrap_or(0);
        Ok(spent < self.limit)
    }

    fn post(&self, caller: &Principal, _params: &ParamsHash, tag: &str) -> RegentResult<bool> {
        if self.meters(tag) {
            let mut spent = self.spent.lock().unwrap_or_else(PoisonError::into_inner);
            let count = spent.entry((caller.clone(), tag.to_string())).or_default();
            *count = count.saturating_add(1);
            debug!(constraint = %self.id, caller = %caller, operation = tag, spent = *count, "budget charged");
        }
        Ok(true)
    }
}

// ── OperationFreeze ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct OperationFreeze {
    id: Principal,
    frozen: BTreeSet<&'static str>,
}

impl OperationFreeze {
    pub fn new(id: impl Into<Principal>, frozen: &[Operation]) -> Self {
        Self {
            id: id.into(),
            frozen: frozen.iter().map(|op| op.tag()).collect(),
        }
    }

    pub fn is_frozen(&self, operation: Operation) -> bool {
        self.frozen.contains(operation.tag())
    }
}

impl GlobalConstraint for OperationFreeze {
    fn id(&self) -> Principal {
        self.id.clone()
    }

    fn pre(&self, _caller: &Principal, _params: &ParamsHash, tag: &str) -> RegentResult<bool> {
        Ok(!self.frozen.contains(tag))
    }

    fn post(&self, _caller: &Principal, _params: &ParamsHash, _tag: &str) -> RegentResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use regent_contracts::{
        operation::Operation,
        principal::{Hash32, Principal},
    };
    use regent_core::traits::GlobalConstraint;

    use super::{CallBudget, OperationFreeze};

    #[test]
    fn budget_rejects_once_spent() {
        let budget = CallBudget::new("budget", 2).metering(&[Operation::MintTokens]);
        let alice = Principal::new("alice");
        let mint = Operation::MintTokens.tag();

        for _ in 0..2 {
            assert!(budget.pre(&alice, &Hash32::ZERO, mint).unwrap());
            assert!(budget.post(&alice, &Hash32::ZERO, mint).unwrap());
        }
        assert!(!budget.pre(&alice, &Hash32::ZERO, mint).unwrap());
        assert_eq!(budget.spent(&alice, Operation::MintTokens), 2);
    }

    #[test]
    fn budget_is_per_caller_and_ignores_unmetered() {
        let budget = CallBudget::new("budget", 1).metering(&[Operation::MintTokens]);
        let alice = Principal::new("alice");
        let bob = Principal::new("bob");
        let mint = Operation::MintTokens.tag();
        let send = Operation::SendFunds.tag();

        budget.post(&alice, &Hash32::ZERO, mint).unwrap();
        assert!(!budget.pre(&alice, &Hash32::ZERO, mint).unwrap());
        assert!(budget.pre(&bob, &Hash32::ZERO, mint).unwrap());

        budget.post(&alice, &Hash32::ZERO, send).unwrap();
        assert!(budget.pre(&alice, &Hash32::ZERO, send).unwrap());
        assert_eq!(budget.spent(&alice, Operation::SendFunds), 0);
    }

    #[test]
    fn unscoped_budget_meters_everything() {
        let budget = CallBudget::new("budget", 0);
        let alice = Principal::new("alice");
        assert!(!budget.pre(&alice, &Hash32::ZERO, Operation::GenericAction.tag()).unwrap());
    }

    #[test]
    fn freeze_blocks_only_listed_operations() {
        let freeze = OperationFreeze::new("freeze", &[Operation::SendFunds]);
        let alice = Principal::new("alice");
        assert!(freeze.is_frozen(Operation::SendFunds));
        assert!(!freeze.pre(&alice, &Hash32::ZERO, Operation::SendFunds.tag()).unwrap());
        assert!(freeze.pre(&alice, &Hash32::ZERO, Operation::MintTokens.tag()).unwrap());
        assert!(freeze.post(&alice, &Hash32::ZERO, Operation::SendFunds.tag()).unwrap());
    }
}
