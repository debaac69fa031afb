//! The permission table and the scheme-management policy.
//!
//! `PermissionTable` is plain storage: `set` and `clear` never check
//! anything. The controller calls `authorize_registration` /
//! `authorize_unregistration` first and only touches the table when they
//! pass.
//!
//! Policy, with `M` the defined-bit mask and `P_C` the caller's bits:
//!
//! 1. `M & (P_new ^ P_old) & !P_C == 0`: the caller holds every bit that
//!    changes.
//! 2. `M & P_old & !P_C == 0`: the caller dominates the target's current
//!    bits.
//!
//! Registration needs both rules; unregistration needs rule 2.

use std::collections::HashMap;

use regent_contracts::{
    error::{RegentError, RegentResult},
    permission::Permissions,
    principal::{ConfigHash, Principal},
};

/// One registered scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemeEntry {
    pub config_hash: ConfigHash,
    pub permissions: Permissions,
}

/// Principal → (config hash, permissions).
///
/// An absent principal and a principal with permissions `0` are the same
/// thing: not registered.
#[derive(Debug, Clone, Default)]
pub struct PermissionTable {
    entries: HashMap<Principal, SchemeEntry>,
}

impl PermissionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_registered(&self, principal: &Principal) -> bool {
        self.permissions_of(principal).is_registered()
    }

    /// Stored bits, including unknown high bits. Empty when absent.
    pub fn permissions_of(&self, principal: &Principal) -> Permissions {
        self.entries
            .get(principal)
            .map(|e| e.permissions)
            .unwrap_or_default()
    }

    /// Stored config handle. `Hash32::ZERO` when absent.
    pub fn config_of(&self, principal: &Principal) -> ConfigHash {
        self.entries
            .get(principal)
            .map(|e| e.config_hash)
            .unwrap_or_default()
    }

    /// Unconditional overwrite. Writing empty permissions is a `clear`.
    pub fn set(&mut self, principal: Principal, config_hash: ConfigHash, permissions: Permissions) {
        if permissions.is_registered() {
            self.entries.insert(principal, SchemeEntry { config_hash, permissions });
        } else {
            self.entries.remove(&principal);
        }
    }

    /// Reset `principal` to the tombstone state.
    pub fn clear(&mut self, principal: &Principal) {
        self.entries.remove(principal);
    }

    /// Registered schemes, sorted by principal.
    pub fn schemes(&self) -> Vec<(&Principal, &SchemeEntry)> {
        let mut all: Vec<_> = self.entries.iter().collect();
        all.sort_by(|a, b| a.0.cmp(b.0));
        all
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Check that `caller` holding `caller_bits` may move `scheme` from
/// `old` to `new`.
pub fn authorize_registration(
    caller: &Principal,
    caller_bits: Permissions,
    scheme: &Principal,
    old: Permissions,
    new: Permissions,
) -> RegentResult<()> {
    let changing = Permissions::changed_bits_outside(old, new, caller_bits);
    if !changing.is_empty() {
        return Err(RegentError::PrivilegeEscalation {
            caller: caller.to_string(),
            scheme: scheme.to_string(),
            reason: format!("would change {:?} which the caller does not hold", changing.names()),
        });
    }
    dominates(caller, caller_bits, scheme, old)
}

/// Check that `caller` may remove `scheme`, currently holding `current`.
pub fn authorize_unregistration(
    caller: &Principal,
    caller_bits: Permissions,
    scheme: &Principal,
    current: Permissions,
) -> RegentResult<()> {
    dominates(caller, caller_bits, scheme, current)
}

fn dominates(
    caller: &Principal,
    caller_bits: Permissions,
    scheme: &Principal,
    current: Permissions,
) -> RegentResult<()> {
    let superior = current.not_dominated_by(caller_bits);
    if superior.is_empty() {
        Ok(())
    } else {
        Err(RegentError::PrivilegeEscalation {
            caller: caller.to_string(),
            scheme: scheme.to_string(),
            reason: format!("scheme holds {:?} which the caller does not hold", superior.names()),
        })
    }
}

#[cfg(test)]
mod tests {
    use regent_contracts::{
        error::RegentError,
        permission::Permissions,
        principal::{Hash32, Principal},
    };

    use super::{authorize_registration, authorize_unregistration, PermissionTable};

    fn p(id: &str) -> Principal {
        Principal::new(id)
    }

    #[test]
    fn absent_principal_is_unregistered() {
        let table = PermissionTable::new();
        assert!(!table.is_registered(&p("ghost")));
        assert!(table.permissions_of(&p("ghost")).is_empty());
        assert_eq!(table.config_of(&p("ghost")), Hash32::ZERO);
    }

    #[test]
    fn set_then_clear() {
        let mut table = PermissionTable::new();
        let h = Hash32([7u8; 32]);
        table.set(p("a"), h, Permissions::REGISTERED);
        assert!(table.is_registered(&p("a")));
        assert_eq!(table.config_of(&p("a")), h);

        table.clear(&p("a"));
        assert!(!table.is_registered(&p("a")));
        assert_eq!(table.config_of(&p("a")), Hash32::ZERO);
        assert!(table.is_empty());
    }

    #[test]
    fn set_with_empty_permissions_is_a_tombstone() {
        let mut table = PermissionTable::new();
        table.set(p("a"), Hash32([1u8; 32]), Permissions::REGISTERED);
        table.set(p("a"), Hash32([2u8; 32]), Permissions::empty());
        assert!(!table.is_registered(&p("a")));
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn schemes_are_sorted() {
        let mut table = PermissionTable::new();
        table.set(p("b"), Hash32::ZERO, Permissions::REGISTERED);
        table.set(p("a"), Hash32::ZERO, Permissions::ALL);
        let ids: Vec<&str> = table.schemes().iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    /// Exhaustive over the defined bits: registration passes exactly when
    /// both rules hold.
    #[test]
    fn registration_policy_matches_both_rules() {
        for caller in 0u32..16 {
            for old in 0u32..16 {
                for new in 0u32..16 {
                    let (c, o, n) = (
                        Permissions::from_raw(caller),
                        Permissions::from_raw(old),
                        Permissions::from_raw(new),
                    );
                    let rule1 = (0b1111 & (old ^ new) & !caller) == 0;
                    let rule2 = (0b1111 & (old & !caller)) == 0;
                    let result = authorize_registration(&p("c"), c, &p("s"), o, n);
                    assert_eq!(
                        result.is_ok(),
                        rule1 && rule2,
                        "caller={caller:04b} old={old:04b} new={new:04b}"
                    );
                }
            }
        }
    }

    #[test]
    fn unregistration_requires_domination() {
        let caller = Permissions::REGISTERED | Permissions::CAN_MANAGE_SCHEMES;
        assert!(authorize_unregistration(&p("c"), caller, &p("s"), Permissions::REGISTERED).is_ok());

        let superior = Permissions::REGISTERED | Permissions::CAN_UPGRADE;
        match authorize_unregistration(&p("c"), caller, &p("s"), superior) {
            Err(RegentError::PrivilegeEscalation { reason, .. }) => {
                assert!(reason.contains("CAN_UPGRADE"), "unexpected reason: {reason}");
            }
            other => panic!("expected PrivilegeEscalation, got {:?}", other),
        }
    }

    #[test]
    fn high_bits_never_block_policy() {
        let caller = Permissions::REGISTERED | Permissions::CAN_MANAGE_SCHEMES;
        let old = Permissions::from_raw(0b1000_0001);
        let new = Permissions::from_raw(0b0100_0001);
        assert!(authorize_registration(&p("c"), caller, &p("s"), old, new).is_ok());
        assert!(authorize_unregistration(&p("c"), caller, &p("s"), old).is_ok());
    }
}
