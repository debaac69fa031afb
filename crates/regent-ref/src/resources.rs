//! In-memory managed resources for the REGENT reference runtime.
//!
//! Stand-ins for a real treasury, token, and reputation ledger. All balances
//! live in process memory; nothing is persisted or contacted.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use regent_contracts::{error::RegentResult, principal::Principal};
use regent_core::traits::{Avatar, MintableToken, ReputationLedger};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── Avatar ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct AvatarState {
    owner: Principal,
    native_balance: u128,
    /// Native funds paid out, by recipient.
    payouts: HashMap<Principal, u128>,
    /// (token, holder) → balance, for tokens other than the native one.
    token_balances: HashMap<(Principal, Principal), u128>,
    /// (token, owner, spender) → allowance.
    allowances: HashMap<(Principal, Principal, Principal), u128>,
    actions: Vec<(Principal, serde_json::Value)>,
}

/// The organization's treasury.
///
/// Transfers that exceed a balance or allowance are declined with
/// `Ok(false)`, never partially applied.
#[derive(Debug)]
pub struct InMemoryAvatar {
    id: Principal,
    state: Mutex<AvatarState>,
}

impl InMemoryAvatar {
    pub fn new(id: impl Into<Principal>, owner: impl Into<Principal>, native_balance: u128) -> Self {
        Self {
            id: id.into(),
            state: Mutex::new(AvatarState {
                owner: owner.into(),
                native_balance,
                ..AvatarState::default()
            }),
        }
    }

    /// Credit `holder` with `amount` of `token` (test and demo setup).
    pub fn deposit_token(&self, token: &Principal, holder: &Principal, amount: u128) {
        let mut state = lock(&self.state);
        *state
            .token_balances
            .entry((token.clone(), holder.clone()))
            .or_default() += amount;
    }

    /// Record that `owner` lets `spender` move `amount` of its `token`.
    pub fn grant_allowance(&self, token: &Principal, owner: &Principal, spender: &Principal, amount: u128) {
        lock(&self.state)
            .allowances
            .insert((token.clone(), owner.clone(), spender.clone()), amount);
    }

    pub fn owner(&self) -> Principal {
        lock(&self.state).owner.clone()
    }

    pub fn native_balance(&self) -> u128 {
        lock(&self.state).native_balance
    }

    pub fn paid_to(&self, recipient: &Principal) -> u128 {
        lock(&self.state).payouts.get(recipient).copied().unwrap_or(0)
    }

    pub fn token_balance(&self, token: &Principal, holder: &Principal) -> u128 {
        lock(&self.state)
            .token_balances
            .get(&(token.clone(), holder.clone()))
            .copied()
            .unwrap_or(0)
    }

    pub fn allowance(&self, token: &Principal, owner: &Principal, spender: &Principal) -> u128 {
        lock(&self.state)
            .allowances
            .get(&(token.clone(), owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(0)
    }

    pub fn actions(&self) -> Vec<(Principal, serde_json::Value)> {
        lock(&self.state).actions.clone()
    }
}

impl AvatarState {
    fn move_tokens(&mut self, token: &Principal, from: &Principal, to: &Principal, amount: u128) -> bool {
        let from_key = (token.clone(), from.clone());
        let available = self.token_balances.get(&from_key).copied().unwrap_or(0);
        if available < amount {
            return false;
        }
        self.token_balances.insert(from_key, available - amount);
        *self
            .token_balances
            .entry((token.clone(), to.clone()))
            .or_default() += amount;
        true
    }
}

impl Avatar for InMemoryAvatar {
    fn id(&self) -> Principal {
        self.id.clone()
    }

    fn generic_action(&self, action: &Principal, param: &serde_json::Value) -> RegentResult<bool> {
        if action.is_null() {
            return Ok(false);
        }
        lock(&self.state).actions.push((action.clone(), param.clone()));
        Ok(true)
    }

    fn send_funds(&self, amount: u128, to: &Principal) -> RegentResult<bool> {
        let mut state = lock(&self.state);
        if state.native_balance < amount {
            return Ok(false);
        }
        state.native_balance -= amount;
        *state.payouts.entry(to.clone()).or_default() += amount;
        Ok(true)
    }

    fn external_transfer(&self, token: &Principal, to: &Principal, amount: u128) -> RegentResult<bool> {
        let mut state = lock(&self.state);
        let me = self.id.clone();
        Ok(state.move_tokens(token, &me, to, amount))
    }

    fn external_transfer_from(
        &self,
        token: &Principal,
        from: &Principal,
        to: &Principal,
        amount: u128,
    ) -> RegentResult<bool> {
        let mut state = lock(&self.state);
        let key = (token.clone(), from.clone(), self.id.clone());
        let allowed = state.allowances.get(&key).copied().unwrap_or(0);
        if allowed < amount || !state.move_tokens(token, from, to, amount) {
            return Ok(false);
        }
        state.allowances.insert(key, allowed - amount);
        Ok(true)
    }

    fn external_approve(&self, token: &Principal, spender: &Principal, amount: u128) -> RegentResult<bool> {
        let mut state = lock(&self.state);
        state
            .allowances
            .insert((token.clone(), self.id.clone(), spender.clone()), amount);
        Ok(true)
    }

    fn transfer_ownership(&self, new_owner: &Principal) -> RegentResult<()> {
        lock(&self.state).owner = new_owner.clone();
        Ok(())
    }
}

// ── Token ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct TokenState {
    owner: Principal,
    total_supply: u128,
    balances: HashMap<Principal, u128>,
}

/// A mintable token. Minting that would overflow the supply is declined.
#[derive(Debug)]
pub struct InMemoryToken {
    id: Principal,
    state: Mutex<TokenState>,
}

impl InMemoryToken {
    pub fn new(id: impl Into<Principal>, owner: impl Into<Principal>) -> Self {
        Self {
            id: id.into(),
            state: Mutex::new(TokenState {
                owner: owner.into(),
                ..TokenState::default()
            }),
        }
    }

    pub fn owner(&self) -> Principal {
        lock(&self.state).owner.clone()
    }

    pub fn total_supply(&self) -> u128 {
        lock(&self.state).total_supply
    }

    pub fn balance_of(&self, holder: &Principal) -> u128 {
        lock(&self.state).balances.get(holder).copied().unwrap_or(0)
    }
}

impl MintableToken for InMemoryToken {
    fn id(&self) -> Principal {
        self.id.clone()
    }

    fn mint(&self, amount: u128, beneficiary: &Principal) -> RegentResult<bool> {
        let mut state = lock(&self.state);
        let Some(supply) = state.total_supply.checked_add(amount) else {
            return Ok(false);
        };
        state.total_supply = supply;
        *state.balances.entry(beneficiary.clone()).or_default() += amount;
        Ok(true)
    }

    fn transfer_ownership(&self, new_owner: &Principal) -> RegentResult<()> {
        lock(&self.state).owner = new_owner.clone();
        Ok(())
    }
}

// ── Reputation ────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct ReputationState {
    owner: Principal,
    total_supply: u128,
    balances: HashMap<Principal, u128>,
}

/// A reputation ledger. Negative mints burn, clamped at the holder's
/// balance.
#[derive(Debug)]
pub struct InMemoryReputation {
    id: Principal,
    state: Mutex<ReputationState>,
}

impl InMemoryReputation {
    pub fn new(id: impl Into<Principal>, owner: impl Into<Principal>) -> Self {
        Self {
            id: id.into(),
            state: Mutex::new(ReputationState {
                owner: owner.into(),
                ..ReputationState::default()
            }),
        }
    }

    pub fn owner(&self) -> Principal {
        lock(&self.state).owner.clone()
    }

    pub fn total_supply(&self) -> u128 {
        lock(&self.state).total_supply
    }

    pub fn reputation_of(&self, holder: &Principal) -> u128 {
        lock(&self.state).balances.get(holder).copied().unwrap_or(0)
    }
}

impl ReputationLedger for InMemoryReputation {
    fn id(&self) -> Principal {
        self.id.clone()
    }

    fn mint(&self, amount: i128, beneficiary: &Principal) -> RegentResult<bool> {
        let mut state = lock(&self.state);
        let current = state.balances.get(beneficiary).copied().unwrap_or(0);

        if amount >= 0 {
            let delta = amount.unsigned_abs();
            let (Some(balance), Some(supply)) = (
                current.checked_add(delta),
                state.total_supply.checked_add(delta),
            ) else {
                return Ok(false);
            };
            state.balances.insert(beneficiary.clone(), balance);
            state.total_supply = supply;
        } else {
            let burned = amount.unsigned_abs().min(current);
            state.balances.insert(beneficiary.clone(), current - burned);
            state.total_supply -= burned;
        }
        Ok(true)
    }

    fn transfer_ownership(&self, new_owner: &Principal) -> RegentResult<()> {
        lock(&self.state).owner = new_owner.clone();
        Ok(())
    }
}
