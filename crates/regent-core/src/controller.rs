//! The REGENT controller: the single authority over an organization's
//! managed resources.
//!
//! Every privileged entry point runs the same envelope under one exclusive
//! lock:
//!
//!   Retired? → Permission → Pre-hooks → Body (staged) → Post-hooks → Audit → Commit
//!
//! The body only ever mutates a staged copy of the controller state. The
//! staged copy replaces the live state in one assignment, after the audit
//! record is written. Any failure before that point leaves the permission
//! table, constraint registry, and upgrade target exactly as they were.
//!
//! Delegated calls to managed resources are synchronous and happen inside
//! the envelope. Their own side effects are the resource's responsibility;
//! the controller reports their refusal as `ResourceRejected`. The one
//! exception is ownership: an upgrade that fails part-way takes back what it
//! already handed over.

use std::cell::Cell;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::{debug, error, info, warn};

use regent_contracts::{
    error::{RegentError, RegentResult},
    operation::{Call, EnforcementMode, Operation},
    permission::Permissions,
    principal::{ConfigHash, ParamsHash, Principal},
    record::{AuditRecord, CallId, ControllerEvent},
};

use crate::{
    constraints::ConstraintRegistry,
    guard::Guard,
    permissions::{authorize_registration, authorize_unregistration, PermissionTable, SchemeEntry},
    traits::{Avatar, AuditWriter, GlobalConstraint, MintableToken, ReputationLedger},
};

/// One ownership transfer of a managed resource.
type Handover<'a> = &'a dyn Fn(&Principal) -> RegentResult<()>;

/// The three managed resources a controller governs.
#[derive(Clone)]
pub struct Resources {
    pub avatar: Arc<dyn Avatar>,
    pub token: Arc<dyn MintableToken>,
    pub reputation: Arc<dyn ReputationLedger>,
}

/// The initial scheme set, as three parallel sequences.
///
/// Entry `i` registers `principals[i]` with `config_hashes[i]` and
/// `permissions[i]`. The sequences must have equal length.
#[derive(Debug, Clone, Default)]
pub struct Bootstrap {
    pub principals: Vec<Principal>,
    pub config_hashes: Vec<ConfigHash>,
    pub permissions: Vec<Permissions>,
}

impl Bootstrap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one scheme to all three sequences.
    pub fn with_scheme(
        mut self,
        principal: impl Into<Principal>,
        config_hash: ConfigHash,
        permissions: Permissions,
    ) -> Self {
        self.principals.push(principal.into());
        self.config_hashes.push(config_hash);
        self.permissions.push(permissions);
        self
    }

    pub fn len(&self) -> usize {
        self.principals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.principals.is_empty()
    }

    /// Reject mismatched sequence lengths and null principals.
    pub fn validate(&self) -> RegentResult<()> {
        let (p, h, m) = (
            self.principals.len(),
            self.config_hashes.len(),
            self.permissions.len(),
        );
        if p != h || p != m {
            return Err(RegentError::MalformedConstruction {
                reason: format!(
                    "bootstrap sequences differ in length: {} principals, {} config hashes, {} permission masks",
                    p, h, m
                ),
            });
        }
        if let Some(index) = self.principals.iter().position(Principal::is_null) {
            return Err(RegentError::MalformedConstruction {
                reason: format!("bootstrap entry {} names the null principal", index),
            });
        }
        Ok(())
    }
}

/// What a dispatched [`Call`] produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    /// The call committed and was audited.
    Committed,
    /// The call was valid but had nothing to do (e.g. removing a principal
    /// that is not registered). Nothing was audited.
    NoChange,
    /// A constraint was added at, or removed from, this slot.
    ConstraintSlot(usize),
}

/// Everything the lock protects.
#[derive(Debug, Clone, Default)]
struct ControllerState {
    permissions: PermissionTable,
    constraints: ConstraintRegistry,
    upgrade_target: Option<Principal>,
}

/// The governance controller.
pub struct Controller {
    principal: Principal,
    resources: Resources,
    audit: Arc<dyn AuditWriter>,
    guard: Guard,
    state: Mutex<ControllerState>,
    /// Constraint implementations addressable by id for dispatched
    /// `addGlobalConstraint` calls. Publishing grants nothing by itself.
    catalog: Mutex<HashMap<Principal, Arc<dyn GlobalConstraint>>>,
}

impl Controller {
    /// Build a controller and register the bootstrap schemes without any
    /// permission check.
    ///
    /// Fails with `MalformedConstruction` before any state exists if the
    /// controller's own principal is null or the bootstrap is malformed.
    pub fn new(
        principal: Principal,
        resources: Resources,
        bootstrap: Bootstrap,
        audit: Arc<dyn AuditWriter>,
        mode: EnforcementMode,
    ) -> RegentResult<Self> {
        if principal.is_null() {
            return Err(RegentError::MalformedConstruction {
                reason: "controller principal must not be null".to_string(),
            });
        }
        bootstrap.validate()?;

        let mut permissions = PermissionTable::new();
        for ((scheme, hash), bits) in bootstrap
            .principals
            .into_iter()
            .zip(bootstrap.config_hashes)
            .zip(bootstrap.permissions)
        {
            debug!(controller = %principal, scheme = %scheme, permissions = ?bits.names(), "bootstrap scheme");
            permissions.set(scheme, hash, bits);
        }

        info!(
            controller = %principal,
            schemes = permissions.len(),
            mode = ?mode,
            "controller constructed"
        );

        Ok(Self {
            principal,
            resources,
            audit,
            guard: Guard::new(mode),
            state: Mutex::new(ControllerState {
                permissions,
                ..ControllerState::default()
            }),
            catalog: Mutex::new(HashMap::new()),
        })
    }

    // ── Envelope ──────────────────────────────────────────────────────────────

    fn lock_state(&self) -> RegentResult<MutexGuard<'_, ControllerState>> {
        self.state.lock().map_err(|e| RegentError::StatePoisoned {
            reason: e.to_string(),
        })
    }

    /// Live state is only ever replaced by a single assignment, so a
    /// poisoned lock still guards a consistent snapshot.
    fn read_state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `body` inside the guarded envelope.
    ///
    /// `body` returns the caller-facing value and the event to audit, or
    /// `None` when nothing changed.
    fn guarded<T, F>(&self, caller: &Principal, operation: Operation, body: F) -> RegentResult<T>
    where
        F: FnOnce(&mut ControllerState) -> RegentResult<(T, Option<ControllerEvent>)>,
    {
        self.guarded_with_undo(caller, operation, body, |_| {})
    }

    /// Like [`guarded`](Self::guarded), but runs `undo` against the live
    /// state whenever the call fails after `body` has started: in the body
    /// itself, in a post-hook, or in the audit write.
    fn guarded_with_undo<T, F, U>(
        &self,
        caller: &Principal,
        operation: Operation,
        body: F,
        undo: U,
    ) -> RegentResult<T>
    where
        F: FnOnce(&mut ControllerState) -> RegentResult<(T, Option<ControllerEvent>)>,
        U: FnOnce(&mut ControllerState),
    {
        let mut state = self.lock_state()?;

        debug!(
            controller = %self.principal,
            caller = %caller,
            operation = operation.tag(),
            "privileged call starting"
        );

        // ── Retirement ───────────────────────────────────────────────────────
        //
        // A second upgrade is reported as InvalidUpgrade by the body, and
        // self-removal stays available.
        if let Some(successor) = &state.upgrade_target {
            if !matches!(operation, Operation::UpgradeController | Operation::UnregisterSelf) {
                warn!(
                    controller = %self.principal,
                    caller = %caller,
                    operation = operation.tag(),
                    successor = %successor,
                    "call to retired controller rejected"
                );
                return Err(RegentError::ControllerRetired {
                    successor: successor.to_string(),
                });
            }
        }

        // ── Permission gate and pre-hooks ────────────────────────────────────
        self.guard.authorize(&state.permissions, caller, operation)?;
        self.guard.pre(&state.constraints, caller, operation)?;

        // ── Body, post-hooks, audit on staged state ──────────────────────────
        let mut staged = state.clone();
        match self.run_staged(caller, operation, &mut staged, body) {
            Ok(value) => {
                *state = staged;
                Ok(value)
            }
            Err(e) => {
                undo(&mut state);
                Err(e)
            }
        }
    }

    fn run_staged<T, F>(
        &self,
        caller: &Principal,
        operation: Operation,
        staged: &mut ControllerState,
        body: F,
    ) -> RegentResult<T>
    where
        F: FnOnce(&mut ControllerState) -> RegentResult<(T, Option<ControllerEvent>)>,
    {
        let (value, event) = body(staged)?;

        self.guard.post(&staged.constraints, caller, operation)?;

        if let Some(event) = event {
            let record = AuditRecord {
                call_id: CallId::new(),
                controller: self.principal.clone(),
                operation,
                event,
                timestamp: Utc::now(),
            };
            self.audit.write(&record)?;

            info!(
                controller = %self.principal,
                caller = %caller,
                operation = operation.tag(),
                call_id = %record.call_id.0,
                "privileged call committed"
            );
        }
        Ok(value)
    }

    fn accepted(accepted: bool, resource: Principal, operation: Operation) -> RegentResult<()> {
        if accepted {
            Ok(())
        } else {
            warn!(resource = %resource, operation = operation.tag(), "managed resource rejected call");
            Err(RegentError::ResourceRejected {
                resource: resource.to_string(),
                operation: operation.tag().to_string(),
            })
        }
    }

    // ── Minting ───────────────────────────────────────────────────────────────

    /// Mint (or, with a negative amount, burn) reputation for `beneficiary`.
    pub fn mint_reputation(
        &self,
        caller: &Principal,
        amount: i128,
        beneficiary: &Principal,
    ) -> RegentResult<()> {
        let op = Operation::MintReputation;
        self.guarded(caller, op, |_| {
            let ledger = &self.resources.reputation;
            Self::accepted(ledger.mint(amount, beneficiary)?, ledger.id(), op)?;
            Ok((
                (),
                Some(ControllerEvent::MintReputation {
                    sender: caller.clone(),
                    beneficiary: beneficiary.clone(),
                    amount,
                }),
            ))
        })
    }

    pub fn mint_tokens(
        &self,
        caller: &Principal,
        amount: u128,
        beneficiary: &Principal,
    ) -> RegentResult<()> {
        let op = Operation::MintTokens;
        self.guarded(caller, op, |_| {
            let token = &self.resources.token;
            Self::accepted(token.mint(amount, beneficiary)?, token.id(), op)?;
            Ok((
                (),
                Some(ControllerEvent::MintTokens {
                    sender: caller.clone(),
                    beneficiary: beneficiary.clone(),
                    amount,
                }),
            ))
        })
    }

    // ── Scheme management ─────────────────────────────────────────────────────

    /// Register `scheme`, or change an existing registration.
    ///
    /// The stored permissions always include `REGISTERED`. The caller must
    /// hold every bit that changes and every bit `scheme` currently holds.
    ///
    /// Both rules are checked against the mask that will be stored, i.e.
    /// `permissions | REGISTERED`, not the mask as requested. Creating a new
    /// scheme therefore changes its `REGISTERED` bit, and a caller holding
    /// `CAN_MANAGE_SCHEMES` without `REGISTERED` cannot register anyone.
    pub fn register_scheme(
        &self,
        caller: &Principal,
        scheme: &Principal,
        config_hash: ConfigHash,
        permissions: Permissions,
    ) -> RegentResult<()> {
        self.guarded(caller, Operation::RegisterScheme, |state| {
            if scheme.is_null() {
                return Err(RegentError::MalformedCall {
                    reason: "cannot register the null principal".to_string(),
                });
            }

            let caller_bits = state.permissions.permissions_of(caller);
            let old = state.permissions.permissions_of(scheme);
            let new = permissions | Permissions::REGISTERED;
            authorize_registration(caller, caller_bits, scheme, old, new)?;

            state.permissions.set(scheme.clone(), config_hash, new);
            Ok((
                (),
                Some(ControllerEvent::SchemeRegistered {
                    sender: caller.clone(),
                    scheme: scheme.clone(),
                    config_hash,
                    permissions: new,
                }),
            ))
        })
    }

    /// Remove `scheme`. Returns `false` if it was not registered.
    pub fn unregister_scheme(&self, caller: &Principal, scheme: &Principal) -> RegentResult<bool> {
        self.guarded(caller, Operation::UnregisterScheme, |state| {
            let current = state.permissions.permissions_of(scheme);
            if !current.is_registered() {
                debug!(scheme = %scheme, "unregister of unknown scheme is a no-op");
                return Ok((false, None));
            }

            let caller_bits = state.permissions.permissions_of(caller);
            authorize_unregistration(caller, caller_bits, scheme, current)?;

            state.permissions.clear(scheme);
            Ok((
                true,
                Some(ControllerEvent::SchemeUnregistered {
                    sender: caller.clone(),
                    scheme: scheme.clone(),
                }),
            ))
        })
    }

    /// Relinquish the caller's own registration. Always permitted; returns
    /// `false` if the caller was not registered.
    pub fn unregister_self(&self, caller: &Principal) -> RegentResult<bool> {
        self.guarded(caller, Operation::UnregisterSelf, |state| {
            if !state.permissions.is_registered(caller) {
                return Ok((false, None));
            }
            state.permissions.clear(caller);
            Ok((
                true,
                Some(ControllerEvent::SchemeUnregistered {
                    sender: caller.clone(),
                    scheme: caller.clone(),
                }),
            ))
        })
    }

    // ── Global constraints ────────────────────────────────────────────────────

    /// Append `constraint` to the registry. Returns its slot index.
    pub fn add_global_constraint(
        &self,
        caller: &Principal,
        constraint: Arc<dyn GlobalConstraint>,
        params: ParamsHash,
    ) -> RegentResult<usize> {
        self.guarded(caller, Operation::AddGlobalConstraint, |state| {
            Ok(Self::install(state, caller, constraint, params))
        })
    }

    /// Append the constraint published under `reference`.
    ///
    /// The catalog is consulted inside the envelope, so a caller without
    /// `CAN_MANAGE_CONSTRAINTS` is refused as `Unauthorized` whether or not
    /// `reference` has been published.
    pub fn add_published_constraint(
        &self,
        caller: &Principal,
        reference: &Principal,
        params: ParamsHash,
    ) -> RegentResult<usize> {
        self.guarded(caller, Operation::AddGlobalConstraint, |state| {
            let constraint = self
                .catalog
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get(reference)
                .cloned()
                .ok_or_else(|| RegentError::NotFound {
                    constraint: reference.to_string(),
                })?;
            Ok(Self::install(state, caller, constraint, params))
        })
    }

    fn install(
        state: &mut ControllerState,
        caller: &Principal,
        constraint: Arc<dyn GlobalConstraint>,
        params: ParamsHash,
    ) -> (usize, Option<ControllerEvent>) {
        let reference = constraint.id();
        let index = state.constraints.add(constraint, params);
        (
            index,
            Some(ControllerEvent::ConstraintAdded {
                sender: caller.clone(),
                constraint: reference,
                params,
                index,
            }),
        )
    }

    /// Tombstone the first live constraint registered under `reference`.
    ///
    /// Fails with `NotFound`, changing nothing, when there is none.
    pub fn remove_global_constraint(
        &self,
        caller: &Principal,
        reference: &Principal,
    ) -> RegentResult<usize> {
        self.guarded(caller, Operation::RemoveGlobalConstraint, |state| {
            let index = state.constraints.remove(reference)?;
            Ok((
                index,
                Some(ControllerEvent::ConstraintRemoved {
                    sender: caller.clone(),
                    constraint: reference.clone(),
                    index,
                }),
            ))
        })
    }

    /// Make `constraint` addressable by id for dispatched
    /// `addGlobalConstraint` calls. It does not become active until a
    /// `CAN_MANAGE_CONSTRAINTS` holder adds it.
    pub fn publish_constraint(&self, constraint: Arc<dyn GlobalConstraint>) {
        let id = constraint.id();
        debug!(controller = %self.principal, constraint = %id, "constraint implementation published");
        self.catalog
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, constraint);
    }

    /// Withdraw a published implementation. Slots already holding it are
    /// unaffected. Returns `false` if nothing was published under
    /// `reference`.
    pub fn unpublish_constraint(&self, reference: &Principal) -> bool {
        let removed = self
            .catalog
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(reference)
            .is_some();
        if removed {
            debug!(controller = %self.principal, constraint = %reference, "constraint implementation withdrawn");
        }
        removed
    }

    // ── Avatar delegation ─────────────────────────────────────────────────────

    pub fn generic_action(
        &self,
        caller: &Principal,
        action: &Principal,
        param: serde_json::Value,
    ) -> RegentResult<()> {
        let op = Operation::GenericAction;
        self.guarded(caller, op, |_| {
            let avatar = &self.resources.avatar;
            Self::accepted(avatar.generic_action(action, &param)?, avatar.id(), op)?;
            Ok((
                (),
                Some(ControllerEvent::GenericAction {
                    sender: caller.clone(),
                    action: action.clone(),
                    param,
                }),
            ))
        })
    }

    pub fn send_funds(&self, caller: &Principal, amount: u128, to: &Principal) -> RegentResult<()> {
        let op = Operation::SendFunds;
        self.guarded(caller, op, |_| {
            let avatar = &self.resources.avatar;
            Self::accepted(avatar.send_funds(amount, to)?, avatar.id(), op)?;
            Ok((
                (),
                Some(ControllerEvent::FundsSent {
                    sender: caller.clone(),
                    to: to.clone(),
                    amount,
                }),
            ))
        })
    }

    pub fn external_transfer(
        &self,
        caller: &Principal,
        token: &Principal,
        to: &Principal,
        amount: u128,
    ) -> RegentResult<()> {
        let op = Operation::ExternalTransfer;
        self.guarded(caller, op, |_| {
            let avatar = &self.resources.avatar;
            Self::accepted(avatar.external_transfer(token, to, amount)?, avatar.id(), op)?;
            Ok((
                (),
                Some(ControllerEvent::ExternalTransfer {
                    sender: caller.clone(),
                    token: token.clone(),
                    to: to.clone(),
                    amount,
                }),
            ))
        })
    }

    pub fn external_transfer_from(
        &self,
        caller: &Principal,
        token: &Principal,
        from: &Principal,
        to: &Principal,
        amount: u128,
    ) -> RegentResult<()> {
        let op = Operation::ExternalTransferFrom;
        self.guarded(caller, op, |_| {
            let avatar = &self.resources.avatar;
            Self::accepted(
                avatar.external_transfer_from(token, from, to, amount)?,
                avatar.id(),
                op,
            )?;
            Ok((
                (),
                Some(ControllerEvent::ExternalTransferFrom {
                    sender: caller.clone(),
                    token: token.clone(),
                    from: from.clone(),
                    to: to.clone(),
                    amount,
                }),
            ))
        })
    }

    pub fn external_approve(
        &self,
        caller: &Principal,
        token: &Principal,
        spender: &Principal,
        amount: u128,
    ) -> RegentResult<()> {
        let op = Operation::ExternalApprove;
        self.guarded(caller, op, |_| {
            let avatar = &self.resources.avatar;
            Self::accepted(avatar.external_approve(token, spender, amount)?, avatar.id(), op)?;
            Ok((
                (),
                Some(ControllerEvent::ExternalApprove {
                    sender: caller.clone(),
                    token: token.clone(),
                    spender: spender.clone(),
                    amount,
                }),
            ))
        })
    }

    // ── Upgrade ───────────────────────────────────────────────────────────────

    /// Hand all three managed resources to `new_controller`. One-shot.
    ///
    /// After success this controller is retired: every privileged call
    /// except `unregister_self` fails with `ControllerRetired`.
    ///
    /// If the call fails after ownership has started to move (a resource
    /// refuses, a post-hook rejects, the audit write fails), whatever was
    /// handed over is reclaimed and the controller stays live. If reclaiming
    /// fails as well, the controller retires in favour of `new_controller`
    /// so that it never keeps running without its resources.
    pub fn upgrade(&self, caller: &Principal, new_controller: &Principal) -> RegentResult<()> {
        let resources = &self.resources;
        let handovers: [Handover<'_>; 3] = [
            &|owner: &Principal| resources.avatar.transfer_ownership(owner),
            &|owner: &Principal| resources.token.transfer_ownership(owner),
            &|owner: &Principal| resources.reputation.transfer_ownership(owner),
        ];
        let moved = Cell::new(0usize);

        self.guarded_with_undo(
            caller,
            Operation::UpgradeController,
            |state| {
                if let Some(existing) = &state.upgrade_target {
                    return Err(RegentError::InvalidUpgrade {
                        reason: format!("controller already upgraded to '{}'", existing),
                    });
                }
                if new_controller.is_null() {
                    return Err(RegentError::InvalidUpgrade {
                        reason: "upgrade target is the null principal".to_string(),
                    });
                }
                if *new_controller == self.principal {
                    return Err(RegentError::InvalidUpgrade {
                        reason: "controller cannot upgrade to itself".to_string(),
                    });
                }

                for handover in &handovers {
                    handover(new_controller)?;
                    moved.set(moved.get() + 1);
                }
                state.upgrade_target = Some(new_controller.clone());

                info!(
                    controller = %self.principal,
                    successor = %new_controller,
                    "managed resources transferred to successor"
                );
                Ok((
                    (),
                    Some(ControllerEvent::ControllerUpgraded {
                        sender: caller.clone(),
                        new_controller: new_controller.clone(),
                    }),
                ))
            },
            |live| self.reclaim(&handovers[..moved.get()], new_controller, live),
        )
    }

    /// Undo the handovers of an aborted upgrade, most recent first.
    fn reclaim(&self, moved: &[Handover<'_>], successor: &Principal, live: &mut ControllerState) {
        if moved.is_empty() {
            return;
        }

        let mut failure = None;
        for handover in moved.iter().rev() {
            if let Err(e) = handover(&self.principal) {
                failure = Some(e);
            }
        }

        match failure {
            None => warn!(
                controller = %self.principal,
                successor = %successor,
                reclaimed = moved.len(),
                "upgrade aborted; managed resources reclaimed"
            ),
            Some(e) => {
                error!(
                    controller = %self.principal,
                    successor = %successor,
                    error = %e,
                    "upgrade aborted and resources could not be reclaimed; retiring"
                );
                live.upgrade_target = Some(successor.clone());
            }
        }
    }

    // ── Dispatch ──────────────────────────────────────────────────────────────

    /// Route a decoded [`Call`] to its entry point.
    pub fn execute(&self, caller: &Principal, call: Call) -> RegentResult<CallOutcome> {
        let committed = |changed: bool| {
            if changed {
                CallOutcome::Committed
            } else {
                CallOutcome::NoChange
            }
        };

        match call {
            Call::MintReputation { amount, beneficiary } => self
                .mint_reputation(caller, amount, &beneficiary)
                .map(|()| CallOutcome::Committed),
            Call::MintTokens { amount, beneficiary } => self
                .mint_tokens(caller, amount, &beneficiary)
                .map(|()| CallOutcome::Committed),
            Call::RegisterScheme { scheme, config_hash, permissions } => self
                .register_scheme(caller, &scheme, config_hash, permissions)
                .map(|()| CallOutcome::Committed),
            Call::UnregisterScheme { scheme } => {
                self.unregister_scheme(caller, &scheme).map(committed)
            }
            Call::UnregisterSelf => self.unregister_self(caller).map(committed),
            Call::AddGlobalConstraint { constraint, params } => self
                .add_published_constraint(caller, &constraint, params)
                .map(CallOutcome::ConstraintSlot),
            Call::RemoveGlobalConstraint { constraint } => self
                .remove_global_constraint(caller, &constraint)
                .map(CallOutcome::ConstraintSlot),
            Call::GenericAction { action, param } => self
                .generic_action(caller, &action, param)
                .map(|()| CallOutcome::Committed),
            Call::SendFunds { amount, to } => self
                .send_funds(caller, amount, &to)
                .map(|()| CallOutcome::Committed),
            Call::ExternalTransfer { token, to, amount } => self
                .external_transfer(caller, &token, &to, amount)
                .map(|()| CallOutcome::Committed),
            Call::ExternalTransferFrom { token, from, to, amount } => self
                .external_transfer_from(caller, &token, &from, &to, amount)
                .map(|()| CallOutcome::Committed),
            Call::ExternalApprove { token, spender, amount } => self
                .external_approve(caller, &token, &spender, amount)
                .map(|()| CallOutcome::Committed),
            Call::UpgradeController { new_controller } => self
                .upgrade(caller, &new_controller)
                .map(|()| CallOutcome::Committed),
        }
    }

    /// Decode `json` with [`Call::from_json`] and execute it.
    pub fn execute_json(&self, caller: &Principal, json: &str) -> RegentResult<CallOutcome> {
        let call = Call::from_json(json)?;
        self.execute(caller, call)
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn enforcement_mode(&self) -> EnforcementMode {
        self.guard.mode()
    }

    pub fn is_scheme_registered(&self, scheme: &Principal) -> bool {
        self.read_state().permissions.is_registered(scheme)
    }

    pub fn scheme_permissions(&self, scheme: &Principal) -> Permissions {
        self.read_state().permissions.permissions_of(scheme)
    }

    pub fn scheme_config(&self, scheme: &Principal) -> ConfigHash {
        self.read_state().permissions.config_of(scheme)
    }

    /// All registered schemes, sorted by principal.
    pub fn schemes(&self) -> Vec<(Principal, SchemeEntry)> {
        self.read_state()
            .permissions
            .schemes()
            .into_iter()
            .map(|(p, e)| (p.clone(), *e))
            .collect()
    }

    /// Live constraints in insertion order, with their slot indices.
    pub fn global_constraints(&self) -> Vec<(usize, Principal, ParamsHash)> {
        let state = self.read_state();
        (0..state.constraints.len())
            .filter_map(|i| {
                state
                    .constraints
                    .get(i)
                    .map(|e| (i, e.reference.clone(), e.params))
            })
            .collect()
    }

    /// Total constraint slots, tombstones included.
    pub fn constraint_slots(&self) -> usize {
        self.read_state().constraints.len()
    }

    pub fn upgrade_target(&self) -> Option<Principal> {
        self.read_state().upgrade_target.clone()
    }

    pub fn is_retired(&self) -> bool {
        self.read_state().upgrade_target.is_some()
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
