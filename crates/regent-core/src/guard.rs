//! The privileged-call envelope.
//!
//! `Guard` holds the two checks that bracket every privileged operation:
//! the permission gate and the constraint hooks. The controller drives the
//! ordering (gate → pre → body → post → audit → commit); the guard only
//! answers "may this proceed".

use tracing::{debug, warn};

use regent_contracts::{
    error::{HookStage, RegentError, RegentResult},
    operation::{EnforcementMode, Operation},
    principal::Principal,
};

use crate::{constraints::ConstraintRegistry, permissions::PermissionTable};

#[derive(Debug, Clone, Copy, Default)]
pub struct Guard {
    mode: EnforcementMode,
}

impl Guard {
    pub fn new(mode: EnforcementMode) -> Self {
        if mode == EnforcementMode::PermissionOnly {
            warn!("global constraint enforcement disabled; hooks will not run");
        }
        Self { mode }
    }

    pub fn mode(&self) -> EnforcementMode {
        self.mode
    }

    /// Require that `caller` holds the bit `operation` needs.
    pub fn authorize(
        &self,
        permissions: &PermissionTable,
        caller: &Principal,
        operation: Operation,
    ) -> RegentResult<()> {
        let required = operation.required();
        let held = permissions.permissions_of(caller);
        if held.contains(required) {
            return Ok(());
        }

        warn!(
            caller = %caller,
            operation = operation.tag(),
            required = ?required.names(),
            "caller lacks required permission"
        );
        Err(RegentError::Unauthorized {
            principal: caller.to_string(),
            operation: operation.tag().to_string(),
            required: required.names().join(" | "),
        })
    }

    /// Run every live constraint's pre-hook.
    pub fn pre(
        &self,
        constraints: &ConstraintRegistry,
        caller: &Principal,
        operation: Operation,
    ) -> RegentResult<()> {
        self.run_hooks(constraints, caller, operation, HookStage::Pre)
    }

    /// Run every live constraint's post-hook.
    pub fn post(
        &self,
        constraints: &ConstraintRegistry,
        caller: &Principal,
        operation: Operation,
    ) -> RegentResult<()> {
        self.run_hooks(constraints, caller, operation, HookStage::Post)
    }

    fn run_hooks(
        &self,
        constraints: &ConstraintRegistry,
        caller: &Principal,
        operation: Operation,
        stage: HookStage,
    ) -> RegentResult<()> {
        if self.mode == EnforcementMode::PermissionOnly || !operation.constraint_checked() {
            return Ok(());
        }

        let tag = operation.tag();
        constraints.for_each_live(|entry| {
            let passed = match stage {
                HookStage::Pre => entry.hook.pre(caller, &entry.params, tag)?,
                HookStage::Post => entry.hook.post(caller, &entry.params, tag)?,
            };
            if passed {
                debug!(
                    constraint = %entry.reference,
                    stage = %stage,
                    operation = tag,
                    "constraint passed"
                );
                Ok(())
            } else {
                warn!(
                    constraint = %entry.reference,
                    stage = %stage,
                    caller = %caller,
                    operation = tag,
                    "constraint rejected operation"
                );
                Err(RegentError::ConstraintRejected {
                    constraint: entry.reference.to_string(),
                    stage,
                    operation: tag.to_string(),
                })
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use regent_contracts::{
        error::{HookStage, RegentError, RegentResult},
        operation::{EnforcementMode, Operation},
        permission::Permissions,
        principal::{Hash32, ParamsHash, Principal},
    };

    use crate::{
        constraints::ConstraintRegistry, permissions::PermissionTable, traits::GlobalConstraint,
    };

    use super::Guard;

    /// Records every hook call as "stage:tag".
    struct Recorder {
        calls: Arc<Mutex<Vec<String>>>,
        allow_post: bool,
    }

    impl GlobalConstraint for Recorder {
        fn id(&self) -> Principal {
            Principal::new("recorder")
        }

        fn pre(&self, _: &Principal, _: &ParamsHash, tag: &str) -> RegentResult<bool> {
            self.calls.lock().unwrap().push(format!("pre:{tag}"));
            Ok(true)
        }

        fn post(&self, _: &Principal, _: &ParamsHash, tag: &str) -> RegentResult<bool> {
            self.calls.lock().unwrap().push(format!("post:{tag}"));
            Ok(self.allow_post)
        }
    }

    fn registry_with(allow_post: bool) -> (ConstraintRegistry, Arc<Mutex<Vec<String>>>) {
        let calls = Arc::new(Mutex::new(vec![]));
        let mut registry = ConstraintRegistry::new();
        registry.add(
            Arc::new(Recorder { calls: calls.clone(), allow_post }),
            Hash32::ZERO,
        );
        (registry, calls)
    }

    #[test]
    fn authorize_checks_required_bit() {
        let mut table = PermissionTable::new();
        table.set(Principal::new("a"), Hash32::ZERO, Permissions::REGISTERED);
        let guard = Guard::default();

        assert!(guard.authorize(&table, &Principal::new("a"), Operation::MintTokens).is_ok());
        assert!(matches!(
            guard.authorize(&table, &Principal::new("a"), Operation::UpgradeController),
            Err(RegentError::Unauthorized { .. })
        ));
        assert!(matches!(
            guard.authorize(&table, &Principal::new("stranger"), Operation::MintTokens),
            Err(RegentError::Unauthorized { .. })
        ));
    }

    #[test]
    fn self_removal_needs_no_bits() {
        let table = PermissionTable::new();
        let guard = Guard::default();
        assert!(guard
            .authorize(&table, &Principal::new("anyone"), Operation::UnregisterSelf)
            .is_ok());
    }

    #[test]
    fn hooks_receive_operation_tag() {
        let (registry, calls) = registry_with(true);
        let guard = Guard::new(EnforcementMode::Full);
        let caller = Principal::new("a");

        guard.pre(&registry, &caller, Operation::MintTokens).unwrap();
        guard.post(&registry, &caller, Operation::MintTokens).unwrap();

        assert_eq!(*calls.lock().unwrap(), vec!["pre:mintTokens", "post:mintTokens"]);
    }

    #[test]
    fn failing_post_hook_is_surfaced() {
        let (registry, _) = registry_with(false);
        let guard = Guard::new(EnforcementMode::Full);

        match guard.post(&registry, &Principal::new("a"), Operation::SendFunds) {
            Err(RegentError::ConstraintRejected { constraint, stage, operation }) => {
                assert_eq!(constraint, "recorder");
                assert_eq!(stage, HookStage::Post);
                assert_eq!(operation, "sendFunds");
            }
            other => panic!("expected ConstraintRejected, got {:?}", other),
        }
    }

    #[test]
    fn permission_only_mode_skips_hooks() {
        let (registry, calls) = registry_with(false);
        let guard = Guard::new(EnforcementMode::PermissionOnly);

        guard.pre(&registry, &Principal::new("a"), Operation::MintTokens).unwrap();
        guard.post(&registry, &Principal::new("a"), Operation::MintTokens).unwrap();

        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn constraint_management_skips_hooks() {
        let (registry, calls) = registry_with(false);
        let guard = Guard::new(EnforcementMode::Full);

        guard
            .post(&registry, &Principal::new("a"), Operation::AddGlobalConstraint)
            .unwrap();

        assert!(calls.lock().unwrap().is_empty());
    }
}
