//! Scenario 3: Controller Upgrade
//!
//! The one-shot hand-off of every managed resource to a successor:
//!
//! Sub-case A: treasury-scheme attempts the upgrade    → Unauthorized
//! Sub-case B: upgrade-committee targets the controller itself → InvalidUpgrade
//! Sub-case C: upgrade-committee upgrades to controller-v2     → resources move
//! Sub-case D: the retired controller                  → ControllerRetired / InvalidUpgrade
//! Sub-case E: controller-v2 takes over the same resources

use std::sync::Arc;

use regent_audit::InMemoryAuditWriter;
use regent_contracts::{
    error::{RegentError, RegentResult},
    operation::EnforcementMode,
    permission::Permissions,
    principal::{Hash32, Principal},
};
use regent_core::{Bootstrap, Controller, Resources};

use crate::organization::Organization;

pub const SUCCESSOR: &str = "controller-v2";

/// Build the successor controller over `org`'s resources, with the upgrade
/// committee carried over as its sole bootstrap scheme.
pub fn successor_controller(org: &Organization) -> RegentResult<(Controller, Arc<InMemoryAuditWriter>)> {
    let audit = Arc::new(InMemoryAuditWriter::new(SUCCESSOR));
    let bootstrap = Bootstrap::new().with_scheme(
        Principal::new("upgrade-committee"),
        Hash32::ZERO,
        Permissions::ALL,
    );
    let controller = Controller::new(
        Principal::new(SUCCESSOR),
        Resources {
            avatar: org.avatar.clone(),
            token: org.token.clone(),
            reputation: org.reputation.clone(),
        },
        bootstrap,
        audit.clone(),
        EnforcementMode::Full,
    )?;
    Ok((controller, audit))
}

pub fn run_scenario() -> RegentResult<()> {
    println!("=== Scenario 3: Controller Upgrade ===");
    println!();

    let org = Organization::reference()?;
    let committee = Principal::new("upgrade-committee");
    let treasury = Principal::new("treasury-scheme");
    let successor = Principal::new(SUCCESSOR);

    // ── Sub-case A: caller without CAN_UPGRADE ────────────────────────────────

    {
        println!("  Sub-case A: treasury-scheme upgrades to {}", SUCCESSOR);

        match org.controller.upgrade(&treasury, &successor) {
            Err(RegentError::Unauthorized { required, .. }) => {
                println!("  Permission gate:        FAIL (requires {})", required);
                println!("  RESULT: Unauthorized (expected)");
            }
            Err(e) => println!("  Unexpected error: {}", e),
            Ok(()) => println!("  Unexpectedly upgraded"),
        }
        println!();
    }

    // ── Sub-case B: degenerate target ─────────────────────────────────────────

    {
        println!("  Sub-case B: upgrade-committee upgrades to the controller itself");

        let own = org.controller.principal().clone();
        match org.controller.upgrade(&committee, &own) {
            Err(RegentError::InvalidUpgrade { reason }) => {
                println!("  Upgrade check:          FAIL ({})", reason);
                println!("  Retired:                {}", org.controller.is_retired());
                println!("  RESULT: InvalidUpgrade (expected)");
            }
            Err(e) => println!("  Unexpected error: {}", e),
            Ok(()) => println!("  Unexpectedly upgraded"),
        }
        println!();
    }

    // ── Sub-case C: the hand-off ──────────────────────────────────────────────

    {
        println!("  Sub-case C: upgrade-committee upgrades to {}", SUCCESSOR);

        org.controller
            .mint_reputation(&treasury, 40, &Principal::new("alice"))?;
        org.controller.upgrade(&committee, &successor)?;

        println!("  Avatar owner:           {}", org.avatar.owner());
        println!("  Token owner:            {}", org.token.owner());
        println!("  Reputation owner:       {}", org.reputation.owner());
        println!(
            "  Upgrade target:         {}",
            org.controller
                .upgrade_target()
                .map(|p| p.to_string())
                .unwrap_or_default()
        );
        org.print_audit_summary();
        println!("  RESULT: Upgraded (expected)");
        println!();
    }

    // ── Sub-case D: retirement ────────────────────────────────────────────────

    {
        println!("  Sub-case D: calls into the retired controller");

        match org.controller.mint_tokens(&treasury, 1, &treasury) {
            Err(RegentError::ControllerRetired { successor }) => {
                println!("  mintTokens:             ControllerRetired (successor {})", successor);
            }
            Err(e) => println!("  Unexpected error: {}", e),
            Ok(()) => println!("  Unexpectedly minted"),
        }

        match org.controller.upgrade(&committee, &Principal::new("controller-v3")) {
            Err(RegentError::InvalidUpgrade { reason }) => {
                println!("  Second upgrade:         InvalidUpgrade ({})", reason);
            }
            Err(e) => println!("  Unexpected error: {}", e),
            Ok(()) => println!("  Unexpectedly upgraded twice"),
        }

        let left = org.controller.unregister_self(&treasury)?;
        println!("  unregisterSelf:         {}", if left { "DONE" } else { "NOT REGISTERED" });
        org.print_audit_summary();
        println!("  RESULT: Retired (expected)");
        println!();
    }

    // ── Sub-case E: the successor takes over ──────────────────────────────────

    {
        println!("  Sub-case E: {} mints against the same resources", SUCCESSOR);

        let (v2, audit) = successor_controller(&org)?;
        v2.mint_reputation(&committee, 10, &Principal::new("alice"))?;
        println!(
            "  alice reputation:       {}",
            org.reputation.reputation_of(&Principal::new("alice"))
        );
        println!(
            "  Audit chain integrity:  {} ({} event(s), {} trail)",
            if audit.verify_integrity() { "VERIFIED" } else { "FAILED" },
            audit.len(),
            SUCCESSOR
        );
        println!("  RESULT: Successor active (expected)");
        println!();
    }

    println!("  Scenario 3 complete.");
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use regent_contracts::{error::RegentError, operation::Operation, principal::Principal};

    use crate::organization::Organization;

    use super::{successor_controller, SUCCESSOR};

    #[test]
    fn scenario_runs() {
        super::run_scenario().unwrap();
    }

    #[test]
    fn upgrade_moves_all_resources_and_retires() {
        let org = Organization::reference().unwrap();
        let committee = Principal::new("upgrade-committee");
        org.controller
            .upgrade(&committee, &Principal::new(SUCCESSOR))
            .unwrap();

        assert!(org.resources_owned_by(&Principal::new(SUCCESSOR)));
        assert!(org.controller.is_retired());

        let records = org.audit.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].operation, Operation::UpgradeController);

        assert!(matches!(
            org.controller.register_scheme(
                &Principal::new("founders"),
                &Principal::new("late-scheme"),
                Default::default(),
                Default::default(),
            ),
            Err(RegentError::ControllerRetired { .. })
        ));
    }

    #[test]
    fn failed_upgrade_leaves_ownership() {
        let org = Organization::reference().unwrap();
        let result = org
            .controller
            .upgrade(&Principal::new("upgrade-committee"), &Principal::null());
        assert!(matches!(result, Err(RegentError::InvalidUpgrade { .. })));
        assert!(org.resources_owned_by(&Principal::new("controller-v1")));
        assert!(org.audit.is_empty());
    }

    #[test]
    fn successor_drives_shared_resources() {
        let org = Organization::reference().unwrap();
        org.controller
            .upgrade(&Principal::new("upgrade-committee"), &Principal::new(SUCCESSOR))
            .unwrap();

        let (v2, audit) = successor_controller(&org).unwrap();
        v2.mint_tokens(&Principal::new("upgrade-committee"), 7, &Principal::new("bob"))
            .unwrap();
        assert_eq!(org.token.balance_of(&Principal::new("bob")), 7);
        assert_eq!(audit.len(), 1);
        assert!(org.audit.verify_integrity());
    }
}
