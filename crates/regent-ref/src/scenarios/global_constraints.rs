//! Scenario 2: Global Constraints
//!
//! Organization-wide hooks layered on top of permission checks:
//!
//! Sub-case A: a mint budget of 2 per caller       → third mint ConstraintRejected
//! Sub-case B: a published freeze added by JSON    → sendFunds ConstraintRejected
//! Sub-case C: removing the budget                 → slot tombstoned, minting resumes
//! Sub-case D: permission-only enforcement         → hooks skipped

use std::sync::Arc;

use regent_config::GenesisConfig;
use regent_contracts::{
    error::{RegentError, RegentResult},
    operation::{EnforcementMode, Operation},
    principal::{Hash32, Principal},
};

use crate::constraints::{CallBudget, OperationFreeze};
use crate::organization::{Organization, INITIAL_TREASURY, REFERENCE_GENESIS};

pub const MINT_BUDGET: u32 = 2;

fn print_constraints(org: &Organization) {
    let live = org.controller.global_constraints();
    let listed: Vec<String> = live.iter().map(|(i, p, _)| format!("#{} {}", i, p)).collect();
    println!(
        "  Live constraints:       [{}] ({} slot(s) total)",
        listed.join(", "),
        org.controller.constraint_slots()
    );
}

pub fn run_scenario() -> RegentResult<()> {
    println!("=== Scenario 2: Global Constraints ===");
    println!();

    let org = Organization::reference()?;
    let council = Principal::new("constraint-council");
    let treasury = Principal::new("treasury-scheme");
    let bob = Principal::new("bob");

    let budget = Arc::new(CallBudget::new("mint-budget", MINT_BUDGET).metering(&[Operation::MintTokens]));

    // ── Sub-case A: per-caller budget ─────────────────────────────────────────

    {
        println!("  Sub-case A: constraint-council installs a mint budget of {}", MINT_BUDGET);

        let slot = org
            .controller
            .add_global_constraint(&council, budget.clone(), Hash32([0x02; 32]))?;
        println!("  Installed at slot:      {}", slot);

        for n in 1..=MINT_BUDGET {
            org.controller.mint_tokens(&treasury, 100, &bob)?;
            println!("  Mint #{}:                Committed", n);
        }

        match org.controller.mint_tokens(&treasury, 100, &bob) {
            Err(RegentError::ConstraintRejected { constraint, stage, .. }) => {
                println!("  Mint #{}:                rejected by '{}' at {}-check", MINT_BUDGET + 1, constraint, stage);
                println!("  Token supply:           {}", org.token.total_supply());
                println!("  RESULT: ConstraintRejected (expected)");
            }
            Err(e) => println!("  Unexpected error: {}", e),
            Ok(()) => println!("  Unexpectedly exceeded the budget"),
        }
        org.print_audit_summary();
        println!();
    }

    // ── Sub-case B: dispatched constraint ─────────────────────────────────────

    {
        println!("  Sub-case B: treasury freeze published, then added from a JSON call");

        org.controller
            .publish_constraint(Arc::new(OperationFreeze::new("treasury-freeze", &[Operation::SendFunds])));
        let outcome = org
            .controller
            .execute_json(&council, r#"{ "addGlobalConstraint": { "constraint": "treasury-freeze" } }"#)?;
        println!("  Outcome:                {:?}", outcome);
        print_constraints(&org);

        match org.controller.send_funds(&treasury, 50, &bob) {
            Err(RegentError::ConstraintRejected { constraint, .. }) => {
                println!("  sendFunds:              rejected by '{}'", constraint);
                println!("  Avatar balance:         {}", org.avatar.native_balance());
                println!("  RESULT: ConstraintRejected (expected)");
            }
            Err(e) => println!("  Unexpected error: {}", e),
            Ok(()) => println!("  Unexpectedly moved funds"),
        }
        println!();
    }

    // ── Sub-case C: removal leaves a tombstone ────────────────────────────────

    {
        println!("  Sub-case C: constraint-council removes the mint budget");

        let slot = org
            .controller
            .remove_global_constraint(&council, &Principal::new("mint-budget"))?;
        println!("  Tombstoned slot:        {}", slot);
        print_constraints(&org);

        org.controller.mint_tokens(&treasury, 100, &bob)?;
        println!("  Mint after removal:     Committed");
        println!("  Token supply:           {}", org.token.total_supply());

        match org.controller.remove_global_constraint(&council, &Principal::new("mint-budget")) {
            Err(RegentError::NotFound { constraint }) => {
                println!("  Second removal:         NotFound ('{}')", constraint);
            }
            Err(e) => println!("  Unexpected error: {}", e),
            Ok(slot) => println!("  Unexpectedly removed slot {}", slot),
        }
        org.print_audit_summary();
        println!("  RESULT: Tombstoned (expected)");
        println!();
    }

    // ── Sub-case D: hooks disabled ────────────────────────────────────────────

    {
        println!("  Sub-case D: same organization with enforcement = permission-only");

        let mut genesis = GenesisConfig::from_toml_str(REFERENCE_GENESIS)?;
        genesis.enforcement = EnforcementMode::PermissionOnly;
        let lax = Organization::from_genesis(&genesis, INITIAL_TREASURY)?;

        let freeze = Arc::new(OperationFreeze::new("treasury-freeze", &[Operation::SendFunds]));
        let slot = lax.controller.add_global_constraint(&council, freeze, Hash32::ZERO)?;
        println!("  Freeze installed at:    {}", slot);

        lax.controller.send_funds(&treasury, 50, &bob)?;
        println!("  sendFunds:              Committed (hooks skipped)");
        println!("  Paid to bob:            {}", lax.avatar.paid_to(&bob));
        lax.print_audit_summary();
        println!("  RESULT: Hooks skipped (expected)");
        println!();
    }

    println!("  Scenario 2 complete.");
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use regent_contracts::{
        error::RegentError,
        operation::Operation,
        principal::{Hash32, Principal},
    };
    use regent_core::CallOutcome;

    use crate::constraints::{CallBudget, OperationFreeze};
    use crate::organization::Organization;

    use super::MINT_BUDGET;

    #[test]
    fn scenario_runs() {
        super::run_scenario().unwrap();
    }

    #[test]
    fn rejected_mint_leaves_supply_and_trail_untouched() {
        let org = Organization::reference().unwrap();
        let council = Principal::new("constraint-council");
        let treasury = Principal::new("treasury-scheme");
        let budget = Arc::new(CallBudget::new("mint-budget", MINT_BUDGET).metering(&[Operation::MintTokens]));
        org.controller
            .add_global_constraint(&council, budget.clone(), Hash32::ZERO)
            .unwrap();

        for _ in 0..MINT_BUDGET {
            org.controller.mint_tokens(&treasury, 10, &treasury).unwrap();
        }
        let before = org.audit.len();
        assert!(matches!(
            org.controller.mint_tokens(&treasury, 10, &treasury),
            Err(RegentError::ConstraintRejected { .. })
        ));
        assert_eq!(org.token.total_supply(), 20);
        assert_eq!(org.audit.len(), before);
        assert_eq!(budget.spent(&treasury, Operation::MintTokens), MINT_BUDGET);
    }

    #[test]
    fn dispatched_add_requires_published_constraint() {
        let org = Organization::reference().unwrap();
        let council = Principal::new("constraint-council");
        let call = r#"{ "addGlobalConstraint": { "constraint": "treasury-freeze" } }"#;

        assert!(matches!(
            org.controller.execute_json(&council, call),
            Err(RegentError::NotFound { .. })
        ));

        org.controller
            .publish_constraint(Arc::new(OperationFreeze::new("treasury-freeze", &[Operation::SendFunds])));
        let outcome = org.controller.execute_json(&council, call).unwrap();
        assert_eq!(outcome, CallOutcome::ConstraintSlot(0));
    }

    #[test]
    fn constraint_management_is_not_hook_checked() {
        let org = Organization::reference().unwrap();
        let council = Principal::new("constraint-council");
        let freeze_all = Arc::new(OperationFreeze::new("freeze-all", &Operation::ALL));
        org.controller
            .add_global_constraint(&council, freeze_all, Hash32::ZERO)
            .unwrap();

        assert!(org
            .controller
            .remove_global_constraint(&council, &Principal::new("freeze-all"))
            .is_ok());
    }
}
