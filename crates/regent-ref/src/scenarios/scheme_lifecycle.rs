//! Scenario 1: Scheme Lifecycle
//!
//! Registration, privilege limits, and self-removal against the reference
//! organization:
//!
//! Sub-case A: governance-scheme registers grants-scheme     → Committed
//! Sub-case B: governance-scheme tries to grant CAN_UPGRADE  → PrivilegeEscalation
//! Sub-case C: governance-scheme tries to remove founders    → PrivilegeEscalation
//! Sub-case D: treasury-scheme tries to register anything    → Unauthorized
//! Sub-case E: grants-scheme mints, then unregisters itself  → minting stops
//! Sub-case F: founders registers a scheme from a JSON call  → Committed

use regent_contracts::{
    error::{RegentError, RegentResult},
    permission::Permissions,
    principal::{Hash32, Principal},
};

use crate::organization::Organization;

pub fn run_scenario() -> RegentResult<()> {
    println!("=== Scenario 1: Scheme Lifecycle ===");
    println!();

    let org = Organization::reference()?;
    let governance = Principal::new("governance-scheme");
    let grants = Principal::new("grants-scheme");

    // ── Sub-case A: delegated registration ────────────────────────────────────

    {
        println!("  Sub-case A: governance-scheme registers grants-scheme");
        println!("  Requested permissions:  REGISTERED");

        org.controller
            .register_scheme(&governance, &grants, Hash32([0x01; 32]), Permissions::REGISTERED)?;

        println!(
            "  Stored permissions:     {}",
            org.controller.scheme_permissions(&grants).names().join(" | ")
        );
        println!(
            "  Config hash:            {}…",
            &org.controller.scheme_config(&grants).to_hex()[..16]
        );
        org.print_audit_summary();
        println!("  RESULT: Committed (expected)");
        println!();
    }

    // ── Sub-case B: granting a bit the caller lacks ───────────────────────────

    {
        println!("  Sub-case B: governance-scheme grants CAN_UPGRADE to rogue-scheme");

        let rogue = Principal::new("rogue-scheme");
        match org.controller.register_scheme(
            &governance,
            &rogue,
            Hash32::ZERO,
            Permissions::REGISTERED | Permissions::CAN_UPGRADE,
        ) {
            Err(RegentError::PrivilegeEscalation { reason, .. }) => {
                println!("  Escalation check:       FAIL ({})", reason);
                println!(
                    "  rogue-scheme registered: {}",
                    org.controller.is_scheme_registered(&rogue)
                );
                println!("  RESULT: PrivilegeEscalation (expected)");
            }
            Err(e) => println!("  Unexpected error: {}", e),
            Ok(()) => println!("  Unexpectedly succeeded"),
        }
        println!();
    }

    // ── Sub-case C: removing a more privileged scheme ─────────────────────────

    {
        println!("  Sub-case C: governance-scheme unregisters founders");

        let founders = Principal::new("founders");
        match org.controller.unregister_scheme(&governance, &founders) {
            Err(RegentError::PrivilegeEscalation { reason, .. }) => {
                println!("  Escalation check:       FAIL ({})", reason);
                println!(
                    "  founders still registered: {}",
                    org.controller.is_scheme_registered(&founders)
                );
                println!("  RESULT: PrivilegeEscalation (expected)");
            }
            Err(e) => println!("  Unexpected error: {}", e),
            Ok(removed) => println!("  Unexpectedly succeeded (removed = {})", removed),
        }
        println!();
    }

    // ── Sub-case D: caller without CAN_MANAGE_SCHEMES ─────────────────────────

    {
        println!("  Sub-case D: treasury-scheme registers a scheme");

        let treasury = Principal::new("treasury-scheme");
        match org.controller.register_scheme(
            &treasury,
            &Principal::new("side-scheme"),
            Hash32::ZERO,
            Permissions::REGISTERED,
        ) {
            Err(RegentError::Unauthorized { required, .. }) => {
                println!("  Permission gate:        FAIL (requires {})", required);
                println!("  RESULT: Unauthorized (expected)");
            }
            Err(e) => println!("  Unexpected error: {}", e),
            Ok(()) => println!("  Unexpectedly succeeded"),
        }
        println!();
    }

    // ── Sub-case E: self-removal ──────────────────────────────────────────────

    {
        println!("  Sub-case E: grants-scheme mints, then unregisters itself");

        let alice = Principal::new("alice");
        org.controller.mint_tokens(&grants, 250, &alice)?;
        println!("  Minted to alice:        {}", org.token.balance_of(&alice));

        let removed = org.controller.unregister_self(&grants)?;
        println!("  Self-removal:           {}", if removed { "DONE" } else { "NOT REGISTERED" });

        match org.controller.mint_tokens(&grants, 250, &alice) {
            Err(RegentError::Unauthorized { .. }) => {
                println!("  Mint after removal:     Unauthorized");
                println!("  Token supply:           {}", org.token.total_supply());
                println!("  RESULT: Minting stopped (expected)");
            }
            Err(e) => println!("  Unexpected error: {}", e),
            Ok(()) => println!("  Unexpectedly minted after removal"),
        }
        org.print_audit_summary();
        println!();
    }

    // ── Sub-case F: dispatched call ───────────────────────────────────────────

    {
        println!("  Sub-case F: founders registers ops-scheme from a JSON call");

        let call = r#"{ "registerScheme": { "scheme": "ops-scheme", "permissions": "REGISTERED | CAN_MANAGE_SCHEMES" } }"#;
        println!("  Call:                   {}", call);

        let outcome = org.controller.execute_json(&Principal::new("founders"), call)?;
        let ops = Principal::new("ops-scheme");
        println!("  Outcome:                {:?}", outcome);
        println!(
            "  Stored permissions:     {}",
            org.controller.scheme_permissions(&ops).names().join(" | ")
        );
        org.print_audit_summary();
        println!("  RESULT: Committed (expected)");
        println!();
    }

    println!("  Scenario 1 complete.");
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    #[test]
    fn scenario_runs() {
        super::run_scenario().unwrap();
    }
}
