//! Runnable governance scenarios.
//!
//! Each scenario builds a fresh reference organization from
//! `config/genesis.toml` and walks one part of the controller's policy.

pub mod global_constraints;
pub mod scheme_lifecycle;
pub mod upgrade;

use regent_contracts::error::RegentResult;

/// Run every scenario in order.
pub fn run_all() -> RegentResult<()> {
    scheme_lifecycle::run_scenario()?;
    global_constraints::run_scenario()?;
    upgrade::run_scenario()?;
    Ok(())
}
