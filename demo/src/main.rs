//! REGENT Governance Controller: demo CLI
//!
//! Runs the reference scenarios against an in-memory organization, or loads
//! a genesis file and shows the controller it would build.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- scheme-lifecycle
//!   cargo run -p demo -- global-constraints
//!   cargo run -p demo -- upgrade
//!   cargo run -p demo -- inspect --config crates/regent-ref/config/genesis.toml

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use regent_config::GenesisConfig;
use regent_contracts::error::RegentResult;
use regent_ref::organization::{Organization, INITIAL_TREASURY, REFERENCE_GENESIS};
use regent_ref::scenarios::{self, global_constraints, scheme_lifecycle, upgrade};

// ── CLI definition ────────────────────────────────────────────────────────────

/// REGENT: permissioned governance controller demo.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "REGENT governance controller demo",
    long_about = "Runs REGENT scenarios showing scheme permissions, non-escalation,\n\
                  global constraint hooks, controller upgrade, and audit chain integrity."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all three scenarios in sequence.
    RunAll,
    /// Scenario 1: registration, escalation refusals, self-removal.
    SchemeLifecycle,
    /// Scenario 2: budgets, freezes, tombstoned removal.
    GlobalConstraints,
    /// Scenario 3: one-shot upgrade and retirement.
    Upgrade,
    /// Load a genesis file and print the controller it bootstraps.
    Inspect {
        /// Path to a genesis TOML file. Defaults to the built-in reference
        /// organization.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug for every guard decision.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::RunAll => {
            print_banner();
            scenarios::run_all()
        }
        Command::SchemeLifecycle => {
            print_banner();
            scheme_lifecycle::run_scenario()
        }
        Command::GlobalConstraints => {
            print_banner();
            global_constraints::run_scenario()
        }
        Command::Upgrade => {
            print_banner();
            upgrade::run_scenario()
        }
        Command::Inspect { config } => inspect(config),
    };

    match result {
        Ok(()) => {
            println!("Done.");
        }
        Err(e) => {
            eprintln!("Demo error: {}", e);
            std::process::exit(1);
        }
    }
}

// ── Inspect ───────────────────────────────────────────────────────────────────

fn inspect(path: Option<PathBuf>) -> RegentResult<()> {
    let genesis = match &path {
        Some(path) => {
            info!(path = %path.display(), "loading genesis file");
            GenesisConfig::from_file(path)?
        }
        None => GenesisConfig::from_toml_str(REFERENCE_GENESIS)?,
    };
    let org = Organization::from_genesis(&genesis, INITIAL_TREASURY)?;
    let controller = &org.controller;

    println!();
    println!(
        "Genesis:      {}",
        path.as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<built-in reference>".to_string())
    );
    println!("Controller:   {}", controller.principal());
    println!("Enforcement:  {:?}", controller.enforcement_mode());
    println!("Schemes:      {}", controller.schemes().len());
    println!();

    for (scheme, entry) in controller.schemes() {
        let description = genesis
            .schemes
            .iter()
            .find(|s| s.principal() == scheme)
            .and_then(|s| s.description.clone())
            .unwrap_or_default();
        println!(
            "  {:<24} 0x{:02x}  {}",
            scheme.to_string(),
            entry.permissions.bits(),
            entry.permissions.names().join(" | ")
        );
        if !entry.config_hash.is_zero() {
            println!("  {:<24} config 0x{}", "", entry.config_hash.to_hex());
        }
        if !description.is_empty() {
            println!("  {:<24} {}", "", description);
        }
    }
    println!();

    Ok(())
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("REGENT: Permissioned Governance Controller");
    println!("Reference Demo");
    println!("==========================================");
    println!();
    println!("Guard envelope per privileged call:");
    println!("  [1] Retired controllers refuse everything but self-removal");
    println!("  [2] Permission gate: caller must hold the operation's bit");
    println!("  [3] Global constraint pre-hooks");
    println!("  [4] Body runs against staged state (non-escalation checks here)");
    println!("  [5] Global constraint post-hooks");
    println!("  [6] Audit record appended to the SHA-256 chain, then commit");
    println!();
}

#[cfg(test)]
mod tests {
    #[test]
    fn inspect_prints_reference_genesis() {
        super::inspect(None).unwrap();
    }
}
