//! A complete in-memory organization: controller, managed resources, and
//! audit trail wired together from a genesis configuration.

use std::sync::Arc;

use regent_audit::InMemoryAuditWriter;
use regent_config::GenesisConfig;
use regent_contracts::{error::RegentResult, principal::Principal};
use regent_core::{Controller, Resources};

use crate::resources::{InMemoryAvatar, InMemoryReputation, InMemoryToken};

/// The genesis configuration the scenarios run against.
pub const REFERENCE_GENESIS: &str = include_str!("../config/genesis.toml");

pub const AVATAR_ID: &str = "avatar";
pub const TOKEN_ID: &str = "native-token";
pub const REPUTATION_ID: &str = "reputation";

/// Native funds the avatar starts with.
pub const INITIAL_TREASURY: u128 = 1_000;

/// Concrete handles alongside the controller that drives them, so callers
/// can observe balances and the audit trail directly.
pub struct Organization {
    pub controller: Controller,
    pub avatar: Arc<InMemoryAvatar>,
    pub token: Arc<InMemoryToken>,
    pub reputation: Arc<InMemoryReputation>,
    pub audit: Arc<InMemoryAuditWriter>,
}

impl Organization {
    /// Build the organization described by `genesis`. The managed resources
    /// start out owned by the controller.
    pub fn from_genesis(genesis: &GenesisConfig, treasury: u128) -> RegentResult<Self> {
        let principal = genesis.controller_principal();
        let bootstrap = genesis.bootstrap()?;

        let avatar = Arc::new(InMemoryAvatar::new(AVATAR_ID, principal.clone(), treasury));
        let token = Arc::new(InMemoryToken::new(TOKEN_ID, principal.clone()));
        let reputation = Arc::new(InMemoryReputation::new(REPUTATION_ID, principal.clone()));
        let audit = Arc::new(InMemoryAuditWriter::new(principal.as_str()));

        let resources = Resources {
            avatar: avatar.clone(),
            token: token.clone(),
            reputation: reputation.clone(),
        };
        let controller = Controller::new(
            principal,
            resources,
            bootstrap,
            audit.clone(),
            genesis.enforcement,
        )?;

        Ok(Self {
            controller,
            avatar,
            token,
            reputation,
            audit,
        })
    }

    /// The organization in `config/genesis.toml`, with
    /// [`INITIAL_TREASURY`] in the avatar.
    pub fn reference() -> RegentResult<Self> {
        let genesis = GenesisConfig::from_toml_str(REFERENCE_GENESIS)?;
        Self::from_genesis(&genesis, INITIAL_TREASURY)
    }

    /// Print the audit summary line the scenarios end each sub-case with.
    pub fn print_audit_summary(&self) {
        let log = self.audit.export_log();
        println!(
            "  Audit chain integrity:  {} ({} event(s))",
            if self.audit.verify_integrity() { "VERIFIED" } else { "FAILED" },
            log.events.len()
        );
    }

    /// Whether every managed resource currently names `owner` as its owner.
    pub fn resources_owned_by(&self, owner: &Principal) -> bool {
        self.avatar.owner() == *owner
            && self.token.owner() == *owner
            && self.reputation.owner() == *owner
    }
}
