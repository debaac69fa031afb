//! Genesis configuration schema.
//!
//! A `GenesisConfig` is deserialized from TOML and describes everything a
//! controller needs at construction: its own principal, the constraint
//! enforcement mode, and the bootstrap scheme set.
//!
//! Example:
//! ```toml
//! controller = "controller-v1"
//! enforcement = "full"
//!
//! [[schemes]]
//! principal = "genesis-scheme"
//! description = "Bootstraps the organization"
//! config_hash = "0x00000000000000000000000000000000000000000000000000000000000000aa"
//! permissions = ["REGISTERED", "CAN_MANAGE_SCHEMES", "CAN_UPGRADE"]
//! ```

use serde::{Deserialize, Serialize};

use regent_contracts::{
    error::{RegentError, RegentResult},
    operation::EnforcementMode,
    permission::Permissions,
    principal::{ConfigHash, Hash32, Principal},
};

/// One bootstrap scheme.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemeSpec {
    pub principal: String,

    /// Free text for operators. Never reaches the controller.
    #[serde(default)]
    pub description: Option<String>,

    /// 64 hex characters, optional `0x` prefix. Defaults to all zeros.
    #[serde(default)]
    pub config_hash: Option<String>,

    /// Capability names (`"REGISTERED"`, `"CAN_UPGRADE"`, `"ALL"`, …) or raw
    /// mask literals (`"0x10"`). Combined with bitwise OR.
    pub permissions: Vec<String>,
}

impl SchemeSpec {
    pub fn principal(&self) -> Principal {
        Principal::new(self.principal.clone())
    }

    pub fn config_hash(&self) -> RegentResult<ConfigHash> {
        match &self.config_hash {
            Some(hex) => Hash32::from_hex(hex),
            None => Ok(Hash32::ZERO),
        }
    }

    /// Parse and combine the permission list.
    ///
    /// An empty result is rejected: it would bootstrap a tombstone.
    pub fn permissions(&self) -> RegentResult<Permissions> {
        let mut bits = Permissions::empty();
        for name in &self.permissions {
            let parsed = Permissions::parse(name).ok_or_else(|| RegentError::ConfigError {
                reason: format!(
                    "scheme '{}' lists unknown permission '{}'",
                    self.principal, name
                ),
            })?;
            bits |= parsed;
        }
        if !bits.is_registered() {
            return Err(RegentError::ConfigError {
                reason: format!("scheme '{}' has no permissions", self.principal),
            });
        }
        Ok(bits)
    }
}

/// The top-level structure deserialized from a TOML genesis file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenesisConfig {
    /// The controller's own principal.
    pub controller: String,

    #[serde(default)]
    pub enforcement: EnforcementMode,

    /// Bootstrap schemes, registered in declaration order.
    #[serde(default)]
    pub schemes: Vec<SchemeSpec>,
}
