//! Loading a `GenesisConfig` and turning it into a controller bootstrap.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info};

use regent_contracts::{
    error::{RegentError, RegentResult},
    principal::Principal,
};
use regent_core::Bootstrap;

use crate::schema::GenesisConfig;

impl GenesisConfig {
    /// Parse `s` as TOML.
    ///
    /// Returns `RegentError::ConfigError` if the TOML is malformed or does
    /// not match the `GenesisConfig` schema.
    pub fn from_toml_str(s: &str) -> RegentResult<Self> {
        let config: GenesisConfig = toml::from_str(s).map_err(|e| RegentError::ConfigError {
            reason: format!("failed to parse genesis TOML: {}", e),
        })?;
        debug!(
            controller = %config.controller,
            schemes = config.schemes.len(),
            "genesis configuration parsed"
        );
        Ok(config)
    }

    /// Read the file at `path` and parse it as a genesis configuration.
    pub fn from_file(path: &Path) -> RegentResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| RegentError::ConfigError {
            reason: format!("failed to read genesis file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn controller_principal(&self) -> Principal {
        Principal::new(self.controller.clone())
    }

    /// Build the three parallel bootstrap sequences.
    ///
    /// Rejects a null controller, null or duplicate scheme principals, bad
    /// hashes, and unknown or empty permission lists.
    pub fn bootstrap(&self) -> RegentResult<Bootstrap> {
        if self.controller_principal().is_null() {
            return Err(RegentError::ConfigError {
                reason: "genesis 'controller' must not be empty".to_string(),
            });
        }

        let mut seen = HashSet::new();
        let mut bootstrap = Bootstrap::new();
        for spec in &self.schemes {
            let principal = spec.principal();
            if principal.is_null() {
                return Err(RegentError::ConfigError {
                    reason: "genesis scheme with empty principal".to_string(),
                });
            }
            if !seen.insert(principal.clone()) {
                return Err(RegentError::ConfigError {
                    reason: format!("scheme '{}' declared more than once", principal),
                });
            }
            bootstrap = bootstrap.with_scheme(principal, spec.config_hash()?, spec.permissions()?);
        }

        info!(
            controller = %self.controller,
            schemes = bootstrap.len(),
            enforcement = ?self.enforcement,
            "genesis bootstrap prepared"
        );
        Ok(bootstrap)
    }
}
