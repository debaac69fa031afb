//! # regent-config
//!
//! TOML genesis configuration for REGENT controllers.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use regent_config::GenesisConfig;
//!
//! let genesis = GenesisConfig::from_file(Path::new("config/genesis.toml"))?;
//! let controller = Controller::new(
//!     genesis.controller_principal(),
//!     resources,
//!     genesis.bootstrap()?,
//!     audit,
//!     genesis.enforcement,
//! )?;
//! ```

pub mod genesis;
pub mod schema;

pub use schema::{GenesisConfig, SchemeSpec};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use regent_contracts::{
        error::RegentError,
        operation::EnforcementMode,
        permission::Permissions,
        principal::{Hash32, Principal},
    };

    use crate::GenesisConfig;

    fn expect_config_error(toml: &str, needle: &str) {
        let result = GenesisConfig::from_toml_str(toml).and_then(|g| g.bootstrap());
        match result {
            Err(RegentError::ConfigError { reason }) => {
                assert!(reason.contains(needle), "expected '{needle}' in: {reason}");
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_minimal_genesis() {
        let genesis = GenesisConfig::from_toml_str(r#"controller = "ctrl""#).unwrap();
        assert_eq!(genesis.enforcement, EnforcementMode::Full);
        assert!(genesis.bootstrap().unwrap().is_empty());
        assert_eq!(genesis.controller_principal(), Principal::new("ctrl"));
    }

    #[test]
    fn test_bootstrap_sequences_line_up() {
        let toml = format!(
            r#"
            controller = "ctrl"
            enforcement = "permission-only"

            [[schemes]]
            principal = "genesis"
            description = "first scheme"
            config_hash = "0x{}"
            permissions = ["REGISTERED", "CAN_MANAGE_SCHEMES"]

            [[schemes]]
            principal = "upgrader"
            permissions = ["registered", "upgrade", "0x10"]
            "#,
            "aa".repeat(32)
        );

        let genesis = GenesisConfig::from_toml_str(&toml).unwrap();
        assert_eq!(genesis.enforcement, EnforcementMode::PermissionOnly);

        let bootstrap = genesis.bootstrap().unwrap();
        assert!(bootstrap.validate().is_ok());
        assert_eq!(bootstrap.principals, vec![Principal::new("genesis"), Principal::new("upgrader")]);
        assert_eq!(bootstrap.config_hashes, vec![Hash32([0xaa; 32]), Hash32::ZERO]);
        assert_eq!(
            bootstrap.permissions[0],
            Permissions::REGISTERED | Permissions::CAN_MANAGE_SCHEMES
        );
        assert_eq!(bootstrap.permissions[1].bits(), 0b1_1001);
    }

    #[test]
    fn test_toml_parse_error() {
        expect_config_error("this is not valid toml ][[[", "failed to parse genesis TOML");
    }

    #[test]
    fn test_unknown_permission_rejected() {
        expect_config_error(
            r#"
            controller = "ctrl"
            [[schemes]]
            principal = "s"
            permissions = ["REGISTERED", "CAN_FLY"]
            "#,
            "CAN_FLY",
        );
    }

    #[test]
    fn test_empty_permissions_rejected() {
        expect_config_error(
            r#"
            controller = "ctrl"
            [[schemes]]
            principal = "s"
            permissions = []
            "#,
            "no permissions",
        );
    }

    #[test]
    fn test_duplicate_scheme_rejected() {
        expect_config_error(
            r#"
            controller = "ctrl"
            [[schemes]]
            principal = "s"
            permissions = ["REGISTERED"]
            [[schemes]]
            principal = "s"
            permissions = ["ALL"]
            "#,
            "more than once",
        );
    }

    #[test]
    fn test_bad_config_hash_rejected() {
        expect_config_error(
            r#"
            controller = "ctrl"
            [[schemes]]
            principal = "s"
            config_hash = "1234"
            permissions = ["REGISTERED"]
            "#,
            "expected 32",
        );
    }

    #[test]
    fn test_empty_controller_rejected() {
        expect_config_error(r#"controller = """#, "must not be empty");
    }

    #[test]
    fn test_missing_file() {
        let result = GenesisConfig::from_file(std::path::Path::new("/nonexistent/genesis.toml"));
        assert!(matches!(result, Err(RegentError::ConfigError { .. })));
    }
}
