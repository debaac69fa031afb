//! # regent-core
//!
//! The permissioned governance controller.
//!
//! This crate provides:
//! - The collaborator traits (`Avatar`, `MintableToken`, `ReputationLedger`,
//!   `GlobalConstraint`, `AuditWriter`)
//! - `PermissionTable` and the scheme-management policy
//! - `ConstraintRegistry` with tombstone-on-removal slots
//! - `Guard`, the permission gate plus constraint hooks
//! - `Controller`, which runs every privileged call through the guard under
//!   one exclusive lock
//!
//! ## Usage
//!
//! ```rust,ignore
//! use regent_core::{Bootstrap, Controller, Resources};
//!
//! let controller = Controller::new(principal, resources, bootstrap, audit, EnforcementMode::Full)?;
//! controller.mint_tokens(&scheme, 100, &beneficiary)?;
//! ```

pub mod constraints;
pub mod controller;
pub mod guard;
pub mod permissions;
pub mod traits;

pub use constraints::{ConstraintEntry, ConstraintRegistry};
pub use controller::{Bootstrap, CallOutcome, Controller, Resources};
pub use guard::Guard;
pub use permissions::{PermissionTable, SchemeEntry};
