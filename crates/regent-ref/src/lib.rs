//! # regent-ref
//!
//! Reference runtime for the REGENT governance controller.
//!
//! Provides in-memory stand-ins for everything a controller manages or
//! consults, wired together from a TOML genesis file:
//!
//! - `InMemoryAvatar`, `InMemoryToken`, `InMemoryReputation`: the three
//!   managed resources.
//! - `CallBudget` and `OperationFreeze`: sample global constraints.
//! - `Organization`: controller, resources, and audit trail in one value.
//!
//! and three scenarios exercising the controller end to end:
//!
//! 1. **Scheme Lifecycle**: delegated registration, escalation refusals,
//!    self-removal, and JSON dispatch.
//! 2. **Global Constraints**: per-caller budgets, dispatched constraints,
//!    tombstoned removal, and permission-only enforcement.
//! 3. **Controller Upgrade**: the one-shot hand-off and retirement.
//!
//! Nothing is persisted and no external system is contacted.

pub mod constraints;
pub mod organization;
pub mod resources;
pub mod scenarios;

pub use constraints::{CallBudget, OperationFreeze};
pub use organization::Organization;
pub use resources::{InMemoryAvatar, InMemoryReputation, InMemoryToken};
