//! # regent-contracts
//!
//! Shared types, permission bits, and error contracts for the REGENT
//! governance controller.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate, only data definitions and error types.

pub mod error;
pub mod operation;
pub mod permission;
pub mod principal;
pub mod record;
