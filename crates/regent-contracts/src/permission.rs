//! Capability bits held by registered schemes.
//!
//! A scheme's permissions are a 32-bit mask of which only the low four bits
//! carry meaning today. Higher bits are preserved in storage and ignored by
//! every policy check, so schemes carrying them keep working when new bits
//! are defined later.
//!
//! # Non-escalation
//!
//! ```
//! use regent_contracts::permission::Permissions;
//!
//! let caller = Permissions::REGISTERED | Permissions::CAN_MANAGE_SCHEMES;
//! let old = Permissions::empty();
//! let new = Permissions::REGISTERED;
//!
//! // Every changing bit is held by the caller.
//! assert!(Permissions::changed_bits_outside(old, new, caller).is_empty());
//! // The caller dominates the target's current bits.
//! assert!(old.not_dominated_by(caller).is_empty());
//! ```

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Capability bits of a scheme.
    ///
    /// | Bit | Capability | Gates |
    /// |-----|------------|-------|
    /// | 0 | [`REGISTERED`](Self::REGISTERED) | minting, fund movement, generic actions |
    /// | 1 | [`CAN_MANAGE_SCHEMES`](Self::CAN_MANAGE_SCHEMES) | `registerScheme`, `unregisterScheme` |
    /// | 2 | [`CAN_MANAGE_CONSTRAINTS`](Self::CAN_MANAGE_CONSTRAINTS) | `addGlobalConstraint`, `removeGlobalConstraint` |
    /// | 3 | [`CAN_UPGRADE`](Self::CAN_UPGRADE) | `upgradeController` |
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Permissions: u32 {
        const REGISTERED             = 0b0000_0001;
        const CAN_MANAGE_SCHEMES     = 0b0000_0010;
        const CAN_MANAGE_CONSTRAINTS = 0b0000_0100;
        const CAN_UPGRADE            = 0b0000_1000;

        // Unknown bits are part of the stored value.
        const _ = !0;
    }
}

impl Permissions {
    /// The defined-bit mask `0b1111`. Policy checks only look at these bits.
    pub const DEFINED: Self = Self::REGISTERED
        .union(Self::CAN_MANAGE_SCHEMES)
        .union(Self::CAN_MANAGE_CONSTRAINTS)
        .union(Self::CAN_UPGRADE);

    /// Every defined capability.
    pub const ALL: Self = Self::DEFINED;

    /// Build from a raw mask, keeping bits outside [`DEFINED`](Self::DEFINED).
    pub const fn from_raw(bits: u32) -> Self {
        Self::from_bits_retain(bits)
    }

    /// Restrict to the defined bits.
    #[must_use]
    pub fn defined(self) -> Self {
        self & Self::DEFINED
    }

    /// True for any non-zero stored value, including unknown high bits.
    pub fn is_registered(self) -> bool {
        self.bits() != 0
    }

    /// Defined bits of `self` the `holder` does not possess.
    ///
    /// Empty when `holder` dominates `self`.
    #[must_use]
    pub fn not_dominated_by(self, holder: Self) -> Self {
        Self::DEFINED & self & !holder
    }

    /// Defined bits that differ between `old` and `new` and that `holder`
    /// does not possess.
    #[must_use]
    pub fn changed_bits_outside(old: Self, new: Self, holder: Self) -> Self {
        Self::DEFINED & (old ^ new) & !holder
    }

    /// Human-readable names of the defined bits that are set.
    #[must_use]
    pub fn names(self) -> Vec<&'static str> {
        self.defined().iter_names().map(|(name, _)| name).collect()
    }

    /// Parse a capability name (case-insensitive) or a raw mask literal
    /// (`0x..` hex or decimal).
    ///
    /// ```
    /// use regent_contracts::permission::Permissions;
    ///
    /// assert_eq!(Permissions::parse("registered"), Some(Permissions::REGISTERED));
    /// assert_eq!(Permissions::parse("UPGRADE"), Some(Permissions::CAN_UPGRADE));
    /// assert_eq!(Permissions::parse("0x10").map(|p| p.bits()), Some(0x10));
    /// assert_eq!(Permissions::parse("bogus"), None);
    /// ```
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        if let Some(hex) = name.strip_prefix("0x") {
            return u32::from_str_radix(hex, 16).ok().map(Self::from_raw);
        }
        if let Ok(raw) = name.parse::<u32>() {
            return Some(Self::from_raw(raw));
        }
        match name.to_uppercase().as_str() {
            "REGISTERED" => Some(Self::REGISTERED),
            "CAN_MANAGE_SCHEMES" | "MANAGE_SCHEMES" => Some(Self::CAN_MANAGE_SCHEMES),
            "CAN_MANAGE_CONSTRAINTS" | "MANAGE_CONSTRAINTS" => Some(Self::CAN_MANAGE_CONSTRAINTS),
            "CAN_UPGRADE" | "UPGRADE" => Some(Self::CAN_UPGRADE),
            "ALL" => Some(Self::ALL),
            _ => None,
        }
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self::empty()
    }
}
