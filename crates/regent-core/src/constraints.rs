//! The global constraint registry.
//!
//! Entries live in a dense, index-addressed sequence. Removal leaves an
//! empty slot behind, so the index of every surviving entry is stable for
//! the lifetime of the controller.

use std::fmt;
use std::sync::Arc;

use regent_contracts::{
    error::{RegentError, RegentResult},
    principal::{ParamsHash, Principal},
};

use crate::traits::GlobalConstraint;

/// One live constraint slot.
#[derive(Clone)]
pub struct ConstraintEntry {
    pub reference: Principal,
    pub params: ParamsHash,
    pub hook: Arc<dyn GlobalConstraint>,
}

impl fmt::Debug for ConstraintEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintEntry")
            .field("reference", &self.reference)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Ordered constraint slots; `None` is a tombstone.
#[derive(Debug, Clone, Default)]
pub struct ConstraintRegistry {
    slots: Vec<Option<ConstraintEntry>>,
}

impl ConstraintRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `hook` under its own id. Returns the new slot index.
    pub fn add(&mut self, hook: Arc<dyn GlobalConstraint>, params: ParamsHash) -> usize {
        let reference = hook.id();
        self.slots.push(Some(ConstraintEntry { reference, params, hook }));
        self.slots.len() - 1
    }

    /// Tombstone the first live slot registered under `reference`.
    ///
    /// Returns the index that was cleared, or `NotFound` with nothing
    /// changed.
    pub fn remove(&mut self, reference: &Principal) -> RegentResult<usize> {
        let index = self
            .slots
            .iter()
            .position(|slot| matches!(slot, Some(entry) if entry.reference == *reference))
            .ok_or_else(|| RegentError::NotFound {
                constraint: reference.to_string(),
            })?;
        self.slots[index] = None;
        Ok(index)
    }

    /// Live entries in insertion order.
    pub fn live(&self) -> impl Iterator<Item = &ConstraintEntry> {
        self.slots.iter().flatten()
    }

    /// Run `f` on every live entry in insertion order, stopping at the
    /// first error.
    pub fn for_each_live<F>(&self, mut f: F) -> RegentResult<()>
    where
        F: FnMut(&ConstraintEntry) -> RegentResult<()>,
    {
        for entry in self.live() {
            f(entry)?;
        }
        Ok(())
    }

    /// The slot at `index`; `None` for tombstones and out-of-range indices.
    pub fn get(&self, index: usize) -> Option<&ConstraintEntry> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Total slots, tombstones included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn live_count(&self) -> usize {
        self.live().count()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use regent_contracts::{
        error::{RegentError, RegentResult},
        principal::{Hash32, ParamsHash, Principal},
    };

    use crate::traits::GlobalConstraint;

    use super::ConstraintRegistry;

    struct Named(&'static str);

    impl GlobalConstraint for Named {
        fn id(&self) -> Principal {
            Principal::new(self.0)
        }

        fn pre(&self, _: &Principal, _: &ParamsHash, _: &str) -> RegentResult<bool> {
            Ok(true)
        }

        fn post(&self, _: &Principal, _: &ParamsHash, _: &str) -> RegentResult<bool> {
            Ok(true)
        }
    }

    fn live_refs(registry: &ConstraintRegistry) -> Vec<String> {
        registry.live().map(|e| e.reference.0.clone()).collect()
    }

    #[test]
    fn add_appends_in_order() {
        let mut registry = ConstraintRegistry::new();
        assert_eq!(registry.add(Arc::new(Named("x")), Hash32([1; 32])), 0);
        assert_eq!(registry.add(Arc::new(Named("y")), Hash32([2; 32])), 1);
        assert_eq!(live_refs(&registry), vec!["x", "y"]);
        assert_eq!(registry.get(1).unwrap().params, Hash32([2; 32]));
    }

    #[test]
    fn remove_tombstones_without_shifting() {
        let mut registry = ConstraintRegistry::new();
        registry.add(Arc::new(Named("x")), Hash32::ZERO);
        registry.add(Arc::new(Named("y")), Hash32::ZERO);
        registry.add(Arc::new(Named("z")), Hash32::ZERO);

        assert_eq!(registry.remove(&Principal::new("y")).unwrap(), 1);

        assert_eq!(live_refs(&registry), vec!["x", "z"]);
        assert_eq!(registry.len(), 3, "slots are never compacted");
        assert_eq!(registry.live_count(), 2);
        assert!(registry.get(1).is_none());
        assert_eq!(registry.get(2).unwrap().reference, Principal::new("z"));
    }

    #[test]
    fn remove_takes_first_live_match_only() {
        let mut registry = ConstraintRegistry::new();
        registry.add(Arc::new(Named("x")), Hash32([1; 32]));
        registry.add(Arc::new(Named("x")), Hash32([2; 32]));

        assert_eq!(registry.remove(&Principal::new("x")).unwrap(), 0);
        assert_eq!(registry.remove(&Principal::new("x")).unwrap(), 1);
        assert!(registry.remove(&Principal::new("x")).is_err());
    }

    #[test]
    fn remove_missing_reports_not_found() {
        let mut registry = ConstraintRegistry::new();
        registry.add(Arc::new(Named("x")), Hash32::ZERO);

        match registry.remove(&Principal::new("nope")) {
            Err(RegentError::NotFound { constraint }) => assert_eq!(constraint, "nope"),
            other => panic!("expected NotFound, got {:?}", other),
        }
        assert_eq!(live_refs(&registry), vec!["x"]);
    }

    #[test]
    fn for_each_live_skips_tombstones_and_stops_on_error() {
        let mut registry = ConstraintRegistry::new();
        registry.add(Arc::new(Named("x")), Hash32::ZERO);
        registry.add(Arc::new(Named("y")), Hash32::ZERO);
        registry.add(Arc::new(Named("z")), Hash32::ZERO);
        registry.remove(&Principal::new("x")).unwrap();

        let mut seen = vec![];
        let result = registry.for_each_live(|entry| {
            seen.push(entry.reference.0.clone());
            if entry.reference.0 == "y" {
                return Err(RegentError::NotFound { constraint: "stop".to_string() });
            }
            Ok(())
        });

        assert!(result.is_err());
        assert_eq!(seen, vec!["y"]);
    }
}
