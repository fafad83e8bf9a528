//! registry — exactly-one-owner mapping from constraint index to set.
//!
//! The registry is populated during the registration pass and then drives
//! dispatch for every later phase: forward lookup answers "who owns this
//! constraint", reverse lookup yields a set's indices in registration order
//! so phase dispatch is deterministic and solve output reproducible.
use std::collections::HashMap;

use crate::resolution::errors::{ResolveError, ResolveResult};

/// ConstraintRegistry — ownership table for uncertain constraints.
///
/// Invariants
/// ----------
/// - Each registered index has exactly one owner.
/// - Reverse-lookup lists contain each index at most once, in first
///   registration order, even when the same assignment is repeated.
#[derive(Debug, Clone)]
pub struct ConstraintRegistry {
    owner: HashMap<usize, usize>,
    owned: Vec<Vec<usize>>,
}

impl ConstraintRegistry {
    /// Registry for `num_sets` sets with no assignments yet.
    pub fn new(num_sets: usize) -> Self {
        ConstraintRegistry { owner: HashMap::new(), owned: vec![Vec::new(); num_sets] }
    }

    /// Assign constraint `index` to `set`.
    ///
    /// Re-assigning the same index to the same set is tolerated as a
    /// caller-side duplicate and leaves the reverse lookup untouched, so
    /// exactly one owner is always reported.
    ///
    /// # Errors
    /// - [`ResolveError::UnknownSet`] when `set` is out of range.
    /// - [`ResolveError::OwnershipConflict`] when a different set already
    ///   owns `index`.
    pub fn assign(&mut self, index: usize, set: usize) -> ResolveResult<()> {
        if set >= self.owned.len() {
            return Err(ResolveError::UnknownSet { set, num_sets: self.owned.len() });
        }
        match self.owner.get(&index) {
            Some(&owner) if owner != set => {
                Err(ResolveError::OwnershipConflict { index, owner, claimant: set })
            }
            Some(_) => Ok(()),
            None => {
                self.owner.insert(index, set);
                self.owned[set].push(index);
                Ok(())
            }
        }
    }

    /// Owning set of `index`, when registered.
    pub fn owner(&self, index: usize) -> Option<usize> {
        self.owner.get(&index).copied()
    }

    /// Indices owned by `set`, in registration order.
    pub fn owned(&self, set: usize) -> &[usize] {
        self.owned.get(set).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn num_sets(&self) -> usize {
        self.owned.len()
    }

    /// Verify that every constraint `0..num_constraints` has an owner.
    ///
    /// Must hold before any set's setup runs.
    ///
    /// # Errors
    /// Returns [`ResolveError::UnregisteredConstraint`] for the first index
    /// without an owner.
    pub fn verify_total(&self, num_constraints: usize) -> ResolveResult<()> {
        for index in 0..num_constraints {
            if !self.owner.contains_key(&index) {
                return Err(ResolveError::UnregisteredConstraint { index });
            }
        }
        Ok(())
    }
}
