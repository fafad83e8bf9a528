//! robust_model — the model-side container for the resolution protocol.
//!
//! Purpose
//! -------
//! Own the uncertain-parameter table, the indexed uncertain constraints, and
//! each constraint's uncertainty-set assignment. The model is built
//! incrementally before a solve; during resolution it is read-only structure
//! that every protocol call receives explicitly.
//!
//! Key behaviors
//! -------------
//! - Validate parameter bounds at registration and constraint bounds at
//!   addition, so the resolution layer can assume well-formed inputs.
//! - Record the set assignment chosen at construction time; the orchestrator
//!   reads it during the registration pass and never re-derives it.
//!
//! Invariants & assumptions
//! ------------------------
//! - Parameter ids and constraint indices are dense, in creation order, and
//!   stable for the model's lifetime.
//! - `assignments.len() == constraints.len()` always.
//!
//! Downstream usage
//! ----------------
//! - Users build a model with `add_param` / `add_constraint`, construct
//!   their uncertainty sets, and hand everything to
//!   [`crate::resolution::orchestrator::resolve`].
use crate::{
    model::{
        constraint::UncertainConstraint,
        params::{ParamId, UncertainParam},
    },
    resolution::errors::{ResolveError, ResolveResult},
};
use ndarray::Array1;

/// RobustModel — parameter table, indexed uncertain constraints, and their
/// set assignments.
#[derive(Debug, Default)]
pub struct RobustModel {
    params: Vec<UncertainParam>,
    constraints: Vec<UncertainConstraint>,
    assignments: Vec<usize>,
}

impl RobustModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an uncertain parameter and return its id.
    ///
    /// # Errors
    /// Returns [`ResolveError::InvalidParamBounds`] for non-finite or
    /// inverted bounds.
    pub fn add_param(
        &mut self, name: impl Into<String>, lower: f64, upper: f64,
    ) -> ResolveResult<ParamId> {
        let param = UncertainParam::new(name, lower, upper)?;
        self.params.push(param);
        Ok(self.params.len() - 1)
    }

    /// Add an uncertain constraint assigned to the set at `set`, returning
    /// the constraint index.
    ///
    /// Set validity is checked at resolution time, when the set slice is
    /// known; bound shape is checked here.
    ///
    /// # Errors
    /// - [`ResolveError::MissingBounds`] when neither bound is present.
    /// - [`ResolveError::InvalidBound`] when a present bound is non-finite.
    pub fn add_constraint(
        &mut self, constraint: UncertainConstraint, set: usize,
    ) -> ResolveResult<usize> {
        let index = self.constraints.len();
        if constraint.lower.is_none() && constraint.upper.is_none() {
            return Err(ResolveError::MissingBounds { index });
        }
        for bound in [constraint.lower, constraint.upper].into_iter().flatten() {
            if !bound.is_finite() {
                return Err(ResolveError::InvalidBound { index, value: bound });
            }
        }
        self.check_param_refs(&constraint)?;
        self.constraints.push(constraint);
        self.assignments.push(set);
        Ok(index)
    }

    pub fn num_params(&self) -> usize {
        self.params.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn param(&self, id: ParamId) -> Option<&UncertainParam> {
        self.params.get(id)
    }

    pub fn params(&self) -> &[UncertainParam] {
        &self.params
    }

    pub fn constraint(&self, index: usize) -> Option<&UncertainConstraint> {
        self.constraints.get(index)
    }

    pub fn constraints(&self) -> &[UncertainConstraint] {
        &self.constraints
    }

    /// Set assignment of constraint `index`.
    pub fn assignment(&self, index: usize) -> Option<usize> {
        self.assignments.get(index).copied()
    }

    pub fn assignments(&self) -> &[usize] {
        &self.assignments
    }

    /// Nominal realization: every parameter at its interval midpoint.
    pub fn nominal(&self) -> Array1<f64> {
        Array1::from_iter(self.params.iter().map(|p| p.midpoint()))
    }

    /// Every parameter a constraint references must already be registered;
    /// later phases index model-sized vectors by these ids.
    fn check_param_refs(&self, constraint: &UncertainConstraint) -> ResolveResult<()> {
        let num_params = self.params.len();
        let check = |param: usize| {
            if param >= num_params {
                Err(ResolveError::UnknownParam { param, num_params })
            } else {
                Ok(())
            }
        };
        for (_, coeff) in constraint.expr.terms() {
            for (param, _) in coeff.terms() {
                check(param)?;
            }
        }
        for (param, _) in constraint.expr.constant().terms() {
            check(param)?;
        }
        Ok(())
    }
}
