//! Uncertain constraints and set-geometry constraints.
//!
//! An [`UncertainConstraint`] bounds a [`MixedExpr`] and must hold for every
//! realization of the uncertain parameters; a [`SetConstraint`] bounds an
//! [`UncertainExpr`] with no decision variables and defines the geometry of
//! an uncertainty set. Reclassification between the two is type-checked:
//! a robustness constraint without decision-variable terms is not a
//! robustness constraint at all and must be routed as set geometry.
use crate::{
    model::expr::{MixedExpr, UncertainExpr},
    resolution::errors::{ResolveError, ResolveResult},
};

/// UncertainConstraint — a bounded mixed expression that must hold for every
/// admissible realization of the uncertain parameters.
///
/// Fields
/// ------
/// - `expr`: the constraint body `sum_i a_i(z) x_i + a_0(z)`.
/// - `lower`, `upper`: optional bounds; the owning model requires at least
///   one to be present and both to be finite when present.
#[derive(Debug, Clone)]
pub struct UncertainConstraint {
    pub expr: MixedExpr,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl UncertainConstraint {
    /// Plain constructor; bound presence and finiteness are validated by
    /// [`crate::model::robust_model::RobustModel::add_constraint`], which
    /// knows the constraint's index for error reporting.
    pub fn new(expr: MixedExpr, lower: Option<f64>, upper: Option<f64>) -> Self {
        UncertainConstraint { expr, lower, upper }
    }

    /// True when the body carries at least one active decision-variable term.
    pub fn has_decision_terms(&self) -> bool {
        self.expr.has_decision_terms()
    }

    /// Reclassify as set geometry.
    ///
    /// A constraint whose body has no active decision-variable terms only
    /// restricts the uncertain parameters; it belongs to an uncertainty set,
    /// not to the cutting-plane loop.
    ///
    /// # Errors
    /// Returns [`ResolveError::HasDecisionTerms`] when the body does carry
    /// decision-variable terms; `index` identifies the offender.
    pub fn into_set_constraint(self, index: usize) -> ResolveResult<SetConstraint> {
        if self.has_decision_terms() {
            return Err(ResolveError::HasDecisionTerms { index });
        }
        let mut expr = self.expr.constant().clone();
        // Variable terms that survived construction are entirely negligible
        // at this point; their certain parts still belong to the body.
        for (_, coeff) in self.expr.terms() {
            expr.add_scaled(coeff, 1.0);
        }
        Ok(SetConstraint { expr, lower: self.lower, upper: self.upper })
    }
}

/// SetConstraint — bounded uncertain expression defining set geometry.
///
/// Owned by an uncertainty set; never processed through the cutting-plane
/// loop.
#[derive(Debug, Clone, PartialEq)]
pub struct SetConstraint {
    pub expr: UncertainExpr,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl SetConstraint {
    pub fn new(expr: UncertainExpr, lower: Option<f64>, upper: Option<f64>) -> Self {
        SetConstraint { expr, lower, upper }
    }
}
