//! expr — sparse linear expressions over uncertain parameters and variables.
//!
//! Purpose
//! -------
//! Provide the two expression carriers of the robust-constraint layer:
//! [`UncertainExpr`], a sparse linear combination of uncertain parameters
//! with a scalar constant, and [`MixedExpr`], a sparse linear combination of
//! decision variables whose coefficients are themselves [`UncertainExpr`]s.
//!
//! Key behaviors
//! -------------
//! - Keep coefficients logically deduplicated under incremental
//!   construction: `add_term` sums into an existing slot instead of storing
//!   a second entry for the same key.
//! - Substitute one side of a mixed expression and re-collect like terms on
//!   the other: [`MixedExpr::fix_params`] fixes a parameter realization and
//!   yields deterministic variable terms; [`MixedExpr::param_profile`] fixes
//!   a decision-variable solution and yields the induced parameter profile,
//!   consolidated through a borrowed [`TermAccumulator`].
//! - Classify expressions with the same epsilon the accumulator enumerates
//!   with: a term whose coefficient magnitude stays below
//!   [`TERM_EPSILON`] does not count as present.
//!
//! Invariants & assumptions
//! ------------------------
//! - Evaluation methods take realizations/solutions spanning the relevant
//!   id range (a model-sized `ArrayView1`); this is internal protocol
//!   plumbing, and callers obtain such vectors from the owning model or the
//!   deterministic collaborator.
//! - Expressions are plain data: no I/O, no logging, no panics on
//!   user-supplied coefficient values (non-finite coefficients are rejected
//!   where expressions meet validated boundaries, not here).
//!
//! Downstream usage
//! ----------------
//! - `model::robust_model` stores [`MixedExpr`]s inside uncertain
//!   constraints; concrete uncertainty sets call the substitution methods
//!   when building cuts, reformulations, and scenarios.
//! - `model::display` renders both carriers through the shared accumulator.
use std::collections::HashMap;

use crate::{
    model::params::ParamId,
    resolution::accumulator::{TERM_EPSILON, TermAccumulator},
};
use ndarray::ArrayView1;

/// Handle of a decision variable owned by the deterministic collaborator.
pub type VarId = usize;

/// UncertainExpr — sparse linear expression in the uncertain parameters.
///
/// Purpose
/// -------
/// Represent `sum_j c_j z_j + k` for uncertain parameters `z_j`, with at
/// most one logical entry per parameter.
///
/// Fields
/// ------
/// - `terms`: parameter id to accumulated coefficient.
/// - `constant`: the scalar `k`.
///
/// Invariants
/// ----------
/// - One map entry per parameter id; `add_term` accumulates rather than
///   overwrites, so repeated incremental additions never create duplicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UncertainExpr {
    terms: HashMap<ParamId, f64>,
    constant: f64,
}

impl UncertainExpr {
    /// Empty expression (no terms, zero constant).
    pub fn new() -> Self {
        Self::default()
    }

    /// Expression holding only a constant.
    pub fn from_constant(constant: f64) -> Self {
        UncertainExpr { terms: HashMap::new(), constant }
    }

    /// Builder-style term addition, accumulating like [`UncertainExpr::add_term`].
    pub fn with_term(mut self, param: ParamId, coeff: f64) -> Self {
        self.add_term(param, coeff);
        self
    }

    /// Accumulate `coeff` onto the entry for `param`.
    pub fn add_term(&mut self, param: ParamId, coeff: f64) {
        *self.terms.entry(param).or_insert(0.0) += coeff;
    }

    /// Accumulate onto the scalar constant.
    pub fn add_constant(&mut self, value: f64) {
        self.constant += value;
    }

    /// Accumulate `scale * other` into this expression, term by term.
    pub fn add_scaled(&mut self, other: &UncertainExpr, scale: f64) {
        for (&param, &coeff) in &other.terms {
            self.add_term(param, scale * coeff);
        }
        self.constant += scale * other.constant;
    }

    /// The scalar constant `k`.
    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Coefficient stored for `param`, zero when absent.
    pub fn coeff(&self, param: ParamId) -> f64 {
        self.terms.get(&param).copied().unwrap_or(0.0)
    }

    /// Raw term iteration in arbitrary map order; may include negligible
    /// entries. Use [`UncertainExpr::sorted_terms`] for canonical output.
    pub fn terms(&self) -> impl Iterator<Item = (ParamId, f64)> + '_ {
        self.terms.iter().map(|(&p, &c)| (p, c))
    }

    /// Active terms sorted by parameter id.
    pub fn sorted_terms(&self) -> Vec<(ParamId, f64)> {
        let mut out: Vec<(ParamId, f64)> =
            self.terms().filter(|&(_, c)| c.abs() >= TERM_EPSILON).collect();
        out.sort_unstable_by_key(|&(p, _)| p);
        out
    }

    /// True when no parameter term is active; the expression is then a plain
    /// scalar for every realization.
    pub fn is_certain(&self) -> bool {
        self.terms.values().all(|c| c.abs() < TERM_EPSILON)
    }

    /// Evaluate at a realization `z` spanning the parameter table.
    pub fn value_at(&self, z: &ArrayView1<'_, f64>) -> f64 {
        let mut value = self.constant;
        for (&param, &coeff) in &self.terms {
            value += coeff * z[param];
        }
        value
    }
}

/// MixedExpr — decision-variable expression with uncertain coefficients.
///
/// Purpose
/// -------
/// Represent `sum_i a_i(z) x_i + a_0(z)` where every coefficient `a_i` and
/// the constant `a_0` are [`UncertainExpr`]s in the uncertain parameters.
/// This is the body of an uncertain constraint.
///
/// Fields
/// ------
/// - `terms`: decision-variable id to its coefficient expression.
/// - `constant`: the constant coefficient expression `a_0(z)`.
///
/// Invariants
/// ----------
/// - One entry per decision-variable id; `add_term` merges coefficient
///   expressions additively.
#[derive(Debug, Clone, Default)]
pub struct MixedExpr {
    terms: HashMap<VarId, UncertainExpr>,
    constant: UncertainExpr,
}

impl MixedExpr {
    /// Empty expression.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `coeff` additively onto the coefficient expression of `var`.
    pub fn add_term(&mut self, var: VarId, coeff: UncertainExpr) {
        self.terms.entry(var).or_default().add_scaled(&coeff, 1.0);
    }

    /// Add a certain (parameter-free) coefficient for `var`.
    pub fn add_var(&mut self, var: VarId, coeff: f64) {
        self.add_term(var, UncertainExpr::from_constant(coeff));
    }

    /// Accumulate an expression onto the constant part `a_0(z)`.
    pub fn add_constant_expr(&mut self, expr: &UncertainExpr) {
        self.constant.add_scaled(expr, 1.0);
    }

    /// The constant coefficient expression `a_0(z)`.
    pub fn constant(&self) -> &UncertainExpr {
        &self.constant
    }

    /// Iterate decision-variable terms in arbitrary map order.
    pub fn terms(&self) -> impl Iterator<Item = (VarId, &UncertainExpr)> + '_ {
        self.terms.iter().map(|(&v, e)| (v, e))
    }

    /// Decision-variable terms with an active coefficient expression,
    /// sorted by variable id.
    pub fn sorted_terms(&self) -> Vec<(VarId, &UncertainExpr)> {
        let mut out: Vec<(VarId, &UncertainExpr)> = self
            .terms()
            .filter(|(_, e)| !e.is_certain() || e.constant().abs() >= TERM_EPSILON)
            .collect();
        out.sort_unstable_by_key(|&(v, _)| v);
        out
    }

    /// True when at least one decision variable carries a coefficient
    /// expression that is not entirely negligible.
    ///
    /// A variable whose coefficient expression has neither active parameter
    /// terms nor a non-negligible constant contributes nothing for any
    /// realization and does not count as a decision term.
    pub fn has_decision_terms(&self) -> bool {
        self.terms
            .values()
            .any(|e| !e.is_certain() || e.constant().abs() >= TERM_EPSILON)
    }

    /// Substitute a parameter realization `z`, producing deterministic
    /// variable terms and the realized constant.
    ///
    /// Returns
    /// -------
    /// `(terms, constant)` where `terms` holds one `(variable, value)` pair
    /// per variable whose realized coefficient is non-negligible, and
    /// `constant` is `a_0(z)`.
    pub fn fix_params(&self, z: &ArrayView1<'_, f64>) -> (Vec<(VarId, f64)>, f64) {
        let mut terms: Vec<(VarId, f64)> = Vec::with_capacity(self.terms.len());
        for (&var, expr) in &self.terms {
            let coeff = expr.value_at(z);
            if coeff.abs() >= TERM_EPSILON {
                terms.push((var, coeff));
            }
        }
        terms.sort_unstable_by_key(|&(v, _)| v);
        (terms, self.constant.value_at(z))
    }

    /// Substitute a decision-variable solution `x`, producing the induced
    /// parameter profile `sum_j d_j z_j + d_0`.
    ///
    /// Like terms are re-collected through `acc`: the same parameter may
    /// appear in several coefficient expressions and in the constant, and
    /// each occurrence contributes `x_i`-scaled mass to one slot. The
    /// accumulator is reset on entry and left populated on return.
    pub fn param_profile(&self, x: &ArrayView1<'_, f64>, acc: &mut TermAccumulator) -> UncertainExpr {
        acc.reset();
        let mut certain = self.constant.constant();
        for (&var, expr) in &self.terms {
            let weight = x[var];
            for (param, coeff) in expr.terms() {
                acc.add(param, coeff * weight);
            }
            certain += expr.constant() * weight;
        }
        for (param, coeff) in self.constant.terms() {
            acc.add(param, coeff);
        }
        let mut profile = UncertainExpr::from_constant(certain);
        for (param, coeff) in acc.active() {
            profile.add_term(param, coeff);
        }
        profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Logical deduplication under incremental term addition.
    // - Epsilon-aware decision-term classification.
    // - Substitution in both directions (fix_params / param_profile) with
    //   like-term re-collection through the accumulator.
    //
    // They intentionally DO NOT cover:
    // - Rendering (model::display) or constraint classification
    //   (model::constraint).
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify that repeated `add_term` calls for the same parameter keep a
    // single logical entry with the accumulated coefficient.
    //
    // Given
    // -----
    // - Terms (0, 1.0), (0, 2.5), (3, -1.0).
    //
    // Expect
    // ------
    // - `sorted_terms` reports exactly [(0, 3.5), (3, -1.0)].
    fn uncertain_expr_deduplicates_incremental_terms() {
        // Arrange
        let mut e = UncertainExpr::new();

        // Act
        e.add_term(0, 1.0);
        e.add_term(0, 2.5);
        e.add_term(3, -1.0);

        // Assert
        assert_eq!(e.sorted_terms(), vec![(0, 3.5), (3, -1.0)]);
    }

    #[test]
    // Purpose
    // -------
    // Verify that terms cancelling to zero vanish from canonical output and
    // from the certainty check.
    //
    // Given
    // -----
    // - Terms (1, 2.0) and (1, -2.0), constant 4.0.
    //
    // Expect
    // ------
    // - `sorted_terms` is empty and the expression is certain.
    fn uncertain_expr_treats_cancelled_terms_as_absent() {
        // Arrange
        let mut e = UncertainExpr::from_constant(4.0);

        // Act
        e.add_term(1, 2.0);
        e.add_term(1, -2.0);

        // Assert
        assert!(e.sorted_terms().is_empty());
        assert!(e.is_certain());
        assert_eq!(e.constant(), 4.0);
    }

    #[test]
    // Purpose
    // -------
    // Verify evaluation of an uncertain expression at a realization.
    //
    // Given
    // -----
    // - Expression 2 z0 - z2 + 1.5 and realization z = [1, 9, 4].
    //
    // Expect
    // ------
    // - Value 2*1 - 4 + 1.5 = -0.5.
    fn uncertain_expr_value_at_realization() {
        // Arrange
        let e = UncertainExpr::from_constant(1.5).with_term(0, 2.0).with_term(2, -1.0);
        let z = array![1.0, 9.0, 4.0];

        // Act / Assert
        assert!((e.value_at(&z.view()) - (-0.5)).abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Verify that a variable whose coefficient expression is entirely
    // negligible does not count as a decision term.
    //
    // Given
    // -----
    // - A mixed expression with variable 0 carrying a cancelled coefficient
    //   expression and an uncertain constant part.
    //
    // Expect
    // ------
    // - `has_decision_terms` is false.
    fn mixed_expr_ignores_negligible_decision_terms() {
        // Arrange
        let mut cancelled = UncertainExpr::new();
        cancelled.add_term(0, 1.0);
        cancelled.add_term(0, -1.0);

        let mut m = MixedExpr::new();
        m.add_term(0, cancelled);
        m.add_constant_expr(&UncertainExpr::new().with_term(1, 3.0));

        // Assert
        assert!(!m.has_decision_terms());
    }

    #[test]
    // Purpose
    // -------
    // Verify parameter substitution: fixing a realization turns the mixed
    // expression into deterministic variable terms plus a constant.
    //
    // Given
    // -----
    // - Expression (1 + z0) x0 + 2 x1 + (z1 - 1), realization z = [3, 5].
    //
    // Expect
    // ------
    // - Terms [(0, 4.0), (1, 2.0)] and constant 4.0.
    fn mixed_expr_fix_params_substitutes_realization() {
        // Arrange
        let mut m = MixedExpr::new();
        m.add_term(0, UncertainExpr::from_constant(1.0).with_term(0, 1.0));
        m.add_var(1, 2.0);
        m.add_constant_expr(&UncertainExpr::from_constant(-1.0).with_term(1, 1.0));
        let z = array![3.0, 5.0];

        // Act
        let (terms, constant) = m.fix_params(&z.view());

        // Assert
        assert_eq!(terms, vec![(0, 4.0), (1, 2.0)]);
        assert!((constant - 4.0).abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Verify solution substitution: fixing x re-collects like terms per
    // parameter across several coefficient expressions and the constant.
    //
    // Given
    // -----
    // - Expression (z0 + 1) x0 + (2 z0 + z1) x1 + z0, solution x = [2, 3].
    //
    // Expect
    // ------
    // - Profile 9 z0 + 3 z1 + 2: z0 collects 1*2 + 2*3 + 1 = 9 across three
    //   occurrences, z1 collects 3, and the certain part is 1*2.
    fn mixed_expr_param_profile_recollects_like_terms() {
        // Arrange
        let mut m = MixedExpr::new();
        m.add_term(0, UncertainExpr::from_constant(1.0).with_term(0, 1.0));
        m.add_term(1, UncertainExpr::new().with_term(0, 2.0).with_term(1, 1.0));
        m.add_constant_expr(&UncertainExpr::new().with_term(0, 1.0));
        let x = array![2.0, 3.0];
        let mut acc = TermAccumulator::new();

        // Act
        let profile = m.param_profile(&x.view(), &mut acc);

        // Assert
        assert_eq!(profile.sorted_terms(), vec![(0, 9.0), (1, 3.0)]);
        assert!((profile.constant() - 2.0).abs() < 1e-12);
    }
}
