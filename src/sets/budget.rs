//! budget — uncertainty set bounding the count of parameters at extremes.
//!
//! Purpose
//! -------
//! Resolve uncertain constraints against the budgeted box: every parameter
//! stays inside its declared interval, but at most `budget` of them may sit
//! at an interval end; the rest hold their nominal midpoint. The variant
//! resolves by cutting planes and extracts worst-case scenarios; it declares
//! no reformulation capability, so its constraints always travel through
//! the iterative loop.
//!
//! Key behaviors
//! -------------
//! - The adversary's worst case deviates the `budget` parameters with the
//!   largest impact `|d_j| * h_j` (profile coefficient times half width),
//!   each toward the end matching the profile sign; ties break toward the
//!   smaller parameter id so solves are reproducible.
//! - A `budget` of zero pins every parameter at its nominal value, reducing
//!   the set to a deterministic sanity check of the nominal constraint.
//!
//! Recognized preferences
//! ----------------------
//! - `cut_tol`: overrides the violation tolerance (default `1e-6`).
use crate::{
    model::{expr::UncertainExpr, robust_model::RobustModel, scenario::Scenario},
    resolution::{
        accumulator::{TERM_EPSILON, TermAccumulator},
        deterministic::{DetConstraint, DeterministicModel},
        errors::{ResolveError, ResolveResult},
        options::{DEFAULT_CUT_TOL, SolverPrefs, parse_cut_tol},
        protocol::{Capabilities, UncertaintySet},
    },
};
use ndarray::Array1;

/// BudgetSet — budgeted-deviation uncertainty set.
///
/// Fields
/// ------
/// - `budget`: maximum number of parameters allowed at an interval end.
/// - `cut_tol`: violation tolerance below which no cut is emitted.
/// - `acc`: owned accumulator scratch, reset per constraint.
#[derive(Debug)]
pub struct BudgetSet {
    budget: usize,
    cut_tol: f64,
    acc: TermAccumulator,
}

impl BudgetSet {
    pub fn new(budget: usize) -> Self {
        BudgetSet { budget, cut_tol: DEFAULT_CUT_TOL, acc: TermAccumulator::new() }
    }

    /// Override the violation tolerance.
    ///
    /// # Errors
    /// Returns [`ResolveError::InvalidCutTol`] for non-finite or
    /// non-positive tolerances.
    pub fn with_cut_tol(mut self, cut_tol: f64) -> ResolveResult<Self> {
        if !cut_tol.is_finite() {
            return Err(ResolveError::InvalidCutTol {
                tol: cut_tol,
                reason: "Tolerance must be finite.",
            });
        }
        if cut_tol <= 0.0 {
            return Err(ResolveError::InvalidCutTol {
                tol: cut_tol,
                reason: "Tolerance must be positive.",
            });
        }
        self.cut_tol = cut_tol;
        Ok(self)
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Budget-feasible realization extremizing `profile` over the declared
    /// intervals.
    fn extreme(
        &self, model: &RobustModel, profile: &UncertainExpr, maximize: bool,
    ) -> ResolveResult<Array1<f64>> {
        let mut z = model.nominal();
        // Impact of deviating each active parameter, largest first; ties
        // break toward the smaller id.
        let mut impacts: Vec<(f64, usize, f64)> = Vec::new();
        for (param, d) in profile.sorted_terms() {
            let decl = model
                .param(param)
                .ok_or(ResolveError::UnknownParam { param, num_params: model.num_params() })?;
            let impact = d.abs() * decl.half_width();
            if impact >= TERM_EPSILON {
                impacts.push((impact, param, d));
            }
        }
        impacts.sort_by(|a, b| {
            b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal).then(a.1.cmp(&b.1))
        });
        for &(_, param, d) in impacts.iter().take(self.budget) {
            let decl = model
                .param(param)
                .ok_or(ResolveError::UnknownParam { param, num_params: model.num_params() })?;
            z[param] = if (d >= 0.0) == maximize { decl.upper } else { decl.lower };
        }
        Ok(z)
    }
}

impl UncertaintySet for BudgetSet {
    fn name(&self) -> &str {
        "BudgetSet"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::new(true, false, true, true)
    }

    fn register_constraint(
        &mut self, model: &RobustModel, index: usize, _prefs: &SolverPrefs,
    ) -> ResolveResult<()> {
        let constraint =
            model.constraint(index).ok_or(ResolveError::UnregisteredConstraint { index })?;
        if !constraint.has_decision_terms() {
            return Err(ResolveError::NoDecisionTerms { index });
        }
        Ok(())
    }

    fn setup(
        &mut self, _model: &RobustModel, _scenarios_requested: bool, prefs: &SolverPrefs,
    ) -> ResolveResult<()> {
        // Cuts and scenarios both read the declared intervals directly, so
        // setup only resolves preferences.
        self.cut_tol = parse_cut_tol(prefs, self.cut_tol)?;
        Ok(())
    }

    fn generate_cuts(
        &mut self, det: &dyn DeterministicModel, model: &RobustModel, indices: &[usize],
    ) -> ResolveResult<Vec<DetConstraint>> {
        let x = det.values().ok_or(ResolveError::MissingSolutionValue)?;
        let mut cuts = Vec::new();
        for &index in indices {
            let constraint =
                model.constraint(index).ok_or(ResolveError::UnregisteredConstraint { index })?;
            let profile = constraint.expr.param_profile(&x, &mut self.acc);
            if let Some(upper) = constraint.upper {
                let z = self.extreme(model, &profile, true)?;
                if profile.value_at(&z.view()) > upper + self.cut_tol {
                    let (terms, shift) = constraint.expr.fix_params(&z.view());
                    cuts.push(DetConstraint::less_eq(terms, upper - shift));
                }
            }
            if let Some(lower) = constraint.lower {
                let z = self.extreme(model, &profile, false)?;
                if profile.value_at(&z.view()) < lower - self.cut_tol {
                    let (terms, shift) = constraint.expr.fix_params(&z.view());
                    cuts.push(DetConstraint::greater_eq(terms, lower - shift));
                }
            }
        }
        Ok(cuts)
    }

    fn generate_scenarios(
        &mut self, det: &dyn DeterministicModel, model: &RobustModel, indices: &[usize],
    ) -> ResolveResult<Vec<(usize, Option<Scenario>)>> {
        let x = det.values().ok_or(ResolveError::MissingSolutionValue)?;
        let mut out = Vec::with_capacity(indices.len());
        for &index in indices {
            let constraint =
                model.constraint(index).ok_or(ResolveError::UnregisteredConstraint { index })?;
            let profile = constraint.expr.param_profile(&x, &mut self.acc);
            let realization = match (constraint.lower, constraint.upper) {
                (None, Some(_)) => Some(self.extreme(model, &profile, true)?),
                (Some(_), None) => Some(self.extreme(model, &profile, false)?),
                (Some(lower), Some(upper)) => {
                    let z_max = self.extreme(model, &profile, true)?;
                    let z_min = self.extreme(model, &profile, false)?;
                    let slack_up = upper - profile.value_at(&z_max.view());
                    let slack_lo = profile.value_at(&z_min.view()) - lower;
                    Some(if slack_up <= slack_lo { z_max } else { z_min })
                }
                (None, None) => None,
            };
            match realization {
                Some(z) => out.push((index, Some(Scenario::new(z)?))),
                None => out.push((index, None)),
            }
        }
        Ok(out)
    }
}
