//! interval — baseline uncertainty set with per-parameter interval geometry.
//!
//! Purpose
//! -------
//! Resolve uncertain constraints against the box `z_j in [lo_j, up_j]`,
//! where the intervals start from the declared parameter bounds and may be
//! tightened by single-parameter set constraints. The variant supports the
//! whole protocol: exact static reformulation, sign-rule cutting planes,
//! and worst-case scenario extraction.
//!
//! Key behaviors
//! -------------
//! - Reformulation: for each constraint, the worst case over the box is
//!   `nominal(x) + sum_j h_j |d_j(x)|`, where `d_j(x)` is the affine
//!   parameter-`j` profile of the body and `h_j` the interval half width.
//!   Each `|d_j|` is linearized with one auxiliary variable `t_j >= +-d_j`,
//!   and the worst case becomes one deterministic constraint per bound.
//!   The same auxiliaries serve the lower-bound side with `-h_j t_j`.
//! - Cuts: at the current solution, the extreme realization sets each
//!   parameter to the interval end matching the sign of its profile
//!   coefficient; a cut is emitted only when the extreme value violates the
//!   bound by more than the cut tolerance.
//! - Scenarios: the same extreme realization at the optimum; for a range
//!   constraint the side with the smaller slack wins.
//!
//! Invariants & assumptions
//! ------------------------
//! - `setup` runs before any reformulation or cut request and builds the
//!   effective interval table; phases after setup index it by parameter id,
//!   which the owning model validated at constraint addition.
//! - A parameter with zero interval width never receives an auxiliary
//!   variable; the nominal substitution already carries its contribution.
//!
//! Recognized preferences
//! ----------------------
//! - `cut_tol`: overrides the violation tolerance (default `1e-6`).
use std::collections::BTreeMap;

use crate::{
    model::{
        constraint::{SetConstraint, UncertainConstraint},
        expr::{UncertainExpr, VarId},
        params::ParamId,
        robust_model::RobustModel,
        scenario::Scenario,
    },
    resolution::{
        accumulator::{TERM_EPSILON, TermAccumulator},
        deterministic::{DetConstraint, DeterministicModel},
        errors::{ResolveError, ResolveResult},
        options::{DEFAULT_CUT_TOL, SolverPrefs, parse_cut_tol},
        protocol::{Capabilities, UncertaintySet},
    },
};
use ndarray::Array1;

/// IntervalSet — interval-geometry uncertainty set.
///
/// Fields
/// ------
/// - `prefer_cuts`: when true, `reformulate` declines every index and the
///   constraints resolve through the cutting-plane loop instead.
/// - `cut_tol`: violation tolerance below which no cut is emitted.
/// - `set_constraints`: single-parameter geometry tightenings, folded into
///   the effective intervals during setup.
/// - `bounds`: effective `[lo, up]` per parameter, valid after setup.
/// - `acc`: owned accumulator scratch, reset per constraint.
#[derive(Debug, Default)]
pub struct IntervalSet {
    prefer_cuts: bool,
    cut_tol: f64,
    set_constraints: Vec<SetConstraint>,
    bounds: Vec<(f64, f64)>,
    acc: TermAccumulator,
}

impl IntervalSet {
    pub fn new() -> Self {
        IntervalSet { cut_tol: DEFAULT_CUT_TOL, ..Default::default() }
    }

    /// Resolve by cutting planes even where reformulation is possible.
    pub fn with_prefer_cuts(mut self, prefer_cuts: bool) -> Self {
        self.prefer_cuts = prefer_cuts;
        self
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

    /// Own a geometry constraint; folded into the effective intervals at
    /// setup time.
    pub fn add_set_constraint(&mut self, constraint: SetConstraint) {
        self.set_constraints.push(constraint);
    }

    /// Effective interval of `param` after setup.
    pub fn interval(&self, param: ParamId) -> Option<(f64, f64)> {
        self.bounds.get(param).copied()
    }

    /// Nominal realization over the effective intervals.
    fn nominal(&self) -> Array1<f64> {
        Array1::from_iter(self.bounds.iter().map(|&(lo, up)| 0.5 * (lo + up)))
    }

    /// Extreme realization for `profile` over the effective intervals.
    ///
    /// Maximizing sends each parameter with an active profile coefficient to
    /// the interval end matching the coefficient's sign; minimizing flips
    /// the rule. Parameters outside the profile stay nominal. Assumes the
    /// interval table spans every profile parameter (guaranteed by
    /// model-side reference validation plus setup ordering).
    fn extreme(&self, profile: &UncertainExpr, maximize: bool) -> Array1<f64> {
        let mut z = self.nominal();
        for (param, d) in profile.sorted_terms() {
            let (lo, up) = self.bounds[param];
            z[param] = if (d >= 0.0) == maximize { up } else { lo };
        }
        z
    }

    /// Fold one single-parameter set constraint into the interval table.
    fn tighten(&mut self, constraint: &SetConstraint) -> ResolveResult<()> {
        let active = constraint.expr.sorted_terms();
        let (param, coeff) = match active.as_slice() {
            [] => {
                return Err(ResolveError::UnsupportedSetConstraint {
                    set: self.name().to_string(),
                    reason: "set constraint has no uncertain-parameter terms",
                });
            }
            &[(param, coeff)] => (param, coeff),
            _ => {
                return Err(ResolveError::UnsupportedSetConstraint {
                    set: self.name().to_string(),
                    reason: "only single-parameter set constraints are supported",
                });
            }
        };
        let Some(&(mut lo, mut up)) = self.bounds.get(param) else {
            return Err(ResolveError::UnknownParam { param, num_params: self.bounds.len() });
        };
        let shift = constraint.expr.constant();
        if let Some(bound) = constraint.upper {
            let limit = (bound - shift) / coeff;
            if coeff > 0.0 { up = up.min(limit) } else { lo = lo.max(limit) }
        }
        if let Some(bound) = constraint.lower {
            let limit = (bound - shift) / coeff;
            if coeff > 0.0 { lo = lo.max(limit) } else { up = up.min(limit) }
        }
        if lo > up {
            return Err(ResolveError::EmptyParamInterval { param, lower: lo, upper: up });
        }
        self.bounds[param] = (lo, up);
        Ok(())
    }

    /// Add the exact deterministic equivalent of one interval-robust
    /// constraint to `det`.
    fn reformulate_one(
        &mut self, det: &mut dyn DeterministicModel, constraint: &UncertainConstraint,
    ) -> ResolveResult<()> {
        let nominal = self.nominal();
        let (base_terms, base_const) = constraint.expr.fix_params(&nominal.view());

        // Parameter-major affine profiles d_j(x) = sum_i a_ij x_i + c_j.
        let mut affine: BTreeMap<ParamId, (Vec<(VarId, f64)>, f64)> = BTreeMap::new();
        for (var, coeff) in constraint.expr.terms() {
            for (param, a) in coeff.terms() {
                if a.abs() >= TERM_EPSILON {
                    affine.entry(param).or_insert_with(|| (Vec::new(), 0.0)).0.push((var, a));
                }
            }
        }
        for (param, a) in constraint.expr.constant().terms() {
            if a.abs() >= TERM_EPSILON {
                affine.entry(param).or_insert_with(|| (Vec::new(), 0.0)).1 += a;
            }
        }

        // One auxiliary t_j >= |d_j(x)| per parameter with positive width.
        let mut spread_terms: Vec<(VarId, f64)> = Vec::with_capacity(affine.len());
        for (&param, (vars, shift)) in &affine {
            let Some(&(lo, up)) = self.bounds.get(param) else {
                return Err(ResolveError::UnknownParam { param, num_params: self.bounds.len() });
            };
            let half_width = 0.5 * (up - lo);
            if half_width < TERM_EPSILON {
                continue;
            }
            let t = det.add_variable(0.0, f64::INFINITY);
            let mut above = vec![(t, 1.0)];
            above.extend(vars.iter().map(|&(var, a)| (var, -a)));
            det.add_constraint(DetConstraint::greater_eq(above, *shift))?;
            let mut below = vec![(t, 1.0)];
            below.extend(vars.iter().copied());
            det.add_constraint(DetConstraint::greater_eq(below, -*shift))?;
            spread_terms.push((t, half_width));
        }

        if let Some(upper) = constraint.upper {
            let mut terms = base_terms.clone();
            terms.extend(spread_terms.iter().copied());
            det.add_constraint(DetConstraint::less_eq(terms, upper - base_const))?;
        }
        if let Some(lower) = constraint.lower {
            let mut terms = base_terms;
            terms.extend(spread_terms.iter().map(|&(t, h)| (t, -h)));
            det.add_constraint(DetConstraint::greater_eq(terms, lower - base_const))?;
        }
        Ok(())
    }
}

impl UncertaintySet for IntervalSet {
    fn name(&self) -> &str {
        "IntervalSet"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::new(true, true, true, true)
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
        &mut self, model: &RobustModel, _scenarios_requested: bool, prefs: &SolverPrefs,
    ) -> ResolveResult<()> {
        // Scenario extraction needs nothing beyond the interval table, so
        // the scenarios flag carries no extra preparation here.
        self.cut_tol = parse_cut_tol(prefs, self.cut_tol)?;
        self.bounds = model.params().iter().map(|p| (p.lower, p.upper)).collect();
        let folded = std::mem::take(&mut self.set_constraints);
        for constraint in &folded {
            self.tighten(constraint)?;
        }
        self.set_constraints = folded;
        Ok(())
    }

    fn reformulate(
        &mut self, det: &mut dyn DeterministicModel, model: &RobustModel, indices: &[usize],
    ) -> ResolveResult<Vec<usize>> {
        if self.prefer_cuts {
            return Ok(Vec::new());
        }
        for &index in indices {
            let constraint =
                model.constraint(index).ok_or(ResolveError::UnregisteredConstraint { index })?;
            self.reformulate_one(det, constraint)?;
        }
        Ok(indices.to_vec())
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
                let z = self.extreme(&profile, true);
                if profile.value_at(&z.view()) > upper + self.cut_tol {
                    let (terms, shift) = constraint.expr.fix_params(&z.view());
                    cuts.push(DetConstraint::less_eq(terms, upper - shift));
                }
            }
            if let Some(lower) = constraint.lower {
                let z = self.extreme(&profile, false);
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
                (None, Some(_)) => Some(self.extreme(&profile, true)),
                (Some(_), None) => Some(self.extreme(&profile, false)),
                (Some(lower), Some(upper)) => {
                    let z_max = self.extreme(&profile, true);
                    let z_min = self.extreme(&profile, false);
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
