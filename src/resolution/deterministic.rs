//! deterministic — the collaborator seam to the deterministic solver.
//!
//! The deterministic optimization model lives outside this core; the crate
//! talks to it through [`DeterministicModel`], a narrow synchronous trait:
//! accept typed bounded linear constraints and new variables, solve, expose
//! a status and the current solution values. Backend errors never leak raw;
//! implementations map them into [`crate::resolution::errors::ResolveError`].
use crate::{
    model::expr::VarId,
    resolution::{errors::ResolveResult, options::SolverPrefs},
};
use ndarray::ArrayView1;

/// Terminal outcome of one deterministic solve.
///
/// Anything other than `Optimal` terminates the resolution loop; the
/// orchestrator propagates it unmasked and never retries.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
    Failure(String),
}

impl std::fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "optimal"),
            SolveStatus::Infeasible => write!(f, "infeasible"),
            SolveStatus::Unbounded => write!(f, "unbounded"),
            SolveStatus::Failure(text) => write!(f, "solver failure: {text}"),
        }
    }
}

/// DetConstraint — a bounded linear inequality over decision variables.
///
/// This is the only currency in which uncertainty sets contribute to the
/// deterministic model: reformulations add them directly, cut rounds return
/// them for the orchestrator to add.
#[derive(Debug, Clone, PartialEq)]
pub struct DetConstraint {
    pub terms: Vec<(VarId, f64)>,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl DetConstraint {
    pub fn new(terms: Vec<(VarId, f64)>, lower: Option<f64>, upper: Option<f64>) -> Self {
        DetConstraint { terms, lower, upper }
    }

    /// `terms <= upper`
    pub fn less_eq(terms: Vec<(VarId, f64)>, upper: f64) -> Self {
        DetConstraint { terms, lower: None, upper: Some(upper) }
    }

    /// `terms >= lower`
    pub fn greater_eq(terms: Vec<(VarId, f64)>, lower: f64) -> Self {
        DetConstraint { terms, lower: Some(lower), upper: None }
    }
}

/// DeterministicModel — synchronous collaborator owning decision variables
/// and the master problem.
///
/// Conventions
/// -----------
/// - `solve` is a blocking call with a success/failure outcome; iteration
///   and time budgets of the backend are configured through the opaque
///   `prefs` bag.
/// - `values` exposes the current solution snapshot, indexed by [`VarId`];
///   it is `None` before the first successful solve.
pub trait DeterministicModel {
    /// Create a new decision variable with the given bounds and return its id.
    fn add_variable(&mut self, lower: f64, upper: f64) -> VarId;

    /// Add a bounded linear constraint.
    fn add_constraint(&mut self, constraint: DetConstraint) -> ResolveResult<()>;

    /// Solve the current model.
    fn solve(&mut self, prefs: &SolverPrefs) -> ResolveResult<SolveStatus>;

    /// Number of decision variables currently in the model.
    fn num_variables(&self) -> usize;

    /// Current solution values, indexed by variable id.
    fn values(&self) -> Option<ArrayView1<'_, f64>>;
}
