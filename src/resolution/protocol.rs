//! protocol — the uncertainty-set lifecycle every variant implements.
//!
//! Purpose
//! -------
//! Define the four-phase-per-solve contract between the resolution
//! orchestrator and interchangeable uncertainty-set variants: register,
//! one-time setup, static reformulation, iterative cut generation, and
//! post-optimal scenario extraction.
//!
//! Key behaviors
//! -------------
//! - Variants declare, at construction, which optional phases they support
//!   via [`Capabilities`]; the orchestrator checks membership before
//!   invoking a phase, so a missing capability surfaces as a configuration
//!   error naming the variant and phase instead of an opaque runtime hole.
//! - The trait's default bodies for optional phases return the same
//!   [`ResolveError::PhaseUnsupported`] error, so a direct call on a variant
//!   that skipped a phase fails identically.
//! - Mutability encodes the sanctioned channels of the shared deterministic
//!   model: only [`UncertaintySet::reformulate`] receives `&mut` access
//!   (the direct-add channel); cut and scenario phases read the current
//!   solution and return their contributions for the orchestrator to apply.
//!
//! Invariants & assumptions
//! ------------------------
//! - Phases of one set are never invoked concurrently; sets may carry
//!   internal state built up across phases (setup products reused by every
//!   cut call).
//! - Empty returns from `reformulate`, `generate_cuts`, and
//!   `generate_scenarios` are valid non-findings, never errors.
//!
//! Downstream usage
//! ----------------
//! - `resolution::orchestrator` drives the lifecycle; `sets::interval` and
//!   `sets::budget` are the baseline implementations.
use crate::{
    model::{robust_model::RobustModel, scenario::Scenario},
    resolution::{
        deterministic::{DetConstraint, DeterministicModel},
        errors::{ResolveError, ResolveResult},
        options::SolverPrefs,
    },
};

/// One phase of the resolution protocol, used for capability checks and
/// error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Register,
    Setup,
    Reformulate,
    Cut,
    Scenario,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Phase::Register => "constraint registration",
            Phase::Setup => "set setup",
            Phase::Reformulate => "static reformulation",
            Phase::Cut => "cut generation",
            Phase::Scenario => "scenario extraction",
        };
        write!(f, "{label}")
    }
}

/// Capabilities — the optional phases a variant supports, declared at
/// construction.
///
/// Registration is mandatory for every variant and is therefore always
/// reported as supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub setup: bool,
    pub reformulate: bool,
    pub cut: bool,
    pub scenario: bool,
}

impl Capabilities {
    pub const fn new(setup: bool, reformulate: bool, cut: bool, scenario: bool) -> Self {
        Capabilities { setup, reformulate, cut, scenario }
    }

    /// Membership check used by the orchestrator before invoking a phase.
    pub fn supports(&self, phase: Phase) -> bool {
        match phase {
            Phase::Register => true,
            Phase::Setup => self.setup,
            Phase::Reformulate => self.reformulate,
            Phase::Cut => self.cut,
            Phase::Scenario => self.scenario,
        }
    }
}

/// Build the canonical unsupported-phase error for `set`.
pub fn phase_unsupported(set: &str, phase: Phase) -> ResolveError {
    ResolveError::PhaseUnsupported { set: set.to_string(), phase }
}

/// UncertaintySet — the variant-side of the resolution protocol.
///
/// Purpose
/// -------
/// An uncertainty set owns its geometry, holds responsibility for the
/// uncertain constraints registered to it, and resolves them by static
/// reformulation, cutting planes, or both. Variants implement the phases
/// they use and declare them in [`UncertaintySet::capabilities`].
///
/// Conventions
/// -----------
/// - Every phase receives the robust model explicitly; variants never reach
///   into ambient state.
/// - `prefs` is an opaque preference bag passed unchanged from the top-level
///   solve call; recognized keys are documented per variant.
pub trait UncertaintySet {
    /// Variant name used in errors and diagnostics.
    fn name(&self) -> &str;

    /// Phases this variant supports.
    fn capabilities(&self) -> Capabilities;

    /// Take ownership of the uncertain constraint at `index`.
    ///
    /// Mandatory phase. Variants reject constraints with no active
    /// decision-variable terms ([`ResolveError::NoDecisionTerms`]); such
    /// constraints restrict only the uncertain parameters and must be routed
    /// to the set as geometry instead.
    fn register_constraint(
        &mut self, model: &RobustModel, index: usize, prefs: &SolverPrefs,
    ) -> ResolveResult<()>;

    /// One-time preprocessing, called after all registrations and before any
    /// reformulation or cut request.
    ///
    /// `scenarios_requested` tells the set to prepare scenario-extraction
    /// machinery even when cutting planes are not its resolution strategy.
    fn setup(
        &mut self, _model: &RobustModel, _scenarios_requested: bool, _prefs: &SolverPrefs,
    ) -> ResolveResult<()> {
        Err(phase_unsupported(self.name(), Phase::Setup))
    }

    /// Statically reformulate some subset of `indices`, adding equivalent
    /// deterministic constraints and variables directly to `det`.
    ///
    /// Returns the indices fully reformulated; those leave iterative
    /// handling. Indices not returned remain candidates for cutting planes.
    /// Returning an empty list is a valid non-finding.
    fn reformulate(
        &mut self, _det: &mut dyn DeterministicModel, _model: &RobustModel, _indices: &[usize],
    ) -> ResolveResult<Vec<usize>> {
        Err(phase_unsupported(self.name(), Phase::Reformulate))
    }

    /// Generate cuts against the current deterministic solution.
    ///
    /// Returns constraints that cut off the current point exactly when it
    /// violates a true uncertain constraint among `indices`; an empty return
    /// is this set's termination signal for the round.
    fn generate_cuts(
        &mut self, _det: &dyn DeterministicModel, _model: &RobustModel, _indices: &[usize],
    ) -> ResolveResult<Vec<DetConstraint>> {
        Err(phase_unsupported(self.name(), Phase::Cut))
    }

    /// Extract worst-case scenarios at a confirmed optimum.
    ///
    /// Returns one entry per requested index; `None` when the set cannot
    /// produce a scenario for that constraint. Ties may be broken
    /// arbitrarily.
    fn generate_scenarios(
        &mut self, _det: &dyn DeterministicModel, _model: &RobustModel, _indices: &[usize],
    ) -> ResolveResult<Vec<(usize, Option<Scenario>)>> {
        Err(phase_unsupported(self.name(), Phase::Scenario))
    }
}
