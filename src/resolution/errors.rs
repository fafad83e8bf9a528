use crate::resolution::protocol::Phase;

/// Crate-wide result alias for resolution operations.
pub type ResolveResult<T> = Result<T, ResolveError>;

#[derive(Debug, Clone, PartialEq)]
pub enum ResolveError {
    // ---- Protocol ----
    /// The variant does not support the requested protocol phase.
    PhaseUnsupported {
        set: String,
        phase: Phase,
    },

    /// Constraint index already owned by a different set.
    OwnershipConflict {
        index: usize,
        owner: usize,
        claimant: usize,
    },

    /// Set index outside the registered set table.
    UnknownSet {
        set: usize,
        num_sets: usize,
    },

    /// Constraint index with no registered owner, or unknown to the model.
    UnregisteredConstraint {
        index: usize,
    },

    /// A set reported a reformulated index it was never given.
    ReformOutOfScope {
        set: String,
        index: usize,
    },

    // ---- Model shape ----
    /// Constraint has no decision-variable terms; it belongs to the set
    /// geometry, not the robustness protocol.
    NoDecisionTerms {
        index: usize,
    },

    /// Constraint has decision-variable terms and cannot define set geometry.
    HasDecisionTerms {
        index: usize,
    },

    /// Constraint carries neither a lower nor an upper bound.
    MissingBounds {
        index: usize,
    },

    /// Constraint bound must be finite.
    InvalidBound {
        index: usize,
        value: f64,
    },

    /// Expression references a parameter outside the model's table.
    UnknownParam {
        param: usize,
        num_params: usize,
    },

    /// Parameter bounds must be finite with lower <= upper.
    InvalidParamBounds {
        name: String,
        lower: f64,
        upper: f64,
    },

    /// Bound tightening left a parameter with an empty interval.
    EmptyParamInterval {
        param: usize,
        lower: f64,
        upper: f64,
    },

    /// Set constraint shape the variant cannot absorb.
    UnsupportedSetConstraint {
        set: String,
        reason: &'static str,
    },

    // ---- Configuration ----
    /// Maximum iterations must be positive.
    InvalidMaxIter {
        max_iter: usize,
        reason: &'static str,
    },

    /// Cut tolerance must be finite and strictly positive.
    InvalidCutTol {
        tol: f64,
        reason: &'static str,
    },

    /// A recognized solver preference carried an unparseable value.
    InvalidPref {
        key: String,
        value: String,
    },

    // ---- Scenario ----
    /// Scenario values must be finite.
    NonFiniteScenarioValue {
        param: usize,
        value: f64,
    },

    // ---- Solver ----
    /// No solution values available from the deterministic collaborator.
    MissingSolutionValue,

    /// Hard failure reported by the deterministic collaborator.
    SolverFailure {
        text: String,
    },
}

impl std::error::Error for ResolveError {}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Protocol ----
            ResolveError::PhaseUnsupported { set, phase } => {
                write!(f, "Uncertainty set '{set}' does not support {phase}")
            }
            ResolveError::OwnershipConflict { index, owner, claimant } => {
                write!(
                    f,
                    "Constraint {index} is already owned by set {owner}; set {claimant} cannot \
                     claim it"
                )
            }
            ResolveError::UnknownSet { set, num_sets } => {
                write!(f, "Set index {set} out of range: only {num_sets} sets registered")
            }
            ResolveError::UnregisteredConstraint { index } => {
                write!(f, "Constraint {index} has no registered owner")
            }
            ResolveError::ReformOutOfScope { set, index } => {
                write!(
                    f,
                    "Uncertainty set '{set}' reported reformulating constraint {index}, which it \
                     does not own"
                )
            }

            // ---- Model shape ----
            ResolveError::NoDecisionTerms { index } => {
                write!(
                    f,
                    "Constraint {index} has no decision-variable terms; add it to its set as a \
                     set constraint instead of registering it"
                )
            }
            ResolveError::HasDecisionTerms { index } => {
                write!(
                    f,
                    "Constraint {index} has decision-variable terms; register it with an \
                     uncertainty set instead of adding it as a set constraint"
                )
            }
            ResolveError::MissingBounds { index } => {
                write!(f, "Constraint {index} has neither a lower nor an upper bound")
            }
            ResolveError::InvalidBound { index, value } => {
                write!(f, "Constraint {index} has a non-finite bound: {value}")
            }
            ResolveError::UnknownParam { param, num_params } => {
                write!(
                    f,
                    "Expression references uncertain parameter {param}, but the model has only \
                     {num_params} parameters"
                )
            }
            ResolveError::InvalidParamBounds { name, lower, upper } => {
                write!(
                    f,
                    "Invalid bounds for uncertain parameter '{name}': [{lower}, {upper}] must be \
                     finite with lower <= upper"
                )
            }
            ResolveError::EmptyParamInterval { param, lower, upper } => {
                write!(
                    f,
                    "Uncertain parameter {param} has an empty interval after bound tightening: \
                     [{lower}, {upper}]"
                )
            }
            ResolveError::UnsupportedSetConstraint { set, reason } => {
                write!(f, "Uncertainty set '{set}' cannot absorb set constraint: {reason}")
            }

            // ---- Configuration ----
            ResolveError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid maximum iterations {max_iter}: {reason}")
            }
            ResolveError::InvalidCutTol { tol, reason } => {
                write!(f, "Invalid cut tolerance {tol}: {reason}")
            }
            ResolveError::InvalidPref { key, value } => {
                write!(f, "Invalid solver preference '{key}': could not parse '{value}'")
            }

            // ---- Scenario ----
            ResolveError::NonFiniteScenarioValue { param, value } => {
                write!(f, "Non-finite scenario value for parameter {param}: {value}")
            }

            // ---- Solver ----
            ResolveError::MissingSolutionValue => {
                write!(f, "Deterministic model exposes no solution values")
            }
            ResolveError::SolverFailure { text } => {
                write!(f, "Deterministic solver failure: {text}")
            }
        }
    }
}
