//! resolution — the pluggable protocol for resolving uncertain constraints.
//!
//! Purpose
//! -------
//! Govern how each uncertain constraint of a robust model is converted into
//! something a deterministic solver can handle, by static reformulation or
//! by iterative cutting planes, and how worst-case scenarios are extracted
//! once an optimal deterministic solution is found.
//!
//! Key behaviors
//! -------------
//! - Define the four-phase variant protocol ([`protocol::UncertaintySet`])
//!   with capability declarations checked before dispatch.
//! - Enforce exactly-one-owner constraint registration
//!   ([`registry::ConstraintRegistry`]).
//! - Drive the model-wide lifecycle ([`orchestrator::resolve`]): register,
//!   setup, reformulate, cut loop bounded by a configured iteration cap,
//!   optional scenario pass.
//! - Consolidate like terms through the shared sparse accumulator
//!   ([`accumulator::TermAccumulator`]).
//! - Normalize configuration and numeric failures into a single error enum
//!   ([`errors::ResolveError`]) with a common result alias
//!   (`ResolveResult<T>`).
//!
//! Invariants & assumptions
//! ------------------------
//! - The protocol is single-threaded and cooperative: one phase at a time,
//!   sets visited in stable order, so solve output is reproducible.
//! - The deterministic model is mutated only through the sanctioned
//!   channels; cut and scenario phases receive it read-only.
//!
//! Downstream usage
//! ----------------
//! - Implement [`deterministic::DeterministicModel`] over the solver
//!   backend of choice, build a robust model, pick uncertainty sets, and
//!   call [`orchestrator::resolve`] with validated
//!   [`options::ResolveOptions`].

pub mod accumulator;
pub mod deterministic;
pub mod errors;
pub mod options;
pub mod orchestrator;
pub mod protocol;
pub mod registry;

// ---- Re-exports (primary public surface) -----------------------------------

pub use self::accumulator::{TERM_EPSILON, TermAccumulator};
pub use self::deterministic::{DetConstraint, DeterministicModel, SolveStatus};
pub use self::errors::{ResolveError, ResolveResult};
pub use self::options::{ResolveOptions, SolverPrefs};
pub use self::orchestrator::{Resolution, resolve};
pub use self::protocol::{Capabilities, Phase, UncertaintySet};
pub use self::registry::ConstraintRegistry;

// ---- Optional convenience prelude for downstream crates --------------------

pub mod prelude {
    pub use super::deterministic::{DetConstraint, DeterministicModel, SolveStatus};
    pub use super::errors::{ResolveError, ResolveResult};
    pub use super::options::{ResolveOptions, SolverPrefs};
    pub use super::orchestrator::{Resolution, resolve};
    pub use super::protocol::{Capabilities, Phase, UncertaintySet};
}
