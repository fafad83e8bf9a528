//! rust_robust — pluggable resolution of uncertain constraints in robust
//! optimization.
//!
//! Purpose
//! -------
//! Serve as the crate root for a library that takes a deterministic
//! optimization model augmented with uncertain constraints and resolves
//! those constraints through interchangeable uncertainty-set strategies:
//! static reformulation where a set can produce an exact deterministic
//! equivalent, iterative cutting planes where it cannot, and worst-case
//! scenario extraction at the terminal optimum.
//!
//! Key behaviors
//! -------------
//! - Expose the model vocabulary (`model`): uncertain parameters,
//!   expressions, constraints, scenarios, and the owning `RobustModel`.
//! - Expose the resolution protocol (`resolution`): the four-phase
//!   `UncertaintySet` trait with capability declarations, the ownership
//!   registry, the orchestrated solve lifecycle, and the unified error
//!   surface.
//! - Ship two baseline variants (`sets`): interval geometry and budgeted
//!   deviations.
//!
//! Invariants & assumptions
//! ------------------------
//! - The deterministic solver backend lives outside the crate, behind
//!   `resolution::DeterministicModel`; the crate never talks to a concrete
//!   solver API.
//! - All user-reachable failure paths surface as
//!   `resolution::ResolveError`; the crate does not panic on invalid input.
//! - This crate performs no I/O; optional per-round progress logging sits
//!   behind the `obs_slog` feature and the `verbose` option.
//!
//! Conventions
//! -----------
//! - Parameter and variable handles are dense `usize` ids; realizations and
//!   solution snapshots are `ndarray` vectors indexed by those ids.
//! - Every protocol call receives the model it needs explicitly; variants
//!   hold no back-references into ambient state.
//!
//! Downstream usage
//! ----------------
//! - Implement `resolution::DeterministicModel` over a solver backend,
//!   build a `model::RobustModel`, construct uncertainty sets (baseline or
//!   custom), and call `resolution::resolve`.
//! - The curated surface is re-exported via [`prelude`].
//!
//! Testing notes
//! -------------
//! - Unit tests live beside each module; end-to-end protocol behavior is
//!   exercised in `tests/integration_resolution.rs` against scripted
//!   deterministic models.

pub mod model;
pub mod resolution;
pub mod sets;

// ---- Optional convenience prelude for downstream crates --------------------
//
// Downstream crates can write
//
//     use rust_robust::prelude::*;
//
// to import the main surface in a single line.

pub mod prelude {
    pub use crate::model::prelude::*;
    pub use crate::resolution::prelude::*;
    pub use crate::sets::{BudgetSet, IntervalSet};
}
