//! model — data carriers for robust optimization models.
//!
//! Purpose
//! -------
//! Provide the model-side vocabulary of the crate: uncertain parameters
//! with declared intervals, sparse expressions over parameters and decision
//! variables, bounded uncertain constraints and set-geometry constraints,
//! dense scenarios, and the owning [`robust_model::RobustModel`].
//!
//! Key behaviors
//! -------------
//! - Validate at the boundary: parameter bounds, constraint bounds, and
//!   parameter references are checked when entering the model, so the
//!   resolution layer operates on well-formed structure.
//! - Keep expressions canonical under incremental construction; repeated
//!   additions accumulate instead of duplicating entries.
//! - Render expressions canonically for diagnostics (`display`).
//!
//! Downstream usage
//! ----------------
//! - Users build a [`robust_model::RobustModel`], choose uncertainty sets
//!   from [`crate::sets`] (or implement their own), and call
//!   [`crate::resolution::orchestrator::resolve`].

pub mod constraint;
pub mod display;
pub mod expr;
pub mod params;
pub mod robust_model;
pub mod scenario;

// ---- Re-exports (primary public surface) -----------------------------------

pub use self::constraint::{SetConstraint, UncertainConstraint};
pub use self::expr::{MixedExpr, UncertainExpr, VarId};
pub use self::params::{ParamId, UncertainParam};
pub use self::robust_model::RobustModel;
pub use self::scenario::Scenario;

// ---- Optional convenience prelude for downstream crates --------------------

pub mod prelude {
    pub use super::constraint::{SetConstraint, UncertainConstraint};
    pub use super::display::{render_mixed, render_uncertain};
    pub use super::expr::{MixedExpr, UncertainExpr, VarId};
    pub use super::params::{ParamId, UncertainParam};
    pub use super::robust_model::RobustModel;
    pub use super::scenario::Scenario;
}
