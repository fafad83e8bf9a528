//! Uncertain-parameter handles and bound validation.
//!
//! Parameters are created through [`crate::model::robust_model::RobustModel`]
//! and are immutable afterwards; the rest of the crate refers to them only by
//! [`ParamId`]. Bounds are validated once, at creation, so downstream code can
//! assume finite intervals with `lower <= upper`.
use crate::resolution::errors::{ResolveError, ResolveResult};

/// Handle of an uncertain parameter inside a model's parameter table.
pub type ParamId = usize;

/// UncertainParam — one uncertain quantity with declared interval bounds.
///
/// Purpose
/// -------
/// Carry the display name and the declared `[lower, upper]` interval of a
/// single uncertain parameter. Instances are immutable once created and live
/// for the lifetime of their owning model.
///
/// Fields
/// ------
/// - `name`: display name used by rendering and error messages.
/// - `lower`, `upper`: declared interval bounds; finite, `lower <= upper`.
///
/// Invariants
/// ----------
/// - Bounds are finite and ordered; enforced by [`UncertainParam::new`] and
///   never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct UncertainParam {
    pub name: String,
    pub lower: f64,
    pub upper: f64,
}

impl UncertainParam {
    /// Construct a validated parameter.
    ///
    /// # Errors
    /// Returns [`ResolveError::InvalidParamBounds`] when either bound is
    /// non-finite or `lower > upper`.
    pub fn new(name: impl Into<String>, lower: f64, upper: f64) -> ResolveResult<Self> {
        let name = name.into();
        if !lower.is_finite() || !upper.is_finite() || lower > upper {
            return Err(ResolveError::InvalidParamBounds { name, lower, upper });
        }
        Ok(UncertainParam { name, lower, upper })
    }

    /// Midpoint of the declared interval, the parameter's nominal value.
    pub fn midpoint(&self) -> f64 {
        0.5 * (self.lower + self.upper)
    }

    /// Half the declared interval width; zero for a fixed parameter.
    pub fn half_width(&self) -> f64 {
        0.5 * (self.upper - self.lower)
    }
}
