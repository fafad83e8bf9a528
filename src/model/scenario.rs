//! Scenario — one concrete realization of the uncertain parameters.
//!
//! A scenario is a dense assignment over the full parameter table, produced
//! by an uncertainty set at a confirmed optimum to certify or diagnose
//! worst-case behavior. Values are validated finite at construction so
//! downstream consumers never see NaN or infinities.
use crate::{
    model::params::ParamId,
    resolution::errors::{ResolveError, ResolveResult},
};
use ndarray::{Array1, ArrayView1};

/// Dense parameter realization judged to minimize slack in one constraint.
///
/// Parameters a set does not deviate are filled at their nominal value by
/// the producing set, keeping the carrier free of sentinel values.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    values: Array1<f64>,
}

impl Scenario {
    /// Construct a validated scenario.
    ///
    /// # Errors
    /// Returns [`ResolveError::NonFiniteScenarioValue`] identifying the
    /// first offending parameter when any value is NaN or infinite.
    pub fn new(values: Array1<f64>) -> ResolveResult<Self> {
        for (param, &value) in values.iter().enumerate() {
            if !value.is_finite() {
                return Err(ResolveError::NonFiniteScenarioValue { param, value });
            }
        }
        Ok(Scenario { values })
    }

    /// Realized value of `param`.
    pub fn value(&self, param: ParamId) -> f64 {
        self.values[param]
    }

    /// The full realization vector.
    pub fn values(&self) -> ArrayView1<'_, f64> {
        self.values.view()
    }

    /// Number of parameters covered.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True for a zero-parameter scenario.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
