//! accumulator — gather/scatter consolidation of uncertain-parameter terms.
//!
//! Purpose
//! -------
//! Merge possibly-duplicated coefficient contributions for the same uncertain
//! parameter into one canonical sparse vector. Every layer that collects like
//! terms (expression substitution, cut construction, display rendering) runs
//! its contributions through a [`TermAccumulator`] instead of a naive linear
//! scan, which would fail to merge repeated parameters.
//!
//! Key behaviors
//! -------------
//! - O(1) amortized accumulation per contribution via a dense coefficient
//!   scratch indexed by parameter id, plus an insertion-ordered touched list.
//! - Enumeration yields only "active" entries: accumulated coefficients with
//!   magnitude at least [`TERM_EPSILON`] (`1e-20`). Negligible entries may
//!   remain in storage but are invisible to enumeration.
//! - [`TermAccumulator::reset`] clears only the touched entries, so the
//!   scratch is reusable across expressions without reallocation.
//!
//! Invariants & assumptions
//! ------------------------
//! - At most one scratch slot per parameter id; repeated `add` calls for the
//!   same id sum into that slot.
//! - Enumeration order is the first-touch insertion order, which is stable
//!   for a fixed contribution sequence. Callers needing index order sort the
//!   result (see [`TermAccumulator::active_sorted`]).
//!
//! Downstream usage
//! ----------------
//! - `model::expr` consolidates substituted expressions through a borrowed
//!   accumulator; concrete uncertainty sets keep one as owned scratch and
//!   reset it between constraints.
//! - `model::display` consolidates before rendering so repeated parameters
//!   never print twice.
//!
//! Testing notes
//! -------------
//! - Unit tests cover net-zero suppression, insertion-order stability,
//!   scratch growth, and reuse after `reset`.

/// Coefficients with magnitude below this value are treated as absent during
/// enumeration and consolidation.
pub const TERM_EPSILON: f64 = 1e-20;

/// TermAccumulator — reusable sparse accumulator over parameter ids.
///
/// Purpose
/// -------
/// Canonicalize a stream of `(parameter, coefficient)` contributions into at
/// most one entry per parameter, with epsilon-based zero suppression.
///
/// Fields
/// ------
/// - `coeffs`: dense coefficient scratch, grown on demand to cover the
///   largest parameter id seen.
/// - `touched`: parameter ids in first-touch order; drives enumeration and
///   cheap reset.
/// - `marked`: per-id flag telling whether the id is already on `touched`.
///
/// Invariants
/// ----------
/// - `marked[p]` holds exactly when `p` appears in `touched`.
/// - Slots not on `touched` are zero.
///
/// Performance
/// -----------
/// - `add` is O(1) amortized (amortization covers scratch growth on a new
///   maximum id); `reset` is O(#touched), never O(capacity).
#[derive(Debug, Clone, Default)]
pub struct TermAccumulator {
    coeffs: Vec<f64>,
    touched: Vec<usize>,
    marked: Vec<bool>,
}

impl TermAccumulator {
    /// Construct an empty accumulator with no reserved scratch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct an accumulator with scratch pre-sized for ids `0..capacity`.
    pub fn with_capacity(capacity: usize) -> Self {
        TermAccumulator {
            coeffs: vec![0.0; capacity],
            touched: Vec::with_capacity(capacity),
            marked: vec![false; capacity],
        }
    }

    /// Accumulate one contribution for `param`.
    ///
    /// Repeated calls for the same id sum into a single slot. Ids beyond the
    /// current scratch grow it; growth is what makes the amortized cost O(1).
    pub fn add(&mut self, param: usize, coeff: f64) {
        if param >= self.coeffs.len() {
            self.coeffs.resize(param + 1, 0.0);
            self.marked.resize(param + 1, false);
        }
        if !self.marked[param] {
            self.marked[param] = true;
            self.touched.push(param);
        }
        self.coeffs[param] += coeff;
    }

    /// Accumulated coefficient for `param`, zero when never touched.
    pub fn coeff(&self, param: usize) -> f64 {
        self.coeffs.get(param).copied().unwrap_or(0.0)
    }

    /// Iterate active entries in first-touch order.
    ///
    /// An entry is active when its accumulated magnitude is at least
    /// [`TERM_EPSILON`]; contributions that cancel to (numerical) zero are
    /// omitted even though their slot stays touched.
    pub fn active(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.touched
            .iter()
            .map(move |&p| (p, self.coeffs[p]))
            .filter(|&(_, c)| c.abs() >= TERM_EPSILON)
    }

    /// Active entries sorted by parameter id.
    ///
    /// Rendering and other reproducibility-sensitive consumers use this
    /// instead of [`TermAccumulator::active`].
    pub fn active_sorted(&self) -> Vec<(usize, f64)> {
        let mut entries: Vec<(usize, f64)> = self.active().collect();
        entries.sort_unstable_by_key(|&(p, _)| p);
        entries
    }

    /// Number of active entries.
    pub fn len_active(&self) -> usize {
        self.active().count()
    }

    /// True when no entry is active.
    pub fn is_empty_active(&self) -> bool {
        self.active().next().is_none()
    }

    /// Clear all touched slots, keeping the scratch allocation for reuse.
    pub fn reset(&mut self) {
        for &p in &self.touched {
            self.coeffs[p] = 0.0;
            self.marked[p] = false;
        }
        self.touched.clear();
    }
}
