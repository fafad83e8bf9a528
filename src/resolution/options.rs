//! options — validated configuration for one resolution run.
//!
//! Purpose
//! -------
//! Collect the orchestrator-boundary knobs in one validated carrier:
//! the cutting-plane iteration cap, whether post-optimal scenarios are
//! requested, verbosity, and the opaque solver-preference bag forwarded
//! unchanged through every protocol phase.
//!
//! Conventions
//! -----------
//! - Construction validates; downstream code assumes an accepted
//!   [`ResolveOptions`] is internally consistent.
//! - [`SolverPrefs`] is deliberately untyped (string keys and values).
//!   Recognized keys are documented per consumer; both baseline variants
//!   recognize `cut_tol` and parse it through [`parse_cut_tol`].
use std::collections::HashMap;

use crate::resolution::errors::{ResolveError, ResolveResult};

/// Opaque preference bag passed unchanged from the top-level solve call
/// through every protocol phase.
pub type SolverPrefs = HashMap<String, String>;

/// Default cutting-plane iteration cap.
pub const DEFAULT_MAX_ITER: usize = 100;

/// Default violation tolerance below which no cut is emitted.
pub const DEFAULT_CUT_TOL: f64 = 1e-6;

/// ResolveOptions — orchestrator-boundary configuration.
///
/// Fields
/// ------
/// - `max_iter`: hard cap on cutting-plane rounds; enforced by the
///   orchestrator independent of set behavior.
/// - `scenarios_requested`: ask sets to prepare and produce worst-case
///   scenarios at the terminal optimum.
/// - `verbose`: emit per-round progress (only with the `obs_slog` feature).
/// - `prefs`: opaque solver-invocation preferences.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveOptions {
    pub max_iter: usize,
    pub scenarios_requested: bool,
    pub verbose: bool,
    pub prefs: SolverPrefs,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self::standard()
    }
}

impl ResolveOptions {
    /// Construct validated options.
    ///
    /// # Errors
    /// Returns [`ResolveError::InvalidMaxIter`] when `max_iter == 0`.
    pub fn new(
        max_iter: usize, scenarios_requested: bool, verbose: bool, prefs: SolverPrefs,
    ) -> ResolveResult<Self> {
        if max_iter == 0 {
            return Err(ResolveError::InvalidMaxIter {
                max_iter,
                reason: "Maximum iterations must be greater than zero.",
            });
        }
        Ok(ResolveOptions { max_iter, scenarios_requested, verbose, prefs })
    }

    /// Defaults: `max_iter = 100`, no scenarios, quiet, empty preferences.
    pub fn standard() -> Self {
        ResolveOptions {
            max_iter: DEFAULT_MAX_ITER,
            scenarios_requested: false,
            verbose: false,
            prefs: SolverPrefs::new(),
        }
    }
}

/// Read the recognized `cut_tol` preference, falling back to `fallback`.
///
/// # Errors
/// - [`ResolveError::InvalidPref`] when the value does not parse as `f64`.
/// - [`ResolveError::InvalidCutTol`] when the parsed value is non-finite or
///   not strictly positive.
pub fn parse_cut_tol(prefs: &SolverPrefs, fallback: f64) -> ResolveResult<f64> {
    let Some(raw) = prefs.get("cut_tol") else {
        return Ok(fallback);
    };
    let tol: f64 = raw
        .parse()
        .map_err(|_| ResolveError::InvalidPref { key: "cut_tol".to_string(), value: raw.clone() })?;
    if !tol.is_finite() {
        return Err(ResolveError::InvalidCutTol { tol, reason: "Tolerance must be finite." });
    }
    if tol <= 0.0 {
        return Err(ResolveError::InvalidCutTol { tol, reason: "Tolerance must be positive." });
    }
    Ok(tol)
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover option validation, the standard defaults, and
    // `cut_tol` preference parsing.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify that a zero iteration cap is rejected and a positive cap is
    // accepted with fields preserved.
    //
    // Given
    // -----
    // - `max_iter` of 0 and of 25.
    //
    // Expect
    // ------
    // - Zero fails with `InvalidMaxIter`; 25 constructs with the requested
    //   flags.
    fn new_validates_iteration_cap() {
        // Act
        let zero = ResolveOptions::new(0, false, false, SolverPrefs::new());
        let ok = ResolveOptions::new(25, true, false, SolverPrefs::new());

        // Assert
        assert!(matches!(zero, Err(ResolveError::InvalidMaxIter { max_iter: 0, .. })));
        let opts = ok.expect("positive cap is valid");
        assert_eq!(opts.max_iter, 25);
        assert!(opts.scenarios_requested);
    }

    #[test]
    // Purpose
    // -------
    // Verify the documented standard defaults.
    //
    // Expect
    // ------
    // - `max_iter = DEFAULT_MAX_ITER`, scenarios off, quiet, empty prefs.
    fn standard_matches_documented_defaults() {
        // Act
        let opts = ResolveOptions::standard();

        // Assert
        assert_eq!(opts.max_iter, DEFAULT_MAX_ITER);
        assert!(!opts.scenarios_requested);
        assert!(!opts.verbose);
        assert!(opts.prefs.is_empty());
    }

    #[test]
    // Purpose
    // -------
    // Verify `cut_tol` preference handling: absent key falls back, a valid
    // override parses, and garbage or non-positive values fail.
    //
    // Given
    // -----
    // - Prefs without the key, with "1e-4", with "tight", and with "-1".
    //
    // Expect
    // ------
    // - Fallback, 1e-4, `InvalidPref`, and `InvalidCutTol` respectively.
    fn parse_cut_tol_handles_fallback_override_and_garbage() {
        // Arrange
        let empty = SolverPrefs::new();
        let mut valid = SolverPrefs::new();
        valid.insert("cut_tol".to_string(), "1e-4".to_string());
        let mut garbage = SolverPrefs::new();
        garbage.insert("cut_tol".to_string(), "tight".to_string());
        let mut negative = SolverPrefs::new();
        negative.insert("cut_tol".to_string(), "-1".to_string());

        // Act / Assert
        assert_eq!(parse_cut_tol(&empty, 1e-6), Ok(1e-6));
        assert_eq!(parse_cut_tol(&valid, 1e-6), Ok(1e-4));
        assert!(matches!(parse_cut_tol(&garbage, 1e-6), Err(ResolveError::InvalidPref { .. })));
        assert!(matches!(parse_cut_tol(&negative, 1e-6), Err(ResolveError::InvalidCutTol { .. })));
    }
}
