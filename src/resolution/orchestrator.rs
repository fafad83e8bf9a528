//! orchestrator — drives the full resolution lifecycle for one solve.
//!
//! Purpose
//! -------
//! Interleave a master deterministic problem with distributed, per-set
//! adversarial subproblems: register every uncertain constraint with its
//! set, run one-time setup, statically reformulate what can be
//! reformulated, then alternate deterministic solves with cut rounds until
//! no set can cut off the current solution, and finally extract worst-case
//! scenarios when requested.
//!
//! Key behaviors
//! -------------
//! - Capability gating: optional phases are invoked only on sets that
//!   declare them; a set left with working constraints but no cut
//!   capability is a configuration error surfaced before the loop starts.
//! - The iteration cap is enforced at the orchestrator boundary,
//!   independent of set behavior: the loop never runs more than
//!   `opts.max_iter` cut rounds, even against sets that always cut.
//! - Terminal solver statuses (infeasible, unbounded, failure) propagate
//!   unmasked; the orchestrator never retries the solver.
//! - Sets contribute to the master problem only through the sanctioned
//!   channels: direct adds during reformulation, returned cut lists during
//!   the loop. Cut and scenario phases see the solver read-only.
//!
//! Invariants & assumptions
//! ------------------------
//! - Sets are visited in slice order in every phase, and a set's indices in
//!   registration order, so a fixed input produces a reproducible solve.
//! - A constraint reformulated in the reformulation pass never reaches the
//!   cut loop or the scenario pass.
//!
//! Testing notes
//! -------------
//! - Unit tests drive the lifecycle against scripted deterministic models
//!   and instrumented sets; end-to-end behavior with the baseline variants
//!   lives in the integration suite.
use std::collections::HashMap;

use crate::{
    model::{robust_model::RobustModel, scenario::Scenario},
    resolution::{
        deterministic::{DeterministicModel, SolveStatus},
        errors::{ResolveError, ResolveResult},
        options::ResolveOptions,
        protocol::{Phase, UncertaintySet, phase_unsupported},
        registry::ConstraintRegistry,
    },
};

/// Resolution — outcome of one orchestrated solve.
///
/// Fields
/// ------
/// - `status`: terminal status of the last deterministic solve.
/// - `robust`: true when the solution was accepted as robust-feasible (all
///   sets returned empty cut lists at an optimum).
/// - `iterations`: cutting-plane rounds performed.
/// - `cuts_added`: total cuts routed into the master problem.
/// - `reformulated`: constraints removed from iterative handling by the
///   reformulation pass.
/// - `hit_iteration_limit`: true when the loop stopped at the cap instead
///   of converging.
/// - `scenarios`: worst-case realizations keyed by constraint index; absent
///   keys mean the owning set produced none.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub status: SolveStatus,
    pub robust: bool,
    pub iterations: usize,
    pub cuts_added: usize,
    pub reformulated: usize,
    pub hit_iteration_limit: bool,
    pub scenarios: HashMap<usize, Scenario>,
}

/// Resolve every uncertain constraint of `model` against `det`.
///
/// Runs the full protocol: registration, setup, reformulation, the
/// cutting-plane loop, and the optional scenario pass. `sets` is indexed by
/// the assignments recorded in the model; slice order is the stable dispatch
/// order for every phase.
///
/// # Errors
/// - Configuration errors from registration, capability gating, or a set
///   reporting indices outside its scope; these fail the solve immediately.
/// - Any error a set or the deterministic collaborator raises inside a
///   phase.
pub fn resolve(
    det: &mut dyn DeterministicModel, model: &RobustModel,
    sets: &mut [Box<dyn UncertaintySet>], opts: &ResolveOptions,
) -> ResolveResult<Resolution> {
    // Registration pass.
    let mut registry = ConstraintRegistry::new(sets.len());
    for (index, &set) in model.assignments().iter().enumerate() {
        registry.assign(index, set)?;
        sets[set].register_constraint(model, index, &opts.prefs)?;
    }
    registry.verify_total(model.num_constraints())?;

    // Setup pass, once per set.
    for set in sets.iter_mut() {
        if set.capabilities().supports(Phase::Setup) {
            set.setup(model, opts.scenarios_requested, &opts.prefs)?;
        }
    }

    // Reformulation pass; reformulated indices leave the working sets.
    let mut working: Vec<Vec<usize>> =
        (0..sets.len()).map(|s| registry.owned(s).to_vec()).collect();
    let mut reformulated = 0usize;
    for (s, set) in sets.iter_mut().enumerate() {
        if working[s].is_empty() || !set.capabilities().supports(Phase::Reformulate) {
            continue;
        }
        let done = set.reformulate(det, model, &working[s])?;
        for &index in &done {
            if !working[s].contains(&index) {
                return Err(ResolveError::ReformOutOfScope { set: set.name().to_string(), index });
            }
        }
        working[s].retain(|index| !done.contains(index));
        reformulated += done.len();
    }

    // Everything still working must be resolvable and, when requested,
    // scenario-capable; fail before the first solve rather than mid-loop.
    for (s, set) in sets.iter().enumerate() {
        if working[s].is_empty() {
            continue;
        }
        if !set.capabilities().supports(Phase::Cut) {
            return Err(phase_unsupported(set.name(), Phase::Cut));
        }
        if opts.scenarios_requested && !set.capabilities().supports(Phase::Scenario) {
            return Err(phase_unsupported(set.name(), Phase::Scenario));
        }
    }

    #[cfg(feature = "obs_slog")]
    let logger = if opts.verbose { Some(obs::resolution_logger()) } else { None };

    // Cutting-plane loop.
    let any_working = working.iter().any(|w| !w.is_empty());
    let mut iterations = 0usize;
    let mut cuts_added = 0usize;
    let mut hit_iteration_limit = false;
    let (status, robust) = loop {
        let status = det.solve(&opts.prefs)?;
        if status != SolveStatus::Optimal {
            break (status, false);
        }
        if !any_working {
            break (status, true);
        }
        if iterations == opts.max_iter {
            hit_iteration_limit = true;
            break (status, false);
        }
        iterations += 1;
        let mut round = 0usize;
        for (s, set) in sets.iter_mut().enumerate() {
            if working[s].is_empty() {
                continue;
            }
            let cuts = set.generate_cuts(&*det, model, &working[s])?;
            round += cuts.len();
            for cut in cuts {
                det.add_constraint(cut)?;
            }
        }
        #[cfg(feature = "obs_slog")]
        if let Some(ref logger) = logger {
            slog::info!(logger, "cut round finished";
                "iteration" => iterations, "cuts" => round);
        }
        if round == 0 {
            break (SolveStatus::Optimal, true);
        }
        cuts_added += round;
    };

    // Scenario pass: only at a robust optimum, only over working indices.
    let mut scenarios = HashMap::new();
    if robust && opts.scenarios_requested {
        for (s, set) in sets.iter_mut().enumerate() {
            if working[s].is_empty() {
                continue;
            }
            for (index, scenario) in set.generate_scenarios(&*det, model, &working[s])? {
                if let Some(scenario) = scenario {
                    scenarios.insert(index, scenario);
                }
            }
        }
    }

    Ok(Resolution {
        status,
        robust,
        iterations,
        cuts_added,
        reformulated,
        hit_iteration_limit,
        scenarios,
    })
}

// ---- Observability helpers ----

#[cfg(feature = "obs_slog")]
mod obs {
    use slog::Drain;

    /// Terminal logger for per-round resolution progress.
    pub(super) fn resolution_logger() -> slog::Logger {
        let decorator = slog_term::TermDecorator::new().stderr().build();
        let drain = slog_term::FullFormat::new(decorator).build().fuse();
        let drain = std::sync::Mutex::new(drain).fuse();
        slog::Logger::root(drain, slog::o!("component" => "resolution"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{
            constraint::UncertainConstraint,
            expr::{MixedExpr, UncertainExpr},
        },
        resolution::{
            deterministic::DetConstraint,
            options::SolverPrefs,
            protocol::Capabilities,
        },
    };
    use ndarray::{Array1, ArrayView1};
    use std::{cell::RefCell, rc::Rc};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover the orchestrated lifecycle against scripted
    // collaborators:
    // - iteration-cap enforcement against an always-cutting set,
    // - acceptance on an all-empty cut round, with cuts routed through the
    //   orchestrator channel,
    // - full reformulation short-circuiting the loop and the scenario pass,
    // - unmasked propagation of terminal solver statuses,
    // - capability gating for cut-incapable sets with remaining work.
    //
    // They intentionally DO NOT cover real cut mathematics; the baseline
    // variants own that in `sets::interval` / `sets::budget` and the
    // integration suite.
    // -------------------------------------------------------------------------

    /// Deterministic-model double: returns a scripted status per solve and a
    /// fixed solution snapshot, recording every added constraint.
    struct ScriptedModel {
        statuses: Vec<SolveStatus>,
        solves: usize,
        values: Array1<f64>,
        added: Vec<DetConstraint>,
        num_vars: usize,
    }

    impl ScriptedModel {
        fn optimal(num_vars: usize) -> Self {
            ScriptedModel {
                statuses: Vec::new(),
                solves: 0,
                values: Array1::zeros(num_vars),
                added: Vec::new(),
                num_vars,
            }
        }

        fn with_statuses(mut self, statuses: Vec<SolveStatus>) -> Self {
            self.statuses = statuses;
            self
        }
    }

    impl DeterministicModel for ScriptedModel {
        fn add_variable(&mut self, _lower: f64, _upper: f64) -> usize {
            self.num_vars += 1;
            self.num_vars - 1
        }

        fn add_constraint(&mut self, constraint: DetConstraint) -> ResolveResult<()> {
            self.added.push(constraint);
            Ok(())
        }

        fn solve(&mut self, _prefs: &SolverPrefs) -> ResolveResult<SolveStatus> {
            let status =
                self.statuses.get(self.solves).cloned().unwrap_or(SolveStatus::Optimal);
            self.solves += 1;
            Ok(status)
        }

        fn num_variables(&self) -> usize {
            self.num_vars
        }

        fn values(&self) -> Option<ArrayView1<'_, f64>> {
            Some(self.values.view())
        }
    }

    /// Shared instrumentation handle read by tests after the solve.
    #[derive(Default)]
    struct Probe {
        cut_calls: usize,
        scenario_calls: usize,
        setup_scenarios_flag: Option<bool>,
    }

    /// Set double with scripted per-phase behavior and a shared probe.
    struct ScriptedSet {
        caps: Capabilities,
        cuts_per_round: usize,
        rounds_with_cuts: usize,
        reform_all: bool,
        probe: Rc<RefCell<Probe>>,
    }

    impl ScriptedSet {
        fn cutting(rounds_with_cuts: usize, cuts_per_round: usize) -> Self {
            ScriptedSet {
                caps: Capabilities::new(true, false, true, true),
                cuts_per_round,
                rounds_with_cuts,
                reform_all: false,
                probe: Rc::new(RefCell::new(Probe::default())),
            }
        }

        fn reforming() -> Self {
            ScriptedSet {
                caps: Capabilities::new(true, true, true, true),
                cuts_per_round: 0,
                rounds_with_cuts: 0,
                reform_all: true,
                probe: Rc::new(RefCell::new(Probe::default())),
            }
        }

        fn cutless() -> Self {
            ScriptedSet {
                caps: Capabilities::new(false, false, false, false),
                cuts_per_round: 0,
                rounds_with_cuts: 0,
                reform_all: false,
                probe: Rc::new(RefCell::new(Probe::default())),
            }
        }

        fn probe(&self) -> Rc<RefCell<Probe>> {
            Rc::clone(&self.probe)
        }
    }

    impl UncertaintySet for ScriptedSet {
        fn name(&self) -> &str {
            "ScriptedSet"
        }

        fn capabilities(&self) -> Capabilities {
            self.caps
        }

        fn register_constraint(
            &mut self, _model: &RobustModel, _index: usize, _prefs: &SolverPrefs,
        ) -> ResolveResult<()> {
            Ok(())
        }

        fn setup(
            &mut self, _model: &RobustModel, scenarios_requested: bool, _prefs: &SolverPrefs,
        ) -> ResolveResult<()> {
            self.probe.borrow_mut().setup_scenarios_flag = Some(scenarios_requested);
            Ok(())
        }

        fn reformulate(
            &mut self, _det: &mut dyn DeterministicModel, _model: &RobustModel, indices: &[usize],
        ) -> ResolveResult<Vec<usize>> {
            if self.reform_all { Ok(indices.to_vec()) } else { Ok(Vec::new()) }
        }

        fn generate_cuts(
            &mut self, _det: &dyn DeterministicModel, _model: &RobustModel, _indices: &[usize],
        ) -> ResolveResult<Vec<DetConstraint>> {
            self.probe.borrow_mut().cut_calls += 1;
            if self.probe.borrow().cut_calls <= self.rounds_with_cuts {
                Ok((0..self.cuts_per_round)
                    .map(|_| DetConstraint::less_eq(vec![(0, 1.0)], 1.0))
                    .collect())
            } else {
                Ok(Vec::new())
            }
        }

        fn generate_scenarios(
            &mut self, _det: &dyn DeterministicModel, _model: &RobustModel, indices: &[usize],
        ) -> ResolveResult<Vec<(usize, Option<Scenario>)>> {
            self.probe.borrow_mut().scenario_calls += 1;
            indices
                .iter()
                .map(|&index| Ok((index, Some(Scenario::new(Array1::zeros(1))?))))
                .collect()
        }
    }

    fn one_constraint_model() -> RobustModel {
        let mut model = RobustModel::new();
        model.add_param("z", 0.0, 1.0).expect("valid bounds");
        let mut body = MixedExpr::new();
        body.add_var(0, 1.0);
        body.add_constant_expr(&UncertainExpr::new().with_term(0, 1.0));
        model
            .add_constraint(UncertainConstraint::new(body, None, Some(1.0)), 0)
            .expect("constraint is well formed");
        model
    }

    #[test]
    // Purpose
    // -------
    // Verify that the loop is bounded by `max_iter` even when the set cuts
    // on every round.
    //
    // Given
    // -----
    // - A set producing two cuts every round forever and `max_iter = 3`.
    //
    // Expect
    // ------
    // - Exactly 3 rounds, 6 cuts routed into the model, `robust = false`,
    //   `hit_iteration_limit = true`, final status still optimal.
    fn loop_is_bounded_independent_of_set_behavior() {
        // Arrange
        let model = one_constraint_model();
        let mut det = ScriptedModel::optimal(1);
        let mut sets: Vec<Box<dyn UncertaintySet>> =
            vec![Box::new(ScriptedSet::cutting(usize::MAX, 2))];
        let opts =
            ResolveOptions::new(3, false, false, SolverPrefs::new()).expect("valid options");

        // Act
        let resolution = resolve(&mut det, &model, &mut sets, &opts).expect("resolution runs");

        // Assert
        assert_eq!(resolution.iterations, 3);
        assert_eq!(resolution.cuts_added, 6);
        assert_eq!(det.added.len(), 6);
        assert!(!resolution.robust);
        assert!(resolution.hit_iteration_limit);
        assert_eq!(resolution.status, SolveStatus::Optimal);
    }

    #[test]
    // Purpose
    // -------
    // Verify that an all-empty cut round accepts the solution as robust and
    // that earlier cuts reached the master problem through the orchestrator.
    //
    // Given
    // -----
    // - A set cutting once (one cut) and then returning empty.
    //
    // Expect
    // ------
    // - Two rounds (one cutting, one empty), one cut added, `robust = true`,
    //   no iteration-limit flag.
    fn empty_round_terminates_loop_as_robust() {
        // Arrange
        let model = one_constraint_model();
        let mut det = ScriptedModel::optimal(1);
        let mut sets: Vec<Box<dyn UncertaintySet>> = vec![Box::new(ScriptedSet::cutting(1, 1))];
        let opts = ResolveOptions::standard();

        // Act
        let resolution = resolve(&mut det, &model, &mut sets, &opts).expect("resolution runs");

        // Assert
        assert!(resolution.robust);
        assert!(!resolution.hit_iteration_limit);
        assert_eq!(resolution.iterations, 2);
        assert_eq!(resolution.cuts_added, 1);
        assert_eq!(det.added.len(), 1);
    }

    #[test]
    // Purpose
    // -------
    // Verify that full reformulation short-circuits the loop and the
    // scenario pass: zero cut rounds and zero scenario requests even though
    // scenarios were requested.
    //
    // Given
    // -----
    // - A set reformulating 100% of its indices, `scenarios_requested`.
    //
    // Expect
    // ------
    // - `iterations = 0`, one reformulated constraint, empty scenario map,
    //   zero cut and scenario calls on the set, and the set saw the
    //   scenarios-requested flag during setup.
    fn full_reformulation_skips_loop_and_scenarios() {
        // Arrange
        let model = one_constraint_model();
        let mut det = ScriptedModel::optimal(1);
        let reforming = ScriptedSet::reforming();
        let probe = reforming.probe();
        let mut sets: Vec<Box<dyn UncertaintySet>> = vec![Box::new(reforming)];
        let opts =
            ResolveOptions::new(50, true, false, SolverPrefs::new()).expect("valid options");

        // Act
        let resolution = resolve(&mut det, &model, &mut sets, &opts).expect("resolution runs");

        // Assert
        assert!(resolution.robust);
        assert_eq!(resolution.iterations, 0);
        assert_eq!(resolution.reformulated, 1);
        assert!(resolution.scenarios.is_empty());
        let probe = probe.borrow();
        assert_eq!(probe.cut_calls, 0);
        assert_eq!(probe.scenario_calls, 0);
        assert_eq!(probe.setup_scenarios_flag, Some(true));
    }

    #[test]
    // Purpose
    // -------
    // Verify that scenarios are collected keyed by constraint index when the
    // loop converges with working constraints.
    //
    // Given
    // -----
    // - A set that never cuts but supports scenarios; scenarios requested.
    //
    // Expect
    // ------
    // - One scenario keyed by index 0 and exactly one scenario call.
    fn scenario_pass_collects_by_constraint_index() {
        // Arrange
        let model = one_constraint_model();
        let mut det = ScriptedModel::optimal(1);
        let mut sets: Vec<Box<dyn UncertaintySet>> = vec![Box::new(ScriptedSet::cutting(0, 0))];
        let opts =
            ResolveOptions::new(10, true, false, SolverPrefs::new()).expect("valid options");

        // Act
        let resolution = resolve(&mut det, &model, &mut sets, &opts).expect("resolution runs");

        // Assert
        assert!(resolution.robust);
        assert!(resolution.scenarios.contains_key(&0));
        assert_eq!(resolution.scenarios.len(), 1);
    }

    #[test]
    // Purpose
    // -------
    // Verify that a terminal solver status is propagated unmasked and stops
    // the loop without further cut rounds.
    //
    // Given
    // -----
    // - A deterministic model scripted to report infeasibility on the first
    //   solve.
    //
    // Expect
    // ------
    // - `status = Infeasible`, `robust = false`, zero iterations and cuts.
    fn terminal_solver_status_propagates_unmasked() {
        // Arrange
        let model = one_constraint_model();
        let mut det =
            ScriptedModel::optimal(1).with_statuses(vec![SolveStatus::Infeasible]);
        let mut sets: Vec<Box<dyn UncertaintySet>> =
            vec![Box::new(ScriptedSet::cutting(usize::MAX, 1))];
        let opts = ResolveOptions::standard();

        // Act
        let resolution = resolve(&mut det, &model, &mut sets, &opts).expect("resolution runs");

        // Assert
        assert_eq!(resolution.status, SolveStatus::Infeasible);
        assert!(!resolution.robust);
        assert_eq!(resolution.iterations, 0);
        assert_eq!(resolution.cuts_added, 0);
    }

    #[test]
    // Purpose
    // -------
    // Verify capability gating: a set holding working constraints without
    // cut capability fails the solve before any deterministic solve runs.
    //
    // Given
    // -----
    // - A register-only set owning one constraint.
    //
    // Expect
    // ------
    // - `PhaseUnsupported` naming the variant and cut generation; zero
    //   solver invocations.
    fn working_set_without_cut_capability_is_a_configuration_error() {
        // Arrange
        let model = one_constraint_model();
        let mut det = ScriptedModel::optimal(1);
        let mut sets: Vec<Box<dyn UncertaintySet>> = vec![Box::new(ScriptedSet::cutless())];
        let opts = ResolveOptions::standard();

        // Act
        let err = resolve(&mut det, &model, &mut sets, &opts)
            .expect_err("cut-incapable set with working constraints must fail");

        // Assert
        assert_eq!(
            err,
            ResolveError::PhaseUnsupported {
                set: "ScriptedSet".to_string(),
                phase: Phase::Cut,
            }
        );
        assert_eq!(det.solves, 0);
    }

    #[test]
    // Purpose
    // -------
    // Verify that an out-of-range set assignment is rejected during the
    // registration pass.
    //
    // Given
    // -----
    // - A model assigning its constraint to set 5 with one set supplied.
    //
    // Expect
    // ------
    // - `UnknownSet { set: 5, num_sets: 1 }`.
    fn unknown_set_assignment_fails_registration() {
        // Arrange
        let mut model = RobustModel::new();
        model.add_param("z", 0.0, 1.0).expect("valid bounds");
        let mut body = MixedExpr::new();
        body.add_var(0, 1.0);
        body.add_constant_expr(&UncertainExpr::new().with_term(0, 1.0));
        model
            .add_constraint(UncertainConstraint::new(body, None, Some(1.0)), 5)
            .expect("constraint is well formed");
        let mut det = ScriptedModel::optimal(1);
        let mut sets: Vec<Box<dyn UncertaintySet>> = vec![Box::new(ScriptedSet::cutting(0, 0))];
        let opts = ResolveOptions::standard();

        // Act
        let err = resolve(&mut det, &model, &mut sets, &opts)
            .expect_err("assignment outside the set slice must fail");

        // Assert
        assert_eq!(err, ResolveError::UnknownSet { set: 5, num_sets: 1 });
    }
}
