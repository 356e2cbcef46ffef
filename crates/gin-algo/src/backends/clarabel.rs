use super::{add_constraints, collect_outcome, lower};
use crate::lp::{LinearProgram, LpBackend, LpOutcome};
use gin_core::GinResult;
use good_lp::solvers::clarabel::clarabel;
use good_lp::SolverModel;

/// Interior-point LP backend (pure Rust, default).
///
/// Solutions are accurate to roughly 1e-8; callers comparing objectives
/// should allow a small tolerance.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClarabelBackend;

impl LpBackend for ClarabelBackend {
    fn id(&self) -> &str {
        "clarabel"
    }

    fn solve(&self, program: &LinearProgram) -> GinResult<LpOutcome> {
        let lowered = lower(program)?;
        let model = add_constraints(lowered.problem.using(clarabel), lowered.constraints);
        Ok(collect_outcome(program, &lowered.variables, model.solve()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lp::{LpStatus, Relation};

    #[test]
    fn solves_small_lp() {
        // min x + 2y  s.t.  x + y >= 3, x <= 2
        let mut lp = LinearProgram::new();
        let x = lp.add_variable(0.0, 2.0);
        let y = lp.add_variable(0.0, 10.0);
        lp.add_constraint(vec![(x, 1.0), (y, 1.0)], Relation::GreaterEq, 3.0);
        lp.add_objective_term(x, 1.0);
        lp.add_objective_term(y, 2.0);

        let outcome = ClarabelBackend.solve(&lp).unwrap();
        assert_eq!(outcome.status, LpStatus::Optimal);
        assert!((outcome.value_or_zero(x) - 2.0).abs() < 1e-5);
        assert!((outcome.value_or_zero(y) - 1.0).abs() < 1e-5);
        assert!((outcome.objective.unwrap() - 4.0).abs() < 1e-5);
    }

    #[test]
    fn equality_rows_bind() {
        let mut lp = LinearProgram::new();
        let x = lp.add_variable(-5.0, 5.0);
        lp.add_constraint(vec![(x, 2.0)], Relation::Eq, 3.0);
        lp.add_objective_term(x, 1.0);

        let outcome = ClarabelBackend.solve(&lp).unwrap();
        assert!(outcome.is_optimal());
        assert!((outcome.value_or_zero(x) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn infeasible_is_a_status() {
        let mut lp = LinearProgram::new();
        let x = lp.add_variable(0.0, 1.0);
        lp.add_constraint(vec![(x, 1.0)], Relation::GreaterEq, 5.0);
        lp.add_objective_term(x, 1.0);

        let outcome = ClarabelBackend.solve(&lp).unwrap();
        assert!(!outcome.is_optimal());
        assert!(outcome.objective.is_none());
        assert_eq!(outcome.value_or_zero(x), 0.0);
    }

    #[test]
    fn malformed_program_is_an_error() {
        let mut lp = LinearProgram::new();
        lp.add_variable(2.0, 1.0);
        assert!(ClarabelBackend.solve(&lp).is_err());
    }
}
