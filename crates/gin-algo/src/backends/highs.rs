use super::{add_constraints, collect_outcome, lower};
use crate::lp::{LinearProgram, LpBackend, LpOutcome};
use gin_core::GinResult;
use good_lp::solvers::highs::highs;
use good_lp::SolverModel;

/// HiGHS dual-simplex backend. Returns vertex solutions, so ties between
/// attack candidates are resolved on exact objective values.
#[derive(Debug, Clone, Copy, Default)]
pub struct HighsBackend;

impl LpBackend for HighsBackend {
    fn id(&self) -> &str {
        "highs"
    }

    fn solve(&self, program: &LinearProgram) -> GinResult<LpOutcome> {
        let lowered = lower(program)?;
        let model = add_constraints(lowered.problem.using(highs), lowered.constraints);
        Ok(collect_outcome(program, &lowered.variables, model.solve()))
    }
}
