//! [`LpBackend`] implementations on top of `good_lp`.
//!
//! Every backend translates a [`LinearProgram`] into a fresh `good_lp`
//! problem per call and maps the solver's resolution errors onto
//! [`LpStatus`]; infeasibility is never an `Err`.

mod clarabel;
#[cfg(feature = "solver-highs")]
mod highs;

pub use clarabel::ClarabelBackend;
#[cfg(feature = "solver-highs")]
pub use highs::HighsBackend;

use crate::lp::{LinearProgram, LpBackend, LpOutcome, LpStatus, Relation};
use gin_core::{GinError, GinResult};
use good_lp::{
    constraint, variable, Constraint, Expression, ProblemVariables, ResolutionError, Solution,
    SolverModel, Variable,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::trace;

/// A program lowered to `good_lp` types, ready for `.using(solver)`.
pub(crate) struct LoweredProgram {
    pub problem: good_lp::variable::UnsolvedProblem,
    pub variables: Vec<Variable>,
    pub constraints: Vec<Constraint>,
}

pub(crate) fn lower(program: &LinearProgram) -> GinResult<LoweredProgram> {
    program.validate()?;

    let mut vars = ProblemVariables::new();
    let variables: Vec<Variable> = program
        .bounds()
        .iter()
        .map(|b| vars.add(variable().min(b.lower).max(b.upper)))
        .collect();

    let linear = |terms: &[(crate::lp::VarId, f64)]| {
        let mut expr = Expression::from(0.0);
        for (var, coef) in terms {
            expr += *coef * variables[var.index()];
        }
        expr
    };

    let objective = linear(program.objective());
    let constraints = program
        .constraints()
        .iter()
        .map(|c| {
            let lhs = linear(&c.terms);
            let rhs = c.rhs;
            match c.relation {
                Relation::LessEq => constraint!(lhs <= rhs),
                Relation::Eq => constraint!(lhs == rhs),
                Relation::GreaterEq => constraint!(lhs >= rhs),
            }
        })
        .collect();

    trace!(
        variables = program.num_variables(),
        constraints = program.num_constraints(),
        "lowered linear program"
    );
    Ok(LoweredProgram {
        problem: vars.minimise(objective),
        variables,
        constraints,
    })
}

pub(crate) fn add_constraints<M: SolverModel>(mut model: M, constraints: Vec<Constraint>) -> M {
    for c in constraints {
        model = model.with(c);
    }
    model
}

/// Turn a `good_lp` resolution into an [`LpOutcome`].
pub(crate) fn collect_outcome<S: Solution>(
    program: &LinearProgram,
    variables: &[Variable],
    result: Result<S, ResolutionError>,
) -> LpOutcome {
    match result {
        Ok(solution) => {
            let values: Vec<Option<f64>> = variables
                .iter()
                .map(|v| Some(solution.value(*v)))
                .collect();
            let objective = program.evaluate_objective(&values);
            LpOutcome {
                status: LpStatus::Optimal,
                objective: Some(objective),
                values,
            }
        }
        Err(err) => {
            let status = match err {
                ResolutionError::Infeasible => LpStatus::Infeasible,
                ResolutionError::Unbounded => LpStatus::Unbounded,
                other => LpStatus::Other(other.to_string()),
            };
            LpOutcome::without_solution(status, variables.len())
        }
    }
}

/// Backend selector for configuration files and the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LpBackendKind {
    #[default]
    Clarabel,
    #[cfg(feature = "solver-highs")]
    Highs,
}

const AVAILABLE_BACKENDS: &[&str] = &[
    "clarabel",
    #[cfg(feature = "solver-highs")]
    "highs",
];

impl LpBackendKind {
    pub fn available() -> &'static [&'static str] {
        AVAILABLE_BACKENDS
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LpBackendKind::Clarabel => "clarabel",
            #[cfg(feature = "solver-highs")]
            LpBackendKind::Highs => "highs",
        }
    }

    pub fn build(&self) -> Box<dyn LpBackend> {
        match self {
            LpBackendKind::Clarabel => Box::new(ClarabelBackend),
            #[cfg(feature = "solver-highs")]
            LpBackendKind::Highs => Box::new(HighsBackend),
        }
    }
}

impl fmt::Display for LpBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn unknown_backend_error(label: &str) -> GinError {
    GinError::Config(format!(
        "unknown lp backend '{}'; supported values: {}",
        label,
        LpBackendKind::available().join(", ")
    ))
}

impl FromStr for LpBackendKind {
    type Err = GinError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.to_ascii_lowercase();
        match normalized.as_str() {
            "clarabel" => Ok(LpBackendKind::Clarabel),
            "highs" => {
                #[cfg(feature = "solver-highs")]
                {
                    Ok(LpBackendKind::Highs)
                }
                #[cfg(not(feature = "solver-highs"))]
                {
                    Err(unknown_backend_error(&normalized))
                }
            }
            other => Err(unknown_backend_error(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_backends() {
        assert_eq!("clarabel".parse::<LpBackendKind>().unwrap(), LpBackendKind::Clarabel);
        assert_eq!("CLARABEL".parse::<LpBackendKind>().unwrap(), LpBackendKind::Clarabel);
        assert_eq!(LpBackendKind::default().as_str(), "clarabel");
    }

    #[test]
    fn rejects_unknown_backend() {
        let err = "simplex9000".parse::<LpBackendKind>().unwrap_err();
        assert!(err.to_string().contains("supported values: clarabel"));
    }

    #[cfg(not(feature = "solver-highs"))]
    #[test]
    fn highs_requires_feature() {
        assert!("highs".parse::<LpBackendKind>().is_err());
    }

    #[test]
    fn built_backend_reports_its_id() {
        let backend = LpBackendKind::Clarabel.build();
        assert_eq!(backend.id(), "clarabel");
    }
}
