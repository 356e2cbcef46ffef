//! Abstract linear-program capability.
//!
//! The dispatch formulation only talks to this module: it builds a
//! [`LinearProgram`] (bounded variables, linear rows, linear objective to
//! minimize) and hands it to an [`LpBackend`]. Backends are stateless; every
//! call builds a fresh solver instance, so one backend can be shared across
//! rayon workers.

use gin_core::{GinError, GinResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to a variable of a [`LinearProgram`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarId(usize);

impl VarId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    LessEq,
    Eq,
    GreaterEq,
}

/// `Σ coef · var  (relation)  rhs`
#[derive(Debug, Clone)]
pub struct LinearConstraint {
    pub terms: Vec<(VarId, f64)>,
    pub relation: Relation,
    pub rhs: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariableBounds {
    pub lower: f64,
    pub upper: f64,
}

/// A minimization LP.
#[derive(Debug, Clone, Default)]
pub struct LinearProgram {
    bounds: Vec<VariableBounds>,
    constraints: Vec<LinearConstraint>,
    objective: Vec<(VarId, f64)>,
}

impl LinearProgram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_variable(&mut self, lower: f64, upper: f64) -> VarId {
        self.bounds.push(VariableBounds { lower, upper });
        VarId(self.bounds.len() - 1)
    }

    pub fn add_constraint(&mut self, terms: Vec<(VarId, f64)>, relation: Relation, rhs: f64) {
        self.constraints.push(LinearConstraint {
            terms,
            relation,
            rhs,
        });
    }

    /// Add `coef · var` to the objective.
    pub fn add_objective_term(&mut self, var: VarId, coef: f64) {
        self.objective.push((var, coef));
    }

    pub fn num_variables(&self) -> usize {
        self.bounds.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn bounds(&self) -> &[VariableBounds] {
        &self.bounds
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    pub fn objective(&self) -> &[(VarId, f64)] {
        &self.objective
    }

    /// Objective value at `values` (missing entries count as 0).
    pub fn evaluate_objective(&self, values: &[Option<f64>]) -> f64 {
        self.objective
            .iter()
            .map(|(var, coef)| coef * values.get(var.0).copied().flatten().unwrap_or(0.0))
            .sum()
    }

    /// Reject programs no backend could make sense of.
    pub fn validate(&self) -> GinResult<()> {
        let n = self.bounds.len();
        for (i, b) in self.bounds.iter().enumerate() {
            if b.lower.is_nan() || b.upper.is_nan() || b.lower > b.upper {
                return Err(GinError::Solver(format!(
                    "variable {i} has invalid bounds [{}, {}]",
                    b.lower, b.upper
                )));
            }
        }
        let check_terms = |terms: &[(VarId, f64)], what: &str| -> GinResult<()> {
            for (var, coef) in terms {
                if var.0 >= n {
                    return Err(GinError::Solver(format!(
                        "{what} references variable {} of {n}",
                        var.0
                    )));
                }
                if !coef.is_finite() {
                    return Err(GinError::Solver(format!("{what} has coefficient {coef}")));
                }
            }
            Ok(())
        };
        for (row, c) in self.constraints.iter().enumerate() {
            check_terms(&c.terms, &format!("constraint {row}"))?;
            if !c.rhs.is_finite() {
                return Err(GinError::Solver(format!("constraint {row} has rhs {}", c.rhs)));
            }
        }
        check_terms(&self.objective, "objective")
    }
}

/// Terminal status of one LP solve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LpStatus {
    Optimal,
    Infeasible,
    Unbounded,
    Other(String),
}

impl fmt::Display for LpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LpStatus::Optimal => write!(f, "Optimal"),
            LpStatus::Infeasible => write!(f, "Infeasible"),
            LpStatus::Unbounded => write!(f, "Unbounded"),
            LpStatus::Other(msg) => write!(f, "Other ({msg})"),
        }
    }
}

/// What a backend hands back: a status plus whatever values it could produce.
#[derive(Debug, Clone)]
pub struct LpOutcome {
    pub status: LpStatus,
    /// Objective at the returned point, `None` if unavailable
    pub objective: Option<f64>,
    /// One entry per variable, `None` if unavailable
    pub values: Vec<Option<f64>>,
}

impl LpOutcome {
    /// Outcome with no values at all (infeasible, unbounded, backend failure).
    pub fn without_solution(status: LpStatus, num_variables: usize) -> Self {
        Self {
            status,
            objective: None,
            values: vec![None; num_variables],
        }
    }

    /// Value of `var`, 0.0 when the backend did not provide one.
    pub fn value_or_zero(&self, var: VarId) -> f64 {
        self.values.get(var.0).copied().flatten().unwrap_or(0.0)
    }

    pub fn is_optimal(&self) -> bool {
        self.status == LpStatus::Optimal
    }
}

/// Solves one [`LinearProgram`] per call.
pub trait LpBackend: Send + Sync {
    /// Unique identifier (e.g., "clarabel", "highs")
    fn id(&self) -> &str;

    /// Solve `program`. Infeasibility is a status, not an error; `Err` is
    /// reserved for programs the backend cannot accept.
    fn solve(&self, program: &LinearProgram) -> GinResult<LpOutcome>;
}
