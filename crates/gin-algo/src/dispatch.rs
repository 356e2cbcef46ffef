//! Load-shedding DC dispatch.
//!
//! For a grid and a set of out-of-service lines, finds generation,
//! controllable-load curtailment, bus angles and involuntary shed that
//! minimize total shed, with generation cost as a small tie-break:
//!
//! ```text
//! min  Σ shed_i + ε · Σ cost_i · g_i
//! s.t. g_i − c_i + Σ_active b_ij (θ_j − θ_i) = demand_i − shed_i   ∀ i
//!      −cap_ij ≤ b_ij (θ_i − θ_j) ≤ cap_ij                       ∀ active ij
//!      θ_ref = 0
//!      θ_min ≤ θ_i ≤ θ_max,  g_min ≤ g ≤ g_max,  c_min ≤ c ≤ c_max,  0 ≤ shed ≤ demand
//! ```
//!
//! Disabled lines contribute neither a flow term nor a limit row. The model
//! itself is never touched.

use crate::backends::ClarabelBackend;
use crate::lp::{LinearProgram, LpBackend, LpOutcome, LpStatus, Relation, VarId};
use gin_core::{BusId, GinResult, GridModel, LineKey};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Dispatch formulation settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Weight ε of the generation-cost term; small enough that shed dominates
    pub cost_weight: f64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self { cost_weight: 1e-3 }
    }
}

/// Outcome of one dispatch solve. Per-bus vectors are indexed by bus id.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchResult {
    pub status: LpStatus,
    /// Solved objective, `+∞` when the LP produced none
    pub objective: f64,
    pub generation: Vec<f64>,
    pub curtailment: Vec<f64>,
    pub theta: Vec<f64>,
    pub shed: Vec<f64>,
    /// Σ shed, recomputed from the variables
    pub total_shed: f64,
    /// Lines treated as out of service, in line-list order
    pub disabled_lines: Vec<LineKey>,
    /// Bus whose angle is pinned to zero
    pub reference_bus: Option<BusId>,
}

impl DispatchResult {
    pub fn is_optimal(&self) -> bool {
        self.status == LpStatus::Optimal
    }

    pub fn is_disabled(&self, line: LineKey) -> bool {
        self.disabled_lines.contains(&line)
    }

    /// Flow on `line` oriented from its lower to its higher bus.
    ///
    /// `None` for pairs that are not lines of `model`; 0 for disabled lines.
    pub fn flow(&self, model: &GridModel, line: LineKey) -> Option<f64> {
        let record = model.line(model.line_position(line)?)?;
        if self.is_disabled(line) {
            return Some(0.0);
        }
        let (i, j) = (line.from().value(), line.to().value());
        Some(record.susceptance * (self.theta.get(i)? - self.theta.get(j)?))
    }

    /// Flows on every line in line-list order, each oriented as stored
    /// (`from → to`); disabled lines report 0.
    pub fn line_flows(&self, model: &GridModel) -> Vec<f64> {
        model
            .line_records()
            .iter()
            .map(|line| {
                if self.is_disabled(line.key()) {
                    return 0.0;
                }
                let theta = |bus: BusId| self.theta.get(bus.value()).copied().unwrap_or(0.0);
                line.susceptance * (theta(line.from) - theta(line.to))
            })
            .collect()
    }

    pub fn total_generation(&self) -> f64 {
        self.generation.iter().sum()
    }

    pub fn summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("Status: {}\n", self.status));
        s.push_str(&format!("Objective: {:.6}\n", self.objective));
        s.push_str(&format!("Total Shed: {:.3} MW\n", self.total_shed));
        s.push_str(&format!("Total Generation: {:.3} MW\n", self.total_generation()));
        s.push_str(&format!(
            "Disabled Lines: {}\n",
            format_lines(&self.disabled_lines)
        ));
        s
    }
}

/// `[0-1, 0-2]`, or `none` when empty.
pub fn format_lines(lines: &[LineKey]) -> String {
    if lines.is_empty() {
        "none".to_string()
    } else {
        let parts: Vec<String> = lines.iter().map(ToString::to_string).collect();
        format!("[{}]", parts.join(", "))
    }
}

/// Variable handles of the dispatch LP, one per bus.
struct DispatchVariables {
    theta: Vec<VarId>,
    generation: Vec<VarId>,
    curtailment: Vec<VarId>,
    shed: Vec<VarId>,
}

fn build_program(
    model: &GridModel,
    active: &[bool],
    config: &DispatchConfig,
) -> (LinearProgram, DispatchVariables) {
    let mut lp = LinearProgram::new();
    let n = model.num_buses();
    let mut vars = DispatchVariables {
        theta: Vec::with_capacity(n),
        generation: Vec::with_capacity(n),
        curtailment: Vec::with_capacity(n),
        shed: Vec::with_capacity(n),
    };

    for bus in model.bus_records() {
        vars.theta
            .push(lp.add_variable(model.theta_min(), model.theta_max()));
        vars.generation.push(lp.add_variable(bus.gen_min, bus.gen_max));
        vars.curtailment
            .push(lp.add_variable(bus.load_min, bus.load_max));
        vars.shed.push(lp.add_variable(0.0, bus.demand));
    }

    if let Some(reference) = model.reference_bus() {
        lp.add_constraint(vec![(vars.theta[reference.value()], 1.0)], Relation::Eq, 0.0);
    }

    // Nodal balance, shed moved to the left-hand side
    for bus in model.bus_records() {
        let i = bus.id.value();
        let mut terms = vec![
            (vars.generation[i], 1.0),
            (vars.curtailment[i], -1.0),
            (vars.shed[i], 1.0),
        ];
        let mut own_angle = 0.0;
        for &pos in model.incident_lines(bus.id) {
            if !active[pos] {
                continue;
            }
            let Some(line) = model.line(pos) else { continue };
            let j = line.other_end(bus.id).value();
            terms.push((vars.theta[j], line.susceptance));
            own_angle -= line.susceptance;
        }
        if own_angle != 0.0 {
            terms.push((vars.theta[i], own_angle));
        }
        lp.add_constraint(terms, Relation::Eq, bus.demand);
    }

    for (pos, line) in model.line_records().iter().enumerate() {
        if !active[pos] {
            continue;
        }
        let flow = vec![
            (vars.theta[line.from.value()], line.susceptance),
            (vars.theta[line.to.value()], -line.susceptance),
        ];
        lp.add_constraint(flow.clone(), Relation::LessEq, line.capacity);
        lp.add_constraint(flow, Relation::GreaterEq, -line.capacity);
    }

    for (i, bus) in model.bus_records().iter().enumerate() {
        lp.add_objective_term(vars.shed[i], 1.0);
        if bus.gen_cost != 0.0 && config.cost_weight != 0.0 {
            lp.add_objective_term(vars.generation[i], config.cost_weight * bus.gen_cost);
        }
    }

    (lp, vars)
}

fn extract(
    model: &GridModel,
    vars: &DispatchVariables,
    outcome: LpOutcome,
    disabled_lines: Vec<LineKey>,
) -> DispatchResult {
    let read = |ids: &[VarId]| -> Vec<f64> { ids.iter().map(|&v| outcome.value_or_zero(v)).collect() };
    let shed = read(&vars.shed);
    let total_shed = shed.iter().sum();
    let objective = match (&outcome.status, outcome.objective) {
        (LpStatus::Optimal, Some(value)) => value,
        _ => f64::INFINITY,
    };
    DispatchResult {
        objective,
        generation: read(&vars.generation),
        curtailment: read(&vars.curtailment),
        theta: read(&vars.theta),
        shed,
        total_shed,
        disabled_lines,
        reference_bus: model.reference_bus(),
        status: outcome.status,
    }
}

/// Dispatch with lines already resolved to positions in the model's line list.
pub(crate) fn solve_dispatch_positions(
    model: &GridModel,
    disabled: &[usize],
    backend: &dyn LpBackend,
    config: &DispatchConfig,
) -> GinResult<DispatchResult> {
    let mut active = vec![true; model.num_lines()];
    for &pos in disabled {
        if let Some(slot) = active.get_mut(pos) {
            *slot = false;
        }
    }
    let disabled_lines: Vec<LineKey> = model
        .line_records()
        .iter()
        .enumerate()
        .filter(|(pos, _)| !active[*pos])
        .map(|(_, line)| line.key())
        .collect();

    if model.num_buses() == 0 {
        return Ok(DispatchResult {
            status: LpStatus::Optimal,
            objective: 0.0,
            generation: Vec::new(),
            curtailment: Vec::new(),
            theta: Vec::new(),
            shed: Vec::new(),
            total_shed: 0.0,
            disabled_lines,
            reference_bus: None,
        });
    }

    let (lp, vars) = build_program(model, &active, config);
    let outcome = backend.solve(&lp)?;
    if !outcome.is_optimal() {
        warn!(
            backend = backend.id(),
            status = %outcome.status,
            disabled = %format_lines(&disabled_lines),
            "dispatch LP did not reach optimality"
        );
    }
    let result = extract(model, &vars, outcome, disabled_lines);
    debug!(
        status = %result.status,
        total_shed = result.total_shed,
        disabled = result.disabled_lines.len(),
        "dispatch solved"
    );
    Ok(result)
}

/// Solve the dispatch with `disabled` lines out of service.
///
/// Lines may be given in either orientation and any order; duplicates are
/// ignored. A pair that is not a line of `model` fails with
/// [`GinError::UnknownLine`](gin_core::GinError::UnknownLine). Infeasible or
/// unbounded LPs are not errors: they come back as a non-optimal `status`
/// with objective `+∞` and zero-filled values.
pub fn solve_dispatch(
    model: &GridModel,
    disabled: &[LineKey],
    backend: &dyn LpBackend,
    config: &DispatchConfig,
) -> GinResult<DispatchResult> {
    let positions = model.resolve_lines(disabled.iter().copied())?;
    solve_dispatch_positions(model, &positions, backend, config)
}

/// [`solve_dispatch`] with the default backend and settings.
pub fn dispatch(model: &GridModel, disabled: &[LineKey]) -> GinResult<DispatchResult> {
    solve_dispatch(model, disabled, &ClarabelBackend, &DispatchConfig::default())
}
