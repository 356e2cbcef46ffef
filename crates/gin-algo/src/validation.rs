//! Constraint-violation metrics for a solved dispatch.
//!
//! Recomputes every row of the dispatch LP from the reported values, so a
//! result can be checked independently of the backend that produced it.

use crate::dispatch::DispatchResult;
use gin_core::{BusId, GridModel, LineKey};
use serde::Serialize;

/// Worst violations found in a dispatch (all MW unless noted).
#[derive(Debug, Clone, Default, Serialize)]
pub struct DispatchViolations {
    /// Maximum nodal power balance residual
    pub max_balance_violation: f64,
    /// Bus with the largest balance residual
    pub worst_balance_bus: Option<BusId>,
    /// Maximum excursion outside generation, curtailment or shed bounds
    pub max_bound_violation: f64,
    /// Maximum excursion outside angle bounds (rad)
    pub max_angle_violation: f64,
    /// Maximum flow above capacity on an active line
    pub max_line_violation: f64,
    /// Line with the largest overload
    pub worst_line: Option<LineKey>,
    /// |θ_ref| (rad)
    pub reference_angle: f64,
}

impl DispatchViolations {
    /// Check if all violations are within tolerance
    pub fn within_tolerance(&self, tol: f64) -> bool {
        self.max_balance_violation <= tol
            && self.max_bound_violation <= tol
            && self.max_angle_violation <= tol
            && self.max_line_violation <= tol
            && self.reference_angle <= tol
    }
}

fn excursion(value: f64, lower: f64, upper: f64) -> f64 {
    (lower - value).max(value - upper).max(0.0)
}

/// Measure how far `result` is from satisfying the dispatch constraints of
/// `model` with its own disabled lines removed.
pub fn validate_dispatch(model: &GridModel, result: &DispatchResult) -> DispatchViolations {
    let mut metrics = DispatchViolations::default();
    let value = |values: &[f64], i: usize| values.get(i).copied().unwrap_or(0.0);
    let flows = result.line_flows(model);

    // Net injection into each bus through active lines
    let mut inflow = vec![0.0; model.num_buses()];
    for (pos, line) in model.line_records().iter().enumerate() {
        if result.is_disabled(line.key()) {
            continue;
        }
        let flow = flows[pos];
        inflow[line.from.value()] -= flow;
        inflow[line.to.value()] += flow;

        let overload = flow.abs() - line.capacity;
        if overload > metrics.max_line_violation {
            metrics.max_line_violation = overload;
            metrics.worst_line = Some(line.key());
        }
    }

    for bus in model.bus_records() {
        let i = bus.id.value();
        let g = value(&result.generation, i);
        let c = value(&result.curtailment, i);
        let shed = value(&result.shed, i);
        let theta = value(&result.theta, i);

        let residual = (g - c + inflow[i] - (bus.demand - shed)).abs();
        if residual > metrics.max_balance_violation {
            metrics.max_balance_violation = residual;
            metrics.worst_balance_bus = Some(bus.id);
        }

        let bound = excursion(g, bus.gen_min, bus.gen_max)
            .max(excursion(c, bus.load_min, bus.load_max))
            .max(excursion(shed, 0.0, bus.demand));
        metrics.max_bound_violation = metrics.max_bound_violation.max(bound);
        metrics.max_angle_violation = metrics
            .max_angle_violation
            .max(excursion(theta, model.theta_min(), model.theta_max()));
    }

    if let Some(reference) = result.reference_bus {
        metrics.reference_angle = value(&result.theta, reference.value()).abs();
    }
    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lp::LpStatus;

    fn line_model() -> GridModel {
        let mut model = GridModel::new(2);
        model.add_line(BusId::new(0), BusId::new(1), 10.0, 30.0).unwrap();
        model.set_generator(BusId::new(0), 0.0, 100.0, 0.0).unwrap();
        model.set_demand(BusId::new(1), 40.0).unwrap();
        model
    }

    fn result(generation: f64, theta1: f64, shed1: f64) -> DispatchResult {
        DispatchResult {
            status: LpStatus::Optimal,
            objective: shed1,
            generation: vec![generation, 0.0],
            curtailment: vec![0.0, 0.0],
            theta: vec![0.0, theta1],
            shed: vec![0.0, shed1],
            total_shed: shed1,
            disabled_lines: Vec::new(),
            reference_bus: Some(BusId::new(0)),
        }
    }

    #[test]
    fn consistent_dispatch_has_no_violations() {
        let model = line_model();
        // 30 MW over the line (θ1 = -3), 10 MW shed at bus 1
        let metrics = validate_dispatch(&model, &result(30.0, -3.0, 10.0));
        assert!(metrics.within_tolerance(1e-9), "{metrics:?}");
        assert!(metrics.worst_balance_bus.is_none());
    }

    #[test]
    fn overload_and_imbalance_are_reported() {
        let model = line_model();
        // 40 MW over a 30 MW line
        let metrics = validate_dispatch(&model, &result(40.0, -4.0, 0.0));
        assert!((metrics.max_line_violation - 10.0).abs() < 1e-9);
        assert_eq!(metrics.worst_line, Some(LineKey::between(0, 1)));
        assert!(metrics.max_balance_violation < 1e-9);

        let metrics = validate_dispatch(&model, &result(35.0, -3.0, 10.0));
        assert!((metrics.max_balance_violation - 5.0).abs() < 1e-9);
        assert_eq!(metrics.worst_balance_bus, Some(BusId::new(0)));
        assert!(!metrics.within_tolerance(1e-6));
    }

    #[test]
    fn bound_excursions_are_reported() {
        let model = line_model();
        let metrics = validate_dispatch(&model, &result(30.0, -3.0, 50.0));
        assert!((metrics.max_bound_violation - 10.0).abs() < 1e-9);
    }

    #[test]
    fn disabled_lines_carry_no_flow() {
        let model = line_model();
        let mut r = result(0.0, -3.0, 40.0);
        r.disabled_lines = vec![LineKey::between(0, 1)];
        let metrics = validate_dispatch(&model, &r);
        assert!(metrics.within_tolerance(1e-9), "{metrics:?}");
    }
}
