//! Read-only export format for external consumers (plotting, persistence).
//!
//! A [`GridSnapshot`] is a plain, serde-friendly copy of a [`GridModel`]:
//! per-bus vectors indexed by bus id and the line list in stored order.
//! [`GridModel::from_snapshot`] rebuilds a model through the regular mutators,
//! so a hand-edited snapshot is validated like any other construction.

use crate::{BusId, GinError, GinResult, GridModel};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSnapshot {
    pub from: usize,
    pub to: usize,
    pub susceptance: f64,
    pub capacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub buses: Vec<usize>,
    pub lines: Vec<LineSnapshot>,
    pub g_min: Vec<f64>,
    pub g_max: Vec<f64>,
    pub c_min: Vec<f64>,
    pub c_max: Vec<f64>,
    pub demand: Vec<f64>,
    #[serde(default)]
    pub gen_cost: Vec<f64>,
    pub theta_min: f64,
    pub theta_max: f64,
    #[serde(default = "default_base_mva")]
    pub base_mva: f64,
}

fn default_base_mva() -> f64 {
    crate::DEFAULT_BASE_MVA
}

impl GridModel {
    /// Export a read-only snapshot of every bus and line.
    pub fn export(&self) -> GridSnapshot {
        let buses = self.bus_records();
        GridSnapshot {
            buses: buses.iter().map(|b| b.id.value()).collect(),
            lines: self
                .line_records()
                .iter()
                .map(|l| LineSnapshot {
                    from: l.from.value(),
                    to: l.to.value(),
                    susceptance: l.susceptance,
                    capacity: l.capacity,
                })
                .collect(),
            g_min: buses.iter().map(|b| b.gen_min).collect(),
            g_max: buses.iter().map(|b| b.gen_max).collect(),
            c_min: buses.iter().map(|b| b.load_min).collect(),
            c_max: buses.iter().map(|b| b.load_max).collect(),
            demand: buses.iter().map(|b| b.demand).collect(),
            gen_cost: buses.iter().map(|b| b.gen_cost).collect(),
            theta_min: self.theta_min(),
            theta_max: self.theta_max(),
            base_mva: self.base_mva(),
        }
    }

    /// Rebuild a model from a snapshot, re-validating every value.
    pub fn from_snapshot(snapshot: &GridSnapshot) -> GinResult<Self> {
        let n = snapshot.buses.len();
        if let Some(pos) = snapshot.buses.iter().enumerate().position(|(pos, id)| pos != *id) {
            let id = snapshot.buses[pos];
            return Err(GinError::InvalidModel(format!(
                "snapshot bus ids must be dense and ordered; found {id} at position {pos}"
            )));
        }
        for (name, values) in [
            ("g_min", &snapshot.g_min),
            ("g_max", &snapshot.g_max),
            ("c_min", &snapshot.c_min),
            ("c_max", &snapshot.c_max),
            ("demand", &snapshot.demand),
        ] {
            if values.len() != n {
                return Err(GinError::InvalidModel(format!(
                    "snapshot field {name} has {} entries for {n} buses",
                    values.len()
                )));
            }
        }
        if !snapshot.gen_cost.is_empty() && snapshot.gen_cost.len() != n {
            return Err(GinError::InvalidModel(format!(
                "snapshot field gen_cost has {} entries for {n} buses",
                snapshot.gen_cost.len()
            )));
        }

        let mut model = GridModel::new(n)
            .with_angle_limits(snapshot.theta_min, snapshot.theta_max)?
            .with_base_mva(snapshot.base_mva)?;
        for i in 0..n {
            let bus = BusId::new(i);
            let cost = snapshot.gen_cost.get(i).copied().unwrap_or(0.0);
            model.set_demand(bus, snapshot.demand[i])?;
            model.set_generator(bus, snapshot.g_min[i], snapshot.g_max[i], cost)?;
            model.set_controllable_load(bus, snapshot.c_min[i], snapshot.c_max[i])?;
        }
        for line in &snapshot.lines {
            model.add_line(
                BusId::new(line.from),
                BusId::new(line.to),
                line.susceptance,
                line.capacity,
            )?;
        }
        Ok(model)
    }

    /// Write the snapshot as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> GinResult<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &self.export())?;
        Ok(())
    }

    /// Load a model from a JSON snapshot file.
    pub fn read_json(path: &Path) -> GinResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        let snapshot: GridSnapshot = serde_json::from_reader(reader)?;
        Self::from_snapshot(&snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GridModel {
        let mut model = GridModel::new(3).with_angle_limits(-1.0, 1.0).unwrap();
        model.add_line(BusId::new(2), BusId::new(0), 12.0, 80.0).unwrap();
        model.add_line(BusId::new(0), BusId::new(1), 10.0, 100.0).unwrap();
        model.set_demand(BusId::new(0), 50.0).unwrap();
        model.set_controllable_load(BusId::new(0), 0.0, 20.0).unwrap();
        model.set_generator(BusId::new(1), 0.0, 100.0, 7.5).unwrap();
        model
    }

    #[test]
    fn export_preserves_order_and_orientation() {
        let snapshot = sample().export();
        assert_eq!(snapshot.buses, vec![0, 1, 2]);
        assert_eq!(snapshot.lines[0].from, 2);
        assert_eq!(snapshot.lines[0].to, 0);
        assert_eq!(snapshot.demand, vec![50.0, 0.0, 0.0]);
        assert_eq!(snapshot.c_max, vec![20.0, 0.0, 0.0]);
        assert_eq!(snapshot.g_max, vec![0.0, 100.0, 0.0]);
        assert_eq!(snapshot.gen_cost[1], 7.5);
        assert_eq!(snapshot.theta_max, 1.0);
    }

    #[test]
    fn snapshot_rebuilds_equivalent_model() {
        let model = sample();
        let rebuilt = GridModel::from_snapshot(&model.export()).unwrap();
        assert_eq!(rebuilt.export(), model.export());
        assert_eq!(rebuilt.lines(), model.lines());
    }

    #[test]
    fn snapshot_with_bad_lengths_is_rejected() {
        let mut snapshot = sample().export();
        snapshot.demand.pop();
        assert!(matches!(
            GridModel::from_snapshot(&snapshot),
            Err(GinError::InvalidModel(_))
        ));
    }

    #[test]
    fn snapshot_with_sparse_ids_is_rejected() {
        let mut snapshot = sample().export();
        snapshot.buses = vec![0, 2, 3];
        assert!(GridModel::from_snapshot(&snapshot).is_err());
    }

    #[test]
    fn snapshot_json_without_optional_fields() {
        let json = r#"{
            "buses": [0, 1],
            "lines": [{"from": 0, "to": 1, "susceptance": 10.0, "capacity": 5.0}],
            "g_min": [0.0, 0.0], "g_max": [10.0, 0.0],
            "c_min": [0.0, 0.0], "c_max": [0.0, 0.0],
            "demand": [0.0, 4.0],
            "theta_min": -1.0, "theta_max": 1.0
        }"#;
        let snapshot: GridSnapshot = serde_json::from_str(json).unwrap();
        let model = GridModel::from_snapshot(&snapshot).unwrap();
        assert_eq!(model.base_mva(), crate::DEFAULT_BASE_MVA);
        assert_eq!(model.bus(BusId::new(0)).unwrap().gen_cost, 0.0);
    }
}
