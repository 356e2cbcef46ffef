//! Grid model: buses, lines and per-bus operating bounds.
//!
//! All mutators validate their input and leave the model untouched on error.
//! Calling a mutator again for the same key overwrites the previous values
//! (last write wins).

use crate::{BusId, GinError, GinResult, LineKey};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Default angle bound (radians) applied symmetrically to every bus.
///
/// Wide on purpose: with MW-scale susceptances the angle range should only
/// bind when a caller narrows it explicitly.
pub const DEFAULT_ANGLE_LIMIT: f64 = 1e4;

/// Default system base (MVA). Carried for consumers, unused in constraints.
pub const DEFAULT_BASE_MVA: f64 = 100.0;

/// Per-bus operating data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bus {
    pub id: BusId,
    /// Power withdrawn at the bus (MW, ≥ 0)
    pub demand: f64,
    /// Generation lower bound (MW)
    pub gen_min: f64,
    /// Generation upper bound (MW)
    pub gen_max: f64,
    /// Linear generation cost, used only as a tie-break
    pub gen_cost: f64,
    /// Controllable-load curtailment lower bound (MW)
    pub load_min: f64,
    /// Controllable-load curtailment upper bound (MW, ≤ demand)
    pub load_max: f64,
}

impl Bus {
    fn new(id: BusId) -> Self {
        Self {
            id,
            demand: 0.0,
            gen_min: 0.0,
            gen_max: 0.0,
            gen_cost: 0.0,
            load_min: 0.0,
            load_max: 0.0,
        }
    }

    /// A bus whose generation interval is not the zero-width `[0, 0]`.
    pub fn has_generator(&self) -> bool {
        self.gen_min != 0.0 || self.gen_max != 0.0
    }
}

/// Transmission line record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Endpoint as first added
    pub from: BusId,
    /// Endpoint as first added
    pub to: BusId,
    /// Susceptance b > 0
    pub susceptance: f64,
    /// Thermal capacity (MW, ≥ 0)
    pub capacity: f64,
}

impl Line {
    pub fn key(&self) -> LineKey {
        LineKey::new(self.from, self.to)
    }

    /// The endpoint opposite `bus`.
    pub fn other_end(&self, bus: BusId) -> BusId {
        if self.from == bus {
            self.to
        } else {
            self.from
        }
    }
}

/// In-memory DC network.
#[derive(Debug, Clone)]
pub struct GridModel {
    buses: Vec<Bus>,
    lines: Vec<Line>,
    /// Incident line positions per bus
    adjacency: Vec<Vec<usize>>,
    line_index: HashMap<LineKey, usize>,
    theta_min: f64,
    theta_max: f64,
    base_mva: f64,
}

fn ensure_finite(what: &str, value: f64) -> GinResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(GinError::InvalidModel(format!("{what} must be finite, got {value}")))
    }
}

impl GridModel {
    /// Create a model with `n_buses` buses, no lines, default angle limits.
    pub fn new(n_buses: usize) -> Self {
        Self {
            buses: (0..n_buses).map(|i| Bus::new(BusId::new(i))).collect(),
            lines: Vec::new(),
            adjacency: vec![Vec::new(); n_buses],
            line_index: HashMap::new(),
            theta_min: -DEFAULT_ANGLE_LIMIT,
            theta_max: DEFAULT_ANGLE_LIMIT,
            base_mva: DEFAULT_BASE_MVA,
        }
    }

    /// Append a bus with default (all-zero) bounds.
    pub fn add_bus(&mut self) -> BusId {
        let id = BusId::new(self.buses.len());
        self.buses.push(Bus::new(id));
        self.adjacency.push(Vec::new());
        id
    }

    pub fn with_angle_limits(mut self, theta_min: f64, theta_max: f64) -> GinResult<Self> {
        self.set_angle_limits(theta_min, theta_max)?;
        Ok(self)
    }

    pub fn with_base_mva(mut self, base_mva: f64) -> GinResult<Self> {
        ensure_finite("base_mva", base_mva)?;
        if base_mva <= 0.0 {
            return Err(GinError::InvalidModel(format!(
                "base_mva must be positive, got {base_mva}"
            )));
        }
        self.base_mva = base_mva;
        Ok(self)
    }

    /// Set the angle range applied to every bus.
    pub fn set_angle_limits(&mut self, theta_min: f64, theta_max: f64) -> GinResult<()> {
        ensure_finite("theta_min", theta_min)?;
        ensure_finite("theta_max", theta_max)?;
        if theta_min > theta_max {
            return Err(GinError::InvalidModel(format!(
                "theta_min ({theta_min}) exceeds theta_max ({theta_max})"
            )));
        }
        self.theta_min = theta_min;
        self.theta_max = theta_max;
        Ok(())
    }

    /// Add (or overwrite) the line between `i` and `j`.
    ///
    /// Returns the line's position in [`GridModel::lines`]. An existing pair
    /// keeps its position and orientation; only `b` and `cap` are replaced.
    pub fn add_line(&mut self, i: BusId, j: BusId, b: f64, cap: f64) -> GinResult<usize> {
        self.check_bus(i)?;
        self.check_bus(j)?;
        if i == j {
            return Err(GinError::InvalidModel(format!(
                "line endpoints must differ (self loop at bus {i})"
            )));
        }
        ensure_finite("susceptance", b)?;
        ensure_finite("capacity", cap)?;
        if b <= 0.0 {
            return Err(GinError::InvalidModel(format!(
                "susceptance of line {i}-{j} must be positive, got {b}"
            )));
        }
        if cap < 0.0 {
            return Err(GinError::InvalidModel(format!(
                "capacity of line {i}-{j} must be non-negative, got {cap}"
            )));
        }

        let key = LineKey::new(i, j);
        if let Some(&pos) = self.line_index.get(&key) {
            debug!(line = %key, "overwriting existing line parameters");
            let line = &mut self.lines[pos];
            line.susceptance = b;
            line.capacity = cap;
            return Ok(pos);
        }

        let pos = self.lines.len();
        self.lines.push(Line {
            from: i,
            to: j,
            susceptance: b,
            capacity: cap,
        });
        self.adjacency[i.value()].push(pos);
        self.adjacency[j.value()].push(pos);
        self.line_index.insert(key, pos);
        Ok(pos)
    }

    /// Set the demand at a bus.
    ///
    /// Fails if the new demand is negative or would drop below the bus's
    /// current controllable-load ceiling.
    pub fn set_demand(&mut self, bus: BusId, p: f64) -> GinResult<()> {
        self.check_bus(bus)?;
        ensure_finite("demand", p)?;
        if p < 0.0 {
            return Err(GinError::InvalidModel(format!(
                "demand at bus {bus} must be non-negative, got {p}"
            )));
        }
        let record = &mut self.buses[bus.value()];
        if record.load_max > p {
            return Err(GinError::InvalidModel(format!(
                "demand {p} at bus {bus} is below its controllable-load ceiling {}",
                record.load_max
            )));
        }
        record.demand = p;
        Ok(())
    }

    /// Set generator bounds and linear cost at a bus.
    pub fn set_generator(&mut self, bus: BusId, gmin: f64, gmax: f64, cost: f64) -> GinResult<()> {
        self.check_bus(bus)?;
        ensure_finite("g_min", gmin)?;
        ensure_finite("g_max", gmax)?;
        ensure_finite("gen_cost", cost)?;
        if gmin > gmax {
            return Err(GinError::InvalidModel(format!(
                "g_min ({gmin}) exceeds g_max ({gmax}) at bus {bus}"
            )));
        }
        let record = &mut self.buses[bus.value()];
        record.gen_min = gmin;
        record.gen_max = gmax;
        record.gen_cost = cost;
        Ok(())
    }

    /// Set controllable-load curtailment bounds at a bus (`cmin ≤ cmax ≤ demand`).
    pub fn set_controllable_load(&mut self, bus: BusId, cmin: f64, cmax: f64) -> GinResult<()> {
        self.check_bus(bus)?;
        ensure_finite("c_min", cmin)?;
        ensure_finite("c_max", cmax)?;
        if cmin > cmax {
            return Err(GinError::InvalidModel(format!(
                "c_min ({cmin}) exceeds c_max ({cmax}) at bus {bus}"
            )));
        }
        let record = &mut self.buses[bus.value()];
        if cmax > record.demand {
            return Err(GinError::InvalidModel(format!(
                "c_max ({cmax}) exceeds demand ({}) at bus {bus}",
                record.demand
            )));
        }
        record.load_min = cmin;
        record.load_max = cmax;
        Ok(())
    }

    fn check_bus(&self, bus: BusId) -> GinResult<()> {
        if bus.value() < self.buses.len() {
            Ok(())
        } else {
            Err(GinError::unknown_bus(bus, self.buses.len()))
        }
    }

    pub fn num_buses(&self) -> usize {
        self.buses.len()
    }

    pub fn num_lines(&self) -> usize {
        self.lines.len()
    }

    /// Bus ids in iteration order.
    pub fn buses(&self) -> Vec<BusId> {
        self.buses.iter().map(|b| b.id).collect()
    }

    /// Line keys in insertion order.
    pub fn lines(&self) -> Vec<LineKey> {
        self.lines.iter().map(Line::key).collect()
    }

    pub fn bus_records(&self) -> &[Bus] {
        &self.buses
    }

    pub fn line_records(&self) -> &[Line] {
        &self.lines
    }

    pub fn bus(&self, id: BusId) -> GinResult<&Bus> {
        self.buses
            .get(id.value())
            .ok_or_else(|| GinError::unknown_bus(id, self.buses.len()))
    }

    pub fn line(&self, pos: usize) -> Option<&Line> {
        self.lines.get(pos)
    }

    /// Position of a line in [`GridModel::lines`], either orientation.
    pub fn line_position(&self, key: LineKey) -> Option<usize> {
        self.line_index.get(&key).copied()
    }

    pub fn contains_line(&self, key: LineKey) -> bool {
        self.line_index.contains_key(&key)
    }

    /// Map line keys to positions, failing on the first unknown pair.
    pub fn resolve_lines<I>(&self, keys: I) -> GinResult<Vec<usize>>
    where
        I: IntoIterator<Item = LineKey>,
    {
        keys.into_iter()
            .map(|key| self.line_position(key).ok_or(GinError::UnknownLine(key)))
            .collect()
    }

    /// Positions of the lines touching `bus` (empty for unknown buses).
    pub fn incident_lines(&self, bus: BusId) -> &[usize] {
        self.adjacency
            .get(bus.value())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Angle reference: the first bus in iteration order.
    pub fn reference_bus(&self) -> Option<BusId> {
        self.buses.first().map(|b| b.id)
    }

    pub fn theta_min(&self) -> f64 {
        self.theta_min
    }

    pub fn theta_max(&self) -> f64 {
        self.theta_max
    }

    pub fn base_mva(&self) -> f64 {
        self.base_mva
    }

    pub fn total_demand(&self) -> f64 {
        self.buses.iter().map(|b| b.demand).sum()
    }

    pub fn total_gen_capacity(&self) -> f64 {
        self.buses.iter().map(|b| b.gen_max).sum()
    }
}
