//! # gin-core: Grid model for line-interdiction studies
//!
//! Provides the in-memory DC network model that the dispatch, attack and
//! defense searches in `gin-algo` read from.
//!
//! ## Design
//!
//! - **Buses** are dense indices `0..N-1` ([`BusId`]) backed by explicit
//!   [`Bus`] records whose fields are all populated at construction (no
//!   implicit map defaults).
//! - **Lines** are an ordered list of [`Line`] records plus a derived adjacency
//!   index (incident line positions per bus) maintained as lines are appended.
//!   A line is identified by its unordered bus pair ([`LineKey`]); parallel
//!   lines are not supported.
//! - The model is **append-only** and never mutated by solvers: disabling a
//!   line is a query-time exclusion set, not a model edit.
//!
//! ## Quick Start
//!
//! ```
//! use gin_core::{BusId, GridModel};
//!
//! let mut model = GridModel::new(3);
//! model.add_line(BusId::new(0), BusId::new(1), 10.0, 100.0)?;
//! model.add_line(BusId::new(1), BusId::new(2), 10.0, 100.0)?;
//! model.add_line(BusId::new(2), BusId::new(0), 10.0, 100.0)?;
//! model.set_demand(BusId::new(0), 50.0)?;
//! model.set_generator(BusId::new(1), 0.0, 100.0, 0.0)?;
//!
//! assert_eq!(model.num_lines(), 3);
//! assert_eq!(model.incident_lines(BusId::new(0)).len(), 2);
//! # Ok::<(), gin_core::GinError>(())
//! ```
//!
//! ## Modules
//!
//! - [`model`] - [`GridModel`] and its invariant-preserving mutators
//! - [`snapshot`] - read-only export format ([`GridSnapshot`]) and JSON persistence
//! - [`graph_utils`] - island detection on the active topology
//! - [`random`] - seeded random grid generator (feature `random`)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod error;
pub mod graph_utils;
pub mod model;
#[cfg(feature = "random")]
pub mod random;
pub mod snapshot;

pub use error::{GinError, GinResult};
pub use graph_utils::{islands, IslandAnalysis};
pub use model::{Bus, GridModel, Line, DEFAULT_ANGLE_LIMIT, DEFAULT_BASE_MVA};
#[cfg(feature = "random")]
pub use random::{random_grid, RandomGridConfig};
pub use snapshot::{GridSnapshot, LineSnapshot};

/// Dense bus index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusId(usize);

impl BusId {
    #[inline]
    pub fn new(value: usize) -> Self {
        BusId(value)
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl fmt::Display for BusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unordered bus pair identifying a line.
///
/// Normalized so that `from < to`; `LineKey::new(a, b) == LineKey::new(b, a)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LineKey {
    from: BusId,
    to: BusId,
}

impl LineKey {
    pub fn new(a: BusId, b: BusId) -> Self {
        if a <= b {
            LineKey { from: a, to: b }
        } else {
            LineKey { from: b, to: a }
        }
    }

    /// Shorthand for raw indices, handy in tests and CLI parsing.
    pub fn between(a: usize, b: usize) -> Self {
        Self::new(BusId::new(a), BusId::new(b))
    }

    /// Lower-indexed endpoint.
    pub fn from(&self) -> BusId {
        self.from
    }

    /// Higher-indexed endpoint.
    pub fn to(&self) -> BusId {
        self.to
    }

    pub fn touches(&self, bus: BusId) -> bool {
        self.from == bus || self.to == bus
    }
}

impl fmt::Display for LineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from.0, self.to.0)
    }
}

impl FromStr for LineKey {
    type Err = GinError;

    /// Parses `"i-j"` (either orientation).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (a, b) = s
            .split_once('-')
            .ok_or_else(|| GinError::Parse(format!("expected line as 'i-j', got '{s}'")))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<usize>()
                .map_err(|e| GinError::Parse(format!("invalid bus index '{part}': {e}")))
        };
        Ok(LineKey::between(parse(a)?, parse(b)?))
    }
}
