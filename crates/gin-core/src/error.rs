//! Unified error type for the gin workspace
//!
//! [`GinError`] covers model construction, solver plumbing and search limits.
//! Infeasible or unbounded linear programs are *not* errors: they are reported
//! through the dispatch status so enumeration can keep going.
//!
//! # Example
//!
//! ```
//! use gin_core::{BusId, GinError, GinResult, GridModel};
//!
//! fn build() -> GinResult<GridModel> {
//!     let mut model = GridModel::new(2);
//!     model.add_line(BusId::new(0), BusId::new(1), 10.0, 100.0)?;
//!     Ok(model)
//! }
//!
//! assert!(build().is_ok());
//! let err = GridModel::new(1)
//!     .add_line(BusId::new(0), BusId::new(0), 1.0, 1.0)
//!     .unwrap_err();
//! assert!(matches!(err, GinError::InvalidModel(_)));
//! ```

use thiserror::Error;

use crate::{BusId, LineKey};

/// Unified error type for all gin operations.
#[derive(Error, Debug)]
pub enum GinError {
    /// A mutator was asked to break a model invariant (unknown bus, self loop,
    /// inverted bounds, non-finite values...)
    #[error("Invalid model: {0}")]
    InvalidModel(String),

    /// A disabled or protected line does not exist in the model
    #[error("Unknown line {0}")]
    UnknownLine(LineKey),

    /// The LP backend could not be driven at all (as opposed to reporting
    /// infeasibility through a status)
    #[error("Solver error: {0}")]
    Solver(String),

    /// A whole-search time budget was exhausted
    #[error("Search time limit exceeded after {evaluated} dispatch evaluations")]
    TimeLimit { evaluated: usize },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors (snapshot files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

impl GinError {
    pub(crate) fn unknown_bus(bus: BusId, n_buses: usize) -> Self {
        GinError::InvalidModel(format!(
            "bus {} does not exist (model has {} buses)",
            bus.value(),
            n_buses
        ))
    }
}

/// Convenience type alias for Results using GinError.
pub type GinResult<T> = Result<T, GinError>;

impl From<anyhow::Error> for GinError {
    fn from(err: anyhow::Error) -> Self {
        GinError::Other(err.to_string())
    }
}

impl From<serde_json::Error> for GinError {
    fn from(err: serde_json::Error) -> Self {
        GinError::Parse(err.to_string())
    }
}
