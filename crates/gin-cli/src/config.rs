//! Optional TOML configuration for the `gin` binary.
//!
//! Every section is optional and partial files are fine; unspecified values
//! keep their library defaults. Command-line flags override the file.
//!
//! ```toml
//! [dispatch]
//! cost_weight = 0.001
//!
//! [search]
//! parallel = true
//! chunk_size = 64
//! tie_tolerance = 1e-6
//! time_limit_secs = 30.0
//!
//! [generate]
//! n_buses = 8
//! density = 0.4
//! seed = 2
//!
//! [solver]
//! backend = "clarabel"
//! ```

use anyhow::{Context, Result};
use gin_algo::{DispatchConfig, LpBackendKind, SearchConfig};
use gin_core::RandomGridConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GinConfig {
    pub dispatch: DispatchConfig,
    pub search: SearchConfig,
    pub generate: RandomGridConfig,
    pub solver: SolverSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSection {
    pub backend: LpBackendKind,
}

impl GinConfig {
    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Load `path` when given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config: GinConfig = toml::from_str("").unwrap();
        assert_eq!(config.dispatch, DispatchConfig::default());
        assert_eq!(config.search, SearchConfig::default());
        assert_eq!(config.solver.backend, LpBackendKind::Clarabel);
        assert_eq!(config.generate.n_buses, RandomGridConfig::default().n_buses);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: GinConfig = toml::from_str(
            r#"
            [search]
            parallel = false
            time_limit_secs = 2.5

            [generate]
            seed = 42
            "#,
        )
        .unwrap();
        assert!(!config.search.parallel);
        assert_eq!(config.search.chunk_size, 64);
        assert_eq!(config.search.time_limit_secs, Some(2.5));
        assert_eq!(config.generate.seed, 42);
        assert_eq!(config.generate.density, RandomGridConfig::default().density);
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let parsed = toml::from_str::<GinConfig>("[solver]\nbackend = \"cplex\"\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = GinConfig::load(Some(Path::new("/nonexistent/gin.toml"))).unwrap_err();
        assert!(err.to_string().contains("reading config"));
    }
}
