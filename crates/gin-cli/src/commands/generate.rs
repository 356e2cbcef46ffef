use anyhow::{Context, Result};
use gin_cli::OutputFormat;
use gin_core::{random_grid, RandomGridConfig};
use std::path::Path;
use tracing::info;

use crate::commands::util::print_json;

pub fn handle(
    base: &RandomGridConfig,
    buses: Option<usize>,
    density: Option<f64>,
    seed: Option<u64>,
    out: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let config = RandomGridConfig {
        n_buses: buses.unwrap_or(base.n_buses),
        density: density.unwrap_or(base.density),
        seed: seed.unwrap_or(base.seed),
        ..base.clone()
    };
    let model = random_grid(&config).context("generating random grid")?;
    info!(
        buses = model.num_buses(),
        lines = model.num_lines(),
        seed = config.seed,
        "generated grid"
    );

    match out {
        Some(path) => {
            model
                .write_json(path)
                .with_context(|| format!("writing grid to {}", path.display()))?;
            match format {
                OutputFormat::Plain => println!(
                    "Grid written to {}: {} buses, {} lines, {:.1} MW demand, {:.1} MW generation capacity",
                    path.display(),
                    model.num_buses(),
                    model.num_lines(),
                    model.total_demand(),
                    model.total_gen_capacity()
                ),
                OutputFormat::Json => print_json(&serde_json::json!({
                    "path": path,
                    "buses": model.num_buses(),
                    "lines": model.num_lines(),
                }))?,
            }
        }
        None => print_json(&model.export())?,
    }
    Ok(())
}
