use anyhow::{Context, Result};
use gin_algo::{attack, attack_restricted};
use gin_cli::OutputFormat;
use gin_core::LineKey;
use std::path::Path;

use crate::commands::util::{load_grid, print_json, write_islands, Session};

pub fn handle(
    session: &Session,
    grid: &Path,
    budget: usize,
    candidates: &[LineKey],
    time_limit: Option<f64>,
    format: OutputFormat,
) -> Result<()> {
    let model = load_grid(grid)?;
    let ctx = session.context(time_limit);
    let result = if candidates.is_empty() {
        attack(&model, budget, &ctx)
    } else {
        attack_restricted(&model, budget, candidates, &ctx)
    }
    .context("running attack search")?;

    match format {
        OutputFormat::Plain => {
            print!("{}", result.summary());
            write_islands(&model, &result.dispatch)?;
        }
        OutputFormat::Json => print_json(&result)?,
    }
    Ok(())
}
