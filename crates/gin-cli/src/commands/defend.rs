use anyhow::{Context, Result};
use gin_algo::defend;
use gin_cli::OutputFormat;
use std::path::Path;

use crate::commands::util::{load_grid, print_json, write_islands, Session};

pub fn handle(
    session: &Session,
    grid: &Path,
    attack_budget: usize,
    defend_budget: usize,
    time_limit: Option<f64>,
    format: OutputFormat,
) -> Result<()> {
    let model = load_grid(grid)?;
    let ctx = session.context(time_limit);
    let result = defend(&model, attack_budget, defend_budget, &ctx)
        .context("running defense search")?;

    match format {
        OutputFormat::Plain => {
            print!("{}", result.summary());
            write_islands(&model, &result.worst_case.dispatch)?;
        }
        OutputFormat::Json => print_json(&result)?,
    }
    Ok(())
}
