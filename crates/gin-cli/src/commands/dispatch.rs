use anyhow::{Context, Result};
use gin_algo::{solve_dispatch, validate_dispatch, DispatchResult, DispatchViolations};
use gin_cli::OutputFormat;
use gin_core::LineKey;
use serde::Serialize;
use std::path::Path;

use crate::commands::util::{load_grid, print_json, write_bus_table, write_islands, Session};

#[derive(Debug, Serialize)]
struct DispatchReport<'a> {
    #[serde(flatten)]
    result: &'a DispatchResult,
    line_flows: Vec<f64>,
    violations: DispatchViolations,
}

pub fn handle(
    session: &Session,
    grid: &Path,
    disabled: &[LineKey],
    format: OutputFormat,
) -> Result<()> {
    let model = load_grid(grid)?;
    let result = solve_dispatch(
        &model,
        disabled,
        session.backend.as_ref(),
        &session.config.dispatch,
    )
    .context("solving dispatch")?;
    let violations = validate_dispatch(&model, &result);

    match format {
        OutputFormat::Plain => {
            print!("{}", result.summary());
            println!(
                "Max Balance Residual: {:.2e} MW",
                violations.max_balance_violation
            );
            write_bus_table(&model, &result)?;
            write_islands(&model, &result)?;
        }
        OutputFormat::Json => print_json(&DispatchReport {
            line_flows: result.line_flows(&model),
            result: &result,
            violations,
        })?,
    }
    Ok(())
}
