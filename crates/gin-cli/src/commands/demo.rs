use anyhow::{Context, Result};
use gin_algo::{attack, defend, format_lines, solve_dispatch, AttackResult, DefenseResult, DispatchResult};
use gin_cli::OutputFormat;
use gin_core::{random_grid, GridSnapshot, RandomGridConfig};
use serde::Serialize;
use tracing::info;

use crate::commands::util::{print_json, Session};

#[derive(Debug, Serialize)]
struct DemoReport {
    grid: GridSnapshot,
    baseline: DispatchResult,
    attack: AttackResult,
    defense: DefenseResult,
}

pub struct DemoArgs {
    pub buses: Option<usize>,
    pub density: Option<f64>,
    pub seed: Option<u64>,
    pub attack_budget: usize,
    pub defend_budget: usize,
}

impl DemoArgs {
    /// Generator settings: flags given on the command line win over `base`.
    fn grid_config(&self, base: &RandomGridConfig) -> RandomGridConfig {
        RandomGridConfig {
            n_buses: self.buses.unwrap_or(base.n_buses),
            density: self.density.unwrap_or(base.density),
            seed: self.seed.unwrap_or(base.seed),
            ..base.clone()
        }
    }
}

pub fn handle(session: &Session, args: &DemoArgs, format: OutputFormat) -> Result<()> {
    let grid_config = args.grid_config(&session.config.generate);
    let model = random_grid(&grid_config).context("generating demo grid")?;
    info!(
        buses = model.num_buses(),
        lines = model.num_lines(),
        "demo grid ready"
    );

    let ctx = session.context(None);
    let baseline = solve_dispatch(&model, &[], ctx.backend, &ctx.dispatch)
        .context("solving baseline dispatch")?;
    let attacked = attack(&model, args.attack_budget, &ctx).context("running attack search")?;
    let defended = defend(&model, args.attack_budget, args.defend_budget, &ctx)
        .context("running defense search")?;

    match format {
        OutputFormat::Plain => {
            println!(
                "Grid: {} buses, {} lines, {:.1} MW demand",
                model.num_buses(),
                model.num_lines(),
                model.total_demand()
            );
            println!("Baseline shed: {:.3} MW", baseline.total_shed);
            println!(
                "Attack (k={}): shed {:.3} MW by disabling {}",
                args.attack_budget,
                attacked.total_shed(),
                format_lines(attacked.disabled_lines())
            );
            println!(
                "Defense (d={}): protect {}, worst-case shed {:.3} MW",
                args.defend_budget,
                format_lines(&defended.defended),
                defended.worst_case.total_shed()
            );
        }
        OutputFormat::Json => print_json(&DemoReport {
            grid: model.export(),
            baseline,
            attack: attacked,
            defense: defended,
        })?,
    }
    Ok(())
}
