use anyhow::{Context, Result};
use gin_algo::{format_lines, DispatchResult, LpBackend, SearchContext};
use gin_cli::{Cli, GinConfig};
use gin_core::{islands, GridModel};
use rayon::ThreadPoolBuilder;
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;
use tabwriter::TabWriter;
use tracing::warn;

fn thread_count(spec: &str) -> usize {
    if spec.eq_ignore_ascii_case("auto") {
        return num_cpus::get();
    }
    spec.parse().unwrap_or_else(|_| {
        let fallback = num_cpus::get();
        warn!(threads = spec, fallback, "invalid --threads value; using all cores");
        fallback
    })
}

pub fn configure_threads(spec: &str) {
    let count = thread_count(spec);
    let _ = ThreadPoolBuilder::new().num_threads(count).build_global();
}

/// Settings resolved from the config file plus command-line overrides.
pub struct Session {
    pub config: GinConfig,
    pub backend: Box<dyn LpBackend>,
}

impl Session {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = GinConfig::load(cli.config.as_deref())?;
        if let Some(kind) = cli.solver {
            config.solver.backend = kind;
        }
        let backend = config.solver.backend.build();
        Ok(Self { config, backend })
    }

    pub fn context(&self, time_limit: Option<f64>) -> SearchContext<'_> {
        let mut search = self.config.search;
        if time_limit.is_some() {
            search.time_limit_secs = time_limit;
        }
        SearchContext::new(self.backend.as_ref())
            .with_dispatch(self.config.dispatch)
            .with_search(search)
    }
}

pub fn load_grid(path: &Path) -> Result<GridModel> {
    GridModel::read_json(path).with_context(|| format!("loading grid from {}", path.display()))
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serializing output")?;
    println!("{text}");
    Ok(())
}

/// Per-bus table of a dispatch.
pub fn write_bus_table(model: &GridModel, result: &DispatchResult) -> Result<()> {
    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "BUS\tDEMAND\tGEN\tCURTAIL\tSHED\tTHETA")?;
    for bus in model.bus_records() {
        let i = bus.id.value();
        writeln!(
            writer,
            "{}\t{:.3}\t{:.3}\t{:.3}\t{:.3}\t{:.4}",
            bus.id, bus.demand, result.generation[i], result.curtailment[i], result.shed[i], result.theta[i]
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// One line per island of the topology left by `result`'s disabled lines.
pub fn write_islands(model: &GridModel, result: &DispatchResult) -> Result<()> {
    if result.disabled_lines.is_empty() {
        return Ok(());
    }
    let analysis = islands(model, &result.disabled_lines)?;
    println!(
        "Islands after removing {}: {}",
        format_lines(&result.disabled_lines),
        analysis.count()
    );
    for (index, members) in analysis.islands.iter().enumerate() {
        let buses: Vec<String> = members.iter().map(ToString::to_string).collect();
        let shed: f64 = members.iter().map(|b| result.shed[b.value()]).sum();
        let generation: f64 = members.iter().map(|b| result.generation[b.value()]).sum();
        println!(
            "  #{index}: buses [{}], generation {generation:.3} MW, shed {shed:.3} MW",
            buses.join(", ")
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_count_parses_or_falls_back() {
        assert_eq!(thread_count("3"), 3);
        assert_eq!(thread_count("auto"), num_cpus::get());
        assert_eq!(thread_count("AUTO"), num_cpus::get());
        assert_eq!(thread_count("abc"), num_cpus::get());
    }
}
