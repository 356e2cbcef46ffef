use clap::{Parser, Subcommand, ValueEnum, ValueHint};
use gin_algo::LpBackendKind;
use gin_core::LineKey;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gin", author, version, about = "Line interdiction analysis for DC power grids", long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info", global = true)]
    pub log_level: tracing::Level,

    /// TOML file with [dispatch], [search], [generate] and [solver] sections
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Worker threads for subset evaluation ("auto" or a number)
    #[arg(long, default_value = "auto", global = true)]
    pub threads: String,

    /// LP backend (overrides [solver] backend)
    #[arg(long, global = true)]
    pub solver: Option<LpBackendKind>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Plain, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a seeded random grid
    Generate {
        /// Number of buses
        #[arg(long)]
        buses: Option<usize>,
        /// Probability that any bus pair is connected
        #[arg(long)]
        density: Option<f64>,
        /// RNG seed
        #[arg(long)]
        seed: Option<u64>,
        /// Write the grid snapshot here instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: Option<PathBuf>,
    },
    /// Solve the load-shedding dispatch
    Dispatch {
        /// Grid snapshot (JSON)
        #[arg(long, value_hint = ValueHint::FilePath)]
        grid: PathBuf,
        /// Line to take out of service, as "i-j" (repeatable)
        #[arg(long = "disable", value_name = "LINE")]
        disabled: Vec<LineKey>,
    },
    /// Find the line outages that maximize load shed
    Attack {
        /// Grid snapshot (JSON)
        #[arg(long, value_hint = ValueHint::FilePath)]
        grid: PathBuf,
        /// Maximum number of lines the attacker may disable
        #[arg(long)]
        budget: usize,
        /// Restrict the attacker to these lines, as "i-j" (repeatable)
        #[arg(long = "only", value_name = "LINE")]
        candidates: Vec<LineKey>,
        /// Abort the search after this many seconds
        #[arg(long)]
        time_limit: Option<f64>,
    },
    /// Choose lines to protect against a budgeted attacker
    Defend {
        /// Grid snapshot (JSON)
        #[arg(long, value_hint = ValueHint::FilePath)]
        grid: PathBuf,
        /// Lines the attacker may disable
        #[arg(long)]
        attack_budget: usize,
        /// Lines the defender may protect
        #[arg(long)]
        defend_budget: usize,
        /// Abort the search after this many seconds
        #[arg(long)]
        time_limit: Option<f64>,
    },
    /// Generate a grid, then run dispatch, attack and defense on it
    Demo {
        /// Number of buses (defaults to the `[generate]` config section)
        #[arg(long)]
        buses: Option<usize>,
        /// Probability that any bus pair is connected
        #[arg(long)]
        density: Option<f64>,
        /// RNG seed
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value_t = 2)]
        attack_budget: usize,
        #[arg(long, default_value_t = 2)]
        defend_budget: usize,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_disabled_lines() {
        let cli = Cli::parse_from([
            "gin", "dispatch", "--grid", "g.json", "--disable", "0-1", "--disable", "2-0",
        ]);
        match cli.command {
            Commands::Dispatch { disabled, .. } => {
                assert_eq!(disabled, vec![LineKey::between(0, 1), LineKey::between(0, 2)]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "gin", "attack", "--grid", "g.json", "--budget", "2", "--format", "json",
        ]);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.threads, "auto");
        assert!(cli.solver.is_none());
    }

    #[test]
    fn rejects_malformed_line() {
        let err = Cli::try_parse_from(["gin", "dispatch", "--grid", "g.json", "--disable", "01"]);
        assert!(err.is_err());
    }
}
