use anyhow::Result;
use clap::Parser;
use gin_cli::{Cli, Commands};
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

mod commands;

use crate::commands::demo::DemoArgs;
use crate::commands::util::{configure_threads, Session};
use crate::commands::{attack, defend, demo, dispatch, generate};

fn run(cli: &Cli) -> Result<()> {
    let session = Session::from_cli(cli)?;
    info!(
        backend = session.backend.id(),
        threads = %cli.threads,
        "gin starting"
    );
    configure_threads(&cli.threads);

    match &cli.command {
        Commands::Generate {
            buses,
            density,
            seed,
            out,
        } => generate::handle(
            &session.config.generate,
            *buses,
            *density,
            *seed,
            out.as_deref(),
            cli.format,
        ),
        Commands::Dispatch { grid, disabled } => {
            dispatch::handle(&session, grid, disabled, cli.format)
        }
        Commands::Attack {
            grid,
            budget,
            candidates,
            time_limit,
        } => attack::handle(&session, grid, *budget, candidates, *time_limit, cli.format),
        Commands::Defend {
            grid,
            attack_budget,
            defend_budget,
            time_limit,
        } => defend::handle(
            &session,
            grid,
            *attack_budget,
            *defend_budget,
            *time_limit,
            cli.format,
        ),
        Commands::Demo {
            buses,
            density,
            seed,
            attack_budget,
            defend_budget,
        } => demo::handle(
            &session,
            &DemoArgs {
                buses: *buses,
                density: *density,
                seed: *seed,
                attack_budget: *attack_budget,
                defend_budget: *defend_budget,
            },
            cli.format,
        ),
    }
}

fn main() {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    if let Err(err) = run(&cli) {
        error!("{err:#}");
        std::process::exit(1);
    }
}
