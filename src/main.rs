use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod progress;

use cli::{CheckCommand, CleanCommand, Command, PlanCommand, Session};
use progress::ProgressObserver;

/// Filter from `SWEEP_LOG`, then `RUST_LOG`, else `warn` (`debug` with --verbose).
fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("SWEEP_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    init_logging(args.rules.verbose);

    let cwd = std::env::current_dir().context("cannot determine the current directory")?;
    let session = Session::load(&args.rules, &cwd).context("failed to load rules")?;
    let progress = ProgressObserver::new(args.rules.verbose);
    let mut stdout = std::io::stdout().lock();

    match args.command {
        Command::Plan { dirs, json } => {
            PlanCommand::new(dirs, json, &cwd).execute(&session, &progress, &mut stdout)?;
        }
        Command::Clean { dirs, yes, json } => {
            CleanCommand::new(dirs, yes, json, &cwd).execute(&session, &progress, &mut stdout)?;
        }
        Command::Check { json } => {
            CheckCommand::new(json).execute(&session, &mut stdout)?;
        }
    }

    Ok(())
}
