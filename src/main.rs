use anyhow::Result;
use clap::Parser;
use frame_inspector::cli::{self, Args, Command};
use frame_inspector::config::{Config, MergedConfig};
use frame_inspector::debugger::WatchContext;
use frame_inspector::{dap, logging};
use std::io;
use std::process::ExitCode;
use tracing::info;

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;
    let merged = MergedConfig::new(config, args.overrides());
    logging::initialize_logging(&merged)?;

    info!(command = ?args.command, "frame-inspector started");

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args.command {
        Command::Inspect {
            snapshot,
            scope,
            json,
        } => {
            let scope = scope.unwrap_or(merged.default_scope);
            cli::inspect(&snapshot, scope, json, &mut out)?;
        }
        Command::Lookup {
            snapshot,
            name,
            member,
        } => {
            if !cli::lookup(&snapshot, &name, member, &mut out)? {
                eprintln!("{} not found", name);
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Watch { snapshot } => {
            let frame = cli::load_watch_frame(&snapshot)?;
            let mut ctx = WatchContext::new(frame);
            ctx.run(io::stdin().lock(), &mut out)?;
        }
        Command::Dap => {
            drop(out);
            dap::run_dap_mode()?;
        }
    }

    info!("frame-inspector exiting");
    Ok(ExitCode::SUCCESS)
}
