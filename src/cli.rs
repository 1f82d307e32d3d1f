use crate::config::{LogLevel, Overrides, ScopeSelection};
use crate::debugger::{
    format_variable, FrameInspector, Scope, SnapshotFrame, SnapshotValue, SnapshotVariable,
    VariableDescriptor,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "frame-inspector")]
#[command(about = "Enumerate and look up variables in a paused debugger stack frame")]
#[command(version)]
pub struct Args {
    /// Configuration file (default: ./frame-inspector.toml when present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log level (overrides RUST_LOG and the config file)
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Log file path (overrides config file)
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Do not write a log file
    #[arg(long, global = true, conflicts_with = "log_file")]
    pub no_log_file: bool,

    /// Also log to stderr
    #[arg(long, global = true)]
    pub log_console: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the variables of a frame snapshot
    Inspect {
        snapshot: PathBuf,
        /// Which variables to list (default from config, else all)
        #[arg(long, value_enum)]
        scope: Option<ScopeSelection>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Look a variable up by name; exits with status 1 when it is absent
    Lookup {
        snapshot: PathBuf,
        name: String,
        /// Search the members of `this` instead of the locals
        #[arg(long, short = 'm')]
        member: bool,
    },
    /// Interactive watch console over a frame snapshot
    Watch { snapshot: PathBuf },
    /// Serve a Debug Adapter Protocol session on stdin/stdout
    Dap,
}

impl Args {
    pub fn overrides(&self) -> Overrides {
        let scope = match &self.command {
            Command::Inspect { scope, .. } => *scope,
            _ => None,
        };
        Overrides {
            log_level: self.log_level,
            log_file: self.log_file.clone(),
            no_log_file: self.no_log_file,
            log_console: self.log_console,
            scope,
        }
    }
}

fn load_frame(path: &Path) -> Result<SnapshotFrame> {
    SnapshotFrame::load(path)
        .with_context(|| format!("Failed to load frame snapshot '{}'", path.display()))
}

pub fn inspect<W: Write>(
    snapshot: &Path,
    scope: ScopeSelection,
    json: bool,
    out: &mut W,
) -> Result<()> {
    let frame = load_frame(snapshot)?;
    let inspector = FrameInspector::new(&frame);
    let variables = match scope {
        ScopeSelection::All => inspector.all_variables()?,
        ScopeSelection::Locals => inspector.all_local_variables()?,
        ScopeSelection::Members => inspector.all_non_local_variables()?,
    };

    if json {
        let records: Vec<SnapshotVariable> = variables.iter().map(to_record).collect();
        serde_json::to_writer_pretty(&mut *out, &records)?;
        writeln!(out)?;
    } else {
        for variable in &variables {
            writeln!(out, "{}", format_variable(variable))?;
        }
    }
    Ok(())
}

/// Returns whether the variable was found.
pub fn lookup<W: Write>(snapshot: &Path, name: &str, member: bool, out: &mut W) -> Result<bool> {
    let frame = load_frame(snapshot)?;
    let scope = if member { Scope::Member } else { Scope::Local };
    let (found, variable) = FrameInspector::new(&frame).try_get_variable(name, scope)?;
    if let Some(variable) = variable {
        writeln!(out, "{}", format_variable(&variable))?;
    }
    Ok(found)
}

pub fn load_watch_frame(snapshot: &Path) -> Result<SnapshotFrame> {
    load_frame(snapshot)
}

fn to_record(variable: &VariableDescriptor<SnapshotValue>) -> SnapshotVariable {
    let value = variable.value();
    SnapshotVariable::new(variable.name(), value.type_name.clone(), value.value.clone())
        .with_members(value.members.clone())
}
