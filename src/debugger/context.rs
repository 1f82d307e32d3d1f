use super::frame::{Scope, VariableDescriptor};
use super::inspector::FrameInspector;
use super::snapshot::{SnapshotError, SnapshotFrame, SnapshotValue};
use std::io::{self, BufRead, Write};
use tracing::{debug, warn};

const HELP: &str = "\
Commands:
  locals                 list the frame's locals
  members                list the members of `this`
  all                    locals followed by members
  get <name> [--member]  look a variable up by name (-m searches `this`)
  print <path>           show a dotted path such as this.count and its members
  resume                 resume the debuggee (the frame becomes invalid)
  help                   show this text
  quit                   leave the console";

/// A parsed watch-console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchCommand {
    Locals,
    Members,
    All,
    Get { name: String, scope: Scope },
    Print { path: String },
    Resume,
    Help,
    Quit,
}

impl WatchCommand {
    /// Parse one console line. `Ok(None)` means a blank line.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let tokens = shlex::split(line).ok_or_else(|| "unbalanced quotes".to_string())?;
        let mut tokens = tokens.into_iter();
        let Some(verb) = tokens.next() else {
            return Ok(None);
        };
        let rest: Vec<String> = tokens.collect();

        let command = match verb.as_str() {
            "locals" => WatchCommand::Locals,
            "members" => WatchCommand::Members,
            "all" => WatchCommand::All,
            "get" => {
                let mut scope = Scope::Local;
                let mut name = None;
                for token in rest {
                    match token.as_str() {
                        "--member" | "-m" => scope = Scope::Member,
                        _ if name.is_none() => name = Some(token),
                        _ => return Err(format!("unexpected argument `{}`", token)),
                    }
                }
                let name = name.ok_or_else(|| "usage: get <name> [--member]".to_string())?;
                WatchCommand::Get { name, scope }
            }
            "print" | "p" => match rest.as_slice() {
                [path] => WatchCommand::Print { path: path.clone() },
                _ => return Err("usage: print <path>".to_string()),
            },
            "resume" | "continue" | "c" => WatchCommand::Resume,
            "help" | "?" => WatchCommand::Help,
            "quit" | "exit" | "q" => WatchCommand::Quit,
            other => return Err(format!("unknown command `{}` (try `help`)", other)),
        };
        Ok(Some(command))
    }
}

/// Interactive console over one paused frame.
pub struct WatchContext {
    frame: SnapshotFrame,
}

impl WatchContext {
    pub fn new(frame: SnapshotFrame) -> Self {
        Self { frame }
    }

    /// Read commands until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> io::Result<()> {
        writeln!(
            out,
            "Watching frame `{}` (type `help` for commands)",
            self.frame.function()
        )?;

        for line in input.lines() {
            let line = line?;
            if !self.handle_line(&line, out)? {
                break;
            }
        }
        Ok(())
    }

    /// Execute one line. Returns `false` once the console should stop.
    pub fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<bool> {
        let command = match WatchCommand::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(true),
            Err(msg) => {
                writeln!(out, "❓ {}", msg)?;
                return Ok(true);
            }
        };
        debug!(?command, "watch command");

        if command == WatchCommand::Quit {
            return Ok(false);
        }
        if command == WatchCommand::Resume {
            self.frame.resume();
            writeln!(out, "▶️  Debuggee resumed; this frame is no longer valid")?;
            return Ok(true);
        }
        if command == WatchCommand::Help {
            writeln!(out, "{}", HELP)?;
            return Ok(true);
        }

        match self.query(&command, out) {
            Ok(()) => {}
            Err(QueryError::Frame(e)) => {
                warn!(error = %e, "frame query failed");
                writeln!(out, "❌ {}", e)?;
            }
            Err(QueryError::Io(e)) => return Err(e),
        }
        Ok(true)
    }

    fn query<W: Write>(&self, command: &WatchCommand, out: &mut W) -> Result<(), QueryError> {
        let inspector = FrameInspector::new(&self.frame);

        match command {
            WatchCommand::Locals => {
                print_list(out, "Locals", &inspector.all_local_variables()?)?;
            }
            WatchCommand::Members => {
                print_list(out, "Members of this", &inspector.all_non_local_variables()?)?;
            }
            WatchCommand::All => {
                print_list(out, "All variables", &inspector.all_variables()?)?;
            }
            WatchCommand::Get { name, scope } => match inspector.get_variable(name, *scope)? {
                Some(variable) => writeln!(out, "{}", format_variable(&variable))?,
                None => writeln!(out, "<{} not found>", name)?,
            },
            WatchCommand::Print { path } => match inspector.resolve_path(path)? {
                Some(variable) => {
                    let members = inspector.members_of(&variable)?;
                    writeln!(out, "{}", format_variable(&variable))?;
                    for member in &members {
                        writeln!(out, "  {}", format_variable(member))?;
                    }
                }
                None => writeln!(out, "<{} not found>", path)?,
            },
            WatchCommand::Resume | WatchCommand::Help | WatchCommand::Quit => {}
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
enum QueryError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Frame(#[from] SnapshotError),
}

/// `name: type = value`, with a trailing `{...}` marker for aggregates.
pub fn format_variable(variable: &VariableDescriptor<SnapshotValue>) -> String {
    let value = variable.value();
    let marker = if value.is_aggregate() { " {...}" } else { "" };
    format!("{}: {}{}", variable.name(), value, marker)
}

fn print_list<W: Write>(
    out: &mut W,
    title: &str,
    variables: &[VariableDescriptor<SnapshotValue>],
) -> io::Result<()> {
    if variables.is_empty() {
        writeln!(out, "=== {}: <none> ===", title)?;
        return Ok(());
    }
    writeln!(out, "=== {} ({}) ===", title, variables.len())?;
    for variable in variables {
        writeln!(out, "  {}", format_variable(variable))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_get_with_member_flag() {
        assert_eq!(
            WatchCommand::parse("get -m count").unwrap(),
            Some(WatchCommand::Get {
                name: "count".to_string(),
                scope: Scope::Member
            })
        );
        assert_eq!(
            WatchCommand::parse("get \"odd name\"").unwrap(),
            Some(WatchCommand::Get {
                name: "odd name".to_string(),
                scope: Scope::Local
            })
        );
    }

    #[test]
    fn test_parse_blank_and_errors() {
        assert_eq!(WatchCommand::parse("   ").unwrap(), None);
        assert!(WatchCommand::parse("get").is_err());
        assert!(WatchCommand::parse("get a b").is_err());
        assert!(WatchCommand::parse("print \"unterminated").is_err());
        assert!(WatchCommand::parse("frobnicate").is_err());
    }
}
