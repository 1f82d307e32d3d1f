mod protocol;
mod server;

use std::io::{self, BufRead, Write};
use tracing::{debug, info, warn};

pub use protocol::{read_message, write_message, DapMessage, DapMessageContent};
pub use server::{DapServer, LOCALS_REFERENCE, MEMBERS_REFERENCE, THREAD_ID};

/// Serve the debug adapter over stdin/stdout.
pub fn run_dap_mode() -> io::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    serve(stdin.lock(), stdout.lock())
}

/// Serve requests from `reader` until `disconnect` or end of input.
pub fn serve<R: BufRead, W: Write>(reader: R, writer: W) -> io::Result<()> {
    info!("DAP server starting");
    let mut server = DapServer::new(reader, writer);
    let mut msg_count = 0u64;

    loop {
        let msg = match server.read_message() {
            Ok(Some(msg)) => msg,
            Ok(None) => {
                info!("client closed the connection");
                break;
            }
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                warn!(error = %e, "skipping malformed message");
                continue;
            }
            Err(e) => return Err(e),
        };
        msg_count += 1;
        debug!(msg_count, content = ?msg.content, "received message");

        match msg.content {
            DapMessageContent::Request { command, arguments } => match command.as_str() {
                "initialize" => server.handle_initialize(msg.seq, command)?,
                "launch" | "attach" => server.handle_launch(msg.seq, command, arguments)?,
                "configurationDone" | "setExceptionBreakpoints" => {
                    server.send_response(msg.seq, command, true, None)?
                }
                // A snapshot never runs again, so no breakpoint can be hit.
                "setBreakpoints" => {
                    let body = serde_json::json!({ "breakpoints": [] });
                    server.send_response(msg.seq, command, true, Some(body))?
                }
                "threads" => server.handle_threads(msg.seq, command)?,
                "stackTrace" => server.handle_stack_trace(msg.seq, command)?,
                "scopes" => server.handle_scopes(msg.seq, command)?,
                "variables" => server.handle_variables(msg.seq, command, arguments)?,
                "evaluate" => server.handle_evaluate(msg.seq, command, arguments)?,
                "continue" | "next" | "stepIn" | "stepOut" => {
                    server.handle_resume(msg.seq, command)?
                }
                "disconnect" => {
                    server.send_response(msg.seq, command, true, None)?;
                    break;
                }
                _ => {
                    warn!(%command, "unhandled DAP command");
                    server.send_response(msg.seq, command, false, None)?;
                }
            },
            _ => debug!("ignoring non-request message"),
        }
    }

    info!(msg_count, "DAP server exiting");
    Ok(())
}
