use super::protocol::{self, DapMessage, DapMessageContent, DapScope, DapVariable};
use crate::debugger::{
    FrameInspector, SnapshotError, SnapshotFrame, SnapshotValue, VariableDescriptor,
};
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};
use tracing::{debug, info, warn};

pub const THREAD_ID: u64 = 1;
pub const LOCALS_REFERENCE: u64 = 1;
pub const MEMBERS_REFERENCE: u64 = 2;
const FIRST_CHILD_REFERENCE: u64 = 3;

pub struct DapServer<R, W> {
    reader: R,
    writer: W,
    seq: u64,
    frame: Option<SnapshotFrame>,
    program_path: Option<String>,
    // Expandable variables, indexed by reference - FIRST_CHILD_REFERENCE.
    children: Vec<ChildSlot>,
}

/// An expandable variable handed out with its own reference.
///
/// `origin` is the parent reference and the variable's position in that
/// parent's listing; `None` for variables reached through `evaluate`.
struct ChildSlot {
    origin: Option<(u64, usize)>,
    variable: VariableDescriptor<SnapshotValue>,
}

impl<R: BufRead, W: Write> DapServer<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            seq: 0,
            frame: None,
            program_path: None,
            children: Vec::new(),
        }
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    pub fn read_message(&mut self) -> io::Result<Option<DapMessage>> {
        protocol::read_message(&mut self.reader)
    }

    pub fn send_response(
        &mut self,
        request_seq: u64,
        command: String,
        success: bool,
        body: Option<Value>,
    ) -> io::Result<()> {
        self.respond(request_seq, command, success, None, body)
    }

    fn send_error(
        &mut self,
        request_seq: u64,
        command: String,
        message: String,
    ) -> io::Result<()> {
        warn!(%command, %message, "request failed");
        self.respond(request_seq, command, false, Some(message), None)
    }

    fn respond(
        &mut self,
        request_seq: u64,
        command: String,
        success: bool,
        message: Option<String>,
        body: Option<Value>,
    ) -> io::Result<()> {
        let msg = DapMessage {
            seq: self.next_seq(),
            msg_type: "response".to_string(),
            content: DapMessageContent::Response {
                request_seq,
                success,
                command,
                message,
                body,
            },
        };
        protocol::write_message(&mut self.writer, &msg)
    }

    pub fn send_event(&mut self, event: String, body: Option<Value>) -> io::Result<()> {
        debug!(%event, "sending event");
        let msg = DapMessage {
            seq: self.next_seq(),
            msg_type: "event".to_string(),
            content: DapMessageContent::Event { event, body },
        };
        protocol::write_message(&mut self.writer, &msg)
    }

    pub fn handle_initialize(&mut self, seq: u64, command: String) -> io::Result<()> {
        let body = json!({
            "supportsConfigurationDoneRequest": true,
            "supportsEvaluateForHovers": true,
            "supportsStepBack": false,
            "supportsFunctionBreakpoints": false,
            "supportsConditionalBreakpoints": false,
            "supportsSetVariable": false,
        });
        self.send_response(seq, command, true, Some(body))?;
        self.send_event("initialized".to_string(), None)
    }

    pub fn handle_launch(
        &mut self,
        seq: u64,
        command: String,
        args: Option<Value>,
    ) -> io::Result<()> {
        let Some(program) = args
            .as_ref()
            .and_then(|v| v.get("program"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
        else {
            let message = "launch requires a `program` snapshot path".to_string();
            return self.send_error(seq, command, message);
        };

        info!(%program, "launching snapshot");
        match SnapshotFrame::load(&program) {
            Ok(frame) => {
                self.frame = Some(frame);
                self.program_path = Some(program);
                self.children.clear();
                self.send_response(seq, command, true, None)?;
                self.send_event(
                    "stopped".to_string(),
                    Some(json!({
                        "reason": "entry",
                        "threadId": THREAD_ID,
                        "allThreadsStopped": true
                    })),
                )
            }
            Err(e) => self.send_error(seq, command, e.to_string()),
        }
    }

    pub fn handle_threads(&mut self, seq: u64, command: String) -> io::Result<()> {
        self.send_response(
            seq,
            command,
            true,
            Some(json!({
                "threads": [
                    {
                        "id": THREAD_ID,
                        "name": "Debuggee"
                    }
                ]
            })),
        )
    }

    pub fn handle_stack_trace(&mut self, seq: u64, command: String) -> io::Result<()> {
        let mut frames = Vec::new();

        if let Some(frame) = &self.frame {
            let program_path = self.program_path.as_deref().unwrap_or_default();
            let program_name = std::path::Path::new(program_path)
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(program_path);
            let name = if frame.function().is_empty() {
                "<unknown>"
            } else {
                frame.function()
            };

            frames.push(json!({
                "id": 0,
                "name": name,
                "line": 0,
                "column": 0,
                "source": {
                    "name": program_name,
                    "path": program_path
                }
            }));
        }

        self.send_response(
            seq,
            command,
            true,
            Some(json!({
                "stackFrames": frames,
                "totalFrames": frames.len()
            })),
        )
    }

    pub fn handle_scopes(&mut self, seq: u64, command: String) -> io::Result<()> {
        let scopes = vec![
            DapScope {
                name: "Locals".to_string(),
                variables_reference: LOCALS_REFERENCE,
                expensive: false,
            },
            DapScope {
                name: "Members".to_string(),
                variables_reference: MEMBERS_REFERENCE,
                expensive: true,
            },
        ];
        self.send_response(seq, command, true, Some(json!({ "scopes": scopes })))
    }

    pub fn handle_variables(
        &mut self,
        seq: u64,
        command: String,
        args: Option<Value>,
    ) -> io::Result<()> {
        let var_ref = args
            .as_ref()
            .and_then(|v| v.get("variablesReference"))
            .and_then(|v| v.as_u64())
            .unwrap_or(0);

        match self.collect_variables(var_ref) {
            Ok(variables) => {
                let body = json!({ "variables": variables });
                self.send_response(seq, command, true, Some(body))
            }
            Err(e) => self.send_error(seq, command, e.to_string()),
        }
    }

    fn collect_variables(&mut self, var_ref: u64) -> Result<Vec<DapVariable>, SnapshotError> {
        let Some(frame) = &self.frame else {
            return Ok(Vec::new());
        };
        let inspector = FrameInspector::new(frame);

        let listing = match var_ref {
            LOCALS_REFERENCE => inspector.all_local_variables()?,
            MEMBERS_REFERENCE => inspector.all_non_local_variables()?,
            r if r >= FIRST_CHILD_REFERENCE => {
                let index = (r - FIRST_CHILD_REFERENCE) as usize;
                match self.children.get(index) {
                    Some(slot) => inspector.members_of(&slot.variable)?,
                    None => return Ok(Vec::new()),
                }
            }
            _ => return Ok(Vec::new()),
        };

        let mut variables = Vec::with_capacity(listing.len());
        for (position, child) in listing.iter().enumerate() {
            let reference = self.reference_for(Some((var_ref, position)), child);
            variables.push(to_dap_variable(child, reference));
        }
        Ok(variables)
    }

    // One reference per (parent reference, position).
    fn reference_for(
        &mut self,
        origin: Option<(u64, usize)>,
        variable: &VariableDescriptor<SnapshotValue>,
    ) -> u64 {
        if !variable.value().is_aggregate() {
            return 0;
        }
        let existing = origin.and_then(|origin| {
            self.children
                .iter()
                .position(|slot| slot.origin == Some(origin))
        });
        let index = match existing {
            Some(index) => index,
            None => {
                self.children.push(ChildSlot {
                    origin,
                    variable: variable.clone(),
                });
                self.children.len() - 1
            }
        };
        index as u64 + FIRST_CHILD_REFERENCE
    }

    pub fn handle_evaluate(
        &mut self,
        seq: u64,
        command: String,
        args: Option<Value>,
    ) -> io::Result<()> {
        let expression = args
            .as_ref()
            .and_then(|v| v.get("expression"))
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .trim()
            .to_string();

        let Some(frame) = &self.frame else {
            return self.send_error(seq, command, "no frame is loaded".into());
        };

        let resolved = FrameInspector::new(frame).resolve_path(&expression);
        match resolved {
            Ok(Some(variable)) => {
                let reference = self.reference_for(None, &variable);
                let body = json!({
                    "result": variable.value().value,
                    "type": variable.value().type_name,
                    "variablesReference": reference
                });
                self.send_response(seq, command, true, Some(body))
            }
            Ok(None) => {
                let message = format!("`{}` is not available", expression);
                self.send_error(seq, command, message)
            }
            Err(e) => self.send_error(seq, command, e.to_string()),
        }
    }

    /// Any run-control request resumes the debuggee. A snapshot has no later
    /// stop to report, so the session terminates.
    pub fn handle_resume(&mut self, seq: u64, command: String) -> io::Result<()> {
        if let Some(frame) = self.frame.as_mut() {
            frame.resume();
        }
        self.children.clear();
        let body = json!({ "allThreadsContinued": true });
        self.send_response(seq, command, true, Some(body))?;
        self.send_event(
            "continued".to_string(),
            Some(json!({ "threadId": THREAD_ID, "allThreadsContinued": true })),
        )?;
        self.send_event("terminated".to_string(), None)
    }
}

fn to_dap_variable(variable: &VariableDescriptor<SnapshotValue>, reference: u64) -> DapVariable {
    DapVariable {
        name: variable.name().to_string(),
        value: variable.value().value.clone(),
        type_name: variable.value().type_name.clone(),
        variables_reference: reference,
    }
}
