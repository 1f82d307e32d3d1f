use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{self, BufRead, Read, Write};

#[derive(Debug, Serialize, Deserialize)]
pub struct DapMessage {
    pub seq: u64,
    #[serde(rename = "type")]
    pub msg_type: String,
    #[serde(flatten)]
    pub content: DapMessageContent,
}

// Variant order matters for untagged decoding: responses carry `command`
// too, so they must be tried before requests.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DapMessageContent {
    Response {
        request_seq: u64,
        success: bool,
        command: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        body: Option<Value>,
    },
    Request {
        command: String,
        arguments: Option<Value>,
    },
    Event {
        event: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        body: Option<Value>,
    },
}

/// One entry of a `scopes` response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DapScope {
    pub name: String,
    pub variables_reference: u64,
    pub expensive: bool,
}

/// One entry of a `variables` response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DapVariable {
    pub name: String,
    pub value: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub type_name: String,
    pub variables_reference: u64,
}

/// Largest message body accepted from a client.
pub const MAX_CONTENT_LENGTH: usize = 16 * 1024 * 1024;

/// Read one `Content-Length` framed message. `Ok(None)` on end of input.
///
/// Frames whose body is not a valid DAP message are reported as
/// `InvalidData`; the caller decides whether to keep reading.
pub fn read_message<R: BufRead>(reader: &mut R) -> io::Result<Option<DapMessage>> {
    let mut content_length: Option<usize> = None;

    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            if content_length.is_some() {
                break;
            }
            continue;
        }
        if let Some(len) = line.strip_prefix("Content-Length:") {
            let len = len.trim().parse().map_err(|_| {
                io::Error::new(io::ErrorKind::InvalidData, format!("bad header: {}", line))
            })?;
            content_length = Some(len);
        }
    }

    let length = content_length.unwrap_or(0);
    if length > MAX_CONTENT_LENGTH {
        // Drain the body so the next read starts at a header.
        io::copy(&mut reader.by_ref().take(length as u64), &mut io::sink())?;
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "message of {} bytes exceeds the {} byte limit",
                length, MAX_CONTENT_LENGTH
            ),
        ));
    }

    let mut buffer = vec![0u8; length];
    reader.read_exact(&mut buffer)?;
    serde_json::from_slice(&buffer)
        .map(Some)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Write one message as `Content-Length: {len}\r\n\r\n{json}` and flush.
pub fn write_message<W: Write>(writer: &mut W, msg: &DapMessage) -> io::Result<()> {
    let json = serde_json::to_string(msg)?;
    write!(writer, "Content-Length: {}\r\n\r\n{}", json.len(), json)?;
    writer.flush()
}
