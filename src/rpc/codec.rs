//! JSON-lines request/response codec for the console front end.
//!
//! Wire format, one object per line:
//! ```text
//! → {"op":"runZone","zone":3,"durationMins":10}
//! → {"op":"getStatus"}
//! ← {"data":{"zoneList":[...],"relayBoardEnabled":true}}
//! ← {"error":{"kind":"InvalidParameters","message":"..."}}
//! ```

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::app::commands::{Instruction, Response};
use crate::app::status::StatusReport;

/// Longest request line accepted.
pub const MAX_REQUEST_LEN: usize = 512;

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
enum Request {
    GetStatus,
    Reset,
    Enable,
    Disable,
    #[serde(rename_all = "camelCase")]
    RunZone { zone: i32, duration_mins: i32 },
}

impl From<Request> for Instruction {
    fn from(r: Request) -> Self {
        match r {
            Request::GetStatus => Instruction::GetStatus,
            Request::Reset => Instruction::Reset,
            Request::Enable => Instruction::Enable,
            Request::Disable => Instruction::Disable,
            Request::RunZone { zone, duration_mins } => Instruction::RunZone { zone, duration_mins },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    TooLong(usize),
    Malformed(String),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLong(n) => write!(f, "request of {n} bytes exceeds {MAX_REQUEST_LEN}"),
            Self::Malformed(m) => write!(f, "malformed request: {m}"),
        }
    }
}

impl std::error::Error for CodecError {}

pub fn decode_request(line: &str) -> Result<Instruction, CodecError> {
    let line = line.trim();
    if line.len() > MAX_REQUEST_LEN {
        return Err(CodecError::TooLong(line.len()));
    }
    serde_json::from_str::<Request>(line)
        .map(Instruction::from)
        .map_err(|e| CodecError::Malformed(e.to_string()))
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    kind: &'a str,
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum Reply<'a> {
    Data(&'a StatusReport),
    Error(ErrorBody<'a>),
}

fn encode(reply: &Reply<'_>) -> String {
    // Serialising plain structs into a String cannot fail.
    serde_json::to_string(reply).unwrap_or_default()
}

pub fn encode_response(response: &Response) -> String {
    match response {
        Ok(report) => encode(&Reply::Data(report)),
        Err(e) => encode(&Reply::Error(ErrorBody {
            kind: e.kind(),
            message: e.to_string(),
        })),
    }
}

pub fn encode_bad_request(e: &CodecError) -> String {
    encode(&Reply::Error(ErrorBody {
        kind: "BadRequest",
        message: e.to_string(),
    }))
}
