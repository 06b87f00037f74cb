//! Wire protocol types for the supervisor event-listener channel.
//!
//! One channel, stdin/stdout:
//! - **Inbound**: a `key:value` header line followed by exactly `len` payload bytes
//! - **Outbound**: `READY\n` before each frame, `RESULT 2\nOK` after it

use std::collections::HashMap;

use tokio_util::bytes::Bytes;

use crate::error::{FrameError, Result};

/// Header key carrying the payload byte count.
pub const LEN_KEY: &str = "len";
/// Header key carrying the event kind.
pub const EVENTNAME_KEY: &str = "eventname";
/// Payload header key naming the supervised program.
pub const PROCESSNAME_KEY: &str = "processname";

/// Parsed `key:value` header line.
///
/// Duplicate keys resolve last-wins. Supervisor traffic has never been seen to
/// repeat a key, so nothing relies on it either way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    fields: HashMap<String, String>,
}

impl Header {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key).ok_or_else(|| FrameError::MissingField {
            key: key.to_string(),
        })
    }

    pub fn require_usize(&self, key: &str) -> Result<usize> {
        let value = self.require(key)?;
        value.parse().map_err(|_| FrameError::InvalidField {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Parse a whitespace-separated line of `key:value` tokens.
///
/// Each token splits on its first `:`, so values may themselves contain colons.
/// A line with no tokens at all is treated as malformed: the supervisor never
/// sends one, and an empty read means the channel went away.
pub fn parse_header(line: &str) -> Result<Header> {
    let mut fields = HashMap::new();
    for token in line.split_whitespace() {
        let (key, value) = token
            .split_once(':')
            .ok_or_else(|| FrameError::MalformedHeader {
                line: line.to_string(),
            })?;
        fields.insert(key.to_string(), value.to_string());
    }

    if fields.is_empty() {
        return Err(FrameError::MalformedHeader {
            line: line.to_string(),
        });
    }

    Ok(Header { fields })
}

/// Split a payload into its embedded header and the raw data block.
///
/// The data block is everything after the first newline, further newlines
/// included, and may be empty.
pub fn split_payload(payload: &[u8]) -> Result<(Header, &[u8])> {
    let newline = payload
        .iter()
        .position(|&b| b == b'\n')
        .ok_or(FrameError::MalformedPayload)?;
    let (head, rest) = payload.split_at(newline);
    let header = parse_header(&String::from_utf8_lossy(head))?;
    Ok((header, &rest[1..]))
}

/// Event kinds the listener tells apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    ProcessLogStdout,
    ProcessLogStderr,
    /// Anything else the supervisor sends. Acknowledged, never formatted.
    Other(String),
}

impl EventKind {
    pub fn parse(name: &str) -> Self {
        match name {
            "PROCESS_LOG_STDOUT" => Self::ProcessLogStdout,
            "PROCESS_LOG_STDERR" => Self::ProcessLogStderr,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_log(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    pub fn is_stderr(&self) -> bool {
        matches!(self, Self::ProcessLogStderr)
    }
}

/// One decoded frame: outer header plus its exact-length payload.
#[derive(Debug, Clone)]
pub struct Event {
    pub header: Header,
    pub payload: Bytes,
}

impl Event {
    pub fn kind(&self) -> Result<EventKind> {
        self.header.require(EVENTNAME_KEY).map(EventKind::parse)
    }

    /// Supervisor-assigned event serial, if the header carried one.
    pub fn serial(&self) -> Option<&str> {
        self.header.get("serial")
    }

    /// Listener pool name, if the header carried one.
    pub fn pool(&self) -> Option<&str> {
        self.header.get("pool")
    }
}

/// Messages from listener to supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerResponse {
    /// Ready for the next event.
    Ready,
    /// Event handled. Always `OK`: the listener never asks for redelivery.
    Ok,
}

impl ListenerResponse {
    /// Exact bytes on the wire. The `2` in the result token is the protocol's
    /// declared length for `OK` and is not computed.
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            Self::Ready => b"READY\n",
            Self::Ok => b"RESULT 2\nOK",
        }
    }
}
