use thiserror::Error;

/// Failures while reading or decoding supervisor frames.
///
/// Every variant is fatal to the listener: the event protocol has no
/// resynchronization point, so a bad frame ends the process.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("malformed header line: {line:?}")]
    MalformedHeader { line: String },

    #[error("payload truncated: expected {expected} bytes, stream closed after {received}")]
    TruncatedPayload { expected: usize, received: usize },

    #[error("payload has no header/data separator")]
    MalformedPayload,

    #[error("header is missing required key '{key}'")]
    MissingField { key: String },

    #[error("header key '{key}' has invalid value {value:?}")]
    InvalidField { key: String, value: String },

    #[error("supervisor closed the event channel")]
    ChannelClosed,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FrameError>;
