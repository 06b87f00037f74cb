//! Framed codec for the supervisor event channel.
//!
//! Decodes a `key:value` header line followed by exactly `len` payload bytes,
//! and encodes the listener's READY/RESULT tokens. Works over any
//! AsyncRead/AsyncWrite (stdin/stdout in production, byte slices in tests).

use tokio_util::bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use super::protocol::{Event, Header, LEN_KEY, ListenerResponse, parse_header};
use crate::error::{FrameError, Result};

/// Upper bound on buffer space reserved ahead of a payload. Larger payloads
/// grow the buffer as bytes arrive, so `len` never drives an allocation.
const MAX_RESERVE: usize = 64 * 1024;

#[derive(Debug)]
enum DecodeState {
    /// Waiting for a complete header line.
    Head,
    /// Header parsed, waiting for `len` payload bytes.
    Data { header: Header, len: usize },
}

/// Codec for supervisor frames.
///
/// The declared `len` is the only thing that delimits a payload; the codec
/// never scans payload bytes for a terminator.
#[derive(Debug)]
pub struct EventCodec {
    state: DecodeState,
}

impl Default for EventCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl EventCodec {
    pub fn new() -> Self {
        Self {
            state: DecodeState::Head,
        }
    }

    fn decode_head(src: &mut BytesMut) -> Result<Option<(Header, usize)>> {
        let Some(newline) = src.iter().position(|&b| b == b'\n') else {
            return Ok(None);
        };

        let line = src.split_to(newline + 1);
        let line = std::str::from_utf8(&line).map_err(|_| FrameError::MalformedHeader {
            line: String::from_utf8_lossy(&line).into_owned(),
        })?;
        let header = parse_header(line)?;
        let len = header.require_usize(LEN_KEY)?;

        tracing::trace!(len, "Decoded frame header");
        Ok(Some((header, len)))
    }

    /// Take exactly `len` payload bytes once they are all buffered.
    fn read_payload(src: &mut BytesMut, len: usize) -> Option<Bytes> {
        if src.len() < len {
            return None;
        }
        Some(src.split_to(len).freeze())
    }
}

impl Decoder for EventCodec {
    type Item = Event;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        loop {
            match self.state {
                DecodeState::Head => match Self::decode_head(src)? {
                    Some((header, len)) => {
                        src.reserve(len.saturating_sub(src.len()).min(MAX_RESERVE));
                        self.state = DecodeState::Data { header, len };
                    }
                    None => return Ok(None),
                },
                DecodeState::Data { len, .. } => {
                    let Some(payload) = Self::read_payload(src, len) else {
                        return Ok(None);
                    };
                    let DecodeState::Data { header, .. } =
                        std::mem::replace(&mut self.state, DecodeState::Head)
                    else {
                        unreachable!("state checked above");
                    };
                    return Ok(Some(Event { header, payload }));
                }
            }
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>> {
        if let Some(event) = self.decode(buf)? {
            return Ok(Some(event));
        }

        match &self.state {
            DecodeState::Data { len, .. } => Err(FrameError::TruncatedPayload {
                expected: *len,
                received: buf.len(),
            }),
            DecodeState::Head if buf.is_empty() => Ok(None),
            DecodeState::Head => Err(FrameError::MalformedHeader {
                line: String::from_utf8_lossy(buf).into_owned(),
            }),
        }
    }
}

impl Encoder<ListenerResponse> for EventCodec {
    type Error = FrameError;

    fn encode(&mut self, item: ListenerResponse, dst: &mut BytesMut) -> Result<()> {
        dst.extend_from_slice(item.as_bytes());
        Ok(())
    }
}
