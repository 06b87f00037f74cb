//! Event listener loop - runs as a child of the supervisor.
//!
//! Protocol (stdin/stdout, strictly one event at a time):
//! - Listener writes `READY\n`
//! - Supervisor writes one header line plus `len` payload bytes
//! - Listener handles the event, then writes `RESULT 2\nOK`
//!
//! Captured-output events are prefixed and written to the aggregate stream
//! (stderr). Every other event kind is acknowledged and otherwise ignored.

use std::convert::Infallible;

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::Instrument;

use crate::bridge::codec::EventCodec;
use crate::bridge::protocol::{Event, ListenerResponse, PROCESSNAME_KEY, split_payload};
use crate::config::ListenerConfig;
use crate::error::{FrameError, Result};
use crate::format::LineFormatter;

/// Supervisor event listener.
///
/// Owns the formatter (and with it the color table) for the life of the
/// process.
#[derive(Debug)]
pub struct Listener {
    formatter: LineFormatter,
}

impl Listener {
    pub fn new(config: &ListenerConfig) -> Self {
        Self {
            formatter: LineFormatter::new(config.dev),
        }
    }

    /// Run the ready/event/result cycle until the channel fails.
    ///
    /// There is no clean exit: the supervisor closing `input` surfaces as
    /// [`FrameError::ChannelClosed`], and any framing error ends the loop
    /// without acknowledging the bad frame.
    pub async fn run<R, W, E>(
        &mut self,
        input: R,
        output: W,
        mut aggregate: E,
    ) -> Result<Infallible>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
        E: AsyncWrite + Unpin,
    {
        let mut events = FramedRead::new(input, EventCodec::new());
        let mut responses = FramedWrite::new(output, EventCodec::new());

        loop {
            responses.send(ListenerResponse::Ready).await?;

            let event = match events.next().await {
                Some(event) => event?,
                None => {
                    tracing::info!("Event channel closed by supervisor");
                    return Err(FrameError::ChannelClosed);
                }
            };

            let span = tracing::debug_span!("event", serial = event.serial(), pool = event.pool());
            self.dispatch(&event, &mut aggregate).instrument(span).await?;

            responses.send(ListenerResponse::Ok).await?;
        }
    }

    async fn dispatch<E: AsyncWrite + Unpin>(
        &mut self,
        event: &Event,
        aggregate: &mut E,
    ) -> Result<()> {
        let kind = event.kind()?;
        tracing::trace!(?kind, len = event.payload.len(), "Event received");

        if !kind.is_log() {
            tracing::debug!(?kind, "Acknowledging event without output");
            return Ok(());
        }

        let (inner, data) = split_payload(&event.payload)?;
        let process_name = inner.require(PROCESSNAME_KEY)?;
        self.formatter
            .format_and_emit(aggregate, process_name, kind.is_stderr(), data)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(eventname: &str, payload: &str) -> String {
        format!(
            "ver:3.0 server:supervisor serial:1 pool:superlog poolserial:1 eventname:{eventname} len:{}\n{payload}",
            payload.len()
        )
    }

    #[tokio::test]
    async fn closed_channel_is_fatal() {
        let mut listener = Listener::new(&ListenerConfig::default());
        let mut out: Vec<u8> = Vec::new();
        let mut agg: Vec<u8> = Vec::new();

        let err = listener.run(&b""[..], &mut out, &mut agg).await.unwrap_err();

        assert!(matches!(err, FrameError::ChannelClosed));
        assert_eq!(out, b"READY\n");
        assert!(agg.is_empty());
    }

    #[tokio::test]
    async fn log_event_is_formatted_and_acknowledged() {
        let mut listener = Listener::new(&ListenerConfig::default());
        let input = frame("PROCESS_LOG_STDOUT", "processname:web channel:stdout\nhi\n");
        let mut out: Vec<u8> = Vec::new();
        let mut agg: Vec<u8> = Vec::new();

        let _ = listener.run(input.as_bytes(), &mut out, &mut agg).await;

        assert_eq!(out, b"READY\nRESULT 2\nOKREADY\n");
        assert_eq!(agg, b"web                  | hi\n");
    }

    #[tokio::test]
    async fn missing_processname_is_not_acknowledged() {
        let mut listener = Listener::new(&ListenerConfig::default());
        let input = frame("PROCESS_LOG_STDERR", "pid:12\nhi\n");
        let mut out: Vec<u8> = Vec::new();
        let mut agg: Vec<u8> = Vec::new();

        let err = listener
            .run(input.as_bytes(), &mut out, &mut agg)
            .await
            .unwrap_err();

        match err {
            FrameError::MissingField { key } => assert_eq!(key, "processname"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(out, b"READY\n");
        assert!(agg.is_empty());
    }

    #[tokio::test]
    async fn missing_eventname_is_fatal() {
        let mut listener = Listener::new(&ListenerConfig::default());
        let mut out: Vec<u8> = Vec::new();
        let mut agg: Vec<u8> = Vec::new();

        let err = listener
            .run(&b"len:0\n"[..], &mut out, &mut agg)
            .await
            .unwrap_err();

        assert!(matches!(err, FrameError::MissingField { .. }));
    }
}
