//! Supervisor event-listener bridge.
//!
//! This module provides the wire protocol and codec for communication between
//! the supervisor (parent) and this listener.
//!
//! # Architecture
//!
//! - **protocol**: Header parsing, event kinds, READY/RESULT responses
//! - **codec**: Header-line + exact-length payload framing for AsyncRead/AsyncWrite

pub mod codec;
pub mod protocol;
