//! superlog: supervisor event listener that aggregates captured program output.

mod color;
mod config;
mod error;
mod format;
mod listener;

pub mod bridge;

pub use listener::Listener;

pub use color::{ALERT_COLOR, ColorAllocator, PALETTE, wrap, wrap_into};
pub use config::{DEV_FLAG, LOG_LEVEL_ENV, ListenerConfig, diagnostic_filter};
pub use error::{FrameError, Result};
pub use format::{LineFormatter, PREFIX_WIDTH, identity, prefix, split_lines};
