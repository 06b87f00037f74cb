//! Prefixing captured output with the identity of the process that wrote it.

use std::io;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::color::{ColorAllocator, wrap_into};

/// Column width the identity is padded to. Longer identities are kept whole.
pub const PREFIX_WIDTH: usize = 20;

const STDERR_SUFFIX: &str = " (stderr)";

/// Display and color key for a log source.
pub fn identity(process_name: &str, err: bool) -> String {
    if err {
        format!("{process_name}{STDERR_SUFFIX}")
    } else {
        process_name.to_string()
    }
}

pub fn prefix(identity: &str) -> String {
    format!("{identity:<PREFIX_WIDTH$} | ")
}

/// Split on `\n`, `\r\n` or `\r`. A trailing terminator does not produce an
/// empty final line; blank lines in the middle are kept.
///
/// Works on raw bytes: captured output is passed through exactly as the
/// program wrote it, valid UTF-8 or not.
pub fn split_lines(data: &[u8]) -> Vec<&[u8]> {
    let mut lines = Vec::new();
    let mut rest = data;
    while !rest.is_empty() {
        match rest.iter().position(|&b| b == b'\n' || b == b'\r') {
            Some(end) => {
                lines.push(&rest[..end]);
                let skip = if rest[end..].starts_with(b"\r\n") { 2 } else { 1 };
                rest = &rest[end + skip..];
            }
            None => {
                lines.push(rest);
                break;
            }
        }
    }
    lines
}

/// Turns payload data blocks into prefixed, optionally colored records.
#[derive(Debug)]
pub struct LineFormatter {
    colors: ColorAllocator,
    dev: bool,
}

impl LineFormatter {
    pub fn new(dev: bool) -> Self {
        Self {
            colors: ColorAllocator::new(),
            dev,
        }
    }

    pub fn colors(&self) -> &ColorAllocator {
        &self.colors
    }

    /// Render every line of `data` as one record.
    pub fn render(&mut self, process_name: &str, err: bool, data: &[u8]) -> Vec<u8> {
        let lines = split_lines(data);
        if lines.is_empty() {
            return Vec::new();
        }

        let identity = identity(process_name, err);
        let prefix = prefix(&identity);
        let code = self.dev.then(|| self.colors.color_for(&identity, err));

        let mut out = Vec::with_capacity(data.len() + lines.len() * (prefix.len() + 16));
        let mut record = Vec::new();
        for line in lines {
            record.clear();
            record.extend_from_slice(prefix.as_bytes());
            record.extend_from_slice(line);
            match code {
                Some(code) => wrap_into(&mut out, code, &record),
                None => out.extend_from_slice(&record),
            }
            out.push(b'\n');
        }
        out
    }

    /// Render `data` and write it to `out`, flushing once for the whole block.
    pub async fn format_and_emit<W: AsyncWrite + Unpin>(
        &mut self,
        out: &mut W,
        process_name: &str,
        err: bool,
        data: &[u8],
    ) -> io::Result<()> {
        let rendered = self.render(process_name, err, data);
        if rendered.is_empty() {
            return Ok(());
        }
        out.write_all(&rendered).await?;
        out.flush().await
    }
}
