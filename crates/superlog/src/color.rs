//! Per-identity ANSI color assignment.

use std::collections::HashMap;

/// Colors handed out to stdout identities, in allocation order.
pub const PALETTE: [&str; 10] = [
    "32", "33", "34", "35", "36", "32;1", "33;1", "34;1", "35;1", "36;1",
];

/// Color for stderr output. Never part of the palette cycle.
pub const ALERT_COLOR: &str = "31;1";

const RESET: &str = "\x1b[0m";

/// Remembers which palette color each identity got.
///
/// Identities keep their first color for the life of the listener. Once the
/// palette runs out, allocation wraps to the first entry.
#[derive(Debug, Default)]
pub struct ColorAllocator {
    assigned: HashMap<String, &'static str>,
    next: usize,
}

impl ColorAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color_for(&mut self, identity: &str, err: bool) -> &'static str {
        if err {
            return ALERT_COLOR;
        }

        if let Some(&code) = self.assigned.get(identity) {
            return code;
        }

        let code = PALETTE[self.next];
        self.next = (self.next + 1) % PALETTE.len();
        self.assigned.insert(identity.to_string(), code);
        tracing::debug!(identity, code, "Assigned color");
        code
    }

    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }
}

/// Wrap `text` in the SGR sequence for `code`, resetting on both sides.
pub fn wrap(code: &str, text: &str) -> String {
    format!("{RESET}\x1b[{code}m{text}{RESET}")
}

/// Byte-level [`wrap`], appending to `out`. `text` is passed through as-is.
pub fn wrap_into(out: &mut Vec<u8>, code: &str, text: &[u8]) {
    out.extend_from_slice(format!("{RESET}\x1b[{code}m").as_bytes());
    out.extend_from_slice(text);
    out.extend_from_slice(RESET.as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_ten_identities_get_distinct_colors_in_order() {
        let mut colors = ColorAllocator::new();

        let assigned: Vec<_> = (0..10)
            .map(|i| colors.color_for(&format!("proc{i}"), false))
            .collect();

        assert_eq!(assigned, PALETTE);
        assert_eq!(colors.len(), 10);
    }

    #[test]
    fn eleventh_identity_wraps_to_first_color() {
        let mut colors = ColorAllocator::new();
        for i in 0..10 {
            colors.color_for(&format!("proc{i}"), false);
        }

        assert_eq!(colors.color_for("proc10", false), PALETTE[0]);
        assert_eq!(colors.color_for("proc11", false), PALETTE[1]);
    }

    #[test]
    fn identity_keeps_its_color() {
        let mut colors = ColorAllocator::new();
        let web = colors.color_for("web", false);
        colors.color_for("worker", false);

        assert_eq!(colors.color_for("web", false), web);
        assert_eq!(colors.len(), 2);
    }

    #[test]
    fn stderr_always_gets_alert_color() {
        let mut colors = ColorAllocator::new();
        colors.color_for("web (stderr)", false);

        assert_eq!(colors.color_for("web (stderr)", true), ALERT_COLOR);
        assert_eq!(colors.color_for("db (stderr)", true), ALERT_COLOR);
        assert!(!PALETTE.contains(&ALERT_COLOR));
    }

    #[test]
    fn alert_path_leaves_table_untouched() {
        let mut colors = ColorAllocator::new();

        colors.color_for("web (stderr)", true);

        assert!(colors.is_empty());
        assert_eq!(colors.color_for("web", false), PALETTE[0]);
    }

    #[test]
    fn wrap_resets_around_colored_text() {
        assert_eq!(wrap("36;1", "hi"), "\x1b[0m\x1b[36;1mhi\x1b[0m");
    }

    #[test]
    fn wrap_into_matches_wrap_and_keeps_raw_bytes() {
        let mut out = Vec::new();
        wrap_into(&mut out, "33", b"hi");
        assert_eq!(out, wrap("33", "hi").as_bytes());

        out.clear();
        wrap_into(&mut out, "33", b"\xff");
        assert_eq!(out, b"\x1b[0m\x1b[33m\xff\x1b[0m");
    }
}
