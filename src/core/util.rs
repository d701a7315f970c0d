//! Common utilities

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Glyph put in front of a path whose head was cut off
pub const CONTINUATION_MARKER: char = '<';

/// Glyph put after code that was cut on the right
pub const ELLIPSIS: char = '…';

/// Display width of a string in terminal columns
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Right-pad `s` with spaces up to `width` columns
pub fn pad_to(s: &str, width: usize) -> String {
    let current = display_width(s);
    let mut out = String::with_capacity(s.len() + width.saturating_sub(current));
    out.push_str(s);
    for _ in current..width {
        out.push(' ');
    }
    out
}

/// Keep the rightmost part of `s` that fits in `width - 1` columns
///
/// Returns `None` when `s` already fits. The caller prepends
/// `CONTINUATION_MARKER` to the returned tail, so the tail plus marker is
/// exactly `width` columns or less.
pub fn elide_left(s: &str, width: usize) -> Option<String> {
    if display_width(s) <= width {
        return None;
    }

    let budget = width.saturating_sub(1);
    let mut used = 0;
    let mut start = s.len();

    for (idx, c) in s.char_indices().rev() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        start = idx;
    }

    Some(s[start..].to_string())
}

/// Cut `s` on the right so it fits in `width` columns, ending with `ELLIPSIS`
pub fn truncate_right(s: &str, width: usize) -> String {
    if display_width(s) <= width {
        return s.to_string();
    }

    let budget = width.saturating_sub(1);
    let mut used = 0;
    let mut out = String::new();

    for c in s.chars() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }

    if width > 0 {
        out.push(ELLIPSIS);
    }
    out
}

/// Check if a command is available in PATH
pub fn command_exists(cmd: &str) -> bool {
    std::process::Command::new("which")
        .arg(cmd)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
