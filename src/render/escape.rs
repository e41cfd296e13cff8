//! Text-insertion primitives.
//!
//! Every string that did not originate in this crate (input URLs, scraped
//! titles, channel names, error messages) reaches a sink through one of these
//! functions. Nothing else in the crate writes external text into markup or
//! onto a terminal.

use std::borrow::Cow;

/// Escapes `s` for use as HTML element text or as a quoted attribute value.
pub fn html_text(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 16);
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}

/// Replaces control characters so `s` prints as inert text.
///
/// ESC is a control character, so ANSI sequences embedded in scraped content
/// cannot recolor or move the cursor.
pub fn terminal_text(s: &str) -> Cow<'_, str> {
    if !s.chars().any(char::is_control) {
        return Cow::Borrowed(s);
    }
    Cow::Owned(
        s.chars()
            .map(|c| if c.is_control() { '\u{FFFD}' } else { c })
            .collect(),
    )
}
