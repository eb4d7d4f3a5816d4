use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Line separator used inside node labels.
pub const LINE_BREAK: &str = "<br>";

const BREAK_TAGS: [&str; 3] = ["<br />", "<br/>", "<br>"];

pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Columns taken by one character; control characters count as one.
pub fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(1)
}

/// Escape `&`, `<` and `>` so arbitrary text can sit inside a label without
/// being read as a line break.
pub fn escape_markup(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>']) {
        return Cow::Borrowed(s);
    }
    Cow::Owned(
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    )
}

/// Inverse of [`escape_markup`], for drawing a label line as plain text.
pub fn unescape_markup(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }
    Cow::Owned(
        s.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&amp;", "&"),
    )
}

/// Split a label into lines on `<br>`, `<br/>` and `<br />` (any case).
pub fn split_lines(s: &str) -> Vec<&str> {
    let lower = s.to_ascii_lowercase();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut pos = 0;

    while let Some(found) = lower[pos..].find("<br") {
        let at = pos + found;
        match BREAK_TAGS.iter().find(|tag| lower[at..].starts_with(*tag)) {
            Some(tag) => {
                lines.push(&s[start..at]);
                start = at + tag.len();
                pos = start;
            }
            None => pos = at + 3,
        }
    }
    lines.push(&s[start..]);
    lines
}

pub fn join_lines<I, S>(lines: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (i, line) in lines.into_iter().enumerate() {
        if i > 0 {
            out.push_str(LINE_BREAK);
        }
        out.push_str(line.as_ref());
    }
    out
}

/// Widest line of a multi-line label, in columns, once unescaped.
pub fn block_width(s: &str) -> usize {
    split_lines(s)
        .into_iter()
        .map(|line| display_width(&unescape_markup(line)))
        .max()
        .unwrap_or(0)
}

pub fn line_count(s: &str) -> usize {
    split_lines(s).len()
}
