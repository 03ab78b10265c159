//! Splitting script text into logical lines.
//!
//! Comment markers start a comment that runs to end of line, except inside a
//! `"..."` string. Script strings have no escapes, so a quote always toggles.

use serde::Serialize;

/// Byte order mark some editors write at the start of a UTF-8 file.
pub const BOM: char = '\u{FEFF}';

/// One physical line of a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceLine<'a> {
    /// 1-based line number.
    pub number: usize,
    /// Byte offset of `code` within the script.
    pub offset: usize,
    /// Code with surrounding whitespace and any trailing comment removed.
    pub code: &'a str,
    /// Trailing comment, marker included, if any.
    pub comment: Option<&'a str>,
    /// The whole line as written, without its line terminator.
    pub raw: &'a str,
}

impl SourceLine<'_> {
    /// Whether the line holds no code (blank or comment-only).
    pub fn is_blank(&self) -> bool {
        self.code.is_empty()
    }
}

/// Every physical line, blank and comment-only lines included.
///
/// A leading [`BOM`] is skipped; offsets still count it.
pub fn all_lines<'a, S: AsRef<str>>(text: &'a str, markers: &[S]) -> Vec<SourceLine<'a>> {
    let mut out = Vec::new();
    let body = text.strip_prefix(BOM).unwrap_or(text);
    let mut start = text.len() - body.len();
    for (i, piece) in body.split('\n').enumerate() {
        let raw = piece.strip_suffix('\r').unwrap_or(piece);
        let cut = comment_start(raw, markers);
        let (code_part, comment) = match cut {
            Some(at) => (&raw[..at], Some(raw[at..].trim_end())),
            None => (raw, None),
        };
        let code = code_part.trim();
        let lead = code_part.len() - code_part.trim_start().len();
        out.push(SourceLine {
            number: i + 1,
            offset: start + lead,
            code,
            comment,
            raw,
        });
        start += piece.len() + 1;
    }
    // A trailing newline does not start another line.
    if text.ends_with('\n') {
        out.pop();
    }
    out
}

/// Lines that carry code, in order.
pub fn split_lines<'a, S: AsRef<str>>(text: &'a str, markers: &[S]) -> Vec<SourceLine<'a>> {
    all_lines(text, markers)
        .into_iter()
        .filter(|l| !l.is_blank())
        .collect()
}

/// Byte offset of the first comment marker outside a string.
fn comment_start<S: AsRef<str>>(line: &str, markers: &[S]) -> Option<usize> {
    let mut in_str = false;
    for (i, ch) in line.char_indices() {
        if ch == '"' {
            in_str = !in_str;
            continue;
        }
        if !in_str
            && markers
                .iter()
                .map(AsRef::as_ref)
                .any(|m| !m.is_empty() && line[i..].starts_with(m))
        {
            return Some(i);
        }
    }
    None
}
