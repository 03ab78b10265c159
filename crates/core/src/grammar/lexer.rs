use super::diag::{Diagnostic, Span, codes};

/// Classification of a script token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokKind {
    /// Bare word: command names, enum members, resource names, `none`.
    Ident,
    /// Double-quoted string literal (text includes the quotes).
    Str,
    /// Integer or float literal.
    Number,
    /// `true` or `false`, any case.
    Bool,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `,`
    Comma,
    /// `...` (variadic marker in signatures).
    Ellipsis,
    /// `=` (default value marker in signatures).
    Eq,
    /// `?` (optional marker in signatures).
    Question,
}

impl std::fmt::Display for TokKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TokKind::Ident => "identifier",
            TokKind::Str => "string",
            TokKind::Number => "number",
            TokKind::Bool => "boolean",
            TokKind::LParen => "`(`",
            TokKind::RParen => "`)`",
            TokKind::Comma => "`,`",
            TokKind::Ellipsis => "`...`",
            TokKind::Eq => "`=`",
            TokKind::Question => "`?`",
        };
        f.write_str(s)
    }
}

/// A token that borrows its text directly from the source line.
///
/// `text` is always exactly the token's slice of the line. `start`/`end` are
/// byte offsets shifted by the base offset passed to [`tokenize_at`], so they
/// address the whole script rather than the single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// The classification of this token.
    pub kind: TokKind,
    /// Borrowed slice of the source line for this token.
    pub text: &'a str,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl<'a> Token<'a> {
    /// The token's span.
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    /// Literal value: string contents without quotes, other tokens verbatim.
    pub fn value(&self) -> &'a str {
        match self.kind {
            TokKind::Str => &self.text[1..self.text.len() - 1],
            _ => self.text,
        }
    }
}

/// Lexical shape of a numeric literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
    /// Optional sign followed by decimal digits.
    Integer,
    /// Decimal point, exponent, or trailing `f`.
    Float,
}

/// Classify numeric text, or `None` if it is not a well-formed number.
pub fn classify_number(text: &str) -> Option<NumberKind> {
    let unsigned = text.strip_prefix(['-', '+']).unwrap_or(text);
    if !unsigned.is_empty() && unsigned.bytes().all(|b| b.is_ascii_digit()) {
        return Some(NumberKind::Integer);
    }
    let body = text
        .strip_suffix(['f', 'F'])
        .filter(|b| !b.is_empty())
        .unwrap_or(text);
    // `inf`/`nan` spellings cannot reach here: numbers must start with a digit.
    body.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(|_| NumberKind::Float)
}

/// Tokenize one script line with offsets relative to the line itself.
pub fn tokenize(line: &str) -> Result<Vec<Token<'_>>, Diagnostic> {
    tokenize_at(line, 0)
}

/// Tokenize one script line, shifting every offset by `base`.
///
/// Fails on the first lexical error: unterminated strings (reported at the
/// opening quote), unbalanced parentheses, malformed numbers, and characters
/// that cannot start a token.
pub fn tokenize_at<'a>(line: &'a str, base: usize) -> Result<Vec<Token<'a>>, Diagnostic> {
    let b = line.as_bytes();
    let mut toks = Vec::new();
    let mut open_parens: Vec<usize> = Vec::new();
    let mut i = 0usize;

    let push = |toks: &mut Vec<Token<'a>>, kind: TokKind, start: usize, end: usize| {
        toks.push(Token {
            kind,
            text: &line[start..end],
            start: base + start,
            end: base + end,
        });
    };

    while i < b.len() {
        let c = b[i];
        let start = i;
        match c {
            b' ' | b'\t' | b'\r' | b'\n' => {
                i += 1;
            }
            b'"' => {
                // `"` is ASCII, so scanning bytes never splits a UTF-8 sequence.
                let Some(close) = b[i + 1..].iter().position(|&x| x == b'"') else {
                    return Err(Diagnostic::error(
                        codes::UNTERMINATED_STRING,
                        "unterminated string literal",
                        Some(Span::new(base + start, base + line.len())),
                    ));
                };
                i += close + 2;
                push(&mut toks, TokKind::Str, start, i);
            }
            b'(' => {
                open_parens.push(start);
                i += 1;
                push(&mut toks, TokKind::LParen, start, i);
            }
            b')' => {
                if open_parens.pop().is_none() {
                    return Err(Diagnostic::error(
                        codes::UNBALANCED_PAREN,
                        "unmatched `)`",
                        Some(Span::new(base + start, base + start + 1)),
                    ));
                }
                i += 1;
                push(&mut toks, TokKind::RParen, start, i);
            }
            b',' => {
                i += 1;
                push(&mut toks, TokKind::Comma, start, i);
            }
            b'=' => {
                i += 1;
                push(&mut toks, TokKind::Eq, start, i);
            }
            b'?' => {
                i += 1;
                push(&mut toks, TokKind::Question, start, i);
            }
            b'.' if line[i..].starts_with("...") => {
                i += 3;
                push(&mut toks, TokKind::Ellipsis, start, i);
            }
            _ if starts_number(b, i) => {
                i += 1;
                while i < b.len() && !line[i..].starts_with("...") {
                    let ch = b[i];
                    let exp_sign = (ch == b'-' || ch == b'+') && matches!(b[i - 1], b'e' | b'E');
                    if ch.is_ascii_alphanumeric() || ch == b'.' || exp_sign {
                        i += 1;
                    } else {
                        break;
                    }
                }
                let text = &line[start..i];
                if classify_number(text).is_none() {
                    return Err(Diagnostic::error(
                        codes::MALFORMED_NUMBER,
                        format!("malformed number `{text}`"),
                        Some(Span::new(base + start, base + i)),
                    ));
                }
                push(&mut toks, TokKind::Number, start, i);
            }
            _ => {
                let Some(first) = line[i..].chars().next() else {
                    break;
                };
                if !(first.is_alphabetic() || first == '_') {
                    return Err(Diagnostic::error(
                        codes::UNEXPECTED_CHAR,
                        format!("unexpected character `{first}`"),
                        Some(Span::new(base + start, base + start + first.len_utf8())),
                    ));
                }
                i += first.len_utf8();
                while let Some(ch) = line[i..].chars().next() {
                    if line[i..].starts_with("...") || !is_ident_continue(ch) {
                        break;
                    }
                    i += ch.len_utf8();
                }
                let text = &line[start..i];
                let kind = if text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("false")
                {
                    TokKind::Bool
                } else {
                    TokKind::Ident
                };
                push(&mut toks, kind, start, i);
            }
        }
    }

    if let Some(&open) = open_parens.last() {
        return Err(Diagnostic::error(
            codes::UNBALANCED_PAREN,
            "unclosed `(`",
            Some(Span::new(base + open, base + open + 1)),
        ));
    }
    Ok(toks)
}

fn starts_number(b: &[u8], i: usize) -> bool {
    let at = |k: usize| b.get(k).copied().unwrap_or(0);
    match at(i) {
        c if c.is_ascii_digit() => true,
        b'-' | b'+' => at(i + 1).is_ascii_digit() || (at(i + 1) == b'.' && at(i + 2).is_ascii_digit()),
        b'.' => at(i + 1).is_ascii_digit(),
        _ => false,
    }
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | '.' | '-' | '/')
}
