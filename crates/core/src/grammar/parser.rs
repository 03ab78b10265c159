use super::{
    ast::{CommandParam, Invocation, PrimitiveKind},
    diag::{Diagnostic, Span, codes},
    lexer::{NumberKind, TokKind, Token, classify_number, tokenize_at},
};

/// Default limit on parenthesis nesting inside one argument list.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Where a line sits in its script and how deep its arguments may nest.
#[derive(Debug, Clone, Copy)]
pub struct LineOptions {
    /// Byte offset of the line within the script.
    pub base: usize,
    /// Maximum parenthesis nesting depth.
    pub max_depth: usize,
}

impl Default for LineOptions {
    fn default() -> Self {
        Self {
            base: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

// ─── Public API ─────────────────────────────────────────────────────────────

/// Parse a line with no registered prefixes.
pub fn parse_line(line: &str) -> Result<Invocation, Diagnostic> {
    parse_line_with(line, LineOptions::default(), |_| false)
}

/// Parse one script line into an [`Invocation`].
///
/// Leading identifiers for which `is_prefix` returns `true` become the
/// invocation's prefixes, as long as another identifier follows them.
/// Argument shapes are inferred purely lexically; no signature is consulted.
pub fn parse_line_with(
    line: &str,
    opts: LineOptions,
    is_prefix: impl Fn(&str) -> bool,
) -> Result<Invocation, Diagnostic> {
    let toks = tokenize_at(line, opts.base)?;
    let line_span = Span::new(opts.base, opts.base + line.len());

    let mut pos = 0;
    let mut prefixes = Vec::new();
    while let (Some(tok), Some(next)) = (toks.get(pos), toks.get(pos + 1))
        && tok.kind == TokKind::Ident
        && next.kind == TokKind::Ident
        && is_prefix(tok.text)
    {
        prefixes.push(tok.text.to_string());
        pos += 1;
    }

    let head = match toks.get(pos) {
        Some(tok) if tok.kind == TokKind::Ident => *tok,
        Some(tok) => {
            return Err(Diagnostic::error(
                codes::MISSING_COMMAND,
                format!("expected a command name, found {}", tok.kind),
                Some(tok.span()),
            ));
        }
        None => {
            return Err(Diagnostic::error(
                codes::MISSING_COMMAND,
                "expected a command name",
                Some(line_span),
            ));
        }
    };

    let rest = &toks[pos + 1..];
    let args = ArgParser::new(rest, opts.max_depth, head.end).parse_root()?;
    let span = toks
        .first()
        .map_or(head.span(), |first| Span::new(first.start, args.span.end.max(head.end)));

    Ok(Invocation {
        prefixes,
        command: head.text.to_string(),
        command_span: head.span(),
        args,
        span,
    })
}

/// Parse a bare argument list (`"foo", (1, 2)`) into a root array node.
pub fn parse_args(text: &str) -> Result<CommandParam, Diagnostic> {
    parse_args_with(text, LineOptions::default())
}

/// Parse a bare argument list with explicit offsets and depth limit.
pub fn parse_args_with(text: &str, opts: LineOptions) -> Result<CommandParam, Diagnostic> {
    let toks = tokenize_at(text, opts.base)?;
    ArgParser::new(&toks, opts.max_depth, opts.base).parse_root()
}

// ─── Recursive descent ─────────────────────────────────────────────────────

struct ArgParser<'t, 'a> {
    toks: &'t [Token<'a>],
    pos: usize,
    max_depth: usize,
    /// Anchor for the empty root span when there are no arguments.
    anchor: usize,
}

impl<'t, 'a> ArgParser<'t, 'a> {
    fn new(toks: &'t [Token<'a>], max_depth: usize, anchor: usize) -> Self {
        Self {
            toks,
            pos: 0,
            max_depth,
            anchor,
        }
    }

    fn peek(&self) -> Option<&'t Token<'a>> {
        self.toks.get(self.pos)
    }

    fn parse_root(mut self) -> Result<CommandParam, Diagnostic> {
        let children = self.parse_list(0)?;
        if let Some(tok) = self.peek() {
            // Only reachable on a `)` the lexer let through; keep it an error.
            return Err(unexpected(tok));
        }
        let span = match (children.first(), children.last()) {
            (Some(first), Some(last)) => first.span.join(last.span),
            _ => Span::empty(self.anchor),
        };
        Ok(CommandParam::array(children, span))
    }

    /// Comma-separated list up to end of input (depth 0) or a `)`.
    fn parse_list(&mut self, depth: usize) -> Result<Vec<CommandParam>, Diagnostic> {
        let mut items = Vec::new();
        if self.at_list_end(depth) {
            return Ok(items);
        }
        loop {
            items.push(self.parse_arg(depth)?);
            match self.peek() {
                None => break,
                Some(tok) if tok.kind == TokKind::RParen && depth > 0 => break,
                Some(tok) if tok.kind == TokKind::Comma => {
                    self.pos += 1;
                    if self.at_list_end(depth) {
                        return Err(Diagnostic::error(
                            codes::EXPECTED_ARGUMENT,
                            "expected an argument after `,`",
                            Some(tok.span()),
                        ));
                    }
                }
                Some(tok) => {
                    return Err(Diagnostic::error(
                        codes::EXPECTED_ARGUMENT,
                        format!("expected `,` between arguments, found {}", tok.kind),
                        Some(tok.span()),
                    ));
                }
            }
        }
        Ok(items)
    }

    fn at_list_end(&self, depth: usize) -> bool {
        match self.peek() {
            None => true,
            Some(tok) => depth > 0 && tok.kind == TokKind::RParen,
        }
    }

    fn parse_arg(&mut self, depth: usize) -> Result<CommandParam, Diagnostic> {
        let Some(tok) = self.peek() else {
            return Err(Diagnostic::error(
                codes::EXPECTED_ARGUMENT,
                "expected an argument",
                Some(Span::empty(self.anchor)),
            ));
        };
        self.pos += 1;
        let span = tok.span();
        let node = match tok.kind {
            TokKind::Str => CommandParam::scalar(PrimitiveKind::String, tok.value(), span),
            TokKind::Bool => CommandParam::scalar(PrimitiveKind::Boolean, tok.text, span),
            TokKind::Ident => CommandParam::scalar(PrimitiveKind::Identifier, tok.text, span),
            TokKind::Number => {
                let primitive = match classify_number(tok.text) {
                    Some(NumberKind::Integer) => PrimitiveKind::Integer,
                    Some(NumberKind::Float) => PrimitiveKind::Float,
                    None => {
                        return Err(Diagnostic::error(
                            codes::MALFORMED_NUMBER,
                            format!("malformed number `{}`", tok.text),
                            Some(span),
                        ));
                    }
                };
                CommandParam::scalar(primitive, tok.text, span)
            }
            TokKind::LParen => {
                if depth + 1 > self.max_depth {
                    return Err(Diagnostic::error(
                        codes::NESTING_TOO_DEEP,
                        format!("arguments nest deeper than {} levels", self.max_depth),
                        Some(span),
                    ));
                }
                let children = self.parse_list(depth + 1)?;
                let close = match self.peek() {
                    Some(t) if t.kind == TokKind::RParen => *t,
                    _ => {
                        return Err(Diagnostic::error(
                            codes::UNBALANCED_PAREN,
                            "unclosed `(`",
                            Some(span),
                        ));
                    }
                };
                self.pos += 1;
                CommandParam::array(children, span.join(close.span()))
            }
            TokKind::Comma => {
                return Err(Diagnostic::error(
                    codes::EXPECTED_ARGUMENT,
                    "empty argument",
                    Some(span),
                ));
            }
            TokKind::RParen | TokKind::Ellipsis | TokKind::Eq | TokKind::Question => {
                return Err(unexpected(tok));
            }
        };
        Ok(node)
    }
}

fn unexpected(tok: &Token<'_>) -> Diagnostic {
    Diagnostic::error(
        codes::EXPECTED_ARGUMENT,
        format!("unexpected {} in argument list", tok.kind),
        Some(tok.span()),
    )
}
