use super::{CommandSignature, ParamShape, ParamSpec, ScalarType, TypeRegistry};
use crate::error::RegistryError;
use crate::grammar::ast::CommandParam;
use crate::grammar::emit::{emit_param, strip_spans};
use crate::grammar::lexer::{TokKind, Token, tokenize};
use crate::grammar::parser::parse_args;

/// Upper bound on the overloads a single signature string may expand into.
const MAX_EXPANSION: usize = 1024;

// ─── Public API ─────────────────────────────────────────────────────────────

/// Compile a signature string into one or more concrete signatures.
///
/// Composite types expand to the cartesian product of their shapes, with the
/// first parameter varying slowest. An empty string compiles to the single
/// zero-argument signature.
pub fn compile_signature(
    source: &str,
    types: &TypeRegistry,
) -> Result<Vec<CommandSignature>, RegistryError> {
    let mut p = SigParser::new(source)?;
    let fields = p.parse_fields(false)?;
    if let Some(tok) = p.peek() {
        return Err(p.error(tok.start, format!("unexpected {}", tok.kind)));
    }
    check_top_level(source, &fields)?;
    let expanded = expand_fields(source, &fields, types)?;
    Ok(expanded
        .into_iter()
        .map(|params| CommandSignature {
            params,
            source: source.to_string(),
        })
        .collect())
}

/// Compile a single type expression (one shape of a composite type).
pub fn compile_type(source: &str, types: &TypeRegistry) -> Result<Vec<ParamShape>, RegistryError> {
    let mut p = SigParser::new(source)?;
    let Some(first) = p.peek() else {
        return Err(p.error(0, "expected a type"));
    };
    let (ty, _) = p.parse_type(first)?;
    if let Some(tok) = p.peek() {
        return Err(p.error(tok.start, format!("unexpected {} after type", tok.kind)));
    }
    expand_type(source, &ty, types)
}

// ─── Syntax ─────────────────────────────────────────────────────────────────

#[derive(Debug)]
enum TypeExpr {
    Named(String),
    Const(String),
    Group(Vec<FieldExpr>),
}

#[derive(Debug)]
struct FieldExpr {
    ty: TypeExpr,
    type_name: String,
    name: Option<String>,
    variadic: bool,
    optional: bool,
    default: Option<CommandParam>,
    offset: usize,
}

struct SigParser<'a> {
    src: &'a str,
    toks: Vec<Token<'a>>,
    pos: usize,
}

impl<'a> SigParser<'a> {
    fn new(src: &'a str) -> Result<Self, RegistryError> {
        let toks = tokenize(src).map_err(|d| RegistryError::MalformedSignature {
            signature: src.to_string(),
            offset: d.span.map_or(0, |s| s.start),
            reason: d.message,
        })?;
        Ok(Self { src, toks, pos: 0 })
    }

    fn peek(&self) -> Option<Token<'a>> {
        self.toks.get(self.pos).copied()
    }

    fn eat(&mut self, kind: TokKind) -> Option<Token<'a>> {
        let tok = self.peek().filter(|t| t.kind == kind)?;
        self.pos += 1;
        Some(tok)
    }

    fn error(&self, offset: usize, reason: impl Into<String>) -> RegistryError {
        RegistryError::MalformedSignature {
            signature: self.src.to_string(),
            offset,
            reason: reason.into(),
        }
    }

    fn parse_fields(&mut self, in_group: bool) -> Result<Vec<FieldExpr>, RegistryError> {
        let mut fields = Vec::new();
        match self.peek() {
            None => return Ok(fields),
            Some(t) if in_group && t.kind == TokKind::RParen => return Ok(fields),
            Some(_) => {}
        }
        loop {
            fields.push(self.parse_field(in_group)?);
            match self.peek() {
                None => break,
                Some(t) if in_group && t.kind == TokKind::RParen => break,
                Some(t) if t.kind == TokKind::Comma => {
                    self.pos += 1;
                    if self.peek().is_none_or(|n| n.kind == TokKind::RParen) {
                        return Err(self.error(t.start, "expected a parameter after `,`"));
                    }
                }
                Some(t) => return Err(self.error(t.start, format!("unexpected {}", t.kind))),
            }
        }
        Ok(fields)
    }

    fn parse_field(&mut self, in_group: bool) -> Result<FieldExpr, RegistryError> {
        let Some(first) = self.peek() else {
            return Err(self.error(self.src.len(), "expected a parameter type"));
        };
        let (ty, type_name) = self.parse_type(first)?;
        let name = self.eat(TokKind::Ident).map(|t| t.text.to_string());
        let variadic = self.eat(TokKind::Ellipsis).is_some();
        let optional = self.eat(TokKind::Question).is_some();
        let default = match self.eat(TokKind::Eq) {
            Some(eq) => Some(self.parse_default(eq, in_group)?),
            None => None,
        };
        Ok(FieldExpr {
            ty,
            type_name,
            name,
            variadic,
            optional,
            default,
            offset: first.start,
        })
    }

    fn parse_type(&mut self, first: Token<'a>) -> Result<(TypeExpr, String), RegistryError> {
        self.pos += 1;
        match first.kind {
            TokKind::Ident if first.text.eq_ignore_ascii_case("const") => {
                let lit = self.peek().filter(|t| {
                    matches!(
                        t.kind,
                        TokKind::Ident | TokKind::Number | TokKind::Str | TokKind::Bool
                    )
                });
                let Some(lit) = lit else {
                    return Err(self.error(first.end, "expected a literal after `const`"));
                };
                self.pos += 1;
                Ok((TypeExpr::Const(lit.value().to_string()), "const".to_string()))
            }
            TokKind::Ident => Ok((TypeExpr::Named(first.text.to_string()), first.text.to_string())),
            TokKind::LParen => {
                let fields = self.parse_fields(true)?;
                let Some(close) = self.eat(TokKind::RParen) else {
                    return Err(self.error(first.start, "unclosed `(`"));
                };
                check_group(self.src, &fields)?;
                let text = self.src[first.start..close.end].to_string();
                Ok((TypeExpr::Group(fields), text))
            }
            kind => Err(self.error(first.start, format!("expected a type, found {kind}"))),
        }
    }

    /// Everything up to the next top-level `,` (or the group's `)`) is the literal.
    fn parse_default(&mut self, eq: Token<'a>, in_group: bool) -> Result<CommandParam, RegistryError> {
        if in_group {
            return Err(self.error(eq.start, "group elements cannot have defaults"));
        }
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(tok) = self.peek() {
            match tok.kind {
                TokKind::Comma if depth == 0 => break,
                TokKind::LParen => depth += 1,
                TokKind::RParen => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error(eq.end, "expected a default value after `=`"));
        }
        let (first, last) = (self.toks[start], self.toks[self.pos - 1]);
        let text = &self.src[first.start..last.end];
        let root = parse_args(text).map_err(|d| self.error(first.start, d.message))?;
        match root.children() {
            [only] => Ok(strip_spans(only)),
            _ => Err(self.error(first.start, "default must be a single literal")),
        }
    }
}

fn check_group(src: &str, fields: &[FieldExpr]) -> Result<(), RegistryError> {
    for (i, f) in fields.iter().enumerate() {
        if f.variadic && i + 1 != fields.len() {
            return Err(malformed(src, f.offset, "only the last group element may be variadic"));
        }
        if f.optional {
            return Err(malformed(src, f.offset, "group elements cannot be optional"));
        }
    }
    Ok(())
}

fn check_top_level(src: &str, fields: &[FieldExpr]) -> Result<(), RegistryError> {
    let mut seen_omittable = false;
    let mut seen_optional = false;
    for (i, f) in fields.iter().enumerate() {
        // Omitted `?` parameters are left out of the bound list, so nothing
        // positional may follow one.
        if seen_optional && !f.optional {
            return Err(malformed(src, f.offset, "only `?` parameters may follow a `?` parameter"));
        }
        seen_optional |= f.optional;
        if f.variadic && i + 1 != fields.len() {
            return Err(malformed(src, f.offset, "only the last parameter may be variadic"));
        }
        if f.variadic && f.default.is_some() {
            return Err(malformed(src, f.offset, "a variadic parameter cannot have a default"));
        }
        if f.optional && f.default.is_some() {
            return Err(malformed(src, f.offset, "a parameter cannot be both `?` and defaulted"));
        }
        let omittable = f.variadic || f.optional || f.default.is_some();
        if seen_omittable && !omittable {
            return Err(malformed(
                src,
                f.offset,
                "required parameter after an optional or defaulted one",
            ));
        }
        seen_omittable |= omittable;
    }
    Ok(())
}

fn malformed(src: &str, offset: usize, reason: &str) -> RegistryError {
    RegistryError::MalformedSignature {
        signature: src.to_string(),
        offset,
        reason: reason.to_string(),
    }
}

// ─── Expansion ──────────────────────────────────────────────────────────────

fn expand_type(
    src: &str,
    ty: &TypeExpr,
    types: &TypeRegistry,
) -> Result<Vec<ParamShape>, RegistryError> {
    match ty {
        TypeExpr::Named(name) => {
            if let Some(scalar) = ScalarType::from_name(name) {
                return Ok(vec![ParamShape::Scalar { ty: scalar }]);
            }
            types
                .get(name)
                .map(|def| def.shapes.clone())
                .ok_or_else(|| RegistryError::UnknownType {
                    signature: src.to_string(),
                    name: name.clone(),
                })
        }
        TypeExpr::Const(literal) => Ok(vec![ParamShape::Const {
            literal: literal.clone(),
        }]),
        TypeExpr::Group(fields) => Ok(expand_fields(src, fields, types)?
            .into_iter()
            .map(|elements| ParamShape::Tuple { elements })
            .collect()),
    }
}

fn expand_fields(
    src: &str,
    fields: &[FieldExpr],
    types: &TypeRegistry,
) -> Result<Vec<Vec<ParamSpec>>, RegistryError> {
    let mut choices = Vec::with_capacity(fields.len());
    for f in fields {
        let mut shapes = expand_type(src, &f.ty, types)?;
        if f.variadic && shapes.len() > 1 {
            shapes = vec![ParamShape::OneOf {
                alternatives: shapes,
            }];
        }
        if let Some(default) = &f.default
            && !shapes.iter().any(|s| s.accepts(default))
        {
            return Err(RegistryError::InvalidDefault {
                signature: src.to_string(),
                param: f.name.clone().unwrap_or_else(|| f.type_name.clone()),
                reason: format!("`{}` is not a {}", emit_param(default), f.type_name),
            });
        }
        let alts: Vec<ParamSpec> = shapes
            .into_iter()
            .map(|shape| {
                // Alternatives the default does not fit must be supplied explicitly.
                let default = f.default.clone().filter(|d| shape.accepts(d));
                ParamSpec {
                    type_name: f.type_name.clone(),
                    name: f.name.clone(),
                    shape,
                    default,
                    optional: f.optional,
                    variadic: f.variadic,
                }
            })
            .collect();
        choices.push(alts);
    }

    let total = choices.iter().try_fold(1usize, |n, alts| n.checked_mul(alts.len()));
    if total.is_none_or(|n| n > MAX_EXPANSION) {
        return Err(malformed(src, 0, "expands to too many overloads"));
    }
    Ok(product(&choices))
}

/// Cartesian product with the first list varying slowest.
fn product<T: Clone>(choices: &[Vec<T>]) -> Vec<Vec<T>> {
    choices.iter().fold(vec![Vec::new()], |acc, alts| {
        acc.iter()
            .flat_map(|prefix| {
                alts.iter().map(move |alt| {
                    let mut next = prefix.clone();
                    next.push(alt.clone());
                    next
                })
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(src: &str) -> Result<Vec<CommandSignature>, RegistryError> {
        compile_signature(src, &TypeRegistry::new())
    }

    #[test]
    fn empty_string_is_zero_argument_signature() {
        let sigs = compile("").unwrap();
        assert_eq!(sigs.len(), 1);
        assert!(sigs[0].params.is_empty());
    }

    #[test]
    fn product_varies_first_slowest() {
        let out = product(&[vec![1, 2], vec![10, 20]]);
        assert_eq!(out, vec![vec![1, 10], vec![1, 20], vec![2, 10], vec![2, 20]]);
    }

    #[test]
    fn composite_expansion_multiplies_signatures() {
        let sigs = compile("Color tint, Rectangle area").unwrap();
        assert_eq!(sigs.len(), 6);
        assert_eq!(sigs[0].to_string(), "(int r, int g, int b) tint, (int x, int y, int width, int height) area");
        assert_eq!(sigs[5].params[0].shape, ParamShape::Scalar { ty: ScalarType::Ident });
    }

    #[test]
    fn parses_markers() {
        let sigs = compile("const none, string name, int count?, float scale?").unwrap();
        let p = &sigs[0].params;
        assert_eq!(p[0].shape, ParamShape::Const { literal: "none".into() });
        assert_eq!(p[0].name, None);
        assert!(p[2].optional && p[3].optional);
        assert_eq!(sigs[0].required_count(), 2);

        let sigs = compile("string name, int frames...").unwrap();
        assert!(sigs[0].params[1].variadic);
        assert_eq!(sigs[0].required_count(), 1);
    }

    #[test]
    fn default_is_parsed_and_checked() {
        let sigs = compile("string name, Point offset = (0, 0)").unwrap();
        let default = sigs[0].params[1].default.as_ref().unwrap();
        assert_eq!(emit_param(default), "(0, 0)");

        let err = compile("Point offset = (0, 0, 0)").unwrap_err();
        assert!(matches!(err, RegistryError::InvalidDefault { .. }), "{err}");
    }

    #[test]
    fn rejects_misplaced_markers() {
        for bad in [
            "int a..., int b",
            "int a = 1, int b",
            "int a? = 1",
            "int a... = 1",
            "int a?, int b = 2",
            "(int a, int b = 2) g",
            "int a,",
            "Sprite s",
            "int a = ",
        ] {
            assert!(compile(bad).is_err(), "{bad:?} should not compile");
        }
    }

    #[test]
    fn variadic_composite_keeps_one_signature() {
        let sigs = compile("string name, Color tints...").unwrap();
        assert_eq!(sigs.len(), 1);
        let ParamShape::OneOf { alternatives } = &sigs[0].params[1].shape else {
            panic!("expected alternatives");
        };
        assert_eq!(alternatives.len(), 3);
        assert_eq!(
            sigs[0].params[1].to_string(),
            "(int r, int g, int b) | (int r, int g, int b, int a) | ident tints..."
        );
    }

    #[test]
    fn group_may_end_variadic() {
        let sigs = compile("string a, (int b...)").unwrap();
        let ParamShape::Tuple { elements } = &sigs[0].params[1].shape else {
            panic!("expected tuple");
        };
        assert!(elements[0].variadic);
    }
}
