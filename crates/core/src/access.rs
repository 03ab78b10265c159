//! Typed accessors over bound argument trees.
//!
//! Coercion happens on demand and only converts representation: a string
//! node is never read as an integer, and out-of-domain values are errors
//! rather than being clamped. Every failure is a semantic [`Diagnostic`]
//! spanning the offending node.

use serde::Serialize;

use crate::grammar::ast::{CommandParam, PrimitiveKind};
use crate::grammar::diag::{Diagnostic, codes};

/// Integer point, e.g. a source cell `(1, 2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Point {
    /// Horizontal component.
    pub x: i32,
    /// Vertical component.
    pub y: i32,
}

impl Point {
    /// Construct a point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Floating-point vector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Vector {
    /// Horizontal component.
    pub x: f32,
    /// Vertical component.
    pub y: f32,
}

/// Axis-aligned rectangle with non-negative size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width, never negative.
    pub width: i32,
    /// Height, never negative.
    pub height: i32,
}

/// RGBA color. Alpha is always fully transparent (0) or opaque (255).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Color {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha: 0 or 255.
    pub a: u8,
}

impl Color {
    /// Opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Look up a named color, case-insensitively.
    pub fn named(name: &str) -> Option<Self> {
        NAMED_COLORS
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|&(_, c)| c)
    }
}

const NAMED_COLORS: &[(&str, Color)] = &[
    ("black", Color::rgb(0, 0, 0)),
    ("white", Color::rgb(255, 255, 255)),
    ("red", Color::rgb(255, 0, 0)),
    ("green", Color::rgb(0, 255, 0)),
    ("blue", Color::rgb(0, 0, 255)),
    ("yellow", Color::rgb(255, 255, 0)),
    ("cyan", Color::rgb(0, 255, 255)),
    ("magenta", Color::rgb(255, 0, 255)),
    ("gray", Color::rgb(128, 128, 128)),
    (
        "transparent",
        Color {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        },
    ),
];

/// An enum readable from a script identifier.
///
/// Implement with [`script_enum!`](crate::script_enum).
pub trait ScriptEnum: Sized + Copy {
    /// Type name used in error messages.
    const TYPE_NAME: &'static str;
    /// Accepted member names, in declaration order.
    const NAMES: &'static [&'static str];
    /// Member for a name, case-insensitively.
    fn from_name(name: &str) -> Option<Self>;
}

/// Declare a fieldless enum that implements [`ScriptEnum`](crate::access::ScriptEnum).
///
/// ```
/// cmdscript_core::script_enum! {
///     /// Playback direction.
///     pub enum Direction { Forward, Reverse, PingPong }
/// }
/// use cmdscript_core::access::ScriptEnum;
/// assert_eq!(Direction::from_name("pingpong"), Some(Direction::PingPong));
/// ```
#[macro_export]
macro_rules! script_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident { $($(#[$vmeta:meta])* $variant:ident),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($(#[$vmeta])* #[allow(missing_docs)] $variant),+
        }

        impl $crate::access::ScriptEnum for $name {
            const TYPE_NAME: &'static str = stringify!($name);
            const NAMES: &'static [&'static str] = &[$(stringify!($variant)),+];
            fn from_name(name: &str) -> Option<Self> {
                $(
                    if name.eq_ignore_ascii_case(stringify!($variant)) {
                        return Some($name::$variant);
                    }
                )+
                None
            }
        }
    };
}

// ─── Node accessors ─────────────────────────────────────────────────────────

impl CommandParam {
    /// Text of any scalar. Numbers and identifiers come back verbatim.
    pub fn as_string(&self) -> Result<&str, Diagnostic> {
        self.text().ok_or_else(|| kind_error(self, "string"))
    }

    /// Integer node as `i32`.
    pub fn as_int(&self) -> Result<i32, Diagnostic> {
        let text = self.scalar_of(&[PrimitiveKind::Integer], "int")?;
        text.parse::<i32>().map_err(|_| {
            domain_error(self, format!("`{text}` does not fit a 32-bit integer"))
        })
    }

    /// Integer or float node as `f32`; a trailing `f` is allowed.
    pub fn as_float(&self) -> Result<f32, Diagnostic> {
        let text = self.scalar_of(&[PrimitiveKind::Integer, PrimitiveKind::Float], "float")?;
        let body = text
            .strip_suffix(['f', 'F'])
            .filter(|b| !b.is_empty())
            .unwrap_or(text);
        match body.parse::<f32>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(domain_error(self, format!("`{text}` is not a finite float"))),
        }
    }

    /// Boolean node.
    pub fn as_bool(&self) -> Result<bool, Diagnostic> {
        let text = self.scalar_of(&[PrimitiveKind::Boolean], "bool")?;
        Ok(text.eq_ignore_ascii_case("true"))
    }

    /// Identifier or string naming a member of `T`.
    pub fn as_enum<T: ScriptEnum>(&self) -> Result<T, Diagnostic> {
        let text = self.scalar_of(&[PrimitiveKind::Identifier, PrimitiveKind::String], T::TYPE_NAME)?;
        T::from_name(text).ok_or_else(|| {
            Diagnostic::error(
                codes::INVALID_ENUM,
                format!(
                    "`{text}` is not a valid {}; expected one of: {}",
                    T::TYPE_NAME,
                    T::NAMES.join(", ")
                ),
                Some(self.span),
            )
            .with_entry("type", T::TYPE_NAME)
        })
    }

    /// `(x, y)` of integers.
    pub fn as_point(&self) -> Result<Point, Diagnostic> {
        let [x, y] = self.tuple_of::<2>("point (x, y)")?;
        Ok(Point::new(x.as_int()?, y.as_int()?))
    }

    /// `(x, y)` of numbers.
    pub fn as_vector(&self) -> Result<Vector, Diagnostic> {
        let [x, y] = self.tuple_of::<2>("vector (x, y)")?;
        Ok(Vector {
            x: x.as_float()?,
            y: y.as_float()?,
        })
    }

    /// `(x, y, width, height)` or `((x, y), (width, height))`.
    pub fn as_rect(&self) -> Result<Rect, Diagnostic> {
        let rect = match self.children() {
            [x, y, w, h] if self.is_array() => Rect {
                x: x.as_int()?,
                y: y.as_int()?,
                width: w.as_int()?,
                height: h.as_int()?,
            },
            [loc, size] => {
                let loc = loc.as_point()?;
                let size = size.as_point()?;
                Rect {
                    x: loc.x,
                    y: loc.y,
                    width: size.x,
                    height: size.y,
                }
            }
            _ => return Err(kind_error(self, "rectangle (x, y, width, height)")),
        };
        if rect.width < 0 || rect.height < 0 {
            return Err(domain_error(
                self,
                format!("rectangle size {}x{} is negative", rect.width, rect.height),
            ));
        }
        Ok(rect)
    }

    /// `(r, g, b)`, `(r, g, b, a)`, or a color name.
    pub fn as_color(&self) -> Result<Color, Diagnostic> {
        if self.primitive() == Some(PrimitiveKind::Identifier) {
            let name = self.as_string()?;
            return Color::named(name).ok_or_else(|| {
                Diagnostic::error(
                    codes::INVALID_ENUM,
                    format!(
                        "`{name}` is not a known color; expected one of: {}",
                        NAMED_COLORS.iter().map(|(n, _)| *n).collect::<Vec<_>>().join(", ")
                    ),
                    Some(self.span),
                )
            });
        }
        let channels = match self.children() {
            kids @ ([_, _, _] | [_, _, _, _]) if self.is_array() => kids,
            _ => return Err(kind_error(self, "color (r, g, b[, a])")),
        };
        let mut rgba = [255u8; 4];
        for (slot, node) in rgba.iter_mut().zip(channels) {
            let v = node.as_int()?;
            *slot = u8::try_from(v).map_err(|_| {
                domain_error(node, format!("color channel {v} is outside 0..=255"))
            })?;
        }
        if let Some(alpha) = channels.get(3)
            && rgba[3] != 0
            && rgba[3] != 255
        {
            return Err(domain_error(alpha, "alpha must be 0 or 255"));
        }
        let [r, g, b, a] = rgba;
        Ok(Color { r, g, b, a })
    }

    /// Whether the node is the identifier `none` or `null`.
    pub fn is_none(&self) -> bool {
        self.primitive() == Some(PrimitiveKind::Identifier)
            && self
                .text()
                .is_some_and(|t| t.eq_ignore_ascii_case("none") || t.eq_ignore_ascii_case("null"))
    }

    /// Number of children (0 for scalars).
    pub fn child_count(&self) -> usize {
        self.children().len()
    }

    /// Child at `index`, if present.
    pub fn try_get(&self, index: usize) -> Option<&CommandParam> {
        self.children().get(index)
    }

    /// Child at `index`.
    pub fn get(&self, index: usize) -> Result<&CommandParam, Diagnostic> {
        self.try_get(index).ok_or_else(|| {
            Diagnostic::error(
                codes::ARG_INDEX_OUT_OF_RANGE,
                format!(
                    "argument {} requested but only {} present",
                    index + 1,
                    self.child_count()
                ),
                Some(self.span),
            )
        })
    }

    /// First direct child bound to `name`, case-insensitively.
    pub fn find(&self, name: &str) -> Option<&CommandParam> {
        self.children()
            .iter()
            .find(|c| c.name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(name)))
    }

    /// Sub-tree at `index`.
    pub fn get_param(&self, index: usize) -> Result<&CommandParam, Diagnostic> {
        self.get(index)
    }

    /// See [`CommandParam::as_string`].
    pub fn get_string(&self, index: usize) -> Result<&str, Diagnostic> {
        self.get(index)?.as_string()
    }

    /// See [`CommandParam::as_int`].
    pub fn get_int(&self, index: usize) -> Result<i32, Diagnostic> {
        self.get(index)?.as_int()
    }

    /// See [`CommandParam::as_float`].
    pub fn get_float(&self, index: usize) -> Result<f32, Diagnostic> {
        self.get(index)?.as_float()
    }

    /// See [`CommandParam::as_bool`].
    pub fn get_bool(&self, index: usize) -> Result<bool, Diagnostic> {
        self.get(index)?.as_bool()
    }

    /// See [`CommandParam::as_enum`].
    pub fn get_enum<T: ScriptEnum>(&self, index: usize) -> Result<T, Diagnostic> {
        self.get(index)?.as_enum()
    }

    /// See [`CommandParam::as_point`].
    pub fn get_point(&self, index: usize) -> Result<Point, Diagnostic> {
        self.get(index)?.as_point()
    }

    /// See [`CommandParam::as_vector`].
    pub fn get_vector(&self, index: usize) -> Result<Vector, Diagnostic> {
        self.get(index)?.as_vector()
    }

    /// See [`CommandParam::as_rect`].
    pub fn get_rect(&self, index: usize) -> Result<Rect, Diagnostic> {
        self.get(index)?.as_rect()
    }

    /// See [`CommandParam::as_color`].
    pub fn get_color(&self, index: usize) -> Result<Color, Diagnostic> {
        self.get(index)?.as_color()
    }

    fn scalar_of(&self, kinds: &[PrimitiveKind], expected: &str) -> Result<&str, Diagnostic> {
        match (self.primitive(), self.text()) {
            (Some(kind), Some(text)) if kinds.contains(&kind) => Ok(text),
            _ => Err(kind_error(self, expected)),
        }
    }

    fn tuple_of<const N: usize>(&self, expected: &str) -> Result<&[CommandParam; N], Diagnostic> {
        if !self.is_array() {
            return Err(kind_error(self, expected));
        }
        self.children()
            .try_into()
            .map_err(|_| kind_error(self, expected))
    }
}

fn kind_error(node: &CommandParam, expected: &str) -> Diagnostic {
    let found = match node.text() {
        Some(text) => format!("{} `{text}`", node.shape()),
        None => node.shape(),
    };
    let subject = match &node.name {
        Some(name) => format!("`{name}`: "),
        None => String::new(),
    };
    Diagnostic::error(
        codes::ARG_KIND_MISMATCH,
        format!("{subject}expected {expected}, found {found}"),
        Some(node.span),
    )
}

fn domain_error(node: &CommandParam, message: impl Into<String>) -> Diagnostic {
    Diagnostic::error(codes::VALUE_OUT_OF_RANGE, message, Some(node.span))
}
