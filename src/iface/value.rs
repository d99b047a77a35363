use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rect4 {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Rect4 {
    pub const fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }
}

/// Variant tag of a [`FeatureValue`], used to pick a parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValueKind {
    Image,
    Rect4,
    Single,
    Array,
    Vector4,
}

impl ValueKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Rect4 => "rectangle",
            Self::Single => "integer",
            Self::Array => "integer array",
            Self::Vector4 => "vector",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum FeatureValue {
    Image(String),
    Rect4(Rect4),
    Single(i32),
    Array(Vec<i32>),
    Vector4([f32; 4]),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    Empty(ValueKind),
    BadNumber { kind: ValueKind, token: String },
    WrongArity { kind: ValueKind, expected: usize, found: usize },
    RoleMismatch { key: &'static str, role: &'static str, kind: ValueKind },
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueError::Empty(kind) => write!(f, "empty {} value", kind.as_str()),
            ValueError::BadNumber { kind, token } => {
                write!(f, "'{}' is not a valid number in {} value", token, kind.as_str())
            }
            ValueError::WrongArity {
                kind,
                expected,
                found,
            } => write!(
                f,
                "{} value needs {} components, found {}",
                kind.as_str(),
                expected,
                found
            ),
            ValueError::RoleMismatch { key, role, kind } => write!(
                f,
                "{} is a {} key and cannot hold a {} value",
                key,
                role,
                kind.as_str()
            ),
        }
    }
}

impl std::error::Error for ValueError {}

fn parse_ints(kind: ValueKind, text: &str) -> Result<Vec<i32>, ValueError> {
    text.split_whitespace()
        .map(|tok| {
            tok.parse::<i32>().map_err(|_| ValueError::BadNumber {
                kind,
                token: tok.to_string(),
            })
        })
        .collect()
}

fn exact<const N: usize>(kind: ValueKind, text: &str) -> Result<[i32; N], ValueError> {
    let ints = parse_ints(kind, text)?;
    if ints.is_empty() {
        return Err(ValueError::Empty(kind));
    }
    let found = ints.len();
    ints.try_into().map_err(|_| ValueError::WrongArity {
        kind,
        expected: N,
        found,
    })
}

impl FeatureValue {
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Image(_) => ValueKind::Image,
            Self::Rect4(_) => ValueKind::Rect4,
            Self::Single(_) => ValueKind::Single,
            Self::Array(_) => ValueKind::Array,
            Self::Vector4(_) => ValueKind::Vector4,
        }
    }

    /// Parses one line as the requested variant.
    pub fn parse(kind: ValueKind, text: &str) -> Result<Self, ValueError> {
        let text = text.trim();
        match kind {
            ValueKind::Image if text.is_empty() => Err(ValueError::Empty(kind)),
            ValueKind::Image => Ok(Self::Image(text.to_string())),
            ValueKind::Rect4 => {
                let [min_x, min_y, max_x, max_y] = exact::<4>(kind, text)?;
                Ok(Self::Rect4(Rect4::new(min_x, min_y, max_x, max_y)))
            }
            ValueKind::Single => exact::<1>(kind, text).map(|[v]| Self::Single(v)),
            ValueKind::Array => parse_ints(kind, text).map(Self::Array),
            ValueKind::Vector4 => {
                let comps = text
                    .split_whitespace()
                    .map(|tok| {
                        tok.parse::<f32>().map_err(|_| ValueError::BadNumber {
                            kind,
                            token: tok.to_string(),
                        })
                    })
                    .collect::<Result<Vec<f32>, _>>()?;
                if comps.is_empty() {
                    return Err(ValueError::Empty(kind));
                }
                let found = comps.len();
                comps
                    .try_into()
                    .map(Self::Vector4)
                    .map_err(|_| ValueError::WrongArity {
                        kind,
                        expected: 4,
                        found,
                    })
            }
        }
    }

    /// Best guess when the owning key's role does not decide the variant.
    /// Four integers read as a rectangle, other integer runs as single or
    /// array, four numbers with a fractional token as a vector, anything
    /// else as an image path.
    pub fn parse_any(text: &str) -> Result<Self, ValueError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValueError::Empty(ValueKind::Image));
        }
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.iter().all(|t| t.parse::<i32>().is_ok()) {
            return match tokens.len() {
                1 => Self::parse(ValueKind::Single, text),
                4 => Self::parse(ValueKind::Rect4, text),
                _ => Self::parse(ValueKind::Array, text),
            };
        }
        if tokens.len() == 4 && tokens.iter().all(|t| t.parse::<f32>().is_ok()) {
            return Self::parse(ValueKind::Vector4, text);
        }
        Self::parse(ValueKind::Image, text)
    }

    /// Canonical single-line form.
    pub fn serialize(&self) -> String {
        self.to_string()
    }

    pub fn as_image(&self) -> Option<&str> {
        match self {
            Self::Image(path) => Some(path),
            _ => None,
        }
    }

    pub fn as_rect(&self) -> Option<Rect4> {
        match self {
            Self::Rect4(r) => Some(*r),
            _ => None,
        }
    }

    /// Single value, or the first entry of an array.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Single(v) => Some(*v),
            Self::Array(values) => values.first().copied(),
            _ => None,
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image(path) => f.write_str(path),
            Self::Rect4(r) => write!(f, "{} {} {} {}", r.min_x, r.min_y, r.max_x, r.max_y),
            Self::Single(v) => write!(f, "{v}"),
            Self::Array(values) => {
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{v}")?;
                }
                Ok(())
            }
            // Debug formatting keeps a fractional or exponent marker on every
            // component, so the text never reads back as integers.
            Self::Vector4([x, y, z, w]) => write!(f, "{x:?} {y:?} {z:?} {w:?}"),
        }
    }
}
