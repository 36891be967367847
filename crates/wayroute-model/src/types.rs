//! Value types shared across the router layers.

use std::fmt;

/// A typed value extracted from a route placeholder.
///
/// Untyped placeholders always produce [`ParamValue::Str`]; typed ones
/// produce whatever their converter's parser returns.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Raw decoded string (untyped placeholders, `alnum`, `hexa`, `path`).
    Str(String),
    /// Integer value (`int`).
    Int(i64),
    /// Floating point value (`float`).
    Float(f64),
    /// Comma-separated integer list (`list_int`).
    IntList(Vec<i64>),
}

impl ParamValue {
    /// The string value, if this is a [`ParamValue::Str`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The integer value, if this is a [`ParamValue::Int`].
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// The float value, if this is a [`ParamValue::Float`].
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// The integer list, if this is a [`ParamValue::IntList`].
    #[must_use]
    pub fn as_int_list(&self) -> Option<&[i64]> {
        match self {
            Self::IntList(xs) => Some(xs),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::IntList(xs) => {
                for (idx, x) in xs.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{x}")?;
                }
                Ok(())
            }
        }
    }
}

/// Content encoding applied to a response body.
///
/// Doubles as the secondary cache key: the same logical response may be
/// cached once per encoding the clients accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContentEncoding {
    /// No transformation; no `Content-Encoding` header is emitted.
    #[default]
    Identity,
    /// RFC 1952 gzip.
    Gzip,
    /// RFC 1950 zlib ("deflate" in HTTP terms).
    Deflate,
}

impl ContentEncoding {
    /// The `Content-Encoding` header value, or `None` for identity.
    #[must_use]
    pub fn header_value(self) -> Option<&'static str> {
        match self {
            Self::Identity => None,
            Self::Gzip => Some("gzip"),
            Self::Deflate => Some("deflate"),
        }
    }
}

impl fmt::Display for ContentEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header_value().unwrap_or("identity"))
    }
}
