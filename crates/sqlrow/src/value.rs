//! Scalar values exchanged with the database.
//!
//! The mapper works without compile-time schema knowledge, so every field
//! value travels as a [`Value`]. The variants mirror what the two supported
//! backends can actually hand back over their text-oriented interfaces:
//! nulls, 64-bit integers, doubles, and text. Dates and BLOBs surface as
//! text, matching their TEXT primitive classification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single field value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL (also the state of a column no value was loaded into)
    #[default]
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// True for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// True when the value can be written into a NUMERIC column.
    ///
    /// Text counts as numeric when it parses as a finite number, so values
    /// arriving from forms or CSVs as `"42"` pass validation the same way a
    /// native integer does. Null is not numeric; nullability is a separate
    /// check.
    pub fn is_numeric(&self) -> bool {
        match self {
            Self::Int(_) | Self::Float(_) => true,
            Self::Text(s) => is_numeric_text(s),
            Self::Null => false,
        }
    }

    /// Return the integer form of this value, if it has one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Return the text form of this value, if it has one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

pub(crate) fn is_numeric_text(s: &str) -> bool {
    s.trim().parse::<f64>().map(|v| v.is_finite()).unwrap_or(false)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(v as f64)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_classification() {
        assert!(Value::Int(42).is_numeric());
        assert!(Value::Float(1.5).is_numeric());
        assert!(Value::Text("42".into()).is_numeric());
        assert!(Value::Text(" 3.25 ".into()).is_numeric());
        assert!(!Value::Text("abc".into()).is_numeric());
        assert!(!Value::Text("nan".into()).is_numeric());
        assert!(!Value::Null.is_numeric());
    }

    #[test]
    fn option_conversion() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text("x".into()));
    }

    #[test]
    fn display_renders_raw() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Int(-7).to_string(), "-7");
        assert_eq!(Value::Text("O'Brien".into()).to_string(), "O'Brien");
    }
}
