//! Value escaping for statement assembly.
//!
//! One dialect-agnostic strategy: NUMERIC values render unquoted after
//! validation, everything else renders quote-delimited with embedded quotes
//! doubled. Adequate for quote-delimited literals; parameter binding is the
//! stronger alternative where a driver offers it (see
//! [`Connection`](crate::Connection)).

use crate::error::{MapperError, MapperResult};
use crate::schema::PrimitiveClass;
use crate::value::Value;

/// Render `value` as a statement fragment for a column of the given class.
///
/// `column` is used for error reporting only.
///
/// NUMERIC: null renders as the literal `NULL`, numbers render as-is, and
/// anything else fails `TypeMismatch`. TEXT: any scalar renders quoted with
/// `'` doubled; null renders as `NULL` so loaded nulls round-trip.
pub fn escape(column: &str, value: &Value, class: PrimitiveClass) -> MapperResult<String> {
    match class {
        PrimitiveClass::Numeric => match value {
            Value::Null => Ok("NULL".to_string()),
            Value::Int(v) => Ok(v.to_string()),
            Value::Float(v) => Ok(v.to_string()),
            Value::Text(s) if value.is_numeric() => Ok(s.trim().to_string()),
            other => Err(MapperError::TypeMismatch {
                column: column.to_string(),
                expected: PrimitiveClass::Numeric,
                value: other.to_string(),
            }),
        },
        PrimitiveClass::Text => match value {
            Value::Null => Ok("NULL".to_string()),
            Value::Int(v) => Ok(quote(&v.to_string())),
            Value::Float(v) => Ok(quote(&v.to_string())),
            Value::Text(s) => Ok(quote(s)),
        },
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        if ch == '\'' {
            out.push('\'');
        }
        out.push(ch);
    }
    out.push('\'');
    out
}
