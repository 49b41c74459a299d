//! SQL identifier validation.
//!
//! Statement text is assembled by concatenation, so the table name handed to
//! a record operation, and every column name the backend reports, must be a
//! plain identifier: `[A-Za-z_][A-Za-z0-9_$]*`. Quoted or exotic identifiers
//! are rejected up front rather than escaped per dialect.

/// Check whether `name` is a plain, concatenation-safe SQL identifier.
pub(crate) fn is_valid_ident(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c == '$' || c.is_ascii_alphanumeric())
}
