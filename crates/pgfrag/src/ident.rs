//! Safe SQL identifier handling.
//!
//! Every column and table name that reaches generated SQL goes through
//! [`Ident`], which always renders a double-quoted identifier. Quoting keeps
//! the case of the name and prevents collisions with reserved words.
//!
//! - Names may contain any character except NUL
//! - An embedded `"` is escaped as `""`
//!
//! # Example
//! ```ignore
//! use pgfrag::Ident;
//!
//! let c = Ident::new("first_name")?;
//! assert_eq!(c.to_sql(), r#""first_name""#);
//! # Ok::<(), pgfrag::FragError>(())
//! ```

use crate::error::{FragError, FragResult};
use std::fmt;

/// A quoted SQL identifier (column or table name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ident(String);

impl Ident {
    /// Create an identifier, rejecting names that cannot be quoted.
    pub fn new(name: &str) -> FragResult<Self> {
        validate(name)?;
        Ok(Self(name.to_string()))
    }

    /// Identifier from a literal that is known to be valid.
    pub(crate) fn from_static(name: &'static str) -> Self {
        debug_assert!(validate(name).is_ok());
        Self(name.to_string())
    }

    /// The unquoted name.
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Render the identifier as SQL.
    pub fn to_sql(&self) -> String {
        let mut out = String::with_capacity(self.0.len() + 2);
        self.write_sql(&mut out);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        write_quoted(&self.0, out);
    }
}

impl serde::Serialize for Ident {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> serde::Deserialize<'de> for Ident {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        validate(&name).map_err(serde::de::Error::custom)?;
        Ok(Self(name))
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

/// Check that `name` can be rendered as a quoted identifier.
pub(crate) fn validate(name: &str) -> FragResult<()> {
    if name.is_empty() {
        return Err(FragError::invalid_identifier("Identifier cannot be empty"));
    }
    if name.contains('\0') {
        return Err(FragError::invalid_identifier(
            "Identifier cannot contain NUL character",
        ));
    }
    Ok(())
}

/// Append `name` to `out` as a quoted identifier.
///
/// Callers validate `name` first; see [`validate`].
pub(crate) fn write_quoted(name: &str, out: &mut String) {
    out.push('"');
    for ch in name.chars() {
        if ch == '"' {
            out.push('"');
            out.push('"');
        } else {
            out.push(ch);
        }
    }
    out.push('"');
}
