//! Error types for pgfrag

use std::fmt;
use thiserror::Error;

/// Result type alias for pgfrag operations
pub type FragResult<T> = Result<T, FragError>;

/// The kind of caller-input defect behind an [`FragError::InvalidInput`].
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidInput {
    /// An update was requested with no fields.
    NoData,
    /// An update targets the ownership column.
    ProtectedField(String),
    /// A filter key outside the recognized set.
    UnrecognizedFilter(String),
    /// A value of the wrong kind for its key.
    InvalidValue { key: String, message: String },
    /// An identifier that cannot be rendered as SQL.
    InvalidIdentifier(String),
    /// The same key appeared twice in one input object.
    DuplicateKey(String),
}

impl fmt::Display for InvalidInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoData => f.write_str("no data supplied"),
            Self::ProtectedField(key) => {
                write!(f, "protected field cannot be updated: {key}")
            }
            Self::UnrecognizedFilter(key) => write!(f, "unrecognized filter: {key}"),
            Self::InvalidValue { key, message } => {
                write!(f, "invalid value for '{key}': {message}")
            }
            Self::InvalidIdentifier(message) => write!(f, "invalid identifier: {message}"),
            Self::DuplicateKey(key) => write!(f, "duplicate key: {key}"),
        }
    }
}

/// Error types for fragment building
#[derive(Debug, Error)]
pub enum FragError {
    /// Caller supplied input the builders refuse to turn into SQL
    #[error("Invalid input: {0}")]
    InvalidInput(InvalidInput),

    /// Input object could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FragError {
    /// Create a "no data" error
    pub fn no_data() -> Self {
        Self::InvalidInput(InvalidInput::NoData)
    }

    /// Create a protected-field error
    pub fn protected_field(key: impl Into<String>) -> Self {
        Self::InvalidInput(InvalidInput::ProtectedField(key.into()))
    }

    /// Create an unrecognized-filter error
    pub fn unrecognized_filter(key: impl Into<String>) -> Self {
        Self::InvalidInput(InvalidInput::UnrecognizedFilter(key.into()))
    }

    /// Create an invalid-value error for a specific key
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput(InvalidInput::InvalidValue {
            key: key.into(),
            message: message.into(),
        })
    }

    /// Create an invalid-identifier error
    pub fn invalid_identifier(message: impl Into<String>) -> Self {
        Self::InvalidInput(InvalidInput::InvalidIdentifier(message.into()))
    }

    /// Create a duplicate-key error
    pub fn duplicate_key(key: impl Into<String>) -> Self {
        Self::InvalidInput(InvalidInput::DuplicateKey(key.into()))
    }

    /// The input kind, if this is an input error.
    pub fn invalid_input(&self) -> Option<&InvalidInput> {
        match self {
            Self::InvalidInput(kind) => Some(kind),
            Self::Json(_) => None,
        }
    }

    /// Whether the error is a client-side input defect (400 class).
    ///
    /// Malformed JSON counts as well: it can only come from the caller.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::Json(_))
    }

    /// Check if this is a protected-field error
    pub fn is_protected_field(&self) -> bool {
        matches!(self, Self::InvalidInput(InvalidInput::ProtectedField(_)))
    }

    /// Check if this is an unrecognized-filter error
    pub fn is_unrecognized_filter(&self) -> bool {
        matches!(self, Self::InvalidInput(InvalidInput::UnrecognizedFilter(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(FragError::no_data().to_string(), "Invalid input: no data supplied");
        assert_eq!(
            FragError::protected_field("companyHandle").to_string(),
            "Invalid input: protected field cannot be updated: companyHandle"
        );
        assert_eq!(
            FragError::unrecognized_filter("nope").to_string(),
            "Invalid input: unrecognized filter: nope"
        );
    }

    #[test]
    fn json_errors_are_client_errors() {
        let err: FragError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(err.is_invalid_input());
        assert!(err.invalid_input().is_none());
    }

    #[test]
    fn kind_predicates() {
        assert!(FragError::protected_field("x").is_protected_field());
        assert!(!FragError::no_data().is_protected_field());
        assert!(FragError::unrecognized_filter("x").is_unrecognized_filter());
        assert_eq!(FragError::no_data().invalid_input(), Some(&InvalidInput::NoData));
    }
}
