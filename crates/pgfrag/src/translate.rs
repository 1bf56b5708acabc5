//! Logical name to physical column translation.

use crate::error::{FragError, FragResult};
use crate::ident;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Immutable map of logical field names to physical column names.
///
/// Lookup is presence based: a mapped key always uses its mapped column and an
/// unmapped key is used verbatim. Mapped columns are validated on insert, so an
/// empty mapping never silently falls back to the logical name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NameTranslation {
    columns: BTreeMap<String, String>,
}

impl NameTranslation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mapping. Fails if `column` is not a usable identifier.
    pub fn with(mut self, logical: impl Into<String>, column: impl Into<String>) -> FragResult<Self> {
        self.insert(logical, column)?;
        Ok(self)
    }

    pub fn insert(
        &mut self,
        logical: impl Into<String>,
        column: impl Into<String>,
    ) -> FragResult<()> {
        let logical = logical.into();
        let column = column.into();
        ident::validate(&column).map_err(|_| {
            FragError::invalid_identifier(format!(
                "translation for '{logical}' must be a non-empty column name"
            ))
        })?;
        self.columns.insert(logical, column);
        Ok(())
    }

    /// Physical column for `logical`, or `logical` itself when unmapped.
    pub fn column_for<'a>(&'a self, logical: &'a str) -> &'a str {
        match self.columns.get(logical) {
            Some(column) => column,
            None => logical,
        }
    }

    pub fn contains(&self, logical: &str) -> bool {
        self.columns.contains_key(logical)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<'de> Deserialize<'de> for NameTranslation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
        let mut table = Self::new();
        for (logical, column) in raw {
            table
                .insert(logical, column)
                .map_err(serde::de::Error::custom)?;
        }
        Ok(table)
    }
}
