//! Partial-update `SET` clause builder.
//!
//! Turns a sparse [`FieldMap`] into `"col"=$1, "other"=$2` plus the values in
//! the same order. The clause is meant to be spliced into
//! `UPDATE <table> SET <clause> WHERE ...`.

use crate::error::{FragError, FragResult};
use crate::field_map::FieldMap;
use crate::fragment::SqlFragment;
use crate::ident;
use crate::translate::NameTranslation;

/// Build a `SET` clause for `fields`.
///
/// - `translation` maps logical keys to columns; `None` uses every key verbatim.
/// - `protected` lists keys and columns that must never be updated. A field is
///   rejected if either its logical key or its translated column is listed.
///
/// # Errors
///
/// - [`InvalidInput::NoData`](crate::InvalidInput::NoData) when `fields` is empty
/// - [`InvalidInput::ProtectedField`](crate::InvalidInput::ProtectedField) when a
///   protected field is present
/// - [`InvalidInput::InvalidIdentifier`](crate::InvalidInput::InvalidIdentifier)
///   when a key cannot be used as a column name
pub fn build_set_clause(
    fields: &FieldMap,
    translation: Option<&NameTranslation>,
    protected: &[&str],
) -> FragResult<SqlFragment> {
    build_set_clause_with_offset(fields, translation, protected, 0)
}

/// Like [`build_set_clause`], numbering placeholders from `offset + 1`.
pub fn build_set_clause_with_offset(
    fields: &FieldMap,
    translation: Option<&NameTranslation>,
    protected: &[&str],
    offset: usize,
) -> FragResult<SqlFragment> {
    if fields.is_empty() {
        return Err(FragError::no_data());
    }

    let empty = NameTranslation::new();
    let translation = translation.unwrap_or(&empty);

    // Validate everything before producing any text.
    let mut columns = Vec::with_capacity(fields.len());
    for key in fields.keys() {
        let column = translation.column_for(key);
        if protected.iter().any(|p| *p == key || *p == column) {
            return Err(FragError::protected_field(key));
        }
        ident::validate(column)?;
        columns.push(column);
    }

    let mut frag = SqlFragment::with_offset(offset);
    let mut sql = String::new();
    for (i, (column, value)) in columns.into_iter().zip(fields.values()).enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        ident::write_quoted(column, &mut sql);
        sql.push('=');
        sql.push_str(&frag.bind(value.clone()));
    }
    frag.push_str(&sql);

    frag.trace("set");
    Ok(frag)
}
