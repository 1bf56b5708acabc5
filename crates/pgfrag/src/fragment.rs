//! Generated SQL fragments and their parameters.

use crate::value::SqlValue;
use tokio_postgres::types::ToSql;

/// SQL text plus the values for its `$N` placeholders, in order.
///
/// The Nth placeholder after the fragment's offset refers to `params[N - 1]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlFragment {
    sql: String,
    params: Vec<SqlValue>,
    offset: usize,
}

impl SqlFragment {
    /// An empty fragment whose first placeholder will be `$offset + 1`.
    pub(crate) fn with_offset(offset: usize) -> Self {
        Self {
            sql: String::new(),
            params: Vec::new(),
            offset,
        }
    }

    /// Bind a value and return its placeholder text (`$N`).
    pub(crate) fn bind(&mut self, value: SqlValue) -> String {
        self.params.push(value);
        format!("${}", self.offset + self.params.len())
    }

    pub(crate) fn push_str(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    /// Append `other`, which must have been numbered to follow this fragment.
    pub(crate) fn append(&mut self, other: SqlFragment) {
        debug_assert_eq!(other.offset, self.offset + self.params.len());
        self.sql.push_str(&other.sql);
        self.params.extend(other.params);
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    /// Number of placeholders preceding this fragment in the final statement.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// `true` when no SQL was produced (e.g. no filter criteria).
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    /// Number of bound parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Index of the next free placeholder, for parameters the caller appends.
    pub fn next_placeholder(&self) -> usize {
        self.offset + self.params.len() + 1
    }

    /// Get all parameters as references for tokio-postgres.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|p| p as &(dyn ToSql + Sync))
            .collect()
    }

    pub fn into_parts(self) -> (String, Vec<SqlValue>) {
        (self.sql, self.params)
    }

    #[cfg(feature = "tracing")]
    pub(crate) fn trace(&self, kind: &'static str) {
        tracing::debug!(
            target: "pgfrag.sql",
            kind,
            sql = %self.sql,
            params = self.params.len(),
            offset = self.offset,
            "built fragment"
        );
    }

    #[cfg(not(feature = "tracing"))]
    pub(crate) fn trace(&self, _kind: &'static str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_numbers_from_offset() {
        let mut frag = SqlFragment::with_offset(2);
        assert_eq!(frag.bind(SqlValue::Int(1)), "$3");
        assert_eq!(frag.bind(SqlValue::Int(2)), "$4");
        assert_eq!(frag.next_placeholder(), 5);
        assert_eq!(frag.params_ref().len(), 2);
    }

    #[test]
    fn append_keeps_numbering() {
        let mut head = SqlFragment::with_offset(0);
        let p = head.bind(SqlValue::Int(1));
        head.push_str(&format!("a = {p}"));

        let mut tail = SqlFragment::with_offset(head.len());
        let p = tail.bind(SqlValue::Int(2));
        tail.push_str(&format!(" AND b = {p}"));

        head.append(tail);
        assert_eq!(head.sql(), "a = $1 AND b = $2");
        assert_eq!(head.params(), [SqlValue::Int(1), SqlValue::Int(2)]);
    }

    #[test]
    fn default_is_empty() {
        let frag = SqlFragment::default();
        assert!(frag.is_empty());
        assert_eq!(frag.len(), 0);
        assert_eq!(frag.next_placeholder(), 1);
        assert_eq!(frag.into_parts(), (String::new(), Vec::new()));
    }
}
