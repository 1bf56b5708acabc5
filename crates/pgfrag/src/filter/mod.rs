//! Filter `WHERE` clause builder.
//!
//! A [`FilterSet`] is the recognized criteria set of one resource. Building it
//! against [`FilterCriteria`] yields AND-joined predicates such as
//! `"salary" >= $1 AND "title" ILIKE $2`.
//!
//! # Rules
//!
//! - Unknown keys are rejected, never ignored
//! - `null` criteria are treated as absent
//! - Predicates are emitted in ascending key order, so the same criteria set
//!   always produces the same SQL text regardless of input order
//! - No criteria produce an empty fragment; the caller then omits `WHERE`
//!
//! # Example
//!
//! ```ignore
//! use pgfrag::{FieldMap, FilterDef, FilterSet};
//!
//! let filters = FilterSet::new(vec![
//!     FilterDef::at_least("minSalary", "salary")?,
//!     FilterDef::contains("title", "title")?,
//! ])?;
//! let frag = filters.build(&FieldMap::new().set("minSalary", 2).set("title", "3"))?;
//! assert_eq!(frag.sql(), r#""salary" >= $1 AND "title" ILIKE $2"#);
//! # Ok::<(), pgfrag::FragError>(())
//! ```

use crate::error::{FragError, FragResult};
use crate::field_map::FilterCriteria;
use crate::fragment::SqlFragment;
use crate::ident::Ident;
use crate::value::SqlValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a filter turns its value into a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    /// `"col" >= $N`, numeric value
    AtLeast,
    /// `"col" <= $N`, numeric value
    AtMost,
    /// `"col" ILIKE $N` bound as `%value%`, string value
    Contains,
    /// `"col" <> '0'` when the value is `true`; nothing when `false`
    NonZero,
}

impl FilterKind {
    fn expects(self) -> &'static str {
        match self {
            Self::AtLeast | Self::AtMost => "a number",
            Self::Contains => "a string",
            Self::NonZero => "a boolean",
        }
    }
}

/// One recognized filter key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFilterDef")]
pub struct FilterDef {
    key: String,
    column: Ident,
    kind: FilterKind,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFilterDef {
    key: String,
    column: String,
    kind: FilterKind,
}

impl TryFrom<RawFilterDef> for FilterDef {
    type Error = FragError;

    fn try_from(raw: RawFilterDef) -> FragResult<Self> {
        Self::new(raw.key, &raw.column, raw.kind)
    }
}

impl FilterDef {
    pub fn new(key: impl Into<String>, column: &str, kind: FilterKind) -> FragResult<Self> {
        Ok(Self {
            key: key.into(),
            column: Ident::new(column)?,
            kind,
        })
    }

    pub fn at_least(key: impl Into<String>, column: &str) -> FragResult<Self> {
        Self::new(key, column, FilterKind::AtLeast)
    }

    pub fn at_most(key: impl Into<String>, column: &str) -> FragResult<Self> {
        Self::new(key, column, FilterKind::AtMost)
    }

    pub fn contains(key: impl Into<String>, column: &str) -> FragResult<Self> {
        Self::new(key, column, FilterKind::Contains)
    }

    pub fn non_zero(key: impl Into<String>, column: &str) -> FragResult<Self> {
        Self::new(key, column, FilterKind::NonZero)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn column(&self) -> &Ident {
        &self.column
    }

    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    /// Append this filter's predicate for `value`, or nothing.
    fn push_predicate(
        &self,
        value: &SqlValue,
        qualifier: Option<&Ident>,
        frag: &mut SqlFragment,
        out: &mut Vec<String>,
    ) -> FragResult<()> {
        let col = match qualifier {
            Some(table) => format!("{table}.{}", self.column),
            None => self.column.to_sql(),
        };
        match (self.kind, value) {
            (FilterKind::AtLeast, v) if v.is_number() => {
                out.push(format!("{col} >= {}", frag.bind(v.clone())));
            }
            (FilterKind::AtMost, v) if v.is_number() => {
                out.push(format!("{col} <= {}", frag.bind(v.clone())));
            }
            (FilterKind::Contains, SqlValue::Text(s)) => {
                let pattern = format!("%{}%", escape_like(s));
                out.push(format!("{col} ILIKE {}", frag.bind(SqlValue::Text(pattern))));
            }
            (FilterKind::NonZero, SqlValue::Bool(true)) => {
                out.push(format!("{col} <> '0'"));
            }
            (FilterKind::NonZero, SqlValue::Bool(false)) => {}
            (kind, v) => {
                return Err(FragError::invalid_value(
                    &self.key,
                    format!("expected {}, got {}", kind.expects(), v.kind()),
                ));
            }
        }
        Ok(())
    }
}

/// The recognized criteria of one resource, keyed by filter name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FilterDef>", into = "Vec<FilterDef>")]
pub struct FilterSet {
    defs: BTreeMap<String, FilterDef>,
}

impl TryFrom<Vec<FilterDef>> for FilterSet {
    type Error = FragError;

    fn try_from(defs: Vec<FilterDef>) -> FragResult<Self> {
        Self::new(defs)
    }
}

impl From<FilterSet> for Vec<FilterDef> {
    fn from(set: FilterSet) -> Self {
        set.defs.into_values().collect()
    }
}

impl FilterSet {
    /// Create a filter set. Fails if two definitions share a key.
    pub fn new(defs: impl IntoIterator<Item = FilterDef>) -> FragResult<Self> {
        let mut map = BTreeMap::new();
        for def in defs {
            if map.contains_key(&def.key) {
                return Err(FragError::duplicate_key(def.key));
            }
            map.insert(def.key.clone(), def);
        }
        Ok(Self { defs: map })
    }

    pub fn get(&self, key: &str) -> Option<&FilterDef> {
        self.defs.get(key)
    }

    pub fn is_recognized(&self, key: &str) -> bool {
        self.defs.contains_key(key)
    }

    /// Recognized keys in predicate order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.defs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Build the `WHERE` fragment (without the keyword) for `criteria`.
    pub fn build(&self, criteria: &FilterCriteria) -> FragResult<SqlFragment> {
        self.build_with_offset(criteria, 0)
    }

    /// Like [`FilterSet::build`], numbering placeholders from `offset + 1`.
    pub fn build_with_offset(
        &self,
        criteria: &FilterCriteria,
        offset: usize,
    ) -> FragResult<SqlFragment> {
        self.build_qualified(criteria, offset, None)
    }

    /// Like [`FilterSet::build_with_offset`], with every column prefixed by
    /// `qualifier` (`"jobs"."salary"`) for statements that join tables.
    pub(crate) fn build_qualified(
        &self,
        criteria: &FilterCriteria,
        offset: usize,
        qualifier: Option<&Ident>,
    ) -> FragResult<SqlFragment> {
        if let Some(unknown) = criteria.keys().find(|k| !self.is_recognized(k)) {
            return Err(FragError::unrecognized_filter(unknown));
        }

        let mut frag = SqlFragment::with_offset(offset);
        let mut predicates = Vec::new();
        for (key, def) in &self.defs {
            match criteria.get(key) {
                None | Some(SqlValue::Null) => continue,
                Some(value) => def.push_predicate(value, qualifier, &mut frag, &mut predicates)?,
            }
        }
        frag.push_str(&predicates.join(" AND "));

        frag.trace("where");
        Ok(frag)
    }
}

/// Escape LIKE metacharacters so `s` matches literally.
pub fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
