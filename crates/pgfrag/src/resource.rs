//! Resource descriptions and statement assembly.
//!
//! A [`Resource`] bundles everything the builders need for one table: the
//! name translation table, the protected ownership columns and the recognized
//! filters. It is passed explicitly to callers instead of living in ambient
//! scope, and it can be loaded from a config file.
//!
//! A resource may also [`Join`] parent tables into its list query; columns
//! are then qualified with their table name throughout the `SELECT`.
//!
//! ```ignore
//! let res = pgfrag::jobs::resource();
//! let stmt = res.update_statement(&FieldMap::new().set("title", "J-New"), 7)?;
//! // UPDATE "jobs" SET "title"=$1 WHERE "id" = $2 RETURNING ...
//! client.query_one(stmt.sql(), &stmt.params_ref()).await?;
//! ```

use crate::error::{FragError, FragResult};
use crate::field_map::{FieldMap, FilterCriteria};
use crate::filter::{FilterDef, FilterSet};
use crate::fragment::SqlFragment;
use crate::ident::{self, Ident};
use crate::translate::NameTranslation;
use crate::update::build_set_clause_with_offset;
use crate::value::SqlValue;
use serde::{Deserialize, Serialize};

/// Everything needed to build SQL for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Resource {
    table: Ident,
    #[serde(default = "default_key_column")]
    key_column: Ident,
    /// Logical keys or columns that updates must never touch.
    #[serde(default)]
    protected: Vec<String>,
    #[serde(default)]
    translation: NameTranslation,
    #[serde(default)]
    filters: FilterSet,
    /// Logical fields returned by statements, in order.
    #[serde(default)]
    fields: Vec<String>,
    #[serde(default)]
    order_by: Option<String>,
    /// Tables joined into `select_statement` results.
    #[serde(default)]
    joins: Vec<Join>,
}

fn default_key_column() -> Ident {
    Ident::from_static("id")
}

/// A parent table joined by foreign key, e.g. a job's company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Join {
    table: Ident,
    /// Logical field of the base resource holding the foreign key.
    on: String,
    /// Key column of the joined table.
    #[serde(default = "default_key_column")]
    references: Ident,
    #[serde(default)]
    fields: Vec<JoinField>,
}

/// A joined column and the name it is returned under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JoinField {
    name: Ident,
    column: Ident,
}

impl Join {
    /// `LEFT JOIN <table> ON <table>.<references> = <base>.<on>`.
    pub fn new(table: &str, on: impl Into<String>, references: &str) -> FragResult<Self> {
        Ok(Self {
            table: Ident::new(table)?,
            on: on.into(),
            references: Ident::new(references)?,
            fields: Vec::new(),
        })
    }

    /// Return `column` of the joined table as `name`.
    pub fn field(mut self, name: &str, column: &str) -> FragResult<Self> {
        self.fields.push(JoinField {
            name: Ident::new(name)?,
            column: Ident::new(column)?,
        });
        Ok(self)
    }

    pub fn table(&self) -> &Ident {
        &self.table
    }
}

impl Resource {
    /// Create a resource for `table` keyed by `"id"`.
    pub fn new(table: &str) -> FragResult<Self> {
        Ok(Self {
            table: Ident::new(table)?,
            key_column: default_key_column(),
            protected: Vec::new(),
            translation: NameTranslation::new(),
            filters: FilterSet::default(),
            fields: Vec::new(),
            order_by: None,
            joins: Vec::new(),
        })
    }

    pub fn key_column(mut self, column: &str) -> FragResult<Self> {
        self.key_column = Ident::new(column)?;
        Ok(self)
    }

    /// Forbid updates to `key` (a logical key or a physical column).
    pub fn protect(mut self, key: impl Into<String>) -> Self {
        self.protected.push(key.into());
        self
    }

    pub fn translate(
        mut self,
        logical: impl Into<String>,
        column: impl Into<String>,
    ) -> FragResult<Self> {
        self.translation.insert(logical, column)?;
        Ok(self)
    }

    pub fn filters(mut self, defs: impl IntoIterator<Item = FilterDef>) -> FragResult<Self> {
        self.filters = FilterSet::new(defs)?;
        Ok(self)
    }

    pub fn fields(mut self, fields: &[&str]) -> FragResult<Self> {
        for f in fields {
            ident::validate(self.translation.column_for(f))?;
        }
        self.fields = fields.iter().map(|s| s.to_string()).collect();
        Ok(self)
    }

    pub fn order_by(mut self, field: &str) -> FragResult<Self> {
        ident::validate(self.translation.column_for(field))?;
        self.order_by = Some(field.to_string());
        Ok(self)
    }

    pub fn join(mut self, join: Join) -> FragResult<Self> {
        ident::validate(self.translation.column_for(&join.on))?;
        self.joins.push(join);
        Ok(self)
    }

    pub fn table(&self) -> &Ident {
        &self.table
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    pub fn translation(&self) -> &NameTranslation {
        &self.translation
    }

    pub fn filter_set(&self) -> &FilterSet {
        &self.filters
    }

    pub fn protected(&self) -> impl Iterator<Item = &str> {
        self.protected.iter().map(String::as_str)
    }

    /// Check the parts that deserialization cannot check on its own.
    pub fn validate(&self) -> FragResult<()> {
        let join_keys = self.joins.iter().map(|j| &j.on);
        for f in self.fields.iter().chain(self.order_by.iter()).chain(join_keys) {
            ident::validate(self.translation.column_for(f))?;
        }
        Ok(())
    }

    // ==================== Fragments ====================

    /// `SET` clause for a partial update of this resource.
    pub fn set_clause(&self, fields: &FieldMap) -> FragResult<SqlFragment> {
        self.set_clause_with_offset(fields, 0)
    }

    pub fn set_clause_with_offset(&self, fields: &FieldMap, offset: usize) -> FragResult<SqlFragment> {
        let protected: Vec<&str> = self.protected().collect();
        build_set_clause_with_offset(fields, Some(&self.translation), &protected, offset)
    }

    /// `WHERE` clause (without the keyword) for a filtered search.
    pub fn where_clause(&self, criteria: &FilterCriteria) -> FragResult<SqlFragment> {
        self.filters.build(criteria)
    }

    pub fn where_clause_with_offset(
        &self,
        criteria: &FilterCriteria,
        offset: usize,
    ) -> FragResult<SqlFragment> {
        self.filters.build_with_offset(criteria, offset)
    }

    // ==================== Statements ====================

    /// `UPDATE <table> SET ... WHERE <key> = $n [RETURNING ...]`.
    ///
    /// The key value is bound after the `SET` values.
    pub fn update_statement(
        &self,
        fields: &FieldMap,
        key: impl Into<SqlValue>,
    ) -> FragResult<SqlFragment> {
        let set = self.set_clause(fields)?;

        let mut stmt = SqlFragment::with_offset(0);
        stmt.push_str(&format!("UPDATE {} SET ", self.table));
        stmt.append(set);
        let p = stmt.bind(key.into());
        stmt.push_str(&format!(" WHERE {} = {p}", self.key_column));
        self.push_returning(&mut stmt);

        stmt.trace("update_statement");
        Ok(stmt)
    }

    /// `INSERT INTO <table> (...) VALUES (...) [RETURNING ...]`.
    ///
    /// Protected columns may be set here; they only guard updates.
    pub fn insert_statement(&self, fields: &FieldMap) -> FragResult<SqlFragment> {
        if fields.is_empty() {
            return Err(FragError::no_data());
        }

        let mut columns = Vec::with_capacity(fields.len());
        for key in fields.keys() {
            let column = self.translation.column_for(key);
            ident::validate(column)?;
            let mut quoted = String::new();
            ident::write_quoted(column, &mut quoted);
            columns.push(quoted);
        }

        let mut stmt = SqlFragment::with_offset(0);
        let placeholders: Vec<String> = fields.values().map(|v| stmt.bind(v.clone())).collect();
        stmt.push_str(&format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            columns.join(", "),
            placeholders.join(", ")
        ));
        self.push_returning(&mut stmt);

        stmt.trace("insert_statement");
        Ok(stmt)
    }

    /// `SELECT ... FROM <table> [LEFT JOIN ...] [WHERE ...] [ORDER BY ...]`.
    pub fn select_statement(&self, criteria: &FilterCriteria) -> FragResult<SqlFragment> {
        let qualifier = (!self.joins.is_empty()).then_some(&self.table);
        let filter = self.filters.build_qualified(criteria, 0, qualifier)?;

        let mut sql = format!("SELECT {} FROM {}", self.projection(qualifier), self.table);
        for join in &self.joins {
            sql.push_str(&format!(
                " LEFT JOIN {} ON {}.{} = ",
                join.table, join.table, join.references
            ));
            write_column(qualifier, self.translation.column_for(&join.on), &mut sql);
        }

        let mut stmt = SqlFragment::with_offset(0);
        stmt.push_str(&sql);
        if !filter.is_empty() {
            stmt.push_str(" WHERE ");
            stmt.append(filter);
        }
        if let Some(order_by) = &self.order_by {
            let mut col = String::from(" ORDER BY ");
            write_column(qualifier, self.translation.column_for(order_by), &mut col);
            stmt.push_str(&col);
        }

        stmt.trace("select_statement");
        Ok(stmt)
    }

    /// `SELECT ... FROM <table> WHERE <key> = $1`.
    pub fn get_statement(&self, key: impl Into<SqlValue>) -> SqlFragment {
        let mut stmt = SqlFragment::with_offset(0);
        let p = stmt.bind(key.into());
        stmt.push_str(&format!(
            "SELECT {} FROM {} WHERE {} = {p}",
            self.projection(None),
            self.table,
            self.key_column
        ));
        stmt
    }

    /// `DELETE FROM <table> WHERE <key> = $1 RETURNING <key>`.
    pub fn delete_statement(&self, key: impl Into<SqlValue>) -> SqlFragment {
        let mut stmt = SqlFragment::with_offset(0);
        let p = stmt.bind(key.into());
        stmt.push_str(&format!(
            "DELETE FROM {} WHERE {} = {p} RETURNING {}",
            self.table, self.key_column, self.key_column
        ));
        stmt
    }

    /// Column list for SELECT/RETURNING; renamed columns are aliased back to
    /// their logical name. With a qualifier, columns are prefixed by it and
    /// joined fields are appended.
    fn projection(&self, qualifier: Option<&Ident>) -> String {
        let mut cols = Vec::with_capacity(self.fields.len() + 1);
        if self.fields.is_empty() {
            cols.push(match qualifier {
                Some(table) => format!("{table}.*"),
                None => "*".to_string(),
            });
        }
        for field in &self.fields {
            let column = self.translation.column_for(field);
            let mut out = String::new();
            write_column(qualifier, column, &mut out);
            if column != field {
                out.push_str(" AS ");
                ident::write_quoted(field, &mut out);
            }
            cols.push(out);
        }
        if qualifier.is_some() {
            for join in &self.joins {
                for f in &join.fields {
                    cols.push(format!("{}.{} AS {}", join.table, f.column, f.name));
                }
            }
        }
        cols.join(", ")
    }

    fn push_returning(&self, stmt: &mut SqlFragment) {
        if !self.fields.is_empty() {
            stmt.push_str(" RETURNING ");
            stmt.push_str(&self.projection(None));
        }
    }
}

fn write_column(qualifier: Option<&Ident>, column: &str, out: &mut String) {
    if let Some(table) = qualifier {
        table.write_sql(out);
        out.push('.');
    }
    ident::write_quoted(column, out);
}
