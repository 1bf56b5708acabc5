//! # pgfrag
//!
//! Parameterized SQL fragments for partial updates and filtered search on
//! PostgreSQL.
//!
//! ## Features
//!
//! - **Partial updates**: a sparse [`FieldMap`] becomes `"col"=$1, "other"=$2`
//! - **Filtered search**: optional criteria become AND-joined predicates
//! - **Stable numbering**: the Nth placeholder always refers to the Nth parameter
//! - **Safe identifiers**: every column is double-quoted and escaped
//! - **Safe defaults**: empty updates, protected columns and unknown filters are
//!   errors, never silently dropped
//!
//! Both builders are pure functions. Executing the SQL is left to the caller:
//!
//! ```ignore
//! use pgfrag::{jobs, FieldMap};
//!
//! let fields = FieldMap::new().set("title", "J-New");
//! let set = jobs::resource().set_clause(&fields)?;
//! let sql = format!(
//!     "UPDATE jobs SET {} WHERE id = ${} RETURNING id",
//!     set.sql(),
//!     set.next_placeholder()
//! );
//! let mut params = set.params_ref();
//! params.push(&job_id);
//! client.query_one(&sql, &params).await?;
//! ```
//!
//! Enable the `tracing` feature to emit each generated fragment at DEBUG level
//! on the `pgfrag.sql` target.

pub mod error;
pub mod field_map;
pub mod filter;
pub mod fragment;
pub mod ident;
pub mod jobs;
pub mod resource;
pub mod translate;
pub mod update;
pub mod value;

pub use error::{FragError, FragResult, InvalidInput};
pub use field_map::{FieldMap, FilterCriteria};
pub use filter::{FilterDef, FilterKind, FilterSet};
pub use fragment::SqlFragment;
pub use ident::Ident;
pub use resource::{Join, JoinField, Resource};
pub use translate::NameTranslation;
pub use update::{build_set_clause, build_set_clause_with_offset};
pub use value::SqlValue;
