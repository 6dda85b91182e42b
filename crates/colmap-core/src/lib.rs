//! # colmap-core
//!
//! Maps records onto SQL columns and builds the fragments of partial UPDATE
//! statements.
//!
//! This crate provides:
//! - A [`Record`] trait backed by a per-type field descriptor table, generated
//!   by `#[derive(Record)]` or registered at runtime with [`RecordSchema`]
//! - Column resolution with a lower-case fallback and an ignore sentinel
//! - `SET` clause builders (literal, positional and named placeholders) and a
//!   column enumerator for INSERT lists
//! - Parameter extraction aligned with the placeholder builders
//! - Dirty-field detection between two instances of a record
//!
//! Nothing here executes SQL: callers add the table name and `WHERE` clause
//! and bind the parameters with their own driver.
//!
//! ## Partial Updates
//!
//! ```rust
//! use colmap_core::{build_positional_set, compute_changed_columns, extract_parameter_values};
//! use colmap_derive::Record;
//!
//! #[derive(Debug, Clone, Record)]
//! struct User {
//!     id: i64,
//!     password: Option<String>,
//!     active: bool,
//! }
//!
//! let original = User { id: 145, password: Some("old".into()), active: true };
//! let mut updated = original.clone();
//! updated.password = Some("new".into());
//!
//! let dirty = compute_changed_columns(&original, &updated, &["id"]).unwrap();
//! assert_eq!(dirty, vec!["password"]);
//!
//! let set = build_positional_set(&updated, &dirty).unwrap();
//! let params = extract_parameter_values(&updated, &dirty, [updated.id]).unwrap();
//!
//! assert_eq!(format!("UPDATE users {set} WHERE id=?"), "UPDATE users SET password=? WHERE id=?");
//! assert_eq!(params.len(), 2);
//! ```
//!
//! Note that `compute_changed_columns` returns column names while the
//! field-list builders take declared names; the example works because both
//! coincide. When they differ, use [`build_named_set_by_column`].

pub mod diff;
pub mod dynamic;
pub mod error;
pub mod extract;
pub mod fragment;
pub mod patch;
pub mod record;
pub mod resolve;
pub mod value;

#[cfg(test)]
mod test_fixtures;

pub use diff::compute_changed_columns;
pub use dynamic::{DynamicRecord, FieldSpec, RecordSchema};
pub use error::{MapError, Result};
pub use extract::extract_value;
pub use fragment::{
    build_literal_set, build_named_set_by_column, build_named_set_by_field, build_positional_set,
    enumerate_columns, extract_parameter_values, EnumerationMode,
};
pub use patch::{apply_changes, present_fields, FieldNaming};
pub use record::{FieldDescriptor, FieldType, Record, RecordMut, RuntimeKind, ValueKind};
pub use resolve::{resolve_column, ColumnKind, ResolvedColumn, IGNORE_SENTINEL};
pub use value::{SqlValue, ToSqlValue};
