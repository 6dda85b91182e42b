//! Helpers for building partial updates.
//!
//! [`apply_changes`] writes a set of named values onto a record, typically
//! decoded from a request body, and [`present_fields`] lists the fields that
//! currently hold a value. Together with
//! [`compute_changed_columns`](crate::diff::compute_changed_columns) they
//! cover the load, patch, diff, update cycle.

use crate::error::Result;
use crate::record::{descriptors, Record, RecordMut};
use crate::resolve::{resolve_column, resolve_field};
use crate::value::SqlValue;

/// Which name [`present_fields`] reports for each field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FieldNaming {
    /// The declared field name.
    #[default]
    Declared,
    /// The resolved column name.
    Column,
}

/// Lists the non-ignored fields that hold a value, in declaration order.
///
/// Required fields always hold a value; optionals only when present.
pub fn present_fields<R: Record + ?Sized>(record: &R, naming: FieldNaming) -> Vec<String> {
    descriptors(record)
        .filter_map(|(index, d)| resolve_column(&d).map(|column| (index, d, column)))
        .filter(|(index, _, _)| record.value(*index).is_some())
        .map(|(_, d, column)| match naming {
            FieldNaming::Declared => String::from(d.name),
            FieldNaming::Column => column.name.into_owned(),
        })
        .collect()
}

/// Writes `(declared name, value)` pairs onto `record`.
///
/// A `None` value clears an optional field. Either every change is applied
/// or, on the first error, none is: unknown and ignored names fail with
/// `InvalidField`, values that do not fit with `ValueTypeMismatch`, and
/// clearing a required field with `NullOptionalField`.
pub fn apply_changes<R, I, S>(record: &mut R, changes: I) -> Result<()>
where
    R: RecordMut + Clone,
    I: IntoIterator<Item = (S, Option<SqlValue>)>,
    S: AsRef<str>,
{
    let mut staged = record.clone();
    for (name, value) in changes {
        let (index, _) = resolve_field(&staged, name.as_ref())?;
        staged.set_value(index, value)?;
    }
    *record = staged;
    Ok(())
}
