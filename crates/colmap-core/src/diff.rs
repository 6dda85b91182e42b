//! Dirty-field detection.
//!
//! Compares two records of the same shape and reports the columns whose
//! values differ, ready to feed [`build_named_set_by_column`] for a partial
//! UPDATE.
//!
//! [`build_named_set_by_column`]: crate::fragment::build_named_set_by_column

use crate::error::{MapError, Result};
use crate::record::{descriptors, same_shape, Record};
use crate::resolve::resolve_column;
use crate::value::SqlValue;

/// Returns the resolved column names of the fields whose values differ
/// between `original` and `updated`, in declaration order.
///
/// Fields whose declared name is in `skip_fields` and ignored fields are not
/// compared. Absent optionals are compared asymmetrically:
///
/// | original | updated | changed |
/// |----------|---------|---------|
/// | absent   | any     | no      |
/// | present  | absent  | yes     |
/// | present  | present | if unequal |
///
/// Fails with [`MapError::ShapeMismatch`] unless both records have the same
/// shape name and descriptor table.
pub fn compute_changed_columns<A, B, S>(
    original: &A,
    updated: &B,
    skip_fields: &[S],
) -> Result<Vec<String>>
where
    A: Record + ?Sized,
    B: Record + ?Sized,
    S: AsRef<str>,
{
    if !same_shape(original, updated) {
        return Err(MapError::ShapeMismatch {
            original: String::from(original.shape_name()),
            updated: String::from(updated.shape_name()),
        });
    }

    let changed = descriptors(original)
        .filter(|(_, d)| !skip_fields.iter().any(|s| s.as_ref() == d.name))
        .filter_map(|(index, d)| resolve_column(&d).map(|column| (index, column)))
        .filter(|(index, _)| is_changed(original.value(*index), updated.value(*index)))
        .map(|(_, column)| column.name.into_owned())
        .collect();

    Ok(changed)
}

fn is_changed(original: Option<SqlValue>, updated: Option<SqlValue>) -> bool {
    match (original, updated) {
        (None, _) => false,
        (Some(_), None) => true,
        (Some(before), Some(after)) => before != after,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::{DynamicRecord, FieldSpec, RecordSchema};
    use crate::record::{RecordMut, ValueKind};
    use crate::test_fixtures::{user, user_without_city};
    use std::sync::Arc;

    const NO_SKIP: &[&str] = &[];

    fn with(record: &DynamicRecord, name: &str, value: Option<SqlValue>) -> DynamicRecord {
        let mut copy = record.clone();
        let index = copy.position(name).unwrap();
        copy.set_value(index, value).unwrap();
        copy
    }

    #[test]
    fn test_identical_records_have_no_changes() {
        assert!(compute_changed_columns(&user(), &user(), NO_SKIP)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_single_changed_field() {
        let updated = with(&user(), "password", Some(SqlValue::Text(String::from("other"))));
        assert_eq!(
            compute_changed_columns(&user(), &updated, NO_SKIP).unwrap(),
            vec!["password"]
        );
    }

    #[test]
    fn test_reports_column_names_in_declaration_order() {
        let updated = with(&user(), "active", Some(SqlValue::Bool(false)));
        let updated = with(&updated, "email", Some(SqlValue::Text(String::from("a@b.uy"))));
        assert_eq!(
            compute_changed_columns(&user(), &updated, NO_SKIP).unwrap(),
            vec!["mail", "active"]
        );
    }

    #[test]
    fn test_skip_fields_use_declared_names() {
        let updated = with(&user(), "email", Some(SqlValue::Text(String::from("a@b.uy"))));
        assert!(compute_changed_columns(&user(), &updated, &["email"])
            .unwrap()
            .is_empty());
        // The column name does not skip it
        assert_eq!(
            compute_changed_columns(&user(), &updated, &["mail"]).unwrap(),
            vec!["mail"]
        );
    }

    #[test]
    fn test_ignored_fields_are_not_compared() {
        let updated = with(&user(), "session", Some(SqlValue::Text(String::from("new"))));
        assert!(compute_changed_columns(&user(), &updated, NO_SKIP)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_absent_original_is_never_changed() {
        let original = user_without_city();
        assert!(compute_changed_columns(&original, &user(), NO_SKIP)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_cleared_optional_is_changed() {
        assert_eq!(
            compute_changed_columns(&user(), &user_without_city(), NO_SKIP).unwrap(),
            vec!["city"]
        );
    }

    #[test]
    fn test_shape_mismatch() {
        let other = DynamicRecord::new(
            Arc::new(RecordSchema::new("Account").field(FieldSpec::new("id", ValueKind::Integer))),
            vec![Some(SqlValue::Int(145))],
        )
        .unwrap();
        assert_eq!(
            compute_changed_columns(&user(), &other, NO_SKIP),
            Err(MapError::ShapeMismatch {
                original: String::from("User"),
                updated: String::from("Account"),
            })
        );
    }

    #[test]
    fn test_same_name_different_fields_is_mismatch() {
        let other = DynamicRecord::new(
            Arc::new(RecordSchema::new("User").field(FieldSpec::new("id", ValueKind::Integer))),
            vec![Some(SqlValue::Int(145))],
        )
        .unwrap();
        assert!(matches!(
            compute_changed_columns(&user(), &other, NO_SKIP),
            Err(MapError::ShapeMismatch { .. })
        ));
    }
}
