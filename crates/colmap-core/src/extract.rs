//! Value extraction.

use crate::error::{MapError, Result};
use crate::record::Record;
use crate::resolve::resolve_field;
use crate::value::SqlValue;

/// Reads the value of the declared field `name`, unwrapping optionals.
///
/// Fails with [`MapError::InvalidField`] for unknown or ignored fields and
/// with [`MapError::NullOptionalField`] when an optional holds no value.
pub fn extract_value<R: Record + ?Sized>(record: &R, name: &str) -> Result<SqlValue> {
    let (index, _) = resolve_field(record, name)?;
    value_at(record, index, name)
}

/// Reads the field at `index`, reporting an absent value against `name`.
pub(crate) fn value_at<R: Record + ?Sized>(
    record: &R,
    index: usize,
    name: &str,
) -> Result<SqlValue> {
    record
        .value(index)
        .ok_or_else(|| MapError::NullOptionalField(String::from(name)))
}
