//! Column resolution.
//!
//! Maps a field descriptor to the column name and column kind used in
//! generated SQL. Every builder and the diff engine go through
//! [`resolve_column`], so a given field always resolves to the same column.

use std::borrow::Cow;
use std::fmt;

use crate::error::{MapError, Result};
use crate::record::{FieldDescriptor, Record, ValueKind};

/// Column annotation that excludes a field from every operation.
pub const IGNORE_SENTINEL: &str = "-";

/// Storage kind of a column. Decides whether literal values are quoted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    /// Character data, quoted.
    Varchar,
    /// Numbers, unquoted.
    Numeric,
    /// Dates and timestamps, quoted.
    Date,
    /// Booleans, unquoted.
    Boolean,
    /// Any other annotated kind, kept uppercased; unquoted.
    Custom(String),
}

impl ColumnKind {
    /// Builds a kind from an explicit annotation (case-insensitive).
    #[must_use]
    pub fn from_annotation(annotation: &str) -> Self {
        let upper = annotation.to_uppercase();
        match upper.as_str() {
            "VARCHAR" => Self::Varchar,
            "NUMERIC" => Self::Numeric,
            "DATE" => Self::Date,
            "BOOLEAN" => Self::Boolean,
            _ => Self::Custom(upper),
        }
    }

    /// Infers a kind from the field's value kind.
    #[must_use]
    pub const fn infer(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Integer | ValueKind::Float => Self::Numeric,
            ValueKind::Bool => Self::Boolean,
            ValueKind::Date => Self::Date,
            ValueKind::String | ValueKind::Other => Self::Varchar,
        }
    }

    /// Returns `true` if literal values of this kind are single-quoted.
    #[must_use]
    pub const fn is_quoted(&self) -> bool {
        matches!(self, Self::Varchar | Self::Date)
    }

    /// Returns the SQL name of this kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Varchar => "VARCHAR",
            Self::Numeric => "NUMERIC",
            Self::Date => "DATE",
            Self::Boolean => "BOOLEAN",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field resolved to its database column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumn<'a> {
    /// Column name.
    pub name: Cow<'a, str>,
    /// Column kind.
    pub kind: ColumnKind,
}

/// Returns `true` if the descriptor carries the ignore sentinel.
#[must_use]
pub fn is_ignored(descriptor: &FieldDescriptor<'_>) -> bool {
    descriptor.column == Some(IGNORE_SENTINEL)
}

/// Resolves a field descriptor to its column, or `None` if the field is
/// ignored.
///
/// Without a column annotation the declared name is lower-cased as is;
/// `FieldName` becomes `fieldname`, not `field_name`.
#[must_use]
pub fn resolve_column<'a>(descriptor: &FieldDescriptor<'a>) -> Option<ResolvedColumn<'a>> {
    if is_ignored(descriptor) {
        return None;
    }

    let name = match descriptor.column {
        Some(column) if !column.is_empty() => Cow::Borrowed(column),
        _ => Cow::Owned(descriptor.name.to_lowercase()),
    };

    let kind = match descriptor.kind {
        Some(kind) if !kind.is_empty() => ColumnKind::from_annotation(kind),
        _ => ColumnKind::infer(descriptor.runtime.value_kind()),
    };

    Some(ResolvedColumn { name, kind })
}

/// Looks up the declared field `name` on `record` and resolves its column.
///
/// Unknown and ignored fields both fail with [`MapError::InvalidField`].
pub fn resolve_field<'r, R: Record + ?Sized>(
    record: &'r R,
    name: &str,
) -> Result<(usize, ResolvedColumn<'r>)> {
    let invalid = || MapError::InvalidField(String::from(name));
    let index = record.position(name).ok_or_else(invalid)?;
    let descriptor = record.descriptor(index).ok_or_else(invalid)?;
    let column = resolve_column(&descriptor).ok_or_else(invalid)?;
    Ok((index, column))
}
