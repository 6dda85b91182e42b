//! SQL fragment builders.
//!
//! Builders for the `SET` clause of an UPDATE statement in three styles
//! (literal values, `?` placeholders, `:name` placeholders), a whole-record
//! column enumerator, and the parameter extractor that pairs with the
//! placeholder styles.
//!
//! The field-list builders ([`build_literal_set`], [`build_positional_set`],
//! [`build_named_set_by_field`]) and [`extract_parameter_values`] walk the
//! field list in the caller's order and resolve every entry the same way, so
//! the i-th assignment always lines up with the i-th parameter:
//!
//! ```text
//! build_positional_set(user, ["password", "id"])   -> "SET password=?,id=?"
//! extract_parameter_values(user, ["password", "id"], [id])
//!                                                  -> [password, id, id]
//! ```
//!
//! The caller appends `WHERE ...` and prepends `UPDATE <table> `.

use crate::error::{MapError, Result};
use crate::extract::value_at;
use crate::record::{descriptors, Record};
use crate::resolve::{resolve_column, resolve_field, ResolvedColumn};
use crate::value::{SqlValue, ToSqlValue};

/// How [`enumerate_columns`] renders each column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EnumerationMode {
    /// `col`
    #[default]
    Plain,
    /// `` `col` ``
    Quoted,
    /// `:col`
    NamedParameter,
}

impl EnumerationMode {
    fn render(self, column: &str) -> String {
        match self {
            Self::Plain => String::from(column),
            Self::Quoted => format!("`{column}`"),
            Self::NamedParameter => format!(":{column}"),
        }
    }
}

/// Builds a `SET` clause with the values embedded as literals:
/// ``SET `col`='text',`num`=1``.
///
/// Varchar and date columns are single-quoted; numeric, boolean and custom
/// kinds are not.
///
/// **Warning**: Prefer [`build_positional_set`] with bound parameters.
pub fn build_literal_set<R, S>(record: &R, fields: &[S]) -> Result<String>
where
    R: Record + ?Sized,
    S: AsRef<str>,
{
    set_clause(record, fields, |index, name, column| {
        let value = value_at(record, index, name)?;
        Ok(format!(
            "`{}`={}",
            column.name,
            value.to_sql_literal(column.kind.is_quoted())
        ))
    })
}

/// Builds a `SET` clause with positional placeholders: `SET a=?,b=?`.
pub fn build_positional_set<R, S>(record: &R, fields: &[S]) -> Result<String>
where
    R: Record + ?Sized,
    S: AsRef<str>,
{
    set_clause(record, fields, |_, _, column| {
        Ok(format!("{}={}", column.name, SqlValue::placeholder()))
    })
}

/// Builds a `SET` clause with named placeholders in field-list order:
/// `SET a=:a,b=:b`.
pub fn build_named_set_by_field<R, S>(record: &R, fields: &[S]) -> Result<String>
where
    R: Record + ?Sized,
    S: AsRef<str>,
{
    set_clause(record, fields, |_, _, column| {
        Ok(format!("{0}=:{0}", column.name))
    })
}

/// Builds a `SET` clause with named placeholders for every field whose
/// resolved column appears in `allowed_columns`.
///
/// Unlike the other builders this matches on column names, not declared
/// names, and emits assignments in the record's declaration order rather
/// than the order of `allowed_columns`. Entries of `allowed_columns` that
/// match no column are dropped without error. Returns the clause together
/// with the columns actually used, in clause order, for binding.
///
/// If nothing matches, both the clause and the column list are empty.
pub fn build_named_set_by_column<R, S>(
    record: &R,
    allowed_columns: &[S],
) -> Result<(String, Vec<String>)>
where
    R: Record + ?Sized,
    S: AsRef<str>,
{
    if allowed_columns.is_empty() {
        return Err(MapError::EmptyFieldList);
    }

    let used: Vec<String> = descriptors(record)
        .filter_map(|(_, descriptor)| resolve_column(&descriptor))
        .filter(|column| allowed_columns.iter().any(|c| c.as_ref() == column.name))
        .map(|column| column.name.into_owned())
        .collect();

    if used.is_empty() {
        return Ok((String::new(), used));
    }

    let parts: Vec<String> = used.iter().map(|c| format!("{c}=:{c}")).collect();
    Ok((format!("SET {}", parts.join(",")), used))
}

/// Lists every mapped column of the record in declaration order, separated
/// by commas.
///
/// Fields whose declared name is in `skip_fields` and ignored fields are
/// left out. Useful for INSERT column lists, where `skip_fields` typically
/// holds auto-increment keys.
pub fn enumerate_columns<R, S>(record: &R, skip_fields: &[S], mode: EnumerationMode) -> String
where
    R: Record + ?Sized,
    S: AsRef<str>,
{
    descriptors(record)
        .filter(|(_, d)| !skip_fields.iter().any(|s| s.as_ref() == d.name))
        .filter_map(|(_, d)| resolve_column(&d))
        .map(|column| mode.render(&column.name))
        .collect::<Vec<_>>()
        .join(",")
}

/// Returns one value per entry of `fields`, in order, followed by `extra`.
///
/// `extra` carries values for the rest of the statement, typically the
/// `WHERE` clause key.
pub fn extract_parameter_values<R, S, I>(
    record: &R,
    fields: &[S],
    extra: I,
) -> Result<Vec<SqlValue>>
where
    R: Record + ?Sized,
    S: AsRef<str>,
    I: IntoIterator,
    I::Item: ToSqlValue,
{
    if fields.is_empty() {
        return Err(MapError::EmptyFieldList);
    }

    let mut params = Vec::with_capacity(fields.len());
    for field in fields {
        let name = field.as_ref();
        let (index, _) = resolve_field(record, name)?;
        params.push(value_at(record, index, name)?);
    }
    params.extend(extra.into_iter().map(ToSqlValue::to_sql_value));

    Ok(params)
}

/// Walks `fields` in order, rendering one assignment per entry.
fn set_clause<R, S, F>(record: &R, fields: &[S], mut render: F) -> Result<String>
where
    R: Record + ?Sized,
    S: AsRef<str>,
    F: FnMut(usize, &str, &ResolvedColumn<'_>) -> Result<String>,
{
    if fields.is_empty() {
        return Err(MapError::EmptyFieldList);
    }

    let mut parts = Vec::with_capacity(fields.len());
    for field in fields {
        let name = field.as_ref();
        let (index, column) = resolve_field(record, name)?;
        parts.push(render(index, name, &column)?);
    }

    Ok(format!("SET {}", parts.join(",")))
}
