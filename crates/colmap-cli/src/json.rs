//! Conversions between JSON documents and record values.
//!
//! `null` is an absent value. Strings destined for date fields are parsed as
//! `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS`; every other JSON scalar maps to the
//! matching [`SqlValue`] and is then checked against the field's kind.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Map, Number, Value};

use colmap_core::value::{DATE_FORMAT, TIMESTAMP_FORMAT};
use colmap_core::{DynamicRecord, FieldSpec, MapError, RecordSchema, SqlValue, ValueKind};

/// Converts a JSON value for `field`.
pub fn value_from_json(field: &FieldSpec, value: &Value) -> colmap_core::Result<Option<SqlValue>> {
    let mismatch = || MapError::ValueTypeMismatch {
        field: String::from(field.name()),
        expected: field.value_kind().name(),
    };

    match (field.value_kind(), value) {
        (_, Value::Null) => Ok(None),
        (ValueKind::Date, Value::String(s)) => parse_date(s).map(Some).ok_or_else(mismatch),
        (_, other) => untyped_value(other).map(Some).ok_or_else(mismatch),
    }
}

/// Converts a JSON scalar without a target field. Arrays and objects yield
/// `None`.
#[must_use]
pub fn untyped_value(value: &Value) -> Option<SqlValue> {
    match value {
        Value::Null => Some(SqlValue::Null),
        Value::Bool(b) => Some(SqlValue::Bool(*b)),
        Value::Number(n) => n
            .as_i64()
            .map(SqlValue::Int)
            .or_else(|| n.as_f64().map(SqlValue::Float)),
        Value::String(s) => Some(SqlValue::Text(s.clone())),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn parse_date(s: &str) -> Option<SqlValue> {
    if let Ok(date) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
        return Some(SqlValue::Date(date));
    }
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .map(SqlValue::Timestamp)
}

fn as_object(value: &Value) -> colmap_core::Result<&Map<String, Value>> {
    value.as_object().ok_or_else(|| {
        MapError::InvalidRecordShape(format!("expected a JSON object, found {}", json_kind(value)))
    })
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Reads `(declared name, value)` pairs from a JSON object, validating each
/// name against `schema`.
pub fn changes_from_json(
    schema: &RecordSchema,
    value: &Value,
) -> colmap_core::Result<Vec<(String, Option<SqlValue>)>> {
    as_object(value)?
        .iter()
        .map(|(name, value)| {
            let field = schema
                .position(name)
                .map(|i| &schema.fields()[i])
                .ok_or_else(|| MapError::InvalidField(name.clone()))?;
            Ok((name.clone(), value_from_json(field, value)?))
        })
        .collect()
}

/// Builds a record of `schema` from a JSON object keyed by declared names.
pub fn record_from_json(
    schema: &Arc<RecordSchema>,
    value: &Value,
) -> colmap_core::Result<DynamicRecord> {
    let pairs = changes_from_json(schema, value)?;
    DynamicRecord::from_pairs(Arc::clone(schema), pairs)
}

/// Converts a value to JSON for output.
#[must_use]
pub fn value_to_json(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Bool(b) => Value::Bool(*b),
        SqlValue::Int(i) => Value::Number(Number::from(*i)),
        SqlValue::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
        SqlValue::Text(s) => Value::String(s.clone()),
        SqlValue::Blob(b) => Value::Array(b.iter().map(|byte| Value::from(*byte)).collect()),
        SqlValue::Date(d) => Value::String(d.format(DATE_FORMAT).to_string()),
        SqlValue::Timestamp(t) => Value::String(t.format(TIMESTAMP_FORMAT).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Arc<RecordSchema> {
        Arc::new(
            RecordSchema::new("Event")
                .field(FieldSpec::new("id", ValueKind::Integer))
                .field(FieldSpec::new("title", ValueKind::String).optional())
                .field(FieldSpec::new("starts", ValueKind::Date).optional())
                .field(FieldSpec::new("price", ValueKind::Float).optional()),
        )
    }

    #[test]
    fn test_record_from_json() {
        let record = record_from_json(
            &schema(),
            &json!({ "id": 1, "title": "Launch", "starts": "2024-05-01", "price": 12 }),
        )
        .unwrap();
        assert_eq!(record.get("id"), Some(&SqlValue::Int(1)));
        assert_eq!(
            record.get("starts"),
            Some(&SqlValue::Date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()))
        );
        // Integers are accepted by float fields
        assert_eq!(record.get("price"), Some(&SqlValue::Float(12.0)));
    }

    #[test]
    fn test_timestamps_are_parsed() {
        let record = record_from_json(
            &schema(),
            &json!({ "id": 1, "starts": "2024-05-01 18:30:00" }),
        )
        .unwrap();
        assert!(matches!(record.get("starts"), Some(SqlValue::Timestamp(_))));
    }

    #[test]
    fn test_null_is_absent() {
        let record = record_from_json(&schema(), &json!({ "id": 1, "title": null })).unwrap();
        assert_eq!(record.get("title"), None);
    }

    #[test]
    fn test_non_object_is_invalid_shape() {
        let err = record_from_json(&schema(), &json!([1, 2])).unwrap_err();
        assert_eq!(
            err,
            MapError::InvalidRecordShape(String::from("expected a JSON object, found an array"))
        );
    }

    #[test]
    fn test_bad_date_is_type_mismatch() {
        let err = record_from_json(&schema(), &json!({ "id": 1, "starts": "soon" })).unwrap_err();
        assert_eq!(
            err,
            MapError::ValueTypeMismatch {
                field: String::from("starts"),
                expected: "date",
            }
        );
    }

    #[test]
    fn test_unknown_key_is_invalid_field() {
        let err = changes_from_json(&schema(), &json!({ "status": 1 })).unwrap_err();
        assert_eq!(err, MapError::InvalidField(String::from("status")));
    }

    #[test]
    fn test_value_to_json() {
        assert_eq!(value_to_json(&SqlValue::Int(145)), json!(145));
        assert_eq!(value_to_json(&SqlValue::Bool(true)), json!(true));
        assert_eq!(value_to_json(&SqlValue::Float(f64::NAN)), Value::Null);
        assert_eq!(
            value_to_json(&SqlValue::Date(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())),
            json!("2024-05-01")
        );
    }

    #[test]
    fn test_untyped_value() {
        assert_eq!(untyped_value(&json!(2.5)), Some(SqlValue::Float(2.5)));
        assert_eq!(untyped_value(&json!("x")), Some(SqlValue::Text(String::from("x"))));
        assert_eq!(untyped_value(&json!({})), None);
    }
}
