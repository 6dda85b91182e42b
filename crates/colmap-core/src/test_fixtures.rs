//! Shared records for unit tests.

use std::sync::Arc;

use crate::dynamic::{DynamicRecord, FieldSpec, RecordSchema};
use crate::record::ValueKind;
use crate::value::SqlValue;

pub(crate) fn user_schema() -> Arc<RecordSchema> {
    Arc::new(
        RecordSchema::new("User")
            .field(FieldSpec::new("id", ValueKind::Integer))
            .field(
                FieldSpec::new("name", ValueKind::String)
                    .column("name")
                    .kind("varchar")
                    .optional(),
            )
            .field(FieldSpec::new("email", ValueKind::String).column("mail").optional())
            .field(FieldSpec::new("address", ValueKind::String).optional())
            .field(FieldSpec::new("password", ValueKind::String).optional())
            .field(FieldSpec::new("city", ValueKind::String).optional())
            .field(FieldSpec::new("country", ValueKind::String).kind("varchar").optional())
            .field(FieldSpec::new("active", ValueKind::Bool).kind("boolean"))
            .field(FieldSpec::new("session", ValueKind::String).ignored().optional()),
    )
}

fn text(s: &str) -> Option<SqlValue> {
    Some(SqlValue::Text(String::from(s)))
}

pub(crate) fn user() -> DynamicRecord {
    DynamicRecord::new(
        user_schema(),
        vec![
            Some(SqlValue::Int(145)),
            text("Pepe"),
            text("pepe@astropay.com"),
            text("Luis Bonavita 1122"),
            text("myhashedpassword"),
            text("Montevideo"),
            text("UY"),
            Some(SqlValue::Bool(true)),
            text("session-token"),
        ],
    )
    .unwrap()
}

pub(crate) fn user_without_city() -> DynamicRecord {
    let mut record = user();
    let index = record.schema().position("city").unwrap();
    crate::record::RecordMut::set_value(&mut record, index, None).unwrap();
    record
}
