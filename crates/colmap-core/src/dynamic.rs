//! Records whose shape is registered at runtime.
//!
//! A [`RecordSchema`] is the runtime counterpart of the descriptor table that
//! `#[derive(Record)]` generates. It is built once, shared through an [`Arc`],
//! and used to validate the values of every [`DynamicRecord`] created from it.

use std::sync::Arc;

use crate::error::{MapError, Result};
use crate::record::{FieldDescriptor, Record, RecordMut, RuntimeKind, ValueKind};
use crate::resolve::IGNORE_SENTINEL;
use crate::value::SqlValue;

/// Definition of one field of a [`RecordSchema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    name: String,
    column: Option<String>,
    kind: Option<String>,
    value_kind: ValueKind,
    optional: bool,
}

impl FieldSpec {
    /// Creates a required field with no annotations.
    pub fn new(name: impl Into<String>, value_kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            column: None,
            kind: None,
            value_kind,
            optional: false,
        }
    }

    /// Sets the column annotation.
    #[must_use]
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Sets the column kind annotation.
    #[must_use]
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Marks the field as optional.
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Marks the field as ignored by every mapping operation.
    #[must_use]
    pub fn ignored(self) -> Self {
        self.column(IGNORE_SENTINEL)
    }

    /// Returns `true` if the field carries the ignore sentinel.
    #[must_use]
    pub fn is_ignored(&self) -> bool {
        self.column.as_deref() == Some(IGNORE_SENTINEL)
    }

    /// Returns the declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the value kind.
    #[must_use]
    pub const fn value_kind(&self) -> ValueKind {
        self.value_kind
    }

    /// Returns the runtime kind.
    #[must_use]
    pub const fn runtime(&self) -> RuntimeKind {
        if self.optional {
            RuntimeKind::Optional(self.value_kind)
        } else {
            RuntimeKind::Required(self.value_kind)
        }
    }

    fn descriptor(&self) -> FieldDescriptor<'_> {
        FieldDescriptor {
            name: &self.name,
            column: self.column.as_deref(),
            kind: self.kind.as_deref(),
            runtime: self.runtime(),
        }
    }

    /// Validates a value for this field.
    fn admit(&self, value: Option<SqlValue>) -> Result<Option<SqlValue>> {
        match value.filter(|v| !v.is_null()) {
            None if self.optional || self.is_ignored() => Ok(None),
            None => Err(MapError::NullOptionalField(self.name.clone())),
            Some(value) => self
                .value_kind
                .admit(value)
                .map(Some)
                .ok_or_else(|| MapError::ValueTypeMismatch {
                    field: self.name.clone(),
                    expected: self.value_kind.name(),
                }),
        }
    }
}

/// A record shape registered at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSchema {
    name: String,
    fields: Vec<FieldSpec>,
}

impl RecordSchema {
    /// Creates an empty schema.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Appends a field.
    #[must_use]
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Returns the shape name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Returns the declaration index of the field named `name`.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// A record backed by a shared [`RecordSchema`].
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicRecord {
    schema: Arc<RecordSchema>,
    values: Vec<Option<SqlValue>>,
}

impl DynamicRecord {
    /// Creates a record from values in declaration order.
    ///
    /// Fails with [`MapError::InvalidRecordShape`] if the number of values
    /// differs from the number of fields, and with the field-level errors of
    /// [`RecordMut::set_value`] for values that do not fit.
    pub fn new(schema: Arc<RecordSchema>, values: Vec<Option<SqlValue>>) -> Result<Self> {
        if values.len() != schema.fields.len() {
            return Err(MapError::InvalidRecordShape(format!(
                "'{}' has {} fields but {} values were given",
                schema.name,
                schema.fields.len(),
                values.len()
            )));
        }

        let values = schema
            .fields
            .iter()
            .zip(values)
            .map(|(field, value)| field.admit(value))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { schema, values })
    }

    /// Creates a record from `(declared name, value)` pairs.
    ///
    /// Fields missing from `pairs` are absent; that is only valid for
    /// optional fields. Unknown names fail with [`MapError::InvalidField`].
    pub fn from_pairs<I, S>(schema: Arc<RecordSchema>, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Option<SqlValue>)>,
        S: AsRef<str>,
    {
        let mut values = vec![None; schema.fields.len()];
        for (name, value) in pairs {
            let name = name.as_ref();
            let index = schema
                .position(name)
                .ok_or_else(|| MapError::InvalidField(String::from(name)))?;
            values[index] = value;
        }
        Self::new(schema, values)
    }

    /// Returns the schema this record was built from.
    #[must_use]
    pub const fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }

    /// Returns the value of the declared field `name`, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.schema
            .position(name)
            .and_then(|i| self.values[i].as_ref())
    }
}

impl Record for DynamicRecord {
    fn shape_name(&self) -> &str {
        &self.schema.name
    }

    fn field_count(&self) -> usize {
        self.schema.fields.len()
    }

    fn descriptor(&self, index: usize) -> Option<FieldDescriptor<'_>> {
        self.schema.fields.get(index).map(FieldSpec::descriptor)
    }

    fn value(&self, index: usize) -> Option<SqlValue> {
        self.values.get(index).cloned().flatten()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.schema.position(name)
    }
}

impl RecordMut for DynamicRecord {
    fn set_value(&mut self, index: usize, value: Option<SqlValue>) -> Result<()> {
        let field = self
            .schema
            .fields
            .get(index)
            .ok_or_else(|| MapError::InvalidField(format!("#{index}")))?;
        self.values[index] = field.admit(value)?;
        Ok(())
    }
}
