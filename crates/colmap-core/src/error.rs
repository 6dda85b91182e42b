//! Error types for column mapping operations.

/// Errors that can occur while mapping a record onto SQL fragments.
///
/// All of these are programmer or schema errors: nothing here is transient,
/// so callers should abort statement construction rather than retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    /// The supplied values do not form a record of the expected shape.
    #[error("Invalid record shape: {0}")]
    InvalidRecordShape(String),

    /// A field list was required but none was given.
    #[error("Invalid field list")]
    EmptyFieldList,

    /// A field name does not exist on the record (or is ignored).
    #[error("invalid field '{0}'")]
    InvalidField(String),

    /// An optional field was read while holding no value.
    #[error("field '{0}' holds no value")]
    NullOptionalField(String),

    /// Two records that were expected to share a shape do not.
    #[error("source and destination are not of the same type: '{original}' and '{updated}'")]
    ShapeMismatch {
        /// Shape name of the original record.
        original: String,
        /// Shape name of the updated record.
        updated: String,
    },

    /// A value does not fit the field it was written to.
    #[error("value for field '{field}' is not a valid {expected}")]
    ValueTypeMismatch {
        /// Declared name of the field.
        field: String,
        /// Expected kind of value.
        expected: &'static str,
    },
}

/// Result type for column mapping operations.
pub type Result<T> = std::result::Result<T, MapError>;
