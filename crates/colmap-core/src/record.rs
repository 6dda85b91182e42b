//! Record traits and field descriptor tables.
//!
//! A record exposes its shape as a declaration-ordered table of
//! [`FieldDescriptor`]s plus an index-based value accessor. The table is
//! generated at compile time by `#[derive(Record)]` or registered at runtime
//! through [`RecordSchema`](crate::dynamic::RecordSchema); nothing here
//! inspects types reflectively.

use core::fmt;
use core::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{MapError, Result};
use crate::value::{widen_f32, SqlValue};

/// The scalar kind of a field's value, as declared in Rust.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Text.
    String,
    /// Any integer width.
    Integer,
    /// Any float width.
    Float,
    /// Boolean.
    Bool,
    /// Calendar date or timestamp.
    Date,
    /// Anything else (blobs, custom types).
    Other,
}

impl ValueKind {
    /// Returns the lowercase name of this kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Date => "date",
            Self::Other => "other",
        }
    }

    /// Checks that `value` fits this kind, normalizing where the fit is
    /// lossless (integers are accepted by float fields).
    ///
    /// Returns `None` when the value does not fit. `Null` never fits.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn admit(self, value: SqlValue) -> Option<SqlValue> {
        match (self, value) {
            (_, SqlValue::Null) => None,
            (Self::String, v @ SqlValue::Text(_))
            | (Self::Integer, v @ SqlValue::Int(_))
            | (Self::Float, v @ SqlValue::Float(_))
            | (Self::Bool, v @ SqlValue::Bool(_))
            | (Self::Date, v @ (SqlValue::Date(_) | SqlValue::Timestamp(_)))
            | (Self::Other, v) => Some(v),
            (Self::Float, SqlValue::Int(i)) => Some(SqlValue::Float(i as f64)),
            _ => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a [`ValueKind`] name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value kind '{0}'")]
pub struct ParseValueKindError(pub String);

impl FromStr for ValueKind {
    type Err = ParseValueKindError;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "string" | "text" | "varchar" => Ok(Self::String),
            "integer" | "int" => Ok(Self::Integer),
            "float" | "double" | "numeric" => Ok(Self::Float),
            "bool" | "boolean" => Ok(Self::Bool),
            "date" | "timestamp" | "datetime" => Ok(Self::Date),
            "other" => Ok(Self::Other),
            _ => Err(ParseValueKindError(String::from(s))),
        }
    }
}

/// The runtime kind of a field: a scalar kind, possibly wrapped in `Option`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeKind {
    /// The field always holds a value.
    Required(ValueKind),
    /// The field may be absent (`Option<T>`).
    Optional(ValueKind),
}

impl RuntimeKind {
    /// Returns the scalar kind, looking through `Optional`.
    #[must_use]
    pub const fn value_kind(self) -> ValueKind {
        match self {
            Self::Required(kind) | Self::Optional(kind) => kind,
        }
    }

    /// Returns `true` if the field may be absent.
    #[must_use]
    pub const fn is_optional(self) -> bool {
        matches!(self, Self::Optional(_))
    }
}

/// Static description of one declared field of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor<'a> {
    /// The declared field name, as used in field lists.
    pub name: &'a str,
    /// Explicit column annotation, if any.
    pub column: Option<&'a str>,
    /// Explicit column kind annotation, if any.
    pub kind: Option<&'a str>,
    /// The kind of value the field holds.
    pub runtime: RuntimeKind,
}

impl<'a> FieldDescriptor<'a> {
    /// Creates a descriptor with no annotations.
    #[must_use]
    pub const fn new(name: &'a str, runtime: RuntimeKind) -> Self {
        Self {
            name,
            column: None,
            kind: None,
            runtime,
        }
    }

    /// Sets the column annotation.
    #[must_use]
    pub const fn column(mut self, column: &'a str) -> Self {
        self.column = Some(column);
        self
    }

    /// Sets the column kind annotation.
    #[must_use]
    pub const fn kind(mut self, kind: &'a str) -> Self {
        self.kind = Some(kind);
        self
    }
}

/// A value whose fields can be mapped to database columns.
///
/// Usually implemented with `#[derive(Record)]`:
///
/// ```rust
/// use colmap_core::Record;
/// use colmap_derive::Record;
///
/// #[derive(Debug, Clone, Record)]
/// struct User {
///     id: i64,
///     #[column(name = "mail", kind = "varchar")]
///     email: Option<String>,
///     #[column(ignore)]
///     cached: Vec<String>,
/// }
///
/// let user = User { id: 1, email: None, cached: vec![] };
/// assert_eq!(user.shape_name(), "User");
/// assert_eq!(user.field_count(), 3);
/// ```
pub trait Record {
    /// Name of the record's shape. Two records share a shape only if their
    /// shape names and descriptor tables are identical.
    fn shape_name(&self) -> &str;

    /// Number of declared fields.
    fn field_count(&self) -> usize;

    /// Returns the descriptor of the field at `index` (declaration order).
    fn descriptor(&self, index: usize) -> Option<FieldDescriptor<'_>>;

    /// Returns the value of the field at `index`.
    ///
    /// `None` means the field is an optional holding no value (or `index` is
    /// out of range).
    fn value(&self, index: usize) -> Option<SqlValue>;

    /// Returns the declaration index of the field named `name`.
    fn position(&self, name: &str) -> Option<usize> {
        (0..self.field_count()).find(|&i| self.descriptor(i).is_some_and(|d| d.name == name))
    }
}

/// A record whose fields can be overwritten by index.
pub trait RecordMut: Record {
    /// Writes `value` into the field at `index`.
    ///
    /// `None` clears an optional field and is rejected for required ones.
    fn set_value(&mut self, index: usize, value: Option<SqlValue>) -> Result<()>;
}

/// Iterates over a record's field descriptors in declaration order.
pub fn descriptors<R: Record + ?Sized>(
    record: &R,
) -> impl Iterator<Item = (usize, FieldDescriptor<'_>)> + '_ {
    (0..record.field_count()).filter_map(move |i| record.descriptor(i).map(|d| (i, d)))
}

/// Returns `true` if both records have the same shape name and descriptor
/// table.
pub fn same_shape<A, B>(a: &A, b: &B) -> bool
where
    A: Record + ?Sized,
    B: Record + ?Sized,
{
    a.shape_name() == b.shape_name()
        && a.field_count() == b.field_count()
        && descriptors(a).zip(descriptors(b)).all(|(x, y)| x == y)
}

/// Rust types that can be stored in a record field.
pub trait FieldType: Sized {
    /// The runtime kind reported in the field's descriptor.
    const RUNTIME_KIND: RuntimeKind;

    /// Reads the field's value; `None` for an absent optional.
    fn field_value(&self) -> Option<SqlValue>;

    /// Builds a field value, returning `None` if `value` does not fit.
    fn from_field_value(value: Option<SqlValue>) -> Option<Self>;
}

/// Converts `value` for the field `name` of type `T`, reporting why it does
/// not fit. Used by derived [`RecordMut`] implementations.
pub fn convert_field<T: FieldType>(name: &str, value: Option<SqlValue>) -> Result<T> {
    let value = value.filter(|v| !v.is_null());
    if value.is_none() && !T::RUNTIME_KIND.is_optional() {
        return Err(MapError::NullOptionalField(String::from(name)));
    }
    T::from_field_value(value).ok_or_else(|| MapError::ValueTypeMismatch {
        field: String::from(name),
        expected: T::RUNTIME_KIND.value_kind().name(),
    })
}

impl FieldType for String {
    const RUNTIME_KIND: RuntimeKind = RuntimeKind::Required(ValueKind::String);

    fn field_value(&self) -> Option<SqlValue> {
        Some(SqlValue::Text(self.clone()))
    }

    fn from_field_value(value: Option<SqlValue>) -> Option<Self> {
        match value {
            Some(SqlValue::Text(s)) => Some(s),
            _ => None,
        }
    }
}

impl FieldType for bool {
    const RUNTIME_KIND: RuntimeKind = RuntimeKind::Required(ValueKind::Bool);

    fn field_value(&self) -> Option<SqlValue> {
        Some(SqlValue::Bool(*self))
    }

    fn from_field_value(value: Option<SqlValue>) -> Option<Self> {
        match value {
            Some(SqlValue::Bool(b)) => Some(b),
            _ => None,
        }
    }
}

macro_rules! impl_field_type_int {
    ($($ty:ty),+) => {
        $(
            impl FieldType for $ty {
                const RUNTIME_KIND: RuntimeKind = RuntimeKind::Required(ValueKind::Integer);

                fn field_value(&self) -> Option<SqlValue> {
                    Some(SqlValue::Int(i64::from(*self)))
                }

                fn from_field_value(value: Option<SqlValue>) -> Option<Self> {
                    match value {
                        Some(SqlValue::Int(i)) => <$ty>::try_from(i).ok(),
                        _ => None,
                    }
                }
            }
        )+
    };
}

impl_field_type_int!(i8, i16, i32, i64, u8, u16, u32);

// Values outside the i64 range are carried as their decimal text, which still
// renders as an unquoted numeric literal.
macro_rules! impl_field_type_wide_int {
    ($($ty:ty),+) => {
        $(
            impl FieldType for $ty {
                const RUNTIME_KIND: RuntimeKind = RuntimeKind::Required(ValueKind::Integer);

                fn field_value(&self) -> Option<SqlValue> {
                    Some(i64::try_from(*self).map_or_else(
                        |_| SqlValue::Text(self.to_string()),
                        SqlValue::Int,
                    ))
                }

                fn from_field_value(value: Option<SqlValue>) -> Option<Self> {
                    match value {
                        Some(SqlValue::Int(i)) => <$ty>::try_from(i).ok(),
                        Some(SqlValue::Text(s)) => s.parse().ok(),
                        _ => None,
                    }
                }
            }
        )+
    };
}

impl_field_type_wide_int!(u64, usize, isize, i128, u128);

impl FieldType for f64 {
    const RUNTIME_KIND: RuntimeKind = RuntimeKind::Required(ValueKind::Float);

    fn field_value(&self) -> Option<SqlValue> {
        Some(SqlValue::Float(*self))
    }

    #[allow(clippy::cast_precision_loss)]
    fn from_field_value(value: Option<SqlValue>) -> Option<Self> {
        match value {
            Some(SqlValue::Float(f)) => Some(f),
            Some(SqlValue::Int(i)) => Some(i as f64),
            _ => None,
        }
    }
}

impl FieldType for f32 {
    const RUNTIME_KIND: RuntimeKind = RuntimeKind::Required(ValueKind::Float);

    fn field_value(&self) -> Option<SqlValue> {
        Some(SqlValue::Float(widen_f32(*self)))
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn from_field_value(value: Option<SqlValue>) -> Option<Self> {
        match value {
            Some(SqlValue::Float(f)) => Some(f as f32),
            Some(SqlValue::Int(i)) => Some(i as f32),
            _ => None,
        }
    }
}

impl FieldType for NaiveDate {
    const RUNTIME_KIND: RuntimeKind = RuntimeKind::Required(ValueKind::Date);

    fn field_value(&self) -> Option<SqlValue> {
        Some(SqlValue::Date(*self))
    }

    fn from_field_value(value: Option<SqlValue>) -> Option<Self> {
        match value {
            Some(SqlValue::Date(d)) => Some(d),
            _ => None,
        }
    }
}

impl FieldType for NaiveDateTime {
    const RUNTIME_KIND: RuntimeKind = RuntimeKind::Required(ValueKind::Date);

    fn field_value(&self) -> Option<SqlValue> {
        Some(SqlValue::Timestamp(*self))
    }

    fn from_field_value(value: Option<SqlValue>) -> Option<Self> {
        match value {
            Some(SqlValue::Timestamp(t)) => Some(t),
            Some(SqlValue::Date(d)) => Some(d.and_time(chrono::NaiveTime::MIN)),
            _ => None,
        }
    }
}

impl FieldType for Vec<u8> {
    const RUNTIME_KIND: RuntimeKind = RuntimeKind::Required(ValueKind::Other);

    fn field_value(&self) -> Option<SqlValue> {
        Some(SqlValue::Blob(self.clone()))
    }

    fn from_field_value(value: Option<SqlValue>) -> Option<Self> {
        match value {
            Some(SqlValue::Blob(b)) => Some(b),
            _ => None,
        }
    }
}

impl<T: FieldType> FieldType for Option<T> {
    const RUNTIME_KIND: RuntimeKind = RuntimeKind::Optional(T::RUNTIME_KIND.value_kind());

    fn field_value(&self) -> Option<SqlValue> {
        self.as_ref().and_then(FieldType::field_value)
    }

    fn from_field_value(value: Option<SqlValue>) -> Option<Self> {
        match value {
            None | Some(SqlValue::Null) => Some(None),
            present => T::from_field_value(present).map(Some),
        }
    }
}
