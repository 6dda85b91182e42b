//! SQL values read from record fields.
//!
//! Every field value leaves a record as a [`SqlValue`], whether it is about to
//! be embedded in a literal `SET` clause or bound to a placeholder.

use chrono::{NaiveDate, NaiveDateTime};

/// Format used when rendering [`SqlValue::Date`].
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format used when rendering [`SqlValue::Timestamp`].
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A SQL value that can be embedded in a statement or bound as a parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
    /// Calendar date.
    Date(NaiveDate),
    /// Date and time without a zone.
    Timestamp(NaiveDateTime),
}

impl SqlValue {
    /// Returns a short name for the kind of value held.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
            Self::Date(_) => "date",
            Self::Timestamp(_) => "timestamp",
        }
    }

    /// Returns `true` for [`SqlValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the value as literal SQL text.
    ///
    /// With `quoted` set the text is wrapped in single quotes and embedded
    /// quotes are doubled. `NULL` and blobs always use their own literal
    /// syntax, whatever `quoted` says.
    ///
    /// **Warning**: Prefer placeholders and bound parameters instead.
    #[must_use]
    pub fn to_sql_literal(&self, quoted: bool) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Blob(b) => {
                let hex: String = b.iter().map(|byte| format!("{byte:02X}")).collect();
                format!("X'{hex}'")
            }
            other => {
                let text = other.to_plain_text();
                if quoted {
                    // Escape single quotes by doubling them
                    format!("'{}'", text.replace('\'', "''"))
                } else {
                    text
                }
            }
        }
    }

    fn to_plain_text(&self) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Bool(b) => b.to_string(),
            Self::Int(n) => format!("{n}"),
            Self::Float(f) => format!("{f}"),
            Self::Text(s) => s.clone(),
            Self::Blob(b) => String::from_utf8_lossy(b).into_owned(),
            Self::Date(d) => d.format(DATE_FORMAT).to_string(),
            Self::Timestamp(t) => t.format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    /// Returns the positional parameter placeholder.
    #[must_use]
    pub const fn placeholder() -> &'static str {
        "?"
    }
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

macro_rules! impl_to_sql_int {
    ($($ty:ty),+) => {
        $(
            impl ToSqlValue for $ty {
                fn to_sql_value(self) -> SqlValue {
                    SqlValue::Int(i64::from(self))
                }
            }
        )+
    };
}

impl_to_sql_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! impl_to_sql_wide_int {
    ($($ty:ty),+) => {
        $(
            impl ToSqlValue for $ty {
                fn to_sql_value(self) -> SqlValue {
                    i64::try_from(self).map_or_else(|_| SqlValue::Text(self.to_string()), SqlValue::Int)
                }
            }
        )+
    };
}

impl_to_sql_wide_int!(u64, usize, isize, i128, u128);

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(self)
    }
}

impl ToSqlValue for f32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(widen_f32(self))
    }
}

/// Widens through the shortest decimal form of `value`, so `0.1f32` becomes
/// `0.1` rather than `0.10000000149011612`.
pub(crate) fn widen_f32(value: f32) -> f64 {
    value
        .to_string()
        .parse()
        .unwrap_or_else(|_| f64::from(value))
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl ToSqlValue for NaiveDate {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Date(self)
    }
}

impl ToSqlValue for NaiveDateTime {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Timestamp(self)
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

impl ToSqlValue for Vec<u8> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self)
    }
}

impl ToSqlValue for &[u8] {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_f32_keeps_shortest_decimal() {
        assert_eq!(0.1f32.to_sql_value(), SqlValue::Float(0.1));
        assert_eq!(widen_f32(2.5), 2.5);
        assert!(widen_f32(f32::NAN).is_nan());
    }

    #[test]
    fn test_literal_null_ignores_quoting() {
        assert_eq!(SqlValue::Null.to_sql_literal(true), "NULL");
        assert_eq!(SqlValue::Null.to_sql_literal(false), "NULL");
    }

    #[test]
    fn test_literal_bool_is_lowercase() {
        assert_eq!(SqlValue::Bool(true).to_sql_literal(false), "true");
        assert_eq!(SqlValue::Bool(false).to_sql_literal(false), "false");
    }

    #[test]
    fn test_literal_numbers() {
        assert_eq!(SqlValue::Int(145).to_sql_literal(false), "145");
        assert_eq!(SqlValue::Int(-100).to_sql_literal(false), "-100");
        assert_eq!(SqlValue::Float(2.5).to_sql_literal(false), "2.5");
    }

    #[test]
    fn test_literal_text_quoting_and_escaping() {
        let text = SqlValue::Text(String::from("O'Brien"));
        assert_eq!(text.to_sql_literal(true), "'O''Brien'");
        assert_eq!(text.to_sql_literal(false), "O'Brien");
    }

    #[test]
    fn test_literal_injection_attempt_stays_inside_quotes() {
        let value = SqlValue::Text(String::from("'; DROP TABLE users; --"));
        assert_eq!(value.to_sql_literal(true), "'''; DROP TABLE users; --'");
    }

    #[test]
    fn test_literal_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(SqlValue::Date(date).to_sql_literal(true), "'2024-02-29'");

        let ts = date.and_hms_opt(13, 5, 9).unwrap();
        assert_eq!(
            SqlValue::Timestamp(ts).to_sql_literal(true),
            "'2024-02-29 13:05:09'"
        );
    }

    #[test]
    fn test_literal_blob_ignores_quoting() {
        let blob = SqlValue::Blob(vec![0x48, 0x45, 0x4C, 0x4C, 0x4F]);
        assert_eq!(blob.to_sql_literal(true), "X'48454C4C4F'");
    }

    #[test]
    fn test_to_sql_value_conversions() {
        assert_eq!(true.to_sql_value(), SqlValue::Bool(true));
        assert_eq!(42_i32.to_sql_value(), SqlValue::Int(42));
        assert_eq!(7_u16.to_sql_value(), SqlValue::Int(7));
        assert_eq!(2.5_f64.to_sql_value(), SqlValue::Float(2.5));
        assert_eq!(
            "hello".to_sql_value(),
            SqlValue::Text(String::from("hello"))
        );
        assert_eq!(None::<i32>.to_sql_value(), SqlValue::Null);
        assert_eq!(Some(42_i32).to_sql_value(), SqlValue::Int(42));
    }
}
