use core::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// A dynamic value which can be bound as a parameter or read from a column.
///
/// Only [`Null`], [`Integer`], [`Float`], [`Text`] and [`Blob`] are ever
/// produced when reading rows, since that is all sqlite stores. The remaining
/// variants are encoded into one of those when bound, see
/// [`Connection::bind`] for the exact rules.
///
/// [`Null`]: Value::Null
/// [`Integer`]: Value::Integer
/// [`Float`]: Value::Float
/// [`Text`]: Value::Text
/// [`Blob`]: Value::Blob
/// [`Connection::bind`]: crate::Connection::bind
///
/// # Examples
///
/// ```
/// use sqll_driver::Value;
///
/// assert_eq!(Value::from(42), Value::Integer(42));
/// assert_eq!(Value::from("hello"), Value::Text(String::from("hello")));
/// assert_eq!(Value::from(None::<i64>), Value::Null);
/// assert_eq!(Value::from(u64::MAX), Value::BigInt(u64::MAX as i128));
/// ```
#[derive(Clone, PartialEq)]
#[non_exhaustive]
pub enum Value {
    /// The SQL `NULL`.
    Null,
    /// A boolean, stored as the integers `0` and `1`.
    Bool(bool),
    /// A 64-bit signed integer.
    Integer(i64),
    /// An integer which might not fit in 64 bits. Binding it fails if it
    /// doesn't.
    BigInt(i128),
    /// A 64-bit float.
    Float(f64),
    /// UTF-8 text.
    Text(String),
    /// Binary data.
    Blob(Vec<u8>),
    /// A calendar date, stored as `YYYY-MM-DD`.
    Date(NaiveDate),
    /// A time of day, stored as `HH:MM:SS` with optional fractional seconds.
    Time(NaiveTime),
    /// A date and time without an offset, stored as `YYYY-MM-DDTHH:MM:SS`
    /// with optional fractional seconds.
    DateTime(NaiveDateTime),
    /// A timestamp with an offset. Only timestamps in UTC can be bound.
    Timestamp(DateTime<FixedOffset>),
}

impl Value {
    /// Test if the value is `NULL`.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Return the integer if the value is an [`Integer`].
    ///
    /// [`Integer`]: Value::Integer
    #[inline]
    pub fn as_integer(&self) -> Option<i64> {
        match *self {
            Value::Integer(value) => Some(value),
            _ => None,
        }
    }

    /// Return the float if the value is a [`Float`].
    ///
    /// [`Float`]: Value::Float
    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match *self {
            Value::Float(value) => Some(value),
            _ => None,
        }
    }

    /// Return the string if the value is [`Text`].
    ///
    /// [`Text`]: Value::Text
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Return the bytes if the value is a [`Blob`].
    ///
    /// [`Blob`]: Value::Blob
    #[inline]
    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Value::Blob(value) => Some(value),
            _ => None,
        }
    }
}

/// Debug implementation for [`Value`].
///
/// # Examples
///
/// ```
/// use sqll_driver::Value;
///
/// assert_eq!(format!("{:?}", Value::Integer(42)), "42");
/// assert_eq!(format!("{:?}", Value::Text(String::from("hello"))), "\"hello\"");
/// assert_eq!(format!("{:?}", Value::Blob(vec![0xde, 0xad])), "b\"\\xde\\xad\"");
/// assert_eq!(format!("{:?}", Value::Null), "NULL");
/// ```
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(value) => write!(f, "{value}"),
            Value::Integer(value) => write!(f, "{value}"),
            Value::BigInt(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::Text(value) => write!(f, "{value:?}"),
            Value::Blob(value) => {
                write!(f, "b\"")?;

                for byte in value {
                    write!(f, "\\x{byte:02x}")?;
                }

                write!(f, "\"")
            }
            Value::Date(value) => write!(f, "{value}"),
            Value::Time(value) => write!(f, "{value}"),
            Value::DateTime(value) => write!(f, "{value}"),
            Value::Timestamp(value) => write!(f, "{value}"),
        }
    }
}

macro_rules! from_integer {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(value: $ty) -> Self {
                    Value::Integer(i64::from(value))
                }
            }
        )*
    };
}

from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Value {
    #[inline]
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(value) => Value::Integer(value),
            Err(..) => Value::BigInt(i128::from(value)),
        }
    }
}

impl From<i128> for Value {
    #[inline]
    fn from(value: i128) -> Self {
        Value::BigInt(value)
    }
}

impl From<bool> for Value {
    #[inline]
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f32> for Value {
    #[inline]
    fn from(value: f32) -> Self {
        Value::Float(f64::from(value))
    }
}

impl From<f64> for Value {
    #[inline]
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<String> for Value {
    #[inline]
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<Vec<u8>> for Value {
    #[inline]
    fn from(value: Vec<u8>) -> Self {
        Value::Blob(value)
    }
}

impl From<&[u8]> for Value {
    #[inline]
    fn from(value: &[u8]) -> Self {
        Value::Blob(value.to_vec())
    }
}

impl From<NaiveDate> for Value {
    #[inline]
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<NaiveTime> for Value {
    #[inline]
    fn from(value: NaiveTime) -> Self {
        Value::Time(value)
    }
}

impl From<NaiveDateTime> for Value {
    #[inline]
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    #[inline]
    fn from(value: DateTime<FixedOffset>) -> Self {
        Value::Timestamp(value)
    }
}

impl From<DateTime<Utc>> for Value {
    #[inline]
    fn from(value: DateTime<Utc>) -> Self {
        Value::Timestamp(value.fixed_offset())
    }
}

impl<T> From<Option<T>> for Value
where
    Value: From<T>,
{
    #[inline]
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Value::from(value),
            None => Value::Null,
        }
    }
}
