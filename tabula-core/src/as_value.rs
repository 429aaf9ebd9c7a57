use crate::{Error, Result, SqlError, Value};
use atoi::FromRadix10SignedChecked;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use std::any;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Conversion between a Rust type and [`Value`].
pub trait AsValue {
    /// The typed NULL for this Rust type.
    fn as_empty_value() -> Value;
    /// Move `self` into a [`Value`].
    fn as_value(self) -> Value;
    /// Convert back from a [`Value`], failing with a type mismatch when the shape is wrong.
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
}

impl<T: AsValue> From<T> for Value {
    fn from(value: T) -> Self {
        value.as_value()
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Varchar(Some(value.into()))
    }
}

fn mismatch<T>(value: &Value) -> Error {
    SqlError::type_mismatch(any::type_name::<T>(), value)
}

macro_rules! impl_as_value_integer {
    ($source:ty, $destination:path) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                let wide = match &value {
                    Value::Int8(Some(v)) => Some(*v as i64),
                    Value::Int16(Some(v)) => Some(*v as i64),
                    Value::Int32(Some(v)) => Some(*v as i64),
                    Value::Int64(Some(v)) => Some(*v),
                    Value::Decimal(Some(v), ..) if v.fract().is_zero() => i64::try_from(*v).ok(),
                    Value::Varchar(Some(v)) | Value::Unknown(Some(v)) => {
                        match <i64>::from_radix_10_signed_checked(v.trim().as_bytes()) {
                            (Some(n), len) if len == v.trim().len() => Some(n),
                            _ => None,
                        }
                    }
                    _ => None,
                };
                wide.and_then(|v| <$source>::try_from(v).ok())
                    .ok_or_else(|| mismatch::<Self>(&value))
            }
        }
    };
}

impl_as_value_integer!(i8, Value::Int8);
impl_as_value_integer!(i16, Value::Int16);
impl_as_value_integer!(i32, Value::Int32);
impl_as_value_integer!(i64, Value::Int64);

macro_rules! impl_as_value_float {
    ($source:ty, $destination:path) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match &value {
                    Value::Float32(Some(v)) => Ok(*v as _),
                    Value::Float64(Some(v)) => Ok(*v as _),
                    Value::Decimal(Some(v), ..) => {
                        use rust_decimal::prelude::ToPrimitive;
                        v.to_f64().map(|v| v as _).ok_or_else(|| mismatch::<Self>(&value))
                    }
                    v if v.as_i64().is_some() => Ok(v.as_i64().unwrap_or_default() as _),
                    Value::Varchar(Some(v)) | Value::Unknown(Some(v)) => {
                        fast_float::parse::<$source, _>(v.trim()).map_err(|_| mismatch::<Self>(&value))
                    }
                    _ => Err(mismatch::<Self>(&value)),
                }
            }
        }
    };
}

impl_as_value_float!(f32, Value::Float32);
impl_as_value_float!(f64, Value::Float64);

impl AsValue for bool {
    fn as_empty_value() -> Value {
        Value::Boolean(None)
    }
    fn as_value(self) -> Value {
        Value::Boolean(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match &value {
            Value::Boolean(Some(v)) => Ok(*v),
            v if matches!(v.as_i64(), Some(0 | 1)) => Ok(v.as_i64() == Some(1)),
            Value::Varchar(Some(v)) | Value::Unknown(Some(v)) => {
                match v.trim().to_ascii_lowercase().as_str() {
                    "true" | "t" | "1" => Ok(true),
                    "false" | "f" | "0" => Ok(false),
                    _ => Err(mismatch::<Self>(&value)),
                }
            }
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}

impl AsValue for Decimal {
    fn as_empty_value() -> Value {
        Value::Decimal(None, 0, 0)
    }
    fn as_value(self) -> Value {
        Value::Decimal(Some(self), 0, 0)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match &value {
            Value::Decimal(Some(v), ..) => Ok(*v),
            Value::Float32(Some(v)) => Decimal::from_f32(*v).ok_or_else(|| mismatch::<Self>(&value)),
            Value::Float64(Some(v)) => Decimal::from_f64(*v).ok_or_else(|| mismatch::<Self>(&value)),
            v if v.as_i64().is_some() => Ok(Decimal::from(v.as_i64().unwrap_or_default())),
            Value::Varchar(Some(v)) | Value::Unknown(Some(v)) => v
                .trim()
                .parse::<Decimal>()
                .map_err(|_| mismatch::<Self>(&value)),
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}

impl AsValue for char {
    fn as_empty_value() -> Value {
        Value::Char(None)
    }
    fn as_value(self) -> Value {
        Value::Char(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match &value {
            Value::Char(Some(v)) => Ok(*v),
            Value::Varchar(Some(v)) | Value::Unknown(Some(v)) if v.chars().count() == 1 => {
                v.chars().next().ok_or_else(|| mismatch::<Self>(&value))
            }
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}

impl AsValue for String {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Varchar(Some(v)) | Value::Unknown(Some(v)) => Ok(v),
            Value::Char(Some(v)) => Ok(v.into()),
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}

impl AsValue for Box<[u8]> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(Some(v)) => Ok(v),
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}

impl AsValue for Vec<u8> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self.into()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Box::<[u8]>::try_from_value(value).map(Into::into)
    }
}

macro_rules! impl_as_value_plain {
    ($source:ty, $destination:path) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $destination(Some(v)) => Ok(v),
                    _ => Err(mismatch::<Self>(&value)),
                }
            }
        }
    };
}

impl_as_value_plain!(Date, Value::Date);
impl_as_value_plain!(Time, Value::Time);
impl_as_value_plain!(PrimitiveDateTime, Value::Timestamp);
impl_as_value_plain!(OffsetDateTime, Value::TimestampWithTimezone);
impl_as_value_plain!(time::Duration, Value::Duration);

impl AsValue for Uuid {
    fn as_empty_value() -> Value {
        Value::Uuid(None)
    }
    fn as_value(self) -> Value {
        Value::Uuid(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match &value {
            Value::Uuid(Some(v)) => Ok(*v),
            Value::Varchar(Some(v)) | Value::Unknown(Some(v)) => {
                Uuid::parse_str(v.trim()).map_err(|_| mismatch::<Self>(&value))
            }
            Value::Blob(Some(v)) => Uuid::from_slice(v).map_err(|_| mismatch::<Self>(&value)),
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}

impl<T: AsValue> AsValue for Option<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => T::as_empty_value(),
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(None);
        }
        T::try_from_value(value).map(Some)
    }
}
