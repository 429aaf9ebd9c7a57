use crate::{
    AsValue, Codec, CodecContext, Dialect, Result, SqlError, Value, codec::write_quoted_string,
    util::write_integer,
};
use std::fmt::Write;

/// Rust enum mapped to a SQL column, usually declared through [`sql_enum!`](crate::sql_enum).
pub trait SqlEnum: AsValue + Sized {
    const NAME: &'static str;
    /// Variant names, in declaration order.
    const VARIANTS: &'static [&'static str];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumStorage {
    /// Variant name in a text column.
    Name,
    /// Zero based variant position in an integer column.
    Ordinal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumCodec {
    pub name: &'static str,
    pub variants: &'static [&'static str],
    pub storage: EnumStorage,
    /// Database specific column type, like a Postgres enum type or a MySQL `ENUM(...)`.
    pub sql_type: Option<&'static str>,
}

impl EnumCodec {
    pub fn of<E: SqlEnum>(storage: EnumStorage) -> Self {
        Self {
            name: E::NAME,
            variants: E::VARIANTS,
            storage,
            sql_type: None,
        }
    }

    pub fn with_sql_type(mut self, sql_type: &'static str) -> Self {
        self.sql_type = Some(sql_type);
        self
    }

    fn variant(&self, value: &Value) -> Option<&'static str> {
        match value {
            Value::Varchar(Some(v)) | Value::Unknown(Some(v)) => {
                self.variants.iter().find(|name| **name == v.as_str()).copied()
            }
            Value::Char(Some(v)) => {
                let mut buffer = [0u8; 4];
                let v = v.encode_utf8(&mut buffer);
                self.variants.iter().find(|name| **name == v).copied()
            }
            v => v
                .as_i64()
                .and_then(|i| usize::try_from(i).ok())
                .and_then(|i| self.variants.get(i).copied()),
        }
    }

    fn ordinal(&self, name: &str) -> Option<i32> {
        self.variants
            .iter()
            .position(|v| *v == name)
            .and_then(|v| i32::try_from(v).ok())
    }
}

impl Codec for EnumCodec {
    fn name(&self) -> &'static str {
        self.name
    }

    fn write_sql_type(&self, dialect: Dialect, out: &mut String) {
        if let Some(sql_type) = self.sql_type {
            out.push_str(sql_type);
            return;
        }
        match self.storage {
            EnumStorage::Name => {
                let length = self.variants.iter().map(|v| v.len()).max().unwrap_or(1);
                let name = match dialect {
                    Dialect::Oracle => "VARCHAR2",
                    _ => "VARCHAR",
                };
                let _ = write!(out, "{}({})", name, length);
            }
            EnumStorage::Ordinal => out.push_str(match dialect {
                Dialect::Oracle => "NUMBER(10)",
                _ => "INTEGER",
            }),
        }
    }

    fn empty_value(&self) -> Value {
        Value::Varchar(None)
    }

    fn decode(&self, _context: &CodecContext, value: Value) -> Result<Value> {
        if value.is_null() {
            return Ok(self.empty_value());
        }
        let Some(name) = self.variant(&value) else {
            return Err(SqlError::type_mismatch(self.name, &value));
        };
        Ok(Value::Varchar(Some(name.into())))
    }

    fn bind_value(&self, context: &CodecContext, value: &Value) -> Result<Value> {
        let value = self.decode(context, value.clone())?;
        Ok(match (self.storage, value) {
            (EnumStorage::Ordinal, Value::Varchar(v)) => {
                Value::Int32(v.and_then(|v| self.ordinal(&v)))
            }
            (_, v) => v,
        })
    }

    fn render_literal(
        &self,
        context: &CodecContext,
        value: &Value,
        out: &mut String,
    ) -> Result<()> {
        let Value::Varchar(Some(name)) = self.decode(context, value.clone())? else {
            out.push_str("NULL");
            return Ok(());
        };
        match (self.storage, self.ordinal(&name)) {
            (EnumStorage::Ordinal, Some(ordinal)) => write_integer!(out, ordinal),
            _ => write_quoted_string(out, &name),
        }
        Ok(())
    }
}

/// Declares a fieldless enum that can be stored in a column.
///
/// ```
/// tabula_core::sql_enum! {
///     pub enum Genre {
///         Fiction,
///         Poetry,
///     }
/// }
/// assert_eq!(Genre::Poetry.name(), "Poetry");
/// ```
#[macro_export]
macro_rules! sql_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant),+
        }

        impl $name {
            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),+
                }
            }
        }

        impl $crate::SqlEnum for $name {
            const NAME: &'static str = stringify!($name);
            const VARIANTS: &'static [&'static str] = &[$(stringify!($variant)),+];
        }

        impl $crate::AsValue for $name {
            fn as_empty_value() -> $crate::Value {
                $crate::Value::Varchar(None)
            }
            fn as_value(self) -> $crate::Value {
                $crate::Value::Varchar(Some(self.name().into()))
            }
            fn try_from_value(value: $crate::Value) -> $crate::Result<Self> {
                const ALL: &[$name] = &[$($name::$variant),+];
                let found = match &value {
                    $crate::Value::Varchar(Some(v)) | $crate::Value::Unknown(Some(v)) => {
                        ALL.iter().find(|e| e.name() == v.as_str()).copied()
                    }
                    v => v
                        .as_i64()
                        .and_then(|i| usize::try_from(i).ok())
                        .and_then(|i| ALL.get(i).copied()),
                };
                found.ok_or_else(|| $crate::SqlError::type_mismatch(stringify!($name), &value))
            }
        }
    };
}
