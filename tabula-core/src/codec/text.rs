use crate::{
    AsValue, Codec, CodecContext, Dialect, Error, Result, SqlError, Value,
    codec::write_quoted_string,
};
use std::fmt::Write;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextKind {
    Varchar(u32),
    /// Blank padded, trailing spaces are removed when decoding.
    Char(u32),
    /// Unbounded.
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextCodec {
    pub kind: TextKind,
}

impl TextCodec {
    pub const fn new(kind: TextKind) -> Self {
        Self { kind }
    }

    fn max_length(&self) -> Option<u32> {
        match self.kind {
            TextKind::Varchar(n) | TextKind::Char(n) => Some(n),
            TextKind::Text => None,
        }
    }
}

impl Codec for TextCodec {
    fn name(&self) -> &'static str {
        match self.kind {
            TextKind::Varchar(..) => "varchar",
            TextKind::Char(..) => "char",
            TextKind::Text => "text",
        }
    }

    fn write_sql_type(&self, dialect: Dialect, out: &mut String) {
        match (dialect, self.kind) {
            (Dialect::Oracle, TextKind::Varchar(n)) => drop(write!(out, "VARCHAR2({})", n)),
            (Dialect::SqlServer, TextKind::Varchar(n)) => drop(write!(out, "NVARCHAR({})", n)),
            (_, TextKind::Varchar(n)) => drop(write!(out, "VARCHAR({})", n)),
            (Dialect::SqlServer, TextKind::Char(n)) => drop(write!(out, "NCHAR({})", n)),
            (_, TextKind::Char(n)) => drop(write!(out, "CHAR({})", n)),
            (Dialect::H2 | Dialect::Oracle, TextKind::Text) => out.push_str("CLOB"),
            (Dialect::SqlServer, TextKind::Text) => out.push_str("NVARCHAR(MAX)"),
            (_, TextKind::Text) => out.push_str("TEXT"),
        }
    }

    fn empty_value(&self) -> Value {
        Value::Varchar(None)
    }

    fn decode(&self, _context: &CodecContext, value: Value) -> Result<Value> {
        if value.is_null() {
            return Ok(self.empty_value());
        }
        let mut v = match value {
            Value::Blob(Some(ref v)) => String::from_utf8(v.to_vec())
                .map_err(|_| SqlError::type_mismatch(self.name(), &value))?,
            value => String::try_from_value(value)?,
        };
        if let TextKind::Char(..) = self.kind {
            v.truncate(v.trim_end_matches(' ').len());
        }
        Ok(Value::Varchar(Some(v)))
    }

    fn bind_value(&self, context: &CodecContext, value: &Value) -> Result<Value> {
        let value = self.decode(context, value.clone())?;
        if let (Some(max), Value::Varchar(Some(v))) = (self.max_length(), &value) {
            let length = v.chars().count();
            if length > max as usize {
                let error = Error::msg(format!(
                    "Value `{}` has {} characters and cannot be stored in a {}({}) column",
                    v,
                    length,
                    self.name(),
                    max
                ));
                log::error!("{:#}", error);
                return Err(error);
            }
        }
        Ok(value)
    }

    fn render_literal(
        &self,
        context: &CodecContext,
        value: &Value,
        out: &mut String,
    ) -> Result<()> {
        let Value::Varchar(Some(v)) = self.decode(context, value.clone())? else {
            out.push_str("NULL");
            return Ok(());
        };
        match context.dialect {
            Dialect::MySql => {
                out.push('\'');
                for c in v.chars() {
                    match c {
                        '\'' => out.push_str("''"),
                        '\\' => out.push_str("\\\\"),
                        c => out.push(c),
                    }
                }
                out.push('\'');
            }
            Dialect::SqlServer => {
                out.push('N');
                write_quoted_string(out, &v);
            }
            _ => write_quoted_string(out, &v),
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlobCodec;

impl Codec for BlobCodec {
    fn name(&self) -> &'static str {
        "blob"
    }

    fn write_sql_type(&self, dialect: Dialect, out: &mut String) {
        out.push_str(match dialect {
            Dialect::Postgres => "BYTEA",
            Dialect::SqlServer => "VARBINARY(MAX)",
            _ => "BLOB",
        });
    }

    fn empty_value(&self) -> Value {
        Value::Blob(None)
    }

    fn decode(&self, _context: &CodecContext, value: Value) -> Result<Value> {
        match value {
            v if v.is_null() => Ok(self.empty_value()),
            Value::Blob(v) => Ok(Value::Blob(v)),
            Value::Varchar(Some(v)) | Value::Unknown(Some(v)) => {
                Ok(Value::Blob(Some(v.into_bytes().into())))
            }
            v => Err(SqlError::type_mismatch(self.name(), v)),
        }
    }

    fn bind_value(&self, context: &CodecContext, value: &Value) -> Result<Value> {
        self.decode(context, value.clone())
    }

    fn render_literal(
        &self,
        context: &CodecContext,
        value: &Value,
        out: &mut String,
    ) -> Result<()> {
        let Value::Blob(Some(v)) = self.decode(context, value.clone())? else {
            out.push_str("NULL");
            return Ok(());
        };
        write_hex_literal(context.dialect, out, &v);
        Ok(())
    }
}

fn write_hex_literal(dialect: Dialect, out: &mut String, bytes: &[u8]) {
    let hex = hex::encode_upper(bytes);
    match dialect {
        Dialect::Postgres => drop(write!(out, "'\\x{}'", hex)),
        Dialect::Oracle => drop(write!(out, "HEXTORAW('{}')", hex)),
        Dialect::SqlServer => drop(write!(out, "0x{}", hex)),
        _ => drop(write!(out, "X'{}'", hex)),
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UuidCodec;

impl Codec for UuidCodec {
    fn name(&self) -> &'static str {
        "uuid"
    }

    fn write_sql_type(&self, dialect: Dialect, out: &mut String) {
        out.push_str(match dialect {
            Dialect::MySql => "BINARY(16)",
            Dialect::Oracle => "RAW(16)",
            Dialect::Sqlite => "TEXT",
            Dialect::SqlServer => "UNIQUEIDENTIFIER",
            _ => "UUID",
        });
    }

    fn empty_value(&self) -> Value {
        Value::Uuid(None)
    }

    fn decode(&self, _context: &CodecContext, value: Value) -> Result<Value> {
        if value.is_null() {
            return Ok(self.empty_value());
        }
        Uuid::try_from_value(value).map(AsValue::as_value)
    }

    fn bind_value(&self, context: &CodecContext, value: &Value) -> Result<Value> {
        let value = self.decode(context, value.clone())?;
        Ok(match (context.dialect, value) {
            (Dialect::MySql | Dialect::Oracle, Value::Uuid(v)) => {
                Value::Blob(v.map(|v| v.as_bytes().to_vec().into()))
            }
            (Dialect::Sqlite, Value::Uuid(v)) => Value::Varchar(v.map(|v| v.to_string())),
            (_, v) => v,
        })
    }

    fn render_literal(
        &self,
        context: &CodecContext,
        value: &Value,
        out: &mut String,
    ) -> Result<()> {
        let Value::Uuid(Some(v)) = self.decode(context, value.clone())? else {
            out.push_str("NULL");
            return Ok(());
        };
        match context.dialect {
            Dialect::MySql | Dialect::Oracle => write_hex_literal(context.dialect, out, v.as_bytes()),
            _ => drop(write!(out, "'{}'", v)),
        }
        Ok(())
    }
}
