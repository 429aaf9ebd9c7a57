use crate::{
    AsValue, Codec, CodecContext, Dialect, Result, SqlError, Value, util::write_integer,
};
use rust_decimal::Decimal;
use std::fmt::Write;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BooleanCodec;

impl Codec for BooleanCodec {
    fn name(&self) -> &'static str {
        "boolean"
    }

    fn write_sql_type(&self, dialect: Dialect, out: &mut String) {
        out.push_str(match dialect {
            Dialect::Oracle => "NUMBER(1)",
            Dialect::SqlServer => "BIT",
            _ => "BOOLEAN",
        });
    }

    fn empty_value(&self) -> Value {
        Value::Boolean(None)
    }

    fn decode(&self, _context: &CodecContext, value: Value) -> Result<Value> {
        if value.is_null() {
            return Ok(self.empty_value());
        }
        bool::try_from_value(value).map(AsValue::as_value)
    }

    fn bind_value(&self, context: &CodecContext, value: &Value) -> Result<Value> {
        let value = self.decode(context, value.clone())?;
        Ok(match (context.dialect, value) {
            (Dialect::Oracle, Value::Boolean(v)) => Value::Int8(v.map(i8::from)),
            (_, v) => v,
        })
    }

    fn render_literal(
        &self,
        context: &CodecContext,
        value: &Value,
        out: &mut String,
    ) -> Result<()> {
        let Value::Boolean(Some(v)) = self.decode(context, value.clone())? else {
            out.push_str("NULL");
            return Ok(());
        };
        out.push_str(match (context.dialect, v) {
            (Dialect::Oracle | Dialect::SqlServer | Dialect::Sqlite, true) => "1",
            (Dialect::Oracle | Dialect::SqlServer | Dialect::Sqlite, false) => "0",
            (_, true) => "TRUE",
            (_, false) => "FALSE",
        });
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegerWidth {
    Tiny,
    Small,
    Int,
    Big,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntegerCodec {
    pub width: IntegerWidth,
}

impl IntegerCodec {
    pub const fn new(width: IntegerWidth) -> Self {
        Self { width }
    }
}

impl Codec for IntegerCodec {
    fn name(&self) -> &'static str {
        match self.width {
            IntegerWidth::Tiny => "tinyint",
            IntegerWidth::Small => "smallint",
            IntegerWidth::Int => "integer",
            IntegerWidth::Big => "bigint",
        }
    }

    fn write_sql_type(&self, dialect: Dialect, out: &mut String) {
        out.push_str(match (dialect, self.width) {
            (Dialect::Sqlite, _) => "INTEGER",
            (Dialect::Oracle, IntegerWidth::Tiny) => "NUMBER(3)",
            (Dialect::Oracle, IntegerWidth::Small) => "NUMBER(5)",
            (Dialect::Oracle, IntegerWidth::Int) => "NUMBER(10)",
            (Dialect::Oracle, IntegerWidth::Big) => "NUMBER(19)",
            // Postgres has no single byte integer, SQL Server's one is unsigned
            (Dialect::Postgres | Dialect::SqlServer, IntegerWidth::Tiny) => "SMALLINT",
            (_, IntegerWidth::Tiny) => "TINYINT",
            (_, IntegerWidth::Small) => "SMALLINT",
            (Dialect::MySql, IntegerWidth::Int) => "INT",
            (_, IntegerWidth::Int) => "INTEGER",
            (_, IntegerWidth::Big) => "BIGINT",
        });
    }

    fn empty_value(&self) -> Value {
        match self.width {
            IntegerWidth::Tiny => Value::Int8(None),
            IntegerWidth::Small => Value::Int16(None),
            IntegerWidth::Int => Value::Int32(None),
            IntegerWidth::Big => Value::Int64(None),
        }
    }

    fn decode(&self, _context: &CodecContext, value: Value) -> Result<Value> {
        if value.is_null() {
            return Ok(self.empty_value());
        }
        let result = match self.width {
            IntegerWidth::Tiny => i8::try_from_value(value).map(AsValue::as_value),
            IntegerWidth::Small => i16::try_from_value(value).map(AsValue::as_value),
            IntegerWidth::Int => i32::try_from_value(value).map(AsValue::as_value),
            IntegerWidth::Big => i64::try_from_value(value).map(AsValue::as_value),
        };
        result.map_err(|e| e.context(format!("While decoding a {} value", self.name())))
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
        match self.decode(context, value.clone())?.as_i64() {
            Some(v) => write_integer!(out, v),
            None => out.push_str("NULL"),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FloatCodec {
    pub double: bool,
}

impl Codec for FloatCodec {
    fn name(&self) -> &'static str {
        if self.double { "double" } else { "real" }
    }

    fn write_sql_type(&self, dialect: Dialect, out: &mut String) {
        out.push_str(match (dialect, self.double) {
            (Dialect::Sqlite, _) => "REAL",
            (Dialect::Oracle, false) => "BINARY_FLOAT",
            (Dialect::Oracle, true) => "BINARY_DOUBLE",
            (Dialect::MySql, false) => "FLOAT",
            (Dialect::MySql, true) => "DOUBLE",
            (Dialect::SqlServer, true) => "FLOAT",
            (_, false) => "REAL",
            (_, true) => "DOUBLE PRECISION",
        });
    }

    fn empty_value(&self) -> Value {
        if self.double {
            Value::Float64(None)
        } else {
            Value::Float32(None)
        }
    }

    fn decode(&self, _context: &CodecContext, value: Value) -> Result<Value> {
        if value.is_null() {
            return Ok(self.empty_value());
        }
        if self.double {
            f64::try_from_value(value).map(AsValue::as_value)
        } else {
            f32::try_from_value(value).map(AsValue::as_value)
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
        let v = match self.decode(context, value.clone())? {
            Value::Float32(Some(v)) => v as f64,
            Value::Float64(Some(v)) => v,
            _ => {
                out.push_str("NULL");
                return Ok(());
            }
        };
        if v.is_finite() {
            let mut buffer = ryu::Buffer::new();
            out.push_str(buffer.format(v));
            return Ok(());
        }
        match context.dialect {
            Dialect::Postgres => out.push_str(if v.is_nan() {
                "'NaN'"
            } else if v.is_sign_negative() {
                "'-Infinity'"
            } else {
                "'Infinity'"
            }),
            Dialect::Oracle => out.push_str(if v.is_nan() {
                "BINARY_DOUBLE_NAN"
            } else if v.is_sign_negative() {
                "-BINARY_DOUBLE_INFINITY"
            } else {
                "BINARY_DOUBLE_INFINITY"
            }),
            dialect => {
                let error = SqlError::unsupported(dialect, "Non finite floating point literals");
                log::error!("{:#}", error);
                return Err(error);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecimalCodec {
    pub precision: u8,
    pub scale: u8,
}

impl Codec for DecimalCodec {
    fn name(&self) -> &'static str {
        "decimal"
    }

    fn write_sql_type(&self, dialect: Dialect, out: &mut String) {
        let name = match dialect {
            Dialect::Oracle => "NUMBER",
            _ => "DECIMAL",
        };
        let _ = write!(out, "{}({}, {})", name, self.precision, self.scale);
    }

    fn empty_value(&self) -> Value {
        Value::Decimal(None, self.precision, self.scale)
    }

    fn decode(&self, _context: &CodecContext, value: Value) -> Result<Value> {
        if value.is_null() {
            return Ok(self.empty_value());
        }
        let v = Decimal::try_from_value(value)?.round_dp(self.scale as u32);
        Ok(Value::Decimal(Some(v), self.precision, self.scale))
    }

    fn bind_value(&self, context: &CodecContext, value: &Value) -> Result<Value> {
        let value = self.decode(context, value.clone())?;
        Ok(match (context.dialect, value) {
            // Numeric affinity keeps the text exact where a double would not
            (Dialect::Sqlite, Value::Decimal(Some(v), ..)) => Value::Varchar(Some(v.to_string())),
            (_, v) => v,
        })
    }

    fn render_literal(
        &self,
        context: &CodecContext,
        value: &Value,
        out: &mut String,
    ) -> Result<()> {
        match self.decode(context, value.clone())? {
            Value::Decimal(Some(v), ..) => {
                let _ = write!(out, "{}", v);
            }
            _ => out.push_str("NULL"),
        }
        Ok(())
    }
}
