use crate::{Codec, CodecContext, Dialect, Error, RawRow, Result, SqlError, Value, util::write_integer};

/// Durations are stored as a signed count of nanoseconds in a 64 bit integer column.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DurationCodec;

impl DurationCodec {
    fn nanoseconds(value: time::Duration) -> Result<i64> {
        i64::try_from(value.whole_nanoseconds()).map_err(|_| {
            let error = Error::msg(format!(
                "Duration {} does not fit in 64 bit nanoseconds",
                value
            ));
            log::error!("{:#}", error);
            error
        })
    }
}

impl Codec for DurationCodec {
    fn name(&self) -> &'static str {
        "duration"
    }

    fn write_sql_type(&self, dialect: Dialect, out: &mut String) {
        out.push_str(match dialect {
            Dialect::Oracle => "NUMBER(19)",
            Dialect::Sqlite => "INTEGER",
            _ => "BIGINT",
        });
    }

    fn empty_value(&self) -> Value {
        Value::Duration(None)
    }

    fn decode(&self, _context: &CodecContext, value: Value) -> Result<Value> {
        let nanos = match &value {
            v if v.is_null() => return Ok(self.empty_value()),
            Value::Duration(Some(v)) => return Ok(Value::Duration(Some(*v))),
            v if v.as_i64().is_some() => v.as_i64(),
            Value::Decimal(Some(v), ..) if v.fract().is_zero() => i64::try_from(*v).ok(),
            Value::Varchar(Some(v)) | Value::Unknown(Some(v)) => v.trim().parse::<i64>().ok(),
            _ => None,
        };
        nanos
            .map(|v| Value::Duration(Some(time::Duration::nanoseconds(v))))
            .ok_or_else(|| SqlError::type_mismatch(self.name(), &value))
    }

    fn bind_value(&self, context: &CodecContext, value: &Value) -> Result<Value> {
        match self.decode(context, value.clone())? {
            Value::Duration(Some(v)) => Ok(Value::Int64(Some(Self::nanoseconds(v)?))),
            _ => Ok(Value::Int64(None)),
        }
    }

    fn render_literal(
        &self,
        context: &CodecContext,
        value: &Value,
        out: &mut String,
    ) -> Result<()> {
        match self.decode(context, value.clone())? {
            Value::Duration(Some(v)) => write_integer!(out, Self::nanoseconds(v)?),
            _ => out.push_str("NULL"),
        }
        Ok(())
    }

    /// The primitive accessor yields zero for NULL, the null flag tells them apart.
    fn read(&self, _context: &CodecContext, row: &dyn RawRow, index: usize) -> Result<Value> {
        if row.is_null(index)? {
            return Ok(self.empty_value());
        }
        let nanos = row.get_i64(index)?;
        Ok(Value::Duration(Some(time::Duration::nanoseconds(nanos))))
    }
}
