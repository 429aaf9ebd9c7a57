mod duration;
mod enumeration;
mod numeric;
mod temporal;
mod text;

pub use duration::*;
pub use enumeration::*;
pub use numeric::*;
pub use temporal::*;
pub use text::*;

use crate::{Dialect, Prepared, RawRow, Result, Value};
use std::fmt::Debug;
use time::UtcOffset;

/// Everything a codec may depend on besides the value itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecContext {
    pub dialect: Dialect,
    /// Zone used to interpret and render local date times.
    pub time_zone: UtcOffset,
}

impl CodecContext {
    pub const fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            time_zone: UtcOffset::UTC,
        }
    }

    pub const fn with_time_zone(mut self, time_zone: UtcOffset) -> Self {
        self.time_zone = time_zone;
        self
    }
}

/// Converts the values of one logical type between memory, SQL text and the driver.
///
/// `decode` turns every shape the codec itself produces (and any other shape it recognizes) into
/// the canonical value, so that `decode(bind_value(v)) == v` holds for every representable `v`.
pub trait Codec: Debug + Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Column type used in `CREATE TABLE`.
    fn write_sql_type(&self, dialect: Dialect, out: &mut String);

    /// Typed NULL of the canonical representation.
    fn empty_value(&self) -> Value;

    /// Convert a driver or caller value into the canonical representation.
    fn decode(&self, context: &CodecContext, value: Value) -> Result<Value>;

    /// Representation handed to the driver when binding a parameter.
    fn bind_value(&self, context: &CodecContext, value: &Value) -> Result<Value>;

    /// Write the value as a SQL literal.
    fn render_literal(&self, context: &CodecContext, value: &Value, out: &mut String)
    -> Result<()>;

    /// Read the column at `index` of a raw row.
    fn read(&self, context: &CodecContext, row: &dyn RawRow, index: usize) -> Result<Value> {
        self.decode(context, row.value(index)?)
    }
}

/// The closed set of logical column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Boolean(BooleanCodec),
    Integer(IntegerCodec),
    Float(FloatCodec),
    Decimal(DecimalCodec),
    Text(TextCodec),
    Blob(BlobCodec),
    Uuid(UuidCodec),
    Date(DateCodec),
    Time(TimeCodec),
    DateTime(DateTimeCodec),
    Instant(InstantCodec),
    Duration(DurationCodec),
    Enumeration(EnumCodec),
}

impl ColumnType {
    pub const BOOLEAN: ColumnType = ColumnType::Boolean(BooleanCodec);
    pub const TINYINT: ColumnType = ColumnType::Integer(IntegerCodec::new(IntegerWidth::Tiny));
    pub const SMALLINT: ColumnType = ColumnType::Integer(IntegerCodec::new(IntegerWidth::Small));
    pub const INTEGER: ColumnType = ColumnType::Integer(IntegerCodec::new(IntegerWidth::Int));
    pub const BIGINT: ColumnType = ColumnType::Integer(IntegerCodec::new(IntegerWidth::Big));
    pub const REAL: ColumnType = ColumnType::Float(FloatCodec { double: false });
    pub const DOUBLE: ColumnType = ColumnType::Float(FloatCodec { double: true });
    pub const TEXT: ColumnType = ColumnType::Text(TextCodec::new(TextKind::Text));
    pub const BLOB: ColumnType = ColumnType::Blob(BlobCodec);
    pub const UUID: ColumnType = ColumnType::Uuid(UuidCodec);
    pub const DATE: ColumnType = ColumnType::Date(DateCodec);
    pub const TIME: ColumnType = ColumnType::Time(TimeCodec);
    pub const DATETIME: ColumnType = ColumnType::DateTime(DateTimeCodec);
    pub const INSTANT: ColumnType = ColumnType::Instant(InstantCodec);
    pub const DURATION: ColumnType = ColumnType::Duration(DurationCodec);

    pub const fn varchar(length: u32) -> ColumnType {
        ColumnType::Text(TextCodec::new(TextKind::Varchar(length)))
    }

    pub const fn char(length: u32) -> ColumnType {
        ColumnType::Text(TextCodec::new(TextKind::Char(length)))
    }

    pub const fn decimal(precision: u8, scale: u8) -> ColumnType {
        ColumnType::Decimal(DecimalCodec { precision, scale })
    }

    pub fn enumeration<E: SqlEnum>(storage: EnumStorage) -> ColumnType {
        ColumnType::Enumeration(EnumCodec::of::<E>(storage))
    }

    pub fn codec(&self) -> &dyn Codec {
        match self {
            ColumnType::Boolean(v) => v,
            ColumnType::Integer(v) => v,
            ColumnType::Float(v) => v,
            ColumnType::Decimal(v) => v,
            ColumnType::Text(v) => v,
            ColumnType::Blob(v) => v,
            ColumnType::Uuid(v) => v,
            ColumnType::Date(v) => v,
            ColumnType::Time(v) => v,
            ColumnType::DateTime(v) => v,
            ColumnType::Instant(v) => v,
            ColumnType::Duration(v) => v,
            ColumnType::Enumeration(v) => v,
        }
    }

    /// Best codec for a value whose column is unknown, like a bare literal.
    pub fn for_value(value: &Value) -> ColumnType {
        match value {
            Value::Boolean(..) => ColumnType::BOOLEAN,
            Value::Int8(..) => ColumnType::TINYINT,
            Value::Int16(..) => ColumnType::SMALLINT,
            Value::Int32(..) => ColumnType::INTEGER,
            Value::Int64(..) => ColumnType::BIGINT,
            Value::Float32(..) => ColumnType::REAL,
            Value::Float64(..) => ColumnType::DOUBLE,
            Value::Decimal(v, precision, scale) => match (precision, scale) {
                (0, 0) => ColumnType::decimal(38, v.map(|v| v.scale() as u8).unwrap_or(0)),
                _ => ColumnType::decimal(*precision, *scale),
            },
            Value::Char(..) => ColumnType::char(1),
            Value::Blob(..) => ColumnType::BLOB,
            Value::Date(..) => ColumnType::DATE,
            Value::Time(..) => ColumnType::TIME,
            Value::Timestamp(..) => ColumnType::DATETIME,
            Value::TimestampWithTimezone(..) => ColumnType::INSTANT,
            Value::Duration(..) => ColumnType::DURATION,
            Value::Uuid(..) => ColumnType::UUID,
            Value::Null | Value::Varchar(..) | Value::Unknown(..) => ColumnType::TEXT,
        }
    }

    pub fn name(&self) -> &'static str {
        self.codec().name()
    }

    pub fn write_sql_type(&self, dialect: Dialect, out: &mut String) {
        self.codec().write_sql_type(dialect, out);
    }

    pub fn empty_value(&self) -> Value {
        self.codec().empty_value()
    }

    pub fn decode(&self, context: &CodecContext, value: Value) -> Result<Value> {
        self.codec().decode(context, value)
    }

    pub fn bind_value(&self, context: &CodecContext, value: &Value) -> Result<Value> {
        self.codec().bind_value(context, value)
    }

    /// Bind `value` at the 1-based `index` of the prepared statement.
    pub fn bind<P: Prepared + ?Sized>(
        &self,
        context: &CodecContext,
        prepared: &mut P,
        index: u64,
        value: &Value,
    ) -> Result<()> {
        prepared.bind_index(self.bind_value(context, value)?, index)
    }

    pub fn render_literal(
        &self,
        context: &CodecContext,
        value: &Value,
        out: &mut String,
    ) -> Result<()> {
        self.codec().render_literal(context, value, out)
    }

    pub fn read(&self, context: &CodecContext, row: &dyn RawRow, index: usize) -> Result<Value> {
        self.codec().read(context, row, index)
    }
}

/// Write the SQL-standard single quoted string, doubling quotes.
pub(crate) fn write_quoted_string(out: &mut String, value: &str) {
    out.reserve(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        if c == '\'' {
            out.push('\'');
        }
        out.push(c);
    }
    out.push('\'');
}
