use crate::{Codec, CodecContext, Dialect, Result, SqlError, Value, consume_while};
use std::fmt::Write;
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

/// Digits of the fractional second in the fixed textual pattern.
const TEXTUAL_FRACTION_DIGITS: usize = 6;
/// Digits of the fractional second in ISO literals.
const ISO_FRACTION_DIGITS: usize = 9;

fn write_date(out: &mut String, date: Date) {
    let _ = write!(
        out,
        "{:04}-{:02}-{:02}",
        date.year(),
        date.month() as u8,
        date.day()
    );
}

fn write_time(out: &mut String, time: Time, digits: usize) {
    let _ = write!(
        out,
        "{:02}:{:02}:{:02}",
        time.hour(),
        time.minute(),
        time.second()
    );
    let nanos = time.nanosecond();
    if nanos == 0 {
        return;
    }
    let fraction = nanos / 10u32.pow((ISO_FRACTION_DIGITS - digits) as u32);
    if fraction == 0 {
        return;
    }
    let _ = write!(out, ".{:0width$}", fraction, width = digits);
    out.truncate(out.trim_end_matches('0').len());
}

fn write_date_time(out: &mut String, value: PrimitiveDateTime, digits: usize) {
    write_date(out, value.date());
    out.push(' ');
    write_time(out, value.time(), digits);
}

fn write_offset(out: &mut String, offset: UtcOffset) {
    let (hours, minutes, _) = offset.as_hms();
    let sign = if offset.is_negative() { '-' } else { '+' };
    let _ = write!(out, "{}{:02}:{:02}", sign, hours.abs(), minutes.abs());
}

fn fraction_digits(dialect: Dialect) -> usize {
    if dialect.uses_textual_temporals() {
        TEXTUAL_FRACTION_DIGITS
    } else {
        ISO_FRACTION_DIGITS
    }
}

fn truncate_time(time: Time, dialect: Dialect) -> Time {
    if !dialect.uses_textual_temporals() {
        return time;
    }
    let micros = time.microsecond();
    Time::from_hms_micro(time.hour(), time.minute(), time.second(), micros).unwrap_or(time)
}

fn truncate_date_time(value: PrimitiveDateTime, dialect: Dialect) -> PrimitiveDateTime {
    value.replace_time(truncate_time(value.time(), dialect))
}

fn parse_number<T: atoi::FromRadix10SignedChecked>(input: &mut &str) -> Option<T> {
    let digits = consume_while(input, |c| c.is_ascii_digit() || *c == '-' || *c == '+');
    match T::from_radix_10_signed_checked(digits.as_bytes()) {
        (Some(v), len) if len == digits.len() && len > 0 => Some(v),
        _ => None,
    }
}

fn expect(input: &mut &str, c: char) -> Option<()> {
    *input = input.strip_prefix(c)?;
    Some(())
}

fn parse_date(input: &mut &str) -> Option<Date> {
    let sign = if input.starts_with('-') {
        *input = &input[1..];
        -1
    } else {
        1
    };
    let year: i32 = parse_number(&mut consume_while(input, char::is_ascii_digit))?;
    expect(input, '-')?;
    let month: u8 = parse_number(&mut consume_while(input, char::is_ascii_digit))?;
    expect(input, '-')?;
    let day: u8 = parse_number(&mut consume_while(input, char::is_ascii_digit))?;
    Date::from_calendar_date(sign * year, Month::try_from(month).ok()?, day).ok()
}

fn parse_time(input: &mut &str) -> Option<Time> {
    let hour: u8 = parse_number(&mut consume_while(input, char::is_ascii_digit))?;
    expect(input, ':')?;
    let minute: u8 = parse_number(&mut consume_while(input, char::is_ascii_digit))?;
    let mut second = 0u8;
    if expect(input, ':').is_some() {
        second = parse_number(&mut consume_while(input, char::is_ascii_digit))?;
    }
    let mut nanosecond = 0u32;
    if expect(input, '.').is_some() {
        let digits = consume_while(input, char::is_ascii_digit);
        if digits.is_empty() {
            return None;
        }
        let digits = &digits[..digits.len().min(ISO_FRACTION_DIGITS)];
        let value: u32 = parse_number(&mut { digits })?;
        nanosecond = value * 10u32.pow((ISO_FRACTION_DIGITS - digits.len()) as u32);
    }
    Time::from_hms_nano(hour, minute, second, nanosecond).ok()
}

fn parse_offset(input: &mut &str) -> Option<Option<UtcOffset>> {
    *input = input.trim_start();
    if input.is_empty() {
        return Some(None);
    }
    if expect(input, 'Z').is_some() || input.eq_ignore_ascii_case("UTC") {
        *input = "";
        return Some(Some(UtcOffset::UTC));
    }
    let sign: i8 = match input.chars().next()? {
        '+' => 1,
        '-' => -1,
        _ => return None,
    };
    *input = &input[1..];
    let digits = consume_while(input, char::is_ascii_digit);
    let (hours, mut minutes) = match digits.len() {
        1 | 2 => (parse_number::<i8>(&mut { digits })?, 0),
        4 => (
            parse_number::<i8>(&mut { &digits[..2] })?,
            parse_number::<i8>(&mut { &digits[2..] })?,
        ),
        _ => return None,
    };
    if expect(input, ':').is_some() {
        minutes = parse_number(&mut consume_while(input, char::is_ascii_digit))?;
    }
    UtcOffset::from_hms(sign * hours, sign * minutes, 0).ok().map(Some)
}

/// Parse `yyyy-MM-dd[( |T)HH:mm[:ss[.f]]][offset]`.
fn parse_date_time(value: &str) -> Option<(PrimitiveDateTime, Option<UtcOffset>)> {
    let mut input = value.trim();
    let date = parse_date(&mut input)?;
    let time = if input.starts_with([' ', 'T']) {
        input = &input[1..];
        parse_time(&mut input)?
    } else {
        Time::MIDNIGHT
    };
    let offset = parse_offset(&mut input)?;
    if !input.is_empty() {
        return None;
    }
    Some((PrimitiveDateTime::new(date, time), offset))
}

fn from_epoch_millis(millis: i64) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(millis as i128 * 1_000_000).ok()
}

/// Local date time in the context zone.
fn to_local(context: &CodecContext, value: OffsetDateTime) -> PrimitiveDateTime {
    let value = value.to_offset(context.time_zone);
    PrimitiveDateTime::new(value.date(), value.time())
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateCodec;

impl Codec for DateCodec {
    fn name(&self) -> &'static str {
        "date"
    }

    fn write_sql_type(&self, dialect: Dialect, out: &mut String) {
        out.push_str(match dialect {
            Dialect::Sqlite => "TEXT",
            _ => "DATE",
        });
    }

    fn empty_value(&self) -> Value {
        Value::Date(None)
    }

    fn decode(&self, context: &CodecContext, value: Value) -> Result<Value> {
        let date = match &value {
            v if v.is_null() => return Ok(self.empty_value()),
            Value::Date(Some(v)) => Some(*v),
            Value::Timestamp(Some(v)) => Some(v.date()),
            Value::TimestampWithTimezone(Some(v)) => Some(to_local(context, *v).date()),
            v if v.as_i64().is_some() => v
                .as_i64()
                .and_then(from_epoch_millis)
                .map(|v| to_local(context, v).date()),
            Value::Varchar(Some(v)) | Value::Unknown(Some(v)) => {
                parse_date_time(v).map(|(v, offset)| match offset {
                    Some(offset) => to_local(context, v.assume_offset(offset)).date(),
                    None => v.date(),
                })
            }
            _ => None,
        };
        date.map(|v| Value::Date(Some(v)))
            .ok_or_else(|| SqlError::type_mismatch(self.name(), &value))
    }

    fn bind_value(&self, context: &CodecContext, value: &Value) -> Result<Value> {
        let value = self.decode(context, value.clone())?;
        Ok(match value {
            Value::Date(v) if context.dialect.uses_textual_temporals() => {
                Value::Varchar(v.map(|v| {
                    let mut out = String::with_capacity(10);
                    write_date(&mut out, v);
                    out
                }))
            }
            v => v,
        })
    }

    fn render_literal(
        &self,
        context: &CodecContext,
        value: &Value,
        out: &mut String,
    ) -> Result<()> {
        let Value::Date(Some(v)) = self.decode(context, value.clone())? else {
            out.push_str("NULL");
            return Ok(());
        };
        if context.dialect == Dialect::Oracle {
            out.push_str("DATE ");
        }
        out.push('\'');
        write_date(out, v);
        out.push('\'');
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeCodec;

impl TimeCodec {
    /// Oracle keeps times in a timestamp anchored to this day.
    const ANCHOR: Date = time::macros::date!(1970 - 01 - 01);
}

impl Codec for TimeCodec {
    fn name(&self) -> &'static str {
        "time"
    }

    fn write_sql_type(&self, dialect: Dialect, out: &mut String) {
        out.push_str(match dialect {
            Dialect::Sqlite => "TEXT",
            Dialect::Oracle => "TIMESTAMP",
            Dialect::MySql => "TIME(6)",
            _ => "TIME",
        });
    }

    fn empty_value(&self) -> Value {
        Value::Time(None)
    }

    fn decode(&self, context: &CodecContext, value: Value) -> Result<Value> {
        let time = match &value {
            v if v.is_null() => return Ok(self.empty_value()),
            Value::Time(Some(v)) => Some(*v),
            Value::Timestamp(Some(v)) => Some(v.time()),
            Value::TimestampWithTimezone(Some(v)) => Some(to_local(context, *v).time()),
            Value::Varchar(Some(v)) | Value::Unknown(Some(v)) => {
                let mut input = v.trim();
                match parse_time(&mut input) {
                    Some(time) if input.is_empty() => Some(time),
                    _ => parse_date_time(v).map(|(v, _)| v.time()),
                }
            }
            _ => None,
        };
        time.map(|v| Value::Time(Some(truncate_time(v, context.dialect))))
            .ok_or_else(|| SqlError::type_mismatch(self.name(), &value))
    }

    fn bind_value(&self, context: &CodecContext, value: &Value) -> Result<Value> {
        let value = self.decode(context, value.clone())?;
        Ok(match (context.dialect, value) {
            (Dialect::Oracle, Value::Time(v)) => Value::Varchar(v.map(|v| {
                let mut out = String::with_capacity(26);
                write_date_time(
                    &mut out,
                    PrimitiveDateTime::new(Self::ANCHOR, v),
                    TEXTUAL_FRACTION_DIGITS,
                );
                out
            })),
            (Dialect::Sqlite, Value::Time(v)) => Value::Varchar(v.map(|v| {
                let mut out = String::with_capacity(15);
                write_time(&mut out, v, TEXTUAL_FRACTION_DIGITS);
                out
            })),
            (_, v) => v,
        })
    }

    fn render_literal(
        &self,
        context: &CodecContext,
        value: &Value,
        out: &mut String,
    ) -> Result<()> {
        let Value::Time(Some(v)) = self.decode(context, value.clone())? else {
            out.push_str("NULL");
            return Ok(());
        };
        let digits = fraction_digits(context.dialect);
        if context.dialect == Dialect::Oracle {
            out.push_str("TIMESTAMP '");
            write_date_time(out, PrimitiveDateTime::new(Self::ANCHOR, v), digits);
        } else {
            out.push('\'');
            write_time(out, v, digits);
        }
        out.push('\'');
        Ok(())
    }
}

/// Local date and time without zone.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateTimeCodec;

impl Codec for DateTimeCodec {
    fn name(&self) -> &'static str {
        "datetime"
    }

    fn write_sql_type(&self, dialect: Dialect, out: &mut String) {
        out.push_str(match dialect {
            Dialect::MySql => "DATETIME(6)",
            Dialect::Sqlite => "TEXT",
            Dialect::H2 => "TIMESTAMP(9)",
            Dialect::SqlServer => "DATETIME2",
            _ => "TIMESTAMP",
        });
    }

    fn empty_value(&self) -> Value {
        Value::Timestamp(None)
    }

    fn decode(&self, context: &CodecContext, value: Value) -> Result<Value> {
        let result = match &value {
            v if v.is_null() => return Ok(self.empty_value()),
            Value::Timestamp(Some(v)) => Some(*v),
            Value::TimestampWithTimezone(Some(v)) => Some(to_local(context, *v)),
            Value::Date(Some(v)) => Some(v.midnight()),
            v if v.as_i64().is_some() => v
                .as_i64()
                .and_then(from_epoch_millis)
                .map(|v| to_local(context, v)),
            Value::Varchar(Some(v)) | Value::Unknown(Some(v)) => {
                parse_date_time(v).map(|(v, offset)| match offset {
                    Some(offset) => to_local(context, v.assume_offset(offset)),
                    None => v,
                })
            }
            _ => None,
        };
        result
            .map(|v| Value::Timestamp(Some(truncate_date_time(v, context.dialect))))
            .ok_or_else(|| SqlError::type_mismatch(self.name(), &value))
    }

    fn bind_value(&self, context: &CodecContext, value: &Value) -> Result<Value> {
        let value = self.decode(context, value.clone())?;
        Ok(match value {
            Value::Timestamp(v) if context.dialect.uses_textual_temporals() => {
                Value::Varchar(v.map(|v| {
                    let mut out = String::with_capacity(26);
                    write_date_time(&mut out, v, TEXTUAL_FRACTION_DIGITS);
                    out
                }))
            }
            v => v,
        })
    }

    fn render_literal(
        &self,
        context: &CodecContext,
        value: &Value,
        out: &mut String,
    ) -> Result<()> {
        let Value::Timestamp(Some(v)) = self.decode(context, value.clone())? else {
            out.push_str("NULL");
            return Ok(());
        };
        if context.dialect == Dialect::Oracle {
            out.push_str("TIMESTAMP ");
        }
        out.push('\'');
        write_date_time(out, v, fraction_digits(context.dialect));
        out.push('\'');
        Ok(())
    }
}

/// Point in time, kept normalized to UTC in memory.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstantCodec;

impl InstantCodec {
    /// Zone assumed for stored values that carry no offset.
    fn storage_zone(context: &CodecContext) -> UtcOffset {
        match context.dialect {
            Dialect::Sqlite => UtcOffset::UTC,
            _ => context.time_zone,
        }
    }
}

impl Codec for InstantCodec {
    fn name(&self) -> &'static str {
        "instant"
    }

    fn write_sql_type(&self, dialect: Dialect, out: &mut String) {
        out.push_str(match dialect {
            Dialect::Postgres => "TIMESTAMP WITH TIME ZONE",
            Dialect::MySql => "TIMESTAMP(6)",
            Dialect::Sqlite => "TEXT",
            Dialect::H2 => "TIMESTAMP(9) WITH TIME ZONE",
            Dialect::Oracle => "TIMESTAMP",
            Dialect::SqlServer => "DATETIMEOFFSET",
        });
    }

    fn empty_value(&self) -> Value {
        Value::TimestampWithTimezone(None)
    }

    fn decode(&self, context: &CodecContext, value: Value) -> Result<Value> {
        let zone = Self::storage_zone(context);
        let result = match &value {
            v if v.is_null() => return Ok(self.empty_value()),
            Value::TimestampWithTimezone(Some(v)) => Some(*v),
            Value::Timestamp(Some(v)) => Some(v.assume_offset(zone)),
            v if v.as_i64().is_some() => v.as_i64().and_then(from_epoch_millis),
            Value::Varchar(Some(v)) | Value::Unknown(Some(v)) => {
                parse_date_time(v).map(|(v, offset)| v.assume_offset(offset.unwrap_or(zone)))
            }
            _ => None,
        };
        result
            .map(|v| {
                let v = v.to_offset(UtcOffset::UTC);
                let time = truncate_time(v.time(), context.dialect);
                Value::TimestampWithTimezone(Some(v.replace_time(time)))
            })
            .ok_or_else(|| SqlError::type_mismatch(self.name(), &value))
    }

    fn bind_value(&self, context: &CodecContext, value: &Value) -> Result<Value> {
        let value = self.decode(context, value.clone())?;
        let Value::TimestampWithTimezone(v) = value else {
            return Ok(value);
        };
        let zone = Self::storage_zone(context);
        Ok(match context.dialect {
            Dialect::MySql => Value::Timestamp(v.map(|v| {
                let v = v.to_offset(zone);
                PrimitiveDateTime::new(v.date(), v.time())
            })),
            Dialect::Sqlite | Dialect::Oracle => Value::Varchar(v.map(|v| {
                let v = v.to_offset(zone);
                let mut out = String::with_capacity(26);
                write_date_time(
                    &mut out,
                    PrimitiveDateTime::new(v.date(), v.time()),
                    TEXTUAL_FRACTION_DIGITS,
                );
                out
            })),
            _ => Value::TimestampWithTimezone(v),
        })
    }

    fn render_literal(
        &self,
        context: &CodecContext,
        value: &Value,
        out: &mut String,
    ) -> Result<()> {
        let Value::TimestampWithTimezone(Some(v)) = self.decode(context, value.clone())? else {
            out.push_str("NULL");
            return Ok(());
        };
        let digits = fraction_digits(context.dialect);
        match context.dialect {
            Dialect::Postgres | Dialect::H2 | Dialect::SqlServer => {
                let v = v.to_offset(context.time_zone);
                out.push('\'');
                write_date_time(out, PrimitiveDateTime::new(v.date(), v.time()), digits);
                write_offset(out, v.offset());
                out.push('\'');
            }
            dialect => {
                let v = v.to_offset(Self::storage_zone(context));
                if dialect == Dialect::Oracle {
                    out.push_str("TIMESTAMP ");
                }
                out.push('\'');
                write_date_time(out, PrimitiveDateTime::new(v.date(), v.time()), digits);
                out.push('\'');
            }
        }
        Ok(())
    }
}
