#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use tabula::{
        AsValue, CodecContext, ColumnType, Dialect, EnumStorage, SqlError, Value, sql_enum,
        sql_error,
    };
    use time::macros::{date, datetime, offset, time};
    use uuid::Uuid;

    sql_enum! {
        pub enum Shipping {
            Standard,
            Express,
            Overnight,
        }
    }

    fn literal(column_type: ColumnType, dialect: Dialect, value: impl Into<Value>) -> String {
        let mut out = String::new();
        column_type
            .render_literal(&CodecContext::new(dialect), &value.into(), &mut out)
            .expect("Failed to render the literal");
        out
    }

    fn sql_type(column_type: ColumnType, dialect: Dialect) -> String {
        let mut out = String::new();
        column_type.write_sql_type(dialect, &mut out);
        out
    }

    #[test]
    fn boolean() {
        assert_eq!(literal(ColumnType::BOOLEAN, Dialect::Postgres, true), "TRUE");
        assert_eq!(literal(ColumnType::BOOLEAN, Dialect::H2, false), "FALSE");
        assert_eq!(literal(ColumnType::BOOLEAN, Dialect::Sqlite, true), "1");
        assert_eq!(literal(ColumnType::BOOLEAN, Dialect::SqlServer, false), "0");
        assert_eq!(sql_type(ColumnType::BOOLEAN, Dialect::Oracle), "NUMBER(1)");
        assert_eq!(sql_type(ColumnType::BOOLEAN, Dialect::SqlServer), "BIT");
        let context = CodecContext::new(Dialect::Oracle);
        assert_eq!(
            ColumnType::BOOLEAN
                .bind_value(&context, &true.as_value())
                .expect("Failed to bind"),
            Value::Int8(Some(1))
        );
        assert_eq!(
            ColumnType::BOOLEAN
                .decode(&context, Value::Int64(Some(0)))
                .expect("Failed to decode"),
            Value::Boolean(Some(false))
        );
        assert!(
            ColumnType::BOOLEAN
                .decode(&context, Value::Int64(Some(2)))
                .is_err()
        );
    }

    #[test]
    fn integers() {
        assert_eq!(sql_type(ColumnType::TINYINT, Dialect::Postgres), "SMALLINT");
        assert_eq!(sql_type(ColumnType::TINYINT, Dialect::MySql), "TINYINT");
        assert_eq!(sql_type(ColumnType::INTEGER, Dialect::MySql), "INT");
        assert_eq!(sql_type(ColumnType::BIGINT, Dialect::Sqlite), "INTEGER");
        assert_eq!(sql_type(ColumnType::BIGINT, Dialect::Oracle), "NUMBER(19)");
        assert_eq!(literal(ColumnType::BIGINT, Dialect::MySql, -42i64), "-42");
        let context = CodecContext::new(Dialect::Sqlite);
        assert_eq!(
            ColumnType::SMALLINT
                .decode(&context, Value::Varchar(Some(" 1200 ".into())))
                .expect("Failed to decode"),
            Value::Int16(Some(1200))
        );
        assert_eq!(
            ColumnType::INTEGER
                .decode(&context, Value::Int64(Some(7)))
                .expect("Failed to decode"),
            Value::Int32(Some(7))
        );
        let overflow = ColumnType::TINYINT
            .decode(&context, Value::Int32(Some(300)))
            .expect_err("300 does not fit a tiny integer");
        assert!(matches!(
            sql_error(&overflow),
            Some(SqlError::TypeMismatch { .. })
        ));
        assert_eq!(
            ColumnType::INTEGER
                .decode(&context, Value::Null)
                .expect("Failed to decode"),
            Value::Int32(None)
        );
    }

    #[test]
    fn floats() {
        assert_eq!(literal(ColumnType::DOUBLE, Dialect::Sqlite, 1.5f64), "1.5");
        assert_eq!(literal(ColumnType::REAL, Dialect::Postgres, 0.25f32), "0.25");
        assert_eq!(
            literal(ColumnType::DOUBLE, Dialect::Postgres, f64::NAN),
            "'NaN'"
        );
        assert_eq!(
            literal(ColumnType::DOUBLE, Dialect::Postgres, f64::NEG_INFINITY),
            "'-Infinity'"
        );
        assert_eq!(
            literal(ColumnType::DOUBLE, Dialect::Oracle, f64::INFINITY),
            "BINARY_DOUBLE_INFINITY"
        );
        let mut out = String::new();
        assert!(
            ColumnType::DOUBLE
                .render_literal(
                    &CodecContext::new(Dialect::MySql),
                    &f64::NAN.as_value(),
                    &mut out
                )
                .is_err()
        );
        assert_eq!(sql_type(ColumnType::DOUBLE, Dialect::Postgres), "DOUBLE PRECISION");
        assert_eq!(sql_type(ColumnType::DOUBLE, Dialect::SqlServer), "FLOAT");
        assert_eq!(sql_type(ColumnType::REAL, Dialect::Oracle), "BINARY_FLOAT");
        assert_eq!(
            ColumnType::DOUBLE
                .decode(
                    &CodecContext::new(Dialect::Sqlite),
                    Value::Varchar(Some("2.5e3".into()))
                )
                .expect("Failed to decode"),
            Value::Float64(Some(2500.0))
        );
    }

    #[test]
    fn decimal() {
        let price = ColumnType::decimal(10, 2);
        assert_eq!(sql_type(price, Dialect::MySql), "DECIMAL(10, 2)");
        assert_eq!(sql_type(price, Dialect::Oracle), "NUMBER(10, 2)");
        assert_eq!(
            literal(price, Dialect::Postgres, Decimal::new(-12345, 2)),
            "-123.45"
        );
        let sqlite = CodecContext::new(Dialect::Sqlite);
        assert_eq!(
            price
                .bind_value(&sqlite, &Decimal::new(1999, 2).as_value())
                .expect("Failed to bind"),
            Value::Varchar(Some("19.99".into()))
        );
        assert_eq!(
            price
                .decode(&sqlite, Value::Varchar(Some("19.99".into())))
                .expect("Failed to decode"),
            Value::Decimal(Some(Decimal::new(1999, 2)), 10, 2)
        );
        // Rounded to the scale of the column
        assert_eq!(
            price
                .decode(&sqlite, Value::Float64(Some(0.125)))
                .expect("Failed to decode"),
            Value::Decimal(Some(Decimal::new(12, 2)), 10, 2)
        );
    }

    #[test]
    fn text() {
        let name = ColumnType::varchar(5);
        assert_eq!(literal(name, Dialect::Postgres, "it's"), "'it''s'");
        assert_eq!(literal(name, Dialect::SqlServer, "it's"), "N'it''s'");
        assert_eq!(literal(ColumnType::TEXT, Dialect::MySql, "a\\b'c"), "'a\\\\b''c'");
        assert_eq!(literal(ColumnType::TEXT, Dialect::Sqlite, Value::Null), "NULL");
        assert_eq!(sql_type(name, Dialect::Oracle), "VARCHAR2(5)");
        assert_eq!(sql_type(name, Dialect::SqlServer), "NVARCHAR(5)");
        assert_eq!(sql_type(ColumnType::char(3), Dialect::SqlServer), "NCHAR(3)");
        assert_eq!(sql_type(ColumnType::TEXT, Dialect::H2), "CLOB");
        assert_eq!(sql_type(ColumnType::TEXT, Dialect::SqlServer), "NVARCHAR(MAX)");

        let context = CodecContext::new(Dialect::Postgres);
        assert!(
            name.bind_value(&context, &Value::from("abcdef"))
                .is_err()
        );
        assert!(name.bind_value(&context, &Value::from("àèìòù")).is_ok());
        assert_eq!(
            ColumnType::char(5)
                .decode(&context, Value::Varchar(Some("EUR  ".into())))
                .expect("Failed to decode"),
            Value::Varchar(Some("EUR".into()))
        );
        assert_eq!(
            ColumnType::TEXT
                .decode(&context, Value::Blob(Some(b"bytes".to_vec().into())))
                .expect("Failed to decode"),
            Value::Varchar(Some("bytes".into()))
        );
    }

    #[test]
    fn blob() {
        let bytes = vec![0xDE, 0xAD, 0x01];
        assert_eq!(literal(ColumnType::BLOB, Dialect::Postgres, bytes.clone()), "'\\xDEAD01'");
        assert_eq!(
            literal(ColumnType::BLOB, Dialect::Oracle, bytes.clone()),
            "HEXTORAW('DEAD01')"
        );
        assert_eq!(literal(ColumnType::BLOB, Dialect::SqlServer, bytes.clone()), "0xDEAD01");
        assert_eq!(literal(ColumnType::BLOB, Dialect::Sqlite, bytes), "X'DEAD01'");
        assert_eq!(sql_type(ColumnType::BLOB, Dialect::Postgres), "BYTEA");
        assert_eq!(sql_type(ColumnType::BLOB, Dialect::SqlServer), "VARBINARY(MAX)");
    }

    #[test]
    fn uuid() {
        let uuid = Uuid::parse_str("5e915574-bb30-4430-98cf-c5854f61fbbd").expect("Invalid uuid");
        assert_eq!(
            literal(ColumnType::UUID, Dialect::Postgres, uuid),
            "'5e915574-bb30-4430-98cf-c5854f61fbbd'"
        );
        assert_eq!(
            literal(ColumnType::UUID, Dialect::MySql, uuid),
            "X'5E915574BB30443098CFC5854F61FBBD'"
        );
        assert_eq!(sql_type(ColumnType::UUID, Dialect::MySql), "BINARY(16)");
        assert_eq!(sql_type(ColumnType::UUID, Dialect::SqlServer), "UNIQUEIDENTIFIER");

        let mysql = CodecContext::new(Dialect::MySql);
        let bound = ColumnType::UUID
            .bind_value(&mysql, &uuid.as_value())
            .expect("Failed to bind");
        assert_eq!(bound, Value::Blob(Some(uuid.as_bytes().to_vec().into())));
        assert_eq!(
            ColumnType::UUID.decode(&mysql, bound).expect("Failed to decode"),
            Value::Uuid(Some(uuid))
        );
        let sqlite = CodecContext::new(Dialect::Sqlite);
        assert_eq!(
            ColumnType::UUID
                .bind_value(&sqlite, &uuid.as_value())
                .expect("Failed to bind"),
            Value::Varchar(Some(uuid.to_string()))
        );
        assert!(
            ColumnType::UUID
                .decode(&sqlite, Value::Varchar(Some("not a uuid".into())))
                .is_err()
        );
    }

    #[test]
    fn date_and_time() {
        let day = date!(2024 - 02 - 29);
        assert_eq!(literal(ColumnType::DATE, Dialect::Postgres, day), "'2024-02-29'");
        assert_eq!(literal(ColumnType::DATE, Dialect::Oracle, day), "DATE '2024-02-29'");
        assert_eq!(sql_type(ColumnType::DATE, Dialect::Sqlite), "TEXT");

        let clock = time!(13:45:30.25);
        assert_eq!(literal(ColumnType::TIME, Dialect::H2, clock), "'13:45:30.25'");
        assert_eq!(
            literal(ColumnType::TIME, Dialect::Oracle, clock),
            "TIMESTAMP '1970-01-01 13:45:30.25'"
        );
        let precise = time!(08:00:00.123456789);
        assert_eq!(
            literal(ColumnType::TIME, Dialect::Postgres, precise),
            "'08:00:00.123456789'"
        );
        assert_eq!(literal(ColumnType::TIME, Dialect::Sqlite, precise), "'08:00:00.123456'");

        let moment = datetime!(2024-02-29 13:45:30);
        assert_eq!(
            literal(ColumnType::DATETIME, Dialect::MySql, moment),
            "'2024-02-29 13:45:30'"
        );
        assert_eq!(sql_type(ColumnType::DATETIME, Dialect::MySql), "DATETIME(6)");
        assert_eq!(sql_type(ColumnType::DATETIME, Dialect::SqlServer), "DATETIME2");

        let sqlite = CodecContext::new(Dialect::Sqlite);
        assert_eq!(
            ColumnType::DATE
                .bind_value(&sqlite, &day.as_value())
                .expect("Failed to bind"),
            Value::Varchar(Some("2024-02-29".into()))
        );
        assert_eq!(
            ColumnType::DATETIME
                .decode(&sqlite, Value::Varchar(Some("2024-02-29T13:45:30".into())))
                .expect("Failed to decode"),
            Value::Timestamp(Some(moment))
        );
        assert_eq!(
            ColumnType::TIME
                .decode(&sqlite, Value::Varchar(Some("13:45:30.25".into())))
                .expect("Failed to decode"),
            Value::Time(Some(clock))
        );
        assert!(
            ColumnType::DATE
                .decode(&sqlite, Value::Varchar(Some("2024-02-30".into())))
                .is_err()
        );
    }

    #[test]
    fn instant() {
        let instant = datetime!(2024-03-01 10:30:00 UTC);
        let rome = offset!(+1);
        let postgres = CodecContext::new(Dialect::Postgres).with_time_zone(rome);
        let mut out = String::new();
        ColumnType::INSTANT
            .render_literal(&postgres, &instant.as_value(), &mut out)
            .expect("Failed to render the literal");
        assert_eq!(out, "'2024-03-01 11:30:00+01:00'");

        // Values without offset are read in the zone of the context
        assert_eq!(
            ColumnType::INSTANT
                .decode(
                    &postgres,
                    Value::Timestamp(Some(datetime!(2024-03-01 11:30:00)))
                )
                .expect("Failed to decode"),
            Value::TimestampWithTimezone(Some(instant))
        );
        // SQLite stores them in UTC regardless of the context zone
        let sqlite = CodecContext::new(Dialect::Sqlite).with_time_zone(rome);
        let bound = ColumnType::INSTANT
            .bind_value(&sqlite, &datetime!(2024-03-01 11:30:00 +1).as_value())
            .expect("Failed to bind");
        assert_eq!(bound, Value::Varchar(Some("2024-03-01 10:30:00".into())));
        assert_eq!(
            ColumnType::INSTANT
                .decode(&sqlite, bound)
                .expect("Failed to decode"),
            Value::TimestampWithTimezone(Some(instant))
        );
        assert_eq!(
            ColumnType::INSTANT
                .decode(
                    &sqlite,
                    Value::Varchar(Some("2024-03-01T12:30:00+02:00".into()))
                )
                .expect("Failed to decode"),
            Value::TimestampWithTimezone(Some(instant))
        );
        assert_eq!(
            sql_type(ColumnType::INSTANT, Dialect::Postgres),
            "TIMESTAMP WITH TIME ZONE"
        );
    }

    #[test]
    fn duration() {
        let elapsed = time::Duration::new(90, 500_000_000);
        assert_eq!(
            literal(ColumnType::DURATION, Dialect::Postgres, elapsed),
            "90500000000"
        );
        let context = CodecContext::new(Dialect::H2);
        assert_eq!(
            ColumnType::DURATION
                .bind_value(&context, &elapsed.as_value())
                .expect("Failed to bind"),
            Value::Int64(Some(90_500_000_000))
        );
        assert_eq!(
            ColumnType::DURATION
                .decode(&context, Value::Int64(Some(-1_000)))
                .expect("Failed to decode"),
            Value::Duration(Some(time::Duration::microseconds(-1)))
        );
        assert_eq!(sql_type(ColumnType::DURATION, Dialect::Oracle), "NUMBER(19)");
    }

    #[test]
    fn enumeration() {
        let by_name = ColumnType::enumeration::<Shipping>(EnumStorage::Name);
        let by_ordinal = ColumnType::enumeration::<Shipping>(EnumStorage::Ordinal);
        assert_eq!(sql_type(by_name, Dialect::Postgres), "VARCHAR(9)");
        assert_eq!(sql_type(by_name, Dialect::Oracle), "VARCHAR2(9)");
        assert_eq!(sql_type(by_ordinal, Dialect::MySql), "INTEGER");
        assert_eq!(literal(by_name, Dialect::Postgres, Shipping::Express), "'Express'");
        assert_eq!(literal(by_ordinal, Dialect::Postgres, Shipping::Express), "1");

        let context = CodecContext::new(Dialect::Postgres);
        assert_eq!(
            by_ordinal
                .bind_value(&context, &Shipping::Overnight.as_value())
                .expect("Failed to bind"),
            Value::Int32(Some(2))
        );
        assert_eq!(
            by_ordinal
                .decode(&context, Value::Int32(Some(0)))
                .expect("Failed to decode"),
            Value::Varchar(Some("Standard".into()))
        );
        assert_eq!(
            Shipping::try_from_value(Value::Varchar(Some("Express".into())))
                .expect("Failed to convert"),
            Shipping::Express
        );
        let unknown = by_name
            .decode(&context, Value::Varchar(Some("Drone".into())))
            .expect_err("Drone is not a shipping method");
        assert!(matches!(
            sql_error(&unknown),
            Some(SqlError::TypeMismatch { codec, .. }) if codec == "Shipping"
        ));
        assert!(by_ordinal.decode(&context, Value::Int32(Some(3))).is_err());
    }

    #[test]
    fn decode_reverses_bind() {
        let uuid = Uuid::parse_str("5e915574-bb30-4430-98cf-c5854f61fbbd").expect("Invalid uuid");
        let cases = [
            (ColumnType::BOOLEAN, Value::Boolean(Some(true))),
            (ColumnType::TINYINT, Value::Int8(Some(-7))),
            (ColumnType::SMALLINT, Value::Int16(Some(1200))),
            (ColumnType::INTEGER, Value::Int32(Some(i32::MIN))),
            (ColumnType::BIGINT, Value::Int64(Some(i64::MAX))),
            (ColumnType::REAL, Value::Float32(Some(0.5))),
            (ColumnType::DOUBLE, Value::Float64(Some(-1.25e-7))),
            (
                ColumnType::decimal(10, 2),
                Value::Decimal(Some(Decimal::new(-1999, 2)), 10, 2),
            ),
            (ColumnType::varchar(40), Value::Varchar(Some("O'Brien ü".into()))),
            (ColumnType::char(5), Value::Varchar(Some("abc".into()))),
            (ColumnType::TEXT, Value::Varchar(Some("line\nbreak".into()))),
            (ColumnType::BLOB, Value::Blob(Some(vec![0_u8, 255, 16].into()))),
            (ColumnType::UUID, Value::Uuid(Some(uuid))),
            (ColumnType::DATE, Value::Date(Some(date!(2024 - 02 - 29)))),
            (ColumnType::TIME, Value::Time(Some(time!(23:59:59.123456)))),
            (
                ColumnType::DATETIME,
                Value::Timestamp(Some(datetime!(1999-12-31 23:59:59.5))),
            ),
            (
                ColumnType::INSTANT,
                Value::TimestampWithTimezone(Some(datetime!(2024-03-31 01:30:00.25 UTC))),
            ),
            (
                ColumnType::DURATION,
                Value::Duration(Some(time::Duration::new(-90, -500))),
            ),
            (
                ColumnType::enumeration::<Shipping>(EnumStorage::Name),
                Value::Varchar(Some("Express".into())),
            ),
            (
                ColumnType::enumeration::<Shipping>(EnumStorage::Ordinal),
                Value::Varchar(Some("Overnight".into())),
            ),
        ];
        for dialect in Dialect::ALL {
            for zone in [offset!(UTC), offset!(+5:30), offset!(-8), offset!(+14)] {
                let context = CodecContext::new(dialect).with_time_zone(zone);
                for (column_type, value) in &cases {
                    for value in [value.clone(), column_type.empty_value()] {
                        let bound = column_type
                            .bind_value(&context, &value)
                            .expect("Failed to bind");
                        let decoded = column_type
                            .decode(&context, bound.clone())
                            .expect("Failed to decode");
                        assert_eq!(
                            decoded,
                            value,
                            "{} on {dialect} at {zone}, bound as {bound:?}",
                            column_type.name()
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn for_value() {
        assert_eq!(ColumnType::for_value(&Value::Int64(Some(1))), ColumnType::BIGINT);
        assert_eq!(ColumnType::for_value(&Value::Null), ColumnType::TEXT);
        assert_eq!(
            ColumnType::for_value(&Decimal::new(1234, 3).as_value()),
            ColumnType::decimal(38, 3)
        );
    }
}
