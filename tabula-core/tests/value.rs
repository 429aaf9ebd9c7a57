#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use std::collections::HashSet;
    use tabula_core::{AsValue, SqlError, Value, sql_error};
    use time::macros::{date, datetime};
    use uuid::Uuid;

    #[test]
    fn value_null() {
        assert_eq!(Value::Null, Value::Null);
        assert_ne!(Value::Float32(Some(1.0)), Value::Null);
        assert_ne!(Value::Int32(None), Value::Null);
        assert!(Value::Int32(None).is_null());
        assert!(!Value::Varchar(Some("".into())).is_null());
        assert_eq!(
            Value::Decimal(Some(Decimal::ONE), 10, 2).as_null(),
            Value::Decimal(None, 10, 2)
        );
    }

    #[test]
    fn value_bool() {
        let val: Value = true.into();
        assert_eq!(val, Value::Boolean(Some(true)));
        assert_ne!(val, Value::Boolean(Some(false)));
        assert_ne!(val, Value::Varchar(Some("true".into())));
        assert!(bool::try_from_value(val).expect("Failed to read a boolean"));
        assert!(bool::try_from_value(Value::Int8(Some(1))).expect("1 is true"));
        assert!(!bool::try_from_value(Value::Int64(Some(0))).expect("0 is false"));
        assert!(bool::try_from_value(Value::Varchar(Some(" T ".into()))).expect("t is true"));
        assert!(bool::try_from_value(Value::Int32(Some(2))).is_err());
        assert!(bool::try_from_value(Value::Float32(Some(0.5))).is_err());
    }

    #[test]
    fn value_integers() {
        let val: Value = 127_i8.into();
        assert_eq!(val, Value::Int8(Some(127)));
        assert_eq!(i8::try_from_value(val).expect("Failed to read an i8"), 127);
        assert_eq!(
            i16::try_from_value(Value::Int64(Some(-32768))).expect("In range"),
            -32768
        );
        assert!(i16::try_from_value(Value::Int64(Some(32768))).is_err());
        assert_eq!(
            i32::try_from_value(Value::Varchar(Some(" -42 ".into()))).expect("Textual integer"),
            -42
        );
        assert!(i32::try_from_value(Value::Varchar(Some("42abc".into()))).is_err());
        assert_eq!(
            i64::try_from_value(Value::Decimal(Some(Decimal::new(700, 2)), 5, 2))
                .expect("Integral decimal"),
            7
        );
        assert!(i64::try_from_value(Value::Decimal(Some(Decimal::new(701, 2)), 5, 2)).is_err());
        let error = i8::try_from_value(Value::Float64(Some(0.1))).expect_err("Not an integer");
        assert!(matches!(
            sql_error(&error),
            Some(SqlError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn value_floats() {
        assert_eq!(
            f64::try_from_value(Value::Float32(Some(1.5))).expect("Widened float"),
            1.5
        );
        assert_eq!(
            f32::try_from_value(Value::Int16(Some(-3))).expect("Integer as float"),
            -3.0
        );
        assert_eq!(
            f64::try_from_value(Value::Unknown(Some("2.5e3".into()))).expect("Textual float"),
            2500.0
        );
        assert_eq!(Value::Float64(Some(f64::NAN)), Value::Float64(Some(f64::NAN)));
        assert!(f64::try_from_value(Value::Boolean(Some(true))).is_err());
    }

    #[test]
    fn value_decimal() {
        let val: Value = Decimal::new(1234, 2).into();
        assert_eq!(val, Value::Decimal(Some(Decimal::new(1234, 2)), 0, 0));
        assert_ne!(val, Value::Decimal(Some(Decimal::new(1234, 2)), 10, 2));
        assert!(val.same_type(&Value::Decimal(None, 0, 0)));
        assert_eq!(
            Decimal::try_from_value(Value::Varchar(Some("-0.75".into()))).expect("Textual"),
            Decimal::new(-75, 2)
        );
        assert_eq!(
            Decimal::try_from_value(Value::Int32(Some(9))).expect("Integer"),
            Decimal::from(9)
        );
    }

    #[test]
    fn value_text() {
        assert_eq!(Value::from("abc"), Value::Varchar(Some("abc".into())));
        assert_eq!(
            String::try_from_value(Value::Char(Some('x'))).expect("Char as text"),
            "x"
        );
        assert_eq!(
            char::try_from_value(Value::Varchar(Some("é".into()))).expect("Single char"),
            'é'
        );
        assert!(char::try_from_value(Value::Varchar(Some("ab".into()))).is_err());
        assert!(String::try_from_value(Value::Int32(Some(1))).is_err());
        assert_eq!(Value::Unknown(Some("raw".into())).as_str(), Some("raw"));
    }

    #[test]
    fn value_blob_and_uuid() {
        let val: Value = vec![1_u8, 2, 3].into();
        assert_eq!(val, Value::Blob(Some([1, 2, 3].into())));
        assert_eq!(
            Vec::<u8>::try_from_value(val).expect("Failed to read the blob"),
            [1, 2, 3]
        );
        let uuid = Uuid::parse_str("5e915574-bb30-4430-98cf-c5854f61fbbd").expect("Invalid uuid");
        assert_eq!(
            Uuid::try_from_value(Value::Varchar(Some(uuid.to_string()))).expect("Textual uuid"),
            uuid
        );
        assert_eq!(
            Uuid::try_from_value(Value::Blob(Some(uuid.as_bytes().as_slice().into())))
                .expect("Binary uuid"),
            uuid
        );
        assert!(Uuid::try_from_value(Value::Blob(Some([0_u8; 3].into()))).is_err());
    }

    #[test]
    fn value_temporal() {
        let day = date!(2024 - 02 - 29);
        assert_eq!(
            time::Date::try_from_value(day.as_value()).expect("Failed to read the date"),
            day
        );
        assert!(time::Date::try_from_value(Value::Varchar(Some("2024-02-29".into()))).is_err());
        let moment = datetime!(2024-03-01 12:30 +2);
        let same = datetime!(2024-03-01 10:30 UTC);
        assert_eq!(moment.as_value(), same.as_value());
        let set: HashSet<Value> = [moment.as_value(), same.as_value()].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn value_option() {
        assert_eq!(None::<i32>.as_value(), Value::Int32(None));
        assert_eq!(Some(3_i64).as_value(), Value::Int64(Some(3)));
        assert_eq!(
            Option::<String>::try_from_value(Value::Null).expect("Null is none"),
            None
        );
        assert_eq!(
            Option::<i16>::try_from_value(Value::Int16(None)).expect("Typed null is none"),
            None
        );
        assert_eq!(
            Option::<i16>::try_from_value(Value::Int16(Some(4))).expect("Set value"),
            Some(4)
        );
    }
}
