use anyhow::Result;
use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};

use crate::{Connection, Error, Query, Step, Value};

fn roundtrip(c: &mut Connection, value: Value) -> crate::Result<Value> {
    let stmt = c.prepare(&Query::select("SELECT ?").with_name("roundtrip"))?;
    c.bind(&stmt, &[value])?;

    let Step::Row(mut row) = c.step(&stmt)? else {
        panic!("expected a row");
    };

    Ok(row.remove(0))
}

#[test]
fn native_values() -> Result<()> {
    let mut c = Connection::open_in_memory()?;

    assert_eq!(roundtrip(&mut c, Value::Null)?, Value::Null);
    assert_eq!(roundtrip(&mut c, Value::from(i64::MIN))?, Value::Integer(i64::MIN));
    assert_eq!(roundtrip(&mut c, Value::from(i64::MAX))?, Value::Integer(i64::MAX));
    assert_eq!(roundtrip(&mut c, Value::from(69.42))?, Value::Float(69.42));
    assert_eq!(roundtrip(&mut c, Value::from("hällo 🦀"))?, Value::from("hällo 🦀"));
    assert_eq!(roundtrip(&mut c, Value::from(""))?, Value::from(""));
    assert_eq!(
        roundtrip(&mut c, Value::from(vec![0u8, 1, 2, 255]))?,
        Value::Blob(vec![0, 1, 2, 255])
    );
    assert_eq!(roundtrip(&mut c, Value::Blob(Vec::new()))?, Value::Blob(Vec::new()));
    Ok(())
}

#[test]
fn encoded_values() -> Result<()> {
    let mut c = Connection::open_in_memory()?;

    assert_eq!(roundtrip(&mut c, Value::from(true))?, Value::Integer(1));
    assert_eq!(roundtrip(&mut c, Value::from(false))?, Value::Integer(0));
    assert_eq!(roundtrip(&mut c, Value::from(42u64))?, Value::Integer(42));
    assert_eq!(roundtrip(&mut c, Value::BigInt(-7))?, Value::Integer(-7));

    let date = NaiveDate::from_ymd_opt(2021, 8, 25).unwrap();
    assert_eq!(roundtrip(&mut c, Value::from(date))?, Value::from("2021-08-25"));

    let time = date.and_hms_milli_opt(10, 58, 59, 250).unwrap();
    assert_eq!(roundtrip(&mut c, Value::from(time.time()))?, Value::from("10:58:59.250"));
    assert_eq!(
        roundtrip(&mut c, Value::from(time))?,
        Value::from("2021-08-25T10:58:59.250")
    );

    let utc = Utc.with_ymd_and_hms(2021, 8, 25, 10, 58, 59).unwrap();
    assert_eq!(roundtrip(&mut c, Value::from(utc))?, Value::from("2021-08-25T10:58:59Z"));
    Ok(())
}

#[test]
fn rejected_values() -> Result<()> {
    let mut c = Connection::open_in_memory()?;

    let offset = FixedOffset::east_opt(3600).unwrap();
    let timestamp = offset.with_ymd_and_hms(2021, 8, 25, 10, 58, 59).unwrap();

    let e = roundtrip(&mut c, Value::from(timestamp)).unwrap_err();
    assert!(matches!(e, Error::Validation { .. }));
    assert!(e.to_string().contains("2021-08-25 10:58:59 +01:00"));

    let e = roundtrip(&mut c, Value::from(u64::MAX)).unwrap_err();
    assert!(matches!(e, Error::Validation { .. }));
    assert!(e.to_string().contains("18446744073709551615"));

    // Nothing reached sqlite, so the connection is still fine.
    assert_eq!(roundtrip(&mut c, Value::from(1))?, Value::Integer(1));
    Ok(())
}

#[test]
fn no_partial_binds() -> Result<()> {
    let mut c = Connection::open_in_memory()?;

    let stmt = c.prepare(&Query::select("SELECT ?, ?"))?;
    c.bind(&stmt, &[Value::from(1), Value::from(2)])?;

    let e = c
        .bind(&stmt, &[Value::from(3), Value::BigInt(i128::MAX)])
        .unwrap_err();
    assert!(matches!(e, Error::Validation { .. }));

    assert_eq!(
        c.step(&stmt)?,
        Step::Row(vec![Value::Integer(1), Value::Integer(2)])
    );
    Ok(())
}
