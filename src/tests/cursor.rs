use anyhow::Result;

use crate::{Chunk, ConnectOptions, Connection, Error, Fetch, Query, Row, Value};

use super::data;

fn rows(range: core::ops::Range<i64>) -> Vec<Row> {
    range.map(|n| vec![Value::Integer(n)]).collect()
}

#[test]
fn multi_step_chunks() -> Result<()> {
    let mut c = Connection::open_in_memory()?;
    data::numbers(&mut c, 5)?;

    let stmt = c.prepare(&Query::select("SELECT n FROM numbers ORDER BY n"))?;

    assert_eq!(c.multi_step(&stmt, Some(2))?, Chunk::Rows(rows(0..2)));
    assert_eq!(c.multi_step(&stmt, Some(2))?, Chunk::Rows(rows(2..4)));
    assert_eq!(c.multi_step(&stmt, Some(2))?, Chunk::Done(rows(4..5)));
    assert_eq!(c.multi_step(&stmt, Some(2))?, Chunk::Done(Vec::new()));
    Ok(())
}

#[test]
fn multi_step_exact_chunks() -> Result<()> {
    let mut c = Connection::open_in_memory()?;
    data::numbers(&mut c, 4)?;

    let stmt = c.prepare(&Query::select("SELECT n FROM numbers ORDER BY n"))?;

    assert_eq!(c.multi_step(&stmt, Some(2))?, Chunk::Rows(rows(0..2)));
    assert_eq!(c.multi_step(&stmt, Some(2))?, Chunk::Done(rows(2..4)));

    c.reset(&stmt)?;
    assert_eq!(c.multi_step(&stmt, Some(4))?, Chunk::Done(rows(0..4)));

    c.reset(&stmt)?;
    assert_eq!(c.multi_step(&stmt, Some(1))?, Chunk::Rows(rows(0..1)));
    assert_eq!(c.multi_step(&stmt, Some(100))?, Chunk::Done(rows(1..4)));
    Ok(())
}

#[test]
fn multi_step_drain() -> Result<()> {
    let mut c = Connection::open_in_memory()?;
    data::numbers(&mut c, 120)?;

    let stmt = c.prepare(&Query::select("SELECT n FROM numbers ORDER BY n"))?;
    assert_eq!(c.multi_step(&stmt, None)?, Chunk::Done(rows(0..120)));

    let stmt = c.prepare(&Query::select("SELECT n FROM numbers WHERE n < 0"))?;
    assert_eq!(c.multi_step(&stmt, Some(3))?, Chunk::Done(Vec::new()));

    let e = c.multi_step(&stmt, Some(0)).unwrap_err();
    assert!(matches!(e, Error::Validation { .. }));
    Ok(())
}

#[test]
fn fetch_rows() -> Result<()> {
    let mut c = Connection::open_in_memory()?;
    data::numbers(&mut c, 3)?;

    let query = Query::select("SELECT n FROM numbers WHERE n >= ? ORDER BY n");
    let cursor = c.declare(&query, &[Value::from(1)])?;

    let fetch = c.fetch(&cursor)?;
    assert!(!fetch.is_halt());
    assert_eq!(fetch.result().columns(), ["n"]);
    assert_eq!(fetch.into_result().into_rows(), rows(1..2));

    let Fetch::Cont(result) = c.fetch(&cursor)? else {
        panic!("expected a row");
    };

    assert_eq!(result.rows(), rows(2..3));
    assert_eq!(result.changes(), None);

    let Fetch::Halt(result) = c.fetch(&cursor)? else {
        panic!("expected cursor to halt");
    };

    assert!(result.rows().is_empty());
    assert!(c.fetch(&cursor)?.is_halt());

    c.deallocate(&cursor);
    c.deallocate(&cursor);
    assert!(cursor.statement().is_released());

    let e = c.fetch(&cursor).unwrap_err();
    assert!(matches!(e, Error::Validation { .. }));
    Ok(())
}

#[test]
fn fetch_chunk_default_size() -> Result<()> {
    let mut c = ConnectOptions::new().in_memory().chunk_size(3).connect()?;
    assert_eq!(c.chunk_size(), 3);
    data::numbers(&mut c, 7)?;

    let cursor = c.declare(&Query::select("SELECT n FROM numbers ORDER BY n"), &[])?;

    assert_eq!(c.fetch_chunk(&cursor, None)?, Fetch::Cont(cursor.result(rows(0..3))));
    assert_eq!(c.fetch_chunk(&cursor, None)?, Fetch::Cont(cursor.result(rows(3..6))));
    assert_eq!(c.fetch_chunk(&cursor, None)?, Fetch::Halt(cursor.result(rows(6..7))));

    c.deallocate(&cursor);
    Ok(())
}

#[test]
fn declare_errors() -> Result<()> {
    let mut c = Connection::open_in_memory()?;
    data::numbers(&mut c, 1)?;

    let e = c
        .declare(&Query::select("SELECT n FROM missing"), &[])
        .unwrap_err();
    assert_eq!(e.statement(), Some("SELECT n FROM missing"));

    let e = c
        .declare(&Query::select("SELECT n FROM numbers WHERE n = ?"), &[])
        .unwrap_err();
    assert!(matches!(e, Error::Validation { .. }));
    Ok(())
}

#[test]
fn deallocate_after_disconnect() -> Result<()> {
    let mut c = Connection::open_in_memory()?;
    data::numbers(&mut c, 2)?;

    let cursor = c.declare(&Query::select("SELECT n FROM numbers"), &[])?;
    c.fetch(&cursor)?;

    c.disconnect()?;
    assert!(matches!(c.fetch(&cursor), Err(Error::Closed)));

    c.deallocate(&cursor);
    assert!(cursor.statement().is_released());
    Ok(())
}

#[test]
fn stream_chunks() -> Result<()> {
    let mut c = Connection::open_in_memory()?;
    data::numbers(&mut c, 5)?;

    let query = Query::select("SELECT n FROM numbers ORDER BY n");

    let chunks = c
        .stream(&query, &[], Some(2))?
        .map(|result| result.map(|result| result.into_rows()))
        .collect::<crate::Result<Vec<_>>>()?;

    assert_eq!(chunks, [rows(0..2), rows(2..4), rows(4..5)]);

    let chunks = c
        .stream(&query, &[], Some(5))?
        .collect::<crate::Result<Vec<_>>>()?;

    assert_eq!(chunks.len(), 1);

    let query = Query::select("SELECT n FROM numbers WHERE n < 0");
    assert_eq!(c.stream(&query, &[], None)?.count(), 0);

    let e = c.stream(&query, &[], Some(0)).err();
    assert!(matches!(e, Some(Error::Validation { .. })));
    Ok(())
}

#[test]
fn stream_releases_on_drop() -> Result<()> {
    let mut c = Connection::open_in_memory()?;
    data::numbers(&mut c, 10)?;

    let query = Query::select("SELECT n FROM numbers ORDER BY n");

    {
        let mut stream = c.stream(&query, &[], Some(2))?;
        let first = stream.next().transpose()?;
        assert_eq!(first.map(|result| result.into_rows()), Some(rows(0..2)));
    }

    // A statement still reading from the table would prevent this.
    c.execute("DROP TABLE numbers")?;
    Ok(())
}

#[test]
fn stream_error() -> Result<()> {
    let mut c = Connection::open_in_memory()?;
    c.execute("CREATE TABLE numbers (n INTEGER); INSERT INTO numbers VALUES (0), (1);")?;

    // The second row overflows, which is only detected while reading it.
    let query = Query::select("SELECT abs(-9223372036854775807 - n) FROM numbers");

    let mut stream = c.stream(&query, &[], Some(1))?;

    assert_eq!(
        stream.next().transpose()?.map(|result| result.into_rows()),
        Some(vec![vec![Value::Integer(i64::MAX)]])
    );

    assert!(stream.next().is_some_and(|result| result.is_err()));
    assert!(stream.next().is_none());
    Ok(())
}
