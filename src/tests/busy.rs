use std::path::Path;
use std::thread;

use anyhow::{Context, Result};

use crate::{Chunk, Code, ConnectOptions, Connection, Query, Step, TransactionMode, Value};

use super::data;

fn open(path: &Path, busy_timeout: u32) -> crate::Result<Connection> {
    ConnectOptions::new()
        .path(path)
        .busy_timeout(busy_timeout)
        .connect()
}

#[test]
fn connection_read_only() -> Result<()> {
    let dir = tempfile::tempdir().context("tempdir")?;
    let path = dir.path().join("database.sqlite3");

    let mut c = open(&path, 0)?;
    data::users(&mut c)?;

    let mut c = ConnectOptions::new().path(&path).read_only().connect()?;

    let e = c
        .execute("INSERT INTO users VALUES (2, 'Bob', NULL, NULL, NULL)")
        .unwrap_err();

    assert_eq!(e.code(), Some(Code::READONLY));
    Ok(())
}

#[test]
fn connection_open_missing_read_only() -> Result<()> {
    let dir = tempfile::tempdir().context("tempdir")?;
    let path = dir.path().join("missing.sqlite3");

    let e = ConnectOptions::new()
        .path(&path)
        .read_only()
        .connect()
        .unwrap_err();

    assert_eq!(e.code(), Some(Code::CANTOPEN));
    assert!(!e.is_disconnect());
    Ok(())
}

#[test]
fn locked_database() -> Result<()> {
    let dir = tempfile::tempdir().context("tempdir")?;
    let path = dir.path().join("database.sqlite3");

    let mut a = open(&path, 0)?;
    let mut b = open(&path, 0)?;

    data::users(&mut a)?;

    // Prepare before locking, since preparing needs to read the schema.
    let stmt = b.prepare(&Query::select("SELECT name FROM users"))?;

    a.begin(TransactionMode::Exclusive)?;
    assert_eq!(b.step(&stmt)?, Step::Busy);

    b.reset(&stmt)?;
    assert_eq!(b.multi_step(&stmt, Some(10))?, Chunk::Busy);

    let e = b.query(&Query::select("SELECT name FROM users"), &[]).unwrap_err();
    assert!(e.is_busy());
    assert!(!e.is_disconnect());
    assert_eq!(e.code(), Some(Code::BUSY));

    let e = b.execute("INSERT INTO users (id) VALUES (2)").unwrap_err();
    assert!(e.is_busy());

    // Failing to open a transaction tears the connection down.
    let e = b.begin(TransactionMode::Immediate).unwrap_err();
    assert!(e.is_disconnect());
    assert_eq!(e.code(), Some(Code::BUSY));
    assert!(b.is_closed());

    a.commit(TransactionMode::Deferred)?;

    let mut b = open(&path, 0)?;
    let result = b.query(&Query::select("SELECT name FROM users"), &[])?;
    assert_eq!(result.rows(), [vec![Value::from("Alice")]]);
    Ok(())
}

#[test]
fn connection_busy_timeout() -> Result<()> {
    let dir = tempfile::tempdir().context("tempdir")?;
    let path = dir.path().join("database.sqlite3");

    let mut c = open(&path, 0)?;
    data::users(&mut c)?;

    let mut guards = Vec::with_capacity(10);

    for id in 2..12i64 {
        let path = path.to_path_buf();

        guards.push(thread::spawn(move || -> Result<Option<u64>> {
            let mut c = open(&path, 10_000)?;
            let insert = Query::insert("INSERT INTO users VALUES (?, ?, ?, ?, ?)");

            let result = c.query(
                &insert,
                &[
                    Value::from(id),
                    Value::from("Bob"),
                    Value::from(69.42),
                    Value::from(&[0x69u8, 0x42u8][..]),
                    Value::Null,
                ],
            )?;

            Ok(result.changes())
        }));
    }

    for guard in guards {
        let changes = guard.join().map_err(|_| anyhow::anyhow!("thread panicked"))??;
        assert_eq!(changes, Some(1));
    }

    let result = c.query(&Query::select("SELECT COUNT(*) FROM users"), &[])?;
    assert_eq!(result.rows(), [vec![Value::Integer(11)]]);
    Ok(())
}
