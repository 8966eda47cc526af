use anyhow::Result;

use crate::{Code, Connection, Query, TransactionMode, TransactionStatus, Value};

fn count(c: &mut Connection) -> crate::Result<i64> {
    let result = c.query(&Query::select("SELECT COUNT(*) FROM users"), &[])?;
    Ok(result.rows()[0][0].as_integer().unwrap_or_default())
}

fn insert(c: &mut Connection, name: &str) -> crate::Result<()> {
    let query = Query::insert("INSERT INTO users VALUES (?)").with_name("insert");
    c.query(&query, &[Value::from(name)])?;
    Ok(())
}

fn setup() -> crate::Result<Connection> {
    let mut c = Connection::open_in_memory()?;
    c.execute("CREATE TABLE users (name TEXT UNIQUE)")?;
    Ok(c)
}

#[test]
fn begin_commit() -> Result<()> {
    for mode in [
        TransactionMode::Deferred,
        TransactionMode::Immediate,
        TransactionMode::Exclusive,
        TransactionMode::Savepoint,
    ] {
        let mut c = setup()?;
        assert_eq!(c.status(), TransactionStatus::Idle);

        assert_eq!(c.begin(mode)?, TransactionStatus::Transaction);
        assert_eq!(c.status(), TransactionStatus::Transaction);
        insert(&mut c, "Alice")?;

        assert_eq!(c.commit(mode)?, TransactionStatus::Idle);
        assert_eq!(c.status(), TransactionStatus::Idle);
        assert_eq!(count(&mut c)?, 1);
    }

    Ok(())
}

#[test]
fn begin_rollback() -> Result<()> {
    let mut c = setup()?;

    c.begin(TransactionMode::Deferred)?;
    insert(&mut c, "Alice")?;
    assert_eq!(c.rollback(TransactionMode::Deferred)?, TransactionStatus::Idle);
    assert_eq!(count(&mut c)?, 0);

    c.begin(TransactionMode::Savepoint)?;
    insert(&mut c, "Alice")?;
    assert_eq!(c.rollback(TransactionMode::Savepoint)?, TransactionStatus::Idle);
    assert_eq!(count(&mut c)?, 0);
    Ok(())
}

#[test]
fn nested_savepoint() -> Result<()> {
    let mut c = setup()?;

    c.begin(TransactionMode::Deferred)?;
    insert(&mut c, "Alice")?;

    // Any mode opens a savepoint inside of a transaction.
    assert_eq!(c.begin(TransactionMode::Immediate)?, TransactionStatus::Transaction);
    insert(&mut c, "Bob")?;
    assert_eq!(count(&mut c)?, 2);

    assert_eq!(c.rollback(TransactionMode::Savepoint)?, TransactionStatus::Transaction);
    assert_eq!(count(&mut c)?, 1);

    c.begin(TransactionMode::Savepoint)?;
    insert(&mut c, "Charlie")?;
    assert_eq!(c.commit(TransactionMode::Savepoint)?, TransactionStatus::Transaction);

    assert_eq!(c.commit(TransactionMode::Deferred)?, TransactionStatus::Idle);
    assert_eq!(count(&mut c)?, 2);
    Ok(())
}

#[test]
fn statement_failure_is_recoverable() -> Result<()> {
    let mut c = setup()?;

    c.begin(TransactionMode::Deferred)?;
    insert(&mut c, "Alice")?;

    let e = insert(&mut c, "Alice").unwrap_err();
    assert_eq!(e.code(), Some(Code::CONSTRAINT_UNIQUE));
    assert!(!e.is_disconnect());
    assert_eq!(c.status(), TransactionStatus::Transaction);

    c.commit(TransactionMode::Deferred)?;
    assert_eq!(count(&mut c)?, 1);
    Ok(())
}

#[test]
fn commit_without_transaction() -> Result<()> {
    let mut c = setup()?;

    let e = c.commit(TransactionMode::Deferred).unwrap_err();
    assert!(e.is_disconnect());
    assert_eq!(e.code(), Some(Code::ERROR));
    assert_eq!(e.statement(), Some("COMMIT"));
    assert!(c.is_closed());
    assert_eq!(c.status(), TransactionStatus::Idle);
    Ok(())
}

#[test]
fn savepoint_without_transaction() -> Result<()> {
    let mut c = setup()?;

    let e = c.rollback(TransactionMode::Savepoint).unwrap_err();
    assert!(e.is_disconnect());
    assert_eq!(e.code(), None);
    assert!(c.is_closed());

    let mut c = setup()?;

    let e = c.commit(TransactionMode::Savepoint).unwrap_err();
    assert!(e.is_disconnect());
    assert!(c.is_closed());
    Ok(())
}

#[test]
fn status_follows_execute() -> Result<()> {
    let mut c = setup()?;

    c.execute("BEGIN")?;
    assert_eq!(c.status(), TransactionStatus::Transaction);

    c.execute("INSERT INTO users VALUES ('Alice'); COMMIT;")?;
    assert_eq!(c.status(), TransactionStatus::Idle);

    c.query(&Query::new("BEGIN IMMEDIATE"), &[])?;
    assert_eq!(c.status(), TransactionStatus::Transaction);

    c.query(&Query::new("ROLLBACK"), &[])?;
    assert_eq!(c.status(), TransactionStatus::Idle);
    Ok(())
}

#[test]
fn status_follows_failed_step() -> Result<()> {
    let mut c = Connection::open_in_memory()?;
    c.execute("CREATE TABLE t (id INTEGER PRIMARY KEY); INSERT INTO t VALUES (1);")?;

    c.begin(TransactionMode::Deferred)?;
    c.execute("INSERT INTO t VALUES (2)")?;

    // The conflict rolls back the whole transaction.
    let stmt = c.prepare(&Query::insert("INSERT OR ROLLBACK INTO t VALUES (1)"))?;
    let e = c.step(&stmt).unwrap_err();
    assert_eq!(e.code(), Some(Code::CONSTRAINT_PRIMARYKEY));
    assert_eq!(c.status(), TransactionStatus::Idle);

    c.begin(TransactionMode::Deferred)?;
    let stmt = c.prepare(&Query::insert("INSERT OR ROLLBACK INTO t VALUES (1)"))?;
    assert!(c.multi_step(&stmt, None).is_err());
    assert_eq!(c.status(), TransactionStatus::Idle);

    c.begin(TransactionMode::Deferred)?;
    let e = c
        .query(&Query::insert("INSERT OR ROLLBACK INTO t VALUES (1)"), &[])
        .unwrap_err();
    assert!(!e.is_disconnect());
    assert_eq!(c.status(), TransactionStatus::Idle);

    // The connection is still healthy and nothing was committed.
    assert!(!c.is_closed());
    let result = c.query(&Query::select("SELECT COUNT(*) FROM t"), &[])?;
    assert_eq!(result.rows(), [vec![Value::Integer(1)]]);
    Ok(())
}

#[test]
fn failed_savepoint_rollback() -> Result<()> {
    let mut c = setup()?;

    // A plain transaction has no savepoint to roll back to.
    c.execute("BEGIN")?;
    assert_eq!(c.status(), TransactionStatus::Transaction);

    let e = c.rollback(TransactionMode::Savepoint).unwrap_err();
    assert!(e.is_disconnect());
    assert_eq!(e.code(), Some(Code::ERROR));
    assert!(e.statement().is_some_and(|sql| sql.starts_with("ROLLBACK TO SAVEPOINT")));
    assert!(c.is_closed());
    assert_eq!(c.status(), TransactionStatus::Idle);
    Ok(())
}
