use crate::{Connection, Result};

pub(super) fn numbers(c: &mut Connection, count: i64) -> Result<()> {
    c.execute("CREATE TABLE numbers (n INTEGER)")?;

    for n in 0..count {
        c.execute(&format!("INSERT INTO numbers VALUES ({n})"))?;
    }

    Ok(())
}

pub(super) fn users(c: &mut Connection) -> Result<()> {
    c.execute(
        r#"
        CREATE TABLE users (id INTEGER, name TEXT, age REAL, photo BLOB, email TEXT);

        INSERT INTO users VALUES (1, 'Alice', 42.69, X'4269', NULL);
        "#,
    )?;

    Ok(())
}
