use std::sync::{Arc, Mutex};

use anyhow::Result;

use crate::{Action, Connection};

type Events = Arc<Mutex<Vec<(Action, String, String, i64)>>>;

fn install(c: &mut Connection) -> crate::Result<Events> {
    let events = Events::default();
    let sink = events.clone();

    c.set_update_hook(move |event| {
        if let Ok(mut events) = sink.lock() {
            events.push((
                event.action,
                event.database.to_owned(),
                event.table.to_owned(),
                event.rowid,
            ));
        }
    })?;

    Ok(events)
}

fn take(events: &Events) -> Vec<(Action, String, String, i64)> {
    std::mem::take(&mut *events.lock().unwrap())
}

#[test]
fn update_hook_events() -> Result<()> {
    let mut c = Connection::open_in_memory()?;
    c.execute("CREATE TABLE users (name TEXT)")?;

    let events = install(&mut c)?;

    c.execute("INSERT INTO users VALUES ('Alice'), ('Bob')")?;
    c.execute("UPDATE users SET name = 'Charlie' WHERE name = 'Bob'")?;
    c.execute("DELETE FROM users WHERE name = 'Alice'")?;

    let event = |action, rowid| (action, String::from("main"), String::from("users"), rowid);

    assert_eq!(
        take(&events),
        [
            event(Action::Insert, 1),
            event(Action::Insert, 2),
            event(Action::Update, 2),
            event(Action::Delete, 1),
        ]
    );

    Ok(())
}

#[test]
fn update_hook_removed() -> Result<()> {
    let mut c = Connection::open_in_memory()?;
    c.execute("CREATE TABLE users (name TEXT)")?;

    let events = install(&mut c)?;
    c.execute("INSERT INTO users VALUES ('Alice')")?;
    assert_eq!(take(&events).len(), 1);

    c.remove_update_hook()?;
    c.execute("INSERT INTO users VALUES ('Bob')")?;
    assert!(take(&events).is_empty());

    // Replacing a hook drops the old callback.
    let first = install(&mut c)?;
    let second = install(&mut c)?;
    assert_eq!(Arc::strong_count(&first), 1);

    c.execute("INSERT INTO users VALUES ('Charlie')")?;
    assert!(take(&first).is_empty());
    assert_eq!(take(&second).len(), 1);

    c.disconnect()?;
    assert_eq!(Arc::strong_count(&second), 1);
    Ok(())
}
