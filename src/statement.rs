use core::ffi::c_int;
use core::fmt;
use core::ptr::NonNull;
use core::slice;

use std::sync::Arc;

use parking_lot::Mutex;

use crate::bind;
use crate::connection::ConnectionId;
use crate::error::{Code, Error, Result};
use crate::ffi;
use crate::query::{Command, Query};
use crate::result::Row;
use crate::value::Value;

/// The outcome of advancing a statement by one row.
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    /// A row was produced.
    Row(Row),
    /// The statement has been entirely evaluated.
    ///
    /// Stepping again keeps reporting `Done` until the statement is reset or
    /// parameters are bound anew.
    Done,
    /// Sqlite could not make progress since the database is locked. Stepping
    /// again later may succeed.
    Busy,
}

/// A prepared statement.
///
/// Cloning a statement is cheap and produces another handle to the same
/// native statement. Statements do not keep their connection alive for the
/// caller, they only remember which connection they belong to, and every
/// operation on them goes through that [`Connection`].
///
/// The native statement is finalized either through [`release`] or when the
/// last handle is dropped, whichever comes first.
///
/// [`Connection`]: crate::Connection
/// [`release`]: Statement::release
#[derive(Clone)]
pub struct Statement {
    shared: Arc<Shared>,
}

struct Shared {
    connection: ConnectionId,
    sql: Box<str>,
    name: Option<Box<str>>,
    command: Command,
    columns: Box<[String]>,
    state: Mutex<State>,
}

struct State {
    raw: Option<NonNull<ffi::sqlite3_stmt>>,
    done: bool,
    peeked: Option<Row>,
    // Error raised while looking ahead, reported by the next step.
    error: Option<Error>,
}

impl State {
    fn rewind(&mut self) {
        self.done = false;
        self.peeked = None;
        self.error = None;
    }
}

// SAFETY: Access to the raw statement is guarded by the mutex it lives in.
unsafe impl Send for State {}

impl Statement {
    /// Compile a statement against a raw database handle.
    pub(crate) fn prepare(
        db: NonNull<ffi::sqlite3>,
        connection: ConnectionId,
        query: &Query,
        flags: u32,
    ) -> Result<Statement> {
        let sql = query.sql();

        let Ok(len) = c_int::try_from(sql.len()) else {
            return Err(Error::validation("statement is too long"));
        };

        let mut raw = core::ptr::null_mut();
        let mut tail = core::ptr::null();

        // SAFETY: The handle is valid and the length bounds the input.
        unsafe {
            let code = ffi::sqlite3_prepare_v3(
                db.as_ptr(),
                sql.as_ptr().cast(),
                len,
                flags,
                &mut raw,
                &mut tail,
            );

            if code != ffi::SQLITE_OK {
                return Err(Error::from_handle(db.as_ptr(), code).with_statement(sql));
            }
        }

        let Some(raw) = NonNull::new(raw) else {
            return Err(Error::validation(format_args!(
                "no statement to prepare in {sql:?}"
            )));
        };

        let consumed = (tail as usize).saturating_sub(sql.as_ptr() as usize);

        // SAFETY: The handle is valid.
        if unsafe { !is_empty_statement(db, sql.get(consumed..).unwrap_or_default()) } {
            // SAFETY: The statement was just prepared and is not shared.
            unsafe {
                ffi::sqlite3_finalize(raw.as_ptr());
            }

            return Err(Error::validation(format_args!(
                "only a single statement can be prepared, got {sql:?}"
            )));
        }

        // SAFETY: The statement is valid.
        let columns = unsafe { column_names(raw)? };

        tracing::trace!(sql, columns = columns.len(), "prepared statement");

        Ok(Statement {
            shared: Arc::new(Shared {
                connection,
                sql: sql.into(),
                name: query.name().map(Box::from),
                command: query.command(),
                columns,
                state: Mutex::new(State {
                    raw: Some(raw),
                    done: false,
                    peeked: None,
                    error: None,
                }),
            }),
        })
    }

    /// The SQL the statement was prepared from.
    #[inline]
    pub fn sql(&self) -> &str {
        &self.shared.sql
    }

    /// The name the statement was prepared under, if any.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.shared.name.as_deref()
    }

    /// The command kind supplied when the statement was prepared.
    #[inline]
    pub fn command(&self) -> Command {
        self.shared.command
    }

    /// The names of the columns the statement produces.
    ///
    /// This is empty for statements which do not produce rows.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqll_driver::{Connection, Query};
    ///
    /// let mut c = Connection::open_in_memory()?;
    /// c.execute("CREATE TABLE users (id INTEGER, name TEXT)")?;
    ///
    /// let stmt = c.prepare(&Query::select("SELECT id, name AS user_name FROM users"))?;
    /// assert_eq!(stmt.columns(), ["id", "user_name"]);
    ///
    /// let stmt = c.prepare(&Query::new("CREATE TABLE other (id INTEGER)"))?;
    /// assert!(stmt.columns().is_empty());
    /// # Ok::<_, sqll_driver::Error>(())
    /// ```
    #[inline]
    pub fn columns(&self) -> &[String] {
        &self.shared.columns
    }

    /// The connection the statement was prepared on.
    #[inline]
    pub fn connection(&self) -> ConnectionId {
        self.shared.connection
    }

    /// Test if the native statement has been released.
    pub fn is_released(&self) -> bool {
        self.shared.state.lock().raw.is_none()
    }

    /// Test if two handles refer to the same native statement.
    #[inline]
    pub fn same(&self, other: &Statement) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Finalize the native statement.
    ///
    /// This affects every clone of the statement. Releasing is idempotent and
    /// it is fine to release a statement after its connection has been
    /// closed.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqll_driver::{Connection, Query};
    ///
    /// let mut c = Connection::open_in_memory()?;
    /// let stmt = c.prepare(&Query::select("SELECT 1"))?;
    ///
    /// stmt.release();
    /// stmt.release();
    /// assert!(stmt.is_released());
    ///
    /// c.disconnect()?;
    /// stmt.release();
    /// # Ok::<_, sqll_driver::Error>(())
    /// ```
    pub fn release(&self) {
        let mut state = self.shared.state.lock();
        state.rewind();

        if let Some(raw) = state.raw.take() {
            // SAFETY: The statement is no longer reachable after this point.
            unsafe {
                ffi::sqlite3_finalize(raw.as_ptr());
            }
        }
    }

    /// Number of parameters the statement expects.
    pub(crate) fn parameter_count(&self) -> Result<usize> {
        self.with_state(|raw, _| {
            // SAFETY: The statement is valid while the lock is held.
            let count = unsafe { ffi::sqlite3_bind_parameter_count(raw.as_ptr()) };
            Ok(usize::try_from(count).unwrap_or_default())
        })
    }

    /// Validate and bind parameters, rewinding the statement.
    pub(crate) fn bind(&self, params: &[Value]) -> Result<()> {
        self.with_state(|raw, state| {
            // SAFETY: The statement is valid while the lock is held.
            unsafe { bind::bind_all(raw, params)? };
            state.rewind();
            Ok(())
        })
    }

    /// Rewind the statement, keeping its bindings.
    pub(crate) fn reset(&self) -> Result<()> {
        self.with_state(|raw, state| {
            // SAFETY: The statement is valid while the lock is held.
            unsafe {
                ffi::sqlite3_reset(raw.as_ptr());
            }

            state.rewind();
            Ok(())
        })
    }

    /// Advance the statement by one row.
    pub(crate) fn step(&self) -> Result<Step> {
        self.with_state(|raw, state| self.next_step(raw, state))
    }

    /// Advance the statement by one row, and check if it is exhausted
    /// afterwards without giving up the next row.
    ///
    /// Returns the row and whether there is nothing more to read.
    pub(crate) fn step_peek(&self) -> Result<(Step, bool)> {
        self.with_state(|raw, state| {
            let step = self.next_step(raw, state)?;

            if !matches!(step, Step::Row(..)) {
                return Ok((step, false));
            }

            let exhausted = match self.step_raw(raw, state) {
                Ok(Step::Row(next)) => {
                    state.peeked = Some(next);
                    false
                }
                Ok(Step::Done) => true,
                Ok(Step::Busy) => false,
                Err(error) => {
                    state.error = Some(error);
                    false
                }
            };

            Ok((step, exhausted))
        })
    }

    fn next_step(&self, raw: NonNull<ffi::sqlite3_stmt>, state: &mut State) -> Result<Step> {
        if let Some(error) = state.error.take() {
            return Err(error);
        }

        if let Some(row) = state.peeked.take() {
            return Ok(Step::Row(row));
        }

        self.step_raw(raw, state)
    }

    fn step_raw(&self, raw: NonNull<ffi::sqlite3_stmt>, state: &mut State) -> Result<Step> {
        if state.done {
            return Ok(Step::Done);
        }

        // SAFETY: The statement is valid while the lock is held.
        unsafe {
            match ffi::sqlite3_step(raw.as_ptr()) {
                ffi::SQLITE_ROW => Ok(Step::Row(read_row(raw))),
                ffi::SQLITE_DONE => {
                    state.done = true;
                    Ok(Step::Done)
                }
                code if code & 0xff == ffi::SQLITE_BUSY => Ok(Step::Busy),
                code => {
                    let db = ffi::sqlite3_db_handle(raw.as_ptr());
                    Err(Error::from_handle(db, code).with_statement(&self.shared.sql))
                }
            }
        }
    }

    fn with_state<T>(
        &self,
        f: impl FnOnce(NonNull<ffi::sqlite3_stmt>, &mut State) -> Result<T>,
    ) -> Result<T> {
        let mut state = self.shared.state.lock();

        let Some(raw) = state.raw else {
            return Err(Error::validation(format_args!(
                "statement {:?} has been released",
                self.shared.sql
            )));
        };

        f(raw, &mut state)
    }
}

impl fmt::Debug for Statement {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Statement")
            .field("connection", &self.shared.connection)
            .field("sql", &self.shared.sql)
            .field("name", &self.shared.name)
            .field("command", &self.shared.command)
            .finish_non_exhaustive()
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        if let Some(raw) = self.state.get_mut().raw.take() {
            // SAFETY: This is the last handle to the statement.
            unsafe {
                ffi::sqlite3_finalize(raw.as_ptr());
            }
        }
    }
}

/// Test if the text holds no statement, only separators, whitespace or
/// comments.
unsafe fn is_empty_statement(db: NonNull<ffi::sqlite3>, sql: &str) -> bool {
    if sql.chars().all(|c| c.is_whitespace() || c == ';') {
        return true;
    }

    let Ok(len) = c_int::try_from(sql.len()) else {
        return false;
    };

    let mut raw = core::ptr::null_mut();

    unsafe {
        let code = ffi::sqlite3_prepare_v3(
            db.as_ptr(),
            sql.as_ptr().cast(),
            len,
            0,
            &mut raw,
            core::ptr::null_mut(),
        );

        if !raw.is_null() {
            ffi::sqlite3_finalize(raw);
            return false;
        }

        code == ffi::SQLITE_OK
    }
}

unsafe fn column_names(raw: NonNull<ffi::sqlite3_stmt>) -> Result<Box<[String]>> {
    unsafe {
        let count = ffi::sqlite3_column_count(raw.as_ptr());
        let mut names = Vec::with_capacity(usize::try_from(count).unwrap_or_default());

        for index in 0..count {
            let ptr = ffi::sqlite3_column_name(raw.as_ptr(), index);

            if ptr.is_null() {
                return Err(Error::new(Code::NOMEM));
            }

            names.push(crate::utils::cstr_to_str(ptr)?.to_owned());
        }

        Ok(names.into())
    }
}

/// Decode the current row of a statement.
unsafe fn read_row(raw: NonNull<ffi::sqlite3_stmt>) -> Row {
    unsafe {
        let count = ffi::sqlite3_data_count(raw.as_ptr());
        (0..count).map(|index| read_column(raw, index)).collect()
    }
}

unsafe fn read_column(raw: NonNull<ffi::sqlite3_stmt>, index: c_int) -> Value {
    let stmt = raw.as_ptr();

    // NB: The type has to be read before the value, since reading converts it.
    unsafe {
        match ffi::sqlite3_column_type(stmt, index) {
            ffi::SQLITE_INTEGER => Value::Integer(ffi::sqlite3_column_int64(stmt, index)),
            ffi::SQLITE_FLOAT => Value::Float(ffi::sqlite3_column_double(stmt, index)),
            ffi::SQLITE_TEXT => {
                let ptr = ffi::sqlite3_column_text(stmt, index);
                let bytes = column_bytes(stmt, index, ptr.cast());
                Value::Text(String::from_utf8_lossy(bytes).into_owned())
            }
            ffi::SQLITE_BLOB => {
                let ptr = ffi::sqlite3_column_blob(stmt, index);
                Value::Blob(column_bytes(stmt, index, ptr.cast()).to_vec())
            }
            _ => Value::Null,
        }
    }
}

unsafe fn column_bytes<'a>(stmt: *mut ffi::sqlite3_stmt, index: c_int, ptr: *const u8) -> &'a [u8] {
    unsafe {
        let len = usize::try_from(ffi::sqlite3_column_bytes(stmt, index)).unwrap_or_default();

        if ptr.is_null() || len == 0 {
            return &[];
        }

        slice::from_raw_parts(ptr, len)
    }
}
