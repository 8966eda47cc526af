use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

use std::ffi::CString;

use crate::cache::StatementCache;
use crate::cursor::{self, Chunk, Cursor, Fetch};
use crate::error::{Error, Result};
use crate::ffi;
use crate::handle::{Handle, UpdateEvent};
use crate::options::{self, ConnectOptions, Database, Mode, TransactionMode};
use crate::query::Query;
use crate::result::QueryResult;
use crate::statement::{Statement, Step};
use crate::stream::Stream;
use crate::utils;
use crate::value::Value;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

const SAVEPOINT: &str = "SAVEPOINT sqll_driver_savepoint";
const RELEASE_SAVEPOINT: &str = "RELEASE SAVEPOINT sqll_driver_savepoint";
const ROLLBACK_SAVEPOINT: &str =
    "ROLLBACK TO SAVEPOINT sqll_driver_savepoint; RELEASE SAVEPOINT sqll_driver_savepoint";

/// Identifies a connection, used to tell which connection a statement was
/// prepared on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl fmt::Display for ConnectionId {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether a connection is inside of a transaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransactionStatus {
    /// No transaction is open.
    #[default]
    Idle,
    /// A transaction is open, possibly with a savepoint.
    Transaction,
}

/// Whether a connection has been checked out by a caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CheckoutStatus {
    /// The connection is available.
    #[default]
    Idle,
    /// The connection is in use.
    Busy,
}

/// A connection to a SQLite database.
///
/// Every operation which touches the database takes `&mut self`, so a
/// connection only ever has one call in flight. To share a connection across
/// tasks it has to be synchronized externally, see [`AsyncConnection`] for a
/// ready-made way of doing that.
///
/// Connections can be moved across threads.
///
/// [`AsyncConnection`]: crate::AsyncConnection
///
/// # Examples
///
/// ```
/// use sqll_driver::{Connection, Query, Value};
///
/// let mut c = Connection::open_in_memory()?;
///
/// c.execute(r#"
///     CREATE TABLE users (name TEXT, age INTEGER);
///
///     INSERT INTO users VALUES ('Alice', 42);
///     INSERT INTO users VALUES ('Bob', 52);
/// "#)?;
///
/// let query = Query::select("SELECT name FROM users WHERE age > ?");
/// let result = c.query(&query, &[Value::from(50)])?;
///
/// assert_eq!(result.columns(), ["name"]);
/// assert_eq!(result.rows(), [vec![Value::from("Bob")]]);
/// # Ok::<_, sqll_driver::Error>(())
/// ```
pub struct Connection {
    id: ConnectionId,
    cache: StatementCache,
    handle: Handle,
    database: Database,
    transaction: TransactionStatus,
    checkout: CheckoutStatus,
    chunk_size: usize,
}

impl Connection {
    /// Open a connection with the given options.
    ///
    /// This fails without touching sqlite if no database has been specified.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqll_driver::{ConnectOptions, Connection};
    ///
    /// let e = Connection::connect(&ConnectOptions::new()).unwrap_err();
    /// assert!(!e.is_disconnect());
    ///
    /// let mut options = ConnectOptions::new();
    /// options.in_memory();
    /// let c = Connection::connect(&options)?;
    /// # Ok::<_, sqll_driver::Error>(())
    /// ```
    pub fn connect(options: &ConnectOptions) -> Result<Self> {
        let Some(database) = &options.database else {
            return Err(Error::config("no database specified"));
        };

        if options.chunk_size == 0 {
            return Err(Error::config("chunk size must be greater than zero"));
        }

        for (name, _) in &options.pragmas {
            if !options::is_pragma_name(name) {
                return Err(Error::config(format_args!("invalid pragma name {name:?}")));
            }
        }

        let path = match database {
            Database::Memory => CString::from(c":memory:"),
            Database::Path(path) => utils::path_to_cstring(path)?,
        };

        let handle = Handle::open(&path, options.mode == Mode::ReadOnly)?;

        // The handle closes on drop if configuration fails.
        handle.busy_timeout(options.busy_timeout)?;

        for pragma in options.pragma_statements() {
            handle.execute(&pragma)?;
        }

        let id = ConnectionId(NEXT_ID.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(%id, ?database, "connected");

        Ok(Self {
            id,
            cache: StatementCache::new(options.statement_cache_capacity),
            handle,
            database: database.clone(),
            transaction: TransactionStatus::Idle,
            checkout: CheckoutStatus::Idle,
            chunk_size: options.chunk_size,
        })
    }

    /// Open a connection to a private in-memory database with default
    /// options.
    #[inline]
    pub fn open_in_memory() -> Result<Self> {
        ConnectOptions::new().in_memory().connect()
    }

    /// The identifier of the connection.
    #[inline]
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// The database the connection was opened against.
    #[inline]
    pub fn database(&self) -> &Database {
        &self.database
    }

    /// The number of rows read per chunk when none is specified.
    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Test if the connection has been closed.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.handle.is_closed()
    }

    /// Close the connection.
    ///
    /// Statements which are still held by the caller keep the native database
    /// alive until they are released or dropped, but they can no longer be
    /// used. Disconnecting an already closed connection does nothing.
    pub fn disconnect(&mut self) -> Result<()> {
        if self.handle.is_closed() {
            return Ok(());
        }

        self.cache.clear();
        self.transaction = TransactionStatus::Idle;
        self.handle.close()?;
        tracing::debug!(id = %self.id, "disconnected");
        Ok(())
    }

    /// Mark the connection as in use.
    ///
    /// Checking out a connection which is already checked out is an error
    /// which requires the connection to be discarded, see
    /// [`Error::is_disconnect`].
    pub fn checkout(&mut self) -> Result<()> {
        match self.checkout {
            CheckoutStatus::Idle => {
                self.checkout = CheckoutStatus::Busy;
                Ok(())
            }
            CheckoutStatus::Busy => {
                tracing::warn!(id = %self.id, "connection checked out while busy");
                Err(Error::busy_checkout())
            }
        }
    }

    /// Mark the connection as available again.
    #[inline]
    pub fn checkin(&mut self) {
        self.checkout = CheckoutStatus::Idle;
    }

    /// The checkout status of the connection.
    #[inline]
    pub fn checkout_status(&self) -> CheckoutStatus {
        self.checkout
    }

    /// The tracked transaction status of the connection.
    #[inline]
    pub fn status(&self) -> TransactionStatus {
        self.transaction
    }

    /// Open a transaction.
    ///
    /// When a transaction is already open this creates a savepoint
    /// regardless of `mode`. Transactions are tracked as open or not, so
    /// savepoints do not nest beyond one level in terms of status.
    ///
    /// A failure leaves the connection in an unknown state, so it is closed
    /// and a disconnect error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqll_driver::{Connection, TransactionMode, TransactionStatus};
    ///
    /// let mut c = Connection::open_in_memory()?;
    /// c.execute("CREATE TABLE users (name TEXT)")?;
    ///
    /// assert_eq!(c.begin(TransactionMode::Immediate)?, TransactionStatus::Transaction);
    /// c.execute("INSERT INTO users VALUES ('Alice')")?;
    ///
    /// c.begin(TransactionMode::Savepoint)?;
    /// c.execute("INSERT INTO users VALUES ('Bob')")?;
    /// c.rollback(TransactionMode::Savepoint)?;
    ///
    /// assert_eq!(c.commit(TransactionMode::Deferred)?, TransactionStatus::Idle);
    /// # Ok::<_, sqll_driver::Error>(())
    /// ```
    pub fn begin(&mut self, mode: TransactionMode) -> Result<TransactionStatus> {
        let sql = match (self.transaction, mode) {
            (TransactionStatus::Idle, TransactionMode::Deferred) => "BEGIN",
            (TransactionStatus::Idle, TransactionMode::Immediate) => "BEGIN IMMEDIATE",
            (TransactionStatus::Idle, TransactionMode::Exclusive) => "BEGIN EXCLUSIVE",
            (TransactionStatus::Idle, TransactionMode::Savepoint)
            | (TransactionStatus::Transaction, _) => SAVEPOINT,
        };

        self.transaction_statement(sql)
    }

    /// Commit a transaction, or release the savepoint if `mode` is
    /// [`TransactionMode::Savepoint`].
    pub fn commit(&mut self, mode: TransactionMode) -> Result<TransactionStatus> {
        let sql = match (self.transaction, mode) {
            (TransactionStatus::Transaction, TransactionMode::Savepoint) => RELEASE_SAVEPOINT,
            (TransactionStatus::Idle, TransactionMode::Savepoint) => {
                return Err(self.teardown(Error::validation("no savepoint to release")));
            }
            _ => "COMMIT",
        };

        self.transaction_statement(sql)
    }

    /// Roll back a transaction, or roll back to and release the savepoint if
    /// `mode` is [`TransactionMode::Savepoint`].
    pub fn rollback(&mut self, mode: TransactionMode) -> Result<TransactionStatus> {
        let sql = match (self.transaction, mode) {
            (TransactionStatus::Transaction, TransactionMode::Savepoint) => ROLLBACK_SAVEPOINT,
            (TransactionStatus::Idle, TransactionMode::Savepoint) => {
                return Err(self.teardown(Error::validation("no savepoint to roll back")));
            }
            _ => "ROLLBACK",
        };

        self.transaction_statement(sql)
    }

    fn transaction_statement(&mut self, sql: &str) -> Result<TransactionStatus> {
        self.handle.as_ptr()?;

        if let Err(error) = self.handle.execute(sql) {
            return Err(self.teardown(error.with_statement(sql)));
        }

        self.sync_status();
        tracing::debug!(id = %self.id, sql, status = ?self.transaction, "transaction");
        Ok(self.transaction)
    }

    /// Close the connection after a failure which left it in an unknown
    /// state.
    fn teardown(&mut self, error: Error) -> Error {
        tracing::warn!(id = %self.id, %error, "closing connection after failure");

        self.cache.clear();
        self.transaction = TransactionStatus::Idle;

        if let Err(close) = self.handle.close() {
            tracing::warn!(id = %self.id, error = %close, "failed to close connection");
        }

        Error::disconnect(error)
    }

    fn sync_status(&mut self) {
        if let Ok(autocommit) = self.handle.autocommit() {
            self.transaction = if autocommit {
                TransactionStatus::Idle
            } else {
                TransactionStatus::Transaction
            };
        }
    }

    /// Prepare a statement.
    ///
    /// Named queries are cached, so preparing the same named query again
    /// returns the same statement as long as it is still in the cache, rewound
    /// to its first row with its bindings kept. Queries without a name are
    /// always prepared anew.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqll_driver::{Connection, Query};
    ///
    /// let mut c = Connection::open_in_memory()?;
    ///
    /// let query = Query::select("SELECT 1").with_name("one");
    /// let a = c.prepare(&query)?;
    /// let b = c.prepare(&query)?;
    /// assert!(a.same(&b));
    ///
    /// let query = Query::select("SELECT 1");
    /// let a = c.prepare(&query)?;
    /// let b = c.prepare(&query)?;
    /// assert!(!a.same(&b));
    /// # Ok::<_, sqll_driver::Error>(())
    /// ```
    pub fn prepare(&mut self, query: &Query) -> Result<Statement> {
        let db = self.handle.as_ptr()?;

        if query.name().is_none() || !self.cache.is_enabled() {
            return Statement::prepare(db, self.id, query, 0);
        }

        if let Some(stmt) = self.cache.get(query) {
            tracing::trace!(name = query.name(), "statement cache hit");
            stmt.reset()?;
            return Ok(stmt);
        }

        let stmt = Statement::prepare(db, self.id, query, ffi::SQLITE_PREPARE_PERSISTENT as u32)?;

        if let Some(name) = query.name() {
            self.cache.insert(name, stmt.clone());
        }

        Ok(stmt)
    }

    /// Prepare a statement, bypassing the statement cache.
    pub fn prepare_uncached(&mut self, query: &Query) -> Result<Statement> {
        let db = self.handle.as_ptr()?;
        Statement::prepare(db, self.id, query, 0)
    }

    /// Release a statement, finalizing it and removing it from the cache.
    ///
    /// This never fails, and releasing a statement which has already been
    /// released or whose connection has been closed does nothing.
    pub fn release(&mut self, stmt: &Statement) {
        if stmt.connection() == self.id {
            self.cache.evict(stmt);
        }

        stmt.release();
    }

    /// Bind parameters to a statement.
    ///
    /// The number of parameters must match what the statement expects, and
    /// every parameter is validated before anything is bound. Binding resets
    /// the statement so it can be stepped from the beginning.
    ///
    /// Values which sqlite has no native representation for are bound as
    /// text:
    /// * [`Value::Bool`] is bound as the integer `0` or `1`.
    /// * [`Value::BigInt`] is bound as an integer, if it fits in 64 bits.
    /// * [`Value::Date`] is bound as `YYYY-MM-DD`.
    /// * [`Value::Time`] is bound as `HH:MM:SS` with fractional seconds if
    ///   present.
    /// * [`Value::DateTime`] is bound as `YYYY-MM-DDTHH:MM:SS` with fractional
    ///   seconds if present.
    /// * [`Value::Timestamp`] is bound as RFC 3339 with a `Z` suffix, and must
    ///   be in UTC.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use sqll_driver::{Connection, Query, Step, Value};
    ///
    /// let mut c = Connection::open_in_memory()?;
    /// let stmt = c.prepare(&Query::select("SELECT ?, ?"))?;
    ///
    /// assert!(c.bind(&stmt, &[Value::from(1)]).is_err());
    ///
    /// let date = NaiveDate::from_ymd_opt(2021, 8, 25).unwrap();
    /// c.bind(&stmt, &[Value::from(true), Value::from(date)])?;
    ///
    /// let row = vec![Value::Integer(1), Value::from("2021-08-25")];
    /// assert_eq!(c.step(&stmt)?, Step::Row(row));
    /// assert_eq!(c.step(&stmt)?, Step::Done);
    /// # Ok::<_, sqll_driver::Error>(())
    /// ```
    pub fn bind(&mut self, stmt: &Statement, params: &[Value]) -> Result<()> {
        self.check(stmt)?;
        stmt.bind(params)
    }

    /// Advance a statement by one row.
    pub fn step(&mut self, stmt: &Statement) -> Result<Step> {
        self.check(stmt)?;
        let step = stmt.step();

        // Failing statements may have ended the transaction.
        self.sync_status();
        step
    }

    /// Read a chunk of up to `chunk_size` rows from a statement, or all
    /// remaining rows if `chunk_size` is `None`.
    ///
    /// A chunk which reads the last row of the statement is reported as
    /// [`Chunk::Done`], so reading `R` rows in chunks of `K` takes exactly
    /// `ceil(R / K)` calls.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqll_driver::{Chunk, Connection, Query, Value};
    ///
    /// let mut c = Connection::open_in_memory()?;
    /// c.execute("CREATE TABLE numbers (n INTEGER); INSERT INTO numbers VALUES (1), (2), (3), (4);")?;
    ///
    /// let stmt = c.prepare(&Query::select("SELECT n FROM numbers ORDER BY n"))?;
    ///
    /// let rows = vec![vec![Value::Integer(1)], vec![Value::Integer(2)]];
    /// assert_eq!(c.multi_step(&stmt, Some(2))?, Chunk::Rows(rows));
    ///
    /// let rows = vec![vec![Value::Integer(3)], vec![Value::Integer(4)]];
    /// assert_eq!(c.multi_step(&stmt, Some(2))?, Chunk::Done(rows));
    /// # Ok::<_, sqll_driver::Error>(())
    /// ```
    pub fn multi_step(&mut self, stmt: &Statement, chunk_size: Option<usize>) -> Result<Chunk> {
        self.check(stmt)?;
        let chunk = cursor::multi_step(stmt, chunk_size);
        self.sync_status();
        chunk
    }

    /// Rewind a statement, keeping its bound parameters.
    pub fn reset(&mut self, stmt: &Statement) -> Result<()> {
        self.check(stmt)?;
        stmt.reset()
    }

    /// The names of the columns a statement produces.
    pub fn columns<'stmt>(&self, stmt: &'stmt Statement) -> Result<&'stmt [String]> {
        self.check(stmt)?;
        Ok(stmt.columns())
    }

    /// The number of parameters a statement expects.
    pub fn parameter_count(&self, stmt: &Statement) -> Result<usize> {
        self.check(stmt)?;
        stmt.parameter_count()
    }

    /// Execute one or more statements separated by `;`, discarding any rows
    /// they produce.
    pub fn execute(&mut self, sql: &str) -> Result<()> {
        let result = self.handle.execute(sql);
        self.sync_status();
        result.map_err(|error| error.with_statement(sql))
    }

    /// Prepare, bind and run a query to completion.
    ///
    /// For inserts, updates and deletes the result carries the number of rows
    /// changed, see [`QueryResult::changes`].
    pub fn query(&mut self, query: &Query, params: &[Value]) -> Result<QueryResult> {
        let stmt = self.prepare(query)?;
        let result = self.run(&stmt, params);

        // Don't keep a cached statement holding on to locks.
        if !stmt.is_released() {
            stmt.reset()?;
        }

        self.sync_status();
        result
    }

    fn run(&mut self, stmt: &Statement, params: &[Value]) -> Result<QueryResult> {
        stmt.bind(params)?;

        let rows = match cursor::multi_step(stmt, None)? {
            Chunk::Done(rows) => rows,
            Chunk::Rows(..) | Chunk::Busy => {
                return Err(Error::Busy {
                    statement: Some(stmt.sql().into()),
                });
            }
        };

        let changes = if stmt.command().is_mutation() {
            Some(self.handle.changes()?)
        } else {
            None
        };

        Ok(QueryResult::new(
            stmt.command(),
            stmt.columns().to_vec(),
            rows,
            changes,
        ))
    }

    /// Rows changed by the most recent insert, update or delete.
    pub fn changes(&self) -> Result<u64> {
        self.handle.changes()
    }

    /// Rows changed since the connection was opened.
    pub fn total_changes(&self) -> Result<u64> {
        self.handle.total_changes()
    }

    /// The rowid of the most recently inserted row.
    pub fn last_insert_rowid(&self) -> Result<i64> {
        self.handle.last_insert_rowid()
    }

    /// Declare a cursor over a query.
    ///
    /// The statement behind a cursor is never cached, and has to be
    /// [deallocated] once the caller is done with it.
    ///
    /// [deallocated]: Self::deallocate
    ///
    /// # Examples
    ///
    /// ```
    /// use sqll_driver::{Connection, Fetch, Query, Value};
    ///
    /// let mut c = Connection::open_in_memory()?;
    /// c.execute("CREATE TABLE numbers (n INTEGER); INSERT INTO numbers VALUES (1), (2);")?;
    ///
    /// let cursor = c.declare(&Query::select("SELECT n FROM numbers WHERE n > ?"), &[Value::from(1)])?;
    ///
    /// let Fetch::Cont(result) = c.fetch(&cursor)? else {
    ///     panic!("expected a row");
    /// };
    ///
    /// assert_eq!(result.rows(), [vec![Value::Integer(2)]]);
    /// assert!(c.fetch(&cursor)?.is_halt());
    ///
    /// c.deallocate(&cursor);
    /// # Ok::<_, sqll_driver::Error>(())
    /// ```
    pub fn declare(&mut self, query: &Query, params: &[Value]) -> Result<Cursor> {
        let stmt = self.prepare_uncached(query)?;
        stmt.bind(params)?;
        tracing::trace!(id = %self.id, sql = query.sql(), "declared cursor");
        Ok(Cursor::new(stmt))
    }

    /// Fetch a single row from a cursor.
    pub fn fetch(&mut self, cursor: &Cursor) -> Result<Fetch> {
        match self.step(cursor.statement())? {
            Step::Row(row) => Ok(Fetch::Cont(cursor.result(vec![row]))),
            Step::Done => Ok(Fetch::Halt(cursor.result(Vec::new()))),
            Step::Busy => Err(Error::Busy {
                statement: Some(cursor.statement().sql().into()),
            }),
        }
    }

    /// Fetch a chunk of rows from a cursor, using the connection's chunk size
    /// if `chunk_size` is `None`.
    pub fn fetch_chunk(&mut self, cursor: &Cursor, chunk_size: Option<usize>) -> Result<Fetch> {
        let chunk_size = chunk_size.unwrap_or(self.chunk_size);

        match self.multi_step(cursor.statement(), Some(chunk_size))? {
            Chunk::Rows(rows) => Ok(Fetch::Cont(cursor.result(rows))),
            Chunk::Done(rows) => Ok(Fetch::Halt(cursor.result(rows))),
            Chunk::Busy => Err(Error::Busy {
                statement: Some(cursor.statement().sql().into()),
            }),
        }
    }

    /// Release the statement behind a cursor.
    ///
    /// This never fails, and is fine to call after the connection has been
    /// closed.
    #[inline]
    pub fn deallocate(&mut self, cursor: &Cursor) {
        self.release(cursor.statement());
    }

    /// Stream the rows of a query in chunks.
    ///
    /// See [`Stream`].
    pub fn stream(
        &mut self,
        query: &Query,
        params: &[Value],
        chunk_size: Option<usize>,
    ) -> Result<Stream<'_>> {
        if chunk_size == Some(0) {
            return Err(Error::validation("chunk size must be greater than zero"));
        }

        let cursor = self.declare(query, params)?;
        Ok(Stream::new(self, cursor, chunk_size))
    }

    /// Serialize the contents of a database schema, like `main`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqll_driver::{Connection, Query, Value};
    ///
    /// let mut a = Connection::open_in_memory()?;
    /// a.execute("CREATE TABLE users (name TEXT); INSERT INTO users VALUES ('Alice');")?;
    /// let bytes = a.serialize("main")?;
    ///
    /// let mut b = Connection::open_in_memory()?;
    /// b.deserialize("main", &bytes)?;
    ///
    /// let result = b.query(&Query::select("SELECT name FROM users"), &[])?;
    /// assert_eq!(result.rows(), [vec![Value::from("Alice")]]);
    /// # Ok::<_, sqll_driver::Error>(())
    /// ```
    pub fn serialize(&self, schema: &str) -> Result<Vec<u8>> {
        self.handle.serialize(schema)
    }

    /// Replace the contents of a database schema with serialized data.
    ///
    /// Cached statements are discarded.
    pub fn deserialize(&mut self, schema: &str, bytes: &[u8]) -> Result<()> {
        self.handle.as_ptr()?;
        self.cache.clear();
        self.handle.deserialize(schema, bytes)?;
        self.sync_status();
        Ok(())
    }

    /// Set how long in milliseconds sqlite retries acquiring a lock before
    /// reporting busy.
    pub fn set_busy_timeout(&mut self, milliseconds: u32) -> Result<()> {
        self.handle.busy_timeout(milliseconds)
    }

    /// Install a callback which observes rows being inserted, updated or
    /// deleted, replacing any previous one.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::{Arc, Mutex};
    ///
    /// use sqll_driver::{Action, Connection};
    ///
    /// let mut c = Connection::open_in_memory()?;
    /// c.execute("CREATE TABLE users (name TEXT)")?;
    ///
    /// let events = Arc::new(Mutex::new(Vec::new()));
    /// let sink = events.clone();
    ///
    /// c.set_update_hook(move |event| {
    ///     sink.lock().unwrap().push((event.action, event.table.to_owned(), event.rowid));
    /// })?;
    ///
    /// c.execute("INSERT INTO users VALUES ('Alice')")?;
    /// assert_eq!(*events.lock().unwrap(), [(Action::Insert, String::from("users"), 1)]);
    /// # Ok::<_, sqll_driver::Error>(())
    /// ```
    pub fn set_update_hook<F>(&mut self, callback: F) -> Result<()>
    where
        F: FnMut(UpdateEvent<'_>) + Send + 'static,
    {
        self.handle.set_update_hook(callback)
    }

    /// Remove the update hook if one is installed.
    pub fn remove_update_hook(&mut self) -> Result<()> {
        self.handle.remove_update_hook()
    }

    /// Number of statements currently held by the cache.
    #[cfg(test)]
    pub(crate) fn cached_statements(&self) -> usize {
        self.cache.len()
    }

    fn check(&self, stmt: &Statement) -> Result<()> {
        self.handle.as_ptr()?;

        if stmt.connection() != self.id {
            return Err(Error::validation(format_args!(
                "statement {:?} belongs to connection {}, not {}",
                stmt.sql(),
                stmt.connection(),
                self.id
            )));
        }

        Ok(())
    }
}

impl fmt::Debug for Connection {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("database", &self.database)
            .field("transaction", &self.transaction)
            .field("checkout", &self.checkout)
            .field("closed", &self.handle.is_closed())
            .finish_non_exhaustive()
    }
}
