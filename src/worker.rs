use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::{self, JoinError};

use crate::connection::{Connection, TransactionStatus};
use crate::cursor::{Cursor, Fetch};
use crate::error::{Error, Result};
use crate::options::{ConnectOptions, TransactionMode};
use crate::query::Query;
use crate::result::QueryResult;
use crate::value::Value;

/// A connection which runs every call on tokio's blocking thread pool.
///
/// Calls against one connection are performed one at a time in the order
/// they were issued, while different connections proceed in parallel.
/// Cloning produces another handle to the same connection.
///
/// # Examples
///
/// ```
/// use sqll_driver::{AsyncConnection, ConnectOptions, Query, Value};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> sqll_driver::Result<()> {
/// let mut options = ConnectOptions::new();
/// options.in_memory();
///
/// let c = AsyncConnection::connect(options).await?;
/// c.execute("CREATE TABLE users (name TEXT)").await?;
///
/// let insert = Query::insert("INSERT INTO users VALUES (?)");
/// let result = c.query(insert, vec![Value::from("Alice")]).await?;
/// assert_eq!(result.changes(), Some(1));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AsyncConnection {
    inner: Arc<Mutex<Connection>>,
}

impl AsyncConnection {
    /// Wrap an established connection.
    pub fn new(connection: Connection) -> Self {
        Self {
            inner: Arc::new(Mutex::new(connection)),
        }
    }

    /// Connect with the given options off of the async runtime.
    pub async fn connect(options: ConnectOptions) -> Result<Self> {
        let connection = match task::spawn_blocking(move || Connection::connect(&options)).await {
            Ok(connection) => connection?,
            Err(error) => return Err(join_error(error)),
        };

        Ok(Self::new(connection))
    }

    /// Run a closure against the connection on the blocking thread pool.
    ///
    /// This is what every other method is implemented in terms of, and can be
    /// used to run several operations without other callers interleaving.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let mut guard = self.inner.clone().lock_owned().await;

        match task::spawn_blocking(move || f(&mut *guard)).await {
            Ok(result) => result,
            Err(error) => Err(join_error(error)),
        }
    }

    /// See [`Connection::checkout`].
    pub async fn checkout(&self) -> Result<()> {
        self.run(Connection::checkout).await
    }

    /// See [`Connection::checkin`].
    pub async fn checkin(&self) -> Result<()> {
        self.run(|c| {
            c.checkin();
            Ok(())
        })
        .await
    }

    /// See [`Connection::status`].
    pub async fn status(&self) -> TransactionStatus {
        self.inner.lock().await.status()
    }

    /// See [`Connection::begin`].
    pub async fn begin(&self, mode: TransactionMode) -> Result<TransactionStatus> {
        self.run(move |c| c.begin(mode)).await
    }

    /// See [`Connection::commit`].
    pub async fn commit(&self, mode: TransactionMode) -> Result<TransactionStatus> {
        self.run(move |c| c.commit(mode)).await
    }

    /// See [`Connection::rollback`].
    pub async fn rollback(&self, mode: TransactionMode) -> Result<TransactionStatus> {
        self.run(move |c| c.rollback(mode)).await
    }

    /// See [`Connection::execute`].
    pub async fn execute(&self, sql: impl Into<String>) -> Result<()> {
        let sql = sql.into();
        self.run(move |c| c.execute(&sql)).await
    }

    /// See [`Connection::query`].
    pub async fn query(&self, query: Query, params: Vec<Value>) -> Result<QueryResult> {
        self.run(move |c| c.query(&query, &params)).await
    }

    /// See [`Connection::declare`].
    pub async fn declare(&self, query: Query, params: Vec<Value>) -> Result<Cursor> {
        self.run(move |c| c.declare(&query, &params)).await
    }

    /// See [`Connection::fetch`].
    pub async fn fetch(&self, cursor: &Cursor) -> Result<Fetch> {
        let cursor = cursor.clone();
        self.run(move |c| c.fetch(&cursor)).await
    }

    /// See [`Connection::fetch_chunk`].
    pub async fn fetch_chunk(&self, cursor: &Cursor, chunk_size: Option<usize>) -> Result<Fetch> {
        let cursor = cursor.clone();
        self.run(move |c| c.fetch_chunk(&cursor, chunk_size)).await
    }

    /// See [`Connection::deallocate`].
    pub async fn deallocate(&self, cursor: Cursor) -> Result<()> {
        self.run(move |c| {
            c.deallocate(&cursor);
            Ok(())
        })
        .await
    }

    /// See [`Connection::serialize`].
    pub async fn serialize(&self, schema: impl Into<String>) -> Result<Vec<u8>> {
        let schema = schema.into();
        self.run(move |c| c.serialize(&schema)).await
    }

    /// See [`Connection::deserialize`].
    pub async fn deserialize(&self, schema: impl Into<String>, bytes: Vec<u8>) -> Result<()> {
        let schema = schema.into();
        self.run(move |c| c.deserialize(&schema, &bytes)).await
    }

    /// See [`Connection::disconnect`].
    pub async fn disconnect(&self) -> Result<()> {
        self.run(Connection::disconnect).await
    }
}

fn join_error(error: JoinError) -> Error {
    tracing::warn!(%error, "connection worker failed");

    Error::Disconnect {
        message: format!("connection worker failed: {error}").into(),
        source: None,
    }
}
