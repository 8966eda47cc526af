//! [<img alt="github" src="https://img.shields.io/badge/github-udoprog/sqll-8da0cb?style=for-the-badge&logo=github" height="20">](https://github.com/udoprog/sqll)
//! [<img alt="crates.io" src="https://img.shields.io/crates/v/sqll-driver.svg?style=for-the-badge&color=fc8d62&logo=rust" height="20">](https://crates.io/crates/sqll-driver)
//! [<img alt="docs.rs" src="https://img.shields.io/badge/docs.rs-sqll--driver-66c2a5?style=for-the-badge&logoColor=white" height="20">](https://docs.rs/sqll-driver)
//!
//! Connection and statement state machine for driving [SQLite] from a
//! connection pool.
//!
//! <br>
//!
//! ## Usage
//!
//! A [`Connection`] tracks whether it is inside of a transaction and whether
//! it has been checked out, so that a pool can tell when a connection has to
//! be thrown away. Any error for which [`Error::is_disconnect`] returns `true`
//! means exactly that.
//!
//! Queries are described with [`Query`], which carries the SQL, an optional
//! name used for statement caching and the kind of [`Command`] it performs.
//! Rows are materialized into [`QueryResult`] as [`Value`]s.
//!
//! <br>
//!
//! #### Connecting and querying
//!
//! ```
//! use sqll_driver::{ConnectOptions, Query, Value};
//!
//! let mut c = ConnectOptions::new().in_memory().connect()?;
//!
//! c.execute(r#"
//!     CREATE TABLE users (name TEXT, age INTEGER);
//!
//!     INSERT INTO users VALUES ('Alice', 42);
//!     INSERT INTO users VALUES ('Bob', 52);
//! "#)?;
//!
//! let query = Query::select("SELECT name, age FROM users ORDER BY age").with_name("users");
//! let result = c.query(&query, &[])?;
//!
//! assert_eq!(result.columns(), ["name", "age"]);
//! assert_eq!(result.rows(), [
//!     vec![Value::from("Alice"), Value::from(42)],
//!     vec![Value::from("Bob"), Value::from(52)],
//! ]);
//! # Ok::<_, sqll_driver::Error>(())
//! ```
//!
//! <br>
//!
//! #### Transactions
//!
//! ```
//! use sqll_driver::{Connection, Query, TransactionMode, TransactionStatus};
//!
//! let mut c = Connection::open_in_memory()?;
//! c.execute("CREATE TABLE users (name TEXT)")?;
//!
//! c.begin(TransactionMode::Deferred)?;
//! c.query(&Query::insert("INSERT INTO users VALUES ('Alice')"), &[])?;
//! assert_eq!(c.status(), TransactionStatus::Transaction);
//!
//! c.rollback(TransactionMode::Deferred)?;
//! assert_eq!(c.status(), TransactionStatus::Idle);
//!
//! let result = c.query(&Query::select("SELECT COUNT(*) FROM users"), &[])?;
//! assert_eq!(result.rows()[0][0].as_integer(), Some(0));
//! # Ok::<_, sqll_driver::Error>(())
//! ```
//!
//! <br>
//!
//! #### Cursors
//!
//! Large results can be read incrementally through a [`Cursor`] or a
//! [`Stream`], which read rows in chunks.
//!
//! ```
//! use sqll_driver::{Connection, Fetch, Query};
//!
//! let mut c = Connection::open_in_memory()?;
//! c.execute("CREATE TABLE numbers (n INTEGER); INSERT INTO numbers VALUES (1), (2), (3);")?;
//!
//! let cursor = c.declare(&Query::select("SELECT n FROM numbers"), &[])?;
//!
//! let mut total = 0;
//!
//! loop {
//!     let fetch = c.fetch_chunk(&cursor, Some(2))?;
//!     total += fetch.result().rows().len();
//!
//!     if fetch.is_halt() {
//!         break;
//!     }
//! }
//!
//! c.deallocate(&cursor);
//! assert_eq!(total, 3);
//! # Ok::<_, sqll_driver::Error>(())
//! ```
//!
//! [SQLite]: https://sqlite.org

#![allow(clippy::new_without_default)]
#![warn(rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_cfg))]


mod bind;
mod bytes;
mod cache;
mod connection;
mod cursor;
mod error;
mod ffi;
mod handle;
mod options;
mod owned;
mod query;
mod result;
mod statement;
mod stream;
mod utils;
mod value;
#[cfg(feature = "tokio")]
mod worker;

#[doc(inline)]
pub use self::connection::{CheckoutStatus, Connection, ConnectionId, TransactionStatus};
#[doc(inline)]
pub use self::cursor::{Chunk, Cursor, Fetch};
#[doc(inline)]
pub use self::error::{Code, Error, Result};
#[doc(inline)]
pub use self::handle::{Action, UpdateEvent};
#[doc(inline)]
pub use self::options::{
    ConnectOptions, Database, JournalMode, Mode, Synchronous, TempStore, TransactionMode,
};
#[doc(inline)]
pub use self::query::{Command, Query};
#[doc(inline)]
pub use self::result::{QueryResult, Row};
#[doc(inline)]
pub use self::statement::{Statement, Step};
#[doc(inline)]
pub use self::stream::Stream;
#[doc(inline)]
pub use self::value::Value;
#[cfg(feature = "tokio")]
#[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
#[doc(inline)]
pub use self::worker::AsyncConnection;

/// Return the version of the linked sqlite library as a string, like
/// `"3.46.0"`.
///
/// # Examples
///
/// ```
/// assert!(sqll_driver::lib_version().starts_with("3."));
/// ```
pub fn lib_version() -> &'static str {
    // SAFETY: sqlite3_libversion returns a static nul-terminated string.
    unsafe { utils::cstr_to_str(ffi::sqlite3_libversion()).unwrap_or_default() }
}

/// Return the version of the linked sqlite library as a number, like
/// `3046000`.
pub fn lib_version_number() -> i32 {
    // SAFETY: This has no preconditions.
    unsafe { ffi::sqlite3_libversion_number() }
}
