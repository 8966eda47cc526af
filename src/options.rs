use core::fmt;

use std::path::{Path, PathBuf};

use crate::connection::Connection;
use crate::error::Result;

/// The database a connection is opened against.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(rename_all = "snake_case"))]
pub enum Database {
    /// A private in-memory database.
    #[default]
    Memory,
    /// A database file. The special path `:memory:` opens an in-memory
    /// database.
    Path(PathBuf),
}

/// How a database is opened.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(rename_all = "snake_case"))]
pub enum Mode {
    /// Open for reading and writing, creating the database if it does not
    /// exist.
    #[default]
    ReadWrite,
    /// Open for reading only. The database must already exist.
    ReadOnly,
}

macro_rules! pragma_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $value:literal,
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
        #[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(rename_all = "snake_case"))]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                $variant,
            )*
        }

        impl fmt::Display for $name {
            #[inline]
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $($name::$variant => f.write_str($value),)*
                }
            }
        }
    };
}

pragma_enum! {
    /// The `journal_mode` pragma.
    pub enum JournalMode {
        #[default]
        Delete => "DELETE",
        Truncate => "TRUNCATE",
        Persist => "PERSIST",
        Memory => "MEMORY",
        Wal => "WAL",
        Off => "OFF",
    }
}

pragma_enum! {
    /// The `synchronous` pragma.
    pub enum Synchronous {
        Off => "OFF",
        #[default]
        Normal => "NORMAL",
        Full => "FULL",
        Extra => "EXTRA",
    }
}

pragma_enum! {
    /// The `temp_store` pragma.
    pub enum TempStore {
        #[default]
        Default => "DEFAULT",
        File => "FILE",
        Memory => "MEMORY",
    }
}

/// The mode a transaction is opened or finished with.
///
/// See [`Connection::begin`].
///
/// [`Connection::begin`]: crate::Connection::begin
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(rename_all = "snake_case"))]
pub enum TransactionMode {
    /// `BEGIN`, taking locks lazily.
    #[default]
    Deferred,
    /// `BEGIN IMMEDIATE`, taking the write lock up front.
    Immediate,
    /// `BEGIN EXCLUSIVE`.
    Exclusive,
    /// A savepoint, which nests inside of an ongoing transaction.
    Savepoint,
}

/// Options used to establish a [`Connection`].
///
/// A database has to be specified through [`in_memory`], [`path`] or
/// [`database`] before connecting.
///
/// [`in_memory`]: Self::in_memory
/// [`path`]: Self::path
/// [`database`]: Self::database
///
/// # Examples
///
/// ```
/// use sqll_driver::{ConnectOptions, JournalMode};
///
/// let mut c = ConnectOptions::new()
///     .in_memory()
///     .journal_mode(JournalMode::Memory)
///     .foreign_keys(false)
///     .chunk_size(10)
///     .connect()?;
///
/// c.execute("CREATE TABLE users (name TEXT)")?;
/// # Ok::<_, sqll_driver::Error>(())
/// ```
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct ConnectOptions {
    pub(crate) database: Option<Database>,
    pub(crate) mode: Mode,
    pub(crate) journal_mode: JournalMode,
    pub(crate) synchronous: Synchronous,
    pub(crate) temp_store: TempStore,
    pub(crate) foreign_keys: bool,
    pub(crate) cache_size: i64,
    pub(crate) busy_timeout: u32,
    pub(crate) chunk_size: usize,
    pub(crate) statement_cache_capacity: usize,
    pub(crate) pragmas: Vec<(String, String)>,
}

impl ConnectOptions {
    /// Default number of rows read per chunk.
    pub const DEFAULT_CHUNK_SIZE: usize = 50;

    /// Default number of statements kept in the statement cache.
    pub const DEFAULT_STATEMENT_CACHE_CAPACITY: usize = 100;

    /// Construct options with defaults and no database.
    #[inline]
    pub fn new() -> Self {
        Self {
            database: None,
            mode: Mode::ReadWrite,
            journal_mode: JournalMode::Delete,
            synchronous: Synchronous::Normal,
            temp_store: TempStore::Default,
            foreign_keys: true,
            cache_size: -2000,
            busy_timeout: 2000,
            chunk_size: Self::DEFAULT_CHUNK_SIZE,
            statement_cache_capacity: Self::DEFAULT_STATEMENT_CACHE_CAPACITY,
            pragmas: Vec::new(),
        }
    }

    /// Set the database to connect to.
    #[inline]
    pub fn database(&mut self, database: Database) -> &mut Self {
        self.database = Some(database);
        self
    }

    /// Connect to a private in-memory database.
    #[inline]
    pub fn in_memory(&mut self) -> &mut Self {
        self.database(Database::Memory)
    }

    /// Connect to the database at the given path.
    #[inline]
    pub fn path(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.database(Database::Path(path.as_ref().to_path_buf()))
    }

    /// The database is opened for reading only.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqll_driver::ConnectOptions;
    ///
    /// let dir = tempfile::tempdir()?;
    /// let path = dir.path().join("database.sqlite3");
    ///
    /// ConnectOptions::new().path(&path).connect()?.execute("CREATE TABLE users (name TEXT)")?;
    ///
    /// let mut c = ConnectOptions::new().path(&path).read_only().connect()?;
    /// assert!(c.execute("INSERT INTO users VALUES ('Alice')").is_err());
    /// # Ok::<_, Box<dyn std::error::Error>>(())
    /// ```
    #[inline]
    pub fn read_only(&mut self) -> &mut Self {
        self.mode = Mode::ReadOnly;
        self
    }

    /// Set how the database is opened.
    #[inline]
    pub fn mode(&mut self, mode: Mode) -> &mut Self {
        self.mode = mode;
        self
    }

    /// Set the journal mode. Defaults to [`JournalMode::Delete`].
    #[inline]
    pub fn journal_mode(&mut self, journal_mode: JournalMode) -> &mut Self {
        self.journal_mode = journal_mode;
        self
    }

    /// Set the synchronous mode. Defaults to [`Synchronous::Normal`].
    #[inline]
    pub fn synchronous(&mut self, synchronous: Synchronous) -> &mut Self {
        self.synchronous = synchronous;
        self
    }

    /// Set where temporary tables are stored. Defaults to
    /// [`TempStore::Default`].
    #[inline]
    pub fn temp_store(&mut self, temp_store: TempStore) -> &mut Self {
        self.temp_store = temp_store;
        self
    }

    /// Enforce foreign key constraints. Enabled by default.
    #[inline]
    pub fn foreign_keys(&mut self, foreign_keys: bool) -> &mut Self {
        self.foreign_keys = foreign_keys;
        self
    }

    /// Set the page cache size, where negative values are in kibibytes.
    /// Defaults to `-2000`.
    #[inline]
    pub fn cache_size(&mut self, cache_size: i64) -> &mut Self {
        self.cache_size = cache_size;
        self
    }

    /// How long in milliseconds sqlite keeps retrying to acquire a lock before
    /// reporting busy. Defaults to `2000`.
    #[inline]
    pub fn busy_timeout(&mut self, milliseconds: u32) -> &mut Self {
        self.busy_timeout = milliseconds;
        self
    }

    /// Number of rows read per chunk when none is specified. Defaults to
    /// [`DEFAULT_CHUNK_SIZE`].
    ///
    /// [`DEFAULT_CHUNK_SIZE`]: Self::DEFAULT_CHUNK_SIZE
    #[inline]
    pub fn chunk_size(&mut self, chunk_size: usize) -> &mut Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Maximum number of named statements to keep prepared. Setting this to
    /// zero disables caching.
    #[inline]
    pub fn statement_cache_capacity(&mut self, capacity: usize) -> &mut Self {
        self.statement_cache_capacity = capacity;
        self
    }

    /// Add a pragma which is applied after the built-in ones when
    /// connecting.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqll_driver::{ConnectOptions, Query, Value};
    ///
    /// let mut c = ConnectOptions::new()
    ///     .in_memory()
    ///     .pragma("user_version", "7")
    ///     .connect()?;
    ///
    /// let result = c.query(&Query::select("PRAGMA user_version"), &[])?;
    /// assert_eq!(result.rows(), [vec![Value::Integer(7)]]);
    /// # Ok::<_, sqll_driver::Error>(())
    /// ```
    #[inline]
    pub fn pragma(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.pragmas.push((name.into(), value.into()));
        self
    }

    /// Establish a connection with the current options.
    #[inline]
    pub fn connect(&self) -> Result<Connection> {
        Connection::connect(self)
    }

    /// The pragma statements applied when connecting, in order.
    pub(crate) fn pragma_statements(&self) -> Vec<String> {
        let mut statements = vec![
            format!("PRAGMA journal_mode = {}", self.journal_mode),
            format!("PRAGMA synchronous = {}", self.synchronous),
            format!("PRAGMA temp_store = {}", self.temp_store),
            format!("PRAGMA foreign_keys = {}", if self.foreign_keys { "ON" } else { "OFF" }),
            format!("PRAGMA cache_size = {}", self.cache_size),
        ];

        for (name, value) in &self.pragmas {
            statements.push(format!("PRAGMA {name} = {value}"));
        }

        statements
    }
}

impl Default for ConnectOptions {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// Test if a pragma name is a plain identifier.
pub(crate) fn is_pragma_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}
