use core::fmt;

/// The kind of command a query performs.
///
/// This is supplied by the caller together with the query rather than being
/// parsed out of the SQL, and governs whether [`QueryResult::changes`] is
/// populated.
///
/// [`QueryResult::changes`]: crate::QueryResult::changes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(rename_all = "snake_case"))]
pub enum Command {
    /// A query reading rows.
    Select,
    /// An insert.
    Insert,
    /// An update.
    Update,
    /// A delete.
    Delete,
    /// Anything else, like DDL or pragmas.
    #[default]
    Other,
}

impl Command {
    /// Test if the command modifies rows, in which case the number of changed
    /// rows is reported.
    #[inline]
    pub fn is_mutation(self) -> bool {
        matches!(self, Command::Insert | Command::Update | Command::Delete)
    }
}

impl fmt::Display for Command {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Select => write!(f, "select"),
            Command::Insert => write!(f, "insert"),
            Command::Update => write!(f, "update"),
            Command::Delete => write!(f, "delete"),
            Command::Other => write!(f, "other"),
        }
    }
}

/// A query to prepare.
///
/// Named queries are eligible for the statement cache of a connection, see
/// [`Connection::prepare`].
///
/// [`Connection::prepare`]: crate::Connection::prepare
///
/// # Examples
///
/// ```
/// use sqll_driver::{Command, Query};
///
/// let query = Query::insert("INSERT INTO users (name) VALUES (?)").with_name("insert_user");
/// assert_eq!(query.command(), Command::Insert);
/// assert_eq!(query.name(), Some("insert_user"));
///
/// let query = Query::new("CREATE TABLE users (name TEXT)");
/// assert_eq!(query.command(), Command::Other);
/// assert_eq!(query.name(), None);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    sql: Box<str>,
    name: Option<Box<str>>,
    command: Command,
}

impl Query {
    /// Construct a query of kind [`Command::Other`].
    pub fn new(sql: impl Into<Box<str>>) -> Self {
        Self {
            sql: sql.into(),
            name: None,
            command: Command::Other,
        }
    }

    /// Construct a [`Command::Select`] query.
    pub fn select(sql: impl Into<Box<str>>) -> Self {
        Self::new(sql).with_command(Command::Select)
    }

    /// Construct a [`Command::Insert`] query.
    pub fn insert(sql: impl Into<Box<str>>) -> Self {
        Self::new(sql).with_command(Command::Insert)
    }

    /// Construct a [`Command::Update`] query.
    pub fn update(sql: impl Into<Box<str>>) -> Self {
        Self::new(sql).with_command(Command::Update)
    }

    /// Construct a [`Command::Delete`] query.
    pub fn delete(sql: impl Into<Box<str>>) -> Self {
        Self::new(sql).with_command(Command::Delete)
    }

    /// Set the command kind of the query.
    pub fn with_command(mut self, command: Command) -> Self {
        self.command = command;
        self
    }

    /// Name the query, making it eligible for caching.
    pub fn with_name(mut self, name: impl Into<Box<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The SQL of the query.
    #[inline]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// The name of the query.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The command kind of the query.
    #[inline]
    pub fn command(&self) -> Command {
        self.command
    }
}

impl From<&str> for Query {
    #[inline]
    fn from(sql: &str) -> Self {
        Query::new(sql)
    }
}

impl From<String> for Query {
    #[inline]
    fn from(sql: String) -> Self {
        Query::new(sql)
    }
}
