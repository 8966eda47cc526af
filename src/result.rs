use crate::query::Command;
use crate::value::Value;

/// A single decoded row.
pub type Row = Vec<Value>;

/// The materialized outcome of a statement.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryResult {
    command: Command,
    columns: Vec<String>,
    rows: Vec<Row>,
    changes: Option<u64>,
}

impl QueryResult {
    pub(crate) fn new(
        command: Command,
        columns: Vec<String>,
        rows: Vec<Row>,
        changes: Option<u64>,
    ) -> Self {
        Self {
            command,
            columns,
            rows,
            changes,
        }
    }

    /// The command kind of the query which produced the result.
    #[inline]
    pub fn command(&self) -> Command {
        self.command
    }

    /// The column names of the rows.
    #[inline]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The rows produced.
    #[inline]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Take the rows produced.
    #[inline]
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Number of rows changed, only present for mutating commands.
    ///
    /// `None` means that the command could not change rows, which is distinct
    /// from a mutation which didn't affect anything.
    #[inline]
    pub fn changes(&self) -> Option<u64> {
        self.changes
    }

    /// The number of rows changed for mutations, or the number of rows
    /// returned otherwise.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqll_driver::{Connection, Query};
    ///
    /// let mut c = Connection::open_in_memory()?;
    /// c.execute("CREATE TABLE users (name TEXT)")?;
    ///
    /// let insert = Query::insert("INSERT INTO users VALUES ('Alice'), ('Bob')");
    /// let result = c.query(&insert, &[])?;
    /// assert_eq!(result.changes(), Some(2));
    /// assert_eq!(result.num_rows(), 2);
    ///
    /// let select = Query::select("SELECT name FROM users WHERE name = 'Bob'");
    /// let result = c.query(&select, &[])?;
    /// assert_eq!(result.changes(), None);
    /// assert_eq!(result.num_rows(), 1);
    /// # Ok::<_, sqll_driver::Error>(())
    /// ```
    #[inline]
    pub fn num_rows(&self) -> usize {
        match self.changes {
            Some(changes) => usize::try_from(changes).unwrap_or(usize::MAX),
            None => self.rows.len(),
        }
    }
}
