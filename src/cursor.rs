use crate::error::{Error, Result};
use crate::result::{QueryResult, Row};
use crate::statement::{Statement, Step};

/// A batch of rows read with [`Connection::multi_step`].
///
/// [`Connection::multi_step`]: crate::Connection::multi_step
#[derive(Clone, Debug, PartialEq)]
pub enum Chunk {
    /// The chunk is full and more rows might remain.
    Rows(Vec<Row>),
    /// The statement has been exhausted, these are the last rows.
    Done(Vec<Row>),
    /// Sqlite reported busy before any row could be read.
    Busy,
}

/// The outcome of fetching from a [`Cursor`].
#[derive(Clone, Debug, PartialEq)]
pub enum Fetch {
    /// Rows were read and the cursor may produce more.
    Cont(QueryResult),
    /// The cursor is exhausted. The result contains whatever rows were read
    /// before that happened.
    Halt(QueryResult),
}

impl Fetch {
    /// Access the result regardless of whether the cursor was exhausted.
    #[inline]
    pub fn result(&self) -> &QueryResult {
        match self {
            Fetch::Cont(result) | Fetch::Halt(result) => result,
        }
    }

    /// Take the result regardless of whether the cursor was exhausted.
    #[inline]
    pub fn into_result(self) -> QueryResult {
        match self {
            Fetch::Cont(result) | Fetch::Halt(result) => result,
        }
    }

    /// Test if the cursor was exhausted.
    #[inline]
    pub fn is_halt(&self) -> bool {
        matches!(self, Fetch::Halt(..))
    }
}

/// A statement which has been declared for incremental reading.
///
/// See [`Connection::declare`].
///
/// [`Connection::declare`]: crate::Connection::declare
#[derive(Clone, Debug)]
pub struct Cursor {
    stmt: Statement,
}

impl Cursor {
    #[inline]
    pub(crate) fn new(stmt: Statement) -> Self {
        Self { stmt }
    }

    /// The statement backing the cursor.
    #[inline]
    pub fn statement(&self) -> &Statement {
        &self.stmt
    }

    /// Build a result out of rows read from the cursor.
    pub(crate) fn result(&self, rows: Vec<Row>) -> QueryResult {
        QueryResult::new(self.stmt.command(), self.stmt.columns().to_vec(), rows, None)
    }
}

/// Read up to `chunk_size` rows, or every remaining row if `None`.
pub(crate) fn multi_step(stmt: &Statement, chunk_size: Option<usize>) -> Result<Chunk> {
    if chunk_size == Some(0) {
        return Err(Error::validation("chunk size must be greater than zero"));
    }

    let mut rows = Vec::with_capacity(chunk_size.unwrap_or_default().min(1024));

    loop {
        // The row completing a chunk is read with lookahead, so that a chunk
        // which exactly drains the statement is reported as done.
        let last = chunk_size.is_some_and(|size| rows.len() + 1 == size);

        let step = if last {
            let (step, exhausted) = stmt.step_peek()?;

            if let Step::Row(row) = step {
                rows.push(row);

                if exhausted {
                    return Ok(Chunk::Done(rows));
                }

                return Ok(Chunk::Rows(rows));
            }

            step
        } else {
            stmt.step()?
        };

        match step {
            Step::Row(row) => rows.push(row),
            Step::Done => return Ok(Chunk::Done(rows)),
            Step::Busy if rows.is_empty() => return Ok(Chunk::Busy),
            Step::Busy => return Ok(Chunk::Rows(rows)),
        }
    }
}
