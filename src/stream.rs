use crate::connection::Connection;
use crate::cursor::{Cursor, Fetch};
use crate::error::Result;
use crate::result::QueryResult;

/// A pull-based stream of chunks read from a query.
///
/// Each item is one chunk of rows. The cursor behind the stream is released
/// once the stream is exhausted, when it produces an error, or when it is
/// dropped, whichever happens first. A query which produces no rows yields
/// no chunks.
///
/// See [`Connection::stream`].
///
/// # Examples
///
/// ```
/// use sqll_driver::{Connection, Query};
///
/// let mut c = Connection::open_in_memory()?;
/// c.execute("CREATE TABLE numbers (n INTEGER)")?;
///
/// for n in 0..5 {
///     c.execute(&format!("INSERT INTO numbers VALUES ({n})"))?;
/// }
///
/// let query = Query::select("SELECT n FROM numbers ORDER BY n");
///
/// let sizes = c
///     .stream(&query, &[], Some(2))?
///     .map(|chunk| chunk.map(|result| result.rows().len()))
///     .collect::<Result<Vec<_>, _>>()?;
///
/// assert_eq!(sizes, [2, 2, 1]);
/// # Ok::<_, sqll_driver::Error>(())
/// ```
pub struct Stream<'conn> {
    connection: &'conn mut Connection,
    cursor: Option<Cursor>,
    chunk_size: Option<usize>,
}

impl<'conn> Stream<'conn> {
    pub(crate) fn new(
        connection: &'conn mut Connection,
        cursor: Cursor,
        chunk_size: Option<usize>,
    ) -> Self {
        Self {
            connection,
            cursor: Some(cursor),
            chunk_size,
        }
    }

    /// Stop the stream early and release its cursor.
    pub fn close(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        if let Some(cursor) = self.cursor.take() {
            self.connection.deallocate(&cursor);
        }
    }
}

impl Iterator for Stream<'_> {
    type Item = Result<QueryResult>;

    fn next(&mut self) -> Option<Self::Item> {
        let cursor = self.cursor.as_ref()?;

        let fetch = match self.connection.fetch_chunk(cursor, self.chunk_size) {
            Ok(fetch) => fetch,
            Err(error) => {
                self.finish();
                return Some(Err(error));
            }
        };

        match fetch {
            Fetch::Cont(result) => Some(Ok(result)),
            Fetch::Halt(result) => {
                self.finish();

                if result.rows().is_empty() {
                    return None;
                }

                Some(Ok(result))
            }
        }
    }
}

impl Drop for Stream<'_> {
    fn drop(&mut self) {
        self.finish();
    }
}
