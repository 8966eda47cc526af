use core::ffi::{CStr, c_char, c_int, c_uint, c_void};
use core::ptr::{self, NonNull};

use crate::bytes::SqliteBuffer;
use crate::error::{Code, Error, Result};
use crate::ffi::{self, sqlite3_try};
use crate::owned::Owned;
use crate::utils;

/// The kind of row change reported to an update hook.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// A row was inserted.
    Insert,
    /// A row was updated.
    Update,
    /// A row was deleted.
    Delete,
}

/// A row change observed through [`Connection::set_update_hook`].
///
/// [`Connection::set_update_hook`]: crate::Connection::set_update_hook
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct UpdateEvent<'a> {
    /// What happened to the row.
    pub action: Action,
    /// The name of the database the row lives in, like `main`.
    pub database: &'a str,
    /// The table the row lives in.
    pub table: &'a str,
    /// The rowid of the affected row.
    pub rowid: i64,
}

/// An owned native database handle.
///
/// The handle is closed with `sqlite3_close_v2`, so the native database lives
/// on until every statement prepared against it has been finalized.
pub(crate) struct Handle {
    raw: Option<NonNull<ffi::sqlite3>>,
    update_hook: Option<Owned>,
}

// SAFETY: The handle is opened in serialized threading mode, and all access to
// it goes through `&mut Connection`.
unsafe impl Send for Handle {}

impl Handle {
    /// Open a handle.
    pub(crate) fn open(path: &CStr, read_only: bool) -> Result<Self> {
        let mut flags = ffi::SQLITE_OPEN_FULLMUTEX;

        if read_only {
            flags |= ffi::SQLITE_OPEN_READONLY;
        } else {
            flags |= ffi::SQLITE_OPEN_READWRITE | ffi::SQLITE_OPEN_CREATE;
        }

        let mut raw = ptr::null_mut();

        // SAFETY: The path is nul-terminated, and a handle is always written
        // back unless allocation failed.
        unsafe {
            let code = ffi::sqlite3_open_v2(path.as_ptr(), &mut raw, flags, ptr::null());

            if code != ffi::SQLITE_OK {
                let error = Error::from_handle(raw, code);
                ffi::sqlite3_close(raw);
                return Err(error);
            }

            let Some(raw) = NonNull::new(raw) else {
                return Err(Error::new(Code::NOMEM));
            };

            ffi::sqlite3_extended_result_codes(raw.as_ptr(), 1);

            Ok(Self {
                raw: Some(raw),
                update_hook: None,
            })
        }
    }

    /// Access the raw handle, or error if it has been closed.
    #[inline]
    pub(crate) fn as_ptr(&self) -> Result<NonNull<ffi::sqlite3>> {
        self.raw.ok_or(Error::Closed)
    }

    #[inline]
    pub(crate) fn is_closed(&self) -> bool {
        self.raw.is_none()
    }

    /// Close the handle. Closing an already closed handle does nothing.
    pub(crate) fn close(&mut self) -> Result<()> {
        let Some(raw) = self.raw.take() else {
            return Ok(());
        };

        // SAFETY: The handle is valid and no longer reachable through self.
        let code = unsafe {
            if self.update_hook.is_some() {
                ffi::sqlite3_update_hook(raw.as_ptr(), None, ptr::null_mut());
            }

            ffi::sqlite3_close_v2(raw.as_ptr())
        };

        self.update_hook = None;

        if code != ffi::SQLITE_OK {
            return Err(Error::disconnect(Error::new(Code::new(code))));
        }

        Ok(())
    }

    /// Execute one or more statements, discarding any rows.
    pub(crate) fn execute(&self, sql: &str) -> Result<()> {
        let db = self.as_ptr()?.as_ptr();
        let sql = utils::string_to_cstring(sql)?;

        // SAFETY: The handle and the statement are valid for the duration of
        // the call.
        unsafe {
            sqlite3_try!(
                db,
                ffi::sqlite3_exec(db, sql.as_ptr(), None, ptr::null_mut(), ptr::null_mut())
            );
        }

        Ok(())
    }

    /// Rows changed by the most recent mutation.
    pub(crate) fn changes(&self) -> Result<u64> {
        let db = self.as_ptr()?;
        // SAFETY: The handle is valid.
        let changes = unsafe { ffi::sqlite3_changes64(db.as_ptr()) };
        Ok(u64::try_from(changes).unwrap_or_default())
    }

    /// Rows changed since the handle was opened.
    pub(crate) fn total_changes(&self) -> Result<u64> {
        let db = self.as_ptr()?;
        // SAFETY: The handle is valid.
        let changes = unsafe { ffi::sqlite3_total_changes64(db.as_ptr()) };
        Ok(u64::try_from(changes).unwrap_or_default())
    }

    pub(crate) fn last_insert_rowid(&self) -> Result<i64> {
        let db = self.as_ptr()?;
        // SAFETY: The handle is valid.
        Ok(unsafe { ffi::sqlite3_last_insert_rowid(db.as_ptr()) })
    }

    /// Test if the handle is outside of a transaction.
    pub(crate) fn autocommit(&self) -> Result<bool> {
        let db = self.as_ptr()?;
        // SAFETY: The handle is valid.
        Ok(unsafe { ffi::sqlite3_get_autocommit(db.as_ptr()) != 0 })
    }

    pub(crate) fn busy_timeout(&self, milliseconds: u32) -> Result<()> {
        let db = self.as_ptr()?.as_ptr();
        let milliseconds = c_int::try_from(milliseconds).unwrap_or(c_int::MAX);

        // SAFETY: The handle is valid.
        unsafe {
            sqlite3_try!(db, ffi::sqlite3_busy_timeout(db, milliseconds));
        }

        Ok(())
    }

    /// Copy out the serialized contents of the given schema.
    pub(crate) fn serialize(&self, schema: &str) -> Result<Vec<u8>> {
        let db = self.as_ptr()?.as_ptr();
        let name = utils::string_to_cstring(schema)?;
        let mut len = 0;

        // SAFETY: With no flags sqlite hands us a fresh allocation of len
        // bytes, or null.
        let buffer = unsafe {
            let ptr = ffi::sqlite3_serialize(db, name.as_ptr(), &mut len, 0);
            SqliteBuffer::from_raw(ptr, usize::try_from(len).unwrap_or_default())
        };

        let Some(buffer) = buffer else {
            return Err(Error::validation(format_args!(
                "failed to serialize database {schema:?}"
            )));
        };

        Ok(buffer.to_vec())
    }

    /// Replace the contents of the given schema with a serialized database.
    pub(crate) fn deserialize(&mut self, schema: &str, bytes: &[u8]) -> Result<()> {
        let db = self.as_ptr()?.as_ptr();
        let name = utils::string_to_cstring(schema)?;
        let Ok(len) = i64::try_from(bytes.len()) else {
            return Err(Error::new(Code::TOOBIG));
        };

        let (ptr, _) = SqliteBuffer::copy_from(bytes)?.into_raw();

        let flags = (ffi::SQLITE_DESERIALIZE_FREEONCLOSE | ffi::SQLITE_DESERIALIZE_RESIZEABLE)
            as c_uint;

        // SAFETY: Ownership of the buffer passes to sqlite, which frees it
        // even if deserialization fails.
        unsafe {
            sqlite3_try!(
                db,
                ffi::sqlite3_deserialize(db, name.as_ptr(), ptr.as_ptr(), len, len, flags)
            );
        }

        Ok(())
    }

    /// Install a callback observing row changes, replacing any existing one.
    pub(crate) fn set_update_hook<F>(&mut self, callback: F) -> Result<()>
    where
        F: FnMut(UpdateEvent<'_>) + Send + 'static,
    {
        let db = self.as_ptr()?;
        let owned = Owned::new(callback);

        // SAFETY: The callback is kept alive in self for as long as it is
        // registered.
        unsafe {
            ffi::sqlite3_update_hook(
                db.as_ptr(),
                Some(update_callback::<F>),
                owned.as_ptr().cast::<c_void>(),
            );
        }

        self.update_hook = Some(owned);
        Ok(())
    }

    pub(crate) fn remove_update_hook(&mut self) -> Result<()> {
        let db = self.as_ptr()?;

        // SAFETY: The handle is valid.
        unsafe {
            ffi::sqlite3_update_hook(db.as_ptr(), None, ptr::null_mut());
        }

        self.update_hook = None;
        Ok(())
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        if let Err(error) = self.close() {
            tracing::warn!(%error, "failed to close database handle");
        }
    }
}

unsafe extern "C" fn update_callback<F>(
    data: *mut c_void,
    action: c_int,
    database: *const c_char,
    table: *const c_char,
    rowid: ffi::sqlite3_int64,
) where
    F: FnMut(UpdateEvent<'_>),
{
    let action = match action {
        ffi::SQLITE_INSERT => Action::Insert,
        ffi::SQLITE_UPDATE => Action::Update,
        ffi::SQLITE_DELETE => Action::Delete,
        _ => return,
    };

    // SAFETY: sqlite passes nul-terminated names valid for the duration of the
    // callback, and data is the callback registered in set_update_hook.
    unsafe {
        let (Ok(database), Ok(table)) = (utils::cstr_to_str(database), utils::cstr_to_str(table))
        else {
            return;
        };

        let callback = &mut *data.cast::<F>();

        callback(UpdateEvent {
            action,
            database,
            table,
            rowid,
        });
    }
}
