use core::ffi::c_int;

pub(crate) use libsqlite3_sys::*;

unsafe extern "C" {
    // Left out of the generated bindings, but present in the bundled library.
    pub(crate) fn sqlite3_close_v2(db: *mut sqlite3) -> c_int;
}

/// Helper to evaluate sqlite3 calls against a database handle.
///
/// On failure the error is constructed from the handle so that the message
/// reported by sqlite is preserved.
macro_rules! __sqlite3_try {
    ($db:expr, $expr:expr) => {{
        let code = $expr;

        if code != $crate::ffi::SQLITE_OK {
            return Err($crate::error::Error::from_handle($db, code));
        }
    }};
}

pub(crate) use __sqlite3_try as sqlite3_try;
