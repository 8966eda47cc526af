use std::ffi::{CStr, CString};
use std::path::Path;

use core::ffi::c_char;

use crate::error::{Error, Result};

/// Convert a c-string into a rust string.
///
/// # Safety
///
/// The pointer must be non-null and point to a nul-terminated string which
/// outlives `'a`.
pub(crate) unsafe fn cstr_to_str<'a>(s: *const c_char) -> Result<&'a str> {
    unsafe {
        match CStr::from_ptr(s).to_str() {
            Ok(s) => Ok(s),
            Err(..) => Err(Error::validation("string reported by sqlite is not utf-8")),
        }
    }
}

pub(crate) fn string_to_cstring(s: &str) -> Result<CString> {
    match CString::new(s) {
        Ok(string) => Ok(string),
        Err(..) => Err(Error::validation(format_args!(
            "{s:?} contains an interior nul byte"
        ))),
    }
}

#[cfg(unix)]
pub(crate) fn path_to_cstring(p: &Path) -> Result<CString> {
    use std::os::unix::ffi::OsStrExt;

    match CString::new(p.as_os_str().as_bytes()) {
        Ok(string) => Ok(string),
        Err(..) => Err(Error::config(format_args!(
            "database path {} contains an interior nul byte",
            p.display()
        ))),
    }
}

#[cfg(not(unix))]
pub(crate) fn path_to_cstring(p: &Path) -> Result<CString> {
    let Some(s) = p.to_str() else {
        return Err(Error::config(format_args!(
            "database path {} is not valid utf-8",
            p.display()
        )));
    };

    string_to_cstring(s)
}
