use core::mem::ManuallyDrop;
use core::ops::Deref;
use core::ptr::NonNull;
use core::slice;

use crate::error::{Code, Error, Result};
use crate::ffi;


/// A byte buffer whose memory is owned by the sqlite allocator.
///
/// This is what sqlite hands out from `sqlite3_serialize`, and what it
/// expects to take ownership of in `sqlite3_deserialize`.
pub(crate) struct SqliteBuffer {
    ptr: NonNull<u8>,
    len: usize,
}

impl SqliteBuffer {
    /// Take ownership of a buffer allocated by sqlite.
    ///
    /// # Safety
    ///
    /// The pointer must either be null or have been allocated through the
    /// sqlite allocator with room for at least `len` bytes.
    pub(crate) unsafe fn from_raw(ptr: *mut u8, len: usize) -> Option<Self> {
        let ptr = NonNull::new(ptr)?;
        Some(Self { ptr, len })
    }

    /// Copy the given bytes into a freshly allocated sqlite buffer.
    pub(crate) fn copy_from(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::validation("cannot allocate an empty buffer"));
        }

        // SAFETY: We allocate exactly as many bytes as we copy.
        unsafe {
            let ptr = ffi::sqlite3_malloc64(bytes.len() as ffi::sqlite3_uint64);

            let Some(ptr) = NonNull::new(ptr.cast::<u8>()) else {
                return Err(Error::new(Code::NOMEM));
            };

            ptr.as_ptr()
                .copy_from_nonoverlapping(bytes.as_ptr(), bytes.len());

            Ok(Self {
                ptr,
                len: bytes.len(),
            })
        }
    }

    /// Give up ownership of the buffer, the caller is responsible for handing
    /// it to sqlite.
    pub(crate) fn into_raw(self) -> (NonNull<u8>, usize) {
        let this = ManuallyDrop::new(self);
        (this.ptr, this.len)
    }
}

impl Deref for SqliteBuffer {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &Self::Target {
        // SAFETY: Construction guarantees that len bytes are initialized.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl Drop for SqliteBuffer {
    fn drop(&mut self) {
        // SAFETY: The buffer was allocated by sqlite.
        unsafe {
            ffi::sqlite3_free(self.ptr.as_ptr().cast());
        }
    }
}
