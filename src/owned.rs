use core::ptr::NonNull;

/// An owned, type-erased pointer with drop glue.
///
/// This is used to keep callbacks registered with sqlite alive for as long as
/// they are installed.
pub(crate) struct Owned {
    ptr: NonNull<()>,
    drop: unsafe fn(NonNull<()>),
}

// SAFETY: Construction requires the erased value to be `Send`.
unsafe impl Send for Owned {}

impl Owned {
    pub(crate) fn new<T>(value: T) -> Self
    where
        T: Send + 'static,
    {
        unsafe fn drop_glue<T>(ptr: NonNull<()>) {
            // SAFETY: The pointer was constructed from a `Box<T>` below.
            unsafe {
                drop(Box::from_raw(ptr.as_ptr().cast::<T>()));
            }
        }

        let ptr = NonNull::from(Box::leak(Box::new(value))).cast::<()>();

        Self {
            ptr,
            drop: drop_glue::<T>,
        }
    }

    #[inline]
    pub(crate) fn as_ptr(&self) -> *mut () {
        self.ptr.as_ptr()
    }
}

impl Drop for Owned {
    fn drop(&mut self) {
        // SAFETY: The drop glue matches the type the pointer was created from.
        unsafe {
            (self.drop)(self.ptr);
        }
    }
}
