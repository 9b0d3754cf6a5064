use crate::error;

/// Convert a caller-owned output buffer pointer + length into a slice.
///
/// # Safety
/// If `data` is non-null it must be writable for `len` bytes for the
/// duration of the call.
pub(crate) unsafe fn out_bytes_arg<'a>(data: *mut u8, len: usize, name: &str) -> Option<&'a mut [u8]> {
    if data.is_null() {
        let _ = error::set_invalid_argument(format!("{name} cannot be null"));
        return None;
    }

    // SAFETY: Pointer is non-null and the caller guarantees `len` writable bytes.
    Some(unsafe { std::slice::from_raw_parts_mut(data, len) })
}

/// Store `value` through an optional out-pointer.
///
/// # Safety
/// `ptr` must be null or valid for a write of `T`.
pub(crate) unsafe fn write_opt<T>(ptr: *mut T, value: T) {
    if ptr.is_null() {
        return;
    }
    // SAFETY: Pointer was checked for null; validity is guaranteed by the caller.
    unsafe {
        ptr.write(value);
    }
}
