use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;

use igorplug_stream::StreamError;

use crate::types::IgorResult;

thread_local! {
    static LAST_ERROR: RefCell<CString> = RefCell::new(CString::default());
}

pub(crate) fn clear_error_state() {
    LAST_ERROR.with(|state| {
        *state.borrow_mut() = CString::default();
    });
}

pub(crate) fn set_error_message(message: impl Into<String>) {
    let message = message.into();
    let sanitized = message.replace('\0', "?");
    LAST_ERROR.with(|state| {
        *state.borrow_mut() = CString::new(sanitized).unwrap_or_default();
    });
}

pub(crate) fn set_invalid_argument(message: impl Into<String>) -> IgorResult {
    set_error_message(message);
    IgorResult::InvalidArgument
}

pub(crate) fn set_panic_error() {
    set_error_message("panic across FFI boundary");
}

/// Map a fetch failure onto the legacy status codes.
///
/// Legacy callers only distinguish "present" from "not present", so a failed
/// header probe reads as absent, and a dropped oversized message reads as
/// "no new data". The detail is kept for [`crate::igor_last_error`].
pub(crate) fn map_stream_error(err: &StreamError) -> IgorResult {
    set_error_message(err.to_string());
    match err {
        StreamError::DeviceNotPresent | StreamError::Transfer(_) => IgorResult::DeviceNotPresent,
        StreamError::BufferTooSmall { .. } | StreamError::OutputTooSmall { .. } => IgorResult::Ok,
    }
}

pub(crate) fn last_error_ptr() -> *const c_char {
    LAST_ERROR.with(|state| state.borrow().as_ptr())
}

#[cfg(test)]
mod tests {
    use std::ffi::CStr;

    use super::*;

    fn last_error() -> String {
        // SAFETY: last_error_ptr points to the thread-local CString, alive for this thread.
        unsafe { CStr::from_ptr(last_error_ptr()) }
            .to_string_lossy()
            .into_owned()
    }

    #[test]
    fn messages_are_sanitized() {
        set_error_message("bad\0byte");
        assert_eq!(last_error(), "bad?byte");
        clear_error_state();
        assert!(last_error().is_empty());
    }

    #[test]
    fn stream_errors_map_to_legacy_codes() {
        assert_eq!(
            map_stream_error(&StreamError::DeviceNotPresent),
            IgorResult::DeviceNotPresent
        );
        assert_eq!(
            map_stream_error(&StreamError::BufferTooSmall {
                requested: 300,
                capacity: 256
            }),
            IgorResult::Ok
        );
        assert!(last_error().contains("buffer too small"));
        assert_eq!(
            map_stream_error(&StreamError::OutputTooSmall {
                needed: 8,
                capacity: 4
            }),
            IgorResult::Ok
        );
    }
}
