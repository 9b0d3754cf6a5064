//! igorplug-ffi: IgorUSB-compatible C-ABI exports.
//!
//! Drop-in replacement for the legacy `IgorUSB` library: the same exported
//! names and calling convention (`stdcall` on 32-bit Windows), backed by the
//! igorplug reassembler and a process-wide, mutex-serialized device handle.

mod args;
mod driver;
mod error;
mod infra;
mod stubs;
mod types;

use std::panic::AssertUnwindSafe;

pub use infra::{DoGetInfraCode, DoSetInfraBufferEmpty};
pub use stubs::{
    DoEEPROMRead, DoEEPROMWrite, DoGetDataPortDirection, DoGetInDataPort, DoGetOutDataPort,
    DoGetRS232Baud, DoRS232Read, DoRS232Send, DoSetDataPortDirection, DoSetOutDataPort,
    DoSetRS232Baud,
};
pub use types::{
    IgorResult, IGORUSB_DEVICE_NOT_PRESENT, IGORUSB_ERR_INTERNAL, IGORUSB_ERR_INVALID_ARGUMENT,
    IGORUSB_NOT_IMPLEMENTED, IGORUSB_NO_ERROR,
};

fn ffi_boundary<T>(on_panic: T, f: impl FnOnce() -> T) -> T {
    match std::panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(_) => {
            error::set_panic_error();
            on_panic
        }
    }
}

/// Close the device and forget the last delivered message.
///
/// The next `DoGetInfraCode` reopens the device on demand.
#[no_mangle]
pub extern "system" fn igor_close() {
    ffi_boundary((), || {
        error::clear_error_state();
        driver::close();
    });
}

/// Detail for the most recent failure on this thread, as a NUL-terminated
/// string. Empty when the last call succeeded.
#[no_mangle]
pub extern "system" fn igor_last_error() -> *const std::os::raw::c_char {
    ffi_boundary(std::ptr::null(), error::last_error_ptr)
}
