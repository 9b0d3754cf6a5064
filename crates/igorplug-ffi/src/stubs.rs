//! Device functions the IgorPlug-USB firmware does not provide.
//!
//! They exist so legacy callers link and get a definite answer: every one
//! returns [`IgorResult::NotImplemented`] and zeroes its out-parameter.

use std::os::raw::c_int;

use crate::args;
use crate::types::IgorResult;

fn not_implemented(name: &str) -> IgorResult {
    tracing::debug!(function = name, "not implemented");
    IgorResult::NotImplemented
}

#[no_mangle]
#[allow(non_snake_case)]
pub extern "system" fn DoSetDataPortDirection(_direction_byte: u8) -> IgorResult {
    crate::ffi_boundary(IgorResult::Internal, || not_implemented("DoSetDataPortDirection"))
}

/// # Safety
/// `data_direction_byte` must be null or writable.
#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "system" fn DoGetDataPortDirection(data_direction_byte: *mut u8) -> IgorResult {
    crate::ffi_boundary(IgorResult::Internal, || {
        // SAFETY: The caller guarantees the pointer is null or writable.
        unsafe { args::write_opt(data_direction_byte, 0) };
        not_implemented("DoGetDataPortDirection")
    })
}

#[no_mangle]
#[allow(non_snake_case)]
pub extern "system" fn DoSetOutDataPort(_data_out_byte: u8) -> IgorResult {
    crate::ffi_boundary(IgorResult::Internal, || not_implemented("DoSetOutDataPort"))
}

/// # Safety
/// `data_out_byte` must be null or writable.
#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "system" fn DoGetOutDataPort(data_out_byte: *mut u8) -> IgorResult {
    crate::ffi_boundary(IgorResult::Internal, || {
        // SAFETY: The caller guarantees the pointer is null or writable.
        unsafe { args::write_opt(data_out_byte, 0) };
        not_implemented("DoGetOutDataPort")
    })
}

/// # Safety
/// `data_in_byte` must be null or writable.
#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "system" fn DoGetInDataPort(data_in_byte: *mut u8) -> IgorResult {
    crate::ffi_boundary(IgorResult::Internal, || {
        // SAFETY: The caller guarantees the pointer is null or writable.
        unsafe { args::write_opt(data_in_byte, 0) };
        not_implemented("DoGetInDataPort")
    })
}

/// # Safety
/// `data_in_byte` must be null or writable.
#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "system" fn DoEEPROMRead(_address: u8, data_in_byte: *mut u8) -> IgorResult {
    crate::ffi_boundary(IgorResult::Internal, || {
        // SAFETY: The caller guarantees the pointer is null or writable.
        unsafe { args::write_opt(data_in_byte, 0) };
        not_implemented("DoEEPROMRead")
    })
}

#[no_mangle]
#[allow(non_snake_case)]
pub extern "system" fn DoEEPROMWrite(_address: u8, _data_out_byte: u8) -> IgorResult {
    crate::ffi_boundary(IgorResult::Internal, || not_implemented("DoEEPROMWrite"))
}

#[no_mangle]
#[allow(non_snake_case)]
pub extern "system" fn DoRS232Send(_data_out_byte: u8) -> IgorResult {
    crate::ffi_boundary(IgorResult::Internal, || not_implemented("DoRS232Send"))
}

/// # Safety
/// `data_in_byte` must be null or writable.
#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "system" fn DoRS232Read(data_in_byte: *mut u8) -> IgorResult {
    crate::ffi_boundary(IgorResult::Internal, || {
        // SAFETY: The caller guarantees the pointer is null or writable.
        unsafe { args::write_opt(data_in_byte, 0) };
        not_implemented("DoRS232Read")
    })
}

#[no_mangle]
#[allow(non_snake_case)]
pub extern "system" fn DoSetRS232Baud(_baud_rate: c_int) -> IgorResult {
    crate::ffi_boundary(IgorResult::Internal, || not_implemented("DoSetRS232Baud"))
}

/// # Safety
/// `baud_rate` must be null or writable.
#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "system" fn DoGetRS232Baud(baud_rate: *mut c_int) -> IgorResult {
    crate::ffi_boundary(IgorResult::Internal, || {
        // SAFETY: The caller guarantees the pointer is null or writable.
        unsafe { args::write_opt(baud_rate, 0) };
        not_implemented("DoGetRS232Baud")
    })
}
