use std::os::raw::c_int;

use igorplug_stream::{Reassembler, StreamError, MAX_BUFFER_SIZE};
use igorplug_transport::ControlTransport;
use tracing::warn;

use crate::args;
use crate::driver;
use crate::error;
use crate::types::IgorResult;

/// Fetch the latest diagram into `out`, returning the status and the number
/// of bytes written (zero for "nothing new").
pub(crate) fn get_infra_code<T: ControlTransport>(
    driver: &mut Reassembler<T>,
    out: &mut [u8],
) -> (IgorResult, usize) {
    match driver.fetch_into(out) {
        Ok(fetched) => (IgorResult::Ok, fetched.len),
        Err(err) => {
            match &err {
                // Reported as absent, so the next sighting must count as new.
                StreamError::Transfer(_) => driver.reset(),
                StreamError::OutputTooSmall { needed, capacity } => warn!(
                    needed,
                    capacity,
                    "diagram dropped: the capacity passed to DoGetInfraCode is smaller than the message"
                ),
                _ => {}
            }
            (error::map_stream_error(&err), 0)
        }
    }
}

pub(crate) fn set_infra_buffer_empty<T: ControlTransport>(
    driver: &mut Reassembler<T>,
) -> IgorResult {
    match driver.clear_device_buffer() {
        Ok(()) => IgorResult::Ok,
        Err(err) => error::map_stream_error(&err),
    }
}

/// Read the latest timecode diagram.
///
/// `capacity` is the size of `time_code_diagram` in bytes. Values `<= 0`
/// mean the caller predates the bounds check; the buffer is then assumed to
/// hold the device maximum of 256 bytes. `diagram_length` receives the
/// number of bytes written, or 0 when no new message arrived; it may be null.
///
/// # Safety
/// `time_code_diagram` must be non-null and writable for the capacity
/// described above. `diagram_length` must be null or writable.
#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "system" fn DoGetInfraCode(
    time_code_diagram: *mut u8,
    capacity: c_int,
    diagram_length: *mut c_int,
) -> IgorResult {
    crate::ffi_boundary(IgorResult::Internal, || {
        error::clear_error_state();

        // SAFETY: The caller guarantees `diagram_length` is null or writable.
        unsafe { args::write_opt(diagram_length, 0) };

        let capacity = usize::try_from(capacity)
            .ok()
            .filter(|&c| c > 0)
            .unwrap_or(MAX_BUFFER_SIZE);
        let out = {
            // SAFETY: We validate null in the helper; the caller guarantees `capacity` bytes.
            match unsafe { args::out_bytes_arg(time_code_diagram, capacity, "time_code_diagram") } {
                Some(out) => out,
                None => return IgorResult::InvalidArgument,
            }
        };

        let (result, len) = driver::with_driver(|driver| get_infra_code(driver, out));
        let len = c_int::try_from(len).unwrap_or(c_int::MAX);
        // SAFETY: The caller guarantees `diagram_length` is null or writable.
        unsafe { args::write_opt(diagram_length, len) };
        result
    })
}

/// Discard the device's buffered message and rearm it.
#[no_mangle]
#[allow(non_snake_case)]
pub extern "system" fn DoSetInfraBufferEmpty() -> IgorResult {
    crate::ffi_boundary(IgorResult::Internal, || {
        error::clear_error_state();
        driver::with_driver(set_infra_buffer_empty)
    })
}
