use crate::error::Result;

/// A device that answers vendor IN control transfers.
///
/// One call is one bounded, time-limited request/response exchange. The
/// returned count may be smaller than `buf.len()`; it is never larger.
/// Implementations report device absence through
/// [`TransportError::is_device_absent`](crate::TransportError::is_device_absent)
/// so callers can tell "unplugged" from "this transfer failed".
pub trait ControlTransport {
    /// Issue vendor request `request` with `wValue = value`, `wIndex = index`,
    /// asking for up to `buf.len()` bytes.
    fn control_read(&mut self, request: u8, value: u16, index: u16, buf: &mut [u8])
        -> Result<usize>;
}

impl<T: ControlTransport + ?Sized> ControlTransport for &mut T {
    fn control_read(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        buf: &mut [u8],
    ) -> Result<usize> {
        (**self).control_read(request, value, index, buf)
    }
}

impl<T: ControlTransport + ?Sized> ControlTransport for Box<T> {
    fn control_read(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        buf: &mut [u8],
    ) -> Result<usize> {
        (**self).control_read(request, value, index, buf)
    }
}
