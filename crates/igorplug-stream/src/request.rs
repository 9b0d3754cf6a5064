//! Vendor request codes understood by the IgorPlug-USB firmware.
//!
//! All requests are vendor-class, device-recipient, direction IN.

/// Discard the buffered message so the device starts recording the next one.
pub const SET_INFRA_BUFFER_EMPTY: u8 = 0x01;

/// Read the header record (`wValue` = 0) or payload bytes
/// (`wValue` = offset + header length).
pub const GET_INFRA_CODE: u8 = 0x02;
