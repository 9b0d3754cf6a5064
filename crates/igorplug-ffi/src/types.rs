/// Status codes returned by every exported function.
///
/// The first three values are the ones legacy IgorUSB callers compare
/// against.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgorResult {
    Ok = 0,
    DeviceNotPresent = 1,
    NotImplemented = 2,
    InvalidArgument = 3,
    Internal = 99,
}

#[allow(dead_code)]
pub const IGORUSB_NO_ERROR: IgorResult = IgorResult::Ok;
#[allow(dead_code)]
pub const IGORUSB_DEVICE_NOT_PRESENT: IgorResult = IgorResult::DeviceNotPresent;
#[allow(dead_code)]
pub const IGORUSB_NOT_IMPLEMENTED: IgorResult = IgorResult::NotImplemented;
#[allow(dead_code)]
pub const IGORUSB_ERR_INVALID_ARGUMENT: IgorResult = IgorResult::InvalidArgument;
#[allow(dead_code)]
pub const IGORUSB_ERR_INTERNAL: IgorResult = IgorResult::Internal;
