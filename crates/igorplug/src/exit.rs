use std::fmt;

use igorplug_stream::StreamError;
use igorplug_transport::{TransferError, TransportError};

// Exit codes. 69 follows sysexits(3) EX_UNAVAILABLE; usage errors exit 2 via clap.
pub const SUCCESS: i32 = 0;
pub const TRANSPORT_ERROR: i32 = 3;
pub const HEALTH_CHECK_FAILED: i32 = 30;
pub const DATA_INVALID: i32 = 60;
pub const DEVICE_NOT_PRESENT: i32 = 69;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    let code = match &err {
        err if err.is_device_absent() => DEVICE_NOT_PRESENT,
        // nusb cancels a control transfer whose timeout elapsed.
        TransportError::Transfer(TransferError::Cancelled) => TIMEOUT,
        _ => TRANSPORT_ERROR,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn stream_error(context: &str, err: StreamError) -> CliError {
    match err {
        StreamError::DeviceNotPresent => {
            CliError::new(DEVICE_NOT_PRESENT, format!("{context}: {err}"))
        }
        StreamError::Transfer(err) => transport_error(context, err),
        StreamError::BufferTooSmall { .. } | StreamError::OutputTooSmall { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
    }
}
