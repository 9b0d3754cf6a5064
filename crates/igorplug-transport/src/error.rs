/// Errors that can occur while talking to the device over USB.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// No attached device matches the configured vendor/product id.
    #[error("no device {vendor_id:04x}:{product_id:04x} attached")]
    DeviceNotFound { vendor_id: u16, product_id: u16 },

    /// The device went away while a transfer was in flight.
    #[error("device disconnected")]
    Disconnected,

    /// Enumerating, opening or claiming the device failed.
    #[error("failed to open device: {0}")]
    Open(#[source] nusb::Error),

    /// A control transfer failed for a reason other than device absence
    /// (stall, timeout, bus fault).
    #[error("control transfer failed: {0}")]
    Transfer(#[source] nusb::transfer::TransferError),
}

impl TransportError {
    /// Whether this error means the device is not reachable at all.
    ///
    /// Open failures count as absence: the driver cannot tell "unplugged"
    /// from "present but unusable" before it holds a handle.
    pub fn is_device_absent(&self) -> bool {
        matches!(
            self,
            TransportError::DeviceNotFound { .. }
                | TransportError::Disconnected
                | TransportError::Open(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
