use igorplug_transport::TransportError;

/// Errors that can occur while fetching a message from the device.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The device vanished or was never found. Repeat-detection state has
    /// been reset.
    #[error("device not present")]
    DeviceNotPresent,

    /// The header probe failed for a reason other than device absence.
    #[error("transfer error: {0}")]
    Transfer(#[source] TransportError),

    /// The device announced more payload than the local buffer holds. The
    /// message was dropped and the device rearmed.
    #[error("device buffer too small ({requested} bytes requested, capacity {capacity})")]
    BufferTooSmall { requested: usize, capacity: usize },

    /// The caller's output buffer cannot hold the diagram. The message was
    /// dropped and the device rearmed.
    #[error("output buffer too small ({needed} bytes needed, capacity {capacity})")]
    OutputTooSmall { needed: usize, capacity: usize },
}

pub type Result<T> = std::result::Result<T, StreamError>;
