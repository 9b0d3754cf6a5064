//! USB control-transfer transport for the IgorPlug infrared receiver.
//!
//! This is the lowest layer of igorplug. It knows how to find the receiver,
//! keep a handle to it, and run one bounded vendor IN control transfer at a
//! time. Everything above it talks to the [`ControlTransport`] trait, so the
//! device protocol can be exercised against [`testing::ScriptedTransport`]
//! (feature `testing`) without hardware.

pub mod error;
pub mod traits;
pub mod usb;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{Result, TransportError};
pub use nusb::transfer::TransferError;
pub use traits::ControlTransport;
pub use usb::{
    list_devices, DeviceSummary, UsbConfig, UsbTransport, DEFAULT_TIMEOUT, DEVICE_IGORPLUG,
    VENDOR_ATMEL,
};
