use std::time::Duration;

use nusb::transfer::{ControlIn, ControlType, Recipient, TransferError};
use nusb::MaybeFuture;
use tracing::{debug, info, warn};

use crate::error::{Result, TransportError};
use crate::traits::ControlTransport;

/// Atmel vendor id used by the IgorPlug-USB firmware.
pub const VENDOR_ATMEL: u16 = 0x03eb;

/// Product id of the IgorPlug-USB receiver.
pub const DEVICE_IGORPLUG: u16 = 0x0002;

/// Per-transfer timeout used by the legacy driver.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

/// Which device to open and how long a single transfer may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsbConfig {
    /// USB vendor id to match. Default: `0x03eb`.
    pub vendor_id: u16,
    /// USB product id to match. Default: `0x0002`.
    pub product_id: u16,
    /// Interface number claimed for control transfers. Default: 0.
    pub interface: u8,
    /// Timeout applied to every control transfer. Default: 500ms.
    pub timeout: Duration,
}

impl Default for UsbConfig {
    fn default() -> Self {
        Self {
            vendor_id: VENDOR_ATMEL,
            product_id: DEVICE_IGORPLUG,
            interface: 0,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// One attached device matching a [`UsbConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSummary {
    pub bus_id: String,
    pub address: u8,
    pub vendor_id: u16,
    pub product_id: u16,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub serial_number: Option<String>,
}

/// List attached devices matching the configured vendor/product id.
pub fn list_devices(config: &UsbConfig) -> Result<Vec<DeviceSummary>> {
    let devices = nusb::list_devices()
        .wait()
        .map_err(TransportError::Open)?
        .filter(|d| d.vendor_id() == config.vendor_id && d.product_id() == config.product_id)
        .map(|d| DeviceSummary {
            bus_id: d.bus_id().to_string(),
            address: d.device_address(),
            vendor_id: d.vendor_id(),
            product_id: d.product_id(),
            manufacturer: d.manufacturer_string().map(str::to_string),
            product: d.product_string().map(str::to_string),
            serial_number: d.serial_number().map(str::to_string),
        })
        .collect();
    Ok(devices)
}

struct OpenDevice {
    #[allow(dead_code)] // Kept so the device handle outlives the claimed interface
    device: nusb::Device,
    interface: nusb::Interface,
}

/// Control-transfer transport backed by `nusb`.
///
/// The device is opened lazily on the first transfer and closed again after
/// any failed transfer, so the next call transparently reopens it (the
/// receiver is routinely unplugged and replugged while a host app runs).
pub struct UsbTransport {
    config: UsbConfig,
    handle: Option<OpenDevice>,
}

impl UsbTransport {
    /// Create a transport for the configured device without touching the bus.
    pub fn new(config: UsbConfig) -> Self {
        Self {
            config,
            handle: None,
        }
    }

    /// Open the device if it is not open yet.
    pub fn open(&mut self) -> Result<()> {
        if self.handle.is_some() {
            return Ok(());
        }

        let dev_info = nusb::list_devices()
            .wait()
            .map_err(TransportError::Open)?
            .find(|d| {
                d.vendor_id() == self.config.vendor_id && d.product_id() == self.config.product_id
            })
            .ok_or(TransportError::DeviceNotFound {
                vendor_id: self.config.vendor_id,
                product_id: self.config.product_id,
            })?;

        let device = dev_info.open().wait().map_err(TransportError::Open)?;
        let interface = device
            .detach_and_claim_interface(self.config.interface)
            .wait()
            .map_err(TransportError::Open)?;

        info!(
            bus = dev_info.bus_id(),
            address = dev_info.device_address(),
            "found IgorPlug-USB device"
        );
        self.handle = Some(OpenDevice { device, interface });
        Ok(())
    }

    /// Make sure a device handle is held, opening one on demand.
    ///
    /// Idempotent. Returns `false` when no matching device could be opened.
    pub fn ensure_open(&mut self) -> bool {
        match self.open() {
            Ok(()) => true,
            Err(err) => {
                debug!(%err, "device not available");
                false
            }
        }
    }

    /// Drop the device handle. The next transfer reopens it.
    pub fn close(&mut self) {
        if self.handle.take().is_some() {
            debug!("closed IgorPlug-USB device");
        }
    }

    /// Whether a device handle is currently held.
    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Active transport configuration.
    pub fn config(&self) -> &UsbConfig {
        &self.config
    }
}

impl ControlTransport for UsbTransport {
    fn control_read(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        buf: &mut [u8],
    ) -> Result<usize> {
        self.open()?;
        let Some(handle) = self.handle.as_ref() else {
            return Err(TransportError::DeviceNotFound {
                vendor_id: self.config.vendor_id,
                product_id: self.config.product_id,
            });
        };

        let length = u16::try_from(buf.len()).unwrap_or(u16::MAX);
        let result = handle
            .interface
            .control_in(
                ControlIn {
                    control_type: ControlType::Vendor,
                    recipient: Recipient::Device,
                    request,
                    value,
                    index,
                    length,
                },
                self.config.timeout,
            )
            .wait();

        match result {
            Ok(data) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                debug!(request, value, requested = buf.len(), received = n, "control read");
                Ok(n)
            }
            Err(err) => {
                warn!(%err, request, value, "control transfer failed");
                self.close();
                Err(match err {
                    TransferError::Disconnected => TransportError::Disconnected,
                    other => TransportError::Transfer(other),
                })
            }
        }
    }
}

impl std::fmt::Debug for UsbTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsbTransport")
            .field("vendor_id", &format_args!("{:04x}", self.config.vendor_id))
            .field("product_id", &format_args!("{:04x}", self.config.product_id))
            .field("open", &self.is_open())
            .finish()
    }
}
