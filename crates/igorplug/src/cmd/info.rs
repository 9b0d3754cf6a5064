use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use igorplug_transport::{list_devices, DeviceSummary, UsbConfig};
use serde::Serialize;

use crate::exit::{CliError, CliResult, DEVICE_NOT_PRESENT, SUCCESS, TRANSPORT_ERROR};
use crate::output::OutputFormat;

#[derive(Serialize)]
struct DeviceInfo {
    bus_id: String,
    address: u8,
    vendor_id: String,
    product_id: String,
    manufacturer: Option<String>,
    product: Option<String>,
    serial_number: Option<String>,
}

impl From<DeviceSummary> for DeviceInfo {
    fn from(d: DeviceSummary) -> Self {
        Self {
            bus_id: d.bus_id,
            address: d.address,
            vendor_id: format!("{:04x}", d.vendor_id),
            product_id: format!("{:04x}", d.product_id),
            manufacturer: d.manufacturer,
            product: d.product,
            serial_number: d.serial_number,
        }
    }
}

#[derive(Serialize)]
struct InfoOutput {
    vendor_id: String,
    product_id: String,
    devices: Vec<DeviceInfo>,
}

pub fn run(device: UsbConfig, format: OutputFormat) -> CliResult<i32> {
    let devices = list_devices(&device)
        .map_err(|err| CliError::new(TRANSPORT_ERROR, format!("enumeration failed: {err}")))?;

    let out = InfoOutput {
        vendor_id: format!("{:04x}", device.vendor_id),
        product_id: format!("{:04x}", device.product_id),
        devices: devices.into_iter().map(DeviceInfo::from).collect(),
    };

    print_info(&out, format);

    if out.devices.is_empty() {
        return Err(CliError::new(
            DEVICE_NOT_PRESENT,
            format!("no device {}:{} attached", out.vendor_id, out.product_id),
        ));
    }
    Ok(SUCCESS)
}

fn print_info(out: &InfoOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["BUS", "ADDR", "ID", "MANUFACTURER", "PRODUCT", "SERIAL"]);
            for d in &out.devices {
                table.add_row(vec![
                    d.bus_id.clone(),
                    d.address.to_string(),
                    format!("{}:{}", d.vendor_id, d.product_id),
                    d.manufacturer.clone().unwrap_or_default(),
                    d.product.clone().unwrap_or_default(),
                    d.serial_number.clone().unwrap_or_default(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("Devices matching {}:{}:", out.vendor_id, out.product_id);
            if out.devices.is_empty() {
                println!("  (none)");
            }
            for d in &out.devices {
                println!(
                    "  bus {} addr {:>3}  {} {}",
                    d.bus_id,
                    d.address,
                    d.manufacturer.as_deref().unwrap_or("?"),
                    d.product.as_deref().unwrap_or("?")
                );
            }
        }
        OutputFormat::Raw => {
            for d in &out.devices {
                println!("{}:{}", d.bus_id, d.address);
            }
        }
    }
}
