use igorplug_stream::Reassembler;
use igorplug_transport::{UsbConfig, UsbTransport};
use serde::Serialize;

use crate::exit::{stream_error, CliResult, SUCCESS};
use crate::output::OutputFormat;

#[derive(Serialize)]
struct ClearOutput {
    vendor_id: String,
    product_id: String,
    cleared: bool,
}

pub fn run(device: UsbConfig, format: OutputFormat) -> CliResult<i32> {
    let out = ClearOutput {
        vendor_id: format!("{:04x}", device.vendor_id),
        product_id: format!("{:04x}", device.product_id),
        cleared: true,
    };

    Reassembler::new(UsbTransport::new(device))
        .clear_device_buffer()
        .map_err(|err| stream_error("clear failed", err))?;

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
        ),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("cleared {}:{}", out.vendor_id, out.product_id);
        }
        OutputFormat::Raw => {}
    }
    Ok(SUCCESS)
}
