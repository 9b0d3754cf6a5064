use std::time::Duration;

use clap::{Args, Subcommand};
use igorplug_transport::UsbConfig;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod clear;
pub mod doctor;
pub mod info;
pub mod listen;
pub mod read;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch the buffered infrared message once.
    Read,
    /// Poll the receiver and print every new message.
    Listen(ListenArgs),
    /// Discard the message buffered on the device.
    Clear,
    /// List attached receivers matching the vendor/product id.
    Info,
    /// Run local environment health checks.
    Doctor,
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, device: UsbConfig, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Read => read::run(device, format),
        Command::Listen(args) => listen::run(args, device, format),
        Command::Clear => clear::run(device, format),
        Command::Info => info::run(device, format),
        Command::Doctor => doctor::run(device, format),
        Command::Version(args) => version::run(args),
    }
}

/// Device selection shared by every subcommand.
#[derive(Args, Debug)]
pub struct DeviceArgs {
    /// USB vendor id (hex with 0x prefix, or decimal).
    #[arg(long, global = true, env = "IGORPLUG_VID", default_value = "0x03eb", value_parser = parse_usb_id)]
    pub vid: u16,
    /// USB product id (hex with 0x prefix, or decimal).
    #[arg(long, global = true, env = "IGORPLUG_PID", default_value = "0x0002", value_parser = parse_usb_id)]
    pub pid: u16,
    /// Per-transfer timeout (e.g. 500ms, 2s).
    #[arg(long, global = true, env = "IGORPLUG_TIMEOUT", default_value = "500ms", value_parser = parse_duration)]
    pub timeout: Duration,
}

impl DeviceArgs {
    pub fn usb_config(&self) -> UsbConfig {
        UsbConfig {
            vendor_id: self.vid,
            product_id: self.pid,
            timeout: self.timeout,
            ..UsbConfig::default()
        }
    }
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Delay between polls (e.g. 100ms, 1s).
    #[arg(long, default_value = "100ms", value_parser = parse_duration)]
    pub interval: Duration,
    /// Exit after printing N new messages.
    #[arg(long)]
    pub count: Option<usize>,
    /// Exit on the first error instead of logging it and polling on.
    #[arg(long)]
    pub fail_fast: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse a USB id given as `0x03eb` or `1003`.
pub fn parse_usb_id(input: &str) -> Result<u16, String> {
    let input = input.trim();
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => input.parse(),
    };
    parsed.map_err(|_| format!("invalid USB id: {input}"))
}

/// Parse a duration given as `500ms`, `2s` or a bare number of seconds.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("duration must not be empty".to_string());
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| format!("invalid duration: {input}"))?;
    if value == 0 {
        return Err("duration must be greater than zero".to_string());
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
