use igorplug_transport::{list_devices, DeviceSummary, UsbConfig, UsbTransport};
use serde::Serialize;

use crate::exit::{CliResult, HEALTH_CHECK_FAILED, SUCCESS};
use crate::output::OutputFormat;

#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Pass,
    Fail,
    Warn,
    Info,
    Skip,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    name: String,
    status: CheckStatus,
    detail: String,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DoctorOutput {
    checks: Vec<CheckResult>,
    overall: &'static str,
}

pub fn run(device: UsbConfig, format: OutputFormat) -> CliResult<i32> {
    let enumeration = list_devices(&device);

    let mut checks = vec![usb_enumeration_check(&enumeration)];
    checks.push(device_present_check(&device, &enumeration));
    checks.push(device_access_check(&device, &enumeration));
    checks.push(CheckResult::new(
        "transfer_timeout",
        CheckStatus::Info,
        format!("{}ms", device.timeout.as_millis()),
    ));
    checks.push(compiled_features_check());

    let output = summarize(checks);
    print_doctor(&output, format);

    if output.overall == "fail" {
        Ok(HEALTH_CHECK_FAILED)
    } else {
        Ok(SUCCESS)
    }
}

fn summarize(checks: Vec<CheckResult>) -> DoctorOutput {
    let has_fail = checks.iter().any(|c| matches!(c.status, CheckStatus::Fail));
    DoctorOutput {
        checks,
        overall: if has_fail { "fail" } else { "pass" },
    }
}

type Enumeration = igorplug_transport::Result<Vec<DeviceSummary>>;

fn usb_enumeration_check(enumeration: &Enumeration) -> CheckResult {
    match enumeration {
        Ok(_) => CheckResult::new(
            "usb_enumeration",
            CheckStatus::Pass,
            "USB device enumeration available",
        ),
        Err(err) => CheckResult::new("usb_enumeration", CheckStatus::Fail, err.to_string()),
    }
}

fn device_present_check(device: &UsbConfig, enumeration: &Enumeration) -> CheckResult {
    let id = format!("{:04x}:{:04x}", device.vendor_id, device.product_id);
    match enumeration {
        Ok(devices) if devices.is_empty() => CheckResult::new(
            "device_present",
            CheckStatus::Warn,
            format!("no {id} receiver attached"),
        ),
        Ok(devices) => CheckResult::new(
            "device_present",
            CheckStatus::Pass,
            format!("{} {id} receiver(s) attached", devices.len()),
        ),
        Err(_) => CheckResult::new(
            "device_present",
            CheckStatus::Skip,
            "USB enumeration unavailable",
        ),
    }
}

fn device_access_check(device: &UsbConfig, enumeration: &Enumeration) -> CheckResult {
    if !matches!(enumeration, Ok(devices) if !devices.is_empty()) {
        return CheckResult::new("device_access", CheckStatus::Skip, "no receiver to open");
    }

    let mut transport = UsbTransport::new(device.clone());
    match transport.open() {
        Ok(()) => {
            transport.close();
            CheckResult::new(
                "device_access",
                CheckStatus::Pass,
                format!("interface {} claimed", device.interface),
            )
        }
        Err(err) => CheckResult::new(
            "device_access",
            CheckStatus::Fail,
            format!("{err} (check device permissions)"),
        ),
    }
}

fn compiled_features_check() -> CheckResult {
    let mut features = Vec::new();
    if cfg!(feature = "cli") {
        features.push("cli");
    }

    CheckResult::new("compiled_features", CheckStatus::Info, features.join(", "))
}

fn print_doctor(output: &DoctorOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(output).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("igorplug doctor\n");
            for c in &output.checks {
                println!(
                    "  [{:>4}] {:<18} {}",
                    status_text(c.status),
                    c.name,
                    c.detail
                );
            }
            if output.overall == "pass" {
                println!("\n  Result: all checks passed");
            } else {
                println!("\n  Result: one or more checks failed");
            }
        }
        OutputFormat::Raw => {
            println!("{}", output.overall);
        }
    }
}

fn status_text(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass => "PASS",
        CheckStatus::Fail => "FAIL",
        CheckStatus::Warn => "WARN",
        CheckStatus::Info => "INFO",
        CheckStatus::Skip => "SKIP",
    }
}
