use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use igorplug_stream::{Reassembler, StreamError, MAX_BUFFER_SIZE};
use igorplug_transport::{UsbConfig, UsbTransport};
use tracing::{info, warn};

use crate::cmd::ListenArgs;
use crate::exit::{stream_error, CliError, CliResult, SUCCESS};
use crate::output::{print_message, OutputFormat};

pub fn run(args: ListenArgs, device: UsbConfig, format: OutputFormat) -> CliResult<i32> {
    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    info!(
        vendor_id = format_args!("{:04x}", device.vendor_id),
        product_id = format_args!("{:04x}", device.product_id),
        interval_ms = args.interval.as_millis() as u64,
        "listening"
    );

    let mut driver = Reassembler::new(UsbTransport::new(device));
    let mut printed = 0usize;
    let mut absent_since: Option<Instant> = None;

    while running.load(Ordering::SeqCst) {
        match driver.fetch_message(MAX_BUFFER_SIZE) {
            Ok(message) => {
                if let Some(since) = absent_since.take() {
                    info!(after_ms = since.elapsed().as_millis() as u64, "device back");
                }
                if message.is_new {
                    print_message(&message, format);
                    printed = printed.saturating_add(1);

                    if let Some(count) = args.count {
                        if printed >= count {
                            return Ok(SUCCESS);
                        }
                    }
                }
            }
            Err(err) if args.fail_fast => return Err(stream_error("read failed", err)),
            Err(StreamError::DeviceNotPresent) => {
                if absent_since.is_none() {
                    warn!("device not present, waiting for it to come back");
                    absent_since = Some(Instant::now());
                }
            }
            Err(err) => warn!(error = %err, "read failed"),
        }

        std::thread::sleep(args.interval);
    }

    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
