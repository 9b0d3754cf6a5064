use igorplug_stream::{Reassembler, MAX_BUFFER_SIZE};
use igorplug_transport::{UsbConfig, UsbTransport};
use tracing::debug;

use crate::exit::{stream_error, CliResult, SUCCESS};
use crate::output::{print_message, OutputFormat};

pub fn run(device: UsbConfig, format: OutputFormat) -> CliResult<i32> {
    let mut driver = Reassembler::new(UsbTransport::new(device));

    let message = driver
        .fetch_message(MAX_BUFFER_SIZE)
        .map_err(|err| stream_error("read failed", err))?;

    debug!(
        is_new = message.is_new,
        len = message.diagram.len(),
        "fetched message"
    );
    print_message(&message, format);
    Ok(SUCCESS)
}
