//! Process-wide driver facade.
//!
//! Legacy callers hold no handle: every export talks to "the" receiver.
//! One reassembler lives behind a mutex so calls from several threads are
//! serialized and the repeat-detection state survives between calls.

use std::sync::{Mutex, PoisonError};

use igorplug_stream::Reassembler;
use igorplug_transport::{UsbConfig, UsbTransport};
use tracing::debug;

static DRIVER: Mutex<Option<Reassembler<UsbTransport>>> = Mutex::new(None);

/// Run `f` against the process-wide reassembler, creating it on first use.
///
/// A poisoned lock is recovered: the reassembler is consistent between
/// transfers, and a panic mid-transfer at worst leaves the device closed.
pub(crate) fn with_driver<R>(f: impl FnOnce(&mut Reassembler<UsbTransport>) -> R) -> R {
    let mut guard = DRIVER.lock().unwrap_or_else(PoisonError::into_inner);
    let driver = guard.get_or_insert_with(|| {
        debug!("creating IgorPlug driver");
        Reassembler::new(UsbTransport::new(UsbConfig::default()))
    });
    f(driver)
}

/// Drop the process-wide reassembler, closing the device.
pub(crate) fn close() {
    let mut guard = DRIVER.lock().unwrap_or_else(PoisonError::into_inner);
    if guard.take().is_some() {
        debug!("closed IgorPlug driver");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_is_created_lazily_and_closed() {
        close();
        let open = with_driver(|driver| driver.get_ref().is_open());
        assert!(!open);
        let last = with_driver(|driver| driver.last_read());
        assert_eq!(last, None);
        close();
    }
}
