//! Host driver for the IgorPlug-USB infrared receiver.
//!
//! igorplug reads infrared timecode diagrams from the receiver over USB
//! vendor control transfers, reassembles the device's ring buffer into
//! linear diagrams and suppresses messages it has already delivered.
//!
//! # Crate Structure
//!
//! - [`transport`] — USB control-transfer transport and device lifecycle
//! - [`stream`] — Header probing, chunked reads, repeat detection, linearization
//!
//! # Example
//!
//! ```no_run
//! use igorplug::stream::{Reassembler, MAX_BUFFER_SIZE};
//! use igorplug::transport::{UsbConfig, UsbTransport};
//!
//! let mut driver = Reassembler::new(UsbTransport::new(UsbConfig::default()));
//! let message = driver.fetch_message(MAX_BUFFER_SIZE)?;
//! if message.is_new {
//!     println!("{} bytes", message.diagram.len());
//! }
//! # Ok::<(), igorplug::stream::StreamError>(())
//! ```

/// Re-export transport types.
pub mod transport {
    pub use igorplug_transport::*;
}

/// Re-export stream types.
pub mod stream {
    pub use igorplug_stream::*;
}
