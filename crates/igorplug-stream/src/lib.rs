//! Circular-buffer reassembly of IgorPlug infrared timecode diagrams.
//!
//! This is the core of igorplug. The receiver records pulse timings into a
//! 256-byte ring buffer and describes it with a 3-byte header:
//! - total valid length
//! - current message index
//! - write cursor
//!
//! [`Reassembler`] probes the header, pulls the payload in as many control
//! reads as the device needs, suppresses messages it has already delivered,
//! rotates the ring so the diagram starts at its oldest byte, and rearms the
//! device for the next message.

pub mod codec;
pub mod error;
pub mod reassembler;
pub mod request;

pub use codec::{linearize, Header, HEADER_LEN, MAX_BUFFER_SIZE};
pub use error::{Result, StreamError};
pub use reassembler::{Fetched, Message, Reassembler, StreamConfig};
pub use request::{GET_INFRA_CODE, SET_INFRA_BUFFER_EMPTY};
