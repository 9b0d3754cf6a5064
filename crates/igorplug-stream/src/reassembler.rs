use bytes::Bytes;
use igorplug_transport::{ControlTransport, TransportError};
use tracing::{debug, warn};

use crate::codec::{linearize, Header, HEADER_LEN, MAX_BUFFER_SIZE};
use crate::error::{Result, StreamError};
use crate::request::{GET_INFRA_CODE, SET_INFRA_BUFFER_EMPTY};

/// Configuration for the reassembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig {
    /// Capacity of the local copy of the device buffer. Default: 256.
    pub buffer_capacity: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: MAX_BUFFER_SIZE,
        }
    }
}

/// Outcome of [`Reassembler::fetch_into`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fetched {
    /// Bytes written to the caller's buffer. Zero unless `is_new`.
    pub len: usize,
    /// Whether a message not delivered before was written.
    pub is_new: bool,
    /// Index of the message the device reported, if it reported one.
    pub message_index: Option<u8>,
}

impl Fetched {
    fn nothing() -> Self {
        Self {
            len: 0,
            is_new: false,
            message_index: None,
        }
    }
}

/// A linearized timecode diagram, as returned by [`Reassembler::fetch_message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// The diagram bytes. Empty unless `is_new`.
    pub diagram: Bytes,
    pub is_new: bool,
    pub message_index: Option<u8>,
}

enum BodyAbort {
    Absent,
    Failed,
    Overflow { requested: usize },
}

/// Pulls the device's circular buffer over control transfers and turns it
/// into linear diagrams, delivering each message index at most once.
///
/// The repeat-detection state lives here, so one reassembler should be kept
/// per device session. Calls must be serialized; `&mut self` enforces that
/// for Rust callers.
///
/// The index is a single byte. If the device wraps it while the host is not
/// polling, a new message can alias the last delivered index and be
/// suppressed as a repeat.
pub struct Reassembler<T> {
    transport: T,
    buf: Vec<u8>,
    config: StreamConfig,
    last_read: Option<u8>,
}

impl<T: ControlTransport> Reassembler<T> {
    /// Create a reassembler with default configuration.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, StreamConfig::default())
    }

    /// Create a reassembler with explicit configuration.
    pub fn with_config(transport: T, config: StreamConfig) -> Self {
        Self {
            transport,
            buf: vec![0; config.buffer_capacity],
            config,
            last_read: None,
        }
    }

    /// Fetch the latest message into a fresh buffer of `capacity` bytes.
    pub fn fetch_message(&mut self, capacity: usize) -> Result<Message> {
        let mut out = vec![0u8; capacity];
        let fetched = self.fetch_into(&mut out)?;
        out.truncate(fetched.len);
        Ok(Message {
            diagram: Bytes::from(out),
            is_new: fetched.is_new,
            message_index: fetched.message_index,
        })
    }

    /// Fetch the latest message into `out`.
    ///
    /// A short or empty header means "nothing buffered" and returns
    /// `len == 0` without rearming the device. Once a non-empty header is
    /// seen the device is always rearmed before returning, unless it turned
    /// out to be absent. On a repeated index `out` is left untouched.
    ///
    /// A failed rearm that reports the device absent wins over a
    /// successfully read message: the message is reported lost as
    /// [`StreamError::DeviceNotPresent`].
    pub fn fetch_into(&mut self, out: &mut [u8]) -> Result<Fetched> {
        let mut raw_header = [0u8; HEADER_LEN];
        let received = match self
            .transport
            .control_read(GET_INFRA_CODE, 0, 0, &mut raw_header)
        {
            Ok(n) => n,
            Err(err) if err.is_device_absent() => return Err(self.device_lost(&err)),
            Err(err) => return Err(StreamError::Transfer(err)),
        };

        let Some(header) = Header::decode(&raw_header[..received]) else {
            debug!(received, "short header, nothing buffered");
            return Ok(Fetched::nothing());
        };
        if header.is_empty() {
            return Ok(Fetched::nothing());
        }

        let length = usize::from(header.length);
        match self.read_body(length) {
            Ok(()) => {}
            Err(BodyAbort::Absent) => return Err(StreamError::DeviceNotPresent),
            Err(BodyAbort::Failed) => {
                self.last_read = None;
                self.clear_device_buffer()?;
                return Ok(Fetched::nothing());
            }
            Err(BodyAbort::Overflow { requested }) => {
                warn!(
                    requested,
                    capacity = self.buf.len(),
                    "buffer is too small, dropping message"
                );
                self.clear_device_buffer()?;
                return Err(StreamError::BufferTooSmall {
                    requested,
                    capacity: self.buf.len(),
                });
            }
        }

        let index = header.message_index;
        let fetched = if self.last_read != Some(index) {
            let raw = &self.buf[..length];
            match linearize(raw, usize::from(header.write_cursor), out) {
                Some(len) => {
                    debug!(index, len, "new message");
                    Fetched {
                        len,
                        is_new: true,
                        message_index: Some(index),
                    }
                }
                None => {
                    let capacity = out.len();
                    warn!(needed = length, capacity, "output too small, dropping message");
                    self.clear_device_buffer()?;
                    return Err(StreamError::OutputTooSmall {
                        needed: length,
                        capacity,
                    });
                }
            }
        } else {
            debug!(index, "repeated message");
            Fetched {
                len: 0,
                is_new: false,
                message_index: Some(index),
            }
        };
        self.last_read = Some(index);

        if let Err(err) = self.clear_device_buffer() {
            warn!(index, "device lost while rearming, dropping message");
            return Err(err);
        }
        Ok(fetched)
    }

    /// Tell the device to discard its buffer and start recording the next
    /// message.
    ///
    /// Only device absence is reported. Other transfer errors are swallowed:
    /// the device is cleared again on the next cycle anyway.
    pub fn clear_device_buffer(&mut self) -> Result<()> {
        let mut ack = [0u8; 1];
        match self
            .transport
            .control_read(SET_INFRA_BUFFER_EMPTY, 0, 0, &mut ack)
        {
            Ok(_) => Ok(()),
            Err(err) if err.is_device_absent() => Err(self.device_lost(&err)),
            Err(err) => {
                debug!(%err, "ignoring failed buffer clear");
                Ok(())
            }
        }
    }

    /// Forget the last delivered message index.
    pub fn reset(&mut self) {
        self.last_read = None;
    }

    /// Index of the last message delivered, or `None` before the first one
    /// and after the device was lost.
    pub fn last_read(&self) -> Option<u8> {
        self.last_read
    }

    /// Borrow the underlying transport.
    pub fn get_ref(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the underlying transport.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the reassembler and return the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Current reassembler configuration.
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    fn read_body(&mut self, length: usize) -> std::result::Result<(), BodyAbort> {
        self.buf.fill(0);

        let mut offset = 0usize;
        while offset < length {
            let remaining = length - offset;
            if offset + remaining > self.buf.len() {
                return Err(BodyAbort::Overflow {
                    requested: remaining,
                });
            }

            let value = u16::try_from(offset + HEADER_LEN).unwrap_or(u16::MAX);
            let chunk = &mut self.buf[offset..offset + remaining];
            match self.transport.control_read(GET_INFRA_CODE, value, 0, chunk) {
                Ok(0) => {
                    warn!(offset, remaining, "device returned no payload bytes");
                    return Err(BodyAbort::Failed);
                }
                Ok(n) => offset += n,
                Err(err) if err.is_device_absent() => {
                    self.device_lost(&err);
                    return Err(BodyAbort::Absent);
                }
                Err(err) => {
                    warn!(%err, offset, "payload read failed, rearming device");
                    return Err(BodyAbort::Failed);
                }
            }
        }
        Ok(())
    }

    fn device_lost(&mut self, err: &TransportError) -> StreamError {
        debug!(%err, "device not present");
        self.last_read = None;
        StreamError::DeviceNotPresent
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Reassembler<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reassembler")
            .field("transport", &self.transport)
            .field("config", &self.config)
            .field("last_read", &self.last_read)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use igorplug_transport::testing::{Request, ScriptedTransport};

    use super::*;

    fn header(length: u8, index: u8, cursor: u8) -> Vec<u8> {
        Header {
            length,
            message_index: index,
            write_cursor: cursor,
        }
        .encode()
        .to_vec()
    }

    /// Script one complete successful cycle: header, single body chunk, clear ack.
    fn script_message(t: &mut ScriptedTransport, index: u8, cursor: u8, body: &[u8]) {
        t.push_data(header(body.len() as u8, index, cursor))
            .push_data(body.to_vec())
            .push_data([0u8]);
    }

    fn probe() -> Request {
        Request {
            request: GET_INFRA_CODE,
            value: 0,
            index: 0,
            length: 3,
        }
    }

    fn clear() -> Request {
        Request {
            request: SET_INFRA_BUFFER_EMPTY,
            value: 0,
            index: 0,
            length: 1,
        }
    }

    #[test]
    fn new_message_is_linearized_at_cursor() {
        let mut t = ScriptedTransport::new();
        script_message(&mut t, 1, 2, b"abcde");

        let mut r = Reassembler::new(&mut t);
        let mut out = [0u8; MAX_BUFFER_SIZE];
        let fetched = r.fetch_into(&mut out).unwrap();

        assert!(fetched.is_new);
        assert_eq!(fetched.len, 5);
        assert_eq!(fetched.message_index, Some(1));
        assert_eq!(&out[..5], b"cdeab");
        assert_eq!(r.last_read(), Some(1));

        let body = Request {
            request: GET_INFRA_CODE,
            value: 3,
            index: 0,
            length: 5,
        };
        assert_eq!(t.requests(), &[probe(), body, clear()]);
    }

    #[test]
    fn cursor_zero_keeps_order() {
        let mut t = ScriptedTransport::new();
        script_message(&mut t, 4, 0, b"abcde");

        let mut r = Reassembler::new(&mut t);
        let msg = r.fetch_message(MAX_BUFFER_SIZE).unwrap();
        assert!(msg.is_new);
        assert_eq!(msg.diagram.as_ref(), b"abcde");
    }

    #[test]
    fn repeated_index_is_suppressed() {
        let mut t = ScriptedTransport::new();
        script_message(&mut t, 7, 1, b"abcd");
        script_message(&mut t, 7, 3, b"wxyz");

        let mut r = Reassembler::new(&mut t);
        let mut out = [0u8; 16];
        assert!(r.fetch_into(&mut out).unwrap().is_new);

        out.fill(0xAA);
        let second = r.fetch_into(&mut out).unwrap();
        assert!(!second.is_new);
        assert_eq!(second.len, 0);
        assert_eq!(second.message_index, Some(7));
        assert_eq!(out, [0xAA; 16]);
        assert_eq!(t.count(SET_INFRA_BUFFER_EMPTY), 2);
    }

    #[test]
    fn changed_index_is_new_again() {
        let mut t = ScriptedTransport::new();
        script_message(&mut t, 7, 0, b"ab");
        script_message(&mut t, 8, 1, b"xyz");

        let mut r = Reassembler::new(&mut t);
        assert!(r.fetch_message(16).unwrap().is_new);
        let msg = r.fetch_message(16).unwrap();
        assert!(msg.is_new);
        assert_eq!(msg.diagram.as_ref(), b"yzx");
        assert_eq!(r.last_read(), Some(8));
    }

    #[test]
    fn index_alias_after_wrap_is_suppressed() {
        let mut t = ScriptedTransport::new();
        script_message(&mut t, 5, 0, b"first");
        // 256 messages later the device reports index 5 again.
        script_message(&mut t, 5, 0, b"later");

        let mut r = Reassembler::new(&mut t);
        assert!(r.fetch_message(16).unwrap().is_new);
        assert!(!r.fetch_message(16).unwrap().is_new);
    }

    #[test]
    fn zero_length_issues_no_body_read() {
        let mut t = ScriptedTransport::new();
        t.push_data(header(0, 3, 0));

        let mut r = Reassembler::new(&mut t);
        let msg = r.fetch_message(16).unwrap();
        assert!(!msg.is_new);
        assert!(msg.diagram.is_empty());
        assert_eq!(msg.message_index, None);
        assert_eq!(r.last_read(), None);
        assert_eq!(t.requests(), &[probe()]);
    }

    #[test]
    fn short_header_means_nothing_available() {
        let mut t = ScriptedTransport::new();
        t.push_data([5u8, 1]);

        let mut r = Reassembler::new(&mut t);
        let fetched = r.fetch_into(&mut [0u8; 16]).unwrap();
        assert_eq!(fetched.len, 0);
        assert!(!fetched.is_new);
        assert_eq!(t.requests().len(), 1);
    }

    #[test]
    fn chunked_body_reassembles_like_single_read() {
        let body = b"0123456789";

        let mut single = ScriptedTransport::new();
        script_message(&mut single, 2, 6, body);
        let mut expected = [0u8; 16];
        Reassembler::new(&mut single).fetch_into(&mut expected).unwrap();

        let mut chunked = ScriptedTransport::new();
        chunked
            .push_data(header(10, 2, 6))
            .push_data(b"0123".to_vec())
            .push_data(b"456789".to_vec())
            .push_data([0u8]);
        let mut out = [0u8; 16];
        let fetched = Reassembler::new(&mut chunked).fetch_into(&mut out).unwrap();

        assert_eq!(fetched.len, 10);
        assert_eq!(out, expected);
        assert_eq!(&out[..10], b"6789012345");

        let body_reads: Vec<(u16, usize)> = chunked
            .requests()
            .iter()
            .filter(|r| r.request == GET_INFRA_CODE && r.value != 0)
            .map(|r| (r.value, r.length))
            .collect();
        assert_eq!(body_reads, vec![(3, 10), (7, 6)]);
    }

    #[test]
    fn byte_by_byte_body() {
        let mut t = ScriptedTransport::new();
        t.push_data(header(4, 9, 1));
        for b in b"wxyz" {
            t.push_data([*b]);
        }
        t.push_data([0u8]);

        let mut r = Reassembler::new(&mut t);
        let msg = r.fetch_message(8).unwrap();
        assert_eq!(msg.diagram.as_ref(), b"xyzw");
        assert_eq!(t.count(GET_INFRA_CODE), 5);
    }

    #[test]
    fn absent_on_probe_resets_state() {
        let mut t = ScriptedTransport::new();
        script_message(&mut t, 9, 0, b"abc");
        t.push_absent();
        script_message(&mut t, 9, 0, b"abc");

        let mut r = Reassembler::new(&mut t);
        assert!(r.fetch_message(8).unwrap().is_new);
        assert!(matches!(
            r.fetch_message(8),
            Err(StreamError::DeviceNotPresent)
        ));
        assert_eq!(r.last_read(), None);
        assert!(r.fetch_message(8).unwrap().is_new);
    }

    #[test]
    fn transfer_error_on_probe_keeps_state() {
        let mut t = ScriptedTransport::new();
        script_message(&mut t, 9, 0, b"abc");
        t.push_failure();
        script_message(&mut t, 9, 0, b"abc");

        let mut r = Reassembler::new(&mut t);
        assert!(r.fetch_message(8).unwrap().is_new);
        assert!(matches!(r.fetch_message(8), Err(StreamError::Transfer(_))));
        assert_eq!(r.last_read(), Some(9));
        assert!(!r.fetch_message(8).unwrap().is_new);
        assert_eq!(t.count(SET_INFRA_BUFFER_EMPTY), 2);
    }

    #[test]
    fn absent_during_body_resets_state_without_clear() {
        let mut t = ScriptedTransport::new();
        script_message(&mut t, 3, 0, b"abc");
        t.push_data(header(6, 3, 0))
            .push_data(b"ab".to_vec())
            .push_absent();
        script_message(&mut t, 3, 0, b"abc");

        let mut r = Reassembler::new(&mut t);
        assert!(r.fetch_message(8).unwrap().is_new);
        assert!(matches!(
            r.fetch_message(8),
            Err(StreamError::DeviceNotPresent)
        ));
        assert!(r.fetch_message(8).unwrap().is_new);
        assert_eq!(t.count(SET_INFRA_BUFFER_EMPTY), 2);
    }

    #[test]
    fn failure_during_body_rearms_and_reports_nothing() {
        let mut t = ScriptedTransport::new();
        t.push_data(header(6, 3, 0)).push_failure().push_data([0u8]);

        let mut r = Reassembler::new(&mut t);
        let fetched = r.fetch_into(&mut [0u8; 8]).unwrap();
        assert_eq!(fetched.len, 0);
        assert!(!fetched.is_new);
        assert_eq!(r.last_read(), None);
        assert_eq!(t.requests().last(), Some(&clear()));
        assert_eq!(t.count(SET_INFRA_BUFFER_EMPTY), 1);
    }

    #[test]
    fn failure_during_body_then_absent_clear() {
        let mut t = ScriptedTransport::new();
        t.push_data(header(6, 3, 0)).push_failure().push_absent();

        let mut r = Reassembler::new(&mut t);
        assert!(matches!(
            r.fetch_message(8),
            Err(StreamError::DeviceNotPresent)
        ));
    }

    #[test]
    fn empty_body_response_rearms() {
        let mut t = ScriptedTransport::new();
        t.push_data(header(4, 1, 0))
            .push_data(Vec::new())
            .push_data([0u8]);

        let mut r = Reassembler::new(&mut t);
        let msg = r.fetch_message(8).unwrap();
        assert!(!msg.is_new);
        assert_eq!(t.count(SET_INFRA_BUFFER_EMPTY), 1);
        assert_eq!(t.pending(), 0);
    }

    #[test]
    fn absent_clear_postempts_successful_read() {
        let mut t = ScriptedTransport::new();
        t.push_data(header(3, 1, 0))
            .push_data(b"abc".to_vec())
            .push_absent();
        script_message(&mut t, 1, 0, b"abc");

        let mut r = Reassembler::new(&mut t);
        assert!(matches!(
            r.fetch_message(8),
            Err(StreamError::DeviceNotPresent)
        ));
        assert_eq!(r.last_read(), None);
        assert!(r.fetch_message(8).unwrap().is_new);
    }

    #[test]
    fn failed_clear_is_swallowed() {
        let mut t = ScriptedTransport::new();
        t.push_data(header(3, 1, 0))
            .push_data(b"abc".to_vec())
            .push_failure();

        let mut r = Reassembler::new(&mut t);
        let msg = r.fetch_message(8).unwrap();
        assert!(msg.is_new);
        assert_eq!(msg.diagram.as_ref(), b"abc");
    }

    #[test]
    fn oversized_message_is_dropped_and_rearmed() {
        let mut t = ScriptedTransport::new();
        t.push_data(header(10, 1, 0)).push_data([0u8]);

        let cfg = StreamConfig { buffer_capacity: 4 };
        let mut r = Reassembler::with_config(&mut t, cfg);
        let err = r.fetch_message(16).unwrap_err();
        assert!(matches!(
            err,
            StreamError::BufferTooSmall {
                requested: 10,
                capacity: 4
            }
        ));
        assert_eq!(r.last_read(), None);
        assert_eq!(t.requests(), &[probe(), clear()]);
    }

    #[test]
    fn small_output_is_rejected_and_rearmed() {
        let mut t = ScriptedTransport::new();
        script_message(&mut t, 6, 0, b"abcde");
        script_message(&mut t, 6, 0, b"abcde");

        let mut r = Reassembler::new(&mut t);
        let mut small = [0u8; 3];
        let err = r.fetch_into(&mut small).unwrap_err();
        assert!(matches!(
            err,
            StreamError::OutputTooSmall {
                needed: 5,
                capacity: 3
            }
        ));
        assert_eq!(small, [0; 3]);
        assert_eq!(r.last_read(), None);
        assert_eq!(r.get_ref().count(SET_INFRA_BUFFER_EMPTY), 1);

        assert!(r.fetch_message(8).unwrap().is_new);
    }

    #[test]
    fn clear_device_buffer_reports_only_absence() {
        let mut t = ScriptedTransport::new();
        t.push_data([0u8]).push_failure().push_absent();

        let mut r = Reassembler::new(&mut t);
        assert!(r.clear_device_buffer().is_ok());
        assert!(r.clear_device_buffer().is_ok());
        assert!(matches!(
            r.clear_device_buffer(),
            Err(StreamError::DeviceNotPresent)
        ));
        assert!(t.requests().iter().all(|req| *req == clear()));
    }

    #[test]
    fn reset_and_accessors() {
        let mut t = ScriptedTransport::new();
        script_message(&mut t, 2, 0, b"ab");
        script_message(&mut t, 2, 0, b"ab");

        let mut r = Reassembler::new(t);
        assert_eq!(r.config().buffer_capacity, MAX_BUFFER_SIZE);
        assert!(r.fetch_message(4).unwrap().is_new);
        r.reset();
        assert_eq!(r.last_read(), None);
        assert!(r.fetch_message(4).unwrap().is_new);

        assert_eq!(r.get_ref().pending(), 0);
        r.get_mut().clear_requests();
        let t = r.into_inner();
        assert!(t.requests().is_empty());
    }
}
