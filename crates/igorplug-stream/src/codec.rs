/// Header record: length (1) + message index (1) + write cursor (1) = 3 bytes.
pub const HEADER_LEN: usize = 3;

/// Size of the device-side circular buffer.
pub const MAX_BUFFER_SIZE: usize = 256;

/// The device's summary of its current circular buffer.
///
/// Wire format:
/// ```text
/// ┌────────────┬───────────────┬──────────────┐
/// │ Length     │ Message index │ Write cursor │
/// │ (1B)       │ (1B)          │ (1B)         │
/// └────────────┴───────────────┴──────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Number of valid payload bytes. Zero means no message.
    pub length: u8,
    /// Changes whenever the device records a new message.
    pub message_index: u8,
    /// Offset one past the most recently written byte, i.e. the oldest
    /// valid byte once the buffer has wrapped.
    pub write_cursor: u8,
}

impl Header {
    /// Decode a header from exactly [`HEADER_LEN`] bytes.
    ///
    /// Returns `None` for any other length; the device answers short when it
    /// has nothing to report.
    pub fn decode(src: &[u8]) -> Option<Self> {
        match src {
            &[length, message_index, write_cursor] => Some(Self {
                length,
                message_index,
                write_cursor,
            }),
            _ => None,
        }
    }

    /// Encode the header into its wire form.
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        [self.length, self.message_index, self.write_cursor]
    }

    /// Whether the device has no message buffered.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Offset of the oldest byte within the `length` valid payload bytes.
    pub fn start_offset(&self) -> usize {
        if self.length == 0 {
            return 0;
        }
        usize::from(self.write_cursor) % usize::from(self.length)
    }
}

/// Copy the circular buffer `raw` into `out`, starting at `write_cursor`
/// and wrapping around: `raw[c..] ++ raw[..c]` with `c = write_cursor % raw.len()`.
///
/// Returns the number of bytes written (`raw.len()`), or `None` without
/// touching `out` when it is shorter than `raw`.
pub fn linearize(raw: &[u8], write_cursor: usize, out: &mut [u8]) -> Option<usize> {
    let len = raw.len();
    if out.len() < len {
        return None;
    }
    if len == 0 {
        return Some(0);
    }

    let (head, tail) = raw.split_at(write_cursor % len);
    out[..tail.len()].copy_from_slice(tail);
    out[tail.len()..len].copy_from_slice(head);
    Some(len)
}
