//! Scripted in-memory transport for driving the device protocol in tests.

use std::collections::VecDeque;

use nusb::transfer::TransferError;

use crate::error::{Result, TransportError};
use crate::traits::ControlTransport;

/// One canned device answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The device answers with these bytes (truncated to the request size).
    Data(Vec<u8>),
    /// The device is gone.
    Absent,
    /// The transfer fails while the device stays attached (e.g. a stall).
    Failure,
}

/// A control request as seen by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    pub request: u8,
    pub value: u16,
    pub index: u16,
    pub length: usize,
}

/// Replays queued [`Reply`] values in order and records every request.
///
/// Running out of replies panics: a test that issues more transfers than it
/// scripted has found a protocol bug.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: VecDeque<Reply>,
    requests: Vec<Request>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply.
    pub fn push_data(&mut self, bytes: impl Into<Vec<u8>>) -> &mut Self {
        self.replies.push_back(Reply::Data(bytes.into()));
        self
    }

    /// Queue a device-absent reply.
    pub fn push_absent(&mut self) -> &mut Self {
        self.replies.push_back(Reply::Absent);
        self
    }

    /// Queue a non-absent transfer failure.
    pub fn push_failure(&mut self) -> &mut Self {
        self.replies.push_back(Reply::Failure);
        self
    }

    /// Every request issued so far, oldest first.
    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    /// Number of issued requests with the given request code.
    pub fn count(&self, request: u8) -> usize {
        self.requests.iter().filter(|r| r.request == request).count()
    }

    /// Replies not consumed yet.
    pub fn pending(&self) -> usize {
        self.replies.len()
    }

    /// Forget recorded requests (queued replies are kept).
    pub fn clear_requests(&mut self) {
        self.requests.clear();
    }
}

impl ControlTransport for ScriptedTransport {
    fn control_read(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        buf: &mut [u8],
    ) -> Result<usize> {
        self.requests.push(Request {
            request,
            value,
            index,
            length: buf.len(),
        });

        match self.replies.pop_front() {
            Some(Reply::Data(data)) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                Ok(n)
            }
            Some(Reply::Absent) => Err(TransportError::Disconnected),
            Some(Reply::Failure) => Err(TransportError::Transfer(TransferError::Stall)),
            None => panic!("scripted transport exhausted at request {request:#04x} value {value}"),
        }
    }
}
