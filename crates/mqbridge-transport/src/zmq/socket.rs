// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Socket pass-through
//!
//! Thin wrapper over a `zmq::Socket` that validates its owning context before
//! every operation and reports "nothing to do" outcomes of non-blocking calls
//! as `false`/`None` instead of errors.

use super::context::ContextInner;
use super::option::{OptionValue, SocketOption};
use super::pattern::SocketPattern;
use crate::common::{
    EndpointOperation, Message, MultipartMessage, TransportError, TransportResult,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A single communication endpoint of one fixed pattern
///
/// `Send` but not `Sync`: a socket may move between threads but is used by
/// one thread at a time.
pub struct Socket {
    raw: zmq::Socket,
    pattern: SocketPattern,
    context: Arc<ContextInner>,
}

impl Socket {
    pub(crate) fn new(raw: zmq::Socket, pattern: SocketPattern, context: Arc<ContextInner>) -> Self {
        Self {
            raw,
            pattern,
            context,
        }
    }

    pub fn pattern(&self) -> SocketPattern {
        self.pattern
    }

    /// Identifier of the owning context
    pub fn context_id(&self) -> u64 {
        self.context.id()
    }

    /// Borrow the raw socket after checking the owning context is open
    pub(crate) fn checked(&self) -> TransportResult<&zmq::Socket> {
        self.context.ensure_open()?;
        Ok(&self.raw)
    }

    pub fn bind(&self, endpoint: &str) -> TransportResult<()> {
        self.checked()?
            .bind(endpoint)
            .map_err(|e| TransportError::endpoint(EndpointOperation::Bind, endpoint, e))?;
        info!("[SOCKET] {} listening on {}", self.pattern, endpoint);
        Ok(())
    }

    pub fn connect(&self, endpoint: &str) -> TransportResult<()> {
        self.checked()?
            .connect(endpoint)
            .map_err(|e| TransportError::endpoint(EndpointOperation::Connect, endpoint, e))?;
        info!("[SOCKET] {} connected to {}", self.pattern, endpoint);
        Ok(())
    }

    pub fn disconnect(&self, endpoint: &str) -> TransportResult<()> {
        self.checked()?
            .disconnect(endpoint)
            .map_err(|e| TransportError::endpoint(EndpointOperation::Disconnect, endpoint, e))?;
        debug!("[SOCKET] {} disconnected from {}", self.pattern, endpoint);
        Ok(())
    }

    /// Send one frame; `more` marks it as part of a multi-frame message
    ///
    /// Returns `Ok(false)` when the transport could not accept the frame
    /// before its send timeout expired.
    pub fn send(&self, data: &[u8], more: bool) -> TransportResult<bool> {
        let flags = if more { zmq::SNDMORE } else { 0 };
        self.send_with_flags(data, flags)
    }

    /// Like [`send`](Self::send) but never blocks
    pub fn try_send(&self, data: &[u8], more: bool) -> TransportResult<bool> {
        let flags = if more { zmq::SNDMORE } else { 0 };
        self.send_with_flags(data, flags | zmq::DONTWAIT)
    }

    fn send_with_flags(&self, data: &[u8], flags: i32) -> TransportResult<bool> {
        match self.checked()?.send(data, flags) {
            Ok(()) => Ok(true),
            Err(zmq::Error::EAGAIN) => {
                debug!("[SOCKET] {} send would block", self.pattern);
                Ok(false)
            }
            Err(e) => {
                warn!("[SOCKET] {} send failed: {}", self.pattern, e);
                Err(match TransportError::from(e) {
                    TransportError::Zmq(e) => TransportError::SendFailed(e.to_string()),
                    other => other,
                })
            }
        }
    }

    /// Send a zero-length frame
    pub fn send_empty(&self, more: bool) -> TransportResult<bool> {
        self.send(&[], more)
    }

    /// Send UTF-8 text as one frame (no terminator)
    pub fn send_str(&self, text: &str, more: bool) -> TransportResult<bool> {
        self.send(text.as_bytes(), more)
    }

    /// Send every part of `msg`, flagging all but the last with "more"
    pub fn send_multipart(&self, msg: &MultipartMessage) -> TransportResult<bool> {
        if msg.is_empty() {
            return Err(TransportError::invalid_argument(
                "multipart message has no parts",
            ));
        }

        let last = msg.len() - 1;
        for (i, part) in msg.parts.iter().enumerate() {
            if !self.send(part, i < last)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Receive one frame
    ///
    /// `Ok(None)` means no data was available (non-blocking receive, or the
    /// receive timeout expired). A zero-length frame is `Ok(Some(vec![]))`.
    pub fn receive(&self, non_blocking: bool) -> TransportResult<Option<Vec<u8>>> {
        let flags = if non_blocking { zmq::DONTWAIT } else { 0 };
        match self.checked()?.recv_bytes(flags) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(zmq::Error::EAGAIN) => Ok(None),
            Err(e) => {
                warn!("[SOCKET] {} receive failed: {}", self.pattern, e);
                Err(match TransportError::from(e) {
                    TransportError::Zmq(e) => TransportError::ReceiveFailed(e.to_string()),
                    other => other,
                })
            }
        }
    }

    /// Blocking receive that treats "no data" as a failure
    fn receive_required(&self) -> TransportResult<Vec<u8>> {
        self.receive(false)?.ok_or_else(|| {
            TransportError::ReceiveFailed("receive timed out before a frame arrived".to_string())
        })
    }

    /// Receive one frame along with its "more frames follow" flag
    pub fn receive_message(&self, non_blocking: bool) -> TransportResult<Option<Message>> {
        match self.receive(non_blocking)? {
            Some(data) => Ok(Some(Message {
                data,
                more: self.has_more()?,
            })),
            None => Ok(None),
        }
    }

    /// Receive every frame of the next logical message
    pub fn receive_multipart(&self) -> TransportResult<MultipartMessage> {
        let mut msg = MultipartMessage::new();
        loop {
            msg.parts.push(self.receive_required()?);
            if !self.has_more()? {
                break;
            }
        }
        Ok(msg)
    }

    /// True if the last received frame is followed by more frames
    pub fn has_more(&self) -> TransportResult<bool> {
        Ok(self.checked()?.get_rcvmore()?)
    }

    /// Receive a frame and report whether it was zero-length
    pub fn receive_empty(&self) -> TransportResult<bool> {
        Ok(self.receive_required()?.is_empty())
    }

    /// Receive a UTF-8 text frame
    pub fn receive_string(&self) -> TransportResult<String> {
        let bytes = self.receive_required()?;
        String::from_utf8(bytes)
            .map_err(|e| TransportError::InvalidMessage(format!("frame is not UTF-8: {}", e)))
    }

    /// Receive a native-endian 32-bit integer
    pub fn receive_i32(&self) -> TransportResult<i32> {
        let bytes = self.receive_required()?;
        let raw = fixed_size::<4>(&bytes)?;
        Ok(i32::from_ne_bytes(raw))
    }

    /// Receive a native-endian 64-bit float
    pub fn receive_f64(&self) -> TransportResult<f64> {
        let bytes = self.receive_required()?;
        let raw = fixed_size::<8>(&bytes)?;
        Ok(f64::from_ne_bytes(raw))
    }

    pub fn set_option(&self, option: SocketOption, value: impl Into<OptionValue>) -> TransportResult<()> {
        let value = value.into();
        option.apply(self.checked()?, &value)?;
        debug!("[SOCKET] {} set {} = {:?}", self.pattern, option, value);
        Ok(())
    }

    pub fn get_option(&self, option: SocketOption) -> TransportResult<OptionValue> {
        option.read(self.checked()?)
    }

    /// Set an option by name, e.g. `"ZMQ_LINGER"`
    pub fn set_option_by_name(&self, name: &str, value: impl Into<OptionValue>) -> TransportResult<()> {
        self.set_option(name.parse()?, value)
    }

    /// Get an option by name, e.g. `"ZMQ_SNDTIMEO"`
    pub fn get_option_by_name(&self, name: &str) -> TransportResult<OptionValue> {
        self.get_option(name.parse()?)
    }

    /// Close the socket, releasing its transport resource
    pub fn close(self) {
        debug!("[SOCKET] Closing {} socket", self.pattern);
    }
}

impl std::fmt::Debug for Socket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Socket")
            .field("pattern", &self.pattern)
            .field("context", &self.context.id())
            .finish()
    }
}

fn fixed_size<const N: usize>(bytes: &[u8]) -> TransportResult<[u8; N]> {
    bytes.try_into().map_err(|_| TransportError::Protocol {
        expected: N,
        actual: bytes.len(),
    })
}
