// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Common error types for the transport bridge

/// Result type alias for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// Transport operation that touches an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointOperation {
    Bind,
    Connect,
    Disconnect,
}

impl std::fmt::Display for EndpointOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bind => write!(f, "bind"),
            Self::Connect => write!(f, "connect"),
            Self::Disconnect => write!(f, "disconnect"),
        }
    }
}

/// Error type shared by sockets, the poll multiplexer and the collector
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Wrong shape or value of an input (unknown pattern/option/interest name,
    /// mismatched list lengths, bad timeout, wrong option value kind)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The socket or context handle refers to a closed or terminated resource
    #[error("Invalid handle: {0}")]
    HandleInvalid(String),

    /// Bind/connect/disconnect failed at the transport level
    #[error("Failed to {operation} {endpoint}: {source}")]
    ConnectionFailure {
        operation: EndpointOperation,
        endpoint: String,
        #[source]
        source: zmq::Error,
    },

    /// Non-blocking operation had nothing to do
    #[error("Operation would block")]
    WouldBlock,

    /// A blocking wait was aborted by cooperative cancellation
    #[error("Operation interrupted by cancellation before any events were available")]
    Interrupted,

    /// Typed receive got a payload of the wrong size
    #[error("Protocol error: expected {expected} bytes, got {actual}")]
    Protocol { expected: usize, actual: usize },

    /// Payload could not be decoded
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// Failed to send message
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// Failed to receive message
    #[error("Receive failed: {0}")]
    ReceiveFailed(String),

    /// Any other transport-specific error
    #[error("ZMQ error: {0}")]
    Zmq(zmq::Error),

    /// I/O error (thread spawn and friends)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("Error: {0}")]
    Other(String),
}

impl TransportError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub(crate) fn endpoint(operation: EndpointOperation, endpoint: &str, err: zmq::Error) -> Self {
        match err {
            zmq::Error::ETERM => Self::HandleInvalid(format!(
                "cannot {} {}: context was terminated",
                operation, endpoint
            )),
            source => Self::ConnectionFailure {
                operation,
                endpoint: endpoint.to_string(),
                source,
            },
        }
    }

    /// True for the "nothing to do" outcome of a non-blocking operation
    pub fn is_would_block(&self) -> bool {
        matches!(self, Self::WouldBlock)
    }
}

impl From<zmq::Error> for TransportError {
    fn from(err: zmq::Error) -> Self {
        match err {
            zmq::Error::EAGAIN => Self::WouldBlock,
            zmq::Error::ETERM => Self::HandleInvalid(
                "the socket's associated context was terminated".to_string(),
            ),
            zmq::Error::ENOTSOCK => Self::HandleInvalid("not a valid socket".to_string()),
            zmq::Error::EFAULT => Self::InvalidArgument("invalid item array".to_string()),
            zmq::Error::EINVAL => Self::InvalidArgument(err.message().to_string()),
            _ => Self::Zmq(err),
        }
    }
}

impl From<String> for TransportError {
    fn from(msg: String) -> Self {
        Self::Other(msg)
    }
}

impl From<&str> for TransportError {
    fn from(msg: &str) -> Self {
        Self::Other(msg.to_string())
    }
}
