// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Socket options as opaque key/value pairs
//!
//! The bridge does not interpret option semantics. It only knows which keys
//! exist, which value kind each one takes, and whether it can be read,
//! written, or both.

use crate::common::{TransportError, TransportResult};
use std::fmt;
use std::str::FromStr;

/// Recognized socket option keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocketOption {
    Affinity,
    Identity,
    Subscribe,
    Unsubscribe,
    Rate,
    RecoveryIvl,
    SndBuf,
    RcvBuf,
    Linger,
    ReconnectIvl,
    Backlog,
    ReconnectIvlMax,
    SndTimeo,
    RcvTimeo,
    SndHwm,
    RcvHwm,
    TcpKeepalive,
    TcpKeepaliveIdle,
    TcpKeepaliveCnt,
    TcpKeepaliveIntvl,
    /// Read-only: more frames of the current message are pending
    RcvMore,
}

/// Value kind an option takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Int,
    Bytes,
}

/// Option value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Int(i64),
    Bytes(Vec<u8>),
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for OptionValue {
    fn from(value: i32) -> Self {
        Self::Int(value as i64)
    }
}

impl From<&[u8]> for OptionValue {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(value.to_vec())
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Bytes(value.as_bytes().to_vec())
    }
}

impl OptionValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Bytes(_) => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Int(_) => None,
            Self::Bytes(v) => Some(v),
        }
    }
}

impl SocketOption {
    pub const ALL: [SocketOption; 21] = [
        Self::Affinity,
        Self::Identity,
        Self::Subscribe,
        Self::Unsubscribe,
        Self::Rate,
        Self::RecoveryIvl,
        Self::SndBuf,
        Self::RcvBuf,
        Self::Linger,
        Self::ReconnectIvl,
        Self::Backlog,
        Self::ReconnectIvlMax,
        Self::SndTimeo,
        Self::RcvTimeo,
        Self::SndHwm,
        Self::RcvHwm,
        Self::TcpKeepalive,
        Self::TcpKeepaliveIdle,
        Self::TcpKeepaliveCnt,
        Self::TcpKeepaliveIntvl,
        Self::RcvMore,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Affinity => "ZMQ_AFFINITY",
            Self::Identity => "ZMQ_IDENTITY",
            Self::Subscribe => "ZMQ_SUBSCRIBE",
            Self::Unsubscribe => "ZMQ_UNSUBSCRIBE",
            Self::Rate => "ZMQ_RATE",
            Self::RecoveryIvl => "ZMQ_RECOVERY_IVL",
            Self::SndBuf => "ZMQ_SNDBUF",
            Self::RcvBuf => "ZMQ_RCVBUF",
            Self::Linger => "ZMQ_LINGER",
            Self::ReconnectIvl => "ZMQ_RECONNECT_IVL",
            Self::Backlog => "ZMQ_BACKLOG",
            Self::ReconnectIvlMax => "ZMQ_RECONNECT_IVL_MAX",
            Self::SndTimeo => "ZMQ_SNDTIMEO",
            Self::RcvTimeo => "ZMQ_RCVTIMEO",
            Self::SndHwm => "ZMQ_SNDHWM",
            Self::RcvHwm => "ZMQ_RCVHWM",
            Self::TcpKeepalive => "ZMQ_TCP_KEEPALIVE",
            Self::TcpKeepaliveIdle => "ZMQ_TCP_KEEPALIVE_IDLE",
            Self::TcpKeepaliveCnt => "ZMQ_TCP_KEEPALIVE_CNT",
            Self::TcpKeepaliveIntvl => "ZMQ_TCP_KEEPALIVE_INTVL",
            Self::RcvMore => "ZMQ_RCVMORE",
        }
    }

    pub fn kind(&self) -> OptionKind {
        match self {
            Self::Identity | Self::Subscribe | Self::Unsubscribe => OptionKind::Bytes,
            _ => OptionKind::Int,
        }
    }

    pub fn is_readable(&self) -> bool {
        !matches!(self, Self::Subscribe | Self::Unsubscribe)
    }

    pub fn is_writable(&self) -> bool {
        !matches!(self, Self::RcvMore)
    }

    /// Apply `value` to `socket`
    pub(crate) fn apply(&self, socket: &zmq::Socket, value: &OptionValue) -> TransportResult<()> {
        if !self.is_writable() {
            return Err(TransportError::invalid_argument(format!(
                "{} is read-only",
                self
            )));
        }

        match (self.kind(), value) {
            (OptionKind::Bytes, OptionValue::Bytes(bytes)) => match self {
                Self::Identity => socket.set_identity(bytes)?,
                Self::Subscribe => socket.set_subscribe(bytes)?,
                Self::Unsubscribe => socket.set_unsubscribe(bytes)?,
                _ => unreachable!("bytes-valued options are listed above"),
            },
            (OptionKind::Int, OptionValue::Int(v)) => {
                if *self == Self::Affinity {
                    let mask = u64::try_from(*v).map_err(|_| {
                        TransportError::invalid_argument(format!(
                            "{} must be a non-negative bitmask, got {}",
                            self, v
                        ))
                    })?;
                    socket.set_affinity(mask)?;
                } else {
                    let v = i32::try_from(*v).map_err(|_| {
                        TransportError::invalid_argument(format!(
                            "{} value {} does not fit in a 32-bit integer",
                            self, v
                        ))
                    })?;
                    self.apply_int(socket, v)?;
                }
            }
            (kind, _) => {
                return Err(TransportError::invalid_argument(format!(
                    "{} expects a {} value",
                    self,
                    match kind {
                        OptionKind::Int => "integer",
                        OptionKind::Bytes => "byte string",
                    }
                )))
            }
        }

        Ok(())
    }

    fn apply_int(&self, socket: &zmq::Socket, v: i32) -> zmq::Result<()> {
        match self {
            Self::Rate => socket.set_rate(v),
            Self::RecoveryIvl => socket.set_recovery_ivl(v),
            Self::SndBuf => socket.set_sndbuf(v),
            Self::RcvBuf => socket.set_rcvbuf(v),
            Self::Linger => socket.set_linger(v),
            Self::ReconnectIvl => socket.set_reconnect_ivl(v),
            Self::Backlog => socket.set_backlog(v),
            Self::ReconnectIvlMax => socket.set_reconnect_ivl_max(v),
            Self::SndTimeo => socket.set_sndtimeo(v),
            Self::RcvTimeo => socket.set_rcvtimeo(v),
            Self::SndHwm => socket.set_sndhwm(v),
            Self::RcvHwm => socket.set_rcvhwm(v),
            Self::TcpKeepalive => socket.set_tcp_keepalive(v),
            Self::TcpKeepaliveIdle => socket.set_tcp_keepalive_idle(v),
            Self::TcpKeepaliveCnt => socket.set_tcp_keepalive_cnt(v),
            Self::TcpKeepaliveIntvl => socket.set_tcp_keepalive_intvl(v),
            Self::Affinity
            | Self::Identity
            | Self::Subscribe
            | Self::Unsubscribe
            | Self::RcvMore => unreachable!("handled before integer dispatch"),
        }
    }

    /// Read the current value from `socket`
    pub(crate) fn read(&self, socket: &zmq::Socket) -> TransportResult<OptionValue> {
        if !self.is_readable() {
            return Err(TransportError::invalid_argument(format!(
                "{} is write-only",
                self
            )));
        }

        let value = match self {
            Self::Affinity => {
                let mask = socket.get_affinity()?;
                OptionValue::Int(i64::try_from(mask).unwrap_or(i64::MAX))
            }
            Self::Identity => OptionValue::Bytes(socket.get_identity()?),
            Self::RcvMore => OptionValue::Int(socket.get_rcvmore()? as i64),
            Self::Rate => OptionValue::Int(socket.get_rate()? as i64),
            Self::RecoveryIvl => OptionValue::Int(socket.get_recovery_ivl()? as i64),
            Self::SndBuf => OptionValue::Int(socket.get_sndbuf()? as i64),
            Self::RcvBuf => OptionValue::Int(socket.get_rcvbuf()? as i64),
            Self::Linger => OptionValue::Int(socket.get_linger()? as i64),
            Self::ReconnectIvl => OptionValue::Int(socket.get_reconnect_ivl()? as i64),
            Self::Backlog => OptionValue::Int(socket.get_backlog()? as i64),
            Self::ReconnectIvlMax => OptionValue::Int(socket.get_reconnect_ivl_max()? as i64),
            Self::SndTimeo => OptionValue::Int(socket.get_sndtimeo()? as i64),
            Self::RcvTimeo => OptionValue::Int(socket.get_rcvtimeo()? as i64),
            Self::SndHwm => OptionValue::Int(socket.get_sndhwm()? as i64),
            Self::RcvHwm => OptionValue::Int(socket.get_rcvhwm()? as i64),
            Self::TcpKeepalive => OptionValue::Int(socket.get_tcp_keepalive()? as i64),
            Self::TcpKeepaliveIdle => OptionValue::Int(socket.get_tcp_keepalive_idle()? as i64),
            Self::TcpKeepaliveCnt => OptionValue::Int(socket.get_tcp_keepalive_cnt()? as i64),
            Self::TcpKeepaliveIntvl => {
                OptionValue::Int(socket.get_tcp_keepalive_intvl()? as i64)
            }
            Self::Subscribe | Self::Unsubscribe => unreachable!("write-only options rejected above"),
        };

        Ok(value)
    }
}

impl fmt::Display for SocketOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SocketOption {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let bare = upper.strip_prefix("ZMQ_").unwrap_or(&upper);
        Self::ALL
            .iter()
            .copied()
            .find(|option| &option.name()[4..] == bare)
            .ok_or_else(|| TransportError::invalid_argument(format!("socket option not found: {}", s)))
    }
}
