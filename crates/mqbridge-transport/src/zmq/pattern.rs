// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Socket communication patterns

use crate::common::TransportError;
use std::fmt;
use std::str::FromStr;

/// Communication pattern of a socket, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocketPattern {
    Pair,
    Pub,
    Sub,
    Req,
    Rep,
    Dealer,
    Router,
    Pull,
    Push,
    XPub,
    XSub,
    /// Legacy name of DEALER
    XReq,
    /// Legacy name of ROUTER
    XRep,
}

impl SocketPattern {
    pub const ALL: [SocketPattern; 13] = [
        Self::Pair,
        Self::Pub,
        Self::Sub,
        Self::Req,
        Self::Rep,
        Self::Dealer,
        Self::Router,
        Self::Pull,
        Self::Push,
        Self::XPub,
        Self::XSub,
        Self::XReq,
        Self::XRep,
    ];

    /// Canonical name as accepted by [`FromStr`]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pair => "ZMQ_PAIR",
            Self::Pub => "ZMQ_PUB",
            Self::Sub => "ZMQ_SUB",
            Self::Req => "ZMQ_REQ",
            Self::Rep => "ZMQ_REP",
            Self::Dealer => "ZMQ_DEALER",
            Self::Router => "ZMQ_ROUTER",
            Self::Pull => "ZMQ_PULL",
            Self::Push => "ZMQ_PUSH",
            Self::XPub => "ZMQ_XPUB",
            Self::XSub => "ZMQ_XSUB",
            Self::XReq => "ZMQ_XREQ",
            Self::XRep => "ZMQ_XREP",
        }
    }

    pub(crate) fn socket_type(&self) -> zmq::SocketType {
        match self {
            Self::Pair => zmq::PAIR,
            Self::Pub => zmq::PUB,
            Self::Sub => zmq::SUB,
            Self::Req => zmq::REQ,
            Self::Rep => zmq::REP,
            Self::Dealer | Self::XReq => zmq::DEALER,
            Self::Router | Self::XRep => zmq::ROUTER,
            Self::Pull => zmq::PULL,
            Self::Push => zmq::PUSH,
            Self::XPub => zmq::XPUB,
            Self::XSub => zmq::XSUB,
        }
    }
}

impl fmt::Display for SocketPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SocketPattern {
    type Err = TransportError;

    /// Accepts `ZMQ_PULL`, `PULL` or `pull`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let bare = upper.strip_prefix("ZMQ_").unwrap_or(&upper);
        Self::ALL
            .iter()
            .copied()
            .find(|pattern| &pattern.name()[4..] == bare)
            .ok_or_else(|| TransportError::invalid_argument(format!("socket type not found: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("ZMQ_PULL".parse::<SocketPattern>().unwrap(), SocketPattern::Pull);
        assert_eq!("router".parse::<SocketPattern>().unwrap(), SocketPattern::Router);
        assert_eq!("XReq".parse::<SocketPattern>().unwrap(), SocketPattern::XReq);
        for pattern in SocketPattern::ALL {
            assert_eq!(pattern.name().parse::<SocketPattern>().unwrap(), pattern);
        }
    }

    #[test]
    fn test_unknown_pattern_rejected() {
        let err = "ZMQ_STREAMER".parse::<SocketPattern>().unwrap_err();
        assert!(matches!(err, TransportError::InvalidArgument(_)));
        assert!("".parse::<SocketPattern>().is_err());
    }

    #[test]
    fn test_legacy_aliases() {
        assert_eq!(SocketPattern::XReq.socket_type(), zmq::DEALER);
        assert_eq!(SocketPattern::XRep.socket_type(), zmq::ROUTER);
    }
}
