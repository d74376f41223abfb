//! Common types shared by sockets, polling and the collector

pub mod config;
pub mod error;
pub mod message;

pub use config::{CollectorConfig, ContextConfig, PollConfig, DEFAULT_CANCEL_CHECK_INTERVAL};
pub use error::{EndpointOperation, TransportError, TransportResult};
pub use message::{Message, MultipartMessage};
