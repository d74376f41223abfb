//! Message types moved across sockets

use serde::{Deserialize, Serialize};

/// A single received frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Frame payload
    pub data: Vec<u8>,

    /// More frames of the same logical message follow this one
    pub more: bool,
}

impl Message {
    /// Create a final (single-frame) message
    pub fn new(data: Vec<u8>) -> Self {
        Self { data, more: false }
    }

    /// Get message size in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

impl From<Vec<u8>> for Message {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl From<&[u8]> for Message {
    fn from(data: &[u8]) -> Self {
        Self::new(data.to_vec())
    }
}

/// Multipart message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartMessage {
    /// Message parts
    pub parts: Vec<Vec<u8>>,
}

impl MultipartMessage {
    /// Create a new multipart message
    pub fn new() -> Self {
        Self { parts: Vec::new() }
    }

    /// Add a part
    pub fn add_part(mut self, part: impl Into<Vec<u8>>) -> Self {
        self.parts.push(part.into());
        self
    }

    /// Get number of parts
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Get total size in bytes
    pub fn total_size(&self) -> usize {
        self.parts.iter().map(|p| p.len()).sum()
    }
}

impl From<Vec<Vec<u8>>> for MultipartMessage {
    fn from(parts: Vec<Vec<u8>>) -> Self {
        Self { parts }
    }
}
