//! Response definitions
//!
//! Reply records produced by the store, and the status-tagged response sent
//! to clients.

use crate::error::ListError;

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    ListNotFound = 0x01,
    EmptyList = 0x02,
    IndexOutOfRange = 0x03,
    InvalidListId = 0x04,
    Error = 0x05,
}

impl Status {
    /// Parse a status byte
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Status::Ok),
            0x01 => Some(Status::ListNotFound),
            0x02 => Some(Status::EmptyList),
            0x03 => Some(Status::IndexOutOfRange),
            0x04 => Some(Status::InvalidListId),
            0x05 => Some(Status::Error),
            _ => None,
        }
    }
}

// =============================================================================
// Reply records
// =============================================================================

/// Reply to Append
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendReply {
    pub success: bool,
}

/// Reply to Get
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetReply {
    pub value: i64,
}

/// Reply to Remove
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveReply {
    pub value: i64,
}

/// Reply to Size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeReply {
    pub size: i32,
}

/// Reply to any command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Append(AppendReply),
    Get(GetReply),
    Remove(RemoveReply),
    Size(SizeReply),
    Pong,
}

// =============================================================================
// Wire response
// =============================================================================

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Optional payload (reply body for OK, details otherwise)
    pub payload: Option<Vec<u8>>,
}

impl Response {
    /// Create an OK response with optional payload
    pub fn ok(payload: Option<Vec<u8>>) -> Self {
        Self {
            status: Status::Ok,
            payload,
        }
    }

    /// Create an ERROR response
    pub fn error(message: &str) -> Self {
        Self {
            status: Status::Error,
            payload: Some(message.as_bytes().to_vec()),
        }
    }

    /// OK response carrying an encoded reply
    ///
    /// - Append: 1 byte success flag
    /// - Get/Remove: i64 (BE)
    /// - Size: i32 (BE)
    /// - Pong: `PONG`
    pub fn from_reply(reply: &Reply) -> Self {
        let payload = match reply {
            Reply::Append(r) => vec![r.success as u8],
            Reply::Get(r) => r.value.to_be_bytes().to_vec(),
            Reply::Remove(r) => r.value.to_be_bytes().to_vec(),
            Reply::Size(r) => r.size.to_be_bytes().to_vec(),
            Reply::Pong => b"PONG".to_vec(),
        };
        Self::ok(Some(payload))
    }

    /// Response describing a failed command
    ///
    /// Caller-level errors get their own status so the client can rebuild
    /// the same `ListError`. Everything else becomes ERROR + message.
    pub fn from_error(error: &ListError) -> Self {
        let (status, payload) = match error {
            ListError::ListNotFound(id) => (Status::ListNotFound, id.as_bytes().to_vec()),
            ListError::EmptyList(id) => (Status::EmptyList, id.as_bytes().to_vec()),
            ListError::InvalidListId(id) => (Status::InvalidListId, id.as_bytes().to_vec()),
            ListError::IndexOutOfRange { index, size } => {
                let mut payload = Vec::with_capacity(8);
                payload.extend_from_slice(&index.to_be_bytes());
                payload.extend_from_slice(&size.to_be_bytes());
                (Status::IndexOutOfRange, payload)
            }
            other => (Status::Error, other.to_string().into_bytes()),
        };

        Self {
            status,
            payload: Some(payload),
        }
    }

    /// Payload bytes, empty if none
    pub fn payload_bytes(&self) -> &[u8] {
        self.payload.as_deref().unwrap_or(&[])
    }
}
