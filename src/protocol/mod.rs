//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format (V1 - Simple Binary)
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Commands
//! - 0x01: APPEND - Payload: id_len (4) + id + value (i64)
//! - 0x02: GET    - Payload: id_len (4) + id + index (i32)
//! - 0x03: REMOVE - Payload: id_len (4) + id
//! - 0x04: SIZE   - Payload: id_len (4) + id
//! - 0x05: PING   - Payload: empty
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Status Codes
//! - 0x00: OK
//! - 0x01: LIST_NOT_FOUND
//! - 0x02: EMPTY_LIST
//! - 0x03: INDEX_OUT_OF_RANGE
//! - 0x04: INVALID_LIST_ID
//! - 0x05: ERROR

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType};
pub use response::{AppendReply, GetReply, RemoveReply, Reply, Response, SizeReply, Status};
pub use codec::{
    decode_command, decode_reply, decode_response, encode_command, encode_response,
    read_command, read_response, write_command, write_response, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
