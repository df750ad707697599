//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request (Command) Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Payload by Command Type
//! - APPEND: id_len (4) + id + value (8)
//! - GET:    id_len (4) + id + index (4)
//! - REMOVE: id_len (4) + id
//! - SIZE:   id_len (4) + id
//! - PING:   empty
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! All integers are big-endian.

use std::io::{Read, Write};

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{ListError, Result};
use super::{
    AppendReply, Command, CommandType, GetReply, RemoveReply, Reply, Response, SizeReply, Status,
};

/// Header size: 1 byte command/status + 4 bytes length
pub const HEADER_SIZE: usize = 5;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command to bytes
///
/// Format: cmd_type (1) + payload_len (4) + payload
pub fn encode_command(command: &Command) -> Vec<u8> {
    let mut payload = BytesMut::new();

    match command {
        Command::Append { list_id, value } => {
            put_list_id(&mut payload, list_id);
            payload.put_i64(*value);
        }
        Command::Get { list_id, index } => {
            put_list_id(&mut payload, list_id);
            payload.put_i32(*index);
        }
        Command::Remove { list_id } | Command::Size { list_id } => {
            put_list_id(&mut payload, list_id);
        }
        Command::Ping => {}
    }

    frame(command.command_type() as u8, &payload)
}

/// Decode a command from bytes
pub fn decode_command(bytes: &[u8]) -> Result<Command> {
    let (cmd_type, mut payload) = split_frame(bytes, "command")?;

    let command = match cmd_type {
        0x01 => {
            let list_id = take_list_id(&mut payload, "APPEND")?;
            let value = take_i64(&mut payload, "APPEND")?;
            Command::Append { list_id, value }
        }
        0x02 => {
            let list_id = take_list_id(&mut payload, "GET")?;
            let index = take_i32(&mut payload, "GET")?;
            Command::Get { list_id, index }
        }
        0x03 => Command::Remove {
            list_id: take_list_id(&mut payload, "REMOVE")?,
        },
        0x04 => Command::Size {
            list_id: take_list_id(&mut payload, "SIZE")?,
        },
        0x05 => Command::Ping,
        _ => {
            return Err(ListError::Protocol(format!(
                "Unknown command type: 0x{:02x}",
                cmd_type
            )))
        }
    };

    if payload.has_remaining() {
        return Err(ListError::Protocol(format!(
            "{:?} command: {} unexpected trailing bytes",
            command.command_type(),
            payload.remaining()
        )));
    }

    Ok(command)
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// Format: status (1) + payload_len (4) + payload
pub fn encode_response(response: &Response) -> Vec<u8> {
    frame(response.status as u8, response.payload_bytes())
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let (status_byte, payload) = split_frame(bytes, "response")?;

    let status = Status::from_u8(status_byte).ok_or_else(|| {
        ListError::Protocol(format!("Unknown response status: 0x{:02x}", status_byte))
    })?;

    let payload = if payload.is_empty() {
        None
    } else {
        Some(payload.to_vec())
    };

    Ok(Response { status, payload })
}

/// Turn a response to a command of `command_type` back into a reply
///
/// Non-OK statuses are rebuilt into the matching `ListError`.
pub fn decode_reply(command_type: CommandType, response: &Response) -> Result<Reply> {
    let mut payload = response.payload_bytes();

    match response.status {
        Status::Ok => {}
        Status::ListNotFound => return Err(ListError::ListNotFound(lossy(payload))),
        Status::EmptyList => return Err(ListError::EmptyList(lossy(payload))),
        Status::InvalidListId => return Err(ListError::InvalidListId(lossy(payload))),
        Status::IndexOutOfRange => {
            let index = take_i32(&mut payload, "INDEX_OUT_OF_RANGE")?;
            let size = take_i32(&mut payload, "INDEX_OUT_OF_RANGE")?;
            return Err(ListError::IndexOutOfRange { index, size });
        }
        Status::Error => {
            return Err(ListError::Network(format!("server error: {}", lossy(payload))))
        }
    }

    let reply = match command_type {
        CommandType::Append => {
            if !payload.has_remaining() {
                return Err(ListError::Protocol("APPEND reply: missing flag".to_string()));
            }
            Reply::Append(AppendReply {
                success: payload.get_u8() != 0,
            })
        }
        CommandType::Get => Reply::Get(GetReply {
            value: take_i64(&mut payload, "GET reply")?,
        }),
        CommandType::Remove => Reply::Remove(RemoveReply {
            value: take_i64(&mut payload, "REMOVE reply")?,
        }),
        CommandType::Size => Reply::Size(SizeReply {
            size: take_i32(&mut payload, "SIZE reply")?,
        }),
        CommandType::Ping => {
            if payload != b"PONG" {
                return Err(ListError::Protocol(format!(
                    "PING reply: unexpected payload {:?}",
                    lossy(payload)
                )));
            }
            Reply::Pong
        }
    };

    Ok(reply)
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete command from a stream
///
/// Blocks until a complete command is received or an error occurs
pub fn read_command<R: Read>(reader: &mut R) -> Result<Command> {
    let message = read_frame(reader, "command")?;
    decode_command(&message)
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let bytes = encode_command(command);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    let message = read_frame(reader, "response")?;
    decode_response(&message)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

fn frame(tag: u8, payload: &[u8]) -> Vec<u8> {
    let mut message = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    message.put_u8(tag);
    message.put_u32(payload.len() as u32);
    message.put_slice(payload);
    message.to_vec()
}

/// Validate the header and return (tag, payload)
fn split_frame<'a>(bytes: &'a [u8], what: &str) -> Result<(u8, &'a [u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(ListError::Protocol(format!(
            "Incomplete {} header: expected {} bytes, got {}",
            what,
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let tag = bytes[0];
    let payload_len = payload_len(&bytes[1..HEADER_SIZE], what)?;

    let total_len = HEADER_SIZE + payload_len;
    if bytes.len() < total_len {
        return Err(ListError::Protocol(format!(
            "Incomplete {} payload: expected {} bytes, got {}",
            what,
            total_len,
            bytes.len()
        )));
    }

    Ok((tag, &bytes[HEADER_SIZE..total_len]))
}

fn payload_len(mut len_bytes: &[u8], what: &str) -> Result<usize> {
    let len = len_bytes.get_u32();
    if len > MAX_PAYLOAD_SIZE {
        return Err(ListError::Protocol(format!(
            "{} payload too large: {} bytes (max {})",
            what, len, MAX_PAYLOAD_SIZE
        )));
    }
    Ok(len as usize)
}

fn read_frame<R: Read>(reader: &mut R, what: &str) -> Result<Vec<u8>> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let len = payload_len(&header[1..], what)?;

    let mut message = vec![0u8; HEADER_SIZE + len];
    message[..HEADER_SIZE].copy_from_slice(&header);
    if len > 0 {
        reader.read_exact(&mut message[HEADER_SIZE..])?;
    }
    Ok(message)
}

fn put_list_id(buf: &mut BytesMut, list_id: &str) {
    buf.put_u32(list_id.len() as u32);
    buf.put_slice(list_id.as_bytes());
}

fn take_list_id(payload: &mut &[u8], what: &str) -> Result<String> {
    if payload.remaining() < 4 {
        return Err(ListError::Protocol(format!(
            "{} command: missing list id length",
            what
        )));
    }
    let len = payload.get_u32() as usize;

    if payload.remaining() < len {
        return Err(ListError::Protocol(format!(
            "{} command: incomplete list id (expected {}, got {})",
            what,
            len,
            payload.remaining()
        )));
    }

    let id = String::from_utf8(payload[..len].to_vec())
        .map_err(|_| ListError::Protocol(format!("{} command: list id is not UTF-8", what)))?;
    payload.advance(len);
    Ok(id)
}

fn take_i64(payload: &mut &[u8], what: &str) -> Result<i64> {
    if payload.remaining() < 8 {
        return Err(ListError::Protocol(format!("{}: missing 8-byte value", what)));
    }
    Ok(payload.get_i64())
}

fn take_i32(payload: &mut &[u8], what: &str) -> Result<i32> {
    if payload.remaining() < 4 {
        return Err(ListError::Protocol(format!("{}: missing 4-byte value", what)));
    }
    Ok(payload.get_i32())
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
