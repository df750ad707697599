//! Client
//!
//! Blocking client for the remotelist protocol.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};

use crate::error::{ListError, Result};
use crate::protocol::{
    decode_reply, read_response, write_command, AppendReply, Command, GetReply, RemoveReply,
    Reply, SizeReply,
};

/// A connection to a remotelist server
///
/// Server-reported failures come back as the same `ListError` variants the
/// store produced (`ListNotFound`, `EmptyList`, ...).
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    /// Connect to a server
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        let read_stream = stream.try_clone()?;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
        })
    }

    /// Append a value to a list
    pub fn append(&mut self, list_id: &str, value: i64) -> Result<AppendReply> {
        match self.call(Command::Append {
            list_id: list_id.to_string(),
            value,
        })? {
            Reply::Append(reply) => Ok(reply),
            other => Err(unexpected(other)),
        }
    }

    /// Value at `index` of a list
    pub fn get(&mut self, list_id: &str, index: i32) -> Result<GetReply> {
        match self.call(Command::Get {
            list_id: list_id.to_string(),
            index,
        })? {
            Reply::Get(reply) => Ok(reply),
            other => Err(unexpected(other)),
        }
    }

    /// Remove and return the tail of a list
    pub fn remove(&mut self, list_id: &str) -> Result<RemoveReply> {
        match self.call(Command::Remove {
            list_id: list_id.to_string(),
        })? {
            Reply::Remove(reply) => Ok(reply),
            other => Err(unexpected(other)),
        }
    }

    /// Number of values in a list
    pub fn size(&mut self, list_id: &str) -> Result<SizeReply> {
        match self.call(Command::Size {
            list_id: list_id.to_string(),
        })? {
            Reply::Size(reply) => Ok(reply),
            other => Err(unexpected(other)),
        }
    }

    /// Health check
    pub fn ping(&mut self) -> Result<()> {
        match self.call(Command::Ping)? {
            Reply::Pong => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Send one command and wait for its reply
    pub fn call(&mut self, command: Command) -> Result<Reply> {
        let command_type = command.command_type();
        write_command(&mut self.writer, &command)?;
        let response = read_response(&mut self.reader)?;
        decode_reply(command_type, &response)
    }
}

fn unexpected(reply: Reply) -> ListError {
    ListError::Protocol(format!("unexpected reply: {:?}", reply))
}
