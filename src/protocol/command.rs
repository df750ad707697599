//! Command definitions
//!
//! Represents requests from clients.

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    Append = 0x01,
    Get = 0x02,
    Remove = 0x03,
    Size = 0x04,
    Ping = 0x05,
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Append a value to the tail of a list (creates the list)
    Append { list_id: String, value: i64 },

    /// Read the value at an index
    Get { list_id: String, index: i32 },

    /// Remove and return the tail value
    Remove { list_id: String },

    /// Number of values in a list (0 if absent)
    Size { list_id: String },

    /// Ping (health check)
    Ping,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Append { .. } => CommandType::Append,
            Command::Get { .. } => CommandType::Get,
            Command::Remove { .. } => CommandType::Remove,
            Command::Size { .. } => CommandType::Size,
            Command::Ping => CommandType::Ping,
        }
    }
}
