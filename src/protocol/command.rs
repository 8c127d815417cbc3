//! Command definitions
//!
//! The closed set of commands a frame can carry.

use std::fmt;

use crate::error::FramewireError;

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    /// Send the payload back unchanged
    Echo = 0x01,

    /// Send the payload back reversed
    Reverse = 0x02,

    /// Acknowledge with an empty payload, then close the session
    Quit = 0x03,
}

impl Command {
    /// All commands, in wire-code order
    pub const ALL: [Command; 3] = [Command::Echo, Command::Reverse, Command::Quit];

    /// Wire code for this command
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Map a CLI word to its command (`echo`, `rev`, `quit`, any case)
    pub fn from_name(name: &str) -> Option<Command> {
        match name.to_ascii_lowercase().as_str() {
            "echo" => Some(Command::Echo),
            "rev" => Some(Command::Reverse),
            "quit" => Some(Command::Quit),
            _ => None,
        }
    }

    /// CLI word for this command
    pub fn name(self) -> &'static str {
        match self {
            Command::Echo => "echo",
            Command::Reverse => "rev",
            Command::Quit => "quit",
        }
    }
}

impl TryFrom<u8> for Command {
    type Error = FramewireError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0x01 => Ok(Command::Echo),
            0x02 => Ok(Command::Reverse),
            0x03 => Ok(Command::Quit),
            other => Err(FramewireError::UnknownCommand(other)),
        }
    }
}

impl From<Command> for u8 {
    fn from(command: Command) -> u8 {
        command.code()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Command::Echo => "ECHO",
            Command::Reverse => "REVERSE",
            Command::Quit => "QUIT",
        };
        f.write_str(label)
    }
}
