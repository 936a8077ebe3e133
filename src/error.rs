use thiserror::Error;

use crate::opcode::Opcode;

pub type Result<T> = std::result::Result<T, Chip8Error>;

/// Everything that can go wrong while loading, stepping, or describing a program.
///
/// Handlers check their preconditions before touching any state, so an `Err`
/// coming out of an instruction means nothing but the program counter moved.
#[derive(Debug, Error)]
pub enum Chip8Error {
    /// No entry in the instruction table matches the fetched bytes
    #[error("invalid opcode {raw:#06X} at {address:#05X}")]
    InvalidOpcode { address: u16, raw: u16 },

    /// A matched instruction needed an operand that its opcode doesn't carry
    #[error("opcode {opcode} is missing an operand")]
    InvalidOpcodeContents { opcode: Opcode },

    #[error("opcode {raw:#06X} is recognised but not implemented")]
    OpcodeNotImplemented { raw: u16 },

    #[error("stack overflow calling from {pc:#05X}")]
    StackOverflow { pc: u16 },

    #[error("stack underflow returning from {pc:#05X}")]
    StackUnderflow { pc: u16 },

    #[error("memory access out of bounds at {address:#06X}")]
    MemoryOutOfBounds { address: usize },

    #[error("ROM is {size} bytes but at most {max} fit in memory")]
    RomTooLarge { size: usize, max: usize },

    #[error("key {key:#X} is not on the keypad")]
    InvalidKey { key: u8 },

    #[error("unable to read ROM: {0}")]
    RomRead(#[from] std::io::Error),
}
