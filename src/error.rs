use std::io;
use thiserror::Error;

/// Everything that can go wrong while stepping the machine.
#[derive(Debug, Error)]
pub enum Error {
    #[error("memory access out of bounds at address {address:#06x}")]
    MemoryOutOfBounds { address: usize },

    #[error("unknown opcode {opcode:#06x}")]
    UnknownOpcode { opcode: u16 },

    #[error("stack overflow: call depth exceeded")]
    StackOverflow,

    #[error("stack underflow: return with an empty call stack")]
    StackUnderflow,

    #[error("jump to misaligned address {address:#06x}")]
    MisalignedAddress { address: u16 },

    #[error("program is too large ({size} bytes), max size is {max} bytes")]
    ProgramTooLarge { size: usize, max: usize },

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Whether a session should stop after seeing this error. Unknown
    /// opcodes are tolerated since real programs sometimes contain them.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::UnknownOpcode { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
