//! Error types shared by the scanline core, the movie loader and the trace validator.

use thiserror::Error;

use crate::trace::InstructionRecord;

/// A collaborator (central unit, picture unit, memory map or cartridge) cannot continue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HaltError {
    #[error("unimplemented opcode 0x{opcode:02X} at ${address:04X}")]
    UnimplementedOpcode { opcode: u8, address: u16 },
    #[error("access to unmapped address ${address:04X}")]
    InvalidAddress { address: u16 },
    #[error("mapper {0} is not supported")]
    UnsupportedMapper(u8),
    #[error("bank {index} requested but the cartridge has {count}")]
    InvalidBank { index: usize, count: usize },
    #[error("central unit left scanline {found}, expected {expected}")]
    ScanlineDesync { expected: u16, found: u16 },
}

impl HaltError {
    /// CPU address the fault happened at, when the fault is tied to one.
    pub fn address(&self) -> Option<u16> {
        match self {
            HaltError::UnimplementedOpcode { address, .. } => Some(*address),
            HaltError::InvalidAddress { address } => Some(*address),
            _ => None,
        }
    }
}

/// Error side of `Emulator::tick`: the fault plus everything retired before it.
#[derive(Debug, Clone, Error)]
#[error("emulation halted after {} retired instructions: {error}", .retired.len())]
pub struct Halted {
    pub retired: Vec<InstructionRecord>,
    #[source]
    pub error: HaltError,
}

/// A player-1 movie line that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("movie line {line}: {reason} ({content:?})")]
pub struct ParseError {
    /// 1-based line number in the source file.
    pub line: usize,
    pub content: String,
    pub reason: &'static str,
}

#[derive(Debug, Error)]
pub enum MovieError {
    #[error("failed to read movie: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[derive(Debug, Error)]
pub enum CartridgeError {
    #[error("failed to read cartridge: {0}")]
    Io(#[from] std::io::Error),
    #[error("image is {0} bytes, smaller than an iNES header")]
    TooShort(usize),
    #[error("unknown header identifier {0:?}")]
    BadMagic([u8; 4]),
    #[error("image truncated: header declares {expected} bytes, file has {actual}")]
    Truncated { expected: usize, actual: usize },
}

/// The n-th formatted trace line differs from the n-th golden line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("trace mismatch at line {index}:\n  expected: {expected}\n  actual:   {actual}")]
pub struct TraceMismatchError {
    /// 0-based index into the golden log.
    pub index: usize,
    pub expected: String,
    pub actual: String,
}

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("failed to read golden log: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Mismatch(#[from] TraceMismatchError),
}

#[derive(Debug, Error)]
pub enum SaveStateError {
    #[error("save state I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("save state encoding failed: {0}")]
    Encode(#[from] bincode::Error),
    #[error("save state version {found} is not supported (expected {expected})")]
    Version { expected: u32, found: u32 },
}
