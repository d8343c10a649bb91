//! Scanline-synchronised NES emulation core with movie replay and trace validation.
//!
//! The central unit and the picture unit are supplied by the caller through
//! [`CentralUnit`] and [`PictureUnit`]; [`Emulator`] sequences them one scanline at
//! a time and hands back the instructions each frame retired.

pub mod cartridge;
pub mod debug_flags;
pub mod emulator;
pub mod error;
pub mod frame;
pub mod input;
pub mod memory;
pub mod savestate;
pub mod trace;
pub mod units;

#[cfg(test)]
mod test_support;

pub use cartridge::{Cartridge, Header, Mirroring};
pub use emulator::Emulator;
pub use error::{
    CartridgeError, HaltError, Halted, MovieError, ParseError, SaveStateError, TraceError,
    TraceMismatchError,
};
pub use frame::{FrameBuffer, SCREEN_HEIGHT, SCREEN_WIDTH};
pub use input::{
    parse_movie, ButtonState, Controller, InputSource, Key, KeySource, LiveInput, Movie, Port,
    RecordedFrame, RecordedInput,
};
pub use memory::{Bank, BankedMemory, MemoryMap, RegisterWindow};
pub use savestate::SessionState;
pub use trace::{
    format_trace_line, AddressingMode, InstructionRecord, Registers, ScanlineInfo, StatusFlags,
    TraceLine, TraceValidator, ValidationReport,
};
pub use units::{CentralUnit, PictureUnit};
