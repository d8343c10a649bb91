//! Traits for the hardware units the scanline loop drives.
//!
//! Instruction execution and pixel generation live behind these seams; the core
//! only sequences them.

use crate::error::HaltError;
use crate::frame::FrameBuffer;
use crate::trace::{InstructionRecord, ScanlineInfo};

pub use crate::memory::MemoryMap;

/// The 6502-side processor.
pub trait CentralUnit {
    /// Executes every instruction that starts on the current scanline, pushing one
    /// record per retired instruction onto `retired`.
    ///
    /// Returns once `info().scan_line` has moved to the next line. On a fault the
    /// records retired so far stay in `retired`.
    fn step_scanline(
        &mut self,
        memory: &mut dyn MemoryMap,
        retired: &mut Vec<InstructionRecord>,
    ) -> Result<(), HaltError>;

    fn info(&self) -> &ScanlineInfo;
    fn info_mut(&mut self) -> &mut ScanlineInfo;
}

/// The picture processor.
pub trait PictureUnit {
    /// Renders the line named by `info.scan_line` into `frame`. Lines outside the
    /// visible area only update PPU state (vblank flag, NMI request).
    fn step_scanline(
        &mut self,
        info: &mut ScanlineInfo,
        memory: &mut dyn MemoryMap,
        frame: &mut FrameBuffer,
    ) -> Result<(), HaltError>;
}
