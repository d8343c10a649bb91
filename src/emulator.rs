use crate::error::{HaltError, Halted};
use crate::frame::FrameBuffer;
use crate::input::{InputSource, Port};
use crate::trace::{format_trace_line, InstructionRecord, ScanlineInfo};
use crate::units::{CentralUnit, MemoryMap, PictureUnit};


/// Drives the central unit and the picture unit in scanline lockstep.
///
/// Each [`tick`](Emulator::tick) runs until the frame reaches vertical blank, so a
/// caller gets control back exactly once per frame.
pub struct Emulator<C, P, M> {
    cpu: C,
    ppu: P,
    memory: M,
    pub(crate) frame_count: u64,
}

impl<C, P, M> Emulator<C, P, M>
where
    C: CentralUnit,
    P: PictureUnit,
    M: MemoryMap,
{
    pub fn new(cpu: C, ppu: P, memory: M) -> Self {
        Self {
            cpu,
            ppu,
            memory,
            frame_count: 0,
        }
    }

    /// Runs one frame. For every scanline the picture unit goes first, then the
    /// central unit executes the instructions that start on that line. Stops as
    /// soon as the central unit moves onto the vblank line.
    ///
    /// On a halt the error carries every record retired before the fault; a
    /// trailing record for the faulting instruction itself is dropped.
    pub fn tick(&mut self, frame: &mut FrameBuffer) -> Result<Vec<InstructionRecord>, Halted> {
        let mut retired = Vec::new();

        loop {
            let line = self.cpu.info().scan_line;

            if let Err(error) = self
                .ppu
                .step_scanline(self.cpu.info_mut(), &mut self.memory, frame)
            {
                return Err(self.halt(retired, error));
            }
            if let Err(error) = self.cpu.step_scanline(&mut self.memory, &mut retired) {
                return Err(self.halt(retired, error));
            }

            let expected = ScanlineInfo::next_line(line);
            let found = self.cpu.info().scan_line;
            if found != expected {
                return Err(self.halt(retired, HaltError::ScanlineDesync { expected, found }));
            }
            if self.cpu.info().in_vblank() {
                break;
            }
        }

        self.frame_count += 1;
        log::trace!(
            "frame {} complete, {} instruction(s) retired",
            self.frame_count,
            retired.len()
        );
        if crate::debug_flags::trace() {
            for record in &retired {
                log::trace!("{}", format_trace_line(record));
            }
        }
        Ok(retired)
    }

    /// Applies `input` to controller port 1, then runs one frame.
    pub fn run_frame(
        &mut self,
        input: &mut dyn InputSource,
        frame: &mut FrameBuffer,
    ) -> Result<Vec<InstructionRecord>, Halted> {
        input.update(self.memory.controller_mut(Port::One));
        self.tick(frame)
    }

    fn halt(&self, mut retired: Vec<InstructionRecord>, error: HaltError) -> Halted {
        // Some central units record an instruction before decoding it
        if let (Some(address), Some(last)) = (error.address(), retired.last()) {
            if last.info.program_counter == address {
                retired.pop();
            }
        }
        log::warn!(
            "halted on scanline {} after {} record(s): {}",
            self.cpu.info().scan_line,
            retired.len(),
            error
        );
        Halted { retired, error }
    }

    pub fn scanline_info(&self) -> &ScanlineInfo {
        self.cpu.info()
    }

    /// Completed frames; a tick that halts does not count.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn cpu(&self) -> &C {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut C {
        &mut self.cpu
    }

    pub fn ppu(&self) -> &P {
        &self.ppu
    }

    pub fn memory(&self) -> &M {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }
}
