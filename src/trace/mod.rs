//! Instruction-retirement records and the Nintendulator-style trace line.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

mod validator;

pub use validator::{TraceValidator, ValidationReport};


/// Scanline the frame is considered complete on (start of vertical blank).
pub const VBLANK_SCANLINE: u16 = 241;
pub const SCANLINES_PER_FRAME: u16 = 262;
pub const DOTS_PER_SCANLINE: u16 = 341;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StatusFlags: u8 {
        const CARRY = 0b00000001;
        const ZERO = 0b00000010;
        const INTERRUPT_DISABLE = 0b00000100;
        const DECIMAL = 0b00001000;
        const BREAK = 0b00010000;
        const UNUSED = 0b00100000;
        const OVERFLOW = 0b01000000;
        const NEGATIVE = 0b10000000;
    }
}

impl Default for StatusFlags {
    /// Power-on value, P:24.
    fn default() -> Self {
        StatusFlags::UNUSED | StatusFlags::INTERRUPT_DISABLE
    }
}

/// Timing token shared between the central unit and the picture unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScanlineInfo {
    pub program_counter: u16,
    /// PPU dots elapsed on the current scanline.
    pub cycles: u16,
    pub scan_line: u16,
    /// Raised by the picture unit when it enters vblank with NMI enabled.
    pub nmi_pending: bool,
}

impl ScanlineInfo {
    pub fn new(program_counter: u16) -> Self {
        Self {
            program_counter,
            ..Self::default()
        }
    }

    /// Scanline that follows `line`, wrapping after the pre-render line.
    pub fn next_line(line: u16) -> u16 {
        (line + 1) % SCANLINES_PER_FRAME
    }

    /// Adds `dots` to the cycle counter, rolling over into the next scanline.
    /// Returns `true` when a scanline boundary was crossed.
    pub fn add_dots(&mut self, dots: u16) -> bool {
        self.cycles += dots;
        if self.cycles >= DOTS_PER_SCANLINE {
            self.cycles -= DOTS_PER_SCANLINE;
            self.scan_line = Self::next_line(self.scan_line);
            return true;
        }
        false
    }

    pub fn in_vblank(&self) -> bool {
        self.scan_line == VBLANK_SCANLINE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Registers {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub p: StatusFlags,
    pub sp: u8,
}

impl Registers {
    pub fn power_on() -> Self {
        Self {
            sp: 0xFD,
            ..Self::default()
        }
    }
}

/// 6502 addressing modes; the mode decides how many operand bytes follow the opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Relative,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndexedIndirect,
    IndirectIndexed,
}

impl AddressingMode {
    pub fn operand_len(self) -> usize {
        match self {
            AddressingMode::Implied | AddressingMode::Accumulator => 0,
            AddressingMode::Immediate
            | AddressingMode::ZeroPage
            | AddressingMode::ZeroPageX
            | AddressingMode::ZeroPageY
            | AddressingMode::Relative
            | AddressingMode::IndexedIndirect
            | AddressingMode::IndirectIndexed => 1,
            AddressingMode::Absolute
            | AddressingMode::AbsoluteX
            | AddressingMode::AbsoluteY
            | AddressingMode::Indirect => 2,
        }
    }
}

/// Snapshot taken by the central unit for one retired instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionRecord {
    pub opcode: u8,
    /// Raw bytes following the opcode; only the first `mode.operand_len()` are meaningful.
    pub operands: [u8; 2],
    pub mode: AddressingMode,
    pub mnemonic: &'static str,
    /// Decoded operand text, e.g. `#$00` or `$C5F5`. Empty for implied instructions.
    pub operand_text: String,
    pub registers: Registers,
    /// Program counter at fetch, cycles and scan line when the instruction started.
    pub info: ScanlineInfo,
}

impl InstructionRecord {
    pub fn operand_bytes(&self) -> &[u8] {
        &self.operands[..self.mode.operand_len()]
    }
}

/// One formatted trace line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TraceLine(String);

impl TraceLine {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for TraceLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TraceLine {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for TraceLine {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Renders `record` in the reference trace layout:
///
/// ```text
/// C000  4C F5 C5  JMP $C5F5                        A:00 X:00 Y:00 P:24 SP:FD CYC:  0 SL:241
/// ```
pub fn format_trace_line(record: &InstructionRecord) -> TraceLine {
    let operands = record
        .operand_bytes()
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ");

    let disassembly = if record.operand_text.is_empty() {
        record.mnemonic.to_string()
    } else {
        format!("{} {}", record.mnemonic, record.operand_text)
    };

    let regs = &record.registers;
    let info = &record.info;
    TraceLine(format!(
        "{:04X}  {:02X} {:<7}{:<32} A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{:>3} SL:{}",
        info.program_counter,
        record.opcode,
        operands,
        disassembly,
        regs.a,
        regs.x,
        regs.y,
        regs.p.bits(),
        regs.sp,
        info.cycles,
        info.scan_line,
    ))
}

impl fmt::Display for InstructionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(format_trace_line(self).as_str())
    }
}
