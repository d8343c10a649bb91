//! Collaborator doubles for unit tests: a central unit that understands a
//! handful of opcodes and a picture unit that paints one stripe per line.

use std::path::PathBuf;

use crate::cartridge::{Cartridge, CHR_BANK_SIZE, PRG_BANK_SIZE};
use crate::emulator::Emulator;
use crate::error::HaltError;
use crate::frame::FrameBuffer;
use crate::memory::{BankedMemory, MemoryMap};
use crate::trace::{AddressingMode, InstructionRecord, Registers, ScanlineInfo, StatusFlags};
use crate::units::{CentralUnit, PictureUnit};

pub type TestEmulator = Emulator<ScriptedCpu, StripePpu, BankedMemory>;

pub struct ScriptedCpu {
    info: ScanlineInfo,
    pub registers: Registers,
    /// Push the record before decoding, so an unknown opcode leaves a record
    /// for itself behind.
    pub record_before_decode: bool,
}

impl ScriptedCpu {
    pub fn new(program_counter: u16) -> Self {
        Self {
            info: ScanlineInfo::new(program_counter),
            registers: Registers::power_on(),
            record_before_decode: false,
        }
    }

    pub fn starting_on(program_counter: u16, scan_line: u16) -> Self {
        let mut cpu = Self::new(program_counter);
        cpu.info.scan_line = scan_line;
        cpu
    }

    fn set_zn(&mut self, value: u8) {
        self.registers.p.set(StatusFlags::ZERO, value == 0);
        self.registers.p.set(StatusFlags::NEGATIVE, value & 0x80 != 0);
    }

    /// Executes one instruction and returns the CPU cycles it took.
    fn step(
        &mut self,
        memory: &mut dyn MemoryMap,
        retired: &mut Vec<InstructionRecord>,
    ) -> Result<u16, HaltError> {
        let pc = self.info.program_counter;
        let opcode = memory.read_byte(pc)?;
        let snapshot = self.info;
        let registers = self.registers;

        if self.record_before_decode {
            retired.push(InstructionRecord {
                opcode,
                operands: [0, 0],
                mode: AddressingMode::Implied,
                mnemonic: "???",
                operand_text: String::new(),
                registers,
                info: snapshot,
            });
        }

        let (mnemonic, mode, cycles) = match opcode {
            0x4C => ("JMP", AddressingMode::Absolute, 3),
            0xEA => ("NOP", AddressingMode::Implied, 2),
            0xA2 => ("LDX", AddressingMode::Immediate, 2),
            0xA9 => ("LDA", AddressingMode::Immediate, 2),
            0x86 => ("STX", AddressingMode::ZeroPage, 3),
            0xE8 => ("INX", AddressingMode::Implied, 2),
            0x38 => ("SEC", AddressingMode::Implied, 2),
            0x78 => ("SEI", AddressingMode::Implied, 2),
            0x18 => ("CLC", AddressingMode::Implied, 2),
            _ => return Err(HaltError::UnimplementedOpcode { opcode, address: pc }),
        };

        let mut operands = [0u8; 2];
        for (i, byte) in operands.iter_mut().take(mode.operand_len()).enumerate() {
            *byte = memory.read_byte(pc.wrapping_add(1 + i as u16))?;
        }
        let next_pc = pc.wrapping_add(1 + mode.operand_len() as u16);
        self.info.program_counter = next_pc;

        let operand_text = match opcode {
            0x4C => {
                let target = u16::from_le_bytes(operands);
                self.info.program_counter = target;
                format!("${:04X}", target)
            }
            0xA2 => {
                self.registers.x = operands[0];
                self.set_zn(operands[0]);
                format!("#${:02X}", operands[0])
            }
            0xA9 => {
                self.registers.a = operands[0];
                self.set_zn(operands[0]);
                format!("#${:02X}", operands[0])
            }
            0x86 => {
                let address = operands[0] as u16;
                let old = memory.read_byte(address)?;
                memory.write_byte(address, self.registers.x)?;
                format!("${:02X} = {:02X}", operands[0], old)
            }
            0xE8 => {
                self.registers.x = self.registers.x.wrapping_add(1);
                self.set_zn(self.registers.x);
                String::new()
            }
            0x38 => {
                self.registers.p.insert(StatusFlags::CARRY);
                String::new()
            }
            0x78 => {
                self.registers.p.insert(StatusFlags::INTERRUPT_DISABLE);
                String::new()
            }
            0x18 => {
                self.registers.p.remove(StatusFlags::CARRY);
                String::new()
            }
            _ => String::new(),
        };

        let record = InstructionRecord {
            opcode,
            operands,
            mode,
            mnemonic,
            operand_text,
            registers,
            info: snapshot,
        };
        if self.record_before_decode {
            if let Some(last) = retired.last_mut() {
                *last = record;
            }
        } else {
            retired.push(record);
        }
        Ok(cycles)
    }
}

impl CentralUnit for ScriptedCpu {
    fn step_scanline(
        &mut self,
        memory: &mut dyn MemoryMap,
        retired: &mut Vec<InstructionRecord>,
    ) -> Result<(), HaltError> {
        loop {
            let cycles = self.step(memory, retired)?;
            if self.info.add_dots(cycles * 3) {
                return Ok(());
            }
        }
    }

    fn info(&self) -> &ScanlineInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut ScanlineInfo {
        &mut self.info
    }
}

/// Fills every visible line with a colour derived from the line number.
#[derive(Default)]
pub struct StripePpu {
    pub lines_stepped: u32,
}

impl StripePpu {
    pub fn color_for(line: u16) -> u32 {
        0xFF00_0000 | (line as u32 * 0x0001_0101)
    }
}

impl PictureUnit for StripePpu {
    fn step_scanline(
        &mut self,
        info: &mut ScanlineInfo,
        _memory: &mut dyn MemoryMap,
        frame: &mut FrameBuffer,
    ) -> Result<(), HaltError> {
        self.lines_stepped += 1;
        if let Some(row) = frame.row_mut(info.scan_line as usize) {
            row.fill(Self::color_for(info.scan_line));
        }
        Ok(())
    }
}

/// An NROM-128 image with `segments` copied into its single PRG bank, which is
/// visible at both `$8000` and `$C000`.
pub fn ines_image(segments: &[(u16, &[u8])]) -> Vec<u8> {
    let mut image = vec![b'N', b'E', b'S', 0x1A, 1, 1, 0, 0];
    image.resize(16, 0);
    let mut prg = vec![0u8; PRG_BANK_SIZE];
    for (address, bytes) in segments {
        let offset = (*address as usize) & (PRG_BANK_SIZE - 1);
        prg[offset..offset + bytes.len()].copy_from_slice(bytes);
    }
    image.extend_from_slice(&prg);
    image.extend(std::iter::repeat(0).take(CHR_BANK_SIZE));
    image
}

pub fn emulator_with(segments: &[(u16, &[u8])], cpu: ScriptedCpu) -> TestEmulator {
    let cartridge = Cartridge::from_bytes(&ines_image(segments)).unwrap();
    let memory = BankedMemory::nrom(&cartridge).unwrap();
    Emulator::new(cpu, StripePpu::default(), memory)
}

/// `JMP $C000` forever, starting on scanline 0.
pub fn jmp_loop_emulator() -> TestEmulator {
    emulator_with(&[(0xC000, &[0x4C, 0x00, 0xC0][..])], ScriptedCpu::new(0xC000))
}

/// The program behind `trace/testdata/scripted_trace.log`.
pub const SCRIPTED_PROGRAM: [(u16, &[u8]); 2] = [
    (0xC000, &[0x4C, 0xF5, 0xC5]),
    (
        0xC5F5,
        &[
            0xA2, 0x00, // LDX #$00
            0x86, 0x00, // STX $00
            0x86, 0x10, // STX $10
            0x86, 0x11, // STX $11
            0xE8, // INX
            0x38, // SEC
            0x4C, 0xFF, 0xC5, // JMP $C5FF
        ],
    ),
];

pub fn scripted_emulator() -> TestEmulator {
    emulator_with(&SCRIPTED_PROGRAM, ScriptedCpu::starting_on(0xC000, 241))
}

pub fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("nes-scanline-{}-{}", std::process::id(), name))
}
