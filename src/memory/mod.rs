use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::cartridge::Cartridge;
use crate::error::HaltError;
use crate::input::{Controller, Port};

#[cfg(test)]
mod tests;

const CONTROLLER_1: u16 = 0x4016;
const CONTROLLER_2: u16 = 0x4017;
const INTERNAL_RAM_SIZE: usize = 0x800;
pub const PPU_REGISTERS: u16 = 0x2000;
pub const PPU_REGISTERS_SPAN: usize = 0x2000;
pub const OAM_DMA: u16 = 0x4014;

/// CPU address space as seen by the central unit.
pub trait MemoryMap {
    fn read_byte(&mut self, address: u16) -> Result<u8, HaltError>;
    fn write_byte(&mut self, address: u16, value: u8) -> Result<(), HaltError>;

    /// Little-endian word at `address`. A pointer at `$00FF` takes its high
    /// byte from `$0000`: zero-page reads never leave the zero page.
    fn read_short(&mut self, address: u16) -> Result<u16, HaltError> {
        let lo = self.read_byte(address)? as u16;
        let hi_address = if address < 0x0100 {
            (address + 1) & 0x00FF
        } else {
            address.wrapping_add(1)
        };
        let hi = self.read_byte(hi_address)? as u16;
        Ok((hi << 8) | lo)
    }

    fn controller_mut(&mut self, port: Port) -> &mut Controller;
    fn controller(&self, port: Port) -> &Controller;
}

/// Memory-mapped registers owned by another unit (PPU, APU, OAM DMA).
pub trait RegisterWindow: fmt::Debug {
    /// Distinct registers; the window repeats every `register_count()` bytes.
    fn register_count(&self) -> usize;
    fn read_register(&mut self, index: usize) -> Result<u8, HaltError>;
    fn write_register(&mut self, index: usize, value: u8) -> Result<(), HaltError>;
}

/// Backing storage for one region of the address space.
#[derive(Debug)]
pub enum Bank {
    /// Writable memory, repeated every `data.len()` bytes up to `span`.
    Ram { data: Vec<u8>, span: usize },
    /// Read-only data shared with the cartridge; writes are ignored.
    Rom(Arc<[u8]>),
    /// A register window mirrored across `span` bytes.
    Registers {
        window: Box<dyn RegisterWindow>,
        span: usize,
    },
    /// Placeholder for hardware nothing is attached to. Reads 0, drops writes.
    Fill(usize),
}

impl Bank {
    pub fn ram(size: usize) -> Self {
        Bank::Ram {
            data: vec![0; size],
            span: size,
        }
    }

    /// `size` bytes of RAM mirrored across `span` bytes of address space.
    pub fn mirrored_ram(size: usize, span: usize) -> Self {
        Bank::Ram {
            data: vec![0; size],
            span,
        }
    }

    pub fn registers(window: Box<dyn RegisterWindow>, span: usize) -> Self {
        Bank::Registers { window, span }
    }

    /// Address space the bank answers for. Banks with no backing bytes answer
    /// for nothing.
    fn span(&self) -> usize {
        match self {
            Bank::Ram { data, .. } if data.is_empty() => 0,
            Bank::Ram { span, .. } => *span,
            Bank::Rom(data) => data.len(),
            Bank::Registers { window, .. } if window.register_count() == 0 => 0,
            Bank::Registers { span, .. } => *span,
            Bank::Fill(len) => *len,
        }
    }
}

/// Offset-keyed bank table plus the two controller ports.
///
/// An address belongs to the bank with the greatest base that is not above it.
#[derive(Debug, Default)]
pub struct BankedMemory {
    banks: BTreeMap<u16, Bank>,
    controllers: [Controller; 2],
}

impl BankedMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fixed mapper-0 layout: internal RAM mirrored through `$0000-$1FFF`, the
    /// first PRG bank at `$8000` and the last one at `$C000`. The PPU, APU and
    /// OAM DMA ranges start out as fill banks until a unit maps its registers.
    pub fn nrom(cartridge: &Cartridge) -> Result<Self, HaltError> {
        let mapper = cartridge.header().mapper;
        if mapper != 0 {
            return Err(HaltError::UnsupportedMapper(mapper));
        }
        let count = cartridge.prg_bank_count();
        let first = cartridge.prg_bank(0)?.clone();
        let last = cartridge.prg_bank(count.saturating_sub(1))?.clone();

        let mut memory = Self::new();
        memory.set_bank(0x0000, Bank::mirrored_ram(INTERNAL_RAM_SIZE, 0x2000));
        memory.set_bank(PPU_REGISTERS, Bank::Fill(PPU_REGISTERS_SPAN));
        memory.set_bank(0x4000, Bank::Fill(0x14));
        memory.set_bank(OAM_DMA, Bank::Fill(1));
        // $4015 up to the cartridge; the controller ports are served before lookup
        memory.set_bank(0x4015, Bank::Fill(0x8000 - 0x4015));
        memory.set_bank(0x8000, Bank::Rom(first));
        memory.set_bank(0xC000, Bank::Rom(last));
        log::debug!(
            "NROM layout with {} PRG bank(s), {:?} mirroring",
            count,
            cartridge.mirroring()
        );
        Ok(memory)
    }

    /// Routes `base..base + span` to `window`, replacing whatever was there.
    pub fn map_registers(&mut self, base: u16, span: usize, window: Box<dyn RegisterWindow>) {
        self.set_bank(base, Bank::registers(window, span));
    }

    pub fn set_bank(&mut self, base: u16, bank: Bank) {
        self.banks.insert(base, bank);
    }

    fn locate(&mut self, address: u16) -> Option<(&mut Bank, usize)> {
        let (&base, bank) = self.banks.range_mut(..=address).next_back()?;
        let offset = (address - base) as usize;
        if offset < bank.span() {
            Some((bank, offset))
        } else {
            None
        }
    }
}

impl MemoryMap for BankedMemory {
    fn read_byte(&mut self, address: u16) -> Result<u8, HaltError> {
        match address {
            CONTROLLER_1 => return Ok(self.controllers[0].read_data()),
            CONTROLLER_2 => return Ok(self.controllers[1].read_data()),
            _ => {}
        }
        match self.locate(address) {
            Some((Bank::Ram { data, .. }, offset)) => Ok(data[offset % data.len()]),
            Some((Bank::Rom(data), offset)) => Ok(data[offset]),
            Some((Bank::Registers { window, .. }, offset)) => {
                let index = offset % window.register_count();
                window.read_register(index)
            }
            Some((Bank::Fill(_), _)) => Ok(0),
            None => Err(HaltError::InvalidAddress { address }),
        }
    }

    fn write_byte(&mut self, address: u16, value: u8) -> Result<(), HaltError> {
        if address == CONTROLLER_1 {
            for controller in self.controllers.iter_mut() {
                controller.write_strobe(value);
            }
            return Ok(());
        }
        match self.locate(address) {
            Some((Bank::Ram { data, .. }, offset)) => {
                let len = data.len();
                data[offset % len] = value;
                Ok(())
            }
            Some((Bank::Rom(_), _)) => {
                log::trace!("ignored ROM write ${:04X} <= {:02X}", address, value);
                Ok(())
            }
            Some((Bank::Registers { window, .. }, offset)) => {
                let index = offset % window.register_count();
                window.write_register(index, value)
            }
            Some((Bank::Fill(_), _)) => Ok(()),
            None => Err(HaltError::InvalidAddress { address }),
        }
    }

    fn controller_mut(&mut self, port: Port) -> &mut Controller {
        &mut self.controllers[port.index()]
    }

    fn controller(&self, port: Port) -> &Controller {
        &self.controllers[port.index()]
    }
}
