use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::{CartridgeError, HaltError};


const HEADER_SIZE: usize = 16;
const TRAINER_SIZE: usize = 512;
pub const PRG_BANK_SIZE: usize = 16 * 1024;
pub const CHR_BANK_SIZE: usize = 8 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirroring {
    Horizontal,
    Vertical,
    FourScreen,
}

/// The 16-byte iNES header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// PRG ROM size in 16 KiB banks.
    pub prg_banks: usize,
    /// CHR ROM size in 8 KiB banks.
    pub chr_banks: usize,
    pub mapper: u8,
    pub mirroring: Mirroring,
    pub trainer: bool,
    pub battery: bool,
    pub vs_unisystem: bool,
    pub playchoice10: bool,
    pub nes2: bool,
}

impl Header {
    pub fn parse(data: &[u8]) -> Result<Self, CartridgeError> {
        if data.len() < HEADER_SIZE {
            return Err(CartridgeError::TooShort(data.len()));
        }
        if &data[0..4] != b"NES\x1a" {
            return Err(CartridgeError::BadMagic([data[0], data[1], data[2], data[3]]));
        }

        let flags6 = data[6];
        let flags7 = data[7];

        let mirroring = if flags6 & 0x08 != 0 {
            Mirroring::FourScreen
        } else if flags6 & 0x01 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };

        Ok(Header {
            prg_banks: data[4] as usize,
            chr_banks: data[5] as usize,
            mapper: (flags7 & 0xF0) | (flags6 >> 4),
            mirroring,
            trainer: flags6 & 0x04 != 0,
            battery: flags6 & 0x02 != 0,
            vs_unisystem: flags7 & 0x01 != 0,
            playchoice10: flags7 & 0x02 != 0,
            nes2: flags7 & 0x0C == 0x08,
        })
    }

    /// Bytes the header says the whole image should occupy.
    pub fn image_size(&self) -> usize {
        HEADER_SIZE
            + if self.trainer { TRAINER_SIZE } else { 0 }
            + self.prg_banks * PRG_BANK_SIZE
            + self.chr_banks * CHR_BANK_SIZE
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn yes_no(v: bool) -> &'static str {
            if v {
                "Yes"
            } else {
                "No"
            }
        }
        writeln!(f, "PRG ROM banks:    {}", self.prg_banks)?;
        writeln!(f, "CHR ROM banks:    {}", self.chr_banks)?;
        writeln!(f, "Mapper:           {}", self.mapper)?;
        writeln!(f, "Mirroring:        {:?}", self.mirroring)?;
        writeln!(f, "Trainer:          {}", yes_no(self.trainer))?;
        writeln!(f, "Battery backed:   {}", yes_no(self.battery))?;
        writeln!(f, "PlayChoice-10:    {}", yes_no(self.playchoice10))?;
        writeln!(f, "VS Unisystem:     {}", yes_no(self.vs_unisystem))?;
        write!(f, "NES 2.0:          {}", yes_no(self.nes2))
    }
}

/// A parsed cartridge image split into PRG and CHR banks.
///
/// Banks are reference counted so a memory map can place the same bank at
/// several offsets without copying.
#[derive(Debug, Clone)]
pub struct Cartridge {
    header: Header,
    prg_rom: Vec<Arc<[u8]>>,
    chr_rom: Vec<Arc<[u8]>>,
}

impl Cartridge {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CartridgeError> {
        let data = std::fs::read(path.as_ref())?;
        let cartridge = Self::from_bytes(&data)?;
        log::info!(
            "Cartridge loaded - {}: mapper {}, {} PRG bank(s), {} CHR bank(s), {:?} mirroring",
            path.as_ref().display(),
            cartridge.header.mapper,
            cartridge.prg_rom.len(),
            cartridge.chr_rom.len(),
            cartridge.header.mirroring
        );
        Ok(cartridge)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, CartridgeError> {
        let header = Header::parse(data)?;
        let expected = header.image_size();
        if data.len() < expected {
            return Err(CartridgeError::Truncated {
                expected,
                actual: data.len(),
            });
        }

        let prg_start = HEADER_SIZE + if header.trainer { TRAINER_SIZE } else { 0 };
        let chr_start = prg_start + header.prg_banks * PRG_BANK_SIZE;

        let prg_rom: Vec<Arc<[u8]>> = data[prg_start..chr_start]
            .chunks_exact(PRG_BANK_SIZE)
            .map(Arc::from)
            .collect();
        let chr_rom: Vec<Arc<[u8]>> = data[chr_start..chr_start + header.chr_banks * CHR_BANK_SIZE]
            .chunks_exact(CHR_BANK_SIZE)
            .map(Arc::from)
            .collect();

        Ok(Cartridge {
            header,
            prg_rom,
            chr_rom,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn mirroring(&self) -> Mirroring {
        self.header.mirroring
    }

    pub fn prg_bank_count(&self) -> usize {
        self.prg_rom.len()
    }

    pub fn chr_bank_count(&self) -> usize {
        self.chr_rom.len()
    }

    pub fn prg_bank(&self, index: usize) -> Result<&Arc<[u8]>, HaltError> {
        self.prg_rom.get(index).ok_or(HaltError::InvalidBank {
            index,
            count: self.prg_rom.len(),
        })
    }

    pub fn chr_bank(&self, index: usize) -> Result<&Arc<[u8]>, HaltError> {
        self.chr_rom.get(index).ok_or(HaltError::InvalidBank {
            index,
            count: self.chr_rom.len(),
        })
    }
}
