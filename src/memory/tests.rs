use super::*;
use crate::input::ButtonState;
use crate::test_support::ines_image;
use std::cell::RefCell;
use std::rc::Rc;

fn nrom_with(segments: &[(u16, &[u8])]) -> BankedMemory {
    let cartridge = Cartridge::from_bytes(&ines_image(segments)).unwrap();
    BankedMemory::nrom(&cartridge).unwrap()
}

#[test]
fn test_internal_ram_is_mirrored_every_2k() {
    let mut memory = nrom_with(&[]);
    memory.write_byte(0x0001, 0x5A).unwrap();
    assert_eq!(memory.read_byte(0x0801).unwrap(), 0x5A);
    assert_eq!(memory.read_byte(0x1801).unwrap(), 0x5A);

    memory.write_byte(0x1FFF, 0x77).unwrap();
    assert_eq!(memory.read_byte(0x07FF).unwrap(), 0x77);
}

#[test]
fn test_single_prg_bank_appears_at_8000_and_c000() {
    let mut memory = nrom_with(&[(0xC000, &[0x4C, 0xF5, 0xC5][..])]);
    assert_eq!(memory.read_byte(0xC000).unwrap(), 0x4C);
    assert_eq!(memory.read_byte(0x8000).unwrap(), 0x4C);
    assert_eq!(memory.read_short(0xC001).unwrap(), 0xC5F5);
}

#[test]
fn test_rom_writes_are_ignored() {
    let mut memory = nrom_with(&[(0xC000, &[0xEA][..])]);
    memory.write_byte(0xC000, 0x00).unwrap();
    assert_eq!(memory.read_byte(0xC000).unwrap(), 0xEA);
}

#[test]
fn test_unmapped_address_is_an_error() {
    let mut memory = BankedMemory::new();
    memory.set_bank(0x0000, Bank::ram(0x100));
    assert_eq!(
        memory.read_byte(0x6000),
        Err(HaltError::InvalidAddress { address: 0x6000 })
    );
    assert_eq!(
        memory.write_byte(0x0100, 0),
        Err(HaltError::InvalidAddress { address: 0x0100 })
    );
}

#[test]
fn test_zero_page_pointer_wraps_within_page() {
    let mut memory = nrom_with(&[]);
    memory.write_byte(0x0000, 0x12).unwrap();
    memory.write_byte(0x00FF, 0x34).unwrap();
    memory.write_byte(0x0100, 0x56).unwrap();
    memory.write_byte(0x0200, 0x78).unwrap();

    assert_eq!(memory.read_short(0x00FF).unwrap(), 0x1234);
    // Outside the zero page the high byte comes from the next address
    assert_eq!(memory.read_short(0x01FF).unwrap(), 0x7800);
    assert_eq!(memory.read_short(0x00FE).unwrap(), 0x3400);
}

#[test]
fn test_reset_routine_register_writes_do_not_halt() {
    let mut memory = nrom_with(&[]);
    for address in [0x2000, 0x2001, 0x3FFF, 0x4000, 0x4013, 0x4014, 0x4015, 0x4017, 0x6000] {
        assert_eq!(memory.write_byte(address, 0x40), Ok(()), "${:04X}", address);
    }
    assert_eq!(memory.read_byte(0x4015).unwrap(), 0);
    assert_eq!(memory.read_byte(0x2002).unwrap(), 0);
    // $4017 writes reach the APU range, not the second pad
    assert_eq!(
        memory.controller(Port::Two).buttons(),
        ButtonState::empty()
    );
}

#[derive(Debug)]
struct LoggedRegisters {
    values: [u8; 8],
    writes: Rc<RefCell<Vec<(usize, u8)>>>,
}

impl RegisterWindow for LoggedRegisters {
    fn register_count(&self) -> usize {
        self.values.len()
    }

    fn read_register(&mut self, index: usize) -> Result<u8, HaltError> {
        Ok(self.values[index])
    }

    fn write_register(&mut self, index: usize, value: u8) -> Result<(), HaltError> {
        self.values[index] = value;
        self.writes.borrow_mut().push((index, value));
        Ok(())
    }
}

#[test]
fn test_picture_unit_registers_are_mirrored_through_3fff() {
    let writes = Rc::new(RefCell::new(Vec::new()));
    let mut memory = nrom_with(&[]);
    memory.map_registers(
        PPU_REGISTERS,
        PPU_REGISTERS_SPAN,
        Box::new(LoggedRegisters {
            values: [0; 8],
            writes: Rc::clone(&writes),
        }),
    );

    memory.write_byte(0x2000, 0x80).unwrap();
    memory.write_byte(0x3FF9, 0x1E).unwrap();
    assert_eq!(*writes.borrow(), vec![(0, 0x80), (1, 0x1E)]);
    assert_eq!(memory.read_byte(0x2009).unwrap(), 0x1E);
    assert_eq!(memory.read_byte(0x3FF8).unwrap(), 0x80);
    // The APU range is untouched by the register window
    assert_eq!(memory.read_byte(0x4000).unwrap(), 0);
}

#[test]
fn test_empty_banks_answer_for_nothing() {
    let mut memory = BankedMemory::new();
    memory.set_bank(0x0000, Bank::mirrored_ram(0, 0x2000));
    assert_eq!(
        memory.read_byte(0x0010),
        Err(HaltError::InvalidAddress { address: 0x0010 })
    );
    assert_eq!(
        memory.write_byte(0x0010, 1),
        Err(HaltError::InvalidAddress { address: 0x0010 })
    );
}

#[test]
fn test_empty_map_rejects_everything() {
    let mut memory = BankedMemory::new();
    assert_eq!(
        memory.read_byte(0x0000),
        Err(HaltError::InvalidAddress { address: 0x0000 })
    );
}

#[test]
fn test_greatest_base_not_above_address_wins() {
    let mut memory = BankedMemory::new();
    memory.set_bank(0x6000, Bank::ram(0x2000));
    memory.set_bank(0x7000, Bank::Rom(Arc::from(vec![0xAB; 0x100])));
    memory.write_byte(0x6FFF, 1).unwrap();
    assert_eq!(memory.read_byte(0x6FFF).unwrap(), 1);
    assert_eq!(memory.read_byte(0x7000).unwrap(), 0xAB);
    // Past the end of the ROM bank, not covered by the RAM bank either
    assert!(memory.read_byte(0x7100).is_err());
}

#[test]
fn test_controller_ports() {
    let mut memory = nrom_with(&[]);
    memory
        .controller_mut(Port::One)
        .set_buttons(ButtonState::B | ButtonState::UP);
    memory.controller_mut(Port::Two).set_buttons(ButtonState::A);

    memory.write_byte(0x4016, 1).unwrap();
    memory.write_byte(0x4016, 0).unwrap();

    let port1: Vec<u8> = (0..8).map(|_| memory.read_byte(0x4016).unwrap()).collect();
    assert_eq!(port1, vec![0x40, 0x41, 0x40, 0x40, 0x41, 0x40, 0x40, 0x40]);
    assert_eq!(memory.read_byte(0x4017).unwrap(), 0x41);
    assert_eq!(memory.read_byte(0x4017).unwrap(), 0x40);
    assert_eq!(
        memory.controller(Port::One).buttons(),
        ButtonState::B | ButtonState::UP
    );
}

#[test]
fn test_non_nrom_mapper_is_rejected() {
    let mut image = ines_image(&[]);
    image[6] = 0x10;
    let cartridge = Cartridge::from_bytes(&image).unwrap();
    assert_eq!(
        BankedMemory::nrom(&cartridge).unwrap_err(),
        HaltError::UnsupportedMapper(1)
    );
}
