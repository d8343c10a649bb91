// NES controller port and the input sources that drive it

use bitflags::bitflags;

mod live;
mod movie;

pub use live::{Key, KeySource, LiveInput, KEY_BINDINGS};
pub use movie::{parse_movie, Movie, RecordedFrame, RecordedInput, PLAYER1_MARKER};


bitflags! {
    /// Logical button vector. Bit order matches the serial read-out order of the
    /// standard joypad (A first, Right last).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ButtonState: u8 {
        const A = 0x01;
        const B = 0x02;
        const SELECT = 0x04;
        const START = 0x08;
        const UP = 0x10;
        const DOWN = 0x20;
        const LEFT = 0x40;
        const RIGHT = 0x80;
    }
}

impl ButtonState {
    /// Movie column order: Right, Left, Down, Up, Start, Select, B, A.
    pub const MOVIE_ORDER: [ButtonState; 8] = [
        ButtonState::RIGHT,
        ButtonState::LEFT,
        ButtonState::DOWN,
        ButtonState::UP,
        ButtonState::START,
        ButtonState::SELECT,
        ButtonState::B,
        ButtonState::A,
    ];

    /// Renders the state as an `RLDUTSBA` string with `.` for released buttons.
    pub fn to_movie_columns(self) -> String {
        const LETTERS: [char; 8] = ['R', 'L', 'D', 'U', 'T', 'S', 'B', 'A'];
        Self::MOVIE_ORDER
            .iter()
            .zip(LETTERS)
            .map(|(button, letter)| if self.contains(*button) { letter } else { '.' })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Port {
    One,
    Two,
}

impl Port {
    pub fn index(self) -> usize {
        match self {
            Port::One => 0,
            Port::Two => 1,
        }
    }
}

/// Standard joypad as seen through `$4016`/`$4017`.
#[derive(Debug, Clone, Default)]
pub struct Controller {
    buttons: ButtonState,
    shift_register: u8,
    strobe: bool,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key(&mut self, button: ButtonState, pressed: bool) {
        self.buttons.set(button, pressed);
        if self.strobe {
            self.shift_register = self.buttons.bits();
        }
    }

    /// Replaces the whole button vector.
    pub fn set_buttons(&mut self, buttons: ButtonState) {
        self.buttons = buttons;
        if self.strobe {
            self.shift_register = self.buttons.bits();
        }
    }

    pub fn buttons(&self) -> ButtonState {
        self.buttons
    }

    pub fn write_strobe(&mut self, value: u8) {
        let new_strobe = value & 0x01 != 0;
        // Latch while high and on the high->low edge
        if self.strobe || new_strobe {
            self.shift_register = self.buttons.bits();
        }
        self.strobe = new_strobe;
    }

    pub fn read_data(&mut self) -> u8 {
        let bit = if self.strobe {
            self.buttons.contains(ButtonState::A) as u8
        } else {
            let bit = self.shift_register & 0x01;
            // Official pads return 1 once all eight buttons have been read
            self.shift_register = (self.shift_register >> 1) | 0x80;
            bit
        };
        0x40 | bit
    }
}

/// Supplies the button state for the upcoming frame.
pub trait InputSource {
    fn update(&mut self, controller: &mut Controller);
}
