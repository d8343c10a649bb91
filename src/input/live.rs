use crate::debug_flags;

use super::{ButtonState, Controller, InputSource};

/// Keyboard keys the live backend listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Enter,
    RightShift,
    W,
    A,
    S,
    D,
    X,
    Z,
}

/// Fixed key-to-button table.
pub const KEY_BINDINGS: [(Key, ButtonState); 8] = [
    (Key::Enter, ButtonState::START),
    (Key::RightShift, ButtonState::SELECT),
    (Key::W, ButtonState::UP),
    (Key::A, ButtonState::LEFT),
    (Key::S, ButtonState::DOWN),
    (Key::D, ButtonState::RIGHT),
    (Key::X, ButtonState::A),
    (Key::Z, ButtonState::B),
];

/// Anything that can report whether a key is currently held.
pub trait KeySource {
    fn is_down(&self, key: Key) -> bool;
}

/// Samples a [`KeySource`] once per frame.
pub struct LiveInput<S> {
    keys: S,
}

impl<S: KeySource> LiveInput<S> {
    pub fn new(keys: S) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &S {
        &self.keys
    }

    pub fn keys_mut(&mut self) -> &mut S {
        &mut self.keys
    }

    /// Button vector for the keys held right now.
    pub fn sample(&self) -> ButtonState {
        KEY_BINDINGS
            .iter()
            .filter(|(key, _)| self.keys.is_down(*key))
            .fold(ButtonState::empty(), |state, (_, button)| state | *button)
    }
}

impl<S: KeySource> InputSource for LiveInput<S> {
    fn update(&mut self, controller: &mut Controller) {
        let state = self.sample();
        if debug_flags::input_verbose() {
            log::debug!("live input {}", state.to_movie_columns());
        }
        // Keys that are not held are released
        controller.set_buttons(state);
    }
}

#[cfg(feature = "sdl")]
impl KeySource for sdl2::EventPump {
    fn is_down(&self, key: Key) -> bool {
        use sdl2::keyboard::Scancode;

        let scancode = match key {
            Key::Enter => Scancode::Return,
            Key::RightShift => Scancode::RShift,
            Key::W => Scancode::W,
            Key::A => Scancode::A,
            Key::S => Scancode::S,
            Key::D => Scancode::D,
            Key::X => Scancode::X,
            Key::Z => Scancode::Z,
        };
        self.keyboard_state().is_scancode_pressed(scancode)
    }
}
