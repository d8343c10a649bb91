use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::emulator::Emulator;
use crate::error::SaveStateError;
use crate::input::{ButtonState, Port, RecordedInput};
use crate::trace::ScanlineInfo;
use crate::units::{CentralUnit, MemoryMap, PictureUnit};

/// Session-level snapshot: frame position, timing token, controller state and
/// movie progress. Unit internals (registers, RAM, PPU state) are owned by the
/// collaborators and are not part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub version: u32,
    pub frame_count: u64,
    pub scanline: ScanlineInfo,
    pub controller1: u8,
    pub controller2: u8,
    pub replay_cursor: Option<usize>,
}

impl SessionState {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SaveStateError> {
        let data = bincode::serialize(self)?;
        std::fs::write(path.as_ref(), data)?;
        log::info!("Session state written to: {}", path.as_ref().display());
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, SaveStateError> {
        let data = std::fs::read(path.as_ref())?;
        let state = Self::from_bytes(&data)?;
        log::info!("Session state loaded from: {}", path.as_ref().display());
        Ok(state)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, SaveStateError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, SaveStateError> {
        let state: SessionState = bincode::deserialize(data)?;
        if state.version != Self::CURRENT_VERSION {
            return Err(SaveStateError::Version {
                expected: Self::CURRENT_VERSION,
                found: state.version,
            });
        }
        Ok(state)
    }
}

impl<C, P, M> Emulator<C, P, M>
where
    C: CentralUnit,
    P: PictureUnit,
    M: MemoryMap,
{
    pub fn session_state(&self, replay: Option<&RecordedInput>) -> SessionState {
        SessionState {
            version: SessionState::CURRENT_VERSION,
            frame_count: self.frame_count,
            scanline: *self.scanline_info(),
            controller1: self.memory().controller(Port::One).buttons().bits(),
            controller2: self.memory().controller(Port::Two).buttons().bits(),
            replay_cursor: replay.map(RecordedInput::cursor),
        }
    }

    /// Puts the session back where `state` was taken. The replay cursor is only
    /// touched when both `state` and `replay` carry one.
    pub fn restore_session(&mut self, state: &SessionState, replay: Option<&mut RecordedInput>) {
        self.frame_count = state.frame_count;
        *self.cpu_mut().info_mut() = state.scanline;
        self.memory_mut()
            .controller_mut(Port::One)
            .set_buttons(ButtonState::from_bits_retain(state.controller1));
        self.memory_mut()
            .controller_mut(Port::Two)
            .set_buttons(ButtonState::from_bits_retain(state.controller2));
        if let (Some(cursor), Some(replay)) = (state.replay_cursor, replay) {
            replay.seek(cursor);
        }
        log::debug!(
            "session restored at frame {}, scanline {}",
            state.frame_count,
            state.scanline.scan_line
        );
    }
}
