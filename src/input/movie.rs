use std::path::Path;

use crate::debug_flags;
use crate::error::{MovieError, ParseError};

use super::{ButtonState, Controller, InputSource};

/// Prefix of every player-1 input line in an FM2 movie.
pub const PLAYER1_MARKER: &str = "|0|";
const RELEASED: char = '.';
const BUTTON_COLUMNS: usize = 8;

/// Button state for one frame of a recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordedFrame {
    pub buttons: ButtonState,
}

/// Decodes the player-1 lines of a movie, skipping everything else.
///
/// The button columns are the first `|`-separated field after the marker that is
/// at least eight characters wide, so both `|0|RLDUTSBA|` and the FM2
/// `|0|<port>|RLDUTSBA|` layout decode. A marker line without such a field is an
/// error.
pub fn parse_movie<I, S>(lines: I) -> Result<Vec<RecordedFrame>, ParseError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut frames = Vec::new();
    for (index, line) in lines.into_iter().enumerate() {
        let line = line.as_ref();
        let Some(rest) = line.strip_prefix(PLAYER1_MARKER) else {
            continue;
        };
        let field = rest
            .split('|')
            .find(|field| field.chars().count() >= BUTTON_COLUMNS)
            .ok_or_else(|| ParseError {
                line: index + 1,
                content: line.to_string(),
                reason: "line is shorter than the eight button columns",
            })?;

        let buttons = ButtonState::MOVIE_ORDER
            .iter()
            .zip(field.chars())
            .filter(|(_, c)| *c != RELEASED)
            .fold(ButtonState::empty(), |state, (button, _)| state | *button);
        frames.push(RecordedFrame { buttons });
    }
    Ok(frames)
}

/// A movie loaded from disk.
#[derive(Debug, Clone, Default)]
pub struct Movie {
    frames: Vec<RecordedFrame>,
}

impl Movie {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, MovieError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let movie = Self::parse(&text)?;
        log::info!(
            "Movie loaded - {}: {} frame(s)",
            path.as_ref().display(),
            movie.frames.len()
        );
        Ok(movie)
    }

    pub fn parse(text: &str) -> Result<Self, ParseError> {
        Ok(Self {
            frames: parse_movie(text.lines())?,
        })
    }

    pub fn frames(&self) -> &[RecordedFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn into_input(self) -> RecordedInput {
        RecordedInput::new(self.frames)
    }
}

/// Replays a recording one frame per `update`. Once the recording runs out the
/// controller keeps whatever state it last had.
#[derive(Debug, Clone)]
pub struct RecordedInput {
    frames: Vec<RecordedFrame>,
    cursor: usize,
}

impl RecordedInput {
    pub fn new(frames: Vec<RecordedFrame>) -> Self {
        Self { frames, cursor: 0 }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.frames.len().saturating_sub(self.cursor)
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.frames.len()
    }

    /// Moves the cursor when restoring a saved session. Clamped to the recording length.
    pub fn seek(&mut self, cursor: usize) {
        self.cursor = cursor.min(self.frames.len());
    }
}

impl InputSource for RecordedInput {
    fn update(&mut self, controller: &mut Controller) {
        let Some(frame) = self.frames.get(self.cursor) else {
            return;
        };
        controller.set_buttons(frame.buttons);
        if debug_flags::input_verbose() {
            log::debug!(
                "movie frame {}: {}",
                self.cursor,
                frame.buttons.to_movie_columns()
            );
        }
        self.cursor += 1;
        if self.is_exhausted() {
            log::debug!("movie exhausted after {} frame(s)", self.frames.len());
        }
    }
}
