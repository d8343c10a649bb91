pub const SCREEN_WIDTH: usize = 256;
pub const SCREEN_HEIGHT: usize = 240;
pub const NUM_PIXELS: usize = SCREEN_WIDTH * SCREEN_HEIGHT;

/// Caller-owned 256x240 surface of 0x00RRGGBB pixels.
///
/// The emulator only ever borrows it; the backing storage is allocated once in
/// `new` and never resized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pixels: Vec<u32>,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            pixels: vec![0; NUM_PIXELS],
        }
    }

    pub fn width(&self) -> usize {
        SCREEN_WIDTH
    }

    pub fn height(&self) -> usize {
        SCREEN_HEIGHT
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
            return None;
        }
        Some(self.pixels[y * SCREEN_WIDTH + x])
    }

    /// Writes outside the visible area are dropped.
    pub fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < SCREEN_WIDTH && y < SCREEN_HEIGHT {
            self.pixels[y * SCREEN_WIDTH + x] = color;
        }
    }

    /// One visible line, or `None` for the vblank/pre-render lines.
    pub fn row_mut(&mut self, y: usize) -> Option<&mut [u32]> {
        if y >= SCREEN_HEIGHT {
            return None;
        }
        let start = y * SCREEN_WIDTH;
        Some(&mut self.pixels[start..start + SCREEN_WIDTH])
    }

    pub fn clear(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.pixels
    }
}
