use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};

/// A copy of the display contents, indexed as `[y][x]`
pub type Frame = [[bool; DISPLAY_WIDTH]; DISPLAY_HEIGHT];

/// # Frame Buffer
/// The Chip-8 display is composed of 64x32 black/white pixels.
///
/// Pixels are indexed as `[y][x]` with `(0, 0)` in the top left corner.
/// Coordinates outside the display wrap around to the opposite edge.
///
/// ```text
/// ┌──────────────────────────────┐
/// │ (0,0)                 (63,0) │
/// │                              │
/// │ (0,31)               (63,31) │
/// └──────────────────────────────┘
/// ```
///
/// Sprites are XORed onto the display so drawing the same sprite twice erases it.
/// `dirty` tracks whether anything changed since a renderer last took a frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    pixels: Frame,
    dirty: bool,
}

impl FrameBuffer {
    pub fn new() -> Self {
        FrameBuffer {
            pixels: [[false; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
            dirty: false,
        }
    }

    /// Toggles the pixel at `(x, y)` after wrapping both coordinates.
    /// Returns whether the pixel was set before the toggle (a collision).
    pub fn set_pixel(&mut self, x: usize, y: usize) -> bool {
        let pixel = &mut self.pixels[y % DISPLAY_HEIGHT][x % DISPLAY_WIDTH];
        let collision = *pixel;
        *pixel = !collision;
        self.dirty = true;
        collision
    }

    /// Whether the pixel at `(x, y)` is set; coordinates wrap like `set_pixel`
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.pixels[y % DISPLAY_HEIGHT][x % DISPLAY_WIDTH]
    }

    pub fn clear(&mut self) {
        self.pixels = [[false; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
        self.dirty = true;
    }

    /// A copy of every pixel
    pub fn snapshot(&self) -> Frame {
        self.pixels
    }

    /// Returns a copy of the pixels if they changed since the last call.
    pub fn take_frame(&mut self) -> Option<Frame> {
        if self.dirty {
            self.dirty = false;
            Some(self.pixels)
        } else {
            None
        }
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_pixel_toggles() {
        let mut frame_buffer = FrameBuffer::new();
        assert!(!frame_buffer.set_pixel(3, 4));
        assert!(frame_buffer.get(3, 4));
        assert!(frame_buffer.set_pixel(3, 4));
        assert!(!frame_buffer.get(3, 4));
    }

    #[test]
    fn test_set_pixel_wraps() {
        let mut frame_buffer = FrameBuffer::new();
        frame_buffer.set_pixel(DISPLAY_WIDTH, 0);
        assert!(frame_buffer.get(0, 0));
        frame_buffer.set_pixel(1, DISPLAY_HEIGHT + 2);
        assert!(frame_buffer.snapshot()[2][1]);
    }

    #[test]
    fn test_wrapped_and_plain_coordinates_collide() {
        let mut frame_buffer = FrameBuffer::new();
        frame_buffer.set_pixel(0, 0);
        assert!(frame_buffer.set_pixel(DISPLAY_WIDTH, DISPLAY_HEIGHT));
    }

    #[test]
    fn test_clear() {
        let mut frame_buffer = FrameBuffer::new();
        frame_buffer.set_pixel(10, 10);
        frame_buffer.set_pixel(63, 31);
        frame_buffer.clear();
        assert_eq!(frame_buffer.snapshot(), [[false; DISPLAY_WIDTH]; DISPLAY_HEIGHT]);
    }

    #[test]
    fn test_origin_is_top_left() {
        let mut frame_buffer = FrameBuffer::new();
        frame_buffer.set_pixel(5, 0);
        assert!(frame_buffer.snapshot()[0][5]);
    }

    #[test]
    fn test_take_frame_only_when_dirty() {
        let mut frame_buffer = FrameBuffer::new();
        assert_eq!(frame_buffer.take_frame(), None);
        frame_buffer.set_pixel(1, 1);
        let frame = frame_buffer.take_frame().expect("frame should be dirty");
        assert!(frame[1][1]);
        assert_eq!(frame_buffer.take_frame(), None);
    }
}
