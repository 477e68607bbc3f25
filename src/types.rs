// Core pixel types shared by the canvas, the filters and the window.

use image::RgbaImage;

/// One rendered frame: row-major RGBA, four 8-bit channels per pixel.
/// Lives for a single render tick (read back, filtered, written back).
pub type PixelBuffer = RgbaImage;

/// What minifb wants to see: one u32 per pixel, packed as 0x00RRGGBB.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    pub width: usize,     // how wide the frame is on screen (pixels)
    pub height: usize,    // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>, // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u32; width * height],
        }
    }

    /// Repack an RGBA buffer into this one, growing or shrinking to match.
    /// Alpha is dropped; a cleared (transparent) canvas shows as black.
    pub fn fill_from(&mut self, rgba: &PixelBuffer) {
        let (w, h) = rgba.dimensions();
        self.width = w as usize;
        self.height = h as usize;
        self.pixels.clear();
        self.pixels.extend(rgba.pixels().map(|p| {
            let r = p[0] as u32;
            let g = p[1] as u32;
            let b = p[2] as u32;
            (r << 16) | (g << 8) | b
        }));
    }
}
