// Per-pixel color filters over an RGBA buffer.
// Both run in place, keep alpha, and carry no state between calls.

use crate::types::PixelBuffer;
use image::Rgba;

/// Thermal palette, hottest first. A pixel takes the first entry whose
/// threshold its average intensity is strictly above; the last entry has no
/// threshold and catches everything at or below 60.
const THERMAL_PALETTE: [(u16, [u8; 3]); 5] = [
    (220, [255, 255, 255]), // white
    (180, [255, 255, 0]),   // yellow
    (140, [255, 165, 0]),   // orange
    (100, [255, 0, 0]),     // red
    (60, [128, 0, 128]),    // purple
];
const THERMAL_COLDEST: [u8; 3] = [0, 0, 255]; // blue

/// The two mutually exclusive post-process filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorFilter {
    Grayscale,
    Thermal,
}

impl ColorFilter {
    pub fn apply(self, buffer: &mut PixelBuffer) {
        match self {
            ColorFilter::Grayscale => grayscale(buffer),
            ColorFilter::Thermal => thermal(buffer),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ColorFilter::Grayscale => "grayscale",
            ColorFilter::Thermal => "thermal",
        }
    }
}

#[inline]
fn channel_sum(px: &Rgba<u8>) -> u16 {
    px[0] as u16 + px[1] as u16 + px[2] as u16
}

/// R = G = B = floor((R + G + B) / 3). Applying it twice changes nothing.
pub fn grayscale(buffer: &mut PixelBuffer) {
    for px in buffer.pixels_mut() {
        let avg = (channel_sum(px) / 3) as u8;
        px[0] = avg;
        px[1] = avg;
        px[2] = avg;
    }
}

/// Palette entry for a channel sum. `sum > 3 * t` is the exact form of
/// `sum / 3 > t`, so an intensity of 220.33 is still hotter than 220.
#[inline]
pub fn thermal_color(sum: u16) -> [u8; 3] {
    THERMAL_PALETTE
        .iter()
        .find(|(threshold, _)| sum > threshold * 3)
        .map(|(_, rgb)| *rgb)
        .unwrap_or(THERMAL_COLDEST)
}

/// Map each pixel's average intensity onto the thermal palette.
pub fn thermal(buffer: &mut PixelBuffer) {
    for px in buffer.pixels_mut() {
        let [r, g, b] = thermal_color(channel_sum(px));
        px[0] = r;
        px[1] = g;
        px[2] = b;
    }
}
