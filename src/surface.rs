// Software drawing surface.
// The canvas holds the RGBA pixels the window shows, plus a transform stack
// so a draw can be mirrored without touching anything drawn afterwards.

use crate::error::RenderError;
use crate::types::PixelBuffer;
use image::Rgba;

/// Scale-then-translate transform, canvas style: a user-space point `p`
/// lands at device position `scale * (p + translate)` on each axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub scale_x: f32,
    pub scale_y: f32,
    pub translate_x: f32,
    pub translate_y: f32,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        scale_x: 1.0,
        scale_y: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
    };

    /// Flip around the vertical centre line of a surface `width` pixels wide:
    /// scale x by -1, then translate by -width.
    pub fn mirror_horizontal(width: u32) -> Self {
        Transform {
            scale_x: -1.0,
            translate_x: -(width as f32),
            ..Self::IDENTITY
        }
    }

    /// Device point back to user space. None for a degenerate (zero) scale.
    #[inline]
    fn invert(&self, dx: f32, dy: f32) -> Option<(f32, f32)> {
        if self.scale_x == 0.0 || self.scale_y == 0.0 {
            return None;
        }
        Some((dx / self.scale_x - self.translate_x, dy / self.scale_y - self.translate_y))
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// What the compositor draws into.
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Draw `frame` scaled into the user-space rectangle (x, y, w, h),
    /// through the current transform.
    fn draw_frame(
        &mut self,
        frame: &PixelBuffer,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
    ) -> Result<(), RenderError>;

    /// Copy a device-space region out. Ignores the transform.
    fn read_pixels(&self, x: u32, y: u32, w: u32, h: u32) -> Result<PixelBuffer, RenderError>;

    /// Copy a buffer back in at device position (x, y). Ignores the transform.
    fn write_pixels(&mut self, buffer: &PixelBuffer, x: u32, y: u32) -> Result<(), RenderError>;

    fn save_transform(&mut self);
    fn restore_transform(&mut self);
    fn set_transform(&mut self, transform: Transform);

    /// Every pixel back to transparent black.
    fn clear(&mut self);
}

/// In-memory RGBA canvas.
pub struct Canvas {
    pixels: PixelBuffer,
    transform: Transform,
    saved: Vec<Transform>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: PixelBuffer::new(width, height),
            transform: Transform::IDENTITY,
            saved: Vec::new(),
        }
    }

    /// Resize to a new resolution. Contents are cleared and the transform reset.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.pixels = PixelBuffer::new(width, height);
        self.transform = Transform::IDENTITY;
        self.saved.clear();
    }

    /// The pixels as they would appear on screen.
    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    fn check_region(&self, x: u32, y: u32, w: u32, h: u32) -> Result<(), RenderError> {
        let (sw, sh) = self.pixels.dimensions();
        let fits_x = x.checked_add(w).is_some_and(|r| r <= sw);
        let fits_y = y.checked_add(h).is_some_and(|b| b <= sh);
        if fits_x && fits_y {
            Ok(())
        } else {
            Err(RenderError::OutOfBounds {
                x,
                y,
                width: w,
                height: h,
                surface_width: sw,
                surface_height: sh,
            })
        }
    }
}

impl Surface for Canvas {
    fn width(&self) -> u32 {
        self.pixels.width()
    }

    fn height(&self) -> u32 {
        self.pixels.height()
    }

    fn draw_frame(
        &mut self,
        frame: &PixelBuffer,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
    ) -> Result<(), RenderError> {
        let (fw, fh) = frame.dimensions();
        if fw == 0 || fh == 0 {
            return Err(RenderError::EmptyFrame);
        }
        if w == 0 || h == 0 {
            return Ok(());
        }

        let (sw, sh) = self.pixels.dimensions();
        let (x0, y0) = (x as f32, y as f32);
        let (wf, hf) = (w as f32, h as f32);

        // Walk device pixels, map each centre back into user space and
        // sample the frame nearest-neighbour if it lands inside the rectangle.
        for dy in 0..sh {
            for dx in 0..sw {
                let Some((ux, uy)) = self.transform.invert(dx as f32 + 0.5, dy as f32 + 0.5)
                else {
                    return Ok(());
                };
                let (rx, ry) = (ux - x0, uy - y0);
                if rx < 0.0 || ry < 0.0 || rx >= wf || ry >= hf {
                    continue;
                }
                let sx = ((rx / wf * fw as f32) as u32).min(fw - 1);
                let sy = ((ry / hf * fh as f32) as u32).min(fh - 1);
                self.pixels.put_pixel(dx, dy, *frame.get_pixel(sx, sy));
            }
        }
        Ok(())
    }

    fn read_pixels(&self, x: u32, y: u32, w: u32, h: u32) -> Result<PixelBuffer, RenderError> {
        self.check_region(x, y, w, h)?;
        if (x, y, w, h) == (0, 0, self.width(), self.height()) {
            return Ok(self.pixels.clone());
        }
        Ok(image::imageops::crop_imm(&self.pixels, x, y, w, h).to_image())
    }

    fn write_pixels(&mut self, buffer: &PixelBuffer, x: u32, y: u32) -> Result<(), RenderError> {
        let (w, h) = buffer.dimensions();
        self.check_region(x, y, w, h)?;
        for (bx, by, px) in buffer.enumerate_pixels() {
            self.pixels.put_pixel(x + bx, y + by, *px);
        }
        Ok(())
    }

    fn save_transform(&mut self) {
        self.saved.push(self.transform);
    }

    fn restore_transform(&mut self) {
        // Unbalanced restore is a no-op, like a 2D canvas context.
        if let Some(t) = self.saved.pop() {
            self.transform = t;
        }
    }

    fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    fn clear(&mut self) {
        for px in self.pixels.pixels_mut() {
            *px = Rgba([0, 0, 0, 0]);
        }
    }
}
