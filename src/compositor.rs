// One render tick: draw the live frame, maybe mirrored, then maybe recolor it.

use crate::camera::CaptureStream;
use crate::error::RenderError;
use crate::state::FilterState;
use crate::surface::{Surface, Transform};
use crate::types::PixelBuffer;
use tracing::{trace, warn};

/// Draw `frame` over the whole surface and post-process it per `filter`.
///
/// The mirror lives only between save and restore, so it shapes the video
/// draw and nothing after it. The color filter then runs over the drawn
/// (possibly mirrored) pixels; at most one read-back/write-back happens.
pub fn composite<S: Surface + ?Sized>(
    surface: &mut S,
    frame: &PixelBuffer,
    filter: FilterState,
) -> Result<(), RenderError> {
    let (w, h) = (surface.width(), surface.height());

    surface.save_transform();
    if filter.mirrored() {
        surface.set_transform(Transform::mirror_horizontal(w));
    }
    let drawn = surface.draw_frame(frame, 0, 0, w, h);
    surface.restore_transform();
    drawn?;

    if let Some(color) = filter.color_filter() {
        let mut pixels = surface.read_pixels(0, 0, w, h)?;
        color.apply(&mut pixels);
        surface.write_pixels(&pixels, 0, 0)?;
    }
    Ok(())
}

/// Pull the current frame and composite it. Errors are logged and the tick is
/// skipped; the next tick simply tries again. Returns whether a frame was drawn.
pub fn render_tick<S, C>(surface: &mut S, stream: &mut C, filter: FilterState) -> bool
where
    S: Surface + ?Sized,
    C: CaptureStream + ?Sized,
{
    let result = stream
        .frame()
        .and_then(|frame| composite(surface, &frame, filter));

    match result {
        Ok(()) => {
            trace!(filter = %filter, "Frame composited");
            true
        }
        Err(e) => {
            warn!(error = %e, "Skipping render tick");
            false
        }
    }
}
