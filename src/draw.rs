// Window and keyboard bindings.
// The window shows whatever the canvas holds; the title doubles as the status
// line and as the place the one user-facing notification appears.

use crate::error::Error;
use crate::session::SessionStatus;
use crate::state::{FilterSelection, FilterState};
use crate::types::FrameBuffer;
use minifb::{Key, KeyRepeat, ScaleMode, Window, WindowOptions};

pub const APP_TITLE: &str = "Webcam Filters";

/// Key → filter control. Checked in this order; one press per frame counts.
const FILTER_KEYS: [(Key, FilterSelection); 4] = [
    (Key::M, FilterSelection::Mirror),
    (Key::G, FilterSelection::Grayscale),
    (Key::T, FilterSelection::Thermal),
    (Key::N, FilterSelection::None),
];

pub struct Drawer {
    window: Window, // the on-screen window you see
}

impl Drawer {
    /// Create a resizable window; frames are stretched to fit, keeping aspect.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let options = WindowOptions {
            resize: true,
            scale_mode: ScaleMode::AspectRatioStretch,
            ..WindowOptions::default()
        };
        let mut window =
            Window::new(title, width, height, options).map_err(|e| Error::WindowInit(e.to_string()))?;
        // Event pumping pace; render ticks run on their own 100 ms schedule.
        window.set_target_fps(60);
        Ok(Self { window })
    }

    /// Push the pixels for this frame to the screen.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Process input without a new image.
    pub fn pump(&mut self) {
        self.window.update();
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// True while ESC is held down.
    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// Space starts or stops the camera.
    pub fn toggle_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::Space, KeyRepeat::No)
    }

    /// The filter control pressed this frame, if any.
    pub fn filter_pressed_once(&self) -> Option<FilterSelection> {
        FILTER_KEYS
            .iter()
            .find(|(key, _)| self.window.is_key_pressed(*key, KeyRepeat::No))
            .map(|(_, sel)| *sel)
    }

    pub fn size(&self) -> (usize, usize) {
        self.window.get_size()
    }

    /// Reflect session and filter into the title bar.
    pub fn show_status(&mut self, status: SessionStatus, filter: FilterState) {
        self.window.set_title(&status_title(status, filter));
    }

    /// The user-visible notification for a failed camera start.
    pub fn notify(&mut self, message: &str) {
        self.window.set_title(&format!("{APP_TITLE} | {message}"));
    }
}

fn status_title(status: SessionStatus, filter: FilterState) -> String {
    match status {
        SessionStatus::Active { width, height } => {
            format!("{APP_TITLE} | {width}x{height} | filter: {filter} | Space: stop")
        }
        SessionStatus::Inactive => format!("{APP_TITLE} | camera off | Space: start"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::ColorFilter;

    #[test]
    fn title_shows_resolution_and_filter() {
        let t = status_title(
            SessionStatus::Active { width: 1280, height: 720 },
            FilterState::new(true, Some(ColorFilter::Thermal)),
        );
        assert!(t.contains("1280x720"));
        assert!(t.contains("thermal (mirrored)"));
    }

    #[test]
    fn idle_title_hints_at_start() {
        let t = status_title(SessionStatus::Inactive, FilterState::default());
        assert!(t.contains("camera off"));
    }

    #[test]
    fn every_selection_has_a_key() {
        for sel in [
            FilterSelection::Mirror,
            FilterSelection::Grayscale,
            FilterSelection::Thermal,
            FilterSelection::None,
        ] {
            assert!(FILTER_KEYS.iter().any(|(_, s)| *s == sel));
        }
    }
}
