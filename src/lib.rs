//! Live camera preview with per-pixel filters.
//!
//! A capture session feeds a software canvas on a fixed 100 ms schedule. Each
//! tick draws the newest frame (optionally mirrored) and then applies at most
//! one color filter, grayscale or thermal, to the drawn pixels.

pub mod camera;
pub mod compositor;
pub mod config;
pub mod draw;
pub mod error;
pub mod filters;
pub mod render_loop;
pub mod session;
pub mod state;
pub mod surface;
pub mod types;

pub use error::{AcquisitionError, Error, RenderError};
pub use filters::{ColorFilter, grayscale, thermal};
pub use session::{SessionController, SessionStatus};
pub use state::{FilterSelection, FilterState};
