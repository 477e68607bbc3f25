// Small hand-written error types, one enum per place things can go wrong.
// Every variant states *where* it happened so the log line is enough to act on.
use std::fmt::{self, Display};

/// Top-level error returned from `main`. Only the window can take the app down;
/// camera failures are reported to the user and never end the process.
#[derive(Debug)]
pub enum Error {
    WindowInit(String),   // Creating the window failed
    WindowUpdate(String), // Pushing a buffer to the window failed
}

/// Opening the camera failed. The session stays stopped and the user is told once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionError {
    NoDevice,
    PermissionDenied(String),
    Busy(String),
    InvalidResolution { width: u32, height: u32 },
    Backend(String),
}

/// A single render tick failed. Logged and skipped; the next tick retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    FrameUnavailable(String),
    EmptyFrame,
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        surface_width: u32,
        surface_height: u32,
    },
}

impl AcquisitionError {
    /// Text for the one notification the user ever sees.
    pub fn user_message(&self) -> String {
        let reason = match self {
            AcquisitionError::NoDevice => "no camera was found",
            AcquisitionError::PermissionDenied(_) => "camera permission was denied",
            AcquisitionError::Busy(_) => "the camera is in use by another application",
            AcquisitionError::InvalidResolution { .. } => "the camera reported no usable resolution",
            AcquisitionError::Backend(_) => "the camera is not working properly",
        };
        format!("Could not access the camera: {reason}")
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::WindowInit(s) => write!(f, "Window init error: {s}"),
            Error::WindowUpdate(s) => write!(f, "Window update error: {s}"),
        }
    }
}

impl Display for AcquisitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcquisitionError::NoDevice => write!(f, "no camera device present"),
            AcquisitionError::PermissionDenied(s) => write!(f, "permission denied: {s}"),
            AcquisitionError::Busy(s) => write!(f, "device busy: {s}"),
            AcquisitionError::InvalidResolution { width, height } => {
                write!(f, "invalid negotiated resolution {width}x{height}")
            }
            AcquisitionError::Backend(s) => write!(f, "backend failure: {s}"),
        }
    }
}

impl Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::FrameUnavailable(s) => write!(f, "video frame unavailable: {s}"),
            RenderError::EmptyFrame => write!(f, "video frame has no pixels"),
            RenderError::OutOfBounds {
                x,
                y,
                width,
                height,
                surface_width,
                surface_height,
            } => write!(
                f,
                "region {width}x{height}+{x}+{y} exceeds surface {surface_width}x{surface_height}"
            ),
        }
    }
}

impl std::error::Error for Error {}

impl std::error::Error for AcquisitionError {}
impl std::error::Error for RenderError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_names_the_camera() {
        let msg = AcquisitionError::PermissionDenied("denied by OS".into()).user_message();
        assert!(msg.starts_with("Could not access the camera"));
        assert!(msg.contains("permission"));
    }

    #[test]
    fn window_errors_say_where() {
        assert_eq!(
            Error::WindowInit("no display".into()).to_string(),
            "Window init error: no display"
        );
    }
}
