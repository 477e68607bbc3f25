// Camera access.
// `MediaSource` hands out a live `CaptureStream`; the nokhwa-backed pair below
// opens a real webcam and decodes each frame to RGBA for the canvas.

use crate::error::{AcquisitionError, RenderError};
use crate::types::PixelBuffer;
use tracing::{debug, info, warn};

// Bring in nokhwa types for camera control.
use nokhwa::{
    Camera,
    pixel_format::RgbAFormat,
    utils::{
        ApiBackend, CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType,
        Resolution,
    },
};

/// Which way the camera should face. Desktop backends cannot choose, so this
/// is a preference only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FacingMode {
    #[default]
    User,
    Environment,
}

/// What we ask the device for. The resolution is an ideal, not a demand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Constraints {
    pub width: u32,
    pub height: u32,
    pub facing: FacingMode,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            facing: FacingMode::User,
        }
    }
}

/// Something that can open a camera.
pub trait MediaSource {
    type Stream: CaptureStream;

    fn acquire(&mut self, constraints: &Constraints) -> Result<Self::Stream, AcquisitionError>;
}

/// A live, playing camera stream.
pub trait CaptureStream {
    /// Resolution the device actually negotiated.
    fn resolution(&self) -> (u32, u32);

    /// The current frame. Fails while no frame is ready yet.
    fn frame(&mut self) -> Result<PixelBuffer, RenderError>;

    /// Stop every underlying track. Calling it twice is harmless.
    fn stop(&mut self);
}

/// Opens camera `index` through nokhwa.
pub struct NokhwaSource {
    index: u32,
}

impl NokhwaSource {
    pub fn new(index: u32) -> Self {
        Self { index }
    }

    /// macOS gates cameras behind a consent prompt. The first call raises it;
    /// until the user has granted access every attempt reports permission denied.
    #[cfg(target_os = "macos")]
    fn request_access(&self) -> Result<(), AcquisitionError> {
        static PROMPT: std::sync::Once = std::sync::Once::new();
        PROMPT.call_once(|| {
            nokhwa::nokhwa_initialize(|granted| {
                info!(granted, "Camera access prompt answered");
            });
        });
        if nokhwa::nokhwa_check() {
            Ok(())
        } else {
            Err(AcquisitionError::PermissionDenied(
                "camera access has not been granted to this application".into(),
            ))
        }
    }

    #[cfg(not(target_os = "macos"))]
    fn request_access(&self) -> Result<(), AcquisitionError> {
        Ok(())
    }
}

/// Fallback for backends that only report failures as text: sort by what the
/// message says.
fn classify(context: &str, message: String) -> AcquisitionError {
    let lower = message.to_lowercase();
    let detail = format!("{context}: {message}");
    if lower.contains("permission") || lower.contains("denied") || lower.contains("not authorized")
    {
        AcquisitionError::PermissionDenied(detail)
    } else if lower.contains("busy") || lower.contains("in use") {
        AcquisitionError::Busy(detail)
    } else {
        AcquisitionError::Backend(detail)
    }
}

impl MediaSource for NokhwaSource {
    type Stream = NokhwaStream;

    fn acquire(&mut self, constraints: &Constraints) -> Result<NokhwaStream, AcquisitionError> {
        // 1) Ask for access, then make sure there is something to open at all.
        self.request_access()?;
        let devices = nokhwa::query(ApiBackend::Auto)
            .map_err(|e| classify("Query devices", e.to_string()))?;
        if devices.is_empty() {
            return Err(AcquisitionError::NoDevice);
        }
        debug!(count = devices.len(), "Cameras found");

        if constraints.facing != FacingMode::User {
            warn!(facing = ?constraints.facing, "Facing mode is not selectable on this backend");
        }

        // 2) Ask for the closest format to the ideal resolution.
        let fmt = CameraFormat::new(
            Resolution::new(constraints.width, constraints.height),
            FrameFormat::YUYV, // uncompressed; cheap to convert
            30,                // target FPS
        );
        let req = RequestedFormat::new::<RgbAFormat>(RequestedFormatType::Closest(fmt));

        // 3) Create the camera (fails if the index does not exist or is taken).
        let mut cam = Camera::new(CameraIndex::Index(self.index), req)
            .map_err(|e| classify("Create camera", e.to_string()))?;

        // 4) Start streaming frames.
        cam.open_stream()
            .map_err(|e| classify("Open stream", e.to_string()))?;

        // 5) The stream may have settled on a different resolution.
        let actual = cam.resolution();
        info!(
            index = self.index,
            width = actual.width(),
            height = actual.height(),
            "Camera stream opened"
        );

        Ok(NokhwaStream {
            cam,
            width: actual.width(),
            height: actual.height(),
            stopped: false,
        })
    }
}

pub struct NokhwaStream {
    cam: Camera,
    width: u32,
    height: u32,
    stopped: bool,
}

impl CaptureStream for NokhwaStream {
    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn frame(&mut self) -> Result<PixelBuffer, RenderError> {
        if self.stopped {
            return Err(RenderError::FrameUnavailable("stream stopped".into()));
        }

        // Pull a frame (blocks until the camera delivers one).
        let frame = self
            .cam
            .frame()
            .map_err(|e| RenderError::FrameUnavailable(format!("Fetch frame: {e}")))?;

        let rgba = frame
            .decode_image::<RgbAFormat>()
            .map_err(|e| RenderError::FrameUnavailable(format!("Decode RGBA: {e}")))?;

        // Rebuild through raw bytes so nokhwa's image version never leaks into ours.
        let (w, h) = rgba.dimensions();
        PixelBuffer::from_raw(w, h, rgba.into_raw())
            .ok_or_else(|| RenderError::FrameUnavailable(format!("Short buffer for {w}x{h}")))
    }

    fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        if let Err(e) = self.cam.stop_stream() {
            warn!(error = %e, "Failed to stop camera stream");
        } else {
            info!("Camera stream stopped");
        }
    }
}

impl Drop for NokhwaStream {
    fn drop(&mut self) {
        self.stop();
    }
}
