//! Capture session lifecycle.
//!
//! The controller owns the camera stream, the canvas it renders into, the
//! render loop and the current filter state. Starting a session sizes the
//! canvas to the negotiated resolution and starts the loop; stopping it
//! releases the camera, stops the loop and blanks the canvas.

use crate::camera::{CaptureStream, Constraints, MediaSource};
use crate::compositor;
use crate::error::AcquisitionError;
use crate::render_loop::{LoopState, RenderLoop};
use crate::state::{FilterSelection, FilterState};
use crate::surface::{Canvas, Surface};
use std::time::Instant;
use tracing::{error, info};

/// Result of a toggle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Active { width: u32, height: u32 },
    Inactive,
}

/// A live stream and the resolution it negotiated.
struct CaptureSession<S> {
    stream: S,
    width: u32,
    height: u32,
}

pub struct SessionController<M: MediaSource> {
    source: M,
    constraints: Constraints,
    session: Option<CaptureSession<M::Stream>>,
    canvas: Canvas,
    render_loop: RenderLoop,
    filter: FilterState,
}

impl<M: MediaSource> SessionController<M> {
    /// `idle_size` is the canvas size shown before any session has started.
    pub fn new(source: M, constraints: Constraints, idle_size: (u32, u32)) -> Self {
        Self {
            source,
            constraints,
            session: None,
            canvas: Canvas::new(idle_size.0, idle_size.1),
            render_loop: RenderLoop::new(),
            filter: FilterState::default(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn status(&self) -> SessionStatus {
        match &self.session {
            Some(s) => SessionStatus::Active {
                width: s.width,
                height: s.height,
            },
            None => SessionStatus::Inactive,
        }
    }

    pub fn loop_state(&self) -> LoopState {
        self.render_loop.state()
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn filter(&self) -> FilterState {
        self.filter
    }

    /// Replace the filter state; the next tick renders with it.
    pub fn set_filter(&mut self, filter: FilterState) {
        if filter != self.filter {
            info!(from = %self.filter, to = %filter, "Filter changed");
        }
        self.filter = filter;
    }

    /// Apply one press of a filter control and return the new state.
    pub fn select_filter(&mut self, selection: FilterSelection) -> FilterState {
        let next = self.filter.select(selection);
        self.set_filter(next);
        next
    }

    /// Start a session if none is active, otherwise stop the active one.
    pub fn toggle_session(&mut self, now: Instant) -> Result<SessionStatus, AcquisitionError> {
        if self.session.is_some() {
            self.stop_session();
            Ok(SessionStatus::Inactive)
        } else {
            self.start_session(now)
        }
    }

    /// Tear down and re-acquire an active session, e.g. after the window
    /// changed size. Does nothing when no session is active.
    pub fn reinitialize(&mut self, now: Instant) -> Result<SessionStatus, AcquisitionError> {
        if self.session.is_none() {
            return Ok(SessionStatus::Inactive);
        }
        info!("Reinitializing capture session");
        self.stop_session();
        self.start_session(now)
    }

    /// Run a render tick if one is due. Returns true when the canvas changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        if !self.render_loop.poll(now) {
            return false;
        }
        match self.session.as_mut() {
            Some(session) => {
                compositor::render_tick(&mut self.canvas, &mut session.stream, self.filter)
            }
            None => false,
        }
    }

    fn start_session(&mut self, now: Instant) -> Result<SessionStatus, AcquisitionError> {
        let mut stream = self.source.acquire(&self.constraints).inspect_err(|e| {
            error!(error = %e, "Camera acquisition failed");
        })?;

        let (width, height) = stream.resolution();
        if width == 0 || height == 0 {
            stream.stop();
            let e = AcquisitionError::InvalidResolution { width, height };
            error!(error = %e, "Camera acquisition failed");
            return Err(e);
        }

        self.canvas.resize(width, height);
        self.session = Some(CaptureSession {
            stream,
            width,
            height,
        });
        self.render_loop.start(now);
        info!(width, height, "Capture session started");
        Ok(SessionStatus::Active { width, height })
    }

    fn stop_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.stream.stop();
        }
        self.render_loop.stop();
        self.canvas.clear();
        info!("Capture session stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use crate::types::PixelBuffer;
    use image::Rgba;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tracing_subscriber::layer::{Context, SubscriberExt};

    /// Counts ERROR events seen while installed.
    struct ErrorCount(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for ErrorCount {
        fn on_event(&self, event: &tracing::Event<'_>, _: Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::ERROR {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    struct Stream {
        size: (u32, u32),
        stopped: Rc<Cell<u32>>,
    }

    impl CaptureStream for Stream {
        fn resolution(&self) -> (u32, u32) {
            self.size
        }
        fn frame(&mut self) -> Result<PixelBuffer, RenderError> {
            Ok(PixelBuffer::from_pixel(self.size.0, self.size.1, Rgba([9, 9, 9, 255])))
        }
        fn stop(&mut self) {
            self.stopped.set(self.stopped.get() + 1);
        }
    }

    struct Source {
        outcome: Result<(u32, u32), AcquisitionError>,
        acquired: u32,
        stopped: Rc<Cell<u32>>,
    }

    impl Source {
        fn ok(w: u32, h: u32) -> Self {
            Self {
                outcome: Ok((w, h)),
                acquired: 0,
                stopped: Rc::new(Cell::new(0)),
            }
        }
    }

    impl MediaSource for Source {
        type Stream = Stream;
        fn acquire(&mut self, _: &Constraints) -> Result<Stream, AcquisitionError> {
            let size = self.outcome.clone()?;
            self.acquired += 1;
            Ok(Stream {
                size,
                stopped: Rc::clone(&self.stopped),
            })
        }
    }

    fn controller(source: Source) -> SessionController<Source> {
        SessionController::new(source, Constraints::default(), (8, 8))
    }

    #[test]
    fn start_sizes_canvas_and_runs_loop() {
        let mut c = controller(Source::ok(4, 3));
        let t0 = Instant::now();
        assert_eq!(c.toggle_session(t0), Ok(SessionStatus::Active { width: 4, height: 3 }));
        assert_eq!((c.canvas().width(), c.canvas().height()), (4, 3));
        assert_eq!(c.loop_state(), LoopState::Running);
        assert!(c.poll(t0 + Duration::from_millis(100)));
        assert_eq!(c.canvas().pixels().get_pixel(0, 0), &Rgba([9, 9, 9, 255]));
    }

    #[test]
    fn failed_acquisition_stays_inactive() {
        let mut c = controller(Source {
            outcome: Err(AcquisitionError::NoDevice),
            acquired: 0,
            stopped: Rc::new(Cell::new(0)),
        });
        let t0 = Instant::now();
        assert_eq!(c.toggle_session(t0), Err(AcquisitionError::NoDevice));
        assert!(!c.is_active());
        assert_eq!(c.loop_state(), LoopState::Stopped);
        assert!(!c.poll(t0 + Duration::from_secs(1)));
    }

    #[test]
    fn failed_start_is_logged_once() {
        let errors = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(ErrorCount(Arc::clone(&errors)));

        tracing::subscriber::with_default(subscriber, || {
            let mut c = controller(Source {
                outcome: Err(AcquisitionError::PermissionDenied("not granted".into())),
                acquired: 0,
                stopped: Rc::new(Cell::new(0)),
            });
            assert!(c.toggle_session(Instant::now()).is_err());
        });

        assert_eq!(errors.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn zero_resolution_is_rejected_and_stream_released() {
        let source = Source::ok(0, 480);
        let stopped = Rc::clone(&source.stopped);
        let mut c = controller(source);
        assert_eq!(
            c.toggle_session(Instant::now()),
            Err(AcquisitionError::InvalidResolution { width: 0, height: 480 })
        );
        assert_eq!(stopped.get(), 1);
        assert!(!c.is_active());
    }

    #[test]
    fn toggle_while_active_stops_and_clears() {
        let source = Source::ok(2, 2);
        let stopped = Rc::clone(&source.stopped);
        let mut c = controller(source);
        let t0 = Instant::now();
        c.toggle_session(t0).unwrap();
        assert!(c.poll(t0 + Duration::from_millis(100)));

        assert_eq!(c.toggle_session(t0 + Duration::from_millis(120)), Ok(SessionStatus::Inactive));
        assert_eq!(stopped.get(), 1);
        assert_eq!(c.loop_state(), LoopState::Stopped);
        assert!(c.canvas().pixels().pixels().all(|p| *p == Rgba([0, 0, 0, 0])));
        assert!(!c.poll(t0 + Duration::from_millis(200)));
    }

    #[test]
    fn reinitialize_reacquires_only_when_active() {
        let mut c = controller(Source::ok(2, 2));
        let t0 = Instant::now();
        assert_eq!(c.reinitialize(t0), Ok(SessionStatus::Inactive));
        assert_eq!(c.source.acquired, 0);

        c.toggle_session(t0).unwrap();
        assert_eq!(c.reinitialize(t0), Ok(SessionStatus::Active { width: 2, height: 2 }));
        assert_eq!(c.source.acquired, 2);
        assert_eq!(c.source.stopped.get(), 1);
        assert!(c.is_active());
    }

    #[test]
    fn select_filter_goes_through_the_setter() {
        let mut c = controller(Source::ok(2, 2));
        let s = c.select_filter(FilterSelection::Thermal);
        assert!(s.thermal_enabled());
        assert_eq!(c.filter(), s);
        c.select_filter(FilterSelection::Grayscale);
        assert!(!c.filter().thermal_enabled());
        assert!(c.filter().grayscale_enabled());
    }
}
