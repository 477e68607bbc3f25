// What you SEE:
// • A window that stays black until you press Space to start the camera.
// • M mirrors the image, G toggles grayscale, T toggles thermal, N clears all.
// • Space again stops the camera and blanks the window. ESC quits.
// • Resizing the window restarts the camera session.

use clap::Parser;
use std::time::{Duration, Instant};
use tracing::info;
use webcam_filters::camera::{MediaSource, NokhwaSource};
use webcam_filters::config::Config;
use webcam_filters::draw::{APP_TITLE, Drawer};
use webcam_filters::error::Error;
use webcam_filters::session::SessionController;
use webcam_filters::types::FrameBuffer;

/// Quiet time after the last size change before the session is rebuilt.
/// The canvas keeps the camera's resolution and minifb rescales it, so the
/// rebuild changes nothing visible. It stands in for the page reload the web
/// version did on rotation or resize.
const RESIZE_SETTLE: Duration = Duration::from_millis(50);

fn main() -> Result<(), Error> {
    // Set RUST_LOG to control the level, e.g. RUST_LOG=webcam_filters=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let config = Config::parse();
    info!(?config, "Starting");

    /* --- Controller + window setup ---
       Visual: an empty window opens; the camera is not touched yet. */
    let source = NokhwaSource::new(config.camera);
    let mut controller = SessionController::new(
        source,
        config.constraints(),
        (config.window_width, config.window_height),
    );
    controller.set_filter(config.initial_filter());

    let mut drawer = Drawer::new(
        APP_TITLE,
        config.window_width as usize,
        config.window_height as usize,
    )?;
    drawer.show_status(controller.status(), controller.filter());

    /* --- Reusable screen buffer ---
       Visual: this is the image you actually see. */
    let mut screen = FrameBuffer::new(0, 0);
    let mut dirty = true;

    if config.autostart {
        toggle(&mut controller, &mut drawer, Instant::now());
    }

    let mut last_size = drawer.size();
    let mut resize_at: Option<Instant> = None;

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        let now = Instant::now();

        /* 1) Inputs */
        if drawer.toggle_pressed_once() {
            toggle(&mut controller, &mut drawer, now);
            dirty = true;
        }
        if let Some(selection) = drawer.filter_pressed_once() {
            controller.select_filter(selection);
            drawer.show_status(controller.status(), controller.filter());
        }

        /* 2) Window size changes rebuild the session once things settle */
        let size = drawer.size();
        if size != last_size {
            last_size = size;
            resize_at = Some(now);
        }
        if resize_at.is_some_and(|t| now.duration_since(t) >= RESIZE_SETTLE) {
            resize_at = None;
            match controller.reinitialize(now) {
                Ok(status) => drawer.show_status(status, controller.filter()),
                Err(e) => drawer.notify(&e.user_message()),
            }
            dirty = true;
        }

        /* 3) Render tick when due; present only when the canvas changed */
        if controller.poll(now) {
            dirty = true;
        }
        if dirty {
            screen.fill_from(controller.canvas().pixels());
            drawer.present(&screen)?;
            dirty = false;
        } else {
            drawer.pump();
        }
    }

    Ok(())
}

fn toggle<M: MediaSource>(controller: &mut SessionController<M>, drawer: &mut Drawer, now: Instant) {
    match controller.toggle_session(now) {
        Ok(status) => drawer.show_status(status, controller.filter()),
        // Already logged by the controller; only the user still needs telling.
        Err(e) => drawer.notify(&e.user_message()),
    }
}
