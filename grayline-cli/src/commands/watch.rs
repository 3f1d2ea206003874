//! `watch` command: keep the PNG files current until interrupted.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use grayline::app::{AppConfig, GrayLineApp, TICK_INTERVAL};
use tokio::sync::watch;
use tracing::{info, warn};

use super::common::ensure_directory;
use super::render::write_frame;
use crate::error::CliError;

/// Rewrite the output files whenever a new frame is published.
pub fn run(config: AppConfig, out_dir: &Path) -> Result<(), CliError> {
    ensure_directory(out_dir)?;

    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = Arc::clone(&running);
    ctrlc::set_handler(move || handler_flag.store(false, Ordering::SeqCst))
        .map_err(|e| CliError::Signal(e.to_string()))?;

    let refresh = config.refresh_interval;
    let mut app = GrayLineApp::start(config)?;
    let mut frames = app.subscribe_frames();
    println!(
        "Watching; refreshing every {}s. Press Ctrl-C to stop.",
        refresh.as_secs()
    );

    let result = watch_loop(&mut app, out_dir, &running, &mut frames);
    app.shutdown();
    result
}

fn watch_loop(
    app: &mut GrayLineApp,
    out_dir: &Path,
    running: &AtomicBool,
    frames: &mut watch::Receiver<u64>,
) -> Result<(), CliError> {
    while running.load(Ordering::SeqCst) {
        if let Err(e) = app.tick() {
            warn!(error = %e, "Engine tick failed");
        }

        if frames.has_changed().unwrap_or(false) {
            frames.borrow_and_update();
            if let Some(frame) = app.latest_frame() {
                write_frame(&frame, out_dir)?;
                info!(generation = frame.generation, "Frame written");
                let at = frame.computed_at.format("%H:%M:%S UTC");
                println!("Frame {} at {}", frame.generation, at);
            }
        }

        thread::sleep(TICK_INTERVAL);
    }
    Ok(())
}
