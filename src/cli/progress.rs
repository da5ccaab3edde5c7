//! CLI-specific progress handling for grab-dl
//!
//! Redraws one progress line in place per download. The line text comes
//! from the library's progress formatting; indicatif only handles drawing.

use std::sync::{Arc, Mutex};

use grab_dl::{format_progress_line, format_transfer_summary, DownloadEvent, ProgressCallback};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Creates a message-only bar drawn on stderr
pub fn create_progress_bar(total_size: u64) -> ProgressBar {
    let pb = ProgressBar::with_draw_target(Some(total_size), ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::with_template("  {msg}")
            .expect("Failed to create progress style"),
    );
    pb
}

/// Tracks the bar for whichever download is currently in flight
#[derive(Default)]
pub struct ProgressManager {
    current: Mutex<Option<ProgressBar>>,
}

impl ProgressManager {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Callback to plug into `DownloadOptions::progress`
    pub fn callback(self: &Arc<Self>) -> ProgressCallback {
        let manager = Arc::clone(self);
        Arc::new(move |event: &DownloadEvent<'_>| manager.handle(event))
    }

    /// Applies one download event to the terminal
    pub fn handle(&self, event: &DownloadEvent<'_>) {
        let mut current = match self.current.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        match event {
            DownloadEvent::Started { path, total } => {
                eprintln!("📁 Saving to: {}", path.display());
                if let Some(old) = current.take() {
                    old.finish_and_clear();
                }
                // Without a known size there is nothing to draw
                *current = total.map(create_progress_bar);
            }
            DownloadEvent::Progress(update) => {
                if let Some(pb) = current.as_ref() {
                    pb.set_position(update.downloaded);
                    pb.set_message(format_progress_line(update));
                }
            }
            DownloadEvent::Finished {
                path,
                bytes,
                elapsed,
            } => {
                if let Some(pb) = current.take() {
                    pb.finish_and_clear();
                }
                eprintln!(
                    "✅ Completed {}: {}",
                    path.display(),
                    format_transfer_summary(*bytes, *elapsed)
                );
            }
        }
    }

    /// Drops any bar left behind by a failed transfer
    pub fn abandon(&self) {
        let mut current = match self.current.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(pb) = current.take() {
            pb.abandon();
        }
    }

    /// True while a bar is on screen
    pub fn is_active(&self) -> bool {
        self.current.lock().map(|c| c.is_some()).unwrap_or(false)
    }
}
