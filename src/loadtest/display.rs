//! Live terminal progress for a running load test.
//!
//! Polls the engine's [`CompletedCounter`] and renders a single in-place bar
//! showing completed/effective units, throughput, and elapsed time. The
//! display only observes; it never affects dispatch.

use crate::loadtest::worker::CompletedCounter;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::IsTerminal;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// How often the bar re-reads the completed counter.
const REFRESH_INTERVAL: Duration = Duration::from_millis(200);

const BAR_TEMPLATE: &str = "  {bar:40.cyan/blue} {pos}/{len}  {wide_msg}";

/// Progress bar over the completed-unit counter.
pub struct LiveDisplay {
    bar: ProgressBar,
}

impl LiveDisplay {
    /// Create a display for a run of `total` units.
    ///
    /// If `no_color` is true or stderr is not a terminal, color output is
    /// disabled and the bar is hidden.
    pub fn new(total: u64, no_color: bool) -> Self {
        let is_terminal = std::io::stderr().is_terminal();
        if no_color || !is_terminal {
            colored::control::set_override(false);
        }

        let bar = ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::stderr());
        if !is_terminal {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        if let Ok(style) = ProgressStyle::with_template(BAR_TEMPLATE) {
            bar.set_style(style.progress_chars("=> "));
        }

        Self { bar }
    }

    /// Format the trailing status message.
    ///
    /// Shows requests per second (completed / elapsed seconds) and elapsed
    /// whole seconds.
    pub fn format_message(completed: u64, elapsed: Duration) -> String {
        let elapsed_secs = elapsed.as_secs_f64();
        let rps = if elapsed_secs > 0.0 {
            completed as f64 / elapsed_secs
        } else {
            0.0
        };
        format!(
            "rps: {}  |  elapsed: {}s",
            format!("{rps:.1}").green(),
            elapsed.as_secs()
        )
    }

    /// Move the bar to `completed` and refresh the message.
    pub fn update(&self, completed: u64, elapsed: Duration) {
        self.bar.set_position(completed);
        self.bar.set_message(Self::format_message(completed, elapsed));
    }

    /// Stop the display and clear the bar.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Run the progress loop until `cancel` fires.
///
/// Renders one final update on cancellation so the last observed count is
/// the full run.
pub async fn progress_loop(
    completed: CompletedCounter,
    total: u64,
    cancel: CancellationToken,
    no_color: bool,
    started: Instant,
) {
    let display = LiveDisplay::new(total, no_color);

    eprintln!();
    eprintln!("  Running load test...");
    eprintln!();

    let mut ticker = tokio::time::interval(REFRESH_INTERVAL);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                display.update(completed.get(), started.elapsed());
            }
            _ = cancel.cancelled() => {
                display.update(completed.get(), started.elapsed());
                break;
            }
        }
    }

    display.finish();
}
