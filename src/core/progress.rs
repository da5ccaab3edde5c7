//! Progress math for grab-dl
//!
//! Pure functions turning (bytes downloaded, total bytes, elapsed time) into
//! percent, speed and ETA, plus the text rendering of a progress line.
//! Drawing that line on a terminal is left to the caller.

use std::fmt;
use std::time::Duration;

/// Number of cells in the rendered progress bar
pub const BAR_WIDTH: usize = 30;

const BYTES_PER_MB: f64 = 1_048_576.0;

/// Snapshot handed to progress callbacks after every chunk
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressUpdate {
    /// Bytes written so far
    pub downloaded: u64,
    /// Total bytes announced by Content-Length
    pub total: u64,
    /// Time since streaming began
    pub elapsed: Duration,
}

impl ProgressUpdate {
    pub fn percent(&self) -> f64 {
        percent(self.downloaded, self.total)
    }

    pub fn speed_mbps(&self) -> f64 {
        speed_mbps(self.downloaded, self.elapsed)
    }

    pub fn eta(&self) -> Eta {
        eta(self.downloaded, self.total, self.speed_mbps())
    }
}

/// Estimated time remaining
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Eta {
    Remaining(Duration),
    /// Speed is zero, so no estimate is possible
    Unbounded,
}

impl fmt::Display for Eta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Eta::Remaining(d) => {
                let secs = d.as_secs_f64().round() as u64;
                write!(f, "{}m {}s", secs / 60, secs % 60)
            }
            Eta::Unbounded => write!(f, "∞"),
        }
    }
}

/// Percentage complete. Zero when the total is unknown or zero.
pub fn percent(downloaded: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    downloaded as f64 / total as f64 * 100.0
}

/// Average throughput in MB/s (1 MB = 1 048 576 bytes). Zero elapsed yields zero.
pub fn speed_mbps(downloaded: u64, elapsed: Duration) -> f64 {
    let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
    if elapsed_ms <= 0.0 {
        return 0.0;
    }
    (downloaded as f64 / BYTES_PER_MB) / (elapsed_ms / 1000.0)
}

/// Time left at `speed` MB/s for the bytes not yet received
pub fn eta(downloaded: u64, total: u64, speed: f64) -> Eta {
    if speed == 0.0 || !speed.is_finite() {
        return Eta::Unbounded;
    }
    let remaining_mb = total.saturating_sub(downloaded) as f64 / BYTES_PER_MB;
    let secs = remaining_mb / speed.max(f64::EPSILON);
    Duration::try_from_secs_f64(secs)
        .map(Eta::Remaining)
        .unwrap_or(Eta::Unbounded)
}

/// Formats a value with two decimal places
pub fn two_decimals(value: f64) -> String {
    format!("{value:.2}")
}

/// Fixed-width bar with cells filled in proportion to `percent`
pub fn render_bar(percent: f64) -> String {
    let fraction = (percent / 100.0).clamp(0.0, 1.0);
    let filled = ((fraction * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

/// Full progress line: bar, percent, speed and ETA
pub fn format_progress_line(update: &ProgressUpdate) -> String {
    let percent = update.percent();
    format!(
        "[{}] {}% | {} MB/s | ETA {}",
        render_bar(percent),
        two_decimals(percent),
        two_decimals(update.speed_mbps()),
        update.eta()
    )
}

/// Completion summary: size, elapsed time and average throughput
pub fn format_transfer_summary(bytes: u64, elapsed: Duration) -> String {
    format!(
        "{} MB in {:.1}s ({} MB/s)",
        two_decimals(bytes as f64 / BYTES_PER_MB),
        elapsed.as_secs_f64(),
        two_decimals(speed_mbps(bytes, elapsed))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_math_halfway() {
        let update = ProgressUpdate {
            downloaded: 50,
            total: 100,
            elapsed: Duration::from_millis(2000),
        };

        assert_eq!(two_decimals(update.percent()), "50.00");

        let expected_speed = 50.0 / 1_048_576.0 / 2.0;
        assert!((update.speed_mbps() - expected_speed).abs() < 1e-12);
        assert_eq!(two_decimals(update.speed_mbps()), format!("{expected_speed:.2}"));

        // 50 remaining bytes at 25 bytes/s
        assert_eq!(update.eta(), Eta::Remaining(Duration::from_secs(2)));
        assert_eq!(update.eta().to_string(), "0m 2s");
    }

    #[test]
    fn test_speed_zero_elapsed_is_guarded() {
        assert_eq!(speed_mbps(1024, Duration::ZERO), 0.0);
        assert!(speed_mbps(1024, Duration::ZERO).is_finite());
    }

    #[test]
    fn test_eta_unbounded_when_speed_zero() {
        assert_eq!(eta(0, 100, 0.0), Eta::Unbounded);
        assert_eq!(Eta::Unbounded.to_string(), "∞");

        let stalled = ProgressUpdate {
            downloaded: 0,
            total: 100,
            elapsed: Duration::from_secs(5),
        };
        assert_eq!(stalled.eta(), Eta::Unbounded);
    }

    #[test]
    fn test_eta_minutes_and_seconds() {
        // 90 MB left at 1 MB/s
        let eta = eta(0, 90 * 1_048_576, 1.0);
        assert_eq!(eta.to_string(), "1m 30s");
    }

    #[test]
    fn test_percent_unknown_total() {
        assert_eq!(percent(10, 0), 0.0);
        assert_eq!(percent(100, 100), 100.0);
    }

    #[test]
    fn test_render_bar() {
        assert_eq!(render_bar(0.0), "░".repeat(30));
        assert_eq!(render_bar(100.0), "█".repeat(30));
        assert_eq!(render_bar(50.0), format!("{}{}", "█".repeat(15), "░".repeat(15)));
        assert_eq!(render_bar(250.0).chars().count(), BAR_WIDTH);
    }

    #[test]
    fn test_format_progress_line() {
        let update = ProgressUpdate {
            downloaded: 512 * 1024,
            total: 1024 * 1024,
            elapsed: Duration::from_secs(1),
        };
        let line = format_progress_line(&update);
        assert!(line.contains("50.00%"));
        assert!(line.contains("0.50 MB/s"));
        assert!(line.contains("ETA 0m 1s"));
    }

    #[test]
    fn test_format_transfer_summary() {
        let summary = format_transfer_summary(2 * 1_048_576, Duration::from_secs(4));
        assert_eq!(summary, "2.00 MB in 4.0s (0.50 MB/s)");
    }
}
