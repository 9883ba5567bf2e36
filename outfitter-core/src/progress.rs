//! Single-line download progress rendering.
//!
//! The renderer is a pure function of the byte counters and elapsed time;
//! [`ProgressLine`] owns the label and start instant and overwrites the
//! current terminal line with a carriage return on every update, so repeated
//! calls animate in place instead of scrolling. It performs no I/O beyond
//! the single stdout write and must never block the download stream.

use std::io::{self, Write};
use std::time::{Duration, Instant};

/// Width of the progress bar in cells.
pub const BAR_WIDTH: usize = 30;

const FILLED: &str = "█";
const EMPTY: &str = "░";

// ============================================================================
// Download Progress
// ============================================================================

/// Progress information for a download in flight.
#[derive(Debug, Clone, Copy)]
pub struct DownloadProgress {
    /// Bytes received so far.
    pub bytes_received: u64,
    /// Total bytes expected, if the server sent a Content-Length.
    pub bytes_total: Option<u64>,
}

impl DownloadProgress {
    pub fn new(bytes_received: u64, bytes_total: Option<u64>) -> Self {
        Self {
            bytes_received,
            bytes_total,
        }
    }
}

// ============================================================================
// Formatting
// ============================================================================

/// Formats a byte count as a human-readable string (1024 base).
///
/// Two decimals with trailing zeros trimmed: `1.5 MB`, `12 KB`, `0 B`.
pub fn format_bytes(bytes: f64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    const K: f64 = 1024.0;

    if bytes <= 0.0 {
        return "0 B".to_string();
    }

    let mut value = bytes;
    let mut unit = 0;
    while value >= K && unit < UNITS.len() - 1 {
        value /= K;
        unit += 1;
    }

    let formatted = format!("{:.2}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

/// Renders one progress line: percentage, bar, byte counts, throughput.
///
/// The filled segment is clamped to [`BAR_WIDTH`] even when the received
/// count transiently exceeds an inconsistent Content-Length. An unknown
/// total renders as 0% with an empty bar.
pub fn render_line(label: &str, progress: &DownloadProgress, elapsed: Duration) -> String {
    let received = progress.bytes_received;
    let total = progress.bytes_total.unwrap_or(0);

    let percent = if total > 0 {
        received as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    let filled = if total > 0 {
        let cells = (BAR_WIDTH as f64 * received as f64 / total as f64).round() as usize;
        cells.min(BAR_WIDTH)
    } else {
        0
    };
    let bar = format!(
        "{}{}",
        FILLED.repeat(filled),
        EMPTY.repeat(BAR_WIDTH - filled)
    );

    let seconds = elapsed.as_secs_f64();
    let speed = if seconds > 0.0 {
        received as f64 / seconds
    } else {
        0.0
    };

    format!(
        "{} [{}] {:.1}% | {}/{} | {}/s",
        label,
        bar,
        percent,
        format_bytes(received as f64),
        format_bytes(total as f64),
        format_bytes(speed)
    )
}

// ============================================================================
// Terminal Progress Line
// ============================================================================

/// A continuously overwritten terminal progress line.
pub struct ProgressLine {
    label: String,
    started: Instant,
}

impl ProgressLine {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            started: Instant::now(),
        }
    }

    /// Redraws the line in place. No trailing newline.
    pub fn update(&self, progress: &DownloadProgress) {
        print!(
            "\r{}",
            render_line(&self.label, progress, self.started.elapsed())
        );
        let _ = io::stdout().flush();
    }

    /// Terminates the line so subsequent output starts cleanly.
    pub fn finish(&self) {
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_cells(line: &str) -> usize {
        line.chars().filter(|c| *c == '█').count()
    }

    #[test]
    fn format_bytes_picks_units() {
        assert_eq!(format_bytes(0.0), "0 B");
        assert_eq!(format_bytes(512.0), "512 B");
        assert_eq!(format_bytes(1024.0), "1 KB");
        assert_eq!(format_bytes(1536.0), "1.5 KB");
        assert_eq!(format_bytes(1024.0 * 1024.0), "1 MB");
        assert_eq!(format_bytes(1.5 * 1024.0 * 1024.0 * 1024.0), "1.5 GB");
    }

    #[test]
    fn format_bytes_trims_trailing_zeros() {
        assert_eq!(format_bytes(1126.4), "1.1 KB");
        assert_eq!(format_bytes(1264.0), "1.23 KB");
    }

    #[test]
    fn format_bytes_clamps_to_largest_unit() {
        let two_tb = 2.0 * 1024f64.powi(4);
        assert_eq!(format_bytes(two_tb), "2048 GB");
    }

    #[test]
    fn render_halfway() {
        let progress = DownloadProgress::new(50, Some(100));
        let line = render_line("Test", &progress, Duration::from_secs(1));
        assert!(line.contains("50.0%"), "got: {}", line);
        assert_eq!(filled_cells(&line), BAR_WIDTH / 2);
        assert!(line.contains("50 B/100 B"), "got: {}", line);
        assert!(line.contains("50 B/s"), "got: {}", line);
    }

    #[test]
    fn render_clamps_overflow_to_bar_width() {
        // A malformed Content-Length can put received above total.
        let progress = DownloadProgress::new(250, Some(100));
        let line = render_line("Test", &progress, Duration::from_secs(1));
        assert_eq!(filled_cells(&line), BAR_WIDTH);
        assert!(!line.contains('░'), "overflowed bar must be fully filled");
    }

    #[test]
    fn render_unknown_total_shows_zero_percent() {
        let progress = DownloadProgress::new(4096, None);
        let line = render_line("Test", &progress, Duration::from_secs(2));
        assert!(line.contains("0.0%"), "got: {}", line);
        assert_eq!(filled_cells(&line), 0);
        assert!(line.contains("2 KB/s"), "got: {}", line);
    }

    #[test]
    fn render_zero_elapsed_reports_zero_speed() {
        let progress = DownloadProgress::new(100, Some(100));
        let line = render_line("Test", &progress, Duration::ZERO);
        assert!(line.ends_with("0 B/s"), "got: {}", line);
    }
}
