//! Progress reporting for the report scanner
//!
//! Coarse whole-percent progress derived from completed/total file counts,
//! throttled so each integer percentage is reported at most once, plus a
//! real-time display using indicatif.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Tracks scan completion as a whole percentage.
///
/// `complete_one` returns the new percentage only when it crossed an
/// integer boundary, so callers print at most once per percent no matter
/// how many files finish in between.
#[derive(Debug)]
pub struct PercentTracker {
    total: usize,
    completed: AtomicUsize,
    last_percent: AtomicUsize,
}

impl PercentTracker {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            completed: AtomicUsize::new(0),
            last_percent: AtomicUsize::new(0),
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Record one completed file. Returns `Some(percent)` when the integer
    /// percentage advanced.
    pub fn complete_one(&self) -> Option<u8> {
        if self.total == 0 {
            return None;
        }

        let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        let percent = done * 100 / self.total;
        let previous = self.last_percent.fetch_max(percent, Ordering::SeqCst);

        if percent > previous {
            Some(percent as u8)
        } else {
            None
        }
    }
}

/// Progress reporter that displays scan status
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();

        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .expect("Invalid progress template")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update the progress display
    pub fn update(&self, percent: u8, completed: usize, total: usize) {
        self.bar.set_message(format!(
            "Files: {}/{} | {}%",
            format_number(completed as u64),
            format_number(total as u64),
            percent
        ));
    }

    /// Cheap clone sharing the same underlying bar, for progress callbacks
    pub fn handle(&self) -> ProgressReporter {
        ProgressReporter {
            bar: self.bar.clone(),
        }
    }

    /// Set a status message
    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    /// Finish the progress display with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a number with thousands separators
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| {
            chunk
                .iter()
                .rev()
                .map(|&b| b as char)
                .collect::<String>()
        })
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Print a header at the start of the scan
pub fn print_header(root: &str, extension: &str, max_in_flight: usize, output: &str) {
    println!();
    println!(
        "{} {}",
        style("jrxml-scanner").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Reports:").bold(), root);
    println!("  {} .{}", style("Extension:").bold(), extension);
    println!("  {} {}", style("Max reads:").bold(), max_in_flight);
    println!("  {} {}", style("Output:").bold(), output);
    println!();
}

/// Print a summary of the scan results
pub fn print_summary(
    files: usize,
    rows: usize,
    duration: Duration,
    output_dir: &str,
    written: &[String],
) {
    let duration_secs = duration.as_secs_f64();

    println!();
    println!("{}", style("Scan Complete").green().bold());
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Files:").bold(), format_number(files as u64));
    println!("  {} {}", style("Rows:").bold(), format_number(rows as u64));
    println!("  {} {:.1}s", style("Duration:").bold(), duration_secs);
    println!("  {} {}", style("Output:").bold(), output_dir);
    for table in written {
        println!("    {}", style(table).dim());
    }
    println!();
}
