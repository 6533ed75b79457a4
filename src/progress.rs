//! Progress reporting utilities using indicatif.
//!
//! The batch driver reports through the [`ProgressCallback`] trait so it can
//! run headless in tests; [`Progress`] is the terminal implementation with a
//! count/percentage/ETA bar.

use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};

/// Progress callback for the row-processing loop.
pub trait ProgressCallback: Send + Sync {
    /// Called once before the first row, with the total row count.
    fn on_start(&self, total: usize);

    /// Called when a row begins processing.
    ///
    /// # Arguments
    ///
    /// * `current` - Row number (1-based)
    /// * `file_path` - Identifier of the row being processed
    fn on_row(&self, current: usize, file_path: &str);

    /// Called after the last row completes.
    fn on_finish(&self);
}

/// Terminal progress reporter.
pub struct Progress {
    bar: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, no progress bar is displayed.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            quiet,
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }
}

impl ProgressCallback for Progress {
    fn on_start(&self, total: usize) {
        if self.quiet {
            return;
        }
        let pb = ProgressBar::new(total as u64);
        pb.set_style(Self::style());
        pb.set_message("Estimating");
        *self.bar.lock().unwrap() = Some(pb);
    }

    fn on_row(&self, current: usize, file_path: &str) {
        if let Some(ref pb) = *self.bar.lock().unwrap() {
            pb.set_position(current as u64 - 1);
            pb.set_message(truncate_path(file_path, 30));
        }
    }

    fn on_finish(&self) {
        if let Some(pb) = self.bar.lock().unwrap().take() {
            pb.finish_with_message("Done");
        }
    }
}

/// No-op reporter for quiet contexts and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_start(&self, _total: usize) {}
    fn on_row(&self, _current: usize, _file_path: &str) {}
    fn on_finish(&self) {}
}

/// Truncate a path for display in the progress bar.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.len() <= max_len {
        return path.to_string();
    }

    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    if file_name.len() >= max_len {
        return format!("...{}", &file_name[file_name.len() - max_len + 3..]);
    }

    format!(".../{}", file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_path_unchanged() {
        assert_eq!(truncate_path("Foo.java", 30), "Foo.java");
    }

    #[test]
    fn test_truncate_long_path_keeps_file_name() {
        let path = "very/long/nested/directory/structure/Foo.java";
        assert_eq!(truncate_path(path, 30), ".../Foo.java");
    }

    #[test]
    fn test_truncate_long_file_name() {
        let path = "AnExtremelyLongGeneratedClassNameForTesting.java";
        let out = truncate_path(path, 20);
        assert!(out.starts_with("..."));
        assert_eq!(out.len(), 20);
    }

    #[test]
    fn test_no_progress_is_silent() {
        let progress = NoProgress;
        progress.on_start(10);
        progress.on_row(1, "Foo.java");
        progress.on_finish();
    }
}
