//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce le statistiche della run e la progress bar.
//!
//! ## Componenti principali:
//! - `RunStatistics`: snapshot dei quattro contatori della run
//! - `StatsAggregator`: contatori condivisi dietro un unico `Mutex`
//! - `ProgressManager`: progress bar `indicatif` per la fase di transcodifica
//!
//! ## Invarianti:
//! - `processed`, `old_size_total` e `new_size_total` si muovono insieme,
//!   sotto lo stesso lock: un job non aggiorna mai solo una parte dei totali
//! - I contatori non vengono mai divisi in lock separati
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:02:15] [========================================] 150/150 (100%) [OK] clip.mkv: 45.2% saved
//! ```

use crate::file_manager::FileManager;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Counters for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStatistics {
    pub processed: u64,
    pub errors: u64,
    pub old_size_total: u64,
    pub new_size_total: u64,
}

impl RunStatistics {
    pub fn bytes_saved(&self) -> u64 {
        self.old_size_total.saturating_sub(self.new_size_total)
    }

    pub fn reduction_percent(&self) -> f64 {
        FileManager::calculate_reduction(self.old_size_total, self.new_size_total)
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Summary: {} files | Saved: {} ({:.1}%) | Errors: {}",
            self.processed,
            FileManager::format_size(self.bytes_saved()),
            self.reduction_percent(),
            self.errors
        )
    }
}

/// Thread-safe owner of the run counters
#[derive(Debug, Default)]
pub struct StatsAggregator {
    inner: Mutex<RunStatistics>,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit one successful transcode: processed and both totals together
    pub fn record(&self, old_size: u64, new_size: u64) {
        let mut stats = self.lock();
        stats.processed += 1;
        stats.old_size_total += old_size;
        stats.new_size_total += new_size;
    }

    pub fn record_error(&self) {
        self.lock().errors += 1;
    }

    pub fn summary(&self) -> RunStatistics {
        *self.lock()
    }

    // Updates are single statements, so a poisoned lock still holds consistent counters.
    fn lock(&self) -> MutexGuard<'_, RunStatistics> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Manages progress reporting for the transcode pass
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);

        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// A manager that never draws (JSON mode, tests)
    pub fn hidden(total_files: u64) -> Self {
        let bar = ProgressBar::with_draw_target(Some(total_files), ProgressDrawTarget::hidden());
        Self { bar }
    }

    /// Update progress with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Last status line shown next to the bar
    pub fn message(&self) -> String {
        self.bar.message()
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_record_moves_counters_together() {
        let stats = StatsAggregator::new();
        stats.record(10_000, 4_000);
        stats.record(2_000, 1_500);
        stats.record_error();

        let summary = stats.summary();
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.old_size_total, 12_000);
        assert_eq!(summary.new_size_total, 5_500);
        assert_eq!(summary.bytes_saved(), 6_500);
    }

    #[test]
    fn test_concurrent_updates_are_not_lost() {
        let stats = Arc::new(StatsAggregator::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let stats = Arc::clone(&stats);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        stats.record(3, 1);
                        stats.record_error();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let summary = stats.summary();
        assert_eq!(summary.processed, 8000);
        assert_eq!(summary.errors, 8000);
        assert_eq!(summary.old_size_total, 24_000);
        assert_eq!(summary.new_size_total, 8_000);
    }

    #[test]
    fn test_empty_run_summary() {
        let summary = RunStatistics::default();
        assert_eq!(summary.reduction_percent(), 0.0);
        assert_eq!(summary.format_summary(), "Summary: 0 files | Saved: 0 B (0.0%) | Errors: 0");
    }

    #[test]
    fn test_reduction_percent() {
        let summary = RunStatistics {
            processed: 1,
            errors: 0,
            old_size_total: 1000,
            new_size_total: 250,
        };
        assert!((summary.reduction_percent() - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hidden_progress_counts_updates() {
        let progress = ProgressManager::hidden(3);
        progress.update("[OK] a");
        progress.update("[SKIP] b");
        assert_eq!(progress.position(), 2);
        progress.finish("done");
    }
}
