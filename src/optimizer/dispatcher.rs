//! # Parallel Dispatcher
//!
//! Distribuisce i job di transcodifica su un pool di N worker.
//!
//! - Un `Semaphore` con N permessi limita i job attivi; ogni job tiene il
//!   proprio permesso finché non termina
//! - I job girano come task tokio indipendenti in un `JoinSet`: il
//!   fallimento (o il panic) di uno non blocca gli altri
//! - Su interruzione non vengono avviati nuovi job; quelli in corso
//!   terminano e il risultato è `Interrupted`

use crate::error::MaintenanceError;
use crate::file_manager::FileManager;
use crate::json_output::JsonMessage;
use crate::optimizer::task_optimizer::{TaskOptimizer, TranscodeOutcome};
use crate::progress::ProgressManager;
use crate::reporter::Reporter;
use crate::shutdown::Shutdown;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Tally of finished jobs
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub dispatched: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Fans transcode jobs out across a bounded worker pool
pub struct Dispatcher {
    workers: usize,
    shutdown: Shutdown,
    reporter: Reporter,
    json_output: bool,
}

impl Dispatcher {
    /// Fails with `Config` when `workers` is 0
    pub fn new(workers: usize, shutdown: Shutdown, reporter: Reporter) -> Result<Self, MaintenanceError> {
        if workers == 0 {
            return Err(MaintenanceError::Config(
                "Number of workers must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            workers,
            shutdown,
            reporter,
            json_output: false,
        })
    }

    /// Emit one `file_complete` JSON line per finished job
    pub fn with_json_output(mut self, enabled: bool) -> Self {
        self.json_output = enabled;
        self
    }

    /// Run `task` on every file; returns once all spawned jobs have finished
    pub async fn run(
        &self,
        files: Vec<PathBuf>,
        task: TaskOptimizer,
        progress: &ProgressManager,
    ) -> Result<DispatchReport, MaintenanceError> {
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let task = Arc::new(task);
        let mut jobs = JoinSet::new();
        let mut report = DispatchReport::default();
        let mut interrupted = false;

        for file_path in files {
            let permit = tokio::select! {
                biased;
                _ = self.shutdown.triggered() => {
                    interrupted = true;
                    break;
                }
                permit = Arc::clone(&semaphore).acquire_owned() => permit.map_err(|e| {
                    MaintenanceError::Unclassified(format!("worker pool closed: {}", e))
                })?,
            };

            let task = Arc::clone(&task);
            report.dispatched += 1;
            jobs.spawn(async move {
                let _permit = permit;
                let outcome = task.transcode(&file_path).await;
                (file_path, outcome)
            });
        }

        while let Some(joined) = jobs.join_next().await {
            match joined {
                Ok((file_path, outcome)) => self.handle_completion(&file_path, &outcome, &mut report, progress),
                Err(e) => {
                    report.failed += 1;
                    self.reporter.error(&format!("Transcode worker crashed: {}", e));
                    progress.update("[ERROR] worker crashed");
                }
            }
        }

        if interrupted || self.shutdown.is_triggered() {
            return Err(MaintenanceError::Interrupted);
        }

        Ok(report)
    }

    fn handle_completion(
        &self,
        file_path: &std::path::Path,
        outcome: &TranscodeOutcome,
        report: &mut DispatchReport,
        progress: &ProgressManager,
    ) {
        let name = FileManager::display_name(file_path);
        let message = match outcome {
            TranscodeOutcome::Succeeded { old_size, new_size, .. } => {
                report.succeeded += 1;
                format!(
                    "[OK] {}: {:.1}% saved",
                    name,
                    FileManager::calculate_reduction(*old_size, *new_size)
                )
            }
            TranscodeOutcome::Skipped(reason) => {
                report.skipped += 1;
                format!("[SKIP] {}: {}", name, reason)
            }
            TranscodeOutcome::Failed(err) => {
                report.failed += 1;
                format!("[ERROR] {}: {}", name, err)
            }
        };
        progress.update(&message);

        if self.json_output {
            JsonMessage::file_complete(file_path, outcome).emit();
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::media::QualityPreset;
    use crate::optimizer::task_optimizer::tests::{fake_encoder, sized_encoder};
    use crate::progress::{RunStatistics, StatsAggregator};
    use crate::tool_runner::ToolRunner;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;

    fn reporter() -> (Reporter, Arc<StatsAggregator>) {
        let stats = Arc::new(StatsAggregator::new());
        (Reporter::new(stats.clone()), stats)
    }

    fn populate(dir: &Path, sizes: &[usize]) -> Vec<PathBuf> {
        sizes
            .iter()
            .enumerate()
            .map(|(i, size)| {
                let path = dir.join(format!("clip{:02}.mkv", i));
                std::fs::write(&path, vec![3u8; *size]).unwrap();
                path
            })
            .collect()
    }

    async fn run_with_workers(workers: usize, sizes: &[usize]) -> (DispatchReport, RunStatistics) {
        let tools = TempDir::new().unwrap();
        let media = TempDir::new().unwrap();
        let files = populate(media.path(), sizes);
        let (reporter, stats) = reporter();

        let task = TaskOptimizer::new(
            ToolRunner::new(sized_encoder(tools.path(), 1_500), Duration::from_secs(10)),
            QualityPreset::Medium,
            reporter.clone(),
        );
        let dispatcher = Dispatcher::new(workers, Shutdown::new(), reporter).unwrap();
        let report = dispatcher
            .run(files, task, &ProgressManager::hidden(sizes.len() as u64))
            .await
            .unwrap();
        (report, stats.summary())
    }

    #[test]
    fn test_zero_workers_rejected() {
        let (reporter, _) = reporter();
        assert!(matches!(
            Dispatcher::new(0, Shutdown::new(), reporter),
            Err(MaintenanceError::Config(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_statistics_match_sequential() {
        let sizes = [5_000, 1_000, 8_000, 1_500, 12_000, 700, 3_000, 2_500];

        let (parallel_report, parallel) = run_with_workers(3, &sizes).await;
        let (sequential_report, sequential) = run_with_workers(1, &sizes).await;

        assert_eq!(parallel, sequential);
        assert_eq!(parallel_report, sequential_report);
        assert_eq!(parallel.processed, 5);
        assert_eq!(parallel.old_size_total, 5_000 + 8_000 + 12_000 + 3_000 + 2_500);
        assert_eq!(parallel.new_size_total, 5 * 1_500);
        assert!(parallel.old_size_total >= parallel.new_size_total);
        assert_eq!(parallel_report.skipped, 3);
        assert_eq!(parallel_report.dispatched, sizes.len());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_failures_do_not_cancel_siblings() {
        let tools = TempDir::new().unwrap();
        let media = TempDir::new().unwrap();
        let mut files = populate(media.path(), &[4_000, 4_000]);
        files.push(media.path().join("missing.mkv"));
        let (reporter, stats) = reporter();

        let task = TaskOptimizer::new(
            ToolRunner::new(sized_encoder(tools.path(), 100), Duration::from_secs(10)),
            QualityPreset::High,
            reporter.clone(),
        );
        let report = Dispatcher::new(2, Shutdown::new(), reporter)
            .unwrap()
            .run(files, task, &ProgressManager::hidden(3))
            .await
            .unwrap();

        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(stats.summary().processed, 2);
        assert_eq!(stats.summary().errors, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_interrupt_stops_new_dispatch() {
        let tools = TempDir::new().unwrap();
        let media = TempDir::new().unwrap();
        let files = populate(media.path(), &[1_000; 6]);
        let (reporter, stats) = reporter();

        let encoder = fake_encoder(tools.path(), "sleep 1\nhead -c 10 /dev/zero > \"$out\"");
        let task = TaskOptimizer::new(
            ToolRunner::new(encoder, Duration::from_secs(10)),
            QualityPreset::Medium,
            reporter.clone(),
        );
        let shutdown = Shutdown::new();
        let dispatcher = Dispatcher::new(1, shutdown.clone(), reporter).unwrap();

        let trigger = {
            let shutdown = shutdown.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(300)).await;
                shutdown.trigger();
            })
        };

        let result = dispatcher.run(files, task, &ProgressManager::hidden(6)).await;
        trigger.await.unwrap();

        assert!(matches!(result, Err(MaintenanceError::Interrupted)));
        // The in-flight job committed fully; nothing after it started.
        let summary = stats.summary();
        assert!(summary.processed >= 1 && summary.processed < 6);
        assert_eq!(summary.old_size_total, summary.processed * 1_000);
        assert_eq!(summary.new_size_total, summary.processed * 10);
        let remaining = std::fs::read_dir(media.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map_or(false, |ext| ext == "mkv"))
            .count() as u64;
        assert_eq!(remaining, 6 - summary.processed);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_jobs_sharing_an_output_path() {
        let tools = TempDir::new().unwrap();
        let media = TempDir::new().unwrap();
        let files: Vec<PathBuf> = ["clip.mkv", "clip.mov", "clip.webm"]
            .iter()
            .map(|name| {
                let path = media.path().join(name);
                std::fs::write(&path, vec![6u8; 9_000]).unwrap();
                path
            })
            .collect();
        let (reporter, stats) = reporter();

        let encoder = fake_encoder(tools.path(), "head -c 900 /dev/zero > \"$out\"");
        let task = TaskOptimizer::new(
            ToolRunner::new(encoder, Duration::from_secs(10)),
            QualityPreset::Medium,
            reporter.clone(),
        );
        let report = Dispatcher::new(3, Shutdown::new(), reporter)
            .unwrap()
            .run(files.clone(), task, &ProgressManager::hidden(3))
            .await
            .unwrap();

        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 2);
        assert_eq!(std::fs::metadata(media.path().join("clip_opt.mp4")).unwrap().len(), 900);
        assert_eq!(files.iter().filter(|f| f.exists()).count(), 2);

        let summary = stats.summary();
        assert_eq!(summary.processed, 1);
        assert_eq!(summary.errors, 2);
        assert_eq!(summary.new_size_total, 900);
    }

    #[test]
    fn test_failure_cause_reaches_progress_line() {
        let (reporter, _) = reporter();
        let dispatcher = Dispatcher::new(1, Shutdown::new(), reporter).unwrap();
        let progress = ProgressManager::hidden(1);
        let mut report = DispatchReport::default();

        let outcome = TranscodeOutcome::Failed(MaintenanceError::Validation("output not created: a_opt.mp4".into()));
        dispatcher.handle_completion(Path::new("/m/a.mkv"), &outcome, &mut report, &progress);

        assert_eq!(report.failed, 1);
        assert_eq!(progress.position(), 1);
        assert_eq!(
            progress.message(),
            "[ERROR] a.mkv: Validation failed: output not created: a_opt.mp4"
        );
    }

    #[tokio::test]
    async fn test_empty_file_list() {
        let (reporter, _) = reporter();
        let task = TaskOptimizer::new(
            ToolRunner::new("ffmpeg", Duration::from_secs(1)),
            QualityPreset::Medium,
            reporter.clone(),
        );
        let report = Dispatcher::new(4, Shutdown::new(), reporter)
            .unwrap()
            .run(Vec::new(), task, &ProgressManager::hidden(0))
            .await
            .unwrap();
        assert_eq!(report, DispatchReport::default());
    }
}
