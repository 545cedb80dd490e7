//! # Media Optimizer Main Orchestrator
//!
//! Orchestratore della run: esegue le passate richieste nell'ordine
//! dedup → organize → transcode e stampa il riepilogo finale.
//!
//! ## Flusso di esecuzione:
//! 1. **Validazione**: configurazione e cartella target, prima di toccare file
//! 2. **Dedup** (opzionale): passata sequenziale
//! 3. **Organize** (opzionale): passata sequenziale
//! 4. **Transcode** (opzionale): job paralleli sul pool di worker
//! 5. **Report**: riepilogo umano su stdout, oppure JSON con `--json`
//!
//! Dopo ogni passata, se è arrivato un Ctrl+C, la run termina con
//! `Interrupted`.

use crate::config::Config;
use crate::dedup::Deduplicator;
use crate::error::MaintenanceError;
use crate::file_manager::FileManager;
use crate::json_output::JsonMessage;
use crate::media::MediaCategory;
use crate::optimizer::dispatcher::{DispatchReport, Dispatcher};
use crate::optimizer::task_optimizer::TaskOptimizer;
use crate::organize::{OrganizeMode, Organizer};
use crate::progress::{ProgressManager, RunStatistics, StatsAggregator};
use crate::reporter::Reporter;
use crate::shutdown::Shutdown;
use crate::tool_runner::ToolRunner;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Which passes a run performs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Operations {
    pub dedup: bool,
    pub organize: Option<OrganizeMode>,
    pub transcode: bool,
}

impl Operations {
    pub fn any(&self) -> bool {
        self.dedup || self.organize.is_some() || self.transcode
    }

    pub fn names(&self) -> Vec<String> {
        let mut names = Vec::new();
        if self.dedup {
            names.push("dedup".to_string());
        }
        if let Some(mode) = self.organize {
            let mode = match mode {
                OrganizeMode::ByType => "type",
                OrganizeMode::BySize => "size",
            };
            names.push(format!("organize:{}", mode));
        }
        if self.transcode {
            names.push("transcode".to_string());
        }
        names
    }
}

/// What a finished run did
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub duplicates_removed: Option<usize>,
    pub files_organized: Option<usize>,
    pub transcode: Option<DispatchReport>,
    pub stats: RunStatistics,
    pub duration_seconds: f64,
}

/// Orchestratore principale
pub struct MediaOptimizer {
    config: Config,
    reporter: Reporter,
    shutdown: Shutdown,
}

impl MediaOptimizer {
    /// Validates the configuration; nothing is touched yet
    pub fn new(config: Config, shutdown: Shutdown) -> Result<Self, MaintenanceError> {
        config.validate()?;
        let reporter = Reporter::new(Arc::new(StatsAggregator::new()));

        Ok(Self {
            config,
            reporter,
            shutdown,
        })
    }

    /// Run the requested passes on `root` and print the summary
    pub async fn run(&self, root: &Path, operations: Operations) -> Result<RunReport, MaintenanceError> {
        Config::validate_target(root)?;
        let start_time = Instant::now();

        if self.config.json_output {
            JsonMessage::start(root, operations.names(), &self.config).emit();
        } else {
            self.reporter.info(&format!("Starting media maintenance in: {}", root.display()));
        }

        let mut report = RunReport {
            duplicates_removed: None,
            files_organized: None,
            transcode: None,
            stats: RunStatistics::default(),
            duration_seconds: 0.0,
        };

        if operations.dedup {
            let dedup = Deduplicator::new(self.reporter.clone(), self.shutdown.clone());
            let removed = run_blocking_pass("dedup", root, move |root| dedup.deduplicate(root)).await?;
            self.ensure_not_interrupted()?;
            report.duplicates_removed = Some(removed);
            self.print_line(&format!("✨ Removed {} duplicates", removed));
        }

        if let Some(mode) = operations.organize {
            let organizer = Organizer::new(self.reporter.clone(), self.shutdown.clone());
            let moved = run_blocking_pass("organize", root, move |root| organizer.organize(root, mode)).await?;
            self.ensure_not_interrupted()?;
            report.files_organized = Some(moved);
            self.print_line(&format!("✨ Organized {} files", moved));
        }

        if operations.transcode {
            report.transcode = Some(self.transcode_all(root).await?);
        }

        report.stats = self.reporter.summary();
        report.duration_seconds = start_time.elapsed().as_secs_f64();

        if operations.any() {
            self.print_final_stats(&report, operations);
        }

        Ok(report)
    }

    /// Parallel transcode pass over every media file under `root`
    async fn transcode_all(&self, root: &Path) -> Result<DispatchReport, MaintenanceError> {
        let candidates: Vec<PathBuf> = FileManager::list_files(root, &self.reporter)
            .into_iter()
            .filter(|path| MediaCategory::from_path(path).is_some())
            .collect();

        self.reporter.info(&format!(
            "Found {} media files to transcode (quality: {}, workers: {})",
            candidates.len(),
            self.config.quality,
            self.config.workers
        ));

        let runner = ToolRunner::new(self.config.encoder.clone(), self.config.tool_timeout())
            .verbose(self.config.verbose);
        let task = TaskOptimizer::new(runner, self.config.quality, self.reporter.clone());
        let dispatcher = Dispatcher::new(self.config.workers, self.shutdown.clone(), self.reporter.clone())?
            .with_json_output(self.config.json_output);

        let total = candidates.len() as u64;
        let progress = if self.config.json_output {
            ProgressManager::hidden(total)
        } else {
            ProgressManager::new(total)
        };

        let result = dispatcher.run(candidates, task, &progress).await;
        progress.finish(&self.reporter.summary().format_summary());
        result
    }

    fn ensure_not_interrupted(&self) -> Result<(), MaintenanceError> {
        if self.shutdown.is_triggered() {
            return Err(MaintenanceError::Interrupted);
        }
        Ok(())
    }

    /// Human output goes to stdout; JSON mode keeps stdout for JSON lines
    fn print_line(&self, line: &str) {
        if !self.config.json_output {
            println!("\n{}", line);
        }
    }

    /// Stampa statistiche finali
    fn print_final_stats(&self, report: &RunReport, operations: Operations) {
        if self.config.json_output {
            JsonMessage::complete(
                report.duplicates_removed,
                report.files_organized,
                &report.stats,
                report.duration_seconds,
            )
            .emit();
            return;
        }

        if operations.transcode {
            println!("\n🎉 {}", report.stats.format_summary());
        } else {
            println!("\nDone in {:.1}s | Errors: {}", report.duration_seconds, report.stats.errors);
        }
    }
}

/// Sequential passes do blocking filesystem I/O; keep them off the runtime workers
async fn run_blocking_pass<F>(pass: &str, root: &Path, walk: F) -> Result<usize, MaintenanceError>
where
    F: FnOnce(&Path) -> usize + Send + 'static,
{
    let root = root.to_path_buf();
    tokio::task::spawn_blocking(move || walk(&root))
        .await
        .map_err(|e| MaintenanceError::Unclassified(format!("{} pass crashed: {}", pass, e)))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::optimizer::task_optimizer::tests::sized_encoder;
    use tempfile::TempDir;

    fn config_with_encoder(encoder: PathBuf) -> Config {
        Config {
            encoder,
            workers: 2,
            tool_timeout_secs: 10,
            ..Default::default()
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_only_larger_video_is_replaced() {
        let tools = TempDir::new().unwrap();
        let media = TempDir::new().unwrap();
        std::fs::write(media.path().join("big.mp4"), vec![1u8; 10_000]).unwrap();
        std::fs::write(media.path().join("small.mp4"), vec![2u8; 1_000]).unwrap();

        let mut config = config_with_encoder(sized_encoder(tools.path(), 3_000));
        config.quality = crate::media::QualityPreset::Low;
        let optimizer = MediaOptimizer::new(config, Shutdown::new()).unwrap();
        let report = optimizer
            .run(media.path(), Operations { transcode: true, ..Default::default() })
            .await
            .unwrap();

        assert_eq!(report.stats.processed, 1);
        assert_eq!(report.stats.errors, 0);
        assert_eq!(report.stats.old_size_total, 10_000);
        assert!(report.stats.new_size_total < report.stats.old_size_total);

        assert!(!media.path().join("big.mp4").exists());
        assert!(media.path().join("big_opt.mp4").exists());
        assert!(media.path().join("small.mp4").exists());
        assert!(!media.path().join("small_opt.mp4").exists());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_missing_encoder_fails_every_candidate() {
        let media = TempDir::new().unwrap();
        for name in ["a.mkv", "b.flac", "c.png"] {
            std::fs::write(media.path().join(name), vec![5u8; 2_000]).unwrap();
        }
        std::fs::write(media.path().join("notes.txt"), b"not media").unwrap();

        let config = config_with_encoder(PathBuf::from("/nonexistent/encoder"));
        let optimizer = MediaOptimizer::new(config, Shutdown::new()).unwrap();
        let report = optimizer
            .run(media.path(), Operations { transcode: true, ..Default::default() })
            .await
            .unwrap();

        assert_eq!(report.stats.errors, 3);
        assert_eq!(report.stats.processed, 0);
        assert_eq!(report.transcode.unwrap().failed, 3);
        for name in ["a.mkv", "b.flac", "c.png", "notes.txt"] {
            assert!(media.path().join(name).exists());
        }
    }

    #[tokio::test]
    async fn test_passes_run_in_order() {
        let tools = TempDir::new().unwrap();
        let media = TempDir::new().unwrap();
        std::fs::create_dir_all(media.path().join("sub")).unwrap();
        std::fs::write(media.path().join("sub/a.wav"), vec![9u8; 4_000]).unwrap();
        std::fs::write(media.path().join("z.wav"), vec![9u8; 4_000]).unwrap();

        let optimizer = MediaOptimizer::new(config_with_encoder(sized_encoder(tools.path(), 100)), Shutdown::new()).unwrap();
        let report = optimizer
            .run(
                media.path(),
                Operations {
                    dedup: true,
                    organize: Some(OrganizeMode::ByType),
                    transcode: true,
                },
            )
            .await
            .unwrap();

        assert_eq!(report.duplicates_removed, Some(1));
        assert_eq!(report.files_organized, Some(1));
        assert_eq!(report.stats.processed, 1);
        assert!(media.path().join("wav/a_opt.opus").exists());
        assert!(!media.path().join("wav/a.wav").exists());
        assert!(!media.path().join("z.wav").exists());
    }

    #[tokio::test]
    async fn test_invalid_target_is_rejected_before_work() {
        let media = TempDir::new().unwrap();
        let optimizer = MediaOptimizer::new(Config::default(), Shutdown::new()).unwrap();
        let result = optimizer
            .run(&media.path().join("missing"), Operations { dedup: true, ..Default::default() })
            .await;
        assert!(matches!(result, Err(MaintenanceError::InvalidInput(_))));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = Config {
            workers: 0,
            ..Default::default()
        };
        assert!(matches!(
            MediaOptimizer::new(config, Shutdown::new()),
            Err(MaintenanceError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_interrupt_before_run_reports_interrupted() {
        let media = TempDir::new().unwrap();
        std::fs::write(media.path().join("a.txt"), b"x").unwrap();
        let shutdown = Shutdown::new();
        shutdown.trigger();

        let optimizer = MediaOptimizer::new(Config::default(), shutdown).unwrap();
        let result = optimizer
            .run(media.path(), Operations { dedup: true, ..Default::default() })
            .await;
        assert!(matches!(result, Err(MaintenanceError::Interrupted)));
        tokio_test::assert_ok!(Config::validate_target(media.path()));
        assert!(media.path().join("a.txt").exists());
    }

    #[tokio::test]
    async fn test_crashed_pass_is_unclassified() {
        let media = TempDir::new().unwrap();
        let result = run_blocking_pass("dedup", media.path(), |_| panic!("walk exploded")).await;
        match result {
            Err(MaintenanceError::Unclassified(msg)) => assert!(msg.starts_with("dedup pass crashed")),
            other => panic!("unexpected result: {other:?}"),
        }

        let counted = run_blocking_pass("organize", media.path(), |root| root.components().count()).await;
        assert_eq!(counted.unwrap(), media.path().components().count());
    }

    #[test]
    fn test_operation_names() {
        let ops = Operations {
            dedup: true,
            organize: Some(OrganizeMode::BySize),
            transcode: false,
        };
        assert!(ops.any());
        assert_eq!(ops.names(), vec!["dedup", "organize:size"]);
        assert!(!Operations::default().any());
    }
}
