//! # Task Optimizer Module
//!
//! Job di transcodifica per un singolo file.
//!
//! ## Pipeline per file:
//! 1. Verifica che il sorgente sia un file regolare (altrimenti `Failed`)
//! 2. Classifica per estensione (tipo non supportato → `Skipped`, non è un errore)
//! 3. Calcola il path di output `<stem>_opt.<ext>` e lo riserva in modo
//!    esclusivo: se esiste già (file dell'utente o output di un altro job
//!    con lo stesso stem) il job fallisce senza toccarlo
//! 4. Legge la dimensione originale
//! 5. Esegue l'encoder con timeout
//! 6. Verifica che l'output esista e non sia vuoto
//! 7. Se l'output non è più piccolo lo elimina → `Skipped(NoSavings)`
//! 8. Altrimenti aggiorna le statistiche (un solo lock), elimina l'originale
//!    e ritorna `Succeeded`
//!
//! Qualunque errore nei passi 4-8 viene loggato una sola volta, l'output
//! parziale viene rimosso e il job ritorna `Failed`: il worker pool non
//! vede mai un errore.
//!
//! ## Policy sull'originale:
//! Le statistiche vengono aggiornate prima di eliminare l'originale. Se la
//! cancellazione fallisce l'errore viene loggato ma il file ottimizzato
//! resta e il job è comunque `Succeeded`.

use crate::error::MaintenanceError;
use crate::file_manager::FileManager;
use crate::media::{MediaCategory, QualityPreset};
use crate::optimizer::path_resolver::PathResolver;
use crate::reporter::Reporter;
use crate::tool_runner::ToolRunner;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Why a job left the file alone without it being an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    UnsupportedType,
    NoSavings,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedType => f.write_str("unsupported type"),
            Self::NoSavings => f.write_str("no savings"),
        }
    }
}

/// Result of one transcode job
#[derive(Debug)]
pub enum TranscodeOutcome {
    Skipped(SkipReason),
    Failed(MaintenanceError),
    Succeeded {
        old_size: u64,
        new_size: u64,
        output_path: PathBuf,
    },
}

impl TranscodeOutcome {
    /// Short label used in progress and JSON output
    pub fn label(&self) -> &'static str {
        match self {
            Self::Skipped(_) => "skipped",
            Self::Failed(_) => "failed",
            Self::Succeeded { .. } => "succeeded",
        }
    }
}

/// Worker per elaborazione singoli file
#[derive(Debug, Clone)]
pub struct TaskOptimizer {
    runner: ToolRunner,
    quality: QualityPreset,
    reporter: Reporter,
}

impl TaskOptimizer {
    pub fn new(runner: ToolRunner, quality: QualityPreset, reporter: Reporter) -> Self {
        Self {
            runner,
            quality,
            reporter,
        }
    }

    /// Transcode one file. Never returns an error: failures become `Failed`.
    pub async fn transcode(&self, src: &Path) -> TranscodeOutcome {
        let is_file = tokio::fs::metadata(src)
            .await
            .map(|metadata| metadata.is_file())
            .unwrap_or(false);
        if !is_file {
            let err = MaintenanceError::invalid_source(src);
            self.reporter.error(&err.to_string());
            return TranscodeOutcome::Failed(err);
        }

        let Some(category) = MediaCategory::from_path(src) else {
            self.reporter.debug(&format!("Unsupported type, leaving alone: {}", src.display()));
            return TranscodeOutcome::Skipped(SkipReason::UnsupportedType);
        };

        let Some(output_path) = PathResolver::optimized_output_path(src, category) else {
            let err = MaintenanceError::invalid_source(src);
            self.reporter.error(&err.to_string());
            return TranscodeOutcome::Failed(err);
        };

        if let Err(err) = claim_output(&output_path).await {
            self.reporter.error(&format!(
                "Transcode failed for {}: {}",
                FileManager::display_name(src),
                err
            ));
            return TranscodeOutcome::Failed(err);
        }

        match self.run_job(src, category, &output_path).await {
            Ok(outcome) => outcome,
            Err(err) => {
                self.reporter.error(&format!(
                    "Transcode failed for {}: {}",
                    FileManager::display_name(src),
                    err
                ));
                discard_output(&output_path, &self.reporter).await;
                TranscodeOutcome::Failed(err)
            }
        }
    }

    async fn run_job(
        &self,
        src: &Path,
        category: MediaCategory,
        output_path: &Path,
    ) -> Result<TranscodeOutcome, MaintenanceError> {
        let name = FileManager::display_name(src);
        let old_size = tokio::fs::metadata(src).await?.len();

        self.reporter.info(&format!("🎬 Transcoding {}: {}", category, name));
        let args = category.encoder_args(src, output_path, self.quality);
        self.runner.run(&args).await?;

        // The claimed placeholder is empty until the encoder writes to it.
        let new_size = match tokio::fs::metadata(output_path).await {
            Ok(metadata) if metadata.len() > 0 => metadata.len(),
            Ok(_) => return Err(output_not_created(output_path)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(output_not_created(output_path)),
            Err(e) => return Err(e.into()),
        };

        if new_size >= old_size {
            tokio::fs::remove_file(output_path).await?;
            self.reporter.info(&format!("⏩ Skipped (no savings): {}", name));
            return Ok(TranscodeOutcome::Skipped(SkipReason::NoSavings));
        }

        self.reporter.stats().record(old_size, new_size);
        self.reporter.info(&format!(
            "✅ {}: {} → {} ({:.1}% saved)",
            name,
            FileManager::format_size(old_size),
            FileManager::format_size(new_size),
            FileManager::calculate_reduction(old_size, new_size)
        ));

        if let Err(e) = tokio::fs::remove_file(src).await {
            self.reporter.error(&format!("Failed to remove original {}: {}", name, e));
        }

        Ok(TranscodeOutcome::Succeeded {
            old_size,
            new_size,
            output_path: output_path.to_path_buf(),
        })
    }
}

/// Create the output path exclusively, so no other job or pre-existing file
/// is ever overwritten. From here on the job owns that path.
async fn claim_output(output_path: &Path) -> Result<(), MaintenanceError> {
    match tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(output_path)
        .await
    {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(MaintenanceError::Validation(format!(
            "output already exists: {}",
            output_path.display()
        ))),
        Err(e) => Err(e.into()),
    }
}

fn output_not_created(output_path: &Path) -> MaintenanceError {
    MaintenanceError::Validation(format!("output not created: {}", output_path.display()))
}

/// Remove whatever a failed job left at its claimed output path
async fn discard_output(output_path: &Path, reporter: &Reporter) {
    match tokio::fs::remove_file(output_path).await {
        Ok(()) => reporter.debug(&format!("Removed partial output {}", output_path.display())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => reporter.warn(&format!(
            "Could not remove partial output {}: {}",
            output_path.display(),
            e
        )),
    }
}
