//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON (`--json`).
//!
//! Ogni messaggio è una singola riga su stdout, con un campo `type`:
//! - `start`: cartella target, operazioni richieste e configurazione
//! - `file_complete`: esito di un job di transcodifica
//! - `complete`: statistiche finali della run
//!
//! In questa modalità i log `tracing` vanno su stderr.

use crate::config::Config;
use crate::optimizer::task_optimizer::TranscodeOutcome;
use crate::progress::RunStatistics;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::error;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonMessage {
    Start {
        target: PathBuf,
        operations: Vec<String>,
        config: Config,
    },

    FileComplete {
        path: PathBuf,
        outcome: &'static str,
        original_size: Option<u64>,
        optimized_size: Option<u64>,
        output_path: Option<PathBuf>,
        reason: Option<String>,
    },

    Complete {
        duplicates_removed: Option<usize>,
        files_organized: Option<usize>,
        files_processed: u64,
        errors: u64,
        old_size_total: u64,
        new_size_total: u64,
        bytes_saved: u64,
        reduction_percent: f64,
        duration_seconds: f64,
    },
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        match serde_json::to_string(self) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Failed to serialize JSON message: {}", e),
        }
    }

    pub fn start(target: &Path, operations: Vec<String>, config: &Config) -> Self {
        Self::Start {
            target: target.to_path_buf(),
            operations,
            config: config.clone(),
        }
    }

    pub fn file_complete(path: &Path, outcome: &TranscodeOutcome) -> Self {
        let (original_size, optimized_size, output_path, reason) = match outcome {
            TranscodeOutcome::Succeeded { old_size, new_size, output_path } => {
                (Some(*old_size), Some(*new_size), Some(output_path.clone()), None)
            }
            TranscodeOutcome::Skipped(reason) => (None, None, None, Some(reason.to_string())),
            TranscodeOutcome::Failed(err) => (None, None, None, Some(err.to_string())),
        };

        Self::FileComplete {
            path: path.to_path_buf(),
            outcome: outcome.label(),
            original_size,
            optimized_size,
            output_path,
            reason,
        }
    }

    pub fn complete(
        duplicates_removed: Option<usize>,
        files_organized: Option<usize>,
        stats: &RunStatistics,
        duration_seconds: f64,
    ) -> Self {
        Self::Complete {
            duplicates_removed,
            files_organized,
            files_processed: stats.processed,
            errors: stats.errors,
            old_size_total: stats.old_size_total,
            new_size_total: stats.new_size_total,
            bytes_saved: stats.bytes_saved(),
            reduction_percent: stats.reduction_percent(),
            duration_seconds,
        }
    }
}
