//! # File Management Module
//!
//! Questo modulo gestisce la discovery dei file e le utilità sulle dimensioni.
//!
//! ## Responsabilità:
//! - Discovery ricorsiva dei file regolari sotto una cartella
//! - Ordinamento deterministico dei path (necessario per la deduplica)
//! - Formattazione human-readable delle dimensioni
//! - Calcolo della percentuale di riduzione
//!
//! ## Ordinamento:
//! I path vengono ordinati con l'ordinamento di `PathBuf`, che confronta
//! componente per componente. Due run sullo stesso albero producono
//! sempre la stessa sequenza.

use crate::reporter::Reporter;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Manages file discovery and size helpers
pub struct FileManager;

impl FileManager {
    /// All regular files under `root`, sorted. Symlinks are not followed.
    ///
    /// Unreadable entries are reported as errors and skipped.
    pub fn list_files(root: &Path, reporter: &Reporter) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for entry in WalkDir::new(root) {
            match entry {
                Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
                Ok(_) => {}
                Err(e) => reporter.error(&format!("Walk failed under {}: {}", root.display(), e)),
            }
        }

        files.sort();
        files
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    /// Calculate percentage reduction
    pub fn calculate_reduction(original_size: u64, new_size: u64) -> f64 {
        if original_size == 0 {
            0.0
        } else {
            ((original_size as f64 - new_size as f64) / original_size as f64) * 100.0
        }
    }

    /// File name for log lines, falling back to the full path
    pub fn display_name(path: &Path) -> String {
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    }
}
