//! # Deduplication Module
//!
//! Rimuove i file con contenuto identico.
//!
//! ## Regole:
//! - I file vengono visitati in ordine di path (deterministico)
//! - Il primo file con un dato digest è quello autorevole e resta
//! - Ogni file successivo con lo stesso digest viene eliminato
//! - Un file che non si riesce a leggere viene loggato come errore e
//!   ignorato: non è né un duplicato né un precedente
//!
//! La passata è strettamente sequenziale: l'ordine di visita decide quale
//! copia sopravvive.

use crate::file_manager::FileManager;
use crate::hasher;
use crate::reporter::Reporter;
use crate::shutdown::Shutdown;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A file and its content digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    pub digest: String,
}

/// Sequential duplicate remover
pub struct Deduplicator {
    reporter: Reporter,
    shutdown: Shutdown,
}

impl Deduplicator {
    pub fn new(reporter: Reporter, shutdown: Shutdown) -> Self {
        Self { reporter, shutdown }
    }

    /// Delete every later copy of already-seen content; returns how many were deleted
    pub fn deduplicate(&self, root: &Path) -> usize {
        let mut seen: HashMap<String, FileRecord> = HashMap::new();
        let mut removed = 0;

        for path in FileManager::list_files(root, &self.reporter) {
            if self.shutdown.is_triggered() {
                self.reporter.warn("Deduplication interrupted");
                break;
            }

            let digest = match hasher::hash_file(&path) {
                Ok(digest) => digest,
                Err(e) => {
                    self.reporter.error(&format!(
                        "Hash failed for {}: {}",
                        FileManager::display_name(&path),
                        e
                    ));
                    continue;
                }
            };

            if let Some(original) = seen.get(&digest) {
                match std::fs::remove_file(&path) {
                    Ok(()) => {
                        self.reporter.info(&format!(
                            "🗑️ Removed duplicate: {} (same as {})",
                            FileManager::display_name(&path),
                            original.path.display()
                        ));
                        removed += 1;
                    }
                    Err(e) => self.reporter.error(&format!(
                        "Failed to remove {}: {}",
                        FileManager::display_name(&path),
                        e
                    )),
                }
            } else {
                seen.insert(digest.clone(), FileRecord { path, digest });
            }
        }

        removed
    }
}
