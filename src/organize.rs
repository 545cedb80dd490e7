//! # Organization Module
//!
//! Sposta i file in sottocartelle della root, per tipo o per dimensione.
//!
//! - `ByType`: estensione minuscola senza punto (`noext` se assente)
//! - `BySize`: megabyte interi arrotondati per difetto (`0MB`, `2MB`, ...)
//!
//! Un file che si trova già nella cartella giusta non viene toccato, quindi
//! una seconda passata non sposta nulla. In caso di collisione di nomi vale
//! la semantica di `rename` della piattaforma (su Unix sovrascrive).

use crate::file_manager::FileManager;
use crate::optimizer::path_resolver::PathResolver;
use crate::reporter::Reporter;
use crate::shutdown::Shutdown;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

/// How files are grouped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum OrganizeMode {
    #[value(name = "type")]
    #[serde(rename = "type")]
    ByType,
    #[value(name = "size")]
    #[serde(rename = "size")]
    BySize,
}

/// Sequential bucket mover
pub struct Organizer {
    reporter: Reporter,
    shutdown: Shutdown,
}

impl Organizer {
    pub fn new(reporter: Reporter, shutdown: Shutdown) -> Self {
        Self { reporter, shutdown }
    }

    /// Move each file into its bucket under `root`; returns how many moved
    pub fn organize(&self, root: &Path, mode: OrganizeMode) -> usize {
        let mut moved = 0;

        for path in FileManager::list_files(root, &self.reporter) {
            if self.shutdown.is_triggered() {
                self.reporter.warn("Organization interrupted");
                break;
            }

            let name = FileManager::display_name(&path);
            let size = match std::fs::metadata(&path) {
                Ok(metadata) => metadata.len(),
                Err(e) => {
                    self.reporter.error(&format!("Move failed for {}: {}", name, e));
                    continue;
                }
            };

            let target_dir = PathResolver::bucket_dir(root, &path, size, mode);
            if path.parent() == Some(target_dir.as_path()) {
                continue;
            }

            match move_into(&path, &target_dir) {
                Ok(()) => {
                    self.reporter.info(&format!(
                        "📂 Moved: {} → {}",
                        name,
                        FileManager::display_name(&target_dir)
                    ));
                    moved += 1;
                }
                Err(e) => self.reporter.error(&format!("Move failed for {}: {}", name, e)),
            }
        }

        moved
    }
}

fn move_into(path: &Path, target_dir: &Path) -> io::Result<()> {
    std::fs::create_dir_all(target_dir)?;
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
    std::fs::rename(path, target_dir.join(file_name))
}
