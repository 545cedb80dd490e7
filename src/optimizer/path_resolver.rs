//! # Path Resolution Module
//!
//! Centralizza il calcolo dei path derivati:
//! - path del file transcodificato (`<stem>_opt.<ext>` accanto all'originale)
//! - cartella di destinazione per l'organizzazione (per tipo o per dimensione)

use crate::media::MediaCategory;
use crate::organize::OrganizeMode;
use std::path::{Path, PathBuf};

/// Suffix appended to the stem of transcoded files
pub const OPTIMIZED_SUFFIX: &str = "_opt";

/// Bucket used by `OrganizeMode::ByType` for files without an extension
pub const NO_EXTENSION_BUCKET: &str = "noext";

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Utility per calcolare i path in modo centralizzato
pub struct PathResolver;

impl PathResolver {
    /// `dir/clip.MOV` → `dir/clip_opt.mp4`. `None` when the path has no file stem.
    pub fn optimized_output_path(input_path: &Path, category: MediaCategory) -> Option<PathBuf> {
        let file_stem = input_path.file_stem()?.to_string_lossy();
        let filename = format!(
            "{}{}.{}",
            file_stem,
            OPTIMIZED_SUFFIX,
            category.output_extension()
        );
        Some(input_path.with_file_name(filename))
    }

    /// Name of the bucket directory a file belongs in
    pub fn bucket_name(path: &Path, size_bytes: u64, mode: OrganizeMode) -> String {
        match mode {
            OrganizeMode::ByType => path
                .extension()
                .map(|ext| ext.to_string_lossy().to_lowercase())
                .filter(|ext| !ext.is_empty())
                .unwrap_or_else(|| NO_EXTENSION_BUCKET.to_string()),
            OrganizeMode::BySize => format!("{}MB", size_bytes / BYTES_PER_MB),
        }
    }

    /// `root/<bucket>`
    pub fn bucket_dir(root: &Path, path: &Path, size_bytes: u64, mode: OrganizeMode) -> PathBuf {
        root.join(Self::bucket_name(path, size_bytes, mode))
    }
}
