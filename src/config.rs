//! # Configuration Management Module
//!
//! Questo modulo gestisce la configurazione della run.
//!
//! ## Parametri di configurazione:
//! - `quality`: Preset di qualità (low/medium/high, default: medium)
//! - `workers`: Numero di worker paralleli (default: 4)
//! - `encoder`: Eseguibile dell'encoder esterno (default: `ffmpeg`)
//! - `tool_timeout_secs`: Timeout per ogni invocazione (default: 300s)
//! - `verbose`: Logga ogni comando prima di eseguirlo
//! - `json_output`: Output JSON line-based per uso programmatico
//!
//! ## Validazione:
//! - `workers` deve essere > 0
//! - `tool_timeout_secs` deve essere > 0
//! - La cartella target deve esistere ed essere una directory
//!
//! ## Esempio:
//! ```rust
//! use media_sweeper::{Config, QualityPreset};
//!
//! let config = Config {
//!     quality: QualityPreset::High,
//!     workers: 8,
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use crate::error::MaintenanceError;
use crate::media::QualityPreset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default wall-clock limit for one encoder invocation
pub const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 300;

/// Configuration for a maintenance run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Quality preset for transcoding
    pub quality: QualityPreset,
    /// Number of parallel transcode workers
    pub workers: usize,
    /// Encoder executable (name looked up in PATH, or a path)
    pub encoder: PathBuf,
    /// Per-invocation timeout in seconds
    pub tool_timeout_secs: u64,
    /// Log every encoder command line before running it
    pub verbose: bool,
    /// Emit JSON lines on stdout instead of a human summary
    pub json_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            workers: 4,
            encoder: PathBuf::from("ffmpeg"),
            tool_timeout_secs: DEFAULT_TOOL_TIMEOUT_SECS,
            verbose: false,
            json_output: false,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), MaintenanceError> {
        if self.workers == 0 {
            return Err(MaintenanceError::Config(
                "Number of workers must be greater than 0".to_string(),
            ));
        }

        if self.tool_timeout_secs == 0 {
            return Err(MaintenanceError::Config(
                "Tool timeout must be greater than 0 seconds".to_string(),
            ));
        }

        if self.encoder.as_os_str().is_empty() {
            return Err(MaintenanceError::Config("Encoder path must not be empty".to_string()));
        }

        Ok(())
    }

    /// The target folder must exist and be a directory
    pub fn validate_target(path: &Path) -> Result<(), MaintenanceError> {
        if !path.exists() {
            return Err(MaintenanceError::InvalidInput(format!(
                "Target folder does not exist: {}",
                path.display()
            )));
        }
        if !path.is_dir() {
            return Err(MaintenanceError::InvalidInput(format!(
                "Target path is not a directory: {}",
                path.display()
            )));
        }
        Ok(())
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }
}
