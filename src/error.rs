//! # Error Types Module
//!
//! Questo modulo definisce la tassonomia degli errori della libreria.
//!
//! ## Categorie di errori:
//! - `InvalidInput`: path o cartella non validi
//! - `Tool`: fallimento del tool esterno (timeout, exit code, eseguibile mancante)
//! - `Validation`: output mancante o non più piccolo dell'originale
//! - `Filesystem`: errori di I/O (delete, move, read)
//! - `Config`: parametri di configurazione non validi
//! - `Interrupted`: interruzione da parte dell'utente
//! - `Unclassified`: qualunque altro errore inatteso
//!
//! Gli errori per singolo file vengono catturati al confine del file e
//! loggati; solo `Config`, `InvalidInput` della cartella e `Interrupted`
//! risalgono fino a `main`.

use std::path::PathBuf;
use std::time::Duration;

/// Failure taxonomy for every maintenance operation
#[derive(thiserror::Error, Debug)]
pub enum MaintenanceError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Interrupted by user")]
    Interrupted,

    #[error("Unexpected error: {0}")]
    Unclassified(String),
}

/// Ways an external tool invocation can fail
#[derive(thiserror::Error, Debug)]
pub enum ToolError {
    #[error("Tool not found: {tool} - install ffmpeg!")]
    NotFound { tool: String },

    #[error("Command timeout: {tool} exceeded {}s", .timeout.as_secs())]
    Timeout { tool: String, timeout: Duration },

    #[error("Command failed: {tool} exited with {status}: {stderr}")]
    NonZeroExit {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("Failed to launch {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },
}

impl MaintenanceError {
    /// Shorthand for a source path that is not a regular file
    pub fn invalid_source(path: impl Into<PathBuf>) -> Self {
        Self::InvalidInput(format!("invalid source: {}", path.into().display()))
    }
}
