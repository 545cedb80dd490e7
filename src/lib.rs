//! # Media Sweeper Library
//!
//! Manutenzione di una cartella di media: deduplica per contenuto,
//! riorganizzazione per tipo o dimensione, transcodifica parallela verso
//! formati più compatti tramite un encoder esterno (ffmpeg).
//!
//! ## Architettura dei moduli:
//! - `config`: Configurazione e validazione parametri
//! - `error`: Tassonomia degli errori
//! - `media`: Tabella fissa categorie → estensioni → argomenti encoder
//! - `tool_runner`: Esecuzione dell'encoder con timeout
//! - `hasher`: Digest SHA-256 a blocchi
//! - `progress`: Statistiche condivise e progress bar
//! - `reporter`: Funnel unico per log e conteggio errori
//! - `shutdown`: Gestione Ctrl+C
//! - `dedup` / `organize`: Passate sequenziali sull'albero
//! - `optimizer`: Job di transcodifica, dispatcher parallelo, orchestratore
//! - `json_output`: Output JSON line-based
//!
//! ## Utilizzo:
//! ```no_run
//! use media_sweeper::{Config, MediaOptimizer, Operations, Shutdown};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), media_sweeper::MaintenanceError> {
//! let optimizer = MediaOptimizer::new(Config::default(), Shutdown::new())?;
//! let ops = Operations { dedup: true, transcode: true, ..Default::default() };
//! let report = optimizer.run(Path::new("/media/camera"), ops).await?;
//! println!("{}", report.stats.format_summary());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dedup;
pub mod error;
pub mod file_manager;
pub mod hasher;
pub mod json_output;
pub mod media;
pub mod optimizer;
pub mod organize;
pub mod progress;
pub mod reporter;
pub mod shutdown;
pub mod tool_runner;
pub mod utils;

pub use config::Config;
pub use error::{MaintenanceError, ToolError};
pub use media::{MediaCategory, QualityPreset};
pub use optimizer::{MediaOptimizer, Operations, RunReport, TranscodeOutcome};
pub use organize::OrganizeMode;
pub use progress::{RunStatistics, StatsAggregator};
pub use shutdown::Shutdown;
