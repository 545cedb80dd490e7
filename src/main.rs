//! # Media Sweeper - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del logging con `tracing`
//! - Validazione della cartella target prima di qualsiasi elaborazione
//! - Installazione del gestore Ctrl+C
//! - Avvio delle passate richieste (dedup → organize → transcode)
//!
//! ## Exit code:
//! - 0: run completata, riepilogo stampato su stdout
//! - 1: cartella non valida, configurazione non valida, interruzione
//!   dell'utente o errore inatteso (il messaggio descrive la causa)
//! - 130: secondo Ctrl+C durante l'elaborazione
//!
//! ## Esempio di utilizzo:
//! ```bash
//! media-sweeper /path/to/media --dedup --organize type --transcode --quality high --threads 8
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use media_sweeper::config::DEFAULT_TOOL_TIMEOUT_SECS;
use media_sweeper::{Config, MediaOptimizer, Operations, OrganizeMode, QualityPreset, Shutdown};

#[derive(Parser, Debug)]
#[command(name = "media-sweeper")]
#[command(about = "Deduplicate, organize and transcode the media files of a folder")]
struct Args {
    /// Target folder
    folder: PathBuf,

    /// Remove files whose content duplicates an earlier file
    #[arg(long)]
    dedup: bool,

    /// Move files into sub-folders by extension or by size in MB
    #[arg(long, value_enum)]
    organize: Option<OrganizeMode>,

    /// Transcode media files to smaller formats
    #[arg(long)]
    transcode: bool,

    /// Quality preset for transcoding
    #[arg(long, value_enum, default_value_t = QualityPreset::Medium)]
    quality: QualityPreset,

    /// Parallel transcode workers
    #[arg(long, default_value_t = 4)]
    threads: usize,

    /// Encoder executable
    #[arg(long, default_value = "ffmpeg")]
    encoder: PathBuf,

    /// Timeout in seconds for each encoder run
    #[arg(long, default_value_t = DEFAULT_TOOL_TIMEOUT_SECS)]
    timeout: u64,

    /// Emit JSON lines on stdout (logs go to stderr)
    #[arg(long)]
    json: bool,

    /// Log every encoder command line before running it
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            quality: self.quality,
            workers: self.threads,
            encoder: self.encoder.clone(),
            tool_timeout_secs: self.timeout,
            verbose: self.verbose,
            json_output: self.json,
        }
    }

    fn operations(&self) -> Operations {
        Operations {
            dedup: self.dedup,
            organize: self.organize,
            transcode: self.transcode,
        }
    }
}

fn init_logging(verbose: bool, json: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    if json {
        tracing::subscriber::set_global_default(builder.with_writer(std::io::stderr).finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.json)?;

    // Validate before any processing
    Config::validate_target(&args.folder)?;

    let operations = args.operations();
    if !operations.any() {
        warn!("Nothing to do: pass --dedup, --organize or --transcode");
        return Ok(());
    }

    let shutdown = Shutdown::new();
    shutdown.listen_for_ctrl_c();

    let optimizer = MediaOptimizer::new(args.config(), shutdown)?;
    optimizer.run(&args.folder, operations).await?;

    Ok(())
}
