//! # Reporter Module
//!
//! Unico punto di uscita per i messaggi di stato e di errore.
//!
//! Ogni chiamata a `error` emette un evento `tracing` e incrementa il
//! contatore errori dello `StatsAggregator` condiviso: un fallimento
//! corrisponde sempre a un messaggio e a un incremento. Gli esiti di tipo
//! "skip" passano da `info` e non vengono contati.
//!
//! Il subscriber `tracing-subscriber` scrive ogni evento con una singola
//! write, quindi le righe di worker concorrenti non si mescolano.

use crate::progress::{RunStatistics, StatsAggregator};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Cloneable logging handle bound to the run's statistics
#[derive(Debug, Clone)]
pub struct Reporter {
    stats: Arc<StatsAggregator>,
}

impl Reporter {
    pub fn new(stats: Arc<StatsAggregator>) -> Self {
        Self { stats }
    }

    pub fn info(&self, message: &str) {
        info!("{}", message);
    }

    pub fn debug(&self, message: &str) {
        debug!("{}", message);
    }

    /// Not counted as an error
    pub fn warn(&self, message: &str) {
        warn!("{}", message);
    }

    /// Log a failure and count it
    pub fn error(&self, message: &str) {
        error!("{}", message);
        self.stats.record_error();
    }

    pub fn stats(&self) -> &Arc<StatsAggregator> {
        &self.stats
    }

    pub fn summary(&self) -> RunStatistics {
        self.stats.summary()
    }
}
