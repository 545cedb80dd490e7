//! # Optimizer Module
//!
//! Pipeline di transcodifica parallela, separata in sottomoduli:
//! - `media_optimizer`: Orchestratore della run (dedup → organize → transcode)
//! - `task_optimizer`: Job di transcodifica per singolo file
//! - `dispatcher`: Pool di worker con concorrenza limitata
//! - `path_resolver`: Calcolo centralizzato dei path derivati

pub mod dispatcher;
pub mod media_optimizer;
pub mod path_resolver;
pub mod task_optimizer;

pub use dispatcher::{DispatchReport, Dispatcher};
pub use media_optimizer::{MediaOptimizer, Operations, RunReport};
pub use path_resolver::PathResolver;
pub use task_optimizer::{SkipReason, TaskOptimizer, TranscodeOutcome};
