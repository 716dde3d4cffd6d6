pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;

pub use adapters::{InMemorySource, JsonLinesSource, UserRow};
pub use config::{DeploymentMode, ExportConfig};
pub use crate::core::{
    batcher::Batcher,
    delivery::{DeliveryClient, RetryPolicy},
    import::ImportRun,
    preconditions::ConfigPreconditions,
};
pub use domain::model::{Batch, DeliveryOutcome, RunSummary, UserRecord, WireRecord, MAX_BATCH_SIZE};
pub use utils::error::{ExportError, Result};
