pub mod batcher;
pub mod delivery;
pub mod import;
pub mod preconditions;
pub mod projector;

pub use crate::domain::model::{Batch, DeliveryOutcome, RunSummary, UserRecord, WireRecord};
pub use crate::domain::ports::{Preconditions, ProgressSink, RecordSource};
pub use crate::utils::error::Result;
