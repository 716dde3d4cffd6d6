use crate::domain::model::UserRecord;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Paginated access to the records being exported.
#[async_trait]
pub trait RecordSource: Send {
    type Record: UserRecord + Send;

    /// Returns up to `limit` records starting at `offset`. A page shorter than
    /// `limit` marks the end of the source.
    async fn fetch_page(&mut self, offset: usize, limit: usize) -> Result<Vec<Self::Record>>;
}

/// Checks that must all hold before any batch is assembled.
pub trait Preconditions {
    fn is_production(&self) -> bool;
    fn source_resolvable(&self) -> bool;
    fn source_supported(&self) -> bool;
    fn credentials_present(&self) -> bool;
}

/// Receives per-batch delivery results for display.
pub trait ProgressSink {
    fn batch_delivered(&mut self, sent: usize, failed: usize);

    fn finish(&mut self) {}
}
