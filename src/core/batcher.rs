use crate::core::projector::project;
use crate::domain::model::{Batch, WireRecord, MAX_BATCH_SIZE};
use crate::domain::ports::RecordSource;
use crate::utils::error::Result;
use std::collections::VecDeque;

/// Page size requested from the source when none is configured.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Pulls records page by page from a source and groups their projections
/// into batches of at most [`MAX_BATCH_SIZE`].
pub struct Batcher<S: RecordSource> {
    source: S,
    page_size: usize,
    offset: usize,
    exhausted: bool,
    pending: VecDeque<WireRecord>,
    skipped: usize,
}

impl<S: RecordSource> Batcher<S> {
    pub fn new(source: S) -> Self {
        Self::with_page_size(source, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(source: S, page_size: usize) -> Self {
        Self {
            source,
            page_size: page_size.max(1),
            offset: 0,
            exhausted: false,
            pending: VecDeque::new(),
            skipped: 0,
        }
    }

    /// Records dropped by projection so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Returns the next batch, or `None` once the source is drained.
    /// A returned batch is never empty.
    pub async fn next_batch(&mut self) -> Result<Option<Batch>> {
        while self.pending.len() < MAX_BATCH_SIZE && !self.exhausted {
            self.fill_from_next_page().await?;
        }

        // 來源耗盡且無剩餘紀錄時為空，Batch::new 回傳 None
        let take = self.pending.len().min(MAX_BATCH_SIZE);
        let users: Vec<WireRecord> = self.pending.drain(..take).collect();
        Ok(Batch::new(users))
    }

    async fn fill_from_next_page(&mut self) -> Result<()> {
        let page = self.source.fetch_page(self.offset, self.page_size).await?;
        self.offset += page.len();
        if page.len() < self.page_size {
            self.exhausted = true;
        }

        for record in &page {
            match project(record) {
                Some(wire) => self.pending.push_back(wire),
                None => self.skipped += 1,
            }
        }

        tracing::debug!(
            offset = self.offset,
            page_len = page.len(),
            pending = self.pending.len(),
            "Fetched source page"
        );
        Ok(())
    }
}
