use crate::domain::model::UserRecord;
use crate::domain::ports::RecordSource;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Vec-backed source, for callers that already hold their records in memory.
#[derive(Debug, Clone)]
pub struct InMemorySource<R> {
    records: Vec<R>,
}

impl<R> InMemorySource<R> {
    pub fn new(records: Vec<R>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl<R> RecordSource for InMemorySource<R>
where
    R: UserRecord + Clone + Send + Sync,
{
    type Record = R;

    async fn fetch_page(&mut self, offset: usize, limit: usize) -> Result<Vec<R>> {
        let start = offset.min(self.records.len());
        let end = offset.saturating_add(limit).min(self.records.len());
        Ok(self.records[start..end].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::UserRow;

    fn rows(n: usize) -> Vec<UserRow> {
        (0..n).map(|i| UserRow::with_id(i.to_string())).collect()
    }

    #[tokio::test]
    async fn test_pages_are_contiguous() {
        let mut source = InMemorySource::new(rows(5));

        let first = source.fetch_page(0, 2).await.unwrap();
        let second = source.fetch_page(2, 2).await.unwrap();
        let last = source.fetch_page(4, 2).await.unwrap();
        let past_end = source.fetch_page(6, 2).await.unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(second[0].user_id(), Some("2".to_string()));
        assert_eq!(last.len(), 1);
        assert!(past_end.is_empty());
    }
}
