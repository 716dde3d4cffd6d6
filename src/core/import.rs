use crate::core::batcher::Batcher;
use crate::core::delivery::DeliveryClient;
use crate::core::preconditions::ensure_preconditions;
use crate::domain::model::RunSummary;
use crate::domain::ports::{Preconditions, ProgressSink, RecordSource};
use crate::utils::error::Result;
use std::time::Instant;

/// One export run: drains the source batch by batch and delivers each batch
/// before assembling the next.
///
/// A delivery error aborts the whole run; the partial summary is discarded.
pub struct ImportRun<S: RecordSource> {
    batcher: Batcher<S>,
    client: DeliveryClient,
}

impl<S: RecordSource> ImportRun<S> {
    pub fn new(source: S, client: DeliveryClient) -> Self {
        Self::from_batcher(Batcher::new(source), client)
    }

    pub fn from_batcher(batcher: Batcher<S>, client: DeliveryClient) -> Self {
        Self { batcher, client }
    }

    pub async fn run<P, G>(mut self, checks: &P, progress: &mut G) -> Result<RunSummary>
    where
        P: Preconditions + ?Sized,
        G: ProgressSink + ?Sized,
    {
        ensure_preconditions(checks)?;

        let started = Instant::now();
        let mut summary = RunSummary::default();

        while let Some(batch) = self.batcher.next_batch().await? {
            let record_count = batch.record_count();
            // 組批即計入，與遠端是否接受無關
            summary.total_sent += record_count;
            summary.batches += 1;

            let outcome = self.client.deliver(&batch).await?;
            tracing::info!(
                batch = summary.batches,
                records = record_count,
                rejected = outcome.failed.len(),
                "Batch delivered"
            );

            progress.batch_delivered(record_count, outcome.failed.len());
            summary.failed.extend(outcome.failed);
        }

        progress.finish();
        summary.skipped = self.batcher.skipped();
        summary.duration = started.elapsed();
        Ok(summary)
    }

    /// Projects and batches the whole source without sending anything.
    pub async fn dry_run<P>(mut self, checks: &P) -> Result<RunSummary>
    where
        P: Preconditions + ?Sized,
    {
        ensure_preconditions(checks)?;

        let started = Instant::now();
        let mut summary = RunSummary::default();

        while let Some(batch) = self.batcher.next_batch().await? {
            summary.total_sent += batch.record_count();
            summary.batches += 1;
            tracing::debug!(
                batch = summary.batches,
                records = batch.record_count(),
                "Would deliver batch to {}",
                self.client.endpoint()
            );
        }

        summary.skipped = self.batcher.skipped();
        summary.duration = started.elapsed();
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemorySource, UserRow};
    use crate::core::delivery::{RetryPolicy, BULK_CREATE_PATH};
    use crate::utils::error::ExportError;
    use crate::utils::progress::{ConsoleProgress, SilentProgress};
    use httpmock::prelude::*;
    use std::time::Duration;

    struct AllowAll;

    impl Preconditions for AllowAll {
        fn is_production(&self) -> bool {
            true
        }
        fn source_resolvable(&self) -> bool {
            true
        }
        fn source_supported(&self) -> bool {
            true
        }
        fn credentials_present(&self) -> bool {
            true
        }
    }

    struct NotProduction;

    impl Preconditions for NotProduction {
        fn is_production(&self) -> bool {
            false
        }
        fn source_resolvable(&self) -> bool {
            true
        }
        fn source_supported(&self) -> bool {
            true
        }
        fn credentials_present(&self) -> bool {
            true
        }
    }

    fn users(n: usize) -> Vec<UserRow> {
        (0..n).map(|i| UserRow::with_id(i.to_string())).collect()
    }

    fn client_for(server: &MockServer) -> DeliveryClient {
        DeliveryClient::new(&server.base_url(), "app", "key")
            .unwrap()
            .with_retry_policy(RetryPolicy {
                max_attempts: 3,
                delay: Duration::from_millis(5),
            })
    }

    #[tokio::test]
    async fn test_run_sends_full_and_partial_batches() {
        let server = MockServer::start_async().await;
        let api_mock = server
            .mock_async(|when, then| {
                when.method(POST).path(BULK_CREATE_PATH);
                then.status(201).json_body(serde_json::json!({"failed": []}));
            })
            .await;

        let run = ImportRun::new(InMemorySource::new(users(150)), client_for(&server));
        let summary = run.run(&AllowAll, &mut SilentProgress).await.unwrap();

        api_mock.assert_hits_async(2).await;
        assert_eq!(summary.total_sent, 150);
        assert_eq!(summary.batches, 2);
        assert!(summary.failed.is_empty());
    }

    #[tokio::test]
    async fn test_rejected_records_still_count_as_sent() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(BULK_CREATE_PATH);
                then.status(200).json_body(serde_json::json!({
                    "failed": [{"user_id": "1"}, {"user_id": "2"}]
                }));
            })
            .await;

        let mut progress = ConsoleProgress::new(Vec::new());
        let run = ImportRun::new(InMemorySource::new(users(4)), client_for(&server));
        let summary = run.run(&AllowAll, &mut progress).await.unwrap();

        assert_eq!(summary.total_sent, 4);
        assert_eq!(summary.total_failed(), 2);
        assert_eq!(progress.into_inner(), b"..FF\n".to_vec());
    }

    #[tokio::test]
    async fn test_empty_source_makes_no_requests() {
        let server = MockServer::start_async().await;
        let api_mock = server
            .mock_async(|when, then| {
                when.method(POST).path(BULK_CREATE_PATH);
                then.status(201).json_body(serde_json::json!({"failed": []}));
            })
            .await;

        let run = ImportRun::new(InMemorySource::<UserRow>::new(vec![]), client_for(&server));
        let summary = run.run(&AllowAll, &mut SilentProgress).await.unwrap();

        api_mock.assert_hits_async(0).await;
        assert_eq!(summary.total_sent, 0);
        assert!(summary.failed.is_empty());
    }

    #[tokio::test]
    async fn test_failed_precondition_processes_nothing() {
        let server = MockServer::start_async().await;
        let api_mock = server
            .mock_async(|when, then| {
                when.method(POST).path(BULK_CREATE_PATH);
                then.status(201).json_body(serde_json::json!({"failed": []}));
            })
            .await;

        let source = InMemorySource::new(users(10));
        let run = ImportRun::new(source, client_for(&server));
        let err = run.run(&NotProduction, &mut SilentProgress).await.unwrap_err();

        api_mock.assert_hits_async(0).await;
        assert!(matches!(
            err,
            ExportError::PreconditionFailed {
                check: "production_environment",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_undeliverable_batch_aborts_run() {
        let server = MockServer::start_async().await;
        let api_mock = server
            .mock_async(|when, then| {
                when.method(POST).path(BULK_CREATE_PATH);
                then.status(503);
            })
            .await;

        let run = ImportRun::new(InMemorySource::new(users(250)), client_for(&server));
        let err = run.run(&AllowAll, &mut SilentProgress).await.unwrap_err();

        // 第一批用盡重試後整個匯出中止，不會繼續送第二批
        api_mock.assert_hits_async(3).await;
        assert!(matches!(
            err,
            ExportError::DeliveryFailed {
                status: 503,
                attempts: 3
            }
        ));
    }

    #[tokio::test]
    async fn test_dry_run_sends_nothing() {
        let server = MockServer::start_async().await;
        let api_mock = server
            .mock_async(|when, then| {
                when.method(POST).path(BULK_CREATE_PATH);
                then.status(201);
            })
            .await;

        let mut records = users(120);
        records.push(UserRow::default());
        let run = ImportRun::new(InMemorySource::new(records), client_for(&server));
        let summary = run.dry_run(&AllowAll).await.unwrap();

        api_mock.assert_hits_async(0).await;
        assert_eq!(summary.batches, 2);
        assert_eq!(summary.total_sent, 120);
        assert_eq!(summary.skipped, 1);
    }
}
