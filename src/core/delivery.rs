use crate::config::ExportConfig;
use crate::domain::model::{Batch, DeliveryOutcome};
use crate::utils::error::{ExportError, Result};
use reqwest::{Certificate, Client, StatusCode};
use std::time::Duration;

pub const BULK_CREATE_PATH: &str = "/api/v1/users/bulk_create";
pub const MAX_REQUEST_ATTEMPTS: u32 = 3;
pub const RETRY_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_REQUEST_ATTEMPTS,
            delay: RETRY_DELAY,
        }
    }
}

/// Why a single attempt did not succeed; both kinds are retried.
#[derive(Debug)]
enum AttemptFailure {
    Status(StatusCode),
    Transport(reqwest::Error),
}

impl AttemptFailure {
    fn into_terminal(self, attempts: u32) -> ExportError {
        match self {
            AttemptFailure::Status(status) => ExportError::DeliveryFailed {
                status: status.as_u16(),
                attempts,
            },
            AttemptFailure::Transport(source) => ExportError::DeliveryTransport { attempts, source },
        }
    }
}

impl std::fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttemptFailure::Status(status) => write!(f, "HTTP {}", status),
            AttemptFailure::Transport(e) => write!(f, "{}", e),
        }
    }
}

/// Connection failures and timeouts are worth another attempt; TLS
/// rejections and malformed requests are not.
fn is_transient(e: &reqwest::Error) -> bool {
    (e.is_connect() || e.is_timeout()) && !is_tls_rejection(e)
}

/// rustls handshake failures (bad certificate, non-TLS peer) surface as
/// `InvalidData` I/O errors somewhere in the source chain.
fn is_tls_rejection(e: &reqwest::Error) -> bool {
    let mut source = std::error::Error::source(e);
    while let Some(err) = source {
        if let Some(io) = err.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::InvalidData {
                return true;
            }
        }
        source = err.source();
    }
    false
}

/// Sends batches to the bulk_create endpoint.
///
/// The underlying HTTP client (and its TLS setup) is built once and reused
/// for every batch.
pub struct DeliveryClient {
    client: Client,
    endpoint: String,
    app_id: String,
    api_key: String,
    retry: RetryPolicy,
}

impl DeliveryClient {
    pub fn new(base_url: &str, app_id: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder().use_rustls_tls().build()?;
        Ok(Self::with_client(client, base_url, app_id, api_key))
    }

    pub fn with_client(
        client: Client,
        base_url: &str,
        app_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), BULK_CREATE_PATH),
            app_id: app_id.into(),
            api_key: api_key.into(),
            retry: RetryPolicy::default(),
        }
    }

    /// Builds the client for the configured deployment mode.
    ///
    /// With `api.ca_bundle` set, that PEM replaces the built-in roots as the
    /// only trust anchor. Certificate verification stays on in every mode.
    pub fn from_config(config: &ExportConfig) -> Result<Self> {
        let base_url = config.base_url();
        let mut builder = Client::builder()
            .use_rustls_tls()
            .timeout(Duration::from_secs(config.timeout_seconds()));

        if let Some(ca_path) = &config.api.ca_bundle {
            let pem = std::fs::read(ca_path)?;
            let certificate = Certificate::from_pem(&pem)?;
            builder = builder
                .tls_built_in_root_certs(false)
                .add_root_certificate(certificate);
            tracing::debug!("Using trust anchor from {}", ca_path.display());
        }

        if config.api.endpoint.is_none() && base_url.starts_with("https://") {
            builder = builder.https_only(true);
        }

        let client = builder.build()?;
        tracing::info!("Delivering batches to {}", base_url);
        Ok(Self::with_client(
            client,
            base_url,
            config.api.app_id.clone(),
            config.api.api_key.clone(),
        ))
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Delivers one batch, retrying transient failures with a fixed delay.
    ///
    /// HTTP 200/201 is success. HTTP 403 fails immediately with
    /// [`ExportError::InvalidCredentials`]. Other statuses, refused
    /// connections and timeouts (including while reading the response body)
    /// are retried until `max_attempts` is reached. Any other request error
    /// is returned as [`ExportError::ApiError`] without retrying.
    pub async fn deliver(&self, batch: &Batch) -> Result<DeliveryOutcome> {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            tracing::debug!(
                attempt,
                records = batch.record_count(),
                "POST {}",
                self.endpoint
            );

            let failure = match self.send(batch).await {
                Ok(response) => match response.status() {
                    StatusCode::OK | StatusCode::CREATED => match response.bytes().await {
                        Ok(body) => {
                            let outcome: DeliveryOutcome = serde_json::from_slice(&body)?;
                            return Ok(outcome);
                        }
                        // 讀取回應內容時逾時或連線中斷，與連線失敗同樣重試
                        Err(e) => AttemptFailure::Transport(e),
                    },
                    StatusCode::FORBIDDEN => {
                        tracing::error!("Bulk endpoint rejected credentials for app {}", self.app_id);
                        return Err(ExportError::InvalidCredentials {
                            status: StatusCode::FORBIDDEN.as_u16(),
                        });
                    }
                    status => AttemptFailure::Status(status),
                },
                Err(e) if is_transient(&e) => AttemptFailure::Transport(e),
                Err(e) => {
                    tracing::error!("Bulk request could not be sent: {}", e);
                    return Err(ExportError::ApiError(e));
                }
            };

            if attempt >= self.retry.max_attempts {
                tracing::error!(attempt, "Giving up on batch: {}", failure);
                return Err(failure.into_terminal(attempt));
            }

            tracing::warn!(
                attempt,
                max_attempts = self.retry.max_attempts,
                "Batch delivery failed ({}), retrying in {:?}",
                failure,
                self.retry.delay
            );
            tokio::time::sleep(self.retry.delay).await;
        }
    }

    async fn send(&self, batch: &Batch) -> std::result::Result<reqwest::Response, reqwest::Error> {
        self.client
            .post(&self.endpoint)
            .basic_auth(&self.app_id, Some(&self.api_key))
            .json(batch)
            .send()
            .await
    }
}
