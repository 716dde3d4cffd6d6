use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Maximum number of wire records carried by one bulk request.
pub const MAX_BATCH_SIZE: usize = 100;

/// Capability a source record must provide to be exported.
///
/// Accessors return `None` when the value is absent; empty strings are
/// filtered by the projector, so implementations may return them as-is.
pub trait UserRecord {
    fn user_id(&self) -> Option<String>;
    fn email(&self) -> Option<String>;
    fn name(&self) -> Option<String>;
}

/// Minimal transport form of a user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A group of wire records sent in one request. Serializes as `{"users": [...]}`.
#[derive(Debug, Clone, Serialize)]
pub struct Batch {
    users: Vec<WireRecord>,
}

impl Batch {
    /// Returns `None` unless there are between 1 and [`MAX_BATCH_SIZE`] records.
    pub fn new(users: Vec<WireRecord>) -> Option<Self> {
        if users.is_empty() || users.len() > MAX_BATCH_SIZE {
            return None;
        }
        Some(Self { users })
    }

    pub fn record_count(&self) -> usize {
        self.users.len()
    }

    pub fn users(&self) -> &[WireRecord] {
        &self.users
    }
}

/// Body of a successful bulk_create response.
///
/// Rejected entries are kept as raw JSON; the service decides their shape.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DeliveryOutcome {
    #[serde(default)]
    pub failed: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Records placed into an assembled batch, whether or not the service accepted them.
    pub total_sent: usize,

    /// Entries the service reported as rejected, in delivery order.
    pub failed: Vec<serde_json::Value>,

    pub batches: usize,

    /// Records dropped by projection (no user_id and no email).
    pub skipped: usize,

    pub duration: Duration,
}

impl RunSummary {
    pub fn total_failed(&self) -> usize {
        self.failed.len()
    }

    pub fn log_summary(&self) {
        tracing::info!(
            total_sent = self.total_sent,
            total_failed = self.total_failed(),
            batches = self.batches,
            skipped = self.skipped,
            duration_ms = self.duration.as_millis() as u64,
            "Export completed"
        );

        if !self.failed.is_empty() {
            tracing::warn!(
                failed = self.total_failed(),
                "Bulk endpoint rejected some records"
            );
        }
    }
}
