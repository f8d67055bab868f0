//! Generic record-store client.
//!
//! Every domain service is a parameter-shaping wrapper over this interface:
//! it builds a [`RecordQuery`] (fields, filters, ordering, paging) and hands
//! it to a [`RecordStore`] implementation. Updates are compare-and-swap on a
//! per-record revision so concurrent writers surface a conflict instead of
//! silently losing data.

pub mod memory;
mod query;

pub use memory::InMemoryRecordStore;
pub use query::{Filter, FilterOp, OrderBy, Paging, RecordQuery};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The record types the store knows how to persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Job,
    Application,
    Interview,
    DeadlineNotification,
    User,
}

impl RecordKind {
    /// Short prefix baked into generated identifiers.
    pub const fn prefix(self) -> &'static str {
        match self {
            RecordKind::Job => "job",
            RecordKind::Application => "app",
            RecordKind::Interview => "int",
            RecordKind::DeadlineNotification => "ddn",
            RecordKind::User => "usr",
        }
    }
}

/// Identifier assigned by the store at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub String);

/// A persisted record: opaque JSON fields plus the revision used for
/// compare-and-swap updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: RecordId,
    pub revision: u64,
    pub fields: Value,
}

impl StoredRecord {
    /// Deserialize the record fields into a domain type, injecting the
    /// store-assigned `id` so domain structs always carry it.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        let mut fields = self.fields.clone();
        if let Some(map) = fields.as_object_mut() {
            map.insert("id".to_string(), Value::String(self.id.0.clone()));
        }
        Ok(serde_json::from_value(fields)?)
    }
}

/// One page of a fetch result.
#[derive(Debug, Clone, Serialize)]
pub struct RecordPage {
    pub records: Vec<StoredRecord>,
    /// Total matches before paging was applied.
    pub total: usize,
}

/// Error enumeration for record-store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("revision mismatch: expected {expected}, stored {actual}")]
    RevisionMismatch { expected: u64, actual: u64 },
    #[error("record store unavailable: {0}")]
    Unavailable(String),
    #[error("malformed record: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Storage abstraction so services can be exercised against in-memory
/// adapters in tests and against a hosted backend in deployments.
pub trait RecordStore: Send + Sync {
    fn fetch(&self, kind: RecordKind, query: &RecordQuery) -> Result<RecordPage, StoreError>;
    fn get(&self, kind: RecordKind, id: &RecordId) -> Result<Option<StoredRecord>, StoreError>;
    fn create(&self, kind: RecordKind, fields: Value) -> Result<StoredRecord, StoreError>;
    fn update(
        &self,
        kind: RecordKind,
        id: &RecordId,
        expected_revision: u64,
        fields: Value,
    ) -> Result<StoredRecord, StoreError>;
}
