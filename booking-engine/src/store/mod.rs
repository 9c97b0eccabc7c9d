//! Record store abstraction
//!
//! The booking engine treats the document database as an external
//! collaborator behind the [`RecordStore`] trait:
//!
//! ```text
//!         ┌────────────────────┐
//!         │  RecordStore Trait │  ◄── pluggable backend
//!         └────────┬───────────┘
//!                  │
//!          ┌───────┴────────┐
//!          ▼                ▼
//!     MemoryStore      (managed document DB,
//!     (in-process)      out of scope here)
//! ```
//!
//! The query model is deliberately narrow, matching the backing database:
//! equality filters on top-level scalar fields plus ordering by one field.
//! It cannot reach inside arrays of sub-documents, which is why provider
//! views are filtered client-side in the projection layer.

mod bookings;
mod memory;

pub use bookings::{BookingStore, decode_booking};
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    /// Transient backend failure. Propagated unchanged to the caller; the
    /// engine performs no retry of its own.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Sort direction for the single ordering field a query may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Collection query: equality filters on top-level scalar fields and at
/// most one ordering field
#[derive(Debug, Clone)]
pub struct Query {
    pub collection: String,
    pub filters: Vec<(String, Value)>,
    pub order_by: Option<(String, Direction)>,
}

impl Query {
    pub fn collection(name: impl Into<String>) -> Self {
        Self {
            collection: name.into(),
            filters: Vec::new(),
            order_by: None,
        }
    }

    /// Add a top-level equality filter
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    /// Whether a document's current state matches every filter
    pub fn matches(&self, doc: &Value) -> bool {
        self.filters
            .iter()
            .all(|(field, expected)| doc.get(field) == Some(expected))
    }
}

/// A stored document: store-assigned id plus raw fields
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

/// Live change-feed subscription.
///
/// Push-based: every write to a matching document triggers redelivery of
/// the FULL current query result set; subscribers re-run their projection
/// from scratch on each delivery (no incremental diffing). The initial
/// result set is delivered immediately on subscribe. Dropping the
/// subscription unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    pub(crate) rx: mpsc::UnboundedReceiver<Vec<Document>>,
}

impl Subscription {
    /// Next full result set, or `None` once the store is gone
    pub async fn recv(&mut self) -> Option<Vec<Document>> {
        self.rx.recv().await
    }

    /// Non-blocking variant for drain-style consumers
    pub fn try_recv(&mut self) -> Option<Vec<Document>> {
        self.rx.try_recv().ok()
    }
}

/// Document store interface.
///
/// Point reads/writes plus real-time change subscriptions. All operations
/// are single-document: there are no multi-document transactions, and
/// `update` replaces the named top-level fields wholesale (read-modify-write
/// of an array field therefore serializes the entire array as read).
#[async_trait]
pub trait RecordStore: Send + Sync + std::fmt::Debug {
    /// Create a document, returning the store-assigned id
    async fn create(&self, collection: &str, data: Value) -> StoreResult<String>;

    /// Point read by id
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Document>;

    /// Merge the given top-level fields into an existing document.
    /// The write is atomic per document: it either fully applies or not at
    /// all.
    async fn update(&self, collection: &str, id: &str, patch: Value) -> StoreResult<()>;

    /// One-shot query evaluation
    async fn query(&self, query: &Query) -> StoreResult<Vec<Document>>;

    /// Open a live subscription for the query
    fn subscribe(&self, query: Query) -> Subscription;
}
