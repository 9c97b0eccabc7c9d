//! In-memory record store
//!
//! Same-process backend used by tests and local wiring, modeled on the
//! managed document database the deployment uses. Documents live in a
//! per-collection map; every committed write re-evaluates each live
//! subscription on that collection and pushes the full result set to its
//! subscriber (同进程推送, no network).
//!
//! Consistency model matches the real backend: single-document atomic
//! writes, no compare-and-swap, no multi-document transactions. Two
//! concurrent read-modify-write cycles on one document are last-write-wins.

use super::{Direction, Document, Query, RecordStore, StoreError, StoreResult, Subscription};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;

struct SubEntry {
    query: Query,
    tx: mpsc::UnboundedSender<Vec<Document>>,
}

/// In-memory document store with live subscriptions
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    /// collection name -> (document id -> fields)
    collections: DashMap<String, HashMap<String, Value>>,
    /// Live subscriptions; dead entries are pruned on publish
    subscriptions: Mutex<Vec<SubEntry>>,
    /// Connectivity fault injection: when set, reads and writes fail with
    /// `StoreError::Unavailable`
    offline: AtomicBool,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("collections", &self.inner.collections.len())
            .field("subscriptions", &self.inner.subscriptions.lock().len())
            .finish()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate backend connectivity loss. While offline, every operation
    /// returns `StoreError::Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> StoreResult<()> {
        if self.inner.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("backend offline".to_string()));
        }
        Ok(())
    }

    fn evaluate(&self, query: &Query) -> Vec<Document> {
        let mut result: Vec<Document> = self
            .inner
            .collections
            .get(&query.collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, data)| query.matches(data))
                    .map(|(id, data)| Document {
                        id: id.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        if let Some((field, direction)) = &query.order_by {
            result.sort_by(|a, b| {
                let ord = cmp_values(a.data.get(field), b.data.get(field));
                match direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            });
        }
        result
    }

    /// Redeliver result sets to every subscription whose query matches the
    /// written document's new state. Dead subscribers are pruned here.
    fn publish(&self, collection: &str, written: &Value) {
        let mut subs = self.inner.subscriptions.lock();
        subs.retain(|entry| {
            if entry.tx.is_closed() {
                return false;
            }
            if entry.query.collection != collection || !entry.query.matches(written) {
                return true;
            }
            let snapshot = self.evaluate(&entry.query);
            entry.tx.send(snapshot).is_ok()
        });
    }
}

/// Ordering over JSON scalars for the query's single sort field.
/// Missing fields and nulls sort first; mixed types fall back to type rank.
fn cmp_values(a: Option<&Value>, b: Option<&Value>) -> std::cmp::Ordering {
    use std::cmp::Ordering::*;
    match (a, b) {
        (None, None) => Equal,
        (None, Some(_)) => Less,
        (Some(_), None) => Greater,
        (Some(x), Some(y)) => match (x, y) {
            (Value::Null, Value::Null) => Equal,
            (Value::Null, _) => Less,
            (_, Value::Null) => Greater,
            (Value::Number(m), Value::Number(n)) => m
                .as_f64()
                .partial_cmp(&n.as_f64())
                .unwrap_or(Equal),
            (Value::String(s), Value::String(t)) => s.cmp(t),
            (Value::Bool(p), Value::Bool(q)) => p.cmp(q),
            _ => type_rank(x).cmp(&type_rank(y)),
        },
    }
}

fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

#[async_trait::async_trait]
impl RecordStore for MemoryStore {
    async fn create(&self, collection: &str, data: Value) -> StoreResult<String> {
        self.check_online()?;
        let id = uuid::Uuid::new_v4().to_string();
        self.inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), data.clone());
        self.publish(collection, &data);
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> StoreResult<Document> {
        self.check_online()?;
        self.inner
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id).cloned())
            .map(|data| Document {
                id: id.to_string(),
                data,
            })
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> StoreResult<()> {
        self.check_online()?;
        let merged = {
            let mut docs =
                self.inner
                    .collections
                    .entry(collection.to_string())
                    .or_default();
            let doc = docs.get_mut(id).ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
            if let (Value::Object(target), Value::Object(fields)) = (doc, &patch) {
                for (key, value) in fields {
                    target.insert(key.clone(), value.clone());
                }
            }
            docs.get(id).cloned().unwrap_or(Value::Null)
        };
        self.publish(collection, &merged);
        Ok(())
    }

    async fn query(&self, query: &Query) -> StoreResult<Vec<Document>> {
        self.check_online()?;
        Ok(self.evaluate(query))
    }

    fn subscribe(&self, query: Query) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        // Initial snapshot is delivered before any change
        let _ = tx.send(self.evaluate(&query));
        self.inner.subscriptions.lock().push(SubEntry { query, tx });
        Subscription { rx }
    }
}
