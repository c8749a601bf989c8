use async_trait::async_trait;
use log::{debug, info};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::error::{Result, RsvpError};
use crate::models::{Document, Snapshot};
use crate::store::{RsvpStore, SnapshotHandler, Subscription};

struct Inner {
    documents: Vec<Document>,
    subscribers: HashMap<u64, SnapshotHandler>,
    next_subscriber_id: u64,
}

/// In-memory realtime collection, the fake injected wherever the real
/// backend would be. Matches the collaborator's contract: appends get a
/// store-assigned id, every subscriber receives the full current set on
/// subscribe and again after every append, in insertion order.
///
/// Fan-out is synchronous, which keeps tests deterministic: by the time
/// `append_rsvp` resolves, every registered handler has already seen the
/// snapshot containing the new document.
pub struct MemoryRsvpStore {
    inner: Arc<Mutex<Inner>>,
    fail_appends: AtomicBool,
    fail_subscriptions: AtomicBool,
    append_count: AtomicUsize,
}

impl MemoryRsvpStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                documents: Vec::new(),
                subscribers: HashMap::new(),
                next_subscriber_id: 0,
            })),
            fail_appends: AtomicBool::new(false),
            fail_subscriptions: AtomicBool::new(false),
            append_count: AtomicUsize::new(0),
        }
    }

    /// Makes every subsequent append reject, for exercising the failed
    /// submission path.
    pub fn set_fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent subscribe call reject.
    pub fn set_fail_subscriptions(&self, fail: bool) {
        self.fail_subscriptions.store(fail, Ordering::SeqCst);
    }

    /// Number of append attempts made against this store, successful or not.
    pub fn append_count(&self) -> usize {
        self.append_count.load(Ordering::SeqCst)
    }

    /// Seeds a document directly, without going through the append path or
    /// notifying subscribers. For arranging pre-existing remote state.
    pub fn seed_document(&self, data: Map<String, Value>) -> String {
        let id = Uuid::new_v4().to_string();
        let mut inner = self.inner.lock().unwrap();
        inner.documents.push(Document {
            id: id.clone(),
            data,
        });
        id
    }

    /// Re-delivers the current snapshot to every subscriber, as a server
    /// would after a change that leaves the matching set identical.
    pub fn renotify(&self) {
        let (snapshot, handlers) = {
            let inner = self.inner.lock().unwrap();
            (
                Snapshot::new(inner.documents.clone()),
                inner.subscribers.values().cloned().collect::<Vec<_>>(),
            )
        };
        for handler in handlers {
            handler(snapshot.clone());
        }
    }
}

impl Default for MemoryRsvpStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RsvpStore for MemoryRsvpStore {
    async fn append_rsvp(&self, collection: &str, data: Map<String, Value>) -> Result<String> {
        self.append_count.fetch_add(1, Ordering::SeqCst);

        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(RsvpError::Submission(
                "append rejected by store".to_string(),
            ));
        }

        let id = Uuid::new_v4().to_string();
        let (snapshot, handlers) = {
            let mut inner = self.inner.lock().unwrap();
            inner.documents.push(Document {
                id: id.clone(),
                data,
            });
            (
                Snapshot::new(inner.documents.clone()),
                inner.subscribers.values().cloned().collect::<Vec<_>>(),
            )
        };

        info!(
            "Mock store appended document id={} to '{}', notifying {} subscribers",
            id,
            collection,
            handlers.len()
        );

        // Handlers run outside the lock so they may re-enter the store.
        for handler in handlers {
            handler(snapshot.clone());
        }

        Ok(id)
    }

    fn subscribe(&self, collection: &str, handler: SnapshotHandler) -> Result<Subscription> {
        if self.fail_subscriptions.load(Ordering::SeqCst) {
            return Err(RsvpError::Subscription(
                "subscription rejected by store".to_string(),
            ));
        }

        let (id, initial) = {
            let mut inner = self.inner.lock().unwrap();
            let id = inner.next_subscriber_id;
            inner.next_subscriber_id += 1;
            inner.subscribers.insert(id, handler.clone());
            (id, Snapshot::new(inner.documents.clone()))
        };

        debug!(
            "Mock store registered subscriber {} on '{}' ({} documents)",
            id,
            collection,
            initial.documents.len()
        );

        // The collaborator delivers the current set immediately on subscribe.
        handler(initial);

        let inner = Arc::clone(&self.inner);
        Ok(Subscription::new(move || {
            let mut inner = inner.lock().unwrap();
            inner.subscribers.remove(&id);
            debug!("Mock store released subscriber {}", id);
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(name: &str, guests: u64) -> Map<String, Value> {
        match json!({ "name": name, "guests": guests }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_subscribe_receives_initial_and_appended_snapshots() {
        let store = MemoryRsvpStore::new();
        store.seed_document(body("Robin", 2));

        let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_by_handler = Arc::clone(&seen);
        let _sub = store
            .subscribe(
                "rsvps",
                Arc::new(move |snapshot: Snapshot| {
                    seen_by_handler
                        .lock()
                        .unwrap()
                        .push(snapshot.documents.len());
                }),
            )
            .unwrap();

        store.append_rsvp("rsvps", body("Alex", 3)).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
        assert_eq!(store.append_count(), 1);
    }

    #[tokio::test]
    async fn test_dropping_subscription_stops_delivery() {
        let store = MemoryRsvpStore::new();

        let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_by_handler = Arc::clone(&seen);
        let sub = store
            .subscribe(
                "rsvps",
                Arc::new(move |snapshot: Snapshot| {
                    seen_by_handler
                        .lock()
                        .unwrap()
                        .push(snapshot.documents.len());
                }),
            )
            .unwrap();

        drop(sub);
        store.append_rsvp("rsvps", body("Alex", 1)).await.unwrap();

        // Only the initial empty snapshot was delivered.
        assert_eq!(*seen.lock().unwrap(), vec![0]);
    }

    #[tokio::test]
    async fn test_failing_append_still_counts_the_attempt() {
        let store = MemoryRsvpStore::new();
        store.set_fail_appends(true);

        let result = store.append_rsvp("rsvps", body("Alex", 1)).await;
        assert!(matches!(result, Err(RsvpError::Submission(_))));
        assert_eq!(store.append_count(), 1);
    }

    #[test]
    fn test_failing_subscription_rejects() {
        let store = MemoryRsvpStore::new();
        store.set_fail_subscriptions(true);

        let result = store.subscribe("rsvps", Arc::new(|_| {}));
        assert!(matches!(result, Err(RsvpError::Subscription(_))));
    }
}
