use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::error::Result;
use crate::models::{Identity, Snapshot};

/// Callback invoked with the full current set of matching documents on every
/// server-side change. Shared so a store can fan the same handler out from
/// its notification path.
pub type SnapshotHandler = Arc<dyn Fn(Snapshot) + Send + Sync>;

/// The anonymous identity collaborator: one operation, one attempt per call,
/// yielding a stable opaque uid.
#[async_trait]
pub trait AuthClient: Send + Sync {
    async fn sign_in_anonymously(&self) -> Result<Identity>;
}

/// The realtime document collection collaborator.
///
/// `append_rsvp` appends a plain key/value document and resolves with the
/// store-assigned id (at-least-once delivery; retries are the collaborator's
/// business). `subscribe` registers a snapshot handler for a collection and
/// returns a guard; the handler receives the entire matching set on every
/// change, not a diff.
#[async_trait]
pub trait RsvpStore: Send + Sync {
    async fn append_rsvp(&self, collection: &str, data: Map<String, Value>) -> Result<String>;

    fn subscribe(&self, collection: &str, handler: SnapshotHandler) -> Result<Subscription>;
}

/// RAII handle for an active subscription. Dropping it releases the
/// registration; exactly one is held per mounted page.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
