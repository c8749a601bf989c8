use async_trait::async_trait;
use log::debug;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::error::{Result, RsvpError};
use crate::models::Identity;
use crate::store::AuthClient;

/// In-memory stand-in for the anonymous identity provider. Hands out a fixed
/// uid, or rejects every attempt when constructed with `failing()`.
pub struct MemoryAuthClient {
    uid: String,
    fail: AtomicBool,
    attempts: AtomicUsize,
}

impl MemoryAuthClient {
    pub fn new(uid: &str) -> Self {
        Self {
            uid: uid.to_string(),
            fail: AtomicBool::new(false),
            attempts: AtomicUsize::new(0),
        }
    }

    /// A client whose sign-in always rejects, for exercising the blocked
    /// write path.
    pub fn failing() -> Self {
        let client = Self::new("unused");
        client.fail.store(true, Ordering::SeqCst);
        client
    }

    /// Number of sign-in attempts made against this client.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthClient for MemoryAuthClient {
    async fn sign_in_anonymously(&self) -> Result<Identity> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if self.fail.load(Ordering::SeqCst) {
            return Err(RsvpError::Identity(
                "anonymous sign-in rejected by provider".to_string(),
            ));
        }

        debug!("Mock auth resolved anonymous identity uid={}", self.uid);
        Ok(Identity {
            uid: self.uid.clone(),
        })
    }
}
