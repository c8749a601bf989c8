use log::{debug, error, info, warn};
use std::sync::{Arc, Mutex};

use crate::aggregate::aggregate;
use crate::config::AppConfig;
use crate::countdown::{new_year_target, CountdownClock, CountdownState};
use crate::feed::parse_snapshot;
use crate::submission::{RsvpForm, SubmissionPhase};
use crate::view::PageView;
use rsvp_shared::error::{Result, RsvpError};
use rsvp_shared::models::{Identity, RsvpRecord, Snapshot};
use rsvp_shared::store::{AuthClient, RsvpStore, SnapshotHandler, Subscription};

/// Local page state. Owned exclusively by the page; each of the four
/// operations (identity bootstrap, feed, clock, submission) writes a
/// disjoint set of fields.
struct PageState {
    identity: Option<Identity>,
    records: Vec<RsvpRecord>,
    total_guests: u32,
    loading: bool,
    countdown: CountdownState,
    phase: SubmissionPhase,
    last_error: Option<RsvpError>,
}

impl PageState {
    fn new() -> Self {
        Self {
            identity: None,
            records: Vec::new(),
            total_guests: 0,
            loading: true,
            countdown: CountdownState::default(),
            phase: SubmissionPhase::Idle,
            last_error: None,
        }
    }
}

/// The RSVP page component, wired to injected identity and collection
/// clients so tests can substitute fakes.
///
/// `mount` makes exactly one anonymous sign-in attempt, then subscribes to
/// the feed (whether or not identity resolved) and starts the countdown
/// clock. `unmount` releases the subscription and stops the clock; dropping
/// the page does the same through the field guards.
pub struct EventPage<A, S> {
    config: AppConfig,
    auth: Arc<A>,
    store: Arc<S>,
    state: Mutex<PageState>,
    subscription: Mutex<Option<Subscription>>,
    clock: CountdownClock,
}

impl<A, S> EventPage<A, S>
where
    A: AuthClient + 'static,
    S: RsvpStore + 'static,
{
    pub fn new(config: AppConfig, auth: Arc<A>, store: Arc<S>) -> Arc<Self> {
        let clock = CountdownClock::new(new_year_target(config.event_year));
        Arc::new(Self {
            config,
            auth,
            store,
            state: Mutex::new(PageState::new()),
            subscription: Mutex::new(None),
            clock,
        })
    }

    /// Brings the page up: identity first, then the feed subscription, then
    /// the clock. Never fails outright; every error is logged and recorded
    /// in state for the view.
    pub async fn mount(self: &Arc<Self>) {
        match self.auth.sign_in_anonymously().await {
            Ok(identity) => {
                info!("Anonymous identity resolved, uid={}", identity.uid);
                self.state.lock().unwrap().identity = Some(identity);
            }
            Err(e) => {
                // Writes stay blocked because identity stays unset.
                error!("Anonymous sign-in failed: {}", e);
                self.state.lock().unwrap().last_error = Some(e);
            }
        }

        // The feed starts once the identity attempt has resolved, whether
        // it succeeded or not.
        let page = Arc::downgrade(self);
        let handler: SnapshotHandler = Arc::new(move |snapshot| {
            if let Some(page) = page.upgrade() {
                page.apply_snapshot(snapshot);
            }
        });

        match self.store.subscribe(&self.config.collection_path, handler) {
            Ok(subscription) => {
                debug!(
                    "Subscribed to RSVP feed on '{}'",
                    self.config.collection_path
                );
                *self.subscription.lock().unwrap() = Some(subscription);
            }
            Err(e) => {
                error!("RSVP feed subscription failed: {}", e);
                let mut state = self.state.lock().unwrap();
                state.loading = false;
                state.last_error = Some(e);
            }
        }

        let page = Arc::downgrade(self);
        self.clock.start(move |countdown| {
            if let Some(page) = page.upgrade() {
                page.state.lock().unwrap().countdown = countdown;
            }
        });
    }

    /// Replaces the materialized list with the delivered snapshot and
    /// recomputes the aggregate. Snapshots are applied in delivery order;
    /// each is authoritative.
    fn apply_snapshot(&self, snapshot: Snapshot) {
        let records = parse_snapshot(&snapshot);
        let total_guests = aggregate(&records);
        debug!(
            "Applied RSVP snapshot: {} records, {} guests",
            records.len(),
            total_guests
        );

        let mut state = self.state.lock().unwrap();
        state.records = records;
        state.total_guests = total_guests;
        state.loading = false;
    }

    /// Validates the form and appends exactly one RSVP document.
    ///
    /// Preconditions are structural: identity must be resolved, and the
    /// submission phase machine rejects a call while one is in flight or
    /// after one has succeeded. On success the phase flips to `Submitted`
    /// optimistically, without waiting for the feed to reflect the write.
    /// On failure the phase lands in `Failed` so the user may retry with
    /// the form values they already entered.
    pub async fn submit(&self, form: RsvpForm) -> Result<()> {
        form.validate()?;

        let identity = {
            let mut state = self.state.lock().unwrap();
            let identity = match &state.identity {
                Some(identity) => identity.clone(),
                None => {
                    warn!("RSVP submitted before identity resolved; no append attempted");
                    return Err(RsvpError::IdentityRequired);
                }
            };
            state.phase.begin()?;
            identity
        };

        // The state lock is not held across the append await; the feed
        // handler may run in the meantime.
        let data = form.to_document(&identity);
        match self.store.append_rsvp(&self.config.collection_path, data).await {
            Ok(id) => {
                info!("RSVP stored, id={}", id);
                let mut state = self.state.lock().unwrap();
                state.phase.complete();
                state.last_error = None;
                Ok(())
            }
            Err(e) => {
                error!("Failed to append RSVP: {}", e);
                let mut state = self.state.lock().unwrap();
                state.phase.fail(e.to_string());
                state.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Current render projection of the page.
    pub fn view(&self) -> PageView {
        let state = self.state.lock().unwrap();
        PageView {
            countdown: state.countdown,
            total_guests: state.total_guests,
            loading: state.loading,
            phase: state.phase.clone(),
            error: state.last_error.clone(),
        }
    }

    /// The resolved anonymous identity, if sign-in succeeded.
    pub fn identity(&self) -> Option<Identity> {
        self.state.lock().unwrap().identity.clone()
    }

    /// The currently materialized records, in provider order.
    pub fn records(&self) -> Vec<RsvpRecord> {
        self.state.lock().unwrap().records.clone()
    }

    /// Tears the page down: releases the feed subscription and stops the
    /// countdown clock.
    pub fn unmount(&self) {
        if self.subscription.lock().unwrap().take().is_some() {
            debug!("Released RSVP feed subscription");
        }
        self.clock.stop();
    }
}
