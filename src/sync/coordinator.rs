use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use super::debounce::DebounceTimer;
use crate::store::{LinkItem, Profile, Repository, SaveKind, StoreWrite};

/// Outcome of a remote write, reported back to the front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    Saved { kind: SaveKind },
    /// The write did not reach the store; local edits are not durable.
    SaveFailed { kind: SaveKind, error: String },
}

/// Writes that have been issued and not yet awaited.
type InFlight = Arc<Mutex<JoinSet<()>>>;

fn lock(in_flight: &Mutex<JoinSet<()>>) -> MutexGuard<'_, JoinSet<()>> {
    in_flight.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Decides when local state is pushed to the remote store.
///
/// - Profile text edits are debounced: each edit restarts the quiescence
///   window and only the last value is written.
/// - Link mutations are written immediately.
/// - [`flush_profile`](Self::flush_profile) writes the profile now and drops
///   any pending debounced write.
///
/// Every write runs as its own task, so a slow save never holds back the next
/// one. There is no ordering between writes in flight: the endpoint keeps
/// whichever lands last. Nothing is written until [`arm`](Self::arm) is called
/// after the initial load, so defaults are never echoed back over real data.
pub struct Coordinator {
    repo: Repository,
    events: mpsc::Sender<SyncEvent>,
    in_flight: InFlight,
    profile_timer: DebounceTimer,
    armed: bool,
}

impl Coordinator {
    /// Write outcomes are sent on `events`.
    pub fn new(repo: Repository, debounce: Duration, events: mpsc::Sender<SyncEvent>) -> Self {
        Self {
            repo,
            events,
            in_flight: Arc::new(Mutex::new(JoinSet::new())),
            profile_timer: DebounceTimer::new(debounce),
            armed: false,
        }
    }

    /// Allow writes. Called once the initial load has settled.
    pub fn arm(&mut self) {
        self.armed = true;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn has_pending_profile_write(&self) -> bool {
        self.profile_timer.is_pending()
    }

    /// Number of writes issued and not yet finished.
    pub fn writes_in_flight(&self) -> usize {
        let mut set = lock(&self.in_flight);
        while set.try_join_next().is_some() {}
        set.len()
    }

    /// Continuous-edit policy: write `profile` once edits go quiet.
    pub fn profile_edited(&mut self, profile: &Profile) {
        if !self.armed {
            tracing::trace!("Ignoring profile edit before initial load");
            return;
        }

        let in_flight = self.in_flight.clone();
        let repo = self.repo.clone();
        let events = self.events.clone();
        let write = StoreWrite::Profile(profile.clone());
        // Nothing after the sleep yields, so a cancel never lands mid-issue
        self.profile_timer.reschedule(async move {
            issue(&in_flight, repo, events, write);
        });
    }

    /// Discrete-event policy: write `links` now.
    pub fn links_changed(&mut self, links: &[LinkItem]) {
        if !self.armed {
            tracing::trace!("Ignoring link change before initial load");
            return;
        }
        self.issue(StoreWrite::Links(links.to_vec()));
    }

    /// Forced flush: write `profile` now, superseding any pending debounce.
    pub fn flush_profile(&mut self, profile: &Profile) {
        if !self.armed {
            tracing::trace!("Ignoring profile flush before initial load");
            return;
        }
        if self.profile_timer.cancel() {
            tracing::debug!("Pending profile write superseded by flush");
        }
        self.issue(StoreWrite::Profile(profile.clone()));
    }

    fn issue(&self, write: StoreWrite) {
        issue(&self.in_flight, self.repo.clone(), self.events.clone(), write);
    }

    /// Wait for every issued write to finish.
    ///
    /// A debounced write still inside its quiescence window is dropped.
    pub async fn shutdown(mut self) {
        if self.profile_timer.cancel() {
            tracing::warn!("Dropping debounced profile write at shutdown");
        }
        loop {
            let mut set = std::mem::take(&mut *lock(&self.in_flight));
            if set.is_empty() {
                break;
            }
            while let Some(result) = set.join_next().await {
                if let Err(e) = result {
                    tracing::error!(error = %e, "Write task ended abnormally");
                }
            }
        }
    }
}

/// Start one write. Finished tasks are reaped so the set only holds live ones.
fn issue(
    in_flight: &Mutex<JoinSet<()>>,
    repo: Repository,
    events: mpsc::Sender<SyncEvent>,
    write: StoreWrite,
) {
    let mut set = lock(in_flight);
    while set.try_join_next().is_some() {}
    set.spawn(save_and_report(repo, events, write));
}

async fn save_and_report(repo: Repository, events: mpsc::Sender<SyncEvent>, write: StoreWrite) {
    let kind = write.kind();
    let event = match repo.save(&write).await {
        Ok(()) => SyncEvent::Saved { kind },
        Err(e) => SyncEvent::SaveFailed {
            kind,
            error: e.to_string(),
        },
    };
    if let Err(e) = events.send(event).await {
        tracing::debug!(error = %e, "Sync event receiver dropped");
    }
}
