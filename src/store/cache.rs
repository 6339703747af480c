use std::sync::{Arc, Mutex, MutexGuard};

use super::types::{LinkItem, Profile};

#[derive(Debug, Default)]
struct Snapshot {
    profile: Option<Profile>,
    links: Option<Vec<LinkItem>>,
}

/// Last-known-good profile and links, held in process memory only.
///
/// Each half is set only after it was loaded from, or accepted by, the remote
/// store, so neither is older than the last successful round trip for it.
/// Cloning shares the same snapshot; write tasks and the session all hold
/// a handle, hence the mutex.
#[derive(Debug, Clone, Default)]
pub struct SnapshotCache {
    inner: Arc<Mutex<Snapshot>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Snapshot> {
        // A panic while holding the lock cannot leave a half-written Option behind
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn profile(&self) -> Option<Profile> {
        self.lock().profile.clone()
    }

    pub fn links(&self) -> Option<Vec<LinkItem>> {
        self.lock().links.clone()
    }

    pub fn set_profile(&self, profile: Profile) {
        self.lock().profile = Some(profile);
    }

    pub fn set_links(&self, links: Vec<LinkItem>) {
        self.lock().links = Some(links);
    }
}
