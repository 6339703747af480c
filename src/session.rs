//! One editing session: user actions flow through the state store and on to
//! the persistence coordinator.
//!
//! ```text
//! action ──► App (mutate, report Change) ──► Coordinator ──► write task ──► Repository
//!                                              │ debounced (profile)
//!                                              └ immediate (links)
//! ```
use std::time::Duration;

use tokio::sync::mpsc;

use crate::app::{App, Change, DraftField, EditGate, ProfileField};
use crate::content::BioGenerator;
use crate::store::{Repository, ThemeColor};
use crate::sync::{Coordinator, SyncEvent};

pub struct Session {
    app: App,
    repo: Repository,
    coordinator: Coordinator,
    gate: EditGate,
    bio: Option<BioGenerator>,
    loaded: bool,
}

impl Session {
    /// Create a session showing the built-in defaults until [`load`](Self::load)
    /// completes. Write outcomes are sent on `events`.
    pub fn new(
        repo: Repository,
        gate: EditGate,
        bio: Option<BioGenerator>,
        debounce: Duration,
        events: mpsc::Sender<SyncEvent>,
    ) -> Self {
        let coordinator = Coordinator::new(repo.clone(), debounce, events);
        Self {
            app: App::default(),
            repo,
            coordinator,
            gate,
            bio,
            loaded: false,
        }
    }

    /// Fetch page data and start persisting changes.
    pub async fn load(&mut self) {
        let state = self.repo.load().await;
        tracing::info!(links = state.links.len(), "Page data loaded");
        self.app.replace_state(state);
        self.loaded = true;
        self.coordinator.arm();
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn bio_enabled(&self) -> bool {
        self.bio.is_some()
    }

    pub fn has_pending_profile_write(&self) -> bool {
        self.coordinator.has_pending_profile_write()
    }

    fn persist(&mut self, change: Change) {
        match change {
            Change::None => {}
            Change::Profile => self.coordinator.profile_edited(&self.app.profile),
            Change::Links => self.coordinator.links_changed(&self.app.links),
        }
    }

    // ========================================================================
    // Edit Mode
    // ========================================================================

    /// Enter edit mode if `password` matches. Returns whether it did.
    pub fn unlock(&mut self, password: &str) -> bool {
        if !self.gate.check(password) {
            tracing::info!("Edit mode unlock rejected");
            return false;
        }
        self.app.enter_edit_mode();
        true
    }

    /// Leave edit mode, writing the profile right away so the last keystroke
    /// is not left behind in a debounce window.
    pub fn finish_editing(&mut self) {
        if !self.app.is_editing() {
            return;
        }
        self.coordinator.flush_profile(&self.app.profile);
        self.app.exit_edit_mode();
    }

    // ========================================================================
    // Profile
    // ========================================================================

    pub fn set_profile_field(&mut self, field: ProfileField, value: impl Into<String>) {
        let change = self.app.set_profile_field(field, value.into());
        self.persist(change);
    }

    pub fn set_theme(&mut self, color: ThemeColor) {
        let change = self.app.set_theme(color);
        self.persist(change);
    }

    /// Generate a bio from `keywords` and put it in the bio field.
    ///
    /// Returns `None` when the generator is switched off. Failures come back
    /// as sentinel text and are applied like any other bio.
    pub async fn generate_bio(&mut self, keywords: &str) -> Option<String> {
        let generator = self.bio.as_ref()?;
        let bio = generator.generate(keywords).await;
        if !bio.is_empty() {
            self.set_profile_field(ProfileField::Bio, bio.clone());
        }
        Some(bio)
    }

    // ========================================================================
    // Links
    // ========================================================================

    /// Prepend a new slot and open it as the draft. Returns its id.
    pub fn add_link(&mut self) -> String {
        let id = self.app.add_link();
        self.persist(Change::Links);
        id
    }

    pub fn delete_link(&mut self, id: &str) {
        let change = self.app.delete_link(id);
        self.persist(change);
    }

    pub fn reorder(&mut self, from_id: &str, to_id: &str) {
        let change = self.app.reorder(from_id, to_id);
        self.persist(change);
    }

    pub fn begin_edit(&mut self, id: &str) -> bool {
        self.app.begin_edit(id)
    }

    pub fn edit_draft(&mut self, field: DraftField, value: impl Into<String>) -> bool {
        self.app.edit_draft(field, value.into())
    }

    pub fn commit_draft(&mut self) {
        let change = self.app.commit_draft();
        self.persist(change);
    }

    pub fn cancel_draft(&mut self) {
        self.app.cancel_draft();
    }

    /// End the session. Edit mode is flushed first; queued writes are
    /// awaited, a still-pending debounced write is not.
    pub async fn shutdown(mut self) {
        self.finish_editing();
        self.coordinator.shutdown().await;
    }
}
