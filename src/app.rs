use secrecy::{ExposeSecret, SecretString};

use crate::reorder::move_by_id;
use crate::store::{LinkItem, PageState, Profile, ThemeColor};

// ============================================================================
// Mutation Outcomes
// ============================================================================

/// What a state mutation touched.
///
/// The session maps this onto a persistence policy: profile edits are
/// debounced, link edits are written immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    None,
    Profile,
    Links,
}

/// Free-text profile fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Name,
    Bio,
    AvatarUrl,
}

/// Fields editable on a link draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Title,
    Url,
    Color,
}

// ============================================================================
// App State
// ============================================================================

/// In-memory source of truth for the page.
///
/// Every mutation is synchronous and total: unknown ids are no-ops. At most
/// one link is in draft at a time; the draft is a scratch copy that only
/// reaches `links` on commit.
#[derive(Debug, Clone)]
pub struct App {
    pub profile: Profile,
    pub links: Vec<LinkItem>,
    editing: bool,
    draft: Option<LinkItem>,
}

impl Default for App {
    fn default() -> Self {
        Self::new(PageState::default())
    }
}

impl App {
    pub fn new(state: PageState) -> Self {
        Self {
            profile: state.profile,
            links: state.links,
            editing: false,
            draft: None,
        }
    }

    /// Swap in freshly loaded page data. Any open draft is dropped.
    pub fn replace_state(&mut self, state: PageState) {
        self.profile = state.profile;
        self.links = state.links;
        self.draft = None;
    }

    // ========================================================================
    // Edit Mode
    // ========================================================================

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn enter_edit_mode(&mut self) {
        self.editing = true;
    }

    /// Leave edit mode, discarding any uncommitted draft.
    pub fn exit_edit_mode(&mut self) {
        self.editing = false;
        self.draft = None;
    }

    // ========================================================================
    // Profile
    // ========================================================================

    pub fn set_profile_field(&mut self, field: ProfileField, value: String) -> Change {
        let slot = match field {
            ProfileField::Name => &mut self.profile.name,
            ProfileField::Bio => &mut self.profile.bio,
            ProfileField::AvatarUrl => &mut self.profile.avatar_url,
        };
        if *slot == value {
            return Change::None;
        }
        *slot = value;
        Change::Profile
    }

    pub fn set_theme(&mut self, color: ThemeColor) -> Change {
        if self.profile.theme_color == color {
            return Change::None;
        }
        self.profile.theme_color = color;
        Change::Profile
    }

    // ========================================================================
    // Links
    // ========================================================================

    pub fn link(&self, id: &str) -> Option<&LinkItem> {
        self.links.iter().find(|l| l.id == id)
    }

    /// Prepend a blank link and open it as the draft. Returns its id.
    pub fn add_link(&mut self) -> String {
        let id = self.next_link_id();
        let link = LinkItem::blank(id.clone());
        self.links.insert(0, link.clone());
        self.draft = Some(link);
        id
    }

    /// Time-based id, bumped past any id already in the list.
    fn next_link_id(&self) -> String {
        let mut candidate = chrono::Utc::now().timestamp_millis();
        while self.link(&candidate.to_string()).is_some() {
            candidate += 1;
        }
        candidate.to_string()
    }

    pub fn delete_link(&mut self, id: &str) -> Change {
        let before = self.links.len();
        self.links.retain(|l| l.id != id);
        if self.links.len() == before {
            return Change::None;
        }
        if self.active_link_id() == Some(id) {
            self.draft = None;
        }
        Change::Links
    }

    pub fn reorder(&mut self, from_id: &str, to_id: &str) -> Change {
        if move_by_id(&mut self.links, from_id, to_id) {
            Change::Links
        } else {
            Change::None
        }
    }

    // ========================================================================
    // Edit Draft
    // ========================================================================

    pub fn draft(&self) -> Option<&LinkItem> {
        self.draft.as_ref()
    }

    pub fn active_link_id(&self) -> Option<&str> {
        self.draft.as_ref().map(|d| d.id.as_str())
    }

    /// Snapshot `id` into the draft. A draft open on another link is discarded.
    pub fn begin_edit(&mut self, id: &str) -> bool {
        match self.link(id) {
            Some(link) => {
                if let Some(previous) = self.active_link_id().filter(|prev| *prev != id) {
                    tracing::debug!(previous, next = id, "Discarding open draft");
                }
                self.draft = Some(link.clone());
                true
            }
            None => false,
        }
    }

    pub fn edit_draft(&mut self, field: DraftField, value: String) -> bool {
        let Some(draft) = self.draft.as_mut() else {
            return false;
        };
        match field {
            DraftField::Title => draft.title = value,
            DraftField::Url => draft.url = value,
            DraftField::Color => draft.color = value,
        }
        true
    }

    /// Write the draft back over its link and close it.
    pub fn commit_draft(&mut self) -> Change {
        let Some(draft) = self.draft.take() else {
            return Change::None;
        };
        match self.links.iter_mut().find(|l| l.id == draft.id) {
            Some(slot) => {
                *slot = draft;
                Change::Links
            }
            None => {
                tracing::debug!(id = %draft.id, "Draft target no longer exists, dropping draft");
                Change::None
            }
        }
    }

    pub fn cancel_draft(&mut self) {
        self.draft = None;
    }
}

// ============================================================================
// Edit Gate
// ============================================================================

/// Shared-secret lock in front of edit mode.
///
/// This is a plain string comparison against a secret the client already
/// holds. It keeps casual visitors out of the editor; it is not authentication
/// and nothing on the remote side checks it.
pub struct EditGate {
    password: SecretString,
}

impl EditGate {
    pub fn new(password: SecretString) -> Self {
        Self { password }
    }

    pub fn check(&self, attempt: &str) -> bool {
        attempt == self.password.expose_secret()
    }
}
