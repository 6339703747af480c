//! Load and save policy on top of the raw remote store.
//!
//! Loading never fails: a missing endpoint or a wrong-shaped field degrades to
//! the built-in defaults, and a failed round trip degrades to the cache (or the
//! defaults when nothing was ever cached). Saving fails loudly, except in the
//! unconfigured mode where it only updates the cache.
use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;

use super::cache::SnapshotCache;
use super::client::{RemotePayload, RemoteStore};
use super::types::{
    default_links, LinkItem, PageState, Profile, StoreError, StoreWrite, ThemeColor,
};

/// Remote store plus its last-known-good cache.
#[derive(Clone)]
pub struct Repository {
    remote: Arc<dyn RemoteStore>,
    cache: SnapshotCache,
}

impl Repository {
    pub fn new(remote: Arc<dyn RemoteStore>, cache: SnapshotCache) -> Self {
        Self { remote, cache }
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    /// Load the combined page state.
    pub async fn load(&self) -> PageState {
        match self.remote.fetch().await {
            Ok(payload) => self.accept_payload(payload),
            Err(StoreError::NotConfigured) => {
                tracing::info!("No endpoint configured, using built-in page data");
                PageState::default()
            }
            Err(e) => {
                let profile = self.cache.profile();
                let links = self.cache.links();
                tracing::warn!(
                    error = %e,
                    cached_profile = profile.is_some(),
                    cached_links = links.is_some(),
                    "Failed to load page data, falling back"
                );
                PageState {
                    profile: profile.unwrap_or_default(),
                    links: links.unwrap_or_else(default_links),
                }
            }
        }
    }

    fn accept_payload(&self, payload: RemotePayload) -> PageState {
        let profile = match merge_profile(payload.profile.as_ref()) {
            Some(profile) => {
                self.cache.set_profile(profile.clone());
                profile
            }
            None => {
                tracing::debug!("Fetched profile missing or nameless, using default profile");
                Profile::default()
            }
        };

        let links = match decode_links(payload.links.as_ref()) {
            Some(links) => {
                self.cache.set_links(links.clone());
                links
            }
            None => {
                tracing::debug!("Fetched links missing or not an array, using default links");
                default_links()
            }
        };

        PageState { profile, links }
    }

    /// Persist one record. On success (or in unconfigured mode) the cache
    /// takes the written value.
    pub async fn save(&self, write: &StoreWrite) -> Result<(), StoreError> {
        match self.remote.save(write).await {
            Ok(()) => {
                self.remember(write);
                Ok(())
            }
            Err(StoreError::NotConfigured) => {
                tracing::info!(
                    action = write.kind().action(),
                    "No endpoint configured, keeping write local"
                );
                self.remember(write);
                Ok(())
            }
            Err(e) => {
                tracing::error!(action = write.kind().action(), error = %e, "Remote write failed");
                Err(e)
            }
        }
    }

    fn remember(&self, write: &StoreWrite) {
        match write {
            StoreWrite::Profile(profile) => self.cache.set_profile(profile.clone()),
            StoreWrite::Links(links) => self.cache.set_links(links.clone()),
        }
    }
}

/// Overlay a fetched profile onto the defaults.
///
/// Accepted only when `name` is a non-empty string. Missing or wrong-typed
/// fields keep their default; a blank avatar keeps the default avatar.
fn merge_profile(raw: Option<&Value>) -> Option<Profile> {
    let raw = raw?.as_object()?;
    let name = raw.get("name")?.as_str().filter(|n| !n.is_empty())?;

    let mut profile = Profile {
        name: name.to_string(),
        ..Profile::default()
    };

    if let Some(bio) = raw.get("bio").and_then(Value::as_str) {
        profile.bio = bio.to_string();
    }
    if let Some(avatar) = raw
        .get("avatarUrl")
        .and_then(Value::as_str)
        .filter(|a| !a.trim().is_empty())
    {
        profile.avatar_url = avatar.to_string();
    }
    if let Some(token) = raw.get("themeColor").and_then(Value::as_str) {
        match ThemeColor::parse(token) {
            Some(color) => profile.theme_color = color,
            None => tracing::warn!(token, "Unknown theme color in fetched profile, keeping default"),
        }
    }

    Some(profile)
}

/// Decode a fetched link array, skipping malformed entries and repeated ids.
fn decode_links(raw: Option<&Value>) -> Option<Vec<LinkItem>> {
    let items = raw?.as_array()?;
    let mut seen = HashSet::with_capacity(items.len());
    let mut links = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        match serde_json::from_value::<LinkItem>(item.clone()) {
            Ok(link) if seen.contains(&link.id) => {
                tracing::warn!(index, id = %link.id, "Duplicate link id in fetched data, skipping");
            }
            Ok(link) => {
                seen.insert(link.id.clone());
                links.push(link);
            }
            Err(e) => {
                tracing::warn!(index, error = %e, "Malformed link entry in fetched data, skipping");
            }
        }
    }

    Some(links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Mutex;

    /// Remote store whose fetch outcome is scripted per call.
    #[derive(Default)]
    struct ScriptedStore {
        fetches: Mutex<Vec<Result<RemotePayload, StoreError>>>,
        fail_saves: bool,
    }

    impl ScriptedStore {
        fn push_fetch(&self, result: Result<RemotePayload, StoreError>) {
            self.fetches.lock().unwrap().insert(0, result);
        }
    }

    #[async_trait]
    impl RemoteStore for ScriptedStore {
        async fn fetch(&self) -> Result<RemotePayload, StoreError> {
            self.fetches
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(StoreError::NotConfigured))
        }

        async fn save(&self, _write: &StoreWrite) -> Result<(), StoreError> {
            if self.fail_saves {
                Err(StoreError::HttpStatus(500))
            } else {
                Ok(())
            }
        }
    }

    fn payload(value: Value) -> RemotePayload {
        serde_json::from_value(value).unwrap()
    }

    fn repo(store: ScriptedStore) -> Repository {
        Repository::new(Arc::new(store), SnapshotCache::new())
    }

    #[test]
    fn test_merge_profile_keeps_defaults_for_missing_fields() {
        let merged = merge_profile(Some(&json!({"name": "X"}))).unwrap();
        assert_eq!(merged.name, "X");
        assert_eq!(merged.bio, Profile::default().bio);
        assert_eq!(merged.theme_color, ThemeColor::NeonGreen);
    }

    #[test]
    fn test_merge_profile_blank_avatar_uses_default() {
        let merged =
            merge_profile(Some(&json!({"name": "X", "avatarUrl": "   "}))).unwrap();
        assert_eq!(merged.avatar_url, Profile::default().avatar_url);

        let merged =
            merge_profile(Some(&json!({"name": "X", "avatarUrl": "https://a/b.png"}))).unwrap();
        assert_eq!(merged.avatar_url, "https://a/b.png");
    }

    #[test]
    fn test_merge_profile_requires_name() {
        assert!(merge_profile(Some(&json!({"bio": "no name"}))).is_none());
        assert!(merge_profile(Some(&json!({"name": ""}))).is_none());
        assert!(merge_profile(Some(&json!({"name": 5}))).is_none());
        assert!(merge_profile(Some(&json!("string"))).is_none());
        assert!(merge_profile(None).is_none());
    }

    #[test]
    fn test_merge_profile_unknown_theme_keeps_default() {
        let merged =
            merge_profile(Some(&json!({"name": "X", "themeColor": "bg-purple"}))).unwrap();
        assert_eq!(merged.theme_color, ThemeColor::NeonGreen);

        let merged =
            merge_profile(Some(&json!({"name": "X", "themeColor": "bg-[#23a6d5]"}))).unwrap();
        assert_eq!(merged.theme_color, ThemeColor::Cyan);
    }

    #[test]
    fn test_decode_links_skips_bad_entries_and_duplicates() {
        let links = decode_links(Some(&json!([
            {"id": "a", "title": "A", "url": "https://a", "color": "bg-white"},
            {"title": "no id"},
            {"id": "a", "title": "dup", "url": "https://dup", "color": "bg-white"},
            {"id": 2, "title": "B", "url": "https://b", "color": "bg-white"},
        ])))
        .unwrap();

        let ids: Vec<_> = links.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "2"]);
        assert_eq!(links[0].title, "A");
    }

    #[test]
    fn test_decode_links_requires_array() {
        assert!(decode_links(Some(&json!({"id": "a"}))).is_none());
        assert!(decode_links(None).is_none());
        assert_eq!(decode_links(Some(&json!([]))), Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_unconfigured_load_returns_defaults() {
        let repo = repo(ScriptedStore::default());
        assert_eq!(repo.load().await, PageState::default());
    }

    #[tokio::test]
    async fn test_partial_payload_merges_over_defaults() {
        let store = ScriptedStore::default();
        store.push_fetch(Ok(payload(json!({"profile": {"name": "X"}, "links": []}))));
        let repo = repo(store);

        let state = repo.load().await;
        assert_eq!(state.profile.name, "X");
        assert_eq!(state.profile.theme_color, ThemeColor::NeonGreen);
        assert!(state.links.is_empty());
    }

    #[tokio::test]
    async fn test_failed_load_without_history_returns_defaults() {
        let store = ScriptedStore::default();
        store.push_fetch(Err(StoreError::HttpStatus(502)));
        let repo = repo(store);

        assert_eq!(repo.load().await, PageState::default());
    }

    #[tokio::test]
    async fn test_failed_load_after_success_returns_cache() {
        let store = ScriptedStore::default();
        store.push_fetch(Ok(payload(json!({
            "profile": {"name": "CACHED"},
            "links": [{"id": "9", "title": "Nine", "url": "https://nine", "color": "bg-white"}],
        }))));
        store.push_fetch(Err(StoreError::Timeout(20)));
        let repo = repo(store);

        let first = repo.load().await;
        let second = repo.load().await;
        assert_eq!(first, second);
        assert_eq!(second.profile.name, "CACHED");
        assert_eq!(second.links[0].id, "9");
    }

    #[tokio::test]
    async fn test_failed_load_after_save_returns_saved_value() {
        let store = ScriptedStore::default();
        store.push_fetch(Err(StoreError::HttpStatus(500)));
        let repo = repo(store);

        let mut profile = Profile::default();
        profile.bio = "saved bio".to_string();
        repo.save(&StoreWrite::Profile(profile.clone())).await.unwrap();

        let state = repo.load().await;
        assert_eq!(state.profile, profile);
        // Links were never round-tripped, so they fall back to defaults
        assert_eq!(state.links, default_links());
    }

    #[tokio::test]
    async fn test_failed_save_leaves_cache_untouched() {
        let store = ScriptedStore {
            fail_saves: true,
            ..Default::default()
        };
        let repo = repo(store);

        let result = repo.save(&StoreWrite::Links(Vec::new())).await;
        assert!(matches!(result, Err(StoreError::HttpStatus(500))));
        assert!(repo.cache().links().is_none());
    }

    #[tokio::test]
    async fn test_malformed_payload_fields_do_not_touch_cache() {
        let store = ScriptedStore::default();
        store.push_fetch(Ok(payload(json!({"profile": {"bio": "x"}, "links": "nope"}))));
        let repo = repo(store);

        assert_eq!(repo.load().await, PageState::default());
        assert!(repo.cache().profile().is_none());
        assert!(repo.cache().links().is_none());
    }
}
