//! Persistence for the page: the spreadsheet endpoint, its in-memory
//! fallback cache, and the load/save policy that ties them together.

mod cache;
mod client;
mod repository;
mod types;

pub use cache::SnapshotCache;
pub use client::{build_http_client, RemotePayload, RemoteStore, SheetClient};
pub use repository::Repository;
pub use types::{
    default_links, resolve_link_color, LinkItem, PageState, Profile, SaveKind, StoreError,
    StoreWrite, ThemeColor, AVAILABLE_COLORS, DEFAULT_AVATAR_URL,
};
