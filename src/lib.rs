//! Link-in-bio page core: a profile card and an ordered list of links,
//! persisted to a spreadsheet-backed endpoint.
//!
//! - [`store`] - remote endpoint client, fallback cache, load/save policy
//! - [`app`] - in-memory page state and the link draft protocol
//! - [`reorder`] - stable move-by-id for the link list
//! - [`sync`] - debounced and immediate remote writes
//! - [`session`] - wires state changes to persistence
//! - [`content`] - optional bio generator
//! - [`ui`] - terminal UI (ratatui)

pub mod app;
pub mod config;
pub mod content;
pub mod reorder;
pub mod session;
pub mod store;
pub mod sync;
pub mod ui;
pub mod util;
