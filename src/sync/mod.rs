//! Timing policy for remote writes.
//!
//! - [`debounce`] - scheduled tasks with cancellation handles
//! - [`coordinator`] - debounced vs. immediate writes, forced flush, one task per write

mod coordinator;
mod debounce;

pub use coordinator::{Coordinator, SyncEvent};
pub use debounce::{schedule, DebounceTimer, TaskHandle};
