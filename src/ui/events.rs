//! Background write outcomes.

use crate::store::SaveKind;
use crate::sync::SyncEvent;

fn kind_label(kind: SaveKind) -> &'static str {
    match kind {
        SaveKind::Profile => "profile",
        SaveKind::Links => "links",
    }
}

/// Line to show for a write outcome, if any. Successes are only logged.
pub fn describe_sync_event(event: &SyncEvent) -> Option<String> {
    match event {
        SyncEvent::Saved { kind } => {
            tracing::debug!(kind = kind_label(*kind), "Saved");
            None
        }
        SyncEvent::SaveFailed { kind, error } => Some(format!(
            "SAVE FAILED ({}): {}: local edits are not durable",
            kind_label(*kind),
            error
        )),
    }
}
