//! Loading the chat state from storage.

use super::{CHAT_STORAGE_KEY, CHAT_STORAGE_VERSION, migration};
use crate::persistence::PersistedState;
use schatphone_domain::ChatSnapshot;
use tracing::{debug, info};

/// Stored snapshot, upgraded and normalized; the built-in seed when nothing
/// usable is stored.
pub(crate) fn load_snapshot(persisted: &PersistedState, now: i64) -> ChatSnapshot {
    let stored = persisted.read_with_migration(CHAT_STORAGE_KEY, CHAT_STORAGE_VERSION, |version, data| {
        migration::migrate(version, data, now)
    });

    match stored {
        Some(value) => {
            let snapshot = ChatSnapshot::from_value(&value, now);
            debug!("Hydrated {} contacts from storage", snapshot.contacts.len());
            snapshot
        }
        None => {
            info!("No stored chat state, seeding default contacts");
            ChatSnapshot::seed(now)
        }
    }
}
