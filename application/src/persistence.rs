//! Versioned envelope persistence over a [`StateStore`].
//!
//! Values are stored as `{"version": n, "savedAt": ms, "data": ...}` under
//! `schatphone:{key}`. Reads tolerate values written before the envelope
//! existed: anything without a `data` field is returned as-is.
//!
//! Store and (de)serialization failures are logged and swallowed. A failed
//! read looks like an absent value; a failed write is lost.

use crate::ports::state_store::StateStore;
use schatphone_domain::Clock;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

const STORAGE_NAMESPACE: &str = "schatphone";

fn storage_key(key: &str) -> String {
    format!("{STORAGE_NAMESPACE}:{key}")
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<'a, T: Serialize> {
    version: u32,
    saved_at: i64,
    data: &'a T,
}

/// Stored version of an envelope; missing means 1, unreadable means 0.
fn stored_version(envelope: &Value) -> u32 {
    match envelope.get("version") {
        None | Some(Value::Null) => 1,
        Some(Value::Number(n)) => n.as_u64().and_then(|v| u32::try_from(v).ok()).unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        Some(_) => 0,
    }
}

/// Envelope reader/writer bound to one store.
#[derive(Clone)]
pub struct PersistedState {
    store: Arc<dyn StateStore>,
    clock: Arc<dyn Clock>,
}

impl PersistedState {
    pub fn new(store: Arc<dyn StateStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Payload for `key` when its stored version equals `version`.
    pub fn read(&self, key: &str, version: u32) -> Option<Value> {
        self.read_with_migration(key, version, |_, _| None)
    }

    /// Like [`read`](Self::read), but a version mismatch hands the stored
    /// `(version, data)` to `migrate` instead of discarding it.
    pub fn read_with_migration(
        &self,
        key: &str,
        version: u32,
        migrate: impl FnOnce(u32, Value) -> Option<Value>,
    ) -> Option<Value> {
        let raw = match self.store.load(&storage_key(key)) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return None,
            Err(e) => {
                warn!("[persistence] read failed for \"{}\": {}", key, e);
                return None;
            }
        };

        let parsed: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("[persistence] read failed for \"{}\": {}", key, e);
                return None;
            }
        };
        if !parsed.is_object() && !parsed.is_array() {
            return None;
        }
        if parsed.get("data").is_none() {
            debug!("[persistence] \"{}\" has no envelope, using raw value", key);
            return Some(parsed);
        }

        let stored = stored_version(&parsed);
        let data = match parsed {
            Value::Object(mut map) => map.remove("data").unwrap_or(Value::Null),
            _ => Value::Null,
        };
        if stored == version {
            return (!data.is_null()).then_some(data);
        }

        debug!(
            "[persistence] \"{}\" stored at version {}, expected {}",
            key, stored, version
        );
        migrate(stored, data)
    }

    pub fn write<T: Serialize>(&self, key: &str, data: &T, version: u32) {
        let envelope = Envelope {
            version,
            saved_at: self.clock.now_millis(),
            data,
        };
        let payload = match serde_json::to_string(&envelope) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("[persistence] write failed for \"{}\": {}", key, e);
                return;
            }
        };
        if let Err(e) = self.store.save(&storage_key(key), &payload) {
            warn!("[persistence] write failed for \"{}\": {}", key, e);
        }
    }

    pub fn clear(&self, key: &str) {
        if let Err(e) = self.store.remove(&storage_key(key)) {
            warn!("[persistence] clear failed for \"{}\": {}", key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::state_store::{InMemoryStateStore, StoreError};
    use schatphone_domain::ManualClock;
    use serde_json::json;

    fn persisted() -> (PersistedState, Arc<InMemoryStateStore>) {
        let store = Arc::new(InMemoryStateStore::new());
        let clock = Arc::new(ManualClock::new(1_000));
        (PersistedState::new(store.clone(), clock), store)
    }

    struct FailingStore;

    impl StateStore for FailingStore {
        fn load(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable("disk on fire".to_string()))
        }

        fn save(&self, _key: &str, _contents: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("disk on fire".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("disk on fire".to_string()))
        }
    }

    #[test]
    fn test_write_wraps_in_envelope() {
        let (persisted, store) = persisted();
        persisted.write("store:chat", &json!({"a": 1}), 2);

        let raw = store.load("schatphone:store:chat").unwrap().unwrap();
        let envelope: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(envelope, json!({"version": 2, "savedAt": 1_000, "data": {"a": 1}}));
        assert_eq!(persisted.read("store:chat", 2), Some(json!({"a": 1})));
    }

    #[test]
    fn test_missing_value_reads_none() {
        let (persisted, _) = persisted();
        assert_eq!(persisted.read("nothing", 1), None);
    }

    #[test]
    fn test_unenveloped_value_is_returned_as_is() {
        let (persisted, store) = persisted();
        store
            .save("schatphone:legacy", r#"{"contacts": [], "chatHistory": {}}"#)
            .unwrap();
        assert_eq!(
            persisted.read("legacy", 2),
            Some(json!({"contacts": [], "chatHistory": {}}))
        );
    }

    #[test]
    fn test_version_mismatch_without_migration_is_none() {
        let (persisted, _) = persisted();
        persisted.write("k", &json!([1]), 1);
        assert_eq!(persisted.read("k", 2), None);
    }

    #[test]
    fn test_version_mismatch_runs_migration() {
        let (persisted, store) = persisted();
        store.save("schatphone:k", r#"{"data": {"n": 1}}"#).unwrap();
        let migrated = persisted.read_with_migration("k", 2, |version, data| {
            assert_eq!(version, 1);
            Some(json!({"upgraded": data}))
        });
        assert_eq!(migrated, Some(json!({"upgraded": {"n": 1}})));
    }

    #[test]
    fn test_corrupt_and_scalar_values_read_none() {
        let (persisted, store) = persisted();
        store.save("schatphone:bad", "{not json").unwrap();
        store.save("schatphone:num", "42").unwrap();
        assert_eq!(persisted.read("bad", 1), None);
        assert_eq!(persisted.read("num", 1), None);
    }

    #[test]
    fn test_store_failures_are_swallowed() {
        let persisted = PersistedState::new(Arc::new(FailingStore), Arc::new(ManualClock::new(0)));
        assert_eq!(persisted.read("k", 1), None);
        persisted.write("k", &json!({}), 1);
        persisted.clear("k");
    }

    #[test]
    fn test_clear_removes_value() {
        let (persisted, _) = persisted();
        persisted.write("k", &json!({"x": true}), 1);
        persisted.clear("k");
        assert_eq!(persisted.read("k", 1), None);
    }
}
