//! Schema migration table for the persisted chat state.
//!
//! Each step is a pure function upgrading a payload from one stored
//! version to the next. Steps never fail on malformed input; they coerce.

use super::CHAT_STORAGE_VERSION;
use schatphone_domain::ChatSnapshot;
use schatphone_domain::chat::snapshot::is_current_shape;
use serde_json::Value;
use tracing::{info, warn};

type Step = fn(Value, i64) -> Option<Value>;

/// `(from_version, step)`; a step lifts `from_version` to `from_version + 1`.
const MIGRATIONS: &[(u32, Step)] = &[(1, legacy_to_v2)];

/// `{contacts, chatHistory}` → `{contacts, conversations, messagesByConversation}`
fn legacy_to_v2(data: Value, now: i64) -> Option<Value> {
    if is_current_shape(&data) {
        return Some(data);
    }
    serde_json::to_value(ChatSnapshot::from_legacy_value(&data, now)).ok()
}

/// Upgrade `data` stored at `version` to the current version.
///
/// Versions 0 and 1 both mean the pre-split legacy shape. Versions newer
/// than this build understands yield `None`.
pub fn migrate(version: u32, data: Value, now: i64) -> Option<Value> {
    if version > CHAT_STORAGE_VERSION {
        warn!(
            "Stored chat state has version {} (newer than {}), ignoring it",
            version, CHAT_STORAGE_VERSION
        );
        return None;
    }

    let mut current = version.max(1);
    let mut data = data;
    while current < CHAT_STORAGE_VERSION {
        let Some((_, step)) = MIGRATIONS.iter().find(|(from, _)| *from == current) else {
            warn!("No migration from chat state version {}", current);
            return None;
        };
        data = step(data, now)?;
        current += 1;
    }
    info!("Migrated chat state from version {} to {}", version, current);
    Some(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NOW: i64 = 1_700_000_000_000;

    #[test]
    fn test_every_old_version_has_a_path() {
        for version in 0..CHAT_STORAGE_VERSION {
            assert!(migrate(version, json!({}), NOW).is_some(), "version {version}");
        }
    }

    #[test]
    fn test_legacy_payload_is_upgraded() {
        let data = json!({
            "contacts": [{"id": 3, "name": "Vik"}],
            "chatHistory": {"3": [{"role": "user", "content": "patch me up"}]}
        });
        let upgraded = migrate(1, data, NOW).unwrap();
        assert!(is_current_shape(&upgraded));
        assert_eq!(
            upgraded["messagesByConversation"]["3"][0]["content"],
            json!("patch me up")
        );
        assert_eq!(upgraded["conversations"]["3"]["id"], json!("conv_3"));
    }

    #[test]
    fn test_current_shaped_v1_payload_passes_through() {
        let data = json!({"contacts": [], "conversations": {"1": {}}, "messagesByConversation": {"1": []}});
        assert_eq!(migrate(1, data.clone(), NOW), Some(data));
    }

    #[test]
    fn test_newer_version_is_rejected() {
        assert_eq!(migrate(CHAT_STORAGE_VERSION + 1, json!({}), NOW), None);
    }
}
