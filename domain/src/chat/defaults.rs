//! Built-in seed data for a fresh install.

use serde_json::{Value, json};

/// The starter contacts and their opening lines, in the legacy
/// `{contacts, chatHistory}` shape so they flow through the same synthesis
/// as migrated data.
pub fn default_legacy_value() -> Value {
    json!({
        "contacts": [
            {
                "id": 1,
                "name": "Eva",
                "role": "Personal AI assistant",
                "isMain": true,
                "avatar": "",
                "lastMessage": "Anything planned for today?",
                "bio": "You are Eva, a highly capable and caring AI assistant. You put the safety of the user (V) first and keep your answers clear and concise."
            },
            {
                "id": 2,
                "name": "Jackie",
                "role": "Mercenary partner",
                "isMain": false,
                "avatar": "",
                "lastMessage": "Hey choom, drinks at the Afterlife tonight?",
                "bio": "You are Jackie Welles: loyal, big-hearted and dreaming of becoming a Night City legend. You trust V completely."
            }
        ],
        "chatHistory": {
            "1": [{"role": "assistant", "content": "Morning, V. All systems nominal."}],
            "2": [{"role": "assistant", "content": "Hey choom, drinks at the Afterlife tonight?"}]
        }
    })
}
