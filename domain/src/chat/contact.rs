//! Contact entity

use super::normalize;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Largest id a contact may carry: integers above it do not survive a JSON
/// round trip through an `f64`.
pub const MAX_CONTACT_ID: u64 = (1 << 53) - 1;

/// What a contact represents in the list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactKind {
    /// An AI persona you chat with
    #[default]
    Persona,
    /// A service account that sends templated notifications
    Service,
    /// An official account that posts announcements
    Official,
}

impl ContactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactKind::Persona => "persona",
            ContactKind::Service => "service",
            ContactKind::Official => "official",
        }
    }

    /// Case-insensitive; `None` for anything unrecognized.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "persona" => Some(ContactKind::Persona),
            "service" => Some(ContactKind::Service),
            "official" => Some(ContactKind::Official),
            _ => None,
        }
    }
}

impl fmt::Display for ContactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A chat partner (Entity)
///
/// `last_message` is a denormalized cache of the owning conversation's
/// summary and is rewritten by `ChatState` after every message mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: u64,
    pub name: String,
    pub role: String,
    pub is_main: bool,
    pub avatar: String,
    pub bio: String,
    pub last_message: String,
    pub kind: ContactKind,
    /// Message template used by service accounts
    pub service_template: String,
}

/// Caller input for `ChatState::add_contact`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewContact {
    /// Omitted, zero, oversized or colliding ids are replaced by `max + 1`
    pub id: Option<u64>,
    pub name: String,
    pub role: String,
    pub is_main: bool,
    pub avatar: String,
    pub bio: String,
    pub last_message: String,
    pub kind: ContactKind,
    pub service_template: String,
}

impl NewContact {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = bio.into();
        self
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn main(mut self) -> Self {
        self.is_main = true;
        self
    }

    pub fn with_kind(mut self, kind: ContactKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_service_template(mut self, template: impl Into<String>) -> Self {
        self.service_template = template.into();
        self
    }
}

/// Partial update for an existing contact. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactPatch {
    pub name: Option<String>,
    pub role: Option<String>,
    pub is_main: Option<bool>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub kind: Option<ContactKind>,
    pub service_template: Option<String>,
}

fn display_name(name: &str, id: u64) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        format!("Contact {id}")
    } else {
        trimmed.to_string()
    }
}

impl Contact {
    pub(crate) fn from_new(new: NewContact, id: u64) -> Self {
        Self {
            id,
            name: display_name(&new.name, id),
            role: new.role,
            is_main: new.is_main,
            avatar: new.avatar,
            bio: new.bio,
            last_message: new.last_message,
            kind: new.kind,
            service_template: new.service_template,
        }
    }

    /// Tolerant read of a persisted contact.
    ///
    /// Ids that are not numbers in `1..=MAX_CONTACT_ID` are replaced by
    /// `now + fallback_index`. Unknown kinds read as [`ContactKind::Persona`].
    pub fn from_value(raw: &Value, fallback_index: usize, now: i64) -> Self {
        let id = normalize::numeric(raw.get("id"))
            .filter(|id| (1.0..=MAX_CONTACT_ID as f64).contains(id))
            .map(|id| id.floor() as u64)
            .unwrap_or_else(|| now.max(0) as u64 + fallback_index as u64);
        let text = |field: &str| {
            normalize::string(raw.get(field))
                .unwrap_or_default()
                .to_string()
        };

        Self {
            id,
            name: display_name(normalize::string(raw.get("name")).unwrap_or_default(), id),
            role: text("role"),
            is_main: normalize::truthy(raw.get("isMain")),
            avatar: text("avatar"),
            bio: text("bio"),
            last_message: text("lastMessage"),
            kind: normalize::string(raw.get("kind"))
                .and_then(ContactKind::parse)
                .unwrap_or_default(),
            service_template: text("serviceTemplate"),
        }
    }

    /// Returns whether anything changed.
    pub(crate) fn apply_patch(&mut self, patch: ContactPatch) -> bool {
        let before = self.clone();
        if let Some(name) = patch.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            self.name = name.to_string();
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        if let Some(is_main) = patch.is_main {
            self.is_main = is_main;
        }
        if let Some(avatar) = patch.avatar {
            self.avatar = avatar;
        }
        if let Some(bio) = patch.bio {
            self.bio = bio;
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(template) = patch.service_template {
            self.service_template = template;
        }
        *self != before
    }

    /// The system prompt used when talking to this contact.
    pub fn system_prompt(&self) -> String {
        match crate::core::string::non_blank(&self.bio) {
            Some(bio) => bio.to_string(),
            None => format!("You are {}.", self.name),
        }
    }
}
