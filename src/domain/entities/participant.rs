use serde::{Deserialize, Serialize};

/// Participant role within a party
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    Host,
    Guest,
}

impl ParticipantRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantRole::Host => "host",
            ParticipantRole::Guest => "guest",
        }
    }
}

/// Ephemeral presence record, keyed by (party, name)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub name: String,
    pub role: ParticipantRole,
    pub avatar: Option<String>,
    pub joined_at: i64,
    pub last_seen_at: i64,
}

impl Participant {
    pub fn new(name: String, avatar: Option<String>, now: i64) -> Self {
        Self {
            name,
            role: ParticipantRole::Guest,
            avatar,
            joined_at: now,
            last_seen_at: now,
        }
    }

    /// Active means seen within the liveness window
    pub fn is_active(&self, now: i64, window_secs: i64) -> bool {
        now - self.last_seen_at <= window_secs
    }
}
