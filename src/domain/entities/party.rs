use serde::{Deserialize, Serialize};

use crate::domain::value_objects::PartySettings;

/// Party status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyStatus {
    Open,
    Started,
    Closed,
}

impl PartyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartyStatus::Open => "open",
            PartyStatus::Started => "started",
            PartyStatus::Closed => "closed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "open" => Some(PartyStatus::Open),
            "started" => Some(PartyStatus::Started),
            "closed" => Some(PartyStatus::Closed),
            _ => None,
        }
    }
}

/// Party entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub id: String,
    pub name: String,
    pub host_name: String,
    pub join_code: String,
    pub status: PartyStatus,
    pub settings: PartySettings,
    /// Item the playback clock is loaded with, if any
    pub current_item_id: Option<String>,
    /// Millisecond timestamp of the moment playback started; None while paused
    pub current_started_at: Option<i64>,
    pub current_remaining_seconds: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Party {
    /// Create a new party in the Open (pre-show) state
    pub fn new(
        id: String,
        name: String,
        host_name: String,
        join_code: String,
        settings: PartySettings,
    ) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            id,
            name,
            host_name,
            join_code,
            status: PartyStatus::Open,
            settings,
            current_item_id: None,
            current_started_at: None,
            current_remaining_seconds: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.status == PartyStatus::Closed
    }

    /// True while the clock is counting down (Loaded-Playing)
    pub fn is_playing(&self) -> bool {
        self.current_started_at.is_some()
    }

    /// Open -> Started
    pub fn start(&mut self) {
        self.status = PartyStatus::Started;
        self.touch();
    }

    /// Started -> Open (intermission); the clock is dropped with the slot
    pub fn suspend(&mut self) {
        self.status = PartyStatus::Open;
        self.clear_clock();
        self.touch();
    }

    /// Terminal transition; no mutation is accepted afterwards
    pub fn close(&mut self) {
        self.status = PartyStatus::Closed;
        self.clear_clock();
        self.touch();
    }

    pub fn clear_clock(&mut self) {
        self.current_item_id = None;
        self.current_started_at = None;
        self.current_remaining_seconds = None;
    }

    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().timestamp();
    }
}

/// Generate a random 8-character join code
pub fn generate_join_code() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
    let mut rng = rand::thread_rng();
    (0..8)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}
