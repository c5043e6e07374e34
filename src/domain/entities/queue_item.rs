use serde::{Deserialize, Serialize};

/// One submitted song awaiting or having completed its turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueItem {
    pub id: String,
    pub party_id: String,
    pub singer_name: String,
    pub title: String,
    pub cover_url: Option<String>,
    /// Resolved once at submission time
    pub duration_seconds: i64,
    /// Monotonic per-party submission sequence
    pub added_seq: i64,
    /// Set exactly once by the advance operation, never unset
    pub played_at: Option<i64>,
    pub is_priority: bool,
    /// Orders items considered simultaneously added
    pub tiebreak_key: u32,
    /// Manual-order slot; only meaningful while the host permutation is active
    pub position: Option<i64>,
    pub created_at: i64,
}

impl QueueItem {
    pub fn new(
        party_id: String,
        singer_name: String,
        title: String,
        cover_url: Option<String>,
        duration_seconds: i64,
        added_seq: i64,
    ) -> Self {
        use rand::Rng;
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            party_id,
            singer_name,
            title,
            cover_url,
            duration_seconds,
            added_seq,
            played_at: None,
            is_priority: false,
            tiebreak_key: rand::thread_rng().gen(),
            position: None,
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    pub fn is_played(&self) -> bool {
        self.played_at.is_some()
    }
}
