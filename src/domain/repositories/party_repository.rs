use async_trait::async_trait;

use crate::domain::entities::{Party, QueueItem};

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    #[error("Database error: {0}")]
    Database(String),
}

/// Party repository trait
#[async_trait]
pub trait PartyRepository: Send + Sync {
    // ========== Party operations ==========

    /// Find party by ID
    async fn find_by_id(&self, id: &str) -> Result<Option<Party>, RepositoryError>;

    /// Find party by join code
    async fn find_by_join_code(&self, code: &str) -> Result<Option<Party>, RepositoryError>;

    /// Save party (create or update)
    async fn save(&self, party: &Party) -> Result<(), RepositoryError>;

    /// Delete party and its queue items
    async fn delete(&self, id: &str) -> Result<(), RepositoryError>;

    // ========== Queue item operations ==========

    /// All queue items for a party (played and unplayed), submission order
    async fn list_items(&self, party_id: &str) -> Result<Vec<QueueItem>, RepositoryError>;

    /// Find one queue item
    async fn find_item(
        &self,
        party_id: &str,
        item_id: &str,
    ) -> Result<Option<QueueItem>, RepositoryError>;

    /// Allocate the next per-party submission sequence number
    async fn next_added_seq(&self, party_id: &str) -> Result<i64, RepositoryError>;

    /// Insert a new queue item
    async fn insert_item(&self, item: &QueueItem) -> Result<(), RepositoryError>;

    /// Delete an unplayed queue item; NotFound if absent or already played
    async fn delete_item(&self, party_id: &str, item_id: &str) -> Result<(), RepositoryError>;

    /// Set played_at exactly once; NotFound if the row is absent or the
    /// timestamp was already written by a racing call
    async fn mark_played(
        &self,
        party_id: &str,
        item_id: &str,
        played_at: i64,
    ) -> Result<(), RepositoryError>;

    /// Flip the host-settable priority flag
    async fn set_priority(
        &self,
        party_id: &str,
        item_id: &str,
        is_priority: bool,
    ) -> Result<(), RepositoryError>;

    /// Persist a manual-order permutation as item positions
    async fn set_positions(
        &self,
        party_id: &str,
        ordered_ids: &[String],
    ) -> Result<(), RepositoryError>;

    /// Drop stored manual positions (automatic ordering resumed)
    async fn clear_positions(&self, party_id: &str) -> Result<(), RepositoryError>;
}
