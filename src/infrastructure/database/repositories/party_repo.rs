use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::domain::entities::{Party, PartyStatus, QueueItem};
use crate::domain::repositories::{PartyRepository, RepositoryError};

/// SQLite implementation of PartyRepository
pub struct SqlitePartyRepository {
    pool: SqlitePool,
}

impl SqlitePartyRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_party(row: &sqlx::sqlite::SqliteRow) -> Party {
        use sqlx::Row;

        let status_str: String = row.get("status");
        let settings_json: String = row.get("settings_json");

        Party {
            id: row.get("id"),
            name: row.get("name"),
            host_name: row.get("host_name"),
            join_code: row.get("join_code"),
            status: PartyStatus::from_str(&status_str).unwrap_or(PartyStatus::Open),
            settings: serde_json::from_str(&settings_json).unwrap_or_default(),
            current_item_id: row.get("current_item_id"),
            current_started_at: row.get("current_started_at"),
            current_remaining_seconds: row.get("current_remaining_seconds"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }

    fn row_to_item(row: &sqlx::sqlite::SqliteRow) -> QueueItem {
        use sqlx::Row;

        QueueItem {
            id: row.get("id"),
            party_id: row.get("party_id"),
            singer_name: row.get("singer_name"),
            title: row.get("title"),
            cover_url: row.get("cover_url"),
            duration_seconds: row.get("duration_seconds"),
            added_seq: row.get("added_seq"),
            played_at: row.get("played_at"),
            is_priority: row.get::<i64, _>("is_priority") != 0,
            tiebreak_key: row.get::<i64, _>("tiebreak_key") as u32,
            position: row.get("position"),
            created_at: row.get("created_at"),
        }
    }
}

#[async_trait]
impl PartyRepository for SqlitePartyRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Party>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM parties WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(row.as_ref().map(Self::row_to_party))
    }

    async fn find_by_join_code(&self, code: &str) -> Result<Option<Party>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM parties WHERE join_code = ?")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(row.as_ref().map(Self::row_to_party))
    }

    async fn save(&self, party: &Party) -> Result<(), RepositoryError> {
        let settings_json = serde_json::to_string(&party.settings)
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO parties (
                id, name, host_name, join_code, status, settings_json,
                current_item_id, current_started_at, current_remaining_seconds,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                status = excluded.status,
                settings_json = excluded.settings_json,
                current_item_id = excluded.current_item_id,
                current_started_at = excluded.current_started_at,
                current_remaining_seconds = excluded.current_remaining_seconds,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&party.id)
        .bind(&party.name)
        .bind(&party.host_name)
        .bind(&party.join_code)
        .bind(party.status.as_str())
        .bind(&settings_json)
        .bind(&party.current_item_id)
        .bind(party.current_started_at)
        .bind(party.current_remaining_seconds)
        .bind(party.created_at)
        .bind(party.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM queue_items WHERE party_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        sqlx::query("DELETE FROM parties WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(())
    }

    async fn list_items(&self, party_id: &str) -> Result<Vec<QueueItem>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM queue_items WHERE party_id = ? ORDER BY added_seq")
            .bind(party_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(rows.iter().map(Self::row_to_item).collect())
    }

    async fn find_item(
        &self,
        party_id: &str,
        item_id: &str,
    ) -> Result<Option<QueueItem>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM queue_items WHERE party_id = ? AND id = ?")
            .bind(party_id)
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(row.as_ref().map(Self::row_to_item))
    }

    async fn next_added_seq(&self, party_id: &str) -> Result<i64, RepositoryError> {
        use sqlx::Row;

        // Callers hold the party lock, so max+1 cannot race with itself
        let row = sqlx::query(
            "SELECT COALESCE(MAX(added_seq), 0) AS max_seq FROM queue_items WHERE party_id = ?",
        )
        .bind(party_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(row.get::<i64, _>("max_seq") + 1)
    }

    async fn insert_item(&self, item: &QueueItem) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO queue_items (
                id, party_id, singer_name, title, cover_url, duration_seconds,
                added_seq, played_at, is_priority, tiebreak_key, position, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&item.id)
        .bind(&item.party_id)
        .bind(&item.singer_name)
        .bind(&item.title)
        .bind(&item.cover_url)
        .bind(item.duration_seconds)
        .bind(item.added_seq)
        .bind(item.played_at)
        .bind(item.is_priority as i64)
        .bind(item.tiebreak_key as i64)
        .bind(item.position)
        .bind(item.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(())
    }

    async fn delete_item(&self, party_id: &str, item_id: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM queue_items WHERE party_id = ? AND id = ? AND played_at IS NULL",
        )
        .bind(party_id)
        .bind(item_id)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "unplayed queue item {}",
                item_id
            )));
        }

        Ok(())
    }

    async fn mark_played(
        &self,
        party_id: &str,
        item_id: &str,
        played_at: i64,
    ) -> Result<(), RepositoryError> {
        // played_at IS NULL makes the write first-wins under races
        let result = sqlx::query(
            "UPDATE queue_items SET played_at = ? WHERE party_id = ? AND id = ? AND played_at IS NULL",
        )
        .bind(played_at)
        .bind(party_id)
        .bind(item_id)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "unplayed queue item {}",
                item_id
            )));
        }

        Ok(())
    }

    async fn set_priority(
        &self,
        party_id: &str,
        item_id: &str,
        is_priority: bool,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE queue_items SET is_priority = ? WHERE party_id = ? AND id = ?")
            .bind(is_priority as i64)
            .bind(party_id)
            .bind(item_id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("queue item {}", item_id)));
        }

        Ok(())
    }

    async fn set_positions(
        &self,
        party_id: &str,
        ordered_ids: &[String],
    ) -> Result<(), RepositoryError> {
        for (index, item_id) in ordered_ids.iter().enumerate() {
            sqlx::query("UPDATE queue_items SET position = ? WHERE party_id = ? AND id = ?")
                .bind(index as i64)
                .bind(party_id)
                .bind(item_id)
                .execute(&self.pool)
                .await
                .map_err(|e| RepositoryError::Database(e.to_string()))?;
        }

        Ok(())
    }

    async fn clear_positions(&self, party_id: &str) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE queue_items SET position = NULL WHERE party_id = ?")
            .bind(party_id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(())
    }
}
