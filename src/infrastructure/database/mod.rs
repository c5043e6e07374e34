pub mod repositories;

use sqlx::SqlitePool;

/// Create the schema if it does not exist yet. Idempotent, runs at startup
/// so an in-memory database is usable without external migration tooling.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS parties (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            host_name TEXT NOT NULL,
            join_code TEXT NOT NULL UNIQUE,
            status TEXT NOT NULL,
            settings_json TEXT NOT NULL,
            current_item_id TEXT,
            current_started_at INTEGER,
            current_remaining_seconds INTEGER,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS queue_items (
            id TEXT PRIMARY KEY,
            party_id TEXT NOT NULL,
            singer_name TEXT NOT NULL,
            title TEXT NOT NULL,
            cover_url TEXT,
            duration_seconds INTEGER NOT NULL,
            added_seq INTEGER NOT NULL,
            played_at INTEGER,
            is_priority INTEGER NOT NULL DEFAULT 0,
            tiebreak_key INTEGER NOT NULL,
            position INTEGER,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_queue_items_party ON queue_items(party_id, added_seq)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
