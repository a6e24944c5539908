//! Broadcast persistence
//!
//! The active message is swapped inside one transaction so that readers
//! only ever see the old active row or the new one.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::{BroadcastError, BroadcastMessage, MessageText};

/// Broadcast message storage with database backing
#[derive(Clone)]
pub struct BroadcastStore {
    pool: SqlitePool,
}

impl BroadcastStore {
    /// Create a new broadcast store with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the currently active message, if any
    ///
    /// Newest wins if more than one row is ever flagged active.
    pub async fn active(&self) -> Result<Option<BroadcastMessage>, BroadcastError> {
        let row: Option<MessageRow> = sqlx::query_as(
            r#"
            SELECT id, message, is_active, created_at
            FROM broadcast_messages
            WHERE is_active = 1
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        row.map(MessageRow::into_message).transpose()
    }

    /// Make `message` the active broadcast, deactivating whatever was active
    pub async fn publish(&self, message: &MessageText) -> Result<BroadcastMessage, BroadcastError> {
        // Rolled back on drop if anything below fails
        let mut tx = self.pool.begin().await?;

        let deactivated = sqlx::query("UPDATE broadcast_messages SET is_active = 0 WHERE is_active = 1")
            .execute(&mut *tx)
            .await?
            .rows_affected();

        // Stamped under the write lock, at the precision that is stored
        let created_at = Utc::now().trunc_subsecs(6);
        let stamp = created_at.to_rfc3339_opts(SecondsFormat::Micros, true);

        let id = sqlx::query(
            "INSERT INTO broadcast_messages (message, is_active, created_at) VALUES (?, 1, ?)",
        )
        .bind(message.as_str())
        .bind(&stamp)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        tx.commit().await?;

        debug!("Deactivated {} previous broadcast(s)", deactivated);
        info!("Published broadcast {}", id);

        Ok(BroadcastMessage {
            id,
            message: message.as_str().to_string(),
            is_active: true,
            created_at,
        })
    }

    /// Get a message by ID, active or not
    pub async fn get(&self, id: i64) -> Result<Option<BroadcastMessage>, BroadcastError> {
        let row: Option<MessageRow> = sqlx::query_as(
            "SELECT id, message, is_active, created_at FROM broadcast_messages WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(MessageRow::into_message).transpose()
    }

    /// Number of rows currently flagged active (0 or 1 when healthy)
    pub async fn active_count(&self) -> Result<i64, BroadcastError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM broadcast_messages WHERE is_active = 1")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}

/// Row type for SQLite queries
#[derive(sqlx::FromRow)]
struct MessageRow {
    id: i64,
    message: String,
    is_active: bool,
    created_at: String,
}

impl MessageRow {
    fn into_message(self) -> Result<BroadcastMessage, BroadcastError> {
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|source| BroadcastError::Timestamp {
                id: self.id,
                source,
            })?
            .with_timezone(&Utc);

        Ok(BroadcastMessage {
            id: self.id,
            message: self.message,
            is_active: self.is_active,
            created_at,
        })
    }
}
