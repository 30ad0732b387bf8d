use crate::error::Result;
use crate::models::chat::ChatMessage;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct ChatService {
    pool: PgPool,
}

impl ChatService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persists one chat turn: the inbound user message, then the generated
    /// reply, inside a single transaction so a failed insert never leaves a
    /// half-recorded exchange.
    pub async fn record_exchange(&self, user_id: Uuid, prompt: &str, reply: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO chat_messages (user_id, sender, message) VALUES ($1, 'user', $2)")
            .bind(user_id)
            .bind(prompt)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO chat_messages (user_id, sender, message) VALUES ($1, 'bot', $2)")
            .bind(user_id)
            .bind(reply)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn history(&self, user_id: Uuid) -> Result<Vec<ChatMessage>> {
        let messages = sqlx::query_as::<_, ChatMessage>(
            r#"
            SELECT id, user_id, sender, message, timestamp
            FROM chat_messages
            WHERE user_id = $1
            ORDER BY timestamp ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    pub async fn clear(&self, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM chat_messages WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
