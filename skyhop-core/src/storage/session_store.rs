use crate::error::Result;
use crate::storage::Storage;
use crate::types::SessionRecord;
use chrono::Utc;
use rusqlite::params;
use uuid::Uuid;

pub struct SessionStore<'a> {
    storage: &'a Storage,
}

impl<'a> SessionStore<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Record a finished run and return it with its generated id.
    pub async fn record_session(&self, score: u32) -> Result<SessionRecord> {
        let record = SessionRecord {
            id: Uuid::new_v4().to_string(),
            score,
            played_at: Utc::now(),
            submitted_tx: None,
        };

        let conn = self.storage.get_connection().await;
        conn.execute(
            "INSERT INTO sessions (id, score, played_at, submitted_tx)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                record.id,
                record.score,
                record.played_at.timestamp(),
                record.submitted_tx,
            ],
        )?;

        Ok(record)
    }

    /// Attach the submission transaction hash to a stored session.
    pub async fn mark_submitted(&self, session_id: &str, tx_hash: &str) -> Result<()> {
        let conn = self.storage.get_connection().await;
        conn.execute(
            "UPDATE sessions SET submitted_tx = ?1 WHERE id = ?2",
            params![tx_hash, session_id],
        )?;
        Ok(())
    }

    pub async fn high_score(&self) -> Result<u32> {
        let conn = self.storage.get_connection().await;
        let mut stmt = conn.prepare("SELECT COALESCE(MAX(score), 0) FROM sessions")?;
        let high: u32 = stmt.query_row([], |row| row.get(0))?;
        Ok(high)
    }

    /// Most recent session, if any run has been recorded.
    pub async fn last_session(&self) -> Result<Option<SessionRecord>> {
        let mut sessions = self.recent_sessions(1).await?;
        Ok(sessions.pop())
    }

    pub async fn recent_sessions(&self, limit: u32) -> Result<Vec<SessionRecord>> {
        let conn = self.storage.get_connection().await;
        let mut stmt = conn.prepare(
            "SELECT id, score, played_at, submitted_tx
             FROM sessions ORDER BY played_at DESC, id LIMIT ?1",
        )?;

        let session_iter = stmt.query_map(params![limit], |row| {
            Ok(SessionRecord {
                id: row.get(0)?,
                score: row.get(1)?,
                played_at: chrono::DateTime::from_timestamp(row.get(2)?, 0)
                    .unwrap_or_else(Utc::now),
                submitted_tx: row.get(3)?,
            })
        })?;

        let mut sessions = Vec::new();
        for session in session_iter {
            sessions.push(session?);
        }
        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn test_storage() -> (TempDir, Storage) {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(&dir.path().join("sessions.db")).await.unwrap();
        (dir, storage)
    }

    #[tokio::test]
    async fn test_record_and_list_sessions() {
        let (_dir, storage) = test_storage().await;
        let store = storage.sessions();

        store.record_session(120).await.unwrap();
        store.record_session(45).await.unwrap();

        let sessions = store.recent_sessions(10).await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert!(sessions.iter().any(|s| s.score == 120));
        assert!(sessions.iter().all(|s| s.submitted_tx.is_none()));
    }

    #[tokio::test]
    async fn test_high_score() {
        let (_dir, storage) = test_storage().await;
        let store = storage.sessions();

        assert_eq!(store.high_score().await.unwrap(), 0);

        store.record_session(80).await.unwrap();
        store.record_session(300).await.unwrap();
        store.record_session(150).await.unwrap();

        assert_eq!(store.high_score().await.unwrap(), 300);
    }

    #[tokio::test]
    async fn test_mark_submitted() {
        let (_dir, storage) = test_storage().await;
        let store = storage.sessions();

        let record = store.record_session(200).await.unwrap();
        store.mark_submitted(&record.id, "0xabc123").await.unwrap();

        let last = store.last_session().await.unwrap().unwrap();
        assert_eq!(last.id, record.id);
        assert_eq!(last.submitted_tx.as_deref(), Some("0xabc123"));
    }

    #[tokio::test]
    async fn test_recent_sessions_limit() {
        let (_dir, storage) = test_storage().await;
        let store = storage.sessions();

        for score in 0..5u32 {
            store.record_session(score).await.unwrap();
        }

        let sessions = store.recent_sessions(3).await.unwrap();
        assert_eq!(sessions.len(), 3);
    }
}
