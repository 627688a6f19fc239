use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

/// A single contact-form entry as stored and as returned to the admin UI.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Submission {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn insert(
        &self,
        name: &str,
        email: &str,
        message: &str,
    ) -> anyhow::Result<(i64, OffsetDateTime)>;
    async fn count(&self) -> anyhow::Result<i64>;
    async fn page(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<Submission>>;
    async fn delete_by_id(&self, id: i64) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgSubmissionStore {
    db: PgPool,
}

impl PgSubmissionStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SubmissionStore for PgSubmissionStore {
    async fn insert(
        &self,
        name: &str,
        email: &str,
        message: &str,
    ) -> anyhow::Result<(i64, OffsetDateTime)> {
        let row: (i64, OffsetDateTime) = sqlx::query_as(
            r#"
            INSERT INTO contact_submissions (name, email, message)
            VALUES ($1, $2, $3)
            RETURNING id, created_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(message)
        .fetch_one(&self.db)
        .await
        .context("insert contact submission")?;
        Ok(row)
    }

    async fn count(&self) -> anyhow::Result<i64> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM contact_submissions")
            .fetch_one(&self.db)
            .await
            .context("count contact submissions")?;
        Ok(total)
    }

    async fn page(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<Submission>> {
        let rows = sqlx::query_as::<_, Submission>(
            r#"
            SELECT id, name, email, message, created_at
            FROM contact_submissions
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await
        .context("page contact submissions")?;
        Ok(rows)
    }

    async fn delete_by_id(&self, id: i64) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM contact_submissions WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete contact submission")?;
        Ok(result.rows_affected() > 0)
    }
}

/// In-memory store backing `AppState::fake`. Mirrors the Postgres ordering
/// semantics: ids are assigned monotonically, listing is newest first with
/// `id` breaking `created_at` ties.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<Submission>>,
    next_id: AtomicI64,
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn insert(
        &self,
        name: &str,
        email: &str,
        message: &str,
    ) -> anyhow::Result<(i64, OffsetDateTime)> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let created_at = OffsetDateTime::now_utc();
        let mut rows = self.rows.lock().expect("store lock");
        rows.push(Submission {
            id,
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
            created_at,
        });
        Ok((id, created_at))
    }

    async fn count(&self) -> anyhow::Result<i64> {
        let rows = self.rows.lock().expect("store lock");
        Ok(rows.len() as i64)
    }

    async fn page(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<Submission>> {
        let rows = self.rows.lock().expect("store lock");
        let mut ordered: Vec<Submission> = rows.clone();
        ordered.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(ordered
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn delete_by_id(&self, id: i64) -> anyhow::Result<bool> {
        let mut rows = self.rows.lock().expect("store lock");
        let before = rows.len();
        rows.retain(|s| s.id != id);
        Ok(rows.len() < before)
    }
}
