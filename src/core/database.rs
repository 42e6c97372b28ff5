// src/core/database.rs
//! SQLite storage for user profiles and completed interviews

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::path::Path;
use tracing::{error, info, warn};

use crate::interview::types::InterviewRecord;

/// Largest serialized record stored as-is. Bigger records are stored simplified.
pub const MAX_RECORD_BYTES: usize = 256 * 1024;

// ===== Core Database Connection Management =====

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database file and run migrations
    pub async fn new(database_path: &Path) -> Result<Self> {
        if let Some(parent) = database_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path.display());
        let pool = SqlitePool::connect(&database_url).await.with_context(|| {
            format!("Failed to connect to database: {}", database_path.display())
        })?;

        info!(
            "Database connection established: {}",
            database_path.display()
        );

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS profiles (
                uid TEXT PRIMARY KEY,
                email TEXT NOT NULL DEFAULT '',
                first_name TEXT NOT NULL DEFAULT '',
                last_name TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL,
                last_login_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create profiles table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS interviews (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                job_role TEXT NOT NULL,
                difficulty TEXT NOT NULL,
                overall_score INTEGER NOT NULL,
                completed_at TEXT NOT NULL,
                simplified BOOLEAN NOT NULL DEFAULT FALSE,
                payload TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create interviews table")?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_interviews_user_completed ON interviews(user_id, completed_at);",
        )
        .execute(&self.pool)
        .await?;

        info!("Database migrations completed");
        Ok(())
    }

    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }
}

// ===== Profiles =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
    pub last_login_at: DateTime<Utc>,
}

pub struct ProfileRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProfileRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the profile on first sight, otherwise refresh email and login time.
    pub async fn record_login(&self, uid: &str, email: &str) -> Result<UserProfile> {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO profiles (uid, email, first_name, last_name, created_at, last_login_at)
            VALUES (?, ?, '', '', ?, ?)
            ON CONFLICT(uid) DO UPDATE SET
                email = CASE WHEN excluded.email = '' THEN profiles.email ELSE excluded.email END,
                last_login_at = excluded.last_login_at
            "#,
        )
        .bind(uid)
        .bind(email)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await
        .with_context(|| format!("Failed to record login for {}", uid))?;

        self.find(uid)
            .await?
            .with_context(|| format!("Profile {} missing after upsert", uid))
    }

    pub async fn find(&self, uid: &str) -> Result<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT uid, email, first_name, last_name, created_at, last_login_at
            FROM profiles
            WHERE uid = ?
            "#,
        )
        .bind(uid)
        .fetch_optional(self.pool)
        .await?;

        Ok(profile)
    }

    pub async fn update_names(
        &self,
        uid: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<Option<UserProfile>> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET first_name = COALESCE(?, first_name),
                last_name = COALESCE(?, last_name)
            WHERE uid = ?
            "#,
        )
        .bind(first_name.map(str::trim))
        .bind(last_name.map(str::trim))
        .bind(uid)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        info!("Updated profile names for {}", uid);
        self.find(uid).await
    }
}

// ===== Interview history =====

/// How a completed interview ended up in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Full,
    Simplified,
    Failed,
}

#[derive(sqlx::FromRow)]
struct InterviewRow {
    id: String,
    payload: String,
}

pub struct InterviewRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> InterviewRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a completed interview. Falls back to the simplified form when the
    /// full record cannot be stored; never fails the caller.
    pub async fn save_completed(&self, record: &InterviewRecord) -> SaveOutcome {
        match self.insert_full(record).await {
            Ok(()) => return SaveOutcome::Full,
            Err(e) => warn!(
                "Could not store interview {} in full, retrying simplified: {:#}",
                record.id, e
            ),
        }

        match self.insert_simplified(record).await {
            Ok(()) => SaveOutcome::Simplified,
            Err(e) => {
                error!("Failed to store interview {}: {:#}", record.id, e);
                SaveOutcome::Failed
            }
        }
    }

    async fn insert_full(&self, record: &InterviewRecord) -> Result<()> {
        let payload = serde_json::to_string(record).context("Failed to serialize interview")?;
        if payload.len() > MAX_RECORD_BYTES {
            anyhow::bail!(
                "Serialized interview is {} bytes, limit is {}",
                payload.len(),
                MAX_RECORD_BYTES
            );
        }
        self.insert(record, &payload, false).await
    }

    async fn insert_simplified(&self, record: &InterviewRecord) -> Result<()> {
        let payload = serde_json::to_string(&record.simplified())
            .context("Failed to serialize simplified interview")?;
        self.insert(record, &payload, true).await
    }

    async fn insert(&self, record: &InterviewRecord, payload: &str, simplified: bool) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO interviews
                (id, user_id, job_role, difficulty, overall_score, completed_at, simplified, payload)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id.to_string())
        .bind(&record.user_id)
        .bind(&record.job_role)
        .bind(&record.difficulty)
        .bind(record.overall_score as i64)
        .bind(record.completed_at)
        .bind(simplified)
        .bind(payload)
        .execute(self.pool)
        .await
        .context("Failed to insert interview")?;
        Ok(())
    }

    pub async fn last_for_user(&self, user_id: &str) -> Result<Option<InterviewRecord>> {
        let row = sqlx::query_as::<_, InterviewRow>(
            r#"
            SELECT id, payload FROM interviews
            WHERE user_id = ?
            ORDER BY completed_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.and_then(decode))
    }

    /// Oldest first. Records that no longer decode are skipped.
    pub async fn history_for_user(
        &self,
        user_id: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<InterviewRecord>> {
        let rows = match since {
            Some(since) => {
                sqlx::query_as::<_, InterviewRow>(
                    r#"
                    SELECT id, payload FROM interviews
                    WHERE user_id = ? AND completed_at >= ?
                    ORDER BY completed_at ASC
                    "#,
                )
                .bind(user_id)
                .bind(since)
                .fetch_all(self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, InterviewRow>(
                    r#"
                    SELECT id, payload FROM interviews
                    WHERE user_id = ?
                    ORDER BY completed_at ASC
                    "#,
                )
                .bind(user_id)
                .fetch_all(self.pool)
                .await?
            }
        };

        Ok(rows.into_iter().filter_map(decode).collect())
    }
}

fn decode(row: InterviewRow) -> Option<InterviewRecord> {
    match serde_json::from_str(&row.payload) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!("Skipping unreadable interview {}: {}", row.id, e);
            None
        }
    }
}
