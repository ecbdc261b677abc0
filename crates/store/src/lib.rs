//! SQLite label ledger.
//!
//! One append-only table, `labels`, holding every signed assertion and
//! negation ever issued. `seq` (the integer primary key) is the commit order
//! that downstream folds rely on. Rows are never updated or deleted.

use async_trait::async_trait;
use chrono::Utc;
use sortinghat_core::error::StoreError;
use sortinghat_core::label::LabelEvent;
use sortinghat_core::store::LabelStore;
use sortinghat_core::subject::Did;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};

/// A durable SQLite label store.
pub struct SqliteLabelStore {
    pool: SqlitePool,
}

impl SqliteLabelStore {
    /// Open (or create) the ledger at the given path.
    ///
    /// Pass `"sqlite::memory:"` for an in-process ephemeral ledger (tests).
    pub async fn open(path: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| StoreError::Unavailable(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("Label store opened at {path}");
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS labels (
                seq        INTEGER PRIMARY KEY AUTOINCREMENT,
                issuer     TEXT NOT NULL,
                subject    TEXT NOT NULL,
                category   TEXT NOT NULL,
                negated    INTEGER NOT NULL,
                signature  BLOB NOT NULL,
                timestamp  TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("labels table: {e}")))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_labels_subject ON labels(subject)")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::MigrationFailed(format!("subject index: {e}")))?;

        debug!("Label store migrations complete");
        Ok(())
    }

    fn row_to_event(row: &sqlx::sqlite::SqliteRow) -> Result<LabelEvent, StoreError> {
        let seq: i64 = row
            .try_get("seq")
            .map_err(|e| StoreError::QueryFailed(format!("seq column: {e}")))?;
        let issuer: String = row
            .try_get("issuer")
            .map_err(|e| StoreError::QueryFailed(format!("issuer column: {e}")))?;
        let subject: String = row
            .try_get("subject")
            .map_err(|e| StoreError::QueryFailed(format!("subject column: {e}")))?;
        let category: String = row
            .try_get("category")
            .map_err(|e| StoreError::QueryFailed(format!("category column: {e}")))?;
        let negated: bool = row
            .try_get("negated")
            .map_err(|e| StoreError::QueryFailed(format!("negated column: {e}")))?;
        let signature: Vec<u8> = row
            .try_get("signature")
            .map_err(|e| StoreError::QueryFailed(format!("signature column: {e}")))?;
        let timestamp_str: String = row
            .try_get("timestamp")
            .map_err(|e| StoreError::QueryFailed(format!("timestamp column: {e}")))?;

        let category = category
            .parse()
            .map_err(|e| StoreError::QueryFailed(format!("category value: {e}")))?;

        let timestamp = chrono::DateTime::parse_from_rfc3339(&timestamp_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| StoreError::QueryFailed(format!("timestamp value: {e}")))?;

        Ok(LabelEvent {
            seq,
            issuer: Did::new(issuer),
            subject: Did::new(subject),
            category,
            negated,
            signature,
            timestamp,
        })
    }
}

#[async_trait]
impl LabelStore for SqliteLabelStore {
    async fn append(&self, event: &LabelEvent) -> Result<i64, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO labels (issuer, subject, category, negated, signature, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(event.issuer.as_str())
        .bind(event.subject.as_str())
        .bind(event.category.as_str())
        .bind(event.negated)
        .bind(&event.signature)
        .bind(event.timestamp.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Unavailable(format!("INSERT failed: {e}")))?;

        let seq = result.last_insert_rowid();
        debug!(
            subject = %event.subject,
            category = %event.category,
            negated = event.negated,
            seq,
            "Appended label event"
        );
        Ok(seq)
    }

    async fn history(&self, subject: &Did) -> Result<Vec<LabelEvent>, StoreError> {
        let rows = sqlx::query("SELECT * FROM labels WHERE subject = ?1 ORDER BY seq ASC")
            .bind(subject.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(format!("History query: {e}")))?;

        rows.iter().map(Self::row_to_event).collect()
    }

    async fn query(&self, patterns: &[String], limit: u32) -> Result<Vec<LabelEvent>, StoreError> {
        if patterns.is_empty() {
            return Ok(vec![]);
        }

        // A trailing `*` is prefix matching; everything else matches exactly.
        let conditions: Vec<String> = patterns
            .iter()
            .enumerate()
            .map(|(i, p)| {
                if p.ends_with('*') {
                    format!("subject LIKE ?{} ESCAPE '\\'", i + 1)
                } else {
                    format!("subject = ?{}", i + 1)
                }
            })
            .collect();

        let sql = format!(
            "SELECT * FROM labels WHERE {} ORDER BY seq ASC LIMIT ?{}",
            conditions.join(" OR "),
            patterns.len() + 1
        );

        let mut db_query = sqlx::query(&sql);
        for pattern in patterns {
            if let Some(prefix) = pattern.strip_suffix('*') {
                let escaped = prefix
                    .replace('\\', "\\\\")
                    .replace('%', "\\%")
                    .replace('_', "\\_");
                db_query = db_query.bind(format!("{escaped}%"));
            } else {
                db_query = db_query.bind(pattern.clone());
            }
        }
        db_query = db_query.bind(i64::from(limit));

        let rows = db_query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Pattern query: {e}")))?;

        rows.iter().map(Self::row_to_event).collect()
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM labels")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(format!("COUNT: {e}")))?;

        let cnt: i64 = row
            .try_get("cnt")
            .map_err(|e| StoreError::QueryFailed(format!("cnt column: {e}")))?;

        Ok(cnt as u64)
    }
}
