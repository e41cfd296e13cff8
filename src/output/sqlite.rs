use super::OutputHandler;
use crate::error::Result;
use crate::render::RenderedRow;
use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use std::path::PathBuf;

/// Appends rows to a SQLite table. Absent fields are stored as NULL.
pub struct SqliteOutput {
    pool: SqlitePool,
    table_name: String,
    initialized: bool,
}

impl SqliteOutput {
    /// `table_name` must already be a plain identifier; the config loader checks it.
    pub async fn new(path: PathBuf, table_name: String) -> Result<Self> {
        let conn_str = format!("sqlite:{}?mode=rwc", path.display());
        let pool = SqlitePool::connect(&conn_str).await?;

        Ok(Self {
            pool,
            table_name,
            initialized: false,
        })
    }

    async fn ensure_table(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        let query = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id INTEGER PRIMARY KEY,
                ordinal INTEGER NOT NULL,
                input_url TEXT NOT NULL,
                title TEXT,
                duration_seconds INTEGER,
                duration_hhmmss TEXT,
                views INTEGER,
                upload_date TEXT,
                channel_url TEXT,
                channel_name TEXT,
                subscribers INTEGER,
                status TEXT NOT NULL,
                error TEXT,
                created_at TEXT NOT NULL
            )",
            self.table_name
        );
        sqlx::query(&query).execute(&self.pool).await?;

        self.initialized = true;
        Ok(())
    }
}

// SQLite integers are signed; larger counts are stored as NULL.
fn as_i64(v: Option<u64>) -> Option<i64> {
    let n = v?;
    match i64::try_from(n) {
        Ok(n) => Some(n),
        Err(_) => {
            log::warn!("Value {} does not fit an SQLite integer, storing NULL", n);
            None
        }
    }
}

#[async_trait]
impl OutputHandler for SqliteOutput {
    async fn write(&mut self, row: &RenderedRow) -> Result<()> {
        self.ensure_table().await?;

        let query = format!(
            "INSERT INTO {} (ordinal, input_url, title, duration_seconds, duration_hhmmss, views, \
             upload_date, channel_url, channel_name, subscribers, status, error, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            self.table_name
        );

        let r = &row.result;
        sqlx::query(&query)
            .bind(row.ordinal as i64)
            .bind(r.input_url.clone())
            .bind(r.title.clone())
            .bind(as_i64(r.duration_seconds))
            .bind(r.duration_text())
            .bind(as_i64(r.views))
            .bind(r.upload_date.clone())
            .bind(r.channel_url.clone())
            .bind(r.channel_name.clone())
            .bind(as_i64(r.subscribers))
            .bind(r.status.as_str())
            .bind(r.error.clone())
            .bind(chrono::Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        // An empty submission still leaves the table behind.
        self.ensure_table().await?;
        self.pool.close().await;
        Ok(())
    }
}
