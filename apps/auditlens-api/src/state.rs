//! Application state for the AuditLens API

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::model_client::ModelClient;

pub struct AppState {
    pub db: SqlitePool,
    /// Directory uploaded screenshots are written to and served from.
    pub uploads_dir: PathBuf,
    pub model: Arc<dyn ModelClient>,
}

impl AppState {
    pub async fn new(
        database_url: &str,
        uploads_dir: PathBuf,
        model: Arc<dyn ModelClient>,
    ) -> Result<Self> {
        tokio::fs::create_dir_all(&uploads_dir).await?;

        tracing::info!("Connecting to database: {}", database_url);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        Self::run_migrations(&pool).await?;

        Ok(Self {
            db: pool,
            uploads_dir,
            model,
        })
    }

    async fn run_migrations(pool: &SqlitePool) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                token TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS projects (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                description TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS audits (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL,
                audit_type TEXT NOT NULL,
                status TEXT NOT NULL,
                input_images_json TEXT NOT NULL,
                score INTEGER,
                result_json TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_projects_user ON projects(user_id)
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_audits_project ON audits(project_id)
            "#,
        )
        .execute(pool)
        .await?;

        tracing::info!("Migrations complete");
        Ok(())
    }
}
