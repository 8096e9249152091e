//! Database row types for the AuditLens API

use anyhow::Context;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use shared_types::{Audit, AuditResult, AuditStatus, AuditType, Project};

/// Project row as stored in SQLite.
#[derive(Debug, Clone, FromRow)]
pub struct DbProject {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbProject> for Project {
    fn from(row: DbProject) -> Self {
        Project {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Audit row as stored in SQLite. Image lists and results are JSON columns,
/// decoded on the way out.
#[derive(Debug, Clone, FromRow)]
pub struct DbAudit {
    pub id: String,
    pub project_id: String,
    pub audit_type: String,
    pub status: String,
    pub input_images_json: String,
    pub score: Option<i64>,
    pub result_json: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbAudit {
    pub fn into_audit(self) -> anyhow::Result<Audit> {
        let status: AuditStatus = self
            .status
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))
            .context("decoding audit status")?;

        let audit_type = match self.audit_type.as_str() {
            "accessibility" => AuditType::Accessibility,
            other => anyhow::bail!("unknown audit type: {}", other),
        };

        let input_images: Vec<String> = serde_json::from_str(&self.input_images_json)
            .context("decoding audit input images")?;

        let result: Option<AuditResult> = match &self.result_json {
            Some(json) => Some(serde_json::from_str(json).context("decoding audit result")?),
            None => None,
        };

        Ok(Audit {
            id: self.id,
            project_id: self.project_id,
            audit_type,
            status,
            input_images,
            score: self.score,
            result,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// User row, as resolved by the session check.
#[derive(Debug, Clone, FromRow)]
pub struct DbUser {
    pub id: String,
    pub email: String,
    pub name: String,
}
