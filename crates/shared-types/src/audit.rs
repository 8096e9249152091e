//! Persisted audit and project records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::AuditResult;

/// Lifecycle status of a persisted audit.
///
/// Progression is monotonic: `Pending -> Processing -> {Complete | Error}`.
/// A terminal audit is never revisited or retried in place; re-running means
/// a new audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditStatus {
    Pending,
    Processing,
    Complete,
    Error,
}

impl AuditStatus {
    /// Whether `next` is a legal forward transition from `self`.
    pub fn can_transition_to(self, next: AuditStatus) -> bool {
        use AuditStatus::*;
        matches!(
            (self, next),
            (Pending, Processing) | (Processing, Complete) | (Processing, Error)
        )
    }
}

impl std::fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditStatus::Pending => write!(f, "pending"),
            AuditStatus::Processing => write!(f, "processing"),
            AuditStatus::Complete => write!(f, "complete"),
            AuditStatus::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for AuditStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AuditStatus::Pending),
            "processing" => Ok(AuditStatus::Processing),
            "complete" => Ok(AuditStatus::Complete),
            "error" => Ok(AuditStatus::Error),
            other => Err(format!("unknown audit status: {}", other)),
        }
    }
}

/// Kind of audit. Accessibility is the only variant today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditType {
    Accessibility,
}

impl std::fmt::Display for AuditType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditType::Accessibility => write!(f, "accessibility"),
        }
    }
}

/// One persisted run of the analysis workflow against a set of images.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Audit {
    pub id: String,
    pub project_id: String,
    pub audit_type: AuditType,
    pub status: AuditStatus,
    /// Ordered image URLs the audit was run against.
    pub input_images: Vec<String>,
    /// Unset until the audit completes.
    pub score: Option<i64>,
    /// Unset until the audit completes.
    pub result: Option<AuditResult>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user-owned project grouping audits. Deleting a project cascades to
/// its audits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
