//! Request and response bodies shared by the API server and the web client

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::audit::{Audit, Project};
use crate::types::AuditResult;

/// Request to run an accessibility audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunAuditRequest {
    pub project_id: String,
    pub image_urls: Vec<String>,
}

/// Response from a completed audit run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunAuditResponse {
    pub audit_id: String,
    pub result: AuditResult,
}

/// Response from a successful upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}

/// Request to create a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A project as listed on the dashboard, with its audit count.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    #[serde(flatten)]
    pub project: Project,
    pub audit_count: i64,
}

/// A project with its audits, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub audits: Vec<Audit>,
}

/// Dev-style sign-in request. Creates the user on first login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

/// Session issued by a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user_id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}
