//! HTTP handlers for the AuditLens API

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::Utc;
use uuid::Uuid;

use audit_engine::parse_result;
use shared_types::wire::{
    CreateProjectRequest, ProjectDetail, ProjectSummary, RunAuditRequest, RunAuditResponse,
    UploadResponse,
};
use shared_types::{Audit, AuditResult, AuditStatus, AuditType, Project};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::model_client::{media_type, ImageInput};
use crate::prompts::{ACCESSIBILITY_SYSTEM_PROMPT, ACCESSIBILITY_USER_PROMPT};
use crate::state::AppState;

const ALLOWED_UPLOAD_TYPES: [&str; 3] = ["image/png", "image/jpeg", "image/webp"];
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// List the caller's projects, newest-updated first, with audit counts.
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Vec<ProjectSummary>>, ApiError> {
    let rows: Vec<(String, String, String, Option<String>, chrono::DateTime<Utc>, chrono::DateTime<Utc>, i64)> =
        sqlx::query_as(
            r#"
            SELECT p.id, p.user_id, p.name, p.description, p.created_at, p.updated_at,
                   COUNT(a.id) AS audit_count
            FROM projects p
            LEFT JOIN audits a ON a.project_id = p.id
            WHERE p.user_id = ?
            GROUP BY p.id
            ORDER BY p.updated_at DESC
            "#,
        )
        .bind(&user.id)
        .fetch_all(&state.db)
        .await?;

    let projects = rows
        .into_iter()
        .map(
            |(id, user_id, name, description, created_at, updated_at, audit_count)| {
                ProjectSummary {
                    project: Project {
                        id,
                        user_id,
                        name,
                        description,
                        created_at,
                        updated_at,
                    },
                    audit_count,
                }
            },
        )
        .collect();

    Ok(Json(projects))
}

/// Create a project owned by the caller.
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<CreateProjectRequest>,
) -> Result<Json<Project>, ApiError> {
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::InvalidInput("Project name is required".into()));
    }

    let now = Utc::now();
    let project = Project {
        id: Uuid::new_v4().to_string(),
        user_id: user.id,
        name,
        description: req.description,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO projects (id, user_id, name, description, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&project.id)
    .bind(&project.user_id)
    .bind(&project.name)
    .bind(&project.description)
    .bind(now.to_rfc3339())
    .bind(now.to_rfc3339())
    .execute(&state.db)
    .await?;

    tracing::info!("Created project {}", project.id);
    Ok(Json(project))
}

/// Get one owned project with its audits, newest first.
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ProjectDetail>, ApiError> {
    let project = find_owned_project(&state, &user.id, &id).await?;

    let rows: Vec<crate::models::DbAudit> = sqlx::query_as(
        r#"
        SELECT id, project_id, audit_type, status, input_images_json, score, result_json,
               created_at, updated_at
        FROM audits
        WHERE project_id = ?
        ORDER BY created_at DESC
        "#,
    )
    .bind(&project.id)
    .fetch_all(&state.db)
    .await?;

    let audits = rows
        .into_iter()
        .map(|row| row.into_audit())
        .collect::<Result<Vec<Audit>, _>>()?;

    Ok(Json(ProjectDetail { project, audits }))
}

/// Delete an owned project and, by cascade, its audits. Deleting a project
/// that is absent or not owned is silently a no-op, matching the generic
/// not-found posture elsewhere.
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    sqlx::query(
        r#"
        DELETE FROM audits
        WHERE project_id IN (SELECT id FROM projects WHERE id = ? AND user_id = ?)
        "#,
    )
    .bind(&id)
    .bind(&user.id)
    .execute(&state.db)
    .await?;

    sqlx::query("DELETE FROM projects WHERE id = ? AND user_id = ?")
        .bind(&id)
        .bind(&user.id)
        .execute(&state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Get one audit, owned via its project.
pub async fn get_audit(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Audit>, ApiError> {
    let row: Option<crate::models::DbAudit> = sqlx::query_as(
        r#"
        SELECT a.id, a.project_id, a.audit_type, a.status, a.input_images_json, a.score,
               a.result_json, a.created_at, a.updated_at
        FROM audits a
        JOIN projects p ON p.id = a.project_id
        WHERE a.id = ? AND p.user_id = ?
        "#,
    )
    .bind(&id)
    .bind(&user.id)
    .fetch_optional(&state.db)
    .await?;

    let row = row.ok_or(ApiError::NotFound)?;
    Ok(Json(row.into_audit()?))
}

async fn find_owned_project(
    state: &AppState,
    user_id: &str,
    project_id: &str,
) -> Result<Project, ApiError> {
    let row: Option<crate::models::DbProject> = sqlx::query_as(
        r#"
        SELECT id, user_id, name, description, created_at, updated_at
        FROM projects
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(project_id)
    .bind(user_id)
    .fetch_optional(&state.db)
    .await?;

    // Absent and not-owned collapse into the same answer
    row.map(Project::from).ok_or(ApiError::NotFound)
}

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

/// Store one screenshot and return its retrievable URL.
pub async fn upload_screenshot(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidInput(format!("Invalid upload: {}", e)))?
        .ok_or_else(|| ApiError::InvalidInput("No file provided".into()))?;

    let content_type = field.content_type().unwrap_or_default().to_string();
    if !ALLOWED_UPLOAD_TYPES.contains(&content_type.as_str()) {
        return Err(ApiError::InvalidInput(
            "Invalid file type. Allowed: PNG, JPG, WebP".into(),
        ));
    }

    let original_name = field.file_name().unwrap_or("screenshot").to_string();
    let data = field
        .bytes()
        .await
        .map_err(|e| ApiError::InvalidInput(format!("Invalid upload: {}", e)))?;

    if data.len() > MAX_UPLOAD_BYTES {
        return Err(ApiError::InvalidInput("File too large. Max 10MB.".into()));
    }

    let filename = format!(
        "{}-{}",
        Utc::now().timestamp_millis(),
        sanitize_filename(&original_name)
    );
    let path = state.uploads_dir.join(&filename);
    tokio::fs::write(&path, &data)
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;

    tracing::info!("Stored upload {} ({} bytes)", filename, data.len());
    Ok(Json(UploadResponse {
        url: format!("/uploads/{}", filename),
    }))
}

/// Keep uploaded names path-safe: alphanumerics, dot, dash, underscore.
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches('_').is_empty() {
        "screenshot".to_string()
    } else {
        cleaned
    }
}

// ---------------------------------------------------------------------------
// Audit orchestration
// ---------------------------------------------------------------------------

/// Run an accessibility audit: create a `processing` record, call the model,
/// parse its response, and finish the record as `complete` or `error`.
///
/// No retries: a failed audit is terminal and a re-run is a new record.
pub async fn run_accessibility_audit(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<RunAuditRequest>,
) -> Result<Json<RunAuditResponse>, ApiError> {
    if req.project_id.is_empty() || req.image_urls.is_empty() {
        return Err(ApiError::InvalidInput(
            "projectId and imageUrls are required".into(),
        ));
    }

    let project = find_owned_project(&state, &user.id, &req.project_id).await?;

    // The record exists before the model call, so a crash mid-call still
    // leaves an inspectable audit rather than a silently lost request.
    let audit_id = Uuid::new_v4().to_string();
    let now = Utc::now();
    let input_images_json = serde_json::to_string(&req.image_urls)
        .map_err(|e| ApiError::Internal(e.into()))?;

    sqlx::query(
        r#"
        INSERT INTO audits (id, project_id, audit_type, status, input_images_json,
                            created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&audit_id)
    .bind(&project.id)
    .bind(AuditType::Accessibility.to_string())
    .bind(AuditStatus::Processing.to_string())
    .bind(&input_images_json)
    .bind(now.to_rfc3339())
    .bind(now.to_rfc3339())
    .execute(&state.db)
    .await?;

    match execute_audit(&state, &req.image_urls).await {
        Ok(result) => {
            let result_json = serde_json::to_string(&result)
                .map_err(|e| ApiError::Internal(e.into()))?;
            sqlx::query(
                r#"
                UPDATE audits
                SET status = ?, score = ?, result_json = ?, updated_at = ?
                WHERE id = ?
                "#,
            )
            .bind(AuditStatus::Complete.to_string())
            .bind(result.score)
            .bind(&result_json)
            .bind(Utc::now().to_rfc3339())
            .bind(&audit_id)
            .execute(&state.db)
            .await?;

            tracing::info!("Audit {} complete, score {}", audit_id, result.score);
            Ok(Json(RunAuditResponse { audit_id, result }))
        }
        Err(e) => {
            // Score and result stay unset; the raw failure is logged, the
            // client only sees the generic message.
            tracing::error!("Audit {} failed: {:#}", audit_id, e);
            sqlx::query("UPDATE audits SET status = ?, updated_at = ? WHERE id = ?")
                .bind(AuditStatus::Error.to_string())
                .bind(Utc::now().to_rfc3339())
                .bind(&audit_id)
                .execute(&state.db)
                .await?;
            Err(ApiError::AuditFailed)
        }
    }
}

/// The fallible middle of the workflow: resolve images, call the model,
/// parse the response.
async fn execute_audit(
    state: &AppState,
    image_urls: &[String],
) -> anyhow::Result<AuditResult> {
    let mut images = Vec::with_capacity(image_urls.len());
    for url in image_urls {
        images.push(resolve_image(state, url).await?);
    }

    let text = state
        .model
        .analyze(
            &images,
            ACCESSIBILITY_SYSTEM_PROMPT,
            ACCESSIBILITY_USER_PROMPT,
        )
        .await?;

    Ok(parse_result(&text)?)
}

/// Local references are read from the upload store and embedded; remote
/// references pass by URL.
async fn resolve_image(state: &AppState, url: &str) -> anyhow::Result<ImageInput> {
    if let Some(name) = url.strip_prefix("/uploads/") {
        if name.is_empty() || name.contains('/') || name.contains("..") {
            anyhow::bail!("invalid upload reference: {}", url);
        }
        let path = state.uploads_dir.join(name);
        let bytes = tokio::fs::read(&path).await?;
        return Ok(ImageInput::Base64 {
            media_type: media_type(url).to_string(),
            data: BASE64.encode(bytes),
        });
    }
    if url.starts_with('/') {
        anyhow::bail!("unknown local reference: {}", url);
    }
    Ok(ImageInput::Url(url.to_string()))
}
