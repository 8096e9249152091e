//! AuditLens API Server
//!
//! Backend for AI-assisted accessibility audits of UI screenshots.
//! Provides REST endpoints for:
//!
//! - Dev-style email login and session issuance
//! - Project management (list/create/get/delete)
//! - Screenshot upload and static serving
//! - Running an accessibility audit through a multimodal model

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

mod auth;
mod error;
mod handlers;
mod model_client;
mod models;
mod prompts;
mod state;
#[cfg(test)]
mod tests;

use model_client::AnthropicClient;
use state::AppState;

/// Command-line arguments for the AuditLens server
#[derive(Parser, Debug)]
#[command(name = "auditlens-api")]
#[command(about = "AuditLens API server for AI accessibility audits")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3001")]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// SQLite database URL; the DATABASE_URL env var takes precedence
    #[arg(long, default_value = "sqlite:auditlens.db?mode=rwc")]
    database_url: String,

    /// Directory uploaded screenshots are stored in
    #[arg(long, default_value = "uploads")]
    uploads_dir: PathBuf,

    /// Model used for audits
    #[arg(long, default_value = "claude-sonnet-4-5-20250929")]
    model: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Build the application router over a shared state.
fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Auth
        .route("/api/auth/login", post(auth::login))
        // Projects
        .route(
            "/api/projects",
            get(handlers::list_projects).post(handlers::create_project),
        )
        .route(
            "/api/projects/:id",
            get(handlers::get_project).delete(handlers::delete_project),
        )
        // Audits
        .route("/api/audits/:id", get(handlers::get_audit))
        .route(
            "/api/audit/accessibility",
            post(handlers::run_accessibility_audit),
        )
        // Upload and static serving of stored screenshots
        .route("/api/upload", post(handlers::upload_screenshot))
        .nest_service("/uploads", ServeDir::new(&state.uploads_dir))
        // Uploads are checked against a 10MB cap after extraction; the body
        // limit just needs headroom for the multipart framing
        .layer(DefaultBodyLimit::max(12 * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(format!(
                    "auditlens_api={default_level},tower_http={default_level}"
                ))
            }),
        )
        .init();

    let api_key = std::env::var("ANTHROPIC_API_KEY").unwrap_or_else(|_| {
        tracing::warn!("ANTHROPIC_API_KEY is not set; audit runs will fail");
        String::new()
    });
    let model = Arc::new(AnthropicClient::new(api_key, args.model.clone()));

    info!("Initializing AuditLens API...");
    let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| args.database_url.clone());
    let state = AppState::new(&database_url, args.uploads_dir.clone(), model).await?;
    let state = Arc::new(state);

    let app = app(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    info!("Starting AuditLens API on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
