mod config;
mod errors;
mod llm_client;
mod models;
mod routes;
mod screening;
mod state;
mod storage;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::{Config, S3Config};
use crate::llm_client::{LlmClient, LlmSettings};
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::reports::{FileReportStore, ReportStore, S3ReportStore};
use crate::storage::sessions::{
    InMemorySessionStore, RedisSessionStore, SessionLocks, SessionStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Screening API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(
        config.anthropic_api_key.clone(),
        LlmSettings {
            model: config.llm_model.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
        },
    )?;
    info!("LLM client initialized (model: {})", llm.model());

    // Initialize session store (Redis when configured, otherwise process memory)
    let sessions: Arc<dyn SessionStore> = match &config.redis_url {
        Some(url) => Arc::new(RedisSessionStore::connect(url, config.session_ttl_secs).await?),
        None => {
            info!("Session store: in-memory (ttl {}s)", config.session_ttl_secs);
            Arc::new(InMemorySessionStore::new(Duration::from_secs(
                config.session_ttl_secs,
            )))
        }
    };

    // Initialize report store (S3 when configured, otherwise local JSON files)
    let reports: Arc<dyn ReportStore> = match &config.s3 {
        Some(s3) => {
            info!("Report store: s3://{}", s3.bucket);
            Arc::new(S3ReportStore::new(
                build_s3_client(s3).await,
                s3.bucket.clone(),
            ))
        }
        None => {
            info!("Report store: {}", config.reports_dir.display());
            Arc::new(FileReportStore::new(config.reports_dir.clone()))
        }
    };

    // Build app state
    let state = AppState {
        llm: Arc::new(llm),
        sessions,
        session_locks: Arc::new(SessionLocks::default()),
        reports,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS origins once the candidate UI has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &S3Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.access_key_id,
        &config.secret_access_key,
        None,
        None,
        "screening-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
