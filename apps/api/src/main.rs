mod analysis;
mod config;
mod errors;
mod ingest;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::pipeline::HeuristicAnalyzer;
use crate::analysis::rules::AnalysisRules;
use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ATS Check API v{}", env!("CARGO_PKG_VERSION"));

    // Load and validate analysis rules (built-in defaults unless ATS_RULES_PATH is set)
    let rules = AnalysisRules::load(config.rules_path.as_deref())?;
    rules
        .validate(&config.default_role)
        .context("Analysis rules are invalid")?;
    info!(
        sections = rules.sections.len(),
        profiles = rules.profiles.len(),
        synonym_groups = rules.synonyms.len(),
        custom = config.rules_path.is_some(),
        "Analysis rules loaded"
    );
    let rules = Arc::new(rules);

    let analyzer = Arc::new(HeuristicAnalyzer::new(
        Arc::clone(&rules),
        config.analysis_timeout,
    ));
    info!(
        "Upload limit {} bytes, analysis timeout {}s",
        config.max_upload_bytes,
        config.analysis_timeout.as_secs()
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        rules,
        analyzer,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS origins to the upload page's host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
