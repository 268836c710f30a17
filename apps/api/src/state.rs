use std::sync::Arc;

use crate::analysis::pipeline::ResumeAnalyzer;
use crate::analysis::rules::AnalysisRules;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
/// Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Section table, weights, synonyms and keyword profiles.
    pub rules: Arc<AnalysisRules>,
    /// Pluggable analyzer. Default: HeuristicAnalyzer.
    pub analyzer: Arc<dyn ResumeAnalyzer>,
}
