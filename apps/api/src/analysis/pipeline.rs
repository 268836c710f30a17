//! Analysis pipeline: extraction, structure, keywords, formatting, achievements,
//! scoring and suggestions, run sequentially for one document.
//!
//! `AppState` holds an `Arc<dyn ResumeAnalyzer>`; handlers never call the
//! stages directly, so tests can swap in a counting analyzer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::analysis::achievements::analyze_achievements;
use crate::analysis::keywords::{keyword_score, match_keywords, KeywordSet};
use crate::analysis::report::{ScoreReport, SubScores};
use crate::analysis::rules::AnalysisRules;
use crate::analysis::scoring::{analyze_formatting, combine_scores, ScoreLabel};
use crate::analysis::structure::analyze_structure;
use crate::analysis::suggestions::{build_suggestions, SuggestionInputs};
use crate::ingest::{self, ExtractedContent, IngestError, UploadedDocument};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("analysis exceeded the {0:?} limit")]
    Timeout(Duration),

    #[error("analysis was cancelled")]
    Cancelled,

    #[error("analysis failed: {0}")]
    Internal(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Turns an uploaded document into a score report.
///
/// Carried in `AppState` as `Arc<dyn ResumeAnalyzer>`.
#[async_trait]
pub trait ResumeAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        document: UploadedDocument,
        keywords: KeywordSet,
    ) -> Result<ScoreReport, AnalysisError>;
}

// ────────────────────────────────────────────────────────────────────────────
// HeuristicAnalyzer: rule-based, deterministic
// ────────────────────────────────────────────────────────────────────────────

pub struct HeuristicAnalyzer {
    rules: Arc<AnalysisRules>,
    timeout: Duration,
}

impl HeuristicAnalyzer {
    pub fn new(rules: Arc<AnalysisRules>, timeout: Duration) -> Self {
        Self { rules, timeout }
    }
}

#[async_trait]
impl ResumeAnalyzer for HeuristicAnalyzer {
    async fn analyze(
        &self,
        document: UploadedDocument,
        keywords: KeywordSet,
    ) -> Result<ScoreReport, AnalysisError> {
        let rules = Arc::clone(&self.rules);
        run_bounded(self.timeout, move |cancel| {
            run_pipeline(document, &keywords, &rules, cancel)
        })
        .await
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Bounded execution
// ────────────────────────────────────────────────────────────────────────────

/// Raises the cancel flag when dropped: on timeout, on completion, or when the
/// request future is dropped because the client went away.
struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// Runs a CPU-bound job on the blocking pool, giving up after `limit`.
///
/// The job receives a flag that turns true once the caller no longer waits
/// for the result; it should check it between steps.
pub async fn run_bounded<T, F>(limit: Duration, job: F) -> Result<T, AnalysisError>
where
    T: Send + 'static,
    F: FnOnce(&AtomicBool) -> Result<T, AnalysisError> + Send + 'static,
{
    let cancel = Arc::new(AtomicBool::new(false));
    let _guard = CancelOnDrop(Arc::clone(&cancel));

    let handle = tokio::task::spawn_blocking(move || job(&cancel));
    match tokio::time::timeout(limit, handle).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(join_error)) => Err(AnalysisError::Internal(format!(
            "analysis task did not complete: {join_error}"
        ))),
        Err(_) => Err(AnalysisError::Timeout(limit)),
    }
}

fn checkpoint(cancel: &AtomicBool) -> Result<(), AnalysisError> {
    if cancel.load(Ordering::Relaxed) {
        return Err(AnalysisError::Cancelled);
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Stages
// ────────────────────────────────────────────────────────────────────────────

/// Extracts the document and analyses its content. The document's bytes are
/// dropped as soon as extraction returns.
pub fn run_pipeline(
    document: UploadedDocument,
    keywords: &KeywordSet,
    rules: &AnalysisRules,
    cancel: &AtomicBool,
) -> Result<ScoreReport, AnalysisError> {
    checkpoint(cancel)?;
    let content = ingest::extract(document)?;
    analyze_content(&content, keywords, rules, cancel)
}

pub fn analyze_content(
    content: &ExtractedContent,
    keywords: &KeywordSet,
    rules: &AnalysisRules,
    cancel: &AtomicBool,
) -> Result<ScoreReport, AnalysisError> {
    checkpoint(cancel)?;
    let sections = analyze_structure(content, &rules.sections);
    debug!(found = sections.found.len(), score = sections.score, "Structure analyzed");

    checkpoint(cancel)?;
    let keyword_results = match_keywords(&content.text, keywords, &rules.synonyms);
    let keywords_score = keyword_score(&keyword_results);
    debug!(total = keyword_results.len(), score = keywords_score, "Keywords matched");

    checkpoint(cancel)?;
    let formatting = analyze_formatting(content, &rules.penalties);
    let achievements = analyze_achievements(&content.text);
    debug!(
        score = formatting.score,
        action_statements = achievements.action_statements,
        "Formatting and achievements analyzed"
    );

    checkpoint(cancel)?;
    let sub_scores = SubScores {
        formatting: formatting.score,
        keywords: keywords_score,
        structure: sections.score,
    };
    let overall_score = combine_scores(
        sub_scores.formatting,
        sub_scores.keywords,
        sub_scores.structure,
        &rules.scoring,
    );
    let suggestions = build_suggestions(&SuggestionInputs {
        structure: &sections,
        formatting: &formatting,
        keywords: &keyword_results,
        keyword_score: keywords_score,
        achievements: &achievements,
        min_words: rules.penalties.min_words,
    });

    Ok(ScoreReport {
        overall_score,
        label: ScoreLabel::from_score(overall_score),
        sub_scores,
        keywords: keyword_results,
        suggestions,
        sections,
        formatting,
        achievements,
        page_count: content.page_count,
    })
}
