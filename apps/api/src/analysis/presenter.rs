//! Result Presenter: wraps a report in the response envelope.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::analysis::keywords::KeywordSource;
use crate::analysis::report::ScoreReport;
use crate::ingest::DocumentFormat;

/// Per-request metadata that must stay out of `ScoreReport`.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub request_id: Uuid,
    pub file_name: String,
    pub size_bytes: usize,
    pub format: DocumentFormat,
    pub keyword_source: KeywordSource,
    pub analyzed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    pub request_id: Uuid,
    pub file_name: String,
    pub size_bytes: usize,
    pub format: DocumentFormat,
    pub keyword_source: KeywordSource,
    pub analyzed_at: DateTime<Utc>,
    /// Label text for the overall score.
    pub label_text: &'static str,
    pub report: ScoreReport,
}

/// Orders suggestions high → medium → low, keeping rule order within a priority.
pub fn present(mut report: ScoreReport, envelope: Envelope) -> AnalysisResponse {
    report.suggestions.sort_by_key(|s| s.priority);
    AnalysisResponse {
        request_id: envelope.request_id,
        file_name: envelope.file_name,
        size_bytes: envelope.size_bytes,
        format: envelope.format,
        keyword_source: envelope.keyword_source,
        analyzed_at: envelope.analyzed_at,
        label_text: report.label.as_str(),
        report,
    }
}
