// Resume Analysis
// Implements: structure analysis, keyword matching, formatting and overall scoring,
// achievement detection, suggestion rules and result presentation.
// The pipeline is CPU-bound and runs on the blocking pool; see `pipeline`.

pub mod achievements;
pub mod handlers;
pub mod keywords;
pub mod pipeline;
pub mod presenter;
pub mod profiles;
pub mod report;
pub mod rules;
pub mod scoring;
pub mod structure;
pub mod suggestions;
