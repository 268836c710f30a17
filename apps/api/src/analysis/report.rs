use serde::Serialize;

use crate::analysis::achievements::AchievementStats;
use crate::analysis::keywords::KeywordResult;
use crate::analysis::scoring::{FormattingFindings, ScoreLabel};
use crate::analysis::structure::SectionFindings;
use crate::analysis::suggestions::Suggestion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubScores {
    pub formatting: u8,
    pub keywords: u8,
    pub structure: u8,
}

/// Result of analysing one document. Depends only on the document and the
/// keyword set, so two runs over the same input compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreReport {
    pub overall_score: u8,
    pub label: ScoreLabel,
    pub sub_scores: SubScores,
    pub keywords: Vec<KeywordResult>,
    /// Rule-table order.
    pub suggestions: Vec<Suggestion>,
    pub sections: SectionFindings,
    pub formatting: FormattingFindings,
    pub achievements: AchievementStats,
    pub page_count: Option<u32>,
}
