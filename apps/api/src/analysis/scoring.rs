use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ingest::{ExtractedContent, NonTextElement};

const EMAIL_PATTERN: &str = r"[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}";

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("valid email regex"))
}

// ────────────────────────────────────────────────────────────────────────────
// Overall score
// ────────────────────────────────────────────────────────────────────────────

/// Integer weights for the three sub-scores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub formatting: u32,
    pub keywords: u32,
    pub structure: u32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            formatting: 30,
            keywords: 40,
            structure: 30,
        }
    }
}

impl ScoringWeights {
    pub fn total(&self) -> u32 {
        self.formatting + self.keywords + self.structure
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.total() == 0 {
            anyhow::bail!("Scoring weights must sum to more than zero");
        }
        Ok(())
    }
}

/// Weighted mean of the sub-scores, rounded half up: (30·F + 40·K + 30·S) / 100 by default.
pub fn combine_scores(formatting: u8, keywords: u8, structure: u8, weights: &ScoringWeights) -> u8 {
    let total = weights.total();
    if total == 0 {
        return 0;
    }
    let weighted = weights.formatting * formatting as u32
        + weights.keywords * keywords as u32
        + weights.structure * structure as u32;
    ((weighted * 2 + total) / (total * 2)).min(100) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScoreLabel {
    Excellent,
    Good,
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
}

impl ScoreLabel {
    pub fn from_score(score: u8) -> Self {
        if score >= 80 {
            ScoreLabel::Excellent
        } else if score >= 60 {
            ScoreLabel::Good
        } else {
            ScoreLabel::NeedsImprovement
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreLabel::Excellent => "Excellent",
            ScoreLabel::Good => "Good",
            ScoreLabel::NeedsImprovement => "Needs Improvement",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Formatting sub-score
// ────────────────────────────────────────────────────────────────────────────

/// Points deducted from 100 per formatting problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormattingPenalties {
    pub tables: u8,
    pub images: u8,
    pub text_boxes: u8,
    pub multi_column: u8,
    pub missing_email: u8,
    pub short_content: u8,
    /// Documents with fewer words than this take the `short_content` penalty.
    pub min_words: usize,
}

impl Default for FormattingPenalties {
    fn default() -> Self {
        Self {
            tables: 15,
            images: 15,
            text_boxes: 10,
            multi_column: 10,
            missing_email: 10,
            short_content: 10,
            min_words: 150,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormattingIssue {
    Tables,
    Images,
    TextBoxes,
    MultiColumn,
    MissingEmail,
    ShortContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattingFindings {
    pub score: u8,
    pub has_email: bool,
    pub word_count: usize,
    pub issues: Vec<FormattingIssue>,
}

impl FormattingFindings {
    pub fn has_issue(&self, issue: FormattingIssue) -> bool {
        self.issues.contains(&issue)
    }
}

pub fn has_email(text: &str) -> bool {
    email_regex().is_match(text)
}

/// Formatting sub-score: 100 minus the penalty of every issue found, floored at 0.
pub fn analyze_formatting(
    content: &ExtractedContent,
    penalties: &FormattingPenalties,
) -> FormattingFindings {
    let mut issues = Vec::new();
    for element in &content.non_text_elements {
        issues.push(match element {
            NonTextElement::Table => FormattingIssue::Tables,
            NonTextElement::Image => FormattingIssue::Images,
            NonTextElement::TextBox => FormattingIssue::TextBoxes,
        });
    }
    if content.multi_column {
        issues.push(FormattingIssue::MultiColumn);
    }
    let has_email = has_email(&content.text);
    if !has_email {
        issues.push(FormattingIssue::MissingEmail);
    }
    if content.word_count < penalties.min_words {
        issues.push(FormattingIssue::ShortContent);
    }

    let deducted: u32 = issues
        .iter()
        .map(|issue| {
            u32::from(match issue {
                FormattingIssue::Tables => penalties.tables,
                FormattingIssue::Images => penalties.images,
                FormattingIssue::TextBoxes => penalties.text_boxes,
                FormattingIssue::MultiColumn => penalties.multi_column,
                FormattingIssue::MissingEmail => penalties.missing_email,
                FormattingIssue::ShortContent => penalties.short_content,
            })
        })
        .sum();

    FormattingFindings {
        score: 100u32.saturating_sub(deducted) as u8,
        has_email,
        word_count: content.word_count,
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn content(text: &str, words: usize) -> ExtractedContent {
        ExtractedContent {
            text: text.to_string(),
            section_labels: vec![],
            non_text_elements: BTreeSet::new(),
            multi_column: false,
            page_count: Some(1),
            word_count: words,
        }
    }

    #[test]
    fn test_combined_score_default_weights() {
        let w = ScoringWeights::default();
        assert_eq!(combine_scores(100, 100, 100, &w), 100);
        assert_eq!(combine_scores(0, 0, 0, &w), 0);
        // 0.3*80 + 0.4*50 + 0.3*70 = 24 + 20 + 21 = 65
        assert_eq!(combine_scores(80, 50, 70, &w), 65);
    }

    #[test]
    fn test_combined_score_rounds_half_up() {
        let w = ScoringWeights {
            formatting: 1,
            keywords: 1,
            structure: 0,
        };
        assert_eq!(combine_scores(50, 51, 0, &w), 51);
        assert_eq!(combine_scores(50, 50, 99, &w), 50);
    }

    #[test]
    fn test_combined_score_is_monotonic() {
        let w = ScoringWeights::default();
        for base in [0u8, 37, 64, 99] {
            for bump in 0..=(100 - base) {
                let raised = base + bump;
                let reference = combine_scores(base, base, base, &w);
                assert!(combine_scores(raised, base, base, &w) >= reference);
                assert!(combine_scores(base, raised, base, &w) >= reference);
                assert!(combine_scores(base, base, raised, &w) >= reference);
            }
        }
    }

    #[test]
    fn test_label_boundaries() {
        assert_eq!(ScoreLabel::from_score(100), ScoreLabel::Excellent);
        assert_eq!(ScoreLabel::from_score(80), ScoreLabel::Excellent);
        assert_eq!(ScoreLabel::from_score(79), ScoreLabel::Good);
        assert_eq!(ScoreLabel::from_score(60), ScoreLabel::Good);
        assert_eq!(ScoreLabel::from_score(59), ScoreLabel::NeedsImprovement);
        assert_eq!(ScoreLabel::NeedsImprovement.as_str(), "Needs Improvement");
    }

    #[test]
    fn test_clean_document_scores_100() {
        let findings = analyze_formatting(
            &content("Reach me at jane.doe@example.co.uk", 400),
            &FormattingPenalties::default(),
        );
        assert_eq!(findings.score, 100);
        assert!(findings.issues.is_empty());
        assert!(findings.has_email);
    }

    #[test]
    fn test_every_penalty_applies() {
        let mut c = content("no contact details", 20);
        c.non_text_elements = [NonTextElement::Table, NonTextElement::Image, NonTextElement::TextBox]
            .into_iter()
            .collect();
        c.multi_column = true;
        let findings = analyze_formatting(&c, &FormattingPenalties::default());
        // 15 + 15 + 10 + 10 + 10 + 10
        assert_eq!(findings.score, 30);
        assert_eq!(
            findings.issues,
            vec![
                FormattingIssue::Tables,
                FormattingIssue::Images,
                FormattingIssue::TextBoxes,
                FormattingIssue::MultiColumn,
                FormattingIssue::MissingEmail,
                FormattingIssue::ShortContent,
            ]
        );
    }

    #[test]
    fn test_score_floors_at_zero() {
        let penalties = FormattingPenalties {
            missing_email: 80,
            short_content: 80,
            ..FormattingPenalties::default()
        };
        assert_eq!(analyze_formatting(&content("", 0), &penalties).score, 0);
    }

    #[test]
    fn test_email_detection() {
        assert!(has_email("jordan.rivera+cv@mail.example.com"));
        assert!(!has_email("jordan at example dot com"));
        assert!(!has_email("@handle"));
    }
}
