//! Suggestion rules. Evaluated in a fixed order; the presenter sorts by priority.

use serde::Serialize;

use crate::analysis::achievements::AchievementStats;
use crate::analysis::keywords::{missing_keywords, KeywordResult};
use crate::analysis::scoring::{FormattingFindings, FormattingIssue};
use crate::analysis::structure::{SectionKind, SectionFindings};

/// Missing keywords named in one suggestion.
const MAX_NAMED_KEYWORDS: usize = 5;
const LOW_KEYWORD_SCORE: u8 = 70;
const MIN_QUANTIFIED_PERCENT: usize = 30;
const MIN_VAGUE_STATEMENTS: usize = 2;

/// Declared from most to least urgent so the derived `Ord` sorts high first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionCategory {
    Formatting,
    Keywords,
    Content,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub category: SuggestionCategory,
}

impl Suggestion {
    fn new(
        title: &str,
        description: String,
        priority: Priority,
        category: SuggestionCategory,
    ) -> Self {
        Self {
            title: title.to_string(),
            description,
            priority,
            category,
        }
    }
}

/// Everything the rule table looks at.
pub struct SuggestionInputs<'a> {
    pub structure: &'a SectionFindings,
    pub formatting: &'a FormattingFindings,
    pub keywords: &'a [KeywordResult],
    pub keyword_score: u8,
    pub achievements: &'a AchievementStats,
    pub min_words: usize,
}

/// "'a', 'b' and 'c'"
fn join_quoted<S: AsRef<str>>(items: &[S]) -> String {
    let quoted: Vec<String> = items.iter().map(|i| format!("'{}'", i.as_ref())).collect();
    match quoted.split_last() {
        None => String::new(),
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} and {last}", rest.join(", ")),
    }
}

fn join_plain(items: &[&str]) -> String {
    match items.split_last() {
        None => String::new(),
        Some((last, [])) => last.to_string(),
        Some((last, rest)) => format!("{} and {last}", rest.join(", ")),
    }
}

pub fn build_suggestions(inputs: &SuggestionInputs<'_>) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();
    let SuggestionInputs {
        structure,
        formatting,
        keywords,
        keyword_score,
        achievements,
        min_words,
    } = inputs;

    if !formatting.has_email {
        suggestions.push(Suggestion::new(
            "Add Contact Information",
            "No email address was found. Put your email and phone number in plain text at the top of the page, outside any header or footer.".to_string(),
            Priority::High,
            SuggestionCategory::Formatting,
        ));
    }

    if !structure.missing.is_empty() {
        let headers: Vec<&str> = structure
            .missing
            .iter()
            .map(SectionKind::display_name)
            .collect();
        let priority = if structure.found.is_empty()
            || structure.missing.contains(&SectionKind::Experience)
        {
            Priority::High
        } else {
            Priority::Medium
        };
        suggestions.push(Suggestion::new(
            "Improve Formatting",
            format!(
                "Use clear section headers so ATS systems can parse your resume. Add {} headers.",
                join_quoted(&headers)
            ),
            priority,
            SuggestionCategory::Formatting,
        ));
    }

    let missing = missing_keywords(keywords);
    if !missing.is_empty() {
        let named = &missing[..missing.len().min(MAX_NAMED_KEYWORDS)];
        let more = missing.len() - named.len();
        let tail = if more > 0 {
            format!(" ({more} more not shown)")
        } else {
            String::new()
        };
        suggestions.push(Suggestion::new(
            "Add Missing Keywords",
            format!(
                "Include relevant keywords like {}{tail} to improve ATS compatibility.",
                join_quoted(named)
            ),
            if *keyword_score < LOW_KEYWORD_SCORE {
                Priority::High
            } else {
                Priority::Medium
            },
            SuggestionCategory::Keywords,
        ));
    }

    if achievements.quantified_statements == 0 {
        suggestions.push(Suggestion::new(
            "Quantify Achievements",
            "Add numbers and metrics to demonstrate your impact (e.g., 'Increased sales by 25%').".to_string(),
            Priority::High,
            SuggestionCategory::Content,
        ));
    } else if achievements.quantified_percent() < MIN_QUANTIFIED_PERCENT {
        suggestions.push(Suggestion::new(
            "Quantify Achievements",
            format!(
                "Only {} of {} achievement statements include a metric. Add numbers and metrics to demonstrate your impact (e.g., 'Increased sales by 25%').",
                achievements.quantified_statements, achievements.action_statements
            ),
            Priority::Medium,
            SuggestionCategory::Content,
        ));
    }

    if achievements.vague_statements >= MIN_VAGUE_STATEMENTS {
        suggestions.push(Suggestion::new(
            "Use Stronger Action Verbs",
            format!(
                "{} statements rely on vague verbs such as 'helped' or 'worked on'. Lead with what you did and what changed.",
                achievements.vague_statements
            ),
            Priority::Low,
            SuggestionCategory::Content,
        ));
    }

    if structure.has_non_text_elements() {
        let graphics: Vec<&str> = structure
            .non_text_elements
            .iter()
            .map(|e| e.plural_label())
            .collect();
        suggestions.push(Suggestion::new(
            "Remove Graphics",
            format!(
                "Your resume contains {} that ATS systems may not parse correctly. Use plain text instead.",
                join_plain(&graphics)
            ),
            Priority::Low,
            SuggestionCategory::Formatting,
        ));
    }

    if structure.multi_column {
        suggestions.push(Suggestion::new(
            "Use a Single-Column Layout",
            "Multi-column layouts are often read across columns, scrambling your content. Move to a single column.".to_string(),
            Priority::Medium,
            SuggestionCategory::Formatting,
        ));
    }

    if formatting.has_issue(FormattingIssue::ShortContent) {
        suggestions.push(Suggestion::new(
            "Expand Your Content",
            format!(
                "Your resume has {} words. Aim for at least {min_words}, describing your responsibilities and results in more detail.",
                formatting.word_count
            ),
            Priority::Medium,
            SuggestionCategory::Content,
        ));
    }

    suggestions
}
