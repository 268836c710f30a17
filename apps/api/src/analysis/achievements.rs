//! Achievement Detector: counts action statements and how many carry a measurable outcome.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

const BULLETS: &[char] = &['•', '-', '*', '▪', '–', '·', '◦', '>'];

const ACTION_VERBS: &[&str] = &[
    "achieved", "administered", "analyzed", "architected", "automated", "built", "coached",
    "coordinated", "created", "cut", "decreased", "delivered", "designed", "developed",
    "directed", "drove", "established", "executed", "expanded", "generated", "grew",
    "headed", "implemented", "improved", "increased", "introduced", "launched", "led",
    "managed", "mentored", "migrated", "negotiated", "optimized", "organized", "oversaw",
    "owned", "planned", "produced", "ran", "redesigned", "reduced", "resolved", "saved",
    "scaled", "shipped", "spearheaded", "streamlined", "supervised", "trained", "transformed",
    "enhanced", "helped", "assisted", "supported", "participated", "worked",
];

const VAGUE_VERBS: &[&str] = &[
    "improved",
    "enhanced",
    "helped",
    "worked on",
    "assisted",
    "supported",
    "participated",
    "involved",
];

fn number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+(?:[.,]\d+)*").expect("valid number regex"))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AchievementStats {
    pub action_statements: usize,
    /// Action statements that carry a number, percentage, amount or multiplier.
    pub quantified_statements: usize,
    /// Statements built on a vague verb with nothing measurable.
    pub vague_statements: usize,
}

impl AchievementStats {
    /// Percentage of action statements that are quantified; 0 when there are none.
    pub fn quantified_percent(&self) -> usize {
        if self.action_statements == 0 {
            return 0;
        }
        self.quantified_statements * 100 / self.action_statements
    }
}

fn is_year(number: &str) -> bool {
    number.len() == 4
        && number
            .parse::<u32>()
            .map(|n| (1900..=2099).contains(&n))
            .unwrap_or(false)
}

/// True when the statement states an outcome in numbers.
///
/// Accepts any number other than a bare year, `%`, a currency sign (`$ € £`),
/// or a multiplier such as `3x`.
pub fn is_quantified(statement: &str) -> bool {
    if statement.contains('%') || statement.contains(['$', '€', '£']) {
        return true;
    }
    number_regex()
        .find_iter(statement)
        .any(|m| !is_year(m.as_str()))
}

fn words(statement: &str) -> String {
    let spaced: String = statement
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    format!(" {} ", spaced.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn strip_bullet(line: &str) -> &str {
    line.trim().trim_start_matches(BULLETS).trim_start()
}

fn is_action_statement(statement: &str) -> bool {
    statement
        .split_whitespace()
        .next()
        .map(|first| {
            let first = first
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            ACTION_VERBS.contains(&first.as_str())
        })
        .unwrap_or(false)
}

fn is_vague(statement: &str) -> bool {
    let words = words(statement);
    VAGUE_VERBS
        .iter()
        .any(|verb| words.contains(&format!(" {verb} ")))
}

pub fn analyze_achievements(text: &str) -> AchievementStats {
    let mut stats = AchievementStats::default();
    for statement in text.lines().map(strip_bullet).filter(|s| !s.is_empty()) {
        let quantified = is_quantified(statement);
        if is_action_statement(statement) {
            stats.action_statements += 1;
            if quantified {
                stats.quantified_statements += 1;
            }
        }
        if !quantified && is_vague(statement) {
            stats.vague_statements += 1;
        }
    }
    stats
}
