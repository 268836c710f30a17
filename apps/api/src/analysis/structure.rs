//! Structure Analyzer: maps detected header labels onto canonical resume sections.

use serde::{Deserialize, Serialize};

use crate::ingest::{ExtractedContent, NonTextElement};

/// Labels longer than this are not matched by containment, only by equality.
const MAX_CONTAINMENT_WORDS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Experience,
    Education,
    Skills,
    Summary,
    Projects,
    Certifications,
}

impl SectionKind {
    /// Header text recommended to users when the section is missing.
    pub fn display_name(&self) -> &'static str {
        match self {
            SectionKind::Experience => "Work Experience",
            SectionKind::Education => "Education",
            SectionKind::Skills => "Skills",
            SectionKind::Summary => "Summary",
            SectionKind::Projects => "Projects",
            SectionKind::Certifications => "Certifications",
        }
    }
}

/// A canonical section, its importance weight, and the header texts that denote it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionRule {
    pub kind: SectionKind,
    pub weight: u32,
    pub aliases: Vec<String>,
}

fn rule(kind: SectionKind, weight: u32, aliases: &[&str]) -> SectionRule {
    SectionRule {
        kind,
        weight,
        aliases: aliases.iter().map(|a| a.to_string()).collect(),
    }
}

/// Default canonical section table. Weights sum to 100.
pub fn default_section_rules() -> Vec<SectionRule> {
    vec![
        rule(
            SectionKind::Experience,
            35,
            &[
                "experience",
                "work experience",
                "professional experience",
                "employment",
                "employment history",
                "work history",
                "career history",
                "relevant experience",
            ],
        ),
        rule(
            SectionKind::Education,
            20,
            &[
                "education",
                "academic background",
                "education and training",
                "academic history",
                "qualifications",
            ],
        ),
        rule(
            SectionKind::Skills,
            20,
            &[
                "skills",
                "technical skills",
                "core competencies",
                "competencies",
                "areas of expertise",
                "expertise",
                "key skills",
            ],
        ),
        rule(
            SectionKind::Summary,
            10,
            &[
                "summary",
                "professional summary",
                "profile",
                "professional profile",
                "objective",
                "career objective",
                "about me",
            ],
        ),
        rule(
            SectionKind::Projects,
            10,
            &["projects", "key projects", "selected projects", "portfolio"],
        ),
        rule(
            SectionKind::Certifications,
            5,
            &[
                "certifications",
                "certificates",
                "licenses",
                "licenses and certifications",
                "training",
            ],
        ),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionFindings {
    /// Canonical sections detected, in canonical-table order.
    pub found: Vec<SectionKind>,
    pub missing: Vec<SectionKind>,
    /// Structure sub-score, 0–100.
    pub score: u8,
    /// Elements present that reduce ATS parseability.
    pub non_text_elements: Vec<NonTextElement>,
    pub multi_column: bool,
}

impl SectionFindings {
    pub fn has_non_text_elements(&self) -> bool {
        !self.non_text_elements.is_empty()
    }
}

/// Lowercases, turns `&` into `and`, drops punctuation and collapses whitespace.
pub fn normalize_label(label: &str) -> String {
    let cleaned: String = label
        .to_lowercase()
        .replace('&', " and ")
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn label_matches(label: &str, alias: &str) -> bool {
    if label == alias {
        return true;
    }
    let label_words: Vec<&str> = label.split_whitespace().collect();
    let alias_words: Vec<&str> = alias.split_whitespace().collect();
    if alias_words.is_empty() || label_words.len() > MAX_CONTAINMENT_WORDS {
        return false;
    }
    label_words
        .windows(alias_words.len())
        .any(|window| window == alias_words.as_slice())
}

/// Detects canonical sections among the content's header labels and scores coverage.
///
/// Score = round(100 × Σ weight(found) / Σ weight(all)); 0 when the table carries no weight.
pub fn analyze_structure(content: &ExtractedContent, rules: &[SectionRule]) -> SectionFindings {
    let labels: Vec<String> = content
        .section_labels
        .iter()
        .map(|l| normalize_label(l))
        .filter(|l| !l.is_empty())
        .collect();

    let mut found = Vec::new();
    let mut missing = Vec::new();
    let mut found_weight = 0u32;
    let mut total_weight = 0u32;

    for section in rules {
        total_weight += section.weight;
        let aliases: Vec<String> = section.aliases.iter().map(|a| normalize_label(a)).collect();
        let present = labels
            .iter()
            .any(|label| aliases.iter().any(|alias| label_matches(label, alias)));
        if present {
            found_weight += section.weight;
            found.push(section.kind);
        } else {
            missing.push(section.kind);
        }
    }

    let score = if total_weight == 0 {
        0
    } else {
        ((found_weight * 100 + total_weight / 2) / total_weight).min(100) as u8
    };

    SectionFindings {
        found,
        missing,
        score,
        non_text_elements: content.non_text_elements.iter().copied().collect(),
        multi_column: content.multi_column,
    }
}
