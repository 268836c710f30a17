//! Analysis rules: the tunable tables behind scoring.
//!
//! Built-in defaults cover everything; `ATS_RULES_PATH` may point at a JSON
//! file that replaces any top-level table.

use std::collections::HashSet;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::analysis::profiles::{default_profiles, KeywordProfile};
use crate::analysis::scoring::{FormattingPenalties, ScoringWeights};
use crate::analysis::structure::{default_section_rules, SectionRule};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisRules {
    pub sections: Vec<SectionRule>,
    pub scoring: ScoringWeights,
    pub penalties: FormattingPenalties,
    /// Groups of interchangeable terms; any member satisfies a keyword equal to another.
    pub synonyms: Vec<Vec<String>>,
    pub profiles: Vec<KeywordProfile>,
}

impl Default for AnalysisRules {
    fn default() -> Self {
        Self {
            sections: default_section_rules(),
            scoring: ScoringWeights::default(),
            penalties: FormattingPenalties::default(),
            synonyms: default_synonyms(),
            profiles: default_profiles(),
        }
    }
}

const SYNONYM_GROUPS: &[&[&str]] = &[
    &["javascript", "js", "ecmascript"],
    &["typescript", "ts"],
    &["kubernetes", "k8s"],
    &["postgresql", "postgres"],
    &["machine learning", "ml"],
    &["artificial intelligence", "ai"],
    &["user experience", "ux"],
    &["search engine optimization", "seo"],
    &["continuous integration", "ci/cd", "continuous delivery"],
    &["amazon web services", "aws"],
    &["google cloud platform", "gcp", "google cloud"],
    &["rest api", "restful api", "rest apis", "restful"],
    &["unit testing", "unit tests", "test driven development", "tdd"],
    &["project management", "project manager", "managed projects"],
    &["agile", "scrum", "kanban", "sprint planning"],
    &["data analysis", "data analytics", "analyzed data"],
    &["budget planning", "budgeting", "budget management", "forecasting"],
    &["stakeholder management", "stakeholder engagement", "stakeholder communication"],
    &["risk assessment", "risk analysis", "risk management", "risk mitigation"],
    &["data visualization", "data visualisation"],
    &["power bi", "powerbi"],
    &["cross-functional", "cross functional", "multidisciplinary"],
];

pub fn default_synonyms() -> Vec<Vec<String>> {
    SYNONYM_GROUPS
        .iter()
        .map(|group| group.iter().map(|s| s.to_string()).collect())
        .collect()
}

impl AnalysisRules {
    /// Loads the rules, applying the JSON override file when a path is given.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read analysis rules from '{path}'"))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Analysis rules in '{path}' are not valid JSON rules"))
    }

    /// Checks the invariants scoring relies on.
    pub fn validate(&self, default_role: &str) -> Result<()> {
        if self.sections.iter().map(|s| s.weight).sum::<u32>() == 0 {
            anyhow::bail!("Section weights must sum to more than zero");
        }
        self.scoring.validate()?;

        let mut ids = HashSet::new();
        for profile in &self.profiles {
            if !ids.insert(profile.id.as_str()) {
                anyhow::bail!("Keyword profile '{}' is defined twice", profile.id);
            }
            if profile.keywords.iter().all(|k| k.trim().is_empty()) {
                anyhow::bail!("Keyword profile '{}' has no keywords", profile.id);
            }
        }
        if self.profile(default_role).is_none() {
            anyhow::bail!("DEFAULT_ROLE '{default_role}' does not name a keyword profile");
        }
        Ok(())
    }

    pub fn profile(&self, id: &str) -> Option<&KeywordProfile> {
        self.profiles.iter().find(|p| p.id == id)
    }
}
