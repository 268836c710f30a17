//! Keyword Profiles: named keyword sets a résumé is checked against.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordProfile {
    pub id: String,
    pub name: String,
    pub keywords: Vec<String>,
}

fn profile(id: &str, name: &str, keywords: &[&str]) -> KeywordProfile {
    KeywordProfile {
        id: id.to_string(),
        name: name.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
    }
}

/// Built-in profiles. `general` is the default keyword list shown by the upload page.
pub fn default_profiles() -> Vec<KeywordProfile> {
    vec![
        profile(
            "general",
            "General",
            &[
                "Project Management",
                "Agile/Scrum",
                "Data Analysis",
                "Budget Planning",
                "Stakeholder Management",
                "Risk Assessment",
            ],
        ),
        profile(
            "software-engineer",
            "Software Engineer",
            &[
                "Python",
                "JavaScript",
                "SQL",
                "REST API",
                "Git",
                "CI/CD",
                "Docker",
                "Kubernetes",
                "Cloud",
                "Unit Testing",
                "Microservices",
                "Agile/Scrum",
            ],
        ),
        profile(
            "data-analyst",
            "Data Analyst",
            &[
                "SQL",
                "Excel",
                "Python",
                "Tableau/Power BI",
                "Data Visualization",
                "Statistics",
                "Data Cleaning",
                "Dashboard",
                "A/B Testing",
                "Reporting",
            ],
        ),
        profile(
            "project-manager",
            "Project Manager",
            &[
                "Project Management",
                "Agile/Scrum",
                "Stakeholder Management",
                "Risk Management",
                "Budget Planning",
                "Roadmap",
                "Jira",
                "Cross-Functional",
                "Scope Management",
                "PMP",
            ],
        ),
    ]
}
