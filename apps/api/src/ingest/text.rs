//! Line-level heuristics shared by the text-only extractors (PDF, legacy DOC).

use std::sync::OnceLock;

use regex::Regex;

const MAX_HEADER_WORDS: usize = 5;
const MAX_HEADER_CHARS: usize = 40;

/// Lines with a wide internal gap; two or more text columns flattened onto one line.
const COLUMN_GAP_PATTERN: &str = r"\S(?: {4,}|\t+)\S";
const MIN_COLUMN_GAP_LINES: usize = 5;
const MIN_COLUMN_GAP_FRACTION: f64 = 0.25;

/// Connectives allowed in lowercase inside a title-cased header ("Skills and Interests").
const MINOR_WORDS: &[&str] = &["and", "of", "the", "in", "for", "to", "with", "a", "an", "&"];

fn column_gap_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(COLUMN_GAP_PATTERN).expect("valid column gap regex"))
}

/// Returns true when a line looks like a section header.
///
/// A header is a short line (1–5 words, ≤ 40 chars) with at least one letter,
/// not ending in sentence punctuation, and either all-caps, colon-terminated,
/// or title-cased.
pub fn is_header_candidate(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_HEADER_CHARS {
        return false;
    }
    if trimmed.ends_with(&['.', ',', ';'][..]) {
        return false;
    }
    if !trimmed.chars().any(char::is_alphabetic) {
        return false;
    }

    let words: Vec<&str> = trimmed.split_whitespace().collect();
    if words.len() > MAX_HEADER_WORDS {
        return false;
    }
    if trimmed.ends_with(':') {
        return true;
    }
    if trimmed
        .chars()
        .filter(|c| c.is_alphabetic())
        .all(char::is_uppercase)
    {
        return true;
    }

    words.iter().all(|word| {
        if MINOR_WORDS.contains(&word.to_lowercase().as_str()) {
            return true;
        }
        word.chars()
            .find(|c| c.is_alphabetic())
            .map(char::is_uppercase)
            .unwrap_or(true)
    })
}

/// Collects header candidates in document order.
pub fn detect_section_labels(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| is_header_candidate(line))
        .map(str::to_string)
        .collect()
}

pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Non-whitespace character count; used to tell text documents from scans.
pub fn meaningful_chars(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}

/// Detects text that was laid out in several columns.
///
/// Text extractors flatten side-by-side columns into single lines separated by
/// long runs of spaces. If enough lines carry such a gap, the source was multi-column.
pub fn looks_multi_column(text: &str) -> bool {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return false;
    }
    let gapped = lines
        .iter()
        .filter(|l| column_gap_regex().is_match(l.trim()))
        .count();
    gapped >= MIN_COLUMN_GAP_LINES && gapped as f64 / lines.len() as f64 >= MIN_COLUMN_GAP_FRACTION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_caps_header() {
        assert!(is_header_candidate("WORK EXPERIENCE"));
        assert!(is_header_candidate("  SKILLS  "));
    }

    #[test]
    fn test_colon_terminated_header() {
        assert!(is_header_candidate("education:"));
    }

    #[test]
    fn test_title_case_header_with_minor_words() {
        assert!(is_header_candidate("Skills and Interests"));
        assert!(is_header_candidate("Licenses & Certifications"));
    }

    #[test]
    fn test_sentences_are_not_headers() {
        assert!(!is_header_candidate("Led a team of five engineers."));
        assert!(!is_header_candidate("built the billing platform"));
        assert!(!is_header_candidate(
            "Managed Vendor Relationships Across Three Continents Globally"
        ));
    }

    #[test]
    fn test_numbers_only_is_not_header() {
        assert!(!is_header_candidate("2019 - 2021"));
        assert!(!is_header_candidate(""));
    }

    #[test]
    fn test_detect_labels_in_order() {
        let text = "Jane Doe\njane@example.com\nSUMMARY\nShipped things.\nExperience\nDid work.";
        assert_eq!(
            detect_section_labels(text),
            vec!["Jane Doe", "SUMMARY", "Experience"]
        );
    }

    #[test]
    fn test_multi_column_detection() {
        let row = "Senior Engineer at Acme        Python, Rust, Go";
        let text = std::iter::repeat(row).take(8).collect::<Vec<_>>().join("\n");
        assert!(looks_multi_column(&text));
    }

    #[test]
    fn test_single_column_text() {
        let text = "Senior Engineer at Acme\nBuilt the billing system.\nPython, Rust, Go\n".repeat(4);
        assert!(!looks_multi_column(&text));
    }

    #[test]
    fn test_meaningful_chars_ignores_whitespace() {
        assert_eq!(meaningful_chars(" a b\n\tc "), 3);
    }
}
