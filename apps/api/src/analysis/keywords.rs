//! Keyword Matcher: finds each expected keyword in the résumé text.
//!
//! Matching runs in tiers and stops at the first tier that hits:
//! exact phrase → stemmed phrase → synonym → fuzzy single token.
//! Within a tier the earliest occurrence in the document wins.

use std::collections::HashSet;
use std::fmt;
use std::ops::Range;

use serde::{Serialize, Serializer};
use strsim::{damerau_levenshtein, jaro_winkler};
use thiserror::Error;

use crate::analysis::profiles::KeywordProfile;

pub const MAX_CUSTOM_KEYWORDS: usize = 50;
pub const MAX_KEYWORD_CHARS: usize = 60;

/// Each side of a `/` must be at least this long for the slash to mean "or".
const MIN_ALTERNATIVE_CHARS: usize = 3;
/// Tokens this short are never stemmed.
const MAX_UNSTEMMED_CHARS: usize = 3;
const MIN_FUZZY_CHARS: usize = 5;
const FUZZY_THRESHOLD: f64 = 0.94;
/// A typo is at most one edit away.
const MAX_FUZZY_EDITS: usize = 1;

// ────────────────────────────────────────────────────────────────────────────
// Keyword sets
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeywordSource {
    Profile(String),
    Custom,
}

impl fmt::Display for KeywordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeywordSource::Profile(id) => write!(f, "profile:{id}"),
            KeywordSource::Custom => f.write_str("custom"),
        }
    }
}

impl Serialize for KeywordSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeywordSetError {
    #[error("the keywords field contains no keywords")]
    Empty,

    #[error("too many keywords: {count} supplied, at most {max} allowed")]
    TooMany { count: usize, max: usize },

    #[error("keyword '{keyword}' is longer than {max} characters")]
    TooLong { keyword: String, max: usize },
}

/// Ordered keyword list, de-duplicated case-insensitively (first spelling kept).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet {
    keywords: Vec<String>,
    source: KeywordSource,
}

impl KeywordSet {
    pub fn new<I, S>(keywords: I, source: KeywordSource) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let keywords = keywords
            .into_iter()
            .filter_map(|k| {
                let k = k.as_ref().trim();
                (!k.is_empty() && seen.insert(k.to_lowercase())).then(|| k.to_string())
            })
            .collect();
        Self { keywords, source }
    }

    pub fn from_profile(profile: &KeywordProfile) -> Self {
        Self::new(&profile.keywords, KeywordSource::Profile(profile.id.clone()))
    }

    /// Parses a comma- or newline-separated list supplied by the user.
    pub fn parse_custom(raw: &str) -> Result<Self, KeywordSetError> {
        let entries: Vec<&str> = raw
            .split([',', '\n'])
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .collect();
        if let Some(long) = entries
            .iter()
            .find(|e| e.chars().count() > MAX_KEYWORD_CHARS)
        {
            return Err(KeywordSetError::TooLong {
                keyword: long.to_string(),
                max: MAX_KEYWORD_CHARS,
            });
        }
        let set = Self::new(entries, KeywordSource::Custom);
        if set.is_empty() {
            return Err(KeywordSetError::Empty);
        }
        if set.len() > MAX_CUSTOM_KEYWORDS {
            return Err(KeywordSetError::TooMany {
                count: set.len(),
                max: MAX_CUSTOM_KEYWORDS,
            });
        }
        Ok(set)
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn source(&self) -> &KeywordSource {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tokens and stemming
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Lowercased token text.
    pub text: String,
    /// Light stems; usually one, two for `-es` plurals ("caches" → "cach", "cache").
    pub stems: Vec<String>,
    /// Byte span in the source text.
    pub span: Range<usize>,
}

impl Token {
    fn stem_matches(&self, other: &Token) -> bool {
        self.stems.iter().any(|s| other.stems.contains(s))
    }
}

/// Light suffix stripping for plural and third-person forms.
pub fn stem(word: &str) -> String {
    if word.chars().count() <= MAX_UNSTEMMED_CHARS || !word.chars().all(char::is_alphabetic) {
        return word.to_string();
    }
    if let Some(base) = word.strip_suffix("ies") {
        return format!("{base}y");
    }
    if let Some(base) = word.strip_suffix("sses") {
        return format!("{base}ss");
    }
    if let Some(base) = word.strip_suffix("es") {
        if ["s", "x", "z", "ch", "sh"].iter().any(|end| base.ends_with(end)) {
            return base.to_string();
        }
    }
    if word.ends_with('s') && !["ss", "us", "is"].iter().any(|end| word.ends_with(end)) {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

fn stems(word: &str) -> Vec<String> {
    let primary = stem(word);
    let mut stems = vec![primary.clone()];
    if let Some(base) = word.strip_suffix('s') {
        if word.ends_with("es") && primary.len() + 2 == word.len() {
            stems.push(base.to_string());
        }
    }
    stems
}

fn push_token(tokens: &mut Vec<Token>, source: &str, span: Range<usize>) {
    let text = source[span.clone()].to_lowercase();
    let stems = stems(&text);
    tokens.push(Token { text, stems, span });
}

/// Splits on anything that is not alphanumeric. `+` and `#` directly after a
/// token stay attached so "C++" and "C#" survive.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;
    let mut in_suffix = false;

    for (i, c) in text.char_indices() {
        if c.is_alphanumeric() {
            if in_suffix {
                if let Some(s) = start.take() {
                    push_token(&mut tokens, text, s..i);
                }
                in_suffix = false;
            }
            start.get_or_insert(i);
        } else if (c == '+' || c == '#') && start.is_some() {
            in_suffix = true;
        } else if let Some(s) = start.take() {
            push_token(&mut tokens, text, s..i);
            in_suffix = false;
        }
    }
    if let Some(s) = start {
        push_token(&mut tokens, text, s..text.len());
    }
    tokens
}

// ────────────────────────────────────────────────────────────────────────────
// Matching
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Exact,
    Stem,
    Synonym,
    Fuzzy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordResult {
    pub keyword: String,
    pub found: bool,
    /// Document text that satisfied the keyword.
    pub matched_variant: Option<String>,
    pub match_kind: Option<MatchKind>,
}

/// A slash-separated keyword ("Agile/Scrum") is a set of alternatives.
fn alternatives(keyword: &str) -> Vec<Vec<Token>> {
    let parts: Vec<&str> = keyword.split('/').map(str::trim).collect();
    let phrases: Vec<&str> = if parts.len() > 1
        && parts
            .iter()
            .all(|p| p.chars().count() >= MIN_ALTERNATIVE_CHARS)
    {
        parts
    } else {
        vec![keyword]
    };
    phrases
        .into_iter()
        .map(tokenize)
        .filter(|tokens| !tokens.is_empty())
        .collect()
}

fn find_phrase(
    doc: &[Token],
    phrase: &[Token],
    same: impl Fn(&Token, &Token) -> bool,
) -> Option<Range<usize>> {
    if phrase.is_empty() || phrase.len() > doc.len() {
        return None;
    }
    (0..=doc.len() - phrase.len())
        .find(|&i| phrase.iter().zip(&doc[i..]).all(|(p, d)| same(p, d)))
        .map(|i| i..i + phrase.len())
}

fn earliest<'a>(
    doc: &[Token],
    phrases: impl IntoIterator<Item = &'a Vec<Token>>,
    same: impl Fn(&Token, &Token) -> bool + Copy,
) -> Option<Range<usize>> {
    phrases
        .into_iter()
        .filter_map(|phrase| find_phrase(doc, phrase, same))
        .min_by_key(|range| range.start)
}

fn phrase_stem_eq(a: &[Token], b: &[Token]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.stem_matches(y))
}

/// Synonym phrases for any of the alternatives, excluding the alternatives themselves.
fn synonym_phrases<'a>(alts: &[Vec<Token>], groups: &'a [Vec<Vec<Token>>]) -> Vec<&'a Vec<Token>> {
    groups
        .iter()
        .filter(|group| {
            group
                .iter()
                .any(|phrase| alts.iter().any(|alt| phrase_stem_eq(alt, phrase)))
        })
        .flat_map(|group| group.iter())
        .filter(|phrase| !alts.iter().any(|alt| phrase_stem_eq(alt, phrase)))
        .collect()
}

fn fuzzy_eligible(token: &Token) -> bool {
    token.text.chars().count() >= MIN_FUZZY_CHARS && token.text.chars().all(char::is_alphabetic)
}

/// Inflections ("developer" / "developed") differ in the final character;
/// typos keep it.
fn is_typo_of(keyword: &str, candidate: &str) -> bool {
    keyword.chars().last() == candidate.chars().last()
        && damerau_levenshtein(keyword, candidate) <= MAX_FUZZY_EDITS
        && jaro_winkler(keyword, candidate) >= FUZZY_THRESHOLD
}

fn find_fuzzy(doc: &[Token], alts: &[Vec<Token>]) -> Option<Range<usize>> {
    let singles: Vec<&Token> = alts
        .iter()
        .filter(|alt| alt.len() == 1 && fuzzy_eligible(&alt[0]))
        .map(|alt| &alt[0])
        .collect();
    if singles.is_empty() {
        return None;
    }
    doc.iter()
        .position(|token| {
            fuzzy_eligible(token)
                && singles
                    .iter()
                    .any(|kw| is_typo_of(&kw.text, &token.text))
        })
        .map(|i| i..i + 1)
}

fn match_one(
    text: &str,
    doc: &[Token],
    keyword: &str,
    synonym_groups: &[Vec<Vec<Token>>],
) -> KeywordResult {
    let alts = alternatives(keyword);

    let hit = earliest(doc, &alts, |a, b| a.text == b.text)
        .map(|r| (r, MatchKind::Exact))
        .or_else(|| earliest(doc, &alts, Token::stem_matches).map(|r| (r, MatchKind::Stem)))
        .or_else(|| {
            let synonyms = synonym_phrases(&alts, synonym_groups);
            earliest(doc, synonyms, Token::stem_matches).map(|r| (r, MatchKind::Synonym))
        })
        .or_else(|| find_fuzzy(doc, &alts).map(|r| (r, MatchKind::Fuzzy)));

    match hit {
        Some((range, kind)) => {
            let span = doc[range.start].span.start..doc[range.end - 1].span.end;
            KeywordResult {
                keyword: keyword.to_string(),
                found: true,
                matched_variant: Some(text[span].to_string()),
                match_kind: Some(kind),
            }
        }
        None => KeywordResult {
            keyword: keyword.to_string(),
            found: false,
            matched_variant: None,
            match_kind: None,
        },
    }
}

/// Looks up every keyword of the set in `text`. Results follow the set's order.
pub fn match_keywords(text: &str, set: &KeywordSet, synonyms: &[Vec<String>]) -> Vec<KeywordResult> {
    let doc = tokenize(text);
    let synonym_groups: Vec<Vec<Vec<Token>>> = synonyms
        .iter()
        .map(|group| {
            group
                .iter()
                .map(|phrase| tokenize(phrase))
                .filter(|tokens| !tokens.is_empty())
                .collect()
        })
        .collect();

    set.keywords()
        .iter()
        .map(|keyword| match_one(text, &doc, keyword, &synonym_groups))
        .collect()
}

/// Share of keywords found, 0–100. An empty set scores 0.
pub fn keyword_score(results: &[KeywordResult]) -> u8 {
    let total = results.len();
    if total == 0 {
        return 0;
    }
    let found = results.iter().filter(|r| r.found).count();
    ((found * 200 + total) / (total * 2)).min(100) as u8
}

pub fn missing_keywords(results: &[KeywordResult]) -> Vec<&str> {
    results
        .iter()
        .filter(|r| !r.found)
        .map(|r| r.keyword.as_str())
        .collect()
}
