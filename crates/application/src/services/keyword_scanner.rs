//! Self-disclosure keyword scanner
//!
//! Looks for phrases with which users volunteer their address, name or
//! phone number, or invite others to contact them off-platform. Findings
//! are advisory: every distinct phrase yields its own warning and nothing
//! here blocks a submission.

use std::collections::BTreeSet;

use aho_corasick::AhoCorasick;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Built-in Polish phrase list, in warning order
pub const POLISH_KEYWORDS: &[&str] = &[
    "mieszkam na",
    "mieszkam przy",
    "mój adres",
    "moj adres",
    "nazywam się",
    "nazywam sie",
    "mam na imię",
    "mój numer",
    "moj numer",
    "mój telefon",
    "moj telefon",
    "zadzwoń do mnie",
    "zadzwon do mnie",
    "napisz do mnie",
    "mój email",
    "mój e-mail",
    "moj email",
    "skontaktuj się ze mną",
    "skontaktuj sie ze mna",
    "pisz na priv",
];

/// Detector for advisory self-disclosure phrases
#[cfg_attr(test, automock)]
pub trait DisclosureScanner: Send + Sync {
    /// One warning per distinct matching phrase, in list order
    fn scan(&self, text: &str) -> Vec<String>;
}

/// Aho-Corasick backed [`DisclosureScanner`]
#[derive(Debug)]
pub struct KeywordScanner {
    phrases: Vec<String>,
    matcher: AhoCorasick,
}

impl KeywordScanner {
    /// Scanner with the built-in Polish phrase list
    pub fn polish() -> Result<Self, ApplicationError> {
        Self::new(POLISH_KEYWORDS.iter().copied())
    }

    /// Built-in list followed by operator-supplied phrases
    pub fn polish_with_extra(extra: &[String]) -> Result<Self, ApplicationError> {
        Self::new(
            POLISH_KEYWORDS
                .iter()
                .copied()
                .chain(extra.iter().map(String::as_str)),
        )
    }

    /// Build from an arbitrary phrase list
    ///
    /// Phrases are trimmed and lower-cased; blanks and duplicates are dropped
    /// while keeping first-seen order.
    pub fn new<'a>(phrases: impl IntoIterator<Item = &'a str>) -> Result<Self, ApplicationError> {
        let mut seen = BTreeSet::new();
        let phrases: Vec<String> = phrases
            .into_iter()
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty() && seen.insert(p.clone()))
            .collect();

        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(&phrases)
            .map_err(|e| ApplicationError::Configuration(format!("keyword matcher: {e}")))?;

        Ok(Self { phrases, matcher })
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    fn warning_for(phrase: &str) -> String {
        format!(
            "Fraza „{phrase}” może ujawniać Twoje dane. Nie podawaj danych kontaktowych w komentarzu."
        )
    }
}

impl DisclosureScanner for KeywordScanner {
    fn scan(&self, text: &str) -> Vec<String> {
        if text.is_empty() || self.phrases.is_empty() {
            return Vec::new();
        }
        let normalized = text.to_lowercase();
        let hits: BTreeSet<usize> = self
            .matcher
            .find_overlapping_iter(&normalized)
            .map(|m| m.pattern().as_usize())
            .collect();

        hits.into_iter()
            .filter_map(|idx| self.phrases.get(idx))
            .map(|phrase| Self::warning_for(phrase))
            .collect()
    }
}
