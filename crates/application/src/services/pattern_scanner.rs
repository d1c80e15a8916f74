//! Personal-data pattern scanner
//!
//! Checks text against an ordered table of regular expressions, one per
//! [`PersonalDataKind`]. The first matching rule wins and scanning stops;
//! a blocking decision needs a single positive signal.
//!
//! The national-ID rule matches any free-standing 11-digit run without
//! checksum validation. Over-blocking unrelated numbers is accepted in
//! exchange for never letting a PESEL through.

use domain::PersonalDataKind;
#[cfg(test)]
use mockall::automock;
use regex::Regex;

use crate::error::ApplicationError;

/// Default rules, in evaluation order
pub const POLISH_PATTERNS: [(PersonalDataKind, &str); 6] = [
    (
        PersonalDataKind::Phone,
        r"(?:\+48[\s-]?|\b)\d{3}[\s-]?\d{3}[\s-]?\d{3}\b",
    ),
    (
        PersonalDataKind::Email,
        r"(?i)\b[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}\b",
    ),
    (PersonalDataKind::Pesel, r"\b\d{11}\b"),
    (PersonalDataKind::PostalCode, r"\b\d{2}-\d{3}\b"),
    (PersonalDataKind::PaymentCard, r"\b(?:\d{4}[\s-]?){3}\d{4}\b"),
    (PersonalDataKind::IdCard, r"\b[A-Z]{3}\s?\d{6}\b"),
];

/// First personal-data category found in a text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternMatch {
    pub kind: PersonalDataKind,
}

impl PatternMatch {
    pub const fn label(&self) -> &'static str {
        self.kind.label()
    }

    pub fn warning(&self) -> String {
        self.kind.warning()
    }
}

/// Detector for blocking personal-data shapes
#[cfg_attr(test, automock)]
pub trait PersonalDataScanner: Send + Sync {
    /// First matching category, if any
    fn scan(&self, text: &str) -> Option<PatternMatch>;

    /// Replace every occurrence of every category with its marker
    fn redact(&self, text: &str) -> String;
}

#[derive(Debug)]
struct Rule {
    kind: PersonalDataKind,
    regex: Regex,
}

/// Regex-backed [`PersonalDataScanner`]
///
/// Build once at start-up and share behind an `Arc`; scanning is lock-free.
#[derive(Debug)]
pub struct PatternScanner {
    rules: Vec<Rule>,
}

impl PatternScanner {
    /// Scanner with the built-in Polish rule table
    pub fn polish() -> Result<Self, ApplicationError> {
        Self::from_rules(&POLISH_PATTERNS)
    }

    /// Compile a custom ordered rule table
    pub fn from_rules(rules: &[(PersonalDataKind, &str)]) -> Result<Self, ApplicationError> {
        let rules = rules
            .iter()
            .map(|(kind, pattern)| {
                Regex::new(pattern)
                    .map(|regex| Rule { kind: *kind, regex })
                    .map_err(|e| {
                        ApplicationError::Configuration(format!("invalid {kind} pattern: {e}"))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Number of compiled rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl PersonalDataScanner for PatternScanner {
    fn scan(&self, text: &str) -> Option<PatternMatch> {
        self.rules
            .iter()
            .find(|rule| rule.regex.is_match(text))
            .map(|rule| PatternMatch { kind: rule.kind })
    }

    fn redact(&self, text: &str) -> String {
        self.rules.iter().fold(text.to_string(), |acc, rule| {
            rule.regex.replace_all(&acc, rule.kind.marker()).into_owned()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner() -> PatternScanner {
        PatternScanner::polish().unwrap()
    }

    fn kind_of(text: &str) -> Option<PersonalDataKind> {
        scanner().scan(text).map(|m| m.kind)
    }

    #[test]
    fn compiles_all_default_rules() {
        assert_eq!(scanner().len(), 6);
    }

    #[test]
    fn detects_plain_phone_number() {
        assert_eq!(
            kind_of("Zadzwoń do mnie: 123456789"),
            Some(PersonalDataKind::Phone)
        );
    }

    #[test]
    fn detects_grouped_phone_with_prefix() {
        assert_eq!(kind_of("tel. +48 601 234 567"), Some(PersonalDataKind::Phone));
        assert_eq!(kind_of("601-234-567"), Some(PersonalDataKind::Phone));
    }

    #[test]
    fn detects_compact_prefixed_phone() {
        assert_eq!(kind_of("tel +48123456789"), Some(PersonalDataKind::Phone));
        let redacted = scanner().redact("tel +48123456789");
        assert_eq!(redacted, format!("tel {}", PersonalDataKind::Phone.marker()));
    }

    #[test]
    fn detects_email() {
        assert_eq!(
            kind_of("jan.kowalski@example.com"),
            Some(PersonalDataKind::Email)
        );
        assert_eq!(kind_of("Pisz: Ala@Poczta.PL"), Some(PersonalDataKind::Email));
    }

    #[test]
    fn eleven_digits_are_pesel_not_phone() {
        assert_eq!(kind_of("PESEL 44051401359"), Some(PersonalDataKind::Pesel));
    }

    #[test]
    fn eleven_digits_without_valid_checksum_still_match() {
        assert_eq!(kind_of("zamówienie 12345678901"), Some(PersonalDataKind::Pesel));
    }

    #[test]
    fn detects_postal_code() {
        assert_eq!(kind_of("Mieszkam 00-950 Warszawa"), Some(PersonalDataKind::PostalCode));
    }

    #[test]
    fn detects_payment_card() {
        assert_eq!(
            kind_of("karta 1234 5678 9012 3456"),
            Some(PersonalDataKind::PaymentCard)
        );
        assert_eq!(
            kind_of("1234-5678-9012-3456"),
            Some(PersonalDataKind::PaymentCard)
        );
    }

    #[test]
    fn detects_id_card() {
        assert_eq!(kind_of("dowód ABC123456"), Some(PersonalDataKind::IdCard));
    }

    #[test]
    fn first_rule_short_circuits() {
        // phone comes before email in the table
        let text = "123 456 789 albo jan@example.com";
        assert_eq!(kind_of(text), Some(PersonalDataKind::Phone));
    }

    #[test]
    fn ordinary_text_is_clean() {
        assert_eq!(kind_of("Art. 5 ust. 2 otrzymuje brzmienie"), None);
        assert_eq!(kind_of("W roku 2024 wydano 150 mln zł"), None);
        assert_eq!(kind_of(""), None);
    }

    #[test]
    fn digits_glued_to_letters_are_not_free_standing() {
        assert_eq!(kind_of("ref12345678901x"), None);
    }

    #[test]
    fn redact_replaces_every_occurrence() {
        let redacted =
            scanner().redact("tel 123456789, mail a@b.pl, drugi 987 654 321, kod 31-100");
        assert_eq!(
            redacted,
            "tel [telefon], mail [e-mail], drugi [telefon], kod [kod pocztowy]"
        );
    }

    #[test]
    fn redact_leaves_clean_text_untouched() {
        let text = "Popieram zmianę art. 7";
        assert_eq!(scanner().redact(text), text);
    }

    #[test]
    fn invalid_custom_rule_is_configuration_error() {
        let err = PatternScanner::from_rules(&[(PersonalDataKind::Phone, "(")]).unwrap_err();
        assert!(matches!(err, ApplicationError::Configuration(_)));
    }

    #[test]
    fn warning_uses_category_label() {
        let found = scanner().scan("123456789").unwrap();
        assert!(found.warning().contains(found.label()));
    }
}
