//! Categories of personal data recognised by the moderation gate

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category of a personal-data shape found in user text
///
/// Variants are listed in the order the pattern scanner checks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonalDataKind {
    Phone,
    Email,
    Pesel,
    PostalCode,
    PaymentCard,
    IdCard,
}

impl PersonalDataKind {
    /// All kinds in scanning order
    pub const ALL: [Self; 6] = [
        Self::Phone,
        Self::Email,
        Self::Pesel,
        Self::PostalCode,
        Self::PaymentCard,
        Self::IdCard,
    ];

    /// Human-readable Polish label used in warnings
    pub const fn label(self) -> &'static str {
        match self {
            Self::Phone => "numer telefonu",
            Self::Email => "adres e-mail",
            Self::Pesel => "numer PESEL",
            Self::PostalCode => "kod pocztowy",
            Self::PaymentCard => "numer karty płatniczej",
            Self::IdCard => "numer dowodu osobistego",
        }
    }

    /// Placeholder written in place of a redacted occurrence
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Phone => "[telefon]",
            Self::Email => "[e-mail]",
            Self::Pesel => "[PESEL]",
            Self::PostalCode => "[kod pocztowy]",
            Self::PaymentCard => "[karta]",
            Self::IdCard => "[dowód]",
        }
    }

    /// Generic warning shown when this category is detected
    pub fn warning(self) -> String {
        format!(
            "Wykryto {}. Nie publikuj danych osobowych (RODO).",
            self.label()
        )
    }

    /// Stable machine-readable name
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Phone => "phone",
            Self::Email => "email",
            Self::Pesel => "pesel",
            Self::PostalCode => "postal_code",
            Self::PaymentCard => "payment_card",
            Self::IdCard => "id_card",
        }
    }
}

impl fmt::Display for PersonalDataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
