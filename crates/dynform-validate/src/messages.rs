//! # Message Catalogs
//!
//! Default wording for every [`FailureKind`], per locale. A schema override
//! (`errorMessages`) always wins over the catalog.

use std::str::FromStr;

use dynform_core::FieldType;
use thiserror::Error;

use crate::failure::{FailureKind, ValidationFailure};

/// Renders the default message for a failure that has no schema override.
pub trait MessageCatalog: Send + Sync {
    /// The catalog's default text for `failure`.
    fn default_message(&self, failure: &ValidationFailure) -> String;

    /// The override if the schema supplied one, else the default.
    fn render(&self, failure: &ValidationFailure) -> String {
        match &failure.custom_message {
            Some(message) => message.clone(),
            None => self.default_message(failure),
        }
    }
}

fn limit(failure: &ValidationFailure) -> &str {
    failure.context.limit.as_deref().unwrap_or_default()
}

/// English defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct English;

impl MessageCatalog for English {
    fn default_message(&self, failure: &ValidationFailure) -> String {
        match failure.kind {
            FailureKind::TypeMismatch if failure.field_type == FieldType::Date => {
                "must be a valid date".to_string()
            }
            FailureKind::TypeMismatch => "must be a string".to_string(),
            FailureKind::Required => "field is required".to_string(),
            FailureKind::MinLength => format!("minimum {} characters", limit(failure)),
            FailureKind::MaxLength => format!("maximum {} characters", limit(failure)),
            FailureKind::PatternMismatch if failure.field_type == FieldType::Password => {
                "password does not meet requirements".to_string()
            }
            FailureKind::PatternMismatch => "value does not match the required pattern".to_string(),
            FailureKind::InvalidEmail => "invalid email format".to_string(),
            FailureKind::InvalidFormat => "invalid date format, use YYYY-MM-DD".to_string(),
            FailureKind::BeforeMinDate => format!("date must be on or after {}", limit(failure)),
            FailureKind::AfterMaxDate => format!("date must be on or before {}", limit(failure)),
            FailureKind::NotANumber => "must be a valid number".to_string(),
            FailureKind::BelowMin => format!("minimum value: {}", limit(failure)),
            FailureKind::AboveMax => format!("maximum value: {}", limit(failure)),
            FailureKind::InvalidOption => "invalid option".to_string(),
        }
    }
}

/// Hebrew defaults, matching the wording of the original form client.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hebrew;

impl MessageCatalog for Hebrew {
    fn default_message(&self, failure: &ValidationFailure) -> String {
        match failure.kind {
            FailureKind::TypeMismatch if failure.field_type == FieldType::Date => {
                "ערך חייב להיות תאריך תקין".to_string()
            }
            FailureKind::TypeMismatch => "ערך חייב להיות מחרוזת".to_string(),
            FailureKind::Required => "שדה חובה".to_string(),
            FailureKind::MinLength => format!("מינימום {} תווים", limit(failure)),
            FailureKind::MaxLength => format!("מקסימום {} תווים", limit(failure)),
            FailureKind::PatternMismatch if failure.field_type == FieldType::Password => {
                "סיסמה לא עומדת בדרישות".to_string()
            }
            FailureKind::PatternMismatch => "ערך לא עומד בתבנית הנדרשת".to_string(),
            FailureKind::InvalidEmail => "כתובת אימייל לא תקינה".to_string(),
            FailureKind::InvalidFormat => {
                "פורמט תאריך לא תקין. השתמש בפורמט YYYY-MM-DD".to_string()
            }
            FailureKind::BeforeMinDate => {
                format!("תאריך מוקדם מדי (מינימום: {})", limit(failure))
            }
            FailureKind::AfterMaxDate => {
                format!("תאריך מאוחר מדי (מקסימום: {})", limit(failure))
            }
            FailureKind::NotANumber => "ערך חייב להיות מספר תקין".to_string(),
            FailureKind::BelowMin => format!("ערך מינימלי: {}", limit(failure)),
            FailureKind::AboveMax => format!("ערך מקסימלי: {}", limit(failure)),
            FailureKind::InvalidOption => "אפשרות לא תקינה".to_string(),
        }
    }
}

/// A supported message locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    /// English (`en`).
    #[default]
    English,
    /// Hebrew (`he`).
    Hebrew,
}

static ENGLISH: English = English;
static HEBREW: Hebrew = Hebrew;

impl Locale {
    /// The catalog for this locale.
    pub fn catalog(&self) -> &'static dyn MessageCatalog {
        match self {
            Self::English => &ENGLISH,
            Self::Hebrew => &HEBREW,
        }
    }

    /// ISO 639-1 code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Hebrew => "he",
        }
    }
}

/// An unrecognized locale string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported locale \"{0}\" (expected en or he)")]
pub struct UnknownLocale(pub String);

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Self::English),
            // `iw` is the legacy ISO code still emitted by some clients.
            "he" | "iw" | "hebrew" => Ok(Self::Hebrew),
            _ => Err(UnknownLocale(s.to_string())),
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
