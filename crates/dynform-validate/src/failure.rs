//! Structured field failures.
//!
//! A [`ValidationFailure`] records what went wrong and the limit involved,
//! never a pre-rendered string. Turning it into text is the job of a
//! [`MessageCatalog`](crate::MessageCatalog).

use dynform_core::{ErrorMessageKey, FieldType};

/// The reason a single field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The raw value has the wrong JSON type (e.g. a number for a text field).
    TypeMismatch,
    /// A required field is absent or null.
    Required,
    /// Shorter than `minLength`.
    MinLength,
    /// Longer than `maxLength`.
    MaxLength,
    /// Does not match `pattern` at the start of the value.
    PatternMismatch,
    /// Not a well-formed email address.
    InvalidEmail,
    /// Not a `YYYY-MM-DD` calendar date.
    InvalidFormat,
    /// Earlier than `minDate`.
    BeforeMinDate,
    /// Later than `maxDate`.
    AfterMaxDate,
    /// Not parseable as a finite number.
    NotANumber,
    /// Less than `min`.
    BelowMin,
    /// Greater than `max`.
    AboveMax,
    /// Not one of the dropdown option values.
    InvalidOption,
}

impl FailureKind {
    /// Stable snake_case code, used in logs and machine-readable output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::TypeMismatch => "type_mismatch",
            Self::Required => "required",
            Self::MinLength => "min_length",
            Self::MaxLength => "max_length",
            Self::PatternMismatch => "pattern_mismatch",
            Self::InvalidEmail => "invalid_email",
            Self::InvalidFormat => "invalid_format",
            Self::BeforeMinDate => "before_min_date",
            Self::AfterMaxDate => "after_max_date",
            Self::NotANumber => "not_a_number",
            Self::BelowMin => "below_min",
            Self::AboveMax => "above_max",
            Self::InvalidOption => "invalid_option",
        }
    }

    /// The `errorMessages` key that may override this failure's message.
    ///
    /// Type and format failures have no override slot.
    pub fn override_key(&self) -> Option<ErrorMessageKey> {
        match self {
            Self::Required => Some(ErrorMessageKey::Required),
            Self::MinLength => Some(ErrorMessageKey::MinLength),
            Self::MaxLength => Some(ErrorMessageKey::MaxLength),
            Self::PatternMismatch => Some(ErrorMessageKey::Pattern),
            Self::InvalidEmail => Some(ErrorMessageKey::Email),
            Self::BeforeMinDate => Some(ErrorMessageKey::MinDate),
            Self::AfterMaxDate => Some(ErrorMessageKey::MaxDate),
            Self::BelowMin => Some(ErrorMessageKey::Min),
            Self::AboveMax => Some(ErrorMessageKey::Max),
            Self::InvalidOption => Some(ErrorMessageKey::InvalidOption),
            Self::TypeMismatch | Self::InvalidFormat | Self::NotANumber => None,
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// The constraint values a failure was measured against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FailureContext {
    /// The violated bound, already formatted (`8`, `18.5`, `1900-01-01`).
    pub limit: Option<String>,
    /// The pattern source for `PatternMismatch`.
    pub pattern: Option<String>,
    /// Permitted values for `InvalidOption`.
    pub options: Vec<String>,
}

/// One field's rejection.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationFailure {
    /// What went wrong.
    pub kind: FailureKind,
    /// The type of the field that failed.
    pub field_type: FieldType,
    /// The bound involved, if any.
    pub context: FailureContext,
    /// Schema-supplied message that replaces the catalog default.
    pub custom_message: Option<String>,
}

impl ValidationFailure {
    /// A failure with no context and no override.
    pub fn new(kind: FailureKind, field_type: FieldType) -> Self {
        Self {
            kind,
            field_type,
            context: FailureContext::default(),
            custom_message: None,
        }
    }

    /// Attach the violated bound.
    pub fn with_limit(mut self, limit: impl ToString) -> Self {
        self.context.limit = Some(limit.to_string());
        self
    }

    /// Attach the schema override, if present.
    pub fn with_override(mut self, message: Option<&str>) -> Self {
        self.custom_message = message.map(str::to_owned);
        self
    }
}
