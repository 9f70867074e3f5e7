//! # Field Type Validators
//!
//! One validator per [`FieldType`], all with the same signature:
//! `(raw, rules) → Result<FieldValue, ValidationFailure>`. [`FieldRules`]
//! is the compiled form of a [`FieldDefinition`]: patterns and date bounds
//! are parsed once when the validator is built, never per submission.
//! Schema patterns use `fancy-regex` so look-around is available; the fixed
//! email pattern stays on the linear-time `regex` engine.
//!
//! Each validator checks in a fixed order and stops at the first failure.

use chrono::NaiveDate;
use dynform_core::{
    parse_iso_date, ErrorMessageKey, FieldConstraint, FieldDefinition, FieldErrorMessages,
    FieldType, FieldValue, SchemaError,
};
use regex::Regex;
use serde_json::Value;

use crate::failure::{FailureKind, ValidationFailure};

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

/// Signature shared by every field validator.
pub type FieldValidatorFn = fn(&Value, &FieldRules) -> Result<FieldValue, ValidationFailure>;

/// The dispatch table: field type → validator.
pub fn validator_for(kind: FieldType) -> FieldValidatorFn {
    match kind {
        FieldType::Text => validate_text,
        FieldType::Email => validate_email,
        FieldType::Password => validate_password,
        FieldType::Date => validate_date,
        FieldType::Number => validate_number,
        FieldType::Dropdown => validate_dropdown,
    }
}

/// A field definition compiled for repeated validation.
#[derive(Debug, Clone)]
pub struct FieldRules {
    /// Field name.
    pub name: String,
    /// Resolved type.
    pub kind: FieldType,
    /// Whether absence fails with `Required`.
    pub required: bool,
    constraints: FieldConstraint,
    messages: FieldErrorMessages,
    email: Option<Regex>,
    pattern: Option<fancy_regex::Regex>,
    min_date: Option<NaiveDate>,
    max_date: Option<NaiveDate>,
    options: Vec<String>,
}

impl FieldRules {
    /// Compile a single field definition.
    pub fn compile(def: &FieldDefinition) -> Result<Self, SchemaError> {
        let kind = def.kind()?;
        let constraints = def.validation.clone().unwrap_or_default();

        let email = match kind {
            FieldType::Email => Some(Regex::new(EMAIL_PATTERN).map_err(|e| {
                SchemaError::InvalidPattern {
                    field: def.name.clone(),
                    reason: e.to_string(),
                }
            })?),
            _ => None,
        };
        let pattern = match kind {
            FieldType::Text | FieldType::Password => def.compiled_pattern()?,
            _ => None,
        };

        let date_bound = |raw: &Option<String>| -> Result<Option<NaiveDate>, SchemaError> {
            match raw {
                None => Ok(None),
                Some(s) => parse_iso_date(s).map(Some).ok_or_else(|| {
                    SchemaError::InvalidConstraint {
                        field: def.name.clone(),
                        reason: format!("\"{s}\" is not a YYYY-MM-DD date"),
                    }
                }),
            }
        };
        let (min_date, max_date) = if kind == FieldType::Date {
            (date_bound(&constraints.min_date)?, date_bound(&constraints.max_date)?)
        } else {
            (None, None)
        };

        let options = def
            .options
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|o| o.value.clone())
            .collect();

        Ok(Self {
            name: def.name.clone(),
            kind,
            required: def.required,
            constraints,
            messages: def.error_messages.clone().unwrap_or_default(),
            email,
            pattern,
            min_date,
            max_date,
            options,
        })
    }

    /// Run this field's type validator.
    pub fn check(&self, raw: &Value) -> Result<FieldValue, ValidationFailure> {
        validator_for(self.kind)(raw, self)
    }

    /// A failure of `kind` for this field, with the schema override attached.
    pub fn fail(&self, kind: FailureKind) -> ValidationFailure {
        let custom = kind
            .override_key()
            .and_then(|key: ErrorMessageKey| self.messages.get(key));
        ValidationFailure::new(kind, self.kind).with_override(custom)
    }
}

fn expect_str<'a>(raw: &'a Value, rules: &FieldRules) -> Result<&'a str, ValidationFailure> {
    raw.as_str()
        .ok_or_else(|| rules.fail(FailureKind::TypeMismatch))
}

/// Length and pattern checks shared by text and password.
fn check_length_and_pattern(value: &str, rules: &FieldRules) -> Result<(), ValidationFailure> {
    let len = value.chars().count();
    if let Some(min) = rules.constraints.min_length {
        if len < min as usize {
            return Err(rules.fail(FailureKind::MinLength).with_limit(min));
        }
    }
    if let Some(max) = rules.constraints.max_length {
        if len > max as usize {
            return Err(rules.fail(FailureKind::MaxLength).with_limit(max));
        }
    }
    if let Some(re) = &rules.pattern {
        // A match that exhausts the backtracking budget counts as a miss.
        if !re.is_match(value).unwrap_or(false) {
            let mut failure = rules.fail(FailureKind::PatternMismatch);
            failure.context.pattern = rules.constraints.pattern.clone();
            return Err(failure);
        }
    }
    Ok(())
}

/// Text: type → minLength → maxLength → pattern.
pub fn validate_text(raw: &Value, rules: &FieldRules) -> Result<FieldValue, ValidationFailure> {
    let value = expect_str(raw, rules)?;
    check_length_and_pattern(value, rules)?;
    Ok(FieldValue::Text(value.to_owned()))
}

/// Password: same checks as text, separate default pattern message.
pub fn validate_password(raw: &Value, rules: &FieldRules) -> Result<FieldValue, ValidationFailure> {
    validate_text(raw, rules)
}

/// Email: type → address format.
pub fn validate_email(raw: &Value, rules: &FieldRules) -> Result<FieldValue, ValidationFailure> {
    let value = expect_str(raw, rules)?;
    match &rules.email {
        Some(re) if re.is_match(value) => Ok(FieldValue::Text(value.to_owned())),
        _ => Err(rules.fail(FailureKind::InvalidEmail)),
    }
}

/// Date: type → `YYYY-MM-DD` → minDate → maxDate. Returns the input string.
pub fn validate_date(raw: &Value, rules: &FieldRules) -> Result<FieldValue, ValidationFailure> {
    let value = expect_str(raw, rules)?;
    let date = parse_iso_date(value).ok_or_else(|| rules.fail(FailureKind::InvalidFormat))?;
    if let Some(min) = rules.min_date {
        if date < min {
            return Err(rules.fail(FailureKind::BeforeMinDate).with_limit(min));
        }
    }
    if let Some(max) = rules.max_date {
        if date > max {
            return Err(rules.fail(FailureKind::AfterMaxDate).with_limit(max));
        }
    }
    Ok(FieldValue::Text(value.to_owned()))
}

/// Number: JSON number or numeric string (whitespace trimmed) → min → max.
/// Returns the parsed float.
pub fn validate_number(raw: &Value, rules: &FieldRules) -> Result<FieldValue, ValidationFailure> {
    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    let value = parsed
        .filter(|n| n.is_finite())
        .ok_or_else(|| rules.fail(FailureKind::NotANumber))?;

    if let Some(min) = rules.constraints.min {
        if value < min {
            return Err(rules.fail(FailureKind::BelowMin).with_limit(min));
        }
    }
    if let Some(max) = rules.constraints.max {
        if value > max {
            return Err(rules.fail(FailureKind::AboveMax).with_limit(max));
        }
    }
    Ok(FieldValue::Number(value))
}

/// Dropdown: type → membership in the option values. Returns the input.
pub fn validate_dropdown(raw: &Value, rules: &FieldRules) -> Result<FieldValue, ValidationFailure> {
    let value = expect_str(raw, rules)?;
    if rules.options.iter().any(|o| o == value) {
        Ok(FieldValue::Text(value.to_owned()))
    } else {
        let mut failure = rules.fail(FailureKind::InvalidOption);
        failure.context.options = rules.options.clone();
        Err(failure)
    }
}
