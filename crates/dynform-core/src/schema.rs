//! # Form Schema Model
//!
//! The static description of a form: a title plus an ordered list of field
//! definitions. These types deserialize directly from the camelCase JSON
//! document an operator uploads, e.g.
//!
//! ```json
//! {
//!   "title": "Registration",
//!   "fields": [
//!     { "name": "age", "label": "Age", "type": "number", "required": true,
//!       "validation": { "min": 18, "max": 120 },
//!       "errorMessages": { "min": "Too young" } }
//!   ]
//! }
//! ```
//!
//! `type` is kept as the raw string on [`FieldDefinition`] so that an
//! unsupported type surfaces as [`SchemaError::UnsupportedFieldType`] with
//! the field name attached, rather than as an opaque serde error.

use std::collections::HashSet;

use chrono::NaiveDate;
use fancy_regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// The date format accepted by date fields and date constraints.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` string into a calendar date.
///
/// Returns `None` for malformed strings and impossible dates (`2023-02-30`).
/// Month and day may be one or two digits; the year is exactly four. Signs
/// and surrounding whitespace are rejected before chrono sees the value,
/// since its numeric parser would skip them.
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    if !has_date_shape(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// `\d{4}-\d{1,2}-\d{1,2}`, ASCII digits only.
fn has_date_shape(value: &str) -> bool {
    let digits = |part: Option<&str>, min: usize, max: usize| {
        part.is_some_and(|p| {
            (min..=max).contains(&p.len()) && p.bytes().all(|b| b.is_ascii_digit())
        })
    };
    let mut parts = value.split('-');
    digits(parts.next(), 4, 4)
        && digits(parts.next(), 1, 2)
        && digits(parts.next(), 1, 2)
        && parts.next().is_none()
}

/// The six supported field kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Free text with optional length and pattern constraints.
    Text,
    /// An email address.
    Email,
    /// A password with optional length and pattern constraints.
    Password,
    /// A `YYYY-MM-DD` calendar date with optional bounds.
    Date,
    /// A floating-point number with optional bounds.
    Number,
    /// One value out of a declared option list.
    Dropdown,
}

impl FieldType {
    /// Every supported kind, in documentation order.
    pub const ALL: [FieldType; 6] = [
        Self::Text,
        Self::Email,
        Self::Password,
        Self::Date,
        Self::Number,
        Self::Dropdown,
    ];

    /// Returns the wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Password => "password",
            Self::Date => "date",
            Self::Number => "number",
            Self::Dropdown => "dropdown",
        }
    }

    /// Resolve a wire name into a kind. Matching is exact and case-sensitive.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-field constraint set. Unset constraints impose no limit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConstraint {
    /// Minimum length in characters (text, password).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
    /// Maximum length in characters (text, password).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    /// Inclusive lower bound (number).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Inclusive upper bound (number).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Earliest accepted date, `YYYY-MM-DD` (date).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_date: Option<String>,
    /// Latest accepted date, `YYYY-MM-DD` (date).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_date: Option<String>,
    /// Legacy flag from older schema documents. Accepted and ignored;
    /// email fields always validate their format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<bool>,
    /// Regular expression matched at the start of the value (text, password).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// Keys under which a schema may override a failure message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorMessageKey {
    /// Required field missing.
    Required,
    /// Text shorter than `minLength`.
    MinLength,
    /// Text longer than `maxLength`.
    MaxLength,
    /// Number below `min`.
    Min,
    /// Number above `max`.
    Max,
    /// Date before `minDate`.
    MinDate,
    /// Date after `maxDate`.
    MaxDate,
    /// Malformed email address.
    Email,
    /// Text not matching `pattern`.
    Pattern,
    /// Dropdown value outside the option list.
    InvalidOption,
}

impl ErrorMessageKey {
    /// Returns the camelCase key used in `errorMessages`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::MinLength => "minLength",
            Self::MaxLength => "maxLength",
            Self::Min => "min",
            Self::Max => "max",
            Self::MinDate => "minDate",
            Self::MaxDate => "maxDate",
            Self::Email => "email",
            Self::Pattern => "pattern",
            Self::InvalidOption => "invalidOption",
        }
    }
}

/// Optional per-failure message overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct FieldErrorMessages {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid_option: Option<String>,
}

impl FieldErrorMessages {
    /// Look up the override for a failure key. Empty strings count as unset.
    pub fn get(&self, key: ErrorMessageKey) -> Option<&str> {
        let slot = match key {
            ErrorMessageKey::Required => &self.required,
            ErrorMessageKey::MinLength => &self.min_length,
            ErrorMessageKey::MaxLength => &self.max_length,
            ErrorMessageKey::Min => &self.min,
            ErrorMessageKey::Max => &self.max,
            ErrorMessageKey::MinDate => &self.min_date,
            ErrorMessageKey::MaxDate => &self.max_date,
            ErrorMessageKey::Email => &self.email,
            ErrorMessageKey::Pattern => &self.pattern,
            ErrorMessageKey::InvalidOption => &self.invalid_option,
        };
        slot.as_deref().filter(|s| !s.is_empty())
    }
}

/// One selectable dropdown entry. Only `value` is compared; `label` is display-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropdownOption {
    /// Machine-readable token compared against submissions.
    pub value: String,
    /// Display text.
    pub label: String,
}

/// One named, typed, optionally constrained input slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    /// Unique, non-empty key within the schema.
    pub name: String,
    /// Display label.
    pub label: String,
    /// Raw type string; resolve with [`FieldDefinition::kind`].
    #[serde(rename = "type")]
    pub field_type: String,
    /// Whether absence is a failure.
    #[serde(default)]
    pub required: bool,
    /// Constraint set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldConstraint>,
    /// Message overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_messages: Option<FieldErrorMessages>,
    /// Dropdown options; required and non-empty for dropdown fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<DropdownOption>>,
}

impl FieldDefinition {
    /// Resolve the declared type.
    pub fn kind(&self) -> Result<FieldType, SchemaError> {
        FieldType::parse(&self.field_type).ok_or_else(|| SchemaError::UnsupportedFieldType {
            field: self.name.clone(),
            field_type: self.field_type.clone(),
        })
    }

    /// The `pattern` constraint compiled for matching.
    ///
    /// The source is wrapped as `\A(?:…)`: anchored at the start of the
    /// value only, so a trailing `$` is how an author demands a full match.
    /// Look-around and backreferences are supported.
    pub fn compiled_pattern(&self) -> Result<Option<Regex>, SchemaError> {
        let Some(source) = self.validation.as_ref().and_then(|c| c.pattern.as_deref()) else {
            return Ok(None);
        };
        Regex::new(&format!(r"\A(?:{source})"))
            .map(Some)
            .map_err(|e| SchemaError::InvalidPattern {
                field: self.name.clone(),
                reason: e.to_string(),
            })
    }

    /// Label of the option whose value equals `value`, if any.
    pub fn option_label(&self, value: &str) -> Option<&str> {
        self.options
            .as_deref()?
            .iter()
            .find(|o| o.value == value)
            .map(|o| o.label.as_str())
    }

    fn check_constraints(&self) -> Result<(), SchemaError> {
        let Some(c) = &self.validation else {
            return Ok(());
        };
        let invalid = |reason: String| SchemaError::InvalidConstraint {
            field: self.name.clone(),
            reason,
        };

        if let (Some(lo), Some(hi)) = (c.min_length, c.max_length) {
            if lo > hi {
                return Err(invalid(format!("minLength ({lo}) exceeds maxLength ({hi})")));
            }
        }
        if let (Some(lo), Some(hi)) = (c.min, c.max) {
            if lo > hi {
                return Err(invalid(format!("min ({lo}) exceeds max ({hi})")));
            }
        }

        let parse = |key: &str, raw: &Option<String>| -> Result<Option<NaiveDate>, SchemaError> {
            match raw {
                None => Ok(None),
                Some(s) => parse_iso_date(s)
                    .map(Some)
                    .ok_or_else(|| invalid(format!("{key} \"{s}\" is not a YYYY-MM-DD date"))),
            }
        };
        let min_date = parse("minDate", &c.min_date)?;
        let max_date = parse("maxDate", &c.max_date)?;
        if let (Some(lo), Some(hi)) = (min_date, max_date) {
            if lo > hi {
                return Err(invalid(format!("minDate ({lo}) is after maxDate ({hi})")));
            }
        }

        self.compiled_pattern()?;

        Ok(())
    }
}

/// A complete form definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    /// Display title; also the grouping key for statistics.
    pub title: String,
    /// Fields in declaration order.
    pub fields: Vec<FieldDefinition>,
}

impl FormSchema {
    /// Check every structural invariant of the schema.
    ///
    /// Fields are checked in declaration order and the first violation is
    /// returned: empty name, duplicate name, unsupported type, dropdown
    /// without options, then constraint coherence.
    pub fn check_invariants(&self) -> Result<(), SchemaError> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(self.fields.len());
        for (index, field) in self.fields.iter().enumerate() {
            if field.name.is_empty() {
                return Err(SchemaError::EmptyFieldName { index });
            }
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateFieldName(field.name.clone()));
            }
            let kind = field.kind()?;
            if kind == FieldType::Dropdown
                && field.options.as_ref().map_or(true, |opts| opts.is_empty())
            {
                return Err(SchemaError::MissingDropdownOptions(field.name.clone()));
            }
            field.check_constraints()?;
        }
        Ok(())
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, field_type: &str) -> FieldDefinition {
        FieldDefinition {
            name: name.to_string(),
            label: name.to_uppercase(),
            field_type: field_type.to_string(),
            required: false,
            validation: None,
            error_messages: None,
            options: None,
        }
    }

    fn schema(fields: Vec<FieldDefinition>) -> FormSchema {
        FormSchema {
            title: "Test Form".to_string(),
            fields,
        }
    }

    #[test]
    fn field_type_parse_roundtrips_all_kinds() {
        for kind in FieldType::ALL {
            assert_eq!(FieldType::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(FieldType::parse("Text"), None);
        assert_eq!(FieldType::parse("checkbox"), None);
    }

    #[test]
    fn deserializes_camel_case_document() {
        let doc = serde_json::json!({
            "title": "Registration",
            "fields": [{
                "name": "nickname",
                "label": "Nickname",
                "type": "text",
                "validation": { "minLength": 2, "maxLength": 10, "pattern": "[a-z]+" },
                "errorMessages": { "minLength": "too short", "invalidOption": "nope" }
            }]
        });
        let schema: FormSchema = serde_json::from_value(doc).unwrap();
        let f = &schema.fields[0];
        assert!(!f.required, "required defaults to false");
        let c = f.validation.as_ref().unwrap();
        assert_eq!(c.min_length, Some(2));
        assert_eq!(c.max_length, Some(10));
        assert_eq!(c.pattern.as_deref(), Some("[a-z]+"));
        let m = f.error_messages.as_ref().unwrap();
        assert_eq!(m.get(ErrorMessageKey::MinLength), Some("too short"));
        assert_eq!(m.get(ErrorMessageKey::InvalidOption), Some("nope"));
        assert_eq!(m.get(ErrorMessageKey::Required), None);
    }

    #[test]
    fn negative_min_length_is_a_deserialization_error() {
        let doc = serde_json::json!({
            "name": "x", "label": "X", "type": "text",
            "validation": { "minLength": -1 }
        });
        assert!(serde_json::from_value::<FieldDefinition>(doc).is_err());
    }

    #[test]
    fn empty_override_counts_as_unset() {
        let m = FieldErrorMessages {
            required: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(m.get(ErrorMessageKey::Required), None);
    }

    #[test]
    fn valid_schema_passes_invariants() {
        let mut country = field("country", "dropdown");
        country.options = Some(vec![DropdownOption {
            value: "israel".to_string(),
            label: "Israel".to_string(),
        }]);
        let s = schema(vec![field("name", "text"), country, field("age", "number")]);
        assert!(s.check_invariants().is_ok());
    }

    #[test]
    fn duplicate_names_rejected() {
        let s = schema(vec![field("name", "text"), field("name", "email")]);
        assert_eq!(
            s.check_invariants(),
            Err(SchemaError::DuplicateFieldName("name".to_string()))
        );
    }

    #[test]
    fn empty_name_rejected_with_index() {
        let s = schema(vec![field("ok", "text"), field("", "text")]);
        assert_eq!(
            s.check_invariants(),
            Err(SchemaError::EmptyFieldName { index: 1 })
        );
    }

    #[test]
    fn unsupported_type_rejected() {
        let s = schema(vec![field("agree", "checkbox")]);
        assert!(matches!(
            s.check_invariants(),
            Err(SchemaError::UnsupportedFieldType { ref field, ref field_type })
                if field == "agree" && field_type == "checkbox"
        ));
    }

    #[test]
    fn dropdown_without_options_rejected() {
        let s = schema(vec![field("country", "dropdown")]);
        assert_eq!(
            s.check_invariants(),
            Err(SchemaError::MissingDropdownOptions("country".to_string()))
        );

        let mut empty = field("country", "dropdown");
        empty.options = Some(vec![]);
        assert!(schema(vec![empty]).check_invariants().is_err());
    }

    #[test]
    fn inverted_numeric_bounds_rejected() {
        let mut age = field("age", "number");
        age.validation = Some(FieldConstraint {
            min: Some(120.0),
            max: Some(18.0),
            ..Default::default()
        });
        assert!(matches!(
            schema(vec![age]).check_invariants(),
            Err(SchemaError::InvalidConstraint { .. })
        ));
    }

    #[test]
    fn inverted_length_bounds_rejected() {
        let mut name = field("name", "text");
        name.validation = Some(FieldConstraint {
            min_length: Some(10),
            max_length: Some(3),
            ..Default::default()
        });
        assert!(schema(vec![name]).check_invariants().is_err());
    }

    #[test]
    fn unparseable_and_inverted_dates_rejected() {
        let mut bad = field("born", "date");
        bad.validation = Some(FieldConstraint {
            min_date: Some("01/01/1900".to_string()),
            ..Default::default()
        });
        assert!(schema(vec![bad]).check_invariants().is_err());

        let mut inverted = field("born", "date");
        inverted.validation = Some(FieldConstraint {
            min_date: Some("2020-12-31".to_string()),
            max_date: Some("1900-01-01".to_string()),
            ..Default::default()
        });
        assert!(schema(vec![inverted]).check_invariants().is_err());
    }

    #[test]
    fn invalid_pattern_rejected() {
        let mut name = field("name", "text");
        name.validation = Some(FieldConstraint {
            pattern: Some("([a-z".to_string()),
            ..Default::default()
        });
        assert!(matches!(
            schema(vec![name]).check_invariants(),
            Err(SchemaError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn lookahead_pattern_accepted() {
        let mut password = field("password", "password");
        password.validation = Some(FieldConstraint {
            pattern: Some(r"^(?=.*[a-z])(?=.*[A-Z])(?=.*\d)[a-zA-Z\d]{8,}$".to_string()),
            ..Default::default()
        });
        assert!(schema(vec![password.clone()]).check_invariants().is_ok());

        let re = password.compiled_pattern().unwrap().unwrap();
        assert!(re.is_match("Password1").unwrap());
        assert!(!re.is_match("password1").unwrap());
    }

    #[test]
    fn compiled_pattern_is_start_anchored() {
        let mut code = field("code", "text");
        code.validation = Some(FieldConstraint {
            pattern: Some("[0-9]{3}".to_string()),
            ..Default::default()
        });
        let re = code.compiled_pattern().unwrap().unwrap();
        assert!(re.is_match("123abc").unwrap());
        assert!(!re.is_match("abc123").unwrap());
        assert!(field("plain", "text").compiled_pattern().unwrap().is_none());
    }

    #[test]
    fn parse_iso_date_rejects_impossible_dates() {
        assert!(parse_iso_date("2024-02-29").is_some());
        assert!(parse_iso_date("2023-02-30").is_none());
        assert!(parse_iso_date("15/05/1990").is_none());
    }

    #[test]
    fn parse_iso_date_requires_bare_digits() {
        assert!(parse_iso_date("1990-5-3").is_some());
        assert!(parse_iso_date(" 1990-05-15").is_none());
        assert!(parse_iso_date("+1990-05-15").is_none());
        assert!(parse_iso_date("1990-05-15 ").is_none());
        assert!(parse_iso_date("1990- 5-15").is_none());
        assert!(parse_iso_date("01990-05-15").is_none());
        assert!(parse_iso_date("1990-05-15-01").is_none());
    }

    #[test]
    fn option_label_lookup() {
        let mut country = field("country", "dropdown");
        country.options = Some(vec![DropdownOption {
            value: "usa".to_string(),
            label: "United States".to_string(),
        }]);
        assert_eq!(country.option_label("usa"), Some("United States"));
        assert_eq!(country.option_label("uk"), None);
    }
}
