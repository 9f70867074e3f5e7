//! # Validator Builder & Submission Validator
//!
//! [`SubmissionValidator::build`] compiles a [`FormSchema`] once;
//! [`SubmissionValidator::validate`] then checks any number of payloads
//! concurrently without mutation.

use std::collections::BTreeMap;

use dynform_core::{
    FieldValue, FormSchema, SchemaError, SubmissionPayload, ValidatedSubmission,
};
use serde_json::Value;

use crate::failure::{FailureKind, ValidationFailure};
use crate::fields::FieldRules;
use crate::messages::MessageCatalog;

/// A validator closed over one schema's compiled field list.
#[derive(Debug, Clone)]
pub struct SubmissionValidator {
    title: String,
    fields: Vec<FieldRules>,
}

impl SubmissionValidator {
    /// Build a validator, rejecting structurally invalid schemas.
    pub fn build(schema: &FormSchema) -> Result<Self, SchemaError> {
        schema.check_invariants()?;
        let fields = schema
            .fields
            .iter()
            .map(FieldRules::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            title: schema.title.clone(),
            fields,
        })
    }

    /// The form title this validator was built from.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Compiled fields in declaration order.
    pub fn fields(&self) -> &[FieldRules] {
        &self.fields
    }

    /// Validate a payload.
    ///
    /// Every declared field is checked in one pass; the error map holds the
    /// first failure of each failing field. Undeclared payload keys are
    /// ignored. Optional fields that are absent, `null` or `""` become
    /// [`FieldValue::Empty`].
    pub fn validate(&self, payload: &SubmissionPayload) -> Result<ValidatedSubmission, FieldErrors> {
        let mut data = ValidatedSubmission::new();
        let mut errors = FieldErrors::default();

        for field in &self.fields {
            let raw = payload.get(&field.name);
            let missing = matches!(raw, None | Some(Value::Null));
            let blank = matches!(raw, Some(Value::String(s)) if s.is_empty());

            let outcome = match raw {
                _ if !field.required && (missing || blank) => Ok(FieldValue::Empty),
                Some(value) if !missing => field.check(value),
                _ => Err(field.fail(FailureKind::Required)),
            };

            match outcome {
                Ok(value) => {
                    data.insert(field.name.clone(), value);
                }
                Err(failure) => errors.push(field.name.clone(), failure),
            }
        }

        if errors.is_empty() {
            Ok(data)
        } else {
            Err(errors)
        }
    }
}

/// Per-field failures from one validation call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldErrors(BTreeMap<String, Vec<ValidationFailure>>);

impl FieldErrors {
    fn push(&mut self, field: String, failure: ValidationFailure) {
        self.0.entry(field).or_default().push(failure);
    }

    /// Failures recorded for `field`.
    pub fn get(&self, field: &str) -> Option<&[ValidationFailure]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Names of the failing fields, sorted.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterate `(field, failures)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<ValidationFailure>)> {
        self.0.iter()
    }

    /// Number of failing fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no field failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render every failure through `catalog`: field → messages.
    pub fn render(&self, catalog: &dyn MessageCatalog) -> BTreeMap<String, Vec<String>> {
        self.0
            .iter()
            .map(|(field, failures)| {
                (
                    field.clone(),
                    failures.iter().map(|f| catalog.render(f)).collect(),
                )
            })
            .collect()
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} field(s) failed validation:", self.0.len())?;
        for (field, failures) in &self.0 {
            for failure in failures {
                write!(f, " {field}={}", failure.kind)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}
