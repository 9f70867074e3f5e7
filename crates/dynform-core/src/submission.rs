//! Submission payloads and the normalized result of validating one.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The raw, untrusted key/value map an end user submits.
pub type SubmissionPayload = serde_json::Map<String, serde_json::Value>;

/// A normalized field value after validation.
///
/// Numbers are coerced to `f64`; dates, emails, passwords, text and dropdown
/// tokens stay strings. `Empty` marks an optional field that was absent,
/// null or the empty string, and serializes as JSON `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// A finite number.
    Number(f64),
    /// Any string-valued field.
    Text(String),
    /// Optional field with no value.
    Empty,
}

impl FieldValue {
    /// The string content, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The numeric content, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Whether this is the explicit empty marker.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// The normalized output of a successful validation: one entry per declared
/// field, keyed by field name. Undeclared payload keys never appear here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidatedSubmission(BTreeMap<String, FieldValue>);

impl ValidatedSubmission {
    /// An empty submission.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the normalized value for a field.
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        self.0.insert(name.into(), value)
    }

    /// Look up a field's normalized value.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    /// Number of recorded fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no field was recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, FieldValue)> for ValidatedSubmission {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
