//! # Shape Checking
//!
//! Validates an untyped JSON document against the embedded form meta-schema
//! before any typed deserialization happens, so operators get a complete list
//! of structural problems with JSON Pointers instead of serde's first error.

use serde_json::Value;

/// The embedded form meta-schema (Draft 2020-12).
pub const FORM_META_SCHEMA: &str = include_str!("../schemas/form.schema.json");

/// One meta-schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeViolation {
    /// JSON Pointer to the offending value (empty for the document root).
    pub pointer: String,
    /// Human-readable description.
    pub message: String,
}

impl std::fmt::Display for ShapeViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.pointer.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.pointer, self.message)
        }
    }
}

/// A compiled meta-schema validator.
pub struct ShapeChecker {
    validator: jsonschema::Validator,
}

impl std::fmt::Debug for ShapeChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShapeChecker").finish_non_exhaustive()
    }
}

impl ShapeChecker {
    /// Compile the embedded meta-schema.
    ///
    /// Fails only if the embedded document itself is broken.
    pub fn compile() -> Result<Self, String> {
        let schema: Value = serde_json::from_str(FORM_META_SCHEMA)
            .map_err(|e| format!("form meta-schema is not valid JSON: {e}"))?;
        let validator = jsonschema::options()
            .with_draft(jsonschema::Draft::Draft202012)
            .build(&schema)
            .map_err(|e| format!("form meta-schema failed to compile: {e}"))?;
        Ok(Self { validator })
    }

    /// Collect every violation of the meta-schema. Empty means well-shaped.
    pub fn violations(&self, document: &Value) -> Vec<ShapeViolation> {
        self.validator
            .iter_errors(document)
            .map(|err| ShapeViolation {
                pointer: err.instance_path.to_string(),
                message: err.to_string(),
            })
            .collect()
    }
}
