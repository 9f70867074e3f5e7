//! # dynform-validate: Schema-Driven Submission Validation
//!
//! Given a [`FormSchema`](dynform_core::FormSchema), build a
//! [`SubmissionValidator`] once and use it to check end-user payloads
//! field by field.
//!
//! ## Pipeline
//!
//! 1. **Build:** [`SubmissionValidator::build`] checks structural invariants
//!    and compiles every field into [`FieldRules`] (patterns, date bounds and
//!    option sets parsed once).
//! 2. **Gate:** per field, optional + absent/`null`/`""` short-circuits to
//!    the no-value marker; required + absent/`null` fails `Required`.
//! 3. **Dispatch:** the field's type selects a validator from the
//!    [`validator_for`] table; the first failure per field is kept.
//! 4. **Render:** [`FieldErrors::render`] turns structured failures into
//!    strings through a [`MessageCatalog`], with schema overrides first.

pub mod builder;
pub mod failure;
pub mod fields;
pub mod messages;

pub use builder::{FieldErrors, SubmissionValidator};
pub use failure::{FailureContext, FailureKind, ValidationFailure};
pub use fields::{validator_for, FieldRules, FieldValidatorFn};
pub use messages::{English, Hebrew, Locale, MessageCatalog, UnknownLocale};
