//! Content-addressed deduplication of validated submissions.

use crate::canonical::CanonicalBytes;
use crate::digest::{sha256_digest, Fingerprint};
use crate::error::CanonicalizationError;
use crate::submission::ValidatedSubmission;

/// Compute the fingerprint of a validated submission.
///
/// The result depends only on the set of key/value pairs, never on the order
/// they were inserted.
pub fn fingerprint(data: &ValidatedSubmission) -> Result<Fingerprint, CanonicalizationError> {
    let canonical = CanonicalBytes::new(data)?;
    Ok(sha256_digest(&canonical))
}

/// True iff `data`'s fingerprint is among `existing`.
///
/// Callers must pass the full persisted history; a session-local set misses
/// duplicates submitted by earlier processes.
pub fn is_duplicate<'a>(
    data: &ValidatedSubmission,
    existing: impl IntoIterator<Item = &'a Fingerprint>,
) -> Result<bool, CanonicalizationError> {
    let fp = fingerprint(data)?;
    Ok(existing.into_iter().any(|seen| *seen == fp))
}
