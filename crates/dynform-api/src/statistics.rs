//! Submission statistics grouped by form title.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::store::StoredSubmission;

/// Aggregate counts over every stored submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Statistics {
    pub total_submissions: usize,
    /// Number of distinct form titles.
    pub total_forms: usize,
    /// Most submitted first; ties ordered by title.
    pub forms: Vec<FormStatistics>,
}

/// Submissions for one form title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FormStatistics {
    pub title: String,
    pub count: usize,
    /// Field labels as captured by the most recent submission.
    pub fields: Vec<FieldStatistics>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldStatistics {
    pub label: String,
}

/// Summarize `submissions`.
pub fn statistics(submissions: &[StoredSubmission]) -> Statistics {
    let mut groups: BTreeMap<&str, (usize, &StoredSubmission)> = BTreeMap::new();
    for submission in submissions {
        groups
            .entry(submission.form_title.as_str())
            .and_modify(|(count, latest)| {
                *count += 1;
                if (submission.submitted_at, submission.id) > (latest.submitted_at, latest.id) {
                    *latest = submission;
                }
            })
            .or_insert((1, submission));
    }

    let mut forms: Vec<FormStatistics> = groups
        .into_iter()
        .map(|(title, (count, latest))| FormStatistics {
            title: title.to_string(),
            count,
            fields: latest
                .fields_mapping
                .fields_mapping
                .iter()
                .map(|f| FieldStatistics {
                    label: f.label.clone(),
                })
                .collect(),
        })
        .collect();
    // Stable sort keeps the BTreeMap's title order among equal counts.
    forms.sort_by(|a, b| b.count.cmp(&a.count));

    Statistics {
        total_submissions: submissions.len(),
        total_forms: forms.len(),
        forms,
    }
}
