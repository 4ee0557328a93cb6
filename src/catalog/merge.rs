//! Deduplicating append of candidate rows onto an existing catalog.
//!
//! First occurrence of a normalized title wins. Later occurrences, whether
//! already in the catalog or earlier in the same batch, are rejected and never
//! merged field by field. Rows the wire format cannot hold are rejected
//! before they can claim a title.

use super::book::{validate_book_row, BookRow};
use super::Catalog;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    AlreadyPresent,
    /// A field is empty or holds a delimiter or line break.
    Invalid { field: &'static str },
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::AlreadyPresent => write!(f, "already present"),
            RejectionReason::Invalid { field } => write!(f, "invalid {}", field),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRow {
    pub title: String,
    pub reason: RejectionReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Rows appended to the catalog, in input order.
    pub accepted: Vec<BookRow>,
    pub rejected: Vec<RejectedRow>,
}

impl MergeReport {
    pub fn has_changes(&self) -> bool {
        !self.accepted.is_empty()
    }

    pub fn duplicates(&self) -> usize {
        self.rejected
            .iter()
            .filter(|r| r.reason == RejectionReason::AlreadyPresent)
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub catalog: Catalog,
    pub report: MergeReport,
}

/// Merge `candidates` into `existing`.
///
/// The merged catalog is the existing rows followed by the accepted ones,
/// both in their original order.
pub fn merge(existing: &Catalog, candidates: impl IntoIterator<Item = BookRow>) -> MergeOutcome {
    let mut known: HashSet<String> = existing.iter().map(BookRow::normalized_title).collect();
    let mut report = MergeReport::default();

    for candidate in candidates {
        if let Err(e) = validate_book_row(&candidate) {
            debug!(title = %candidate.title, "Rejecting invalid candidate: {}", e);
            report.rejected.push(RejectedRow {
                title: candidate.title,
                reason: RejectionReason::Invalid { field: e.field() },
            });
            continue;
        }
        // Inserting right away also deduplicates within the batch.
        if known.insert(candidate.normalized_title()) {
            report.accepted.push(candidate);
        } else {
            debug!(title = %candidate.title, "Rejecting duplicate candidate");
            report.rejected.push(RejectedRow {
                title: candidate.title,
                reason: RejectionReason::AlreadyPresent,
            });
        }
    }

    let mut rows = Vec::with_capacity(existing.len() + report.accepted.len());
    rows.extend(existing.iter().cloned());
    rows.extend(report.accepted.iter().cloned());

    MergeOutcome {
        catalog: Catalog { rows },
        report,
    }
}
