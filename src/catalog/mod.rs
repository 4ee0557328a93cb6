//! In-memory catalog model, its wire codec and the deduplicating merge.

mod book;
mod codec;
mod merge;

pub use book::{
    normalize_title, validate_book_row, validate_field, BookRow, ValidationError, ValidationResult,
    FIELD_DELIMITER, UNKNOWN_AUTHOR,
};
pub use codec::{decode, decode_with_report, encode, CatalogSchema, DecodeStats};
pub use merge::{merge, MergeOutcome, MergeReport, RejectedRow, RejectionReason};

use std::collections::HashSet;

/// Ordered list of books, insertion order is display order.
///
/// Invariant: no two rows share a normalized title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    rows: Vec<BookRow>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog keeping the first occurrence of every title.
    pub fn from_rows(rows: impl IntoIterator<Item = BookRow>) -> Self {
        let mut seen = HashSet::new();
        let rows = rows
            .into_iter()
            .filter(|row| seen.insert(row.normalized_title()))
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[BookRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BookRow> {
        self.rows.iter()
    }

    pub fn contains_title(&self, title: &str) -> bool {
        let key = normalize_title(title);
        self.rows.iter().any(|row| row.normalized_title() == key)
    }

    /// Case-insensitive substring search over title, author and location.
    ///
    /// A blank query matches every row.
    pub fn search(&self, query: &str) -> Vec<&BookRow> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.rows.iter().collect();
        }
        self.rows.iter().filter(|row| row.matches(&needle)).collect()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a BookRow;
    type IntoIter = std::slice::Iter<'a, BookRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
