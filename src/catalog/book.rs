//! The book row entity and validation of manually entered rows.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Author placeholder used whenever the author is missing or illegible.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Field separator of the catalog wire format and of transcription output.
pub const FIELD_DELIMITER: char = ';';

/// A single book in the catalog.
///
/// `title` is the natural key. Two rows are the same book when their
/// [`normalized_title`](BookRow::normalized_title) match, regardless of author
/// or location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRow {
    pub title: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl BookRow {
    /// Build a row from already-clean parts.
    ///
    /// Fields are trimmed, an empty author becomes [`UNKNOWN_AUTHOR`] and an
    /// empty location becomes `None`. No validation is performed; use
    /// [`BookRow::validated`] for user input.
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        location: Option<String>,
    ) -> Self {
        let title = title.into().trim().to_string();
        let author = author.into().trim().to_string();
        let author = if author.is_empty() {
            UNKNOWN_AUTHOR.to_string()
        } else {
            author
        };
        let location = location
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());
        Self {
            title,
            author,
            location,
        }
    }

    /// Build a row from manual input, rejecting values the wire format cannot hold.
    pub fn validated(
        title: &str,
        author: Option<&str>,
        location: Option<&str>,
    ) -> ValidationResult<Self> {
        let row = Self::new(
            title,
            author.unwrap_or_default(),
            location.map(str::to_string),
        );
        validate_book_row(&row)?;
        Ok(row)
    }

    /// Identity key: lowercased, surrounding whitespace stripped.
    pub fn normalized_title(&self) -> String {
        normalize_title(&self.title)
    }

    /// Case-insensitive substring match against every field.
    pub fn matches(&self, needle_lowercase: &str) -> bool {
        self.title.to_lowercase().contains(needle_lowercase)
            || self.author.to_lowercase().contains(needle_lowercase)
            || self
                .location
                .as_deref()
                .is_some_and(|l| l.to_lowercase().contains(needle_lowercase))
    }
}

impl fmt::Display for BookRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} - {} [{}]", self.title, self.author, location),
            None => write!(f, "{} - {}", self.title, self.author),
        }
    }
}

pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Validation error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Field '{field}' is required but was empty")]
    EmptyField { field: &'static str },

    #[error("Field '{field}' contains the forbidden character {character:?}")]
    ForbiddenCharacter {
        field: &'static str,
        character: char,
    },
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::EmptyField { field } => field,
            ValidationError::ForbiddenCharacter { field, .. } => field,
        }
    }
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate a row before it is proposed for addition.
///
/// The catalog file has no escaping, so a delimiter or line break inside a
/// field would corrupt the row on the next load.
pub fn validate_book_row(row: &BookRow) -> ValidationResult<()> {
    if row.title.trim().is_empty() {
        return Err(ValidationError::EmptyField { field: "title" });
    }
    validate_field("title", &row.title)?;
    validate_field("author", &row.author)?;
    if let Some(location) = &row.location {
        validate_field("location", location)?;
    }
    Ok(())
}

/// Reject a value holding the delimiter or a line break.
pub fn validate_field(field: &'static str, value: &str) -> ValidationResult<()> {
    match value
        .chars()
        .find(|c| *c == FIELD_DELIMITER || *c == '\n' || *c == '\r')
    {
        Some(character) => Err(ValidationError::ForbiddenCharacter { field, character }),
        None => Ok(()),
    }
}
