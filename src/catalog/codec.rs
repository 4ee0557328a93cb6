//! Delimited text codec for the catalog file.
//!
//! The file is UTF-8, one row per line, fields separated by `;`, with a header
//! line first. There is no quoting: a field holding the delimiter splits into
//! two fields on the next decode. Manual entries are validated against this
//! (see [`validate_book_row`](super::validate_book_row)), transcribed rows can
//! never contain it.

use super::book::{BookRow, FIELD_DELIMITER};
use super::Catalog;
use clap::ValueEnum;
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{debug, warn};

const TITLE_HEADER: &str = "Kitap Adı";
const AUTHOR_HEADER: &str = "Yazar";
const LOCATION_HEADER: &str = "Konum";

/// Column layout written to and forced onto the catalog file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CatalogSchema {
    /// `Kitap Adı;Yazar`
    TitleAuthor,
    /// `Kitap Adı;Yazar;Konum`
    #[default]
    TitleAuthorLocation,
}

impl CatalogSchema {
    pub fn field_count(&self) -> usize {
        match self {
            CatalogSchema::TitleAuthor => 2,
            CatalogSchema::TitleAuthorLocation => 3,
        }
    }

    pub fn has_location(&self) -> bool {
        matches!(self, CatalogSchema::TitleAuthorLocation)
    }

    pub fn header_fields(&self) -> &'static [&'static str] {
        match self {
            CatalogSchema::TitleAuthor => &[TITLE_HEADER, AUTHOR_HEADER],
            CatalogSchema::TitleAuthorLocation => &[TITLE_HEADER, AUTHOR_HEADER, LOCATION_HEADER],
        }
    }

    pub fn header_line(&self) -> String {
        self.header_fields().join(&FIELD_DELIMITER.to_string())
    }
}

/// What the decoder had to discard to produce a well-formed catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    pub rows: usize,
    /// Lines with fewer than two fields or an empty title.
    pub dropped_lines: usize,
    /// Rows that carried more fields than the schema, extra fields ignored.
    pub truncated_rows: usize,
    /// Rows whose title was already present earlier in the file.
    pub duplicate_rows: usize,
}

impl DecodeStats {
    pub fn is_degraded(&self) -> bool {
        self.dropped_lines > 0 || self.duplicate_rows > 0
    }
}

/// Decode a catalog payload, see [`decode_with_report`].
pub fn decode(bytes: &[u8], schema: CatalogSchema) -> Catalog {
    decode_with_report(bytes, schema).0
}

/// Decode a catalog payload, never failing.
///
/// An empty payload or a header-only file is an empty catalog. The header is
/// skipped without being interpreted: columns are always those of `schema`.
pub fn decode_with_report(bytes: &[u8], schema: CatalogSchema) -> (Catalog, DecodeStats) {
    let text = String::from_utf8_lossy(bytes);
    let text = text.trim_start_matches('\u{feff}');

    let mut stats = DecodeStats::default();
    let mut seen = HashSet::new();
    let mut rows = Vec::new();

    let mut lines = text.lines().filter(|line| !line.trim().is_empty());
    if let Some(header) = lines.next() {
        debug!(header = %header, "Skipping catalog header");
    }

    for line in lines {
        let fields: Vec<&str> = line.split(FIELD_DELIMITER).map(str::trim).collect();
        if fields.len() < 2 || fields[0].is_empty() {
            stats.dropped_lines += 1;
            continue;
        }
        if fields.len() > schema.field_count() {
            stats.truncated_rows += 1;
        }

        let location = if schema.has_location() {
            fields.get(2).map(|l| l.to_string())
        } else {
            None
        };
        let row = BookRow::new(fields[0], fields[1], location);

        if !seen.insert(row.normalized_title()) {
            stats.duplicate_rows += 1;
            continue;
        }
        rows.push(row);
    }

    stats.rows = rows.len();
    if stats.is_degraded() {
        warn!(
            dropped_lines = stats.dropped_lines,
            duplicate_rows = stats.duplicate_rows,
            "Catalog file contained malformed rows"
        );
    }

    (Catalog { rows }, stats)
}

/// Encode a catalog as header plus one line per row.
pub fn encode(catalog: &Catalog, schema: CatalogSchema) -> Vec<u8> {
    let delimiter = FIELD_DELIMITER.to_string();
    let mut out = schema.header_line();
    out.push('\n');

    for row in catalog.iter() {
        let mut fields = vec![row.title.as_str(), row.author.as_str()];
        if schema.has_location() {
            fields.push(row.location.as_deref().unwrap_or(""));
        }
        out.push_str(&fields.join(&delimiter));
        out.push('\n');
    }

    out.into_bytes()
}
