//! Parser for the raw text returned by the transcription model.
//!
//! The text is untrusted: prose, code fences, list markers and half-formed rows
//! all occur. Anything that is not a usable `Title;Author[;Location]` line is
//! set aside, never reported as an error.

use crate::catalog::{BookRow, FIELD_DELIMITER};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

lazy_static! {
    static ref FENCE_LINE: Regex = Regex::new(r"(?m)^[ \t]*```[A-Za-z0-9_+-]*[ \t]*$").unwrap();
    // Numbering like "1." is left alone, it is often part of the title.
    static ref LIST_MARKER: Regex = Regex::new(r"^[-*•]\s+").unwrap();
}

const HEADER_TITLES: [&str; 2] = ["kitap adı", "title"];
const HEADER_AUTHORS: [&str; 2] = ["yazar", "author"];

/// Raw model output and what could be salvaged from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TranscriptionResult {
    pub raw_text: String,
    /// Syntactically valid rows, in the order they appeared.
    pub candidates: Vec<BookRow>,
    /// Non-blank lines that did not yield a row.
    pub rejected_lines: Vec<String>,
}

impl TranscriptionResult {
    /// Nothing legible was found. A soft outcome, not a failure.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Parse raw transcription text into candidate rows.
pub fn parse_transcription(raw_text: &str) -> TranscriptionResult {
    // Fence lines may carry a language tag, stray markers elsewhere do not.
    let cleaned = FENCE_LINE.replace_all(raw_text, "").replace("```", "");

    let mut candidates = Vec::new();
    let mut rejected_lines = Vec::new();

    for line in cleaned.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_line(line) {
            Some(row) => candidates.push(row),
            None => rejected_lines.push(line.to_string()),
        }
    }

    debug!(
        candidates = candidates.len(),
        rejected = rejected_lines.len(),
        "Parsed transcription"
    );

    TranscriptionResult {
        raw_text: raw_text.to_string(),
        candidates,
        rejected_lines,
    }
}

fn parse_line(line: &str) -> Option<BookRow> {
    let line = LIST_MARKER.replace(line, "");
    let fields: Vec<&str> = line.split(FIELD_DELIMITER).map(str::trim).collect();

    let (title, author) = match fields.as_slice() {
        [title, author, ..] if !title.is_empty() && !author.is_empty() => (*title, *author),
        _ => return None,
    };
    if is_header(title, author) {
        return None;
    }

    let location = fields
        .get(2)
        .filter(|l| !l.is_empty())
        .map(|l| l.to_string());
    Some(BookRow::new(title, author, location))
}

fn is_header(title: &str, author: &str) -> bool {
    HEADER_TITLES.contains(&title.to_lowercase().as_str())
        && HEADER_AUTHORS.contains(&author.to_lowercase().as_str())
}
