//! Turning shelf photos into candidate book rows.

mod parser;
mod transcriber;

pub use parser::{parse_transcription, TranscriptionResult};
pub use transcriber::{
    shelf_instructions, LlmTranscriber, ShelfImage, Transcriber, TranscriptionError,
};
