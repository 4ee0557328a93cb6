//! Image-to-text transcription of bookshelf photos.

use crate::catalog::{ValidationError, UNKNOWN_AUTHOR};
use crate::llm::{CompletionOptions, FinishReason, ImageAttachment, LlmError, LlmProvider, Message};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("Not a supported image: {0}")]
    UnsupportedImage(String),

    #[error("Failed to read image: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid default location: {0}")]
    InvalidLocation(#[from] ValidationError),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// A photo of a shelf, with its detected MIME type.
#[derive(Debug, Clone)]
pub struct ShelfImage {
    bytes: Vec<u8>,
    mime_type: String,
}

impl ShelfImage {
    /// Wrap raw bytes, sniffing the format from the content.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, TranscriptionError> {
        let kind = infer::get(&bytes).ok_or_else(|| {
            TranscriptionError::UnsupportedImage("unrecognized file format".to_string())
        })?;
        if kind.matcher_type() != infer::MatcherType::Image {
            return Err(TranscriptionError::UnsupportedImage(format!(
                "{} is not an image",
                kind.mime_type()
            )));
        }
        Ok(Self {
            mime_type: kind.mime_type().to_string(),
            bytes,
        })
    }

    pub async fn load(path: &Path) -> Result<Self, TranscriptionError> {
        let bytes = tokio::fs::read(path).await?;
        Self::from_bytes(bytes)
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    fn to_attachment(&self) -> ImageAttachment {
        ImageAttachment {
            mime_type: self.mime_type.clone(),
            data: self.bytes.clone(),
        }
    }
}

/// Instructions sent with every shelf photo.
pub fn shelf_instructions() -> String {
    format!(
        "This is a photo of a bookshelf. Read the spine of every book you can see.\n\
         Answer ONLY with a list, one book per line, in the exact format:\n\
         Title;Author\n\
         Rules:\n\
         - Use a semicolon between title and author, never inside a title or author.\n\
         - If the author is not visible or you are not sure, write {unknown} as the author.\n\
         - No header line, no numbering, no bullet points, no markdown, no code blocks.\n\
         - No explanations before or after the list.\n\
         - If no spine is legible, answer with an empty message.",
        unknown = UNKNOWN_AUTHOR
    )
}

/// Anything that turns an image plus instructions into raw, untrusted text.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(
        &self,
        image: &ShelfImage,
        instructions: &str,
    ) -> Result<String, TranscriptionError>;
}

/// Transcriber backed by a multimodal chat model.
pub struct LlmTranscriber {
    provider: Arc<dyn LlmProvider>,
    options: CompletionOptions,
}

impl LlmTranscriber {
    pub fn new(provider: Arc<dyn LlmProvider>, options: CompletionOptions) -> Self {
        Self { provider, options }
    }
}

#[async_trait]
impl Transcriber for LlmTranscriber {
    async fn transcribe(
        &self,
        image: &ShelfImage,
        instructions: &str,
    ) -> Result<String, TranscriptionError> {
        info!(
            provider = self.provider.name(),
            model = self.provider.model(),
            mime_type = image.mime_type(),
            size = image.len(),
            "Transcribing shelf photo"
        );

        let messages = [Message::user_with_image(instructions, image.to_attachment())];
        let response = self.provider.complete(&messages, &self.options).await?;

        match response.finish_reason {
            FinishReason::Stop => {}
            FinishReason::MaxTokens => {
                warn!("Transcription hit the token limit, the list may be incomplete")
            }
            FinishReason::ContentFilter => warn!("Transcription was cut by the content filter"),
        }

        Ok(response.message.content)
    }
}
