//! Natural-language questions about the library ("is Dune at home?").
//!
//! The whole catalog goes into the prompt, which is fine for a few hundred
//! books. The answer is free text for display only, it never feeds back into
//! the catalog.

use crate::catalog::Catalog;
use crate::llm::{CompletionOptions, LlmError, LlmProvider, Message};
use std::sync::Arc;
use tracing::info;

const SYSTEM_PROMPT: &str = "You help a person find books in their home library. \
You only know the books in the list you are given.";

pub struct LibraryAssistant {
    provider: Arc<dyn LlmProvider>,
    options: CompletionOptions,
}

impl LibraryAssistant {
    pub fn new(provider: Arc<dyn LlmProvider>, options: CompletionOptions) -> Self {
        Self { provider, options }
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// Whether the model endpoint answers at all.
    pub async fn health_check(&self) -> Result<(), LlmError> {
        self.provider.health_check().await
    }

    pub async fn ask(&self, catalog: &Catalog, question: &str) -> Result<String, LlmError> {
        info!(
            books = catalog.len(),
            model = self.provider.model(),
            "Asking the library assistant"
        );

        let messages = [
            Message::system(SYSTEM_PROMPT),
            Message::user(build_prompt(catalog, question)),
        ];
        let response = self.provider.complete(&messages, &self.options).await?;
        Ok(response.message.content.trim().to_string())
    }
}

fn build_prompt(catalog: &Catalog, question: &str) -> String {
    let listing = if catalog.is_empty() {
        "(the library is empty)".to_string()
    } else {
        catalog
            .iter()
            .map(|row| row.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "Below is the list of books in my library, one per line as \
         \"Title - Author [Location]\".\n\
         I will ask you about a book. Answer following these rules:\n\
         1. If the book is definitely in the list, say YES and tell me its location if known.\n\
         2. If it is not, but the list has other books by the same author, suggest those.\n\
         3. Otherwise politely say the book is not at home.\n\
         4. If the question is not about a specific book (e.g. \"how many books do I have\"), \
         answer it by analysing the list.\n\n\
         LIST:\n{listing}\n\n\
         QUESTION: {question}"
    )
}
