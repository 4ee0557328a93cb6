//! Commands shared by the one-shot binary and the interactive shell.

use crate::assistant::LibraryAssistant;
use crate::blob_store::{BlobStore, StoreError, WebDavBlobStore};
use crate::catalog::{BookRow, CatalogSchema, MergeReport};
use crate::cli_style::{
    print_empty_list, print_info, print_key_value, print_list_item, print_success,
    print_warning, TableBuilder,
};
use crate::config::{AppConfig, CliConfig, FileConfig};
use crate::llm::LlmProvider;
use crate::service::{CatalogOrigin, CatalogService, LoadedCatalog, ShelfScanner};
use crate::transcription::{LlmTranscriber, ShelfImage};
use anyhow::{anyhow, Context, Result};
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Flags shared by both binaries. A `--config` file overrides them.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Path to a TOML config file. Values in the file override flags.
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// URL of the catalog file on the WebDAV share.
    #[arg(long)]
    pub catalog_url: Option<String>,

    /// Basic auth user for the WebDAV share.
    #[arg(long, short)]
    pub username: Option<String>,

    /// Basic auth password for the WebDAV share.
    #[arg(long, env = "HOME_LIBRARY_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Column layout of the catalog file.
    #[arg(long)]
    pub schema: Option<CatalogSchema>,

    /// Timeout for each request to the WebDAV share, in seconds.
    #[arg(long)]
    pub request_timeout_sec: Option<u64>,

    /// Base URL of an OpenAI-compatible API used for scan and ask.
    #[arg(long)]
    pub llm_base_url: Option<String>,

    /// Model used for scan and ask. It must accept images.
    #[arg(long)]
    pub llm_model: Option<String>,

    /// API key for the LLM endpoint.
    #[arg(long, env = "HOME_LIBRARY_LLM_API_KEY", hide_env_values = true)]
    pub llm_api_key: Option<String>,
}

impl ConnectionArgs {
    /// Load the optional config file and resolve it against the flags.
    pub fn resolve(&self) -> Result<AppConfig> {
        let file_config = match &self.config {
            Some(path) => Some(FileConfig::load(path)?),
            None => None,
        };
        let cli = CliConfig {
            catalog_url: self.catalog_url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            schema: self.schema,
            request_timeout_sec: self.request_timeout_sec,
            llm_base_url: self.llm_base_url.clone(),
            llm_model: self.llm_model.clone(),
            llm_api_key: self.llm_api_key.clone(),
        };
        AppConfig::resolve(&cli, file_config).context("Invalid configuration")
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum LibraryCommand {
    /// Shows every book in the catalog.
    List,

    /// Finds books whose title, author or location contains the query
    /// (case-insensitive).
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Adds a single book. The author defaults to "Unknown".
    Add {
        title: String,
        author: Option<String>,
        /// Shelf or room where the book is kept.
        #[arg(short, long)]
        location: Option<String>,
    },

    /// Reads the spines in a bookshelf photo. Shows the books found, and adds
    /// them to the catalog with --commit.
    Scan {
        image: PathBuf,
        /// Location given to every book found without one.
        #[arg(short, long)]
        location: Option<String>,
        #[arg(long)]
        commit: bool,
    },

    /// Asks a question about the library in plain language.
    Ask {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Shows where the catalog is stored.
    Where,
}

pub struct LibraryContext {
    service: CatalogService,
    scanner: Option<ShelfScanner>,
    assistant: Option<LibraryAssistant>,
}

impl LibraryContext {
    pub fn new(
        service: CatalogService,
        scanner: Option<ShelfScanner>,
        assistant: Option<LibraryAssistant>,
    ) -> Self {
        Self {
            service,
            scanner,
            assistant,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let store: Arc<dyn BlobStore> = Arc::new(
            WebDavBlobStore::new(config.webdav_config())
                .context("Failed to set up the catalog store")?,
        );
        let service = CatalogService::new(store, config.schema, config.conditional_writes);

        if !config.transcription.is_enabled() {
            debug!("No LLM configured, scan and ask are disabled");
            return Ok(Self::new(service, None, None));
        }

        let provider: Arc<dyn LlmProvider> = Arc::new(config.transcription.provider());
        let options = config.transcription.completion_options();
        let transcriber = Arc::new(LlmTranscriber::new(provider.clone(), options.clone()));

        Ok(Self::new(
            service,
            Some(ShelfScanner::new(transcriber)),
            Some(LibraryAssistant::new(provider, options)),
        ))
    }

    pub fn service(&self) -> &CatalogService {
        &self.service
    }

    pub async fn execute(&self, command: LibraryCommand) -> Result<()> {
        match command {
            LibraryCommand::List => {
                let loaded = self.load_for_display().await;
                let rows: Vec<&BookRow> = loaded.catalog.iter().collect();
                print_books(&rows, self.service.schema(), "The library is empty");
            }
            LibraryCommand::Search { query } => {
                let query = query.join(" ");
                let loaded = self.load_for_display().await;
                let hits = loaded.catalog.search(&query);
                print_books(
                    &hits,
                    self.service.schema(),
                    &format!("No book matches '{}'", query),
                );
            }
            LibraryCommand::Add {
                title,
                author,
                location,
            } => {
                let row = BookRow::validated(&title, author.as_deref(), location.as_deref())
                    .map_err(|e| anyhow!("Invalid book: {}", e))?;
                if row.location.is_some() && !self.service.schema().has_location() {
                    print_warning("The catalog has no location column, the location is not stored");
                }
                let report = self.add(vec![row]).await?;
                print_merge_report(&report);
            }
            LibraryCommand::Scan {
                image,
                location,
                commit,
            } => self.scan(&image, location, commit).await?,
            LibraryCommand::Ask { question } => {
                let assistant = self.assistant.as_ref().ok_or_else(llm_not_configured)?;
                let loaded = self.load_for_display().await;
                let answer = assistant
                    .ask(&loaded.catalog, &question.join(" "))
                    .await
                    .context("The assistant could not answer")?;
                println!();
                println!("{}", answer);
                println!();
            }
            LibraryCommand::Where => {
                print_key_value("Catalog", self.service.location());
                print_key_value("Schema", &self.service.schema().header_line());
                let llm_status = match &self.assistant {
                    None => "not configured".to_string(),
                    Some(assistant) => match assistant.health_check().await {
                        Ok(()) => format!("reachable ({})", assistant.model()),
                        Err(e) => format!("unreachable: {}", e),
                    },
                };
                print_key_value("LLM", &llm_status);
            }
        }
        Ok(())
    }

    async fn scan(&self, path: &Path, location: Option<String>, commit: bool) -> Result<()> {
        let scanner = self.scanner.as_ref().ok_or_else(llm_not_configured)?;
        let image = ShelfImage::load(path)
            .await
            .with_context(|| format!("Could not read {:?}", path))?;

        let result = scanner
            .scan(&image, location.as_deref())
            .await
            .context("Transcription failed")?;

        if result.is_empty() {
            print_warning("No legible books were found in the photo");
            return Ok(());
        }

        let rows: Vec<&BookRow> = result.candidates.iter().collect();
        print_books(&rows, self.service.schema(), "");
        if !result.rejected_lines.is_empty() {
            print_info(&format!(
                "{} line(s) of the transcription were not usable",
                result.rejected_lines.len()
            ));
        }

        if commit {
            let report = self.add(result.candidates).await?;
            print_merge_report(&report);
        } else {
            print_info("Preview only, run again with --commit to add these books");
        }
        Ok(())
    }

    async fn add(&self, rows: Vec<BookRow>) -> Result<MergeReport> {
        self.service.add_rows(rows).await.map_err(|e| match e {
            StoreError::Conflict(_) => {
                anyhow!("The catalog changed while adding, nothing was written. Try again.")
            }
            e => anyhow::Error::new(e).context("Nothing was written"),
        })
    }

    async fn load_for_display(&self) -> LoadedCatalog {
        let loaded = self.service.load_or_empty().await;
        match &loaded.origin {
            CatalogOrigin::Remote => {}
            CatalogOrigin::Missing => print_info("The catalog file does not exist yet"),
            CatalogOrigin::Unavailable(reason) => {
                print_warning(&format!("Could not load the catalog: {}", reason))
            }
        }
        if loaded.stats.is_degraded() {
            print_warning(&format!(
                "Skipped {} malformed and {} duplicate line(s) in the catalog file",
                loaded.stats.dropped_lines, loaded.stats.duplicate_rows
            ));
        }
        loaded
    }
}

fn llm_not_configured() -> anyhow::Error {
    anyhow!("No LLM is configured, set an API key or [transcription] in the config file")
}

fn books_table(rows: &[&BookRow], schema: CatalogSchema) -> TableBuilder {
    let mut headers = vec!["Title", "Author"];
    if schema.has_location() {
        headers.push("Location");
    }
    let mut table = TableBuilder::new(&headers);
    for row in rows {
        table.add_row(&[
            row.title.as_str(),
            row.author.as_str(),
            row.location.as_deref().unwrap_or(""),
        ]);
    }
    table
}

fn print_books(rows: &[&BookRow], schema: CatalogSchema, empty_message: &str) {
    if rows.is_empty() {
        print_empty_list(empty_message);
        return;
    }
    books_table(rows, schema).print();
    println!("  {} book(s)", rows.len());
}

fn print_merge_report(report: &MergeReport) {
    for row in &report.accepted {
        print_success(&format!("Added {}", row));
    }
    for rejected in &report.rejected {
        print_list_item(&format!("{}: {}", rejected.title, rejected.reason), 1);
    }
    let duplicates = report.duplicates();
    if duplicates > 0 {
        print_warning(&format!(
            "{} book(s) skipped, already in the catalog",
            duplicates
        ));
    }
    let invalid = report.rejected.len() - duplicates;
    if invalid > 0 {
        print_warning(&format!(
            "{} book(s) skipped, a field is empty or holds ';' or a line break",
            invalid
        ));
    }
}
