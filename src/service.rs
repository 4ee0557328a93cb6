//! Catalog operations used by every front end.
//!
//! `CatalogService` ties the blob store, the codec and the merge engine
//! together. `ShelfScanner` turns a shelf photo into candidate rows that the
//! caller previews before handing them to [`CatalogService::add_rows`].

use crate::blob_store::{BlobStore, StoreError, WritePrecondition};
use crate::catalog::{
    decode_with_report, encode, merge, validate_field, BookRow, Catalog, CatalogSchema, DecodeStats, MergeReport,
};
use crate::transcription::{
    parse_transcription, shelf_instructions, ShelfImage, Transcriber, TranscriptionError,
    TranscriptionResult,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where the catalog returned by [`CatalogService::load_or_empty`] came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogOrigin {
    /// Decoded from the remote file.
    Remote,
    /// The remote file does not exist or is empty.
    Missing,
    /// The remote could not be reached; the catalog is empty.
    Unavailable(String),
}

#[derive(Debug, Clone)]
pub struct LoadedCatalog {
    pub catalog: Catalog,
    pub origin: CatalogOrigin,
    pub stats: DecodeStats,
}

impl LoadedCatalog {
    fn empty(origin: CatalogOrigin) -> Self {
        Self {
            catalog: Catalog::new(),
            origin,
            stats: DecodeStats::default(),
        }
    }
}

/// Decoded remote state plus what is needed to write it back safely.
struct Snapshot {
    catalog: Catalog,
    stats: DecodeStats,
    etag: Option<String>,
    found: bool,
}

pub struct CatalogService {
    store: Arc<dyn BlobStore>,
    schema: CatalogSchema,
    conditional_writes: bool,
}

impl CatalogService {
    pub fn new(store: Arc<dyn BlobStore>, schema: CatalogSchema, conditional_writes: bool) -> Self {
        Self {
            store,
            schema,
            conditional_writes,
        }
    }

    pub fn location(&self) -> &str {
        self.store.location()
    }

    pub fn schema(&self) -> CatalogSchema {
        self.schema
    }

    async fn snapshot(&self) -> Result<Snapshot, StoreError> {
        match self.store.fetch().await {
            Ok(blob) => {
                let (catalog, stats) = decode_with_report(&blob.bytes, self.schema);
                Ok(Snapshot {
                    catalog,
                    stats,
                    etag: blob.etag,
                    found: true,
                })
            }
            Err(StoreError::NotFound) => Ok(Snapshot {
                catalog: Catalog::new(),
                stats: DecodeStats::default(),
                etag: None,
                found: false,
            }),
            Err(e) => Err(e),
        }
    }

    /// Load the catalog. A missing remote file is an empty catalog, transport
    /// failures are returned to the caller.
    pub async fn load(&self) -> Result<Catalog, StoreError> {
        Ok(self.snapshot().await?.catalog)
    }

    /// Load for display: never fails, transport problems degrade to an empty
    /// catalog tagged [`CatalogOrigin::Unavailable`].
    pub async fn load_or_empty(&self) -> LoadedCatalog {
        match self.snapshot().await {
            Ok(snapshot) if snapshot.found => LoadedCatalog {
                catalog: snapshot.catalog,
                origin: CatalogOrigin::Remote,
                stats: snapshot.stats,
            },
            Ok(_) => LoadedCatalog::empty(CatalogOrigin::Missing),
            Err(e) => {
                warn!(location = self.location(), "Showing an empty catalog: {}", e);
                LoadedCatalog::empty(CatalogOrigin::Unavailable(e.to_string()))
            }
        }
    }

    /// Overwrite the remote file with `catalog`.
    pub async fn save(&self, catalog: &Catalog) -> Result<(), StoreError> {
        self.store
            .store(encode(catalog, self.schema), WritePrecondition::None)
            .await
    }

    /// Merge `candidates` into the remote catalog and write it back.
    ///
    /// Nothing is written when every candidate is rejected, or when the
    /// current catalog could not be read. With conditional writes enabled a
    /// concurrent change between read and write yields
    /// [`StoreError::Conflict`] and the remote is left untouched.
    pub async fn add_rows(
        &self,
        candidates: impl IntoIterator<Item = BookRow>,
    ) -> Result<MergeReport, StoreError> {
        let snapshot = self.snapshot().await?;
        let outcome = merge(&snapshot.catalog, candidates);

        info!(
            accepted = outcome.report.accepted.len(),
            rejected = outcome.report.rejected.len(),
            "Merged candidate rows"
        );

        if !outcome.report.has_changes() {
            debug!("No new rows, skipping write");
            return Ok(outcome.report);
        }

        let precondition = match snapshot.etag {
            Some(etag) if self.conditional_writes && snapshot.found => {
                WritePrecondition::IfMatch(etag)
            }
            _ => WritePrecondition::None,
        };

        self.store
            .store(encode(&outcome.catalog, self.schema), precondition)
            .await?;
        Ok(outcome.report)
    }

    /// Case-insensitive substring search over all fields. A blank query
    /// returns the whole catalog.
    pub async fn search(&self, query: &str) -> Result<Vec<BookRow>, StoreError> {
        let catalog = self.load().await?;
        Ok(catalog.search(query).into_iter().cloned().collect())
    }
}

pub struct ShelfScanner {
    transcriber: Arc<dyn Transcriber>,
}

impl ShelfScanner {
    pub fn new(transcriber: Arc<dyn Transcriber>) -> Self {
        Self { transcriber }
    }

    /// Transcribe `image` and parse the reply. Candidates without a location
    /// get `default_location`. An empty result is returned as is; nothing is
    /// written to the catalog.
    pub async fn scan(
        &self,
        image: &ShelfImage,
        default_location: Option<&str>,
    ) -> Result<TranscriptionResult, TranscriptionError> {
        let default_location = default_location.map(str::trim).filter(|l| !l.is_empty());
        if let Some(location) = default_location {
            validate_field("location", location)?;
        }

        let raw_text = self
            .transcriber
            .transcribe(image, &shelf_instructions())
            .await?;
        let mut result = parse_transcription(&raw_text);

        if let Some(location) = default_location {
            for row in result.candidates.iter_mut().filter(|r| r.location.is_none()) {
                row.location = Some(location.to_string());
            }
        }

        if result.is_empty() {
            warn!("No legible books found in the photo");
        } else {
            info!(
                candidates = result.candidates.len(),
                rejected_lines = result.rejected_lines.len(),
                "Scanned shelf photo"
            );
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob_store::MemoryBlobStore;
    use crate::catalog::{RejectionReason, ValidationError};
    use async_trait::async_trait;

    const SEED: &str = "Kitap Adı;Yazar;Konum\nDune;Frank Herbert;Salon\n";

    fn service(store: &Arc<MemoryBlobStore>) -> CatalogService {
        CatalogService::new(store.clone(), CatalogSchema::TitleAuthorLocation, true)
    }

    fn row(title: &str, author: &str) -> BookRow {
        BookRow::new(title, author, None)
    }

    #[tokio::test]
    async fn test_load_missing_is_empty() {
        let store = Arc::new(MemoryBlobStore::new());
        let catalog = service(&store).load().await.unwrap();
        assert!(catalog.is_empty());
    }

    #[tokio::test]
    async fn test_load_header_only_is_empty() {
        let store = Arc::new(MemoryBlobStore::with_contents("Kitap Adı;Yazar;Konum\n"));
        let catalog = service(&store).load().await.unwrap();
        assert!(catalog.is_empty());
    }

    #[tokio::test]
    async fn test_load_transport_error_is_returned() {
        let store = Arc::new(MemoryBlobStore::with_contents(SEED));
        store.set_offline(true);
        let err = service(&store).load().await.unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_load_or_empty_origins() {
        let store = Arc::new(MemoryBlobStore::with_contents(SEED));
        let svc = service(&store);

        let loaded = svc.load_or_empty().await;
        assert_eq!(loaded.origin, CatalogOrigin::Remote);
        assert_eq!(loaded.catalog.len(), 1);

        store.set_offline(true);
        let loaded = svc.load_or_empty().await;
        assert!(matches!(loaded.origin, CatalogOrigin::Unavailable(_)));
        assert!(loaded.catalog.is_empty());

        let missing = Arc::new(MemoryBlobStore::new());
        let loaded = service(&missing).load_or_empty().await;
        assert_eq!(loaded.origin, CatalogOrigin::Missing);
    }

    #[tokio::test]
    async fn test_add_rows_creates_file() {
        let store = Arc::new(MemoryBlobStore::new());
        let report = service(&store)
            .add_rows(vec![row("Dune", "Frank Herbert")])
            .await
            .unwrap();

        assert_eq!(report.accepted.len(), 1);
        assert_eq!(
            String::from_utf8(store.contents().unwrap()).unwrap(),
            "Kitap Adı;Yazar;Konum\nDune;Frank Herbert;\n"
        );
    }

    #[tokio::test]
    async fn test_add_rows_appends_after_existing() {
        let store = Arc::new(MemoryBlobStore::with_contents(SEED));
        let svc = service(&store);
        svc.add_rows(vec![row("1984", "George Orwell")]).await.unwrap();

        let titles: Vec<_> = svc
            .load()
            .await
            .unwrap()
            .iter()
            .map(|r| r.title.clone())
            .collect();
        assert_eq!(titles, vec!["Dune", "1984"]);
    }

    #[tokio::test]
    async fn test_within_batch_dedup() {
        let store = Arc::new(MemoryBlobStore::new());
        let report = service(&store)
            .add_rows(vec![
                row("Dune", "Frank Herbert"),
                row("dune", " Frank Herbert "),
            ])
            .await
            .unwrap();

        assert_eq!(report.accepted.len(), 1);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].reason, RejectionReason::AlreadyPresent);
    }

    #[tokio::test]
    async fn test_padded_title_is_duplicate() {
        let store = Arc::new(MemoryBlobStore::with_contents(SEED));
        let candidate = BookRow {
            title: "  Dune ".to_string(),
            author: "Someone Else".to_string(),
            location: None,
        };
        let report = service(&store).add_rows(vec![candidate]).await.unwrap();
        assert!(report.accepted.is_empty());
        assert_eq!(report.rejected[0].title, "  Dune ");
    }

    #[tokio::test]
    async fn test_invalid_rows_never_reach_the_file() {
        let store = Arc::new(MemoryBlobStore::new());
        let svc = service(&store);
        let report = svc
            .add_rows(vec![
                row("", "Nobody"),
                BookRow::new("Dune", "Frank Herbert", Some("Salon;Raf 2".to_string())),
            ])
            .await
            .unwrap();

        assert!(report.accepted.is_empty());
        assert_eq!(
            report.rejected[0].reason,
            RejectionReason::Invalid { field: "title" }
        );
        assert_eq!(
            report.rejected[1].reason,
            RejectionReason::Invalid { field: "location" }
        );
        assert_eq!(store.writes(), 0);

        let report = svc
            .add_rows(vec![
                BookRow::new("Dune", "Frank Herbert", Some("Salon\nRaf 2".to_string())),
                BookRow::new("Dune", "Frank Herbert", Some("Salon".to_string())),
            ])
            .await
            .unwrap();
        assert_eq!(report.accepted.len(), 1);
        assert_eq!(
            svc.load().await.unwrap().rows(),
            &[BookRow::new("Dune", "Frank Herbert", Some("Salon".to_string()))]
        );
    }

    #[tokio::test]
    async fn test_numbered_title_from_scan_is_a_duplicate() {
        let store = Arc::new(MemoryBlobStore::with_contents(
            "Kitap Adı;Yazar;Konum\n1. Dünya Savaşı;Norman Stone;Salon\n",
        ));
        let scanner = ShelfScanner::new(Arc::new(CannedTranscriber("1. Dünya Savaşı;Norman Stone")));
        let result = scanner.scan(&png(), None).await.unwrap();

        let report = service(&store).add_rows(result.candidates).await.unwrap();
        assert!(report.accepted.is_empty());
        assert_eq!(report.rejected[0].title, "1. Dünya Savaşı");
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_idempotent_re_add_does_not_write() {
        let store = Arc::new(MemoryBlobStore::new());
        let svc = service(&store);
        let batch = vec![row("Dune", "Frank Herbert"), row("1984", "George Orwell")];

        svc.add_rows(batch.clone()).await.unwrap();
        let after_first = store.contents();

        let report = svc.add_rows(batch).await.unwrap();
        assert!(report.accepted.is_empty());
        assert_eq!(report.rejected.len(), 2);
        assert_eq!(store.contents(), after_first);
        assert_eq!(store.writes(), 1);
    }

    #[tokio::test]
    async fn test_add_rows_aborts_when_offline() {
        let store = Arc::new(MemoryBlobStore::with_contents(SEED));
        store.set_offline(true);
        let err = service(&store)
            .add_rows(vec![row("1984", "George Orwell")])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Transport(_)));

        store.set_offline(false);
        assert_eq!(store.contents().unwrap(), SEED.as_bytes());
        assert_eq!(store.writes(), 0);
    }

    /// Simulates another writer between our read and our write.
    struct InterleavingStore {
        inner: MemoryBlobStore,
    }

    #[async_trait]
    impl BlobStore for InterleavingStore {
        fn location(&self) -> &str {
            "interleaving"
        }

        async fn fetch(&self) -> Result<crate::blob_store::Blob, StoreError> {
            let blob = self.inner.fetch().await;
            self.inner
                .overwrite(format!("{}Solaris;Stanisław Lem;\n", SEED));
            blob
        }

        async fn store(
            &self,
            bytes: Vec<u8>,
            precondition: WritePrecondition,
        ) -> Result<(), StoreError> {
            self.inner.store(bytes, precondition).await
        }
    }

    #[tokio::test]
    async fn test_concurrent_change_is_a_conflict() {
        let store = Arc::new(InterleavingStore {
            inner: MemoryBlobStore::with_contents(SEED),
        });
        let svc = CatalogService::new(store.clone(), CatalogSchema::TitleAuthorLocation, true);

        let err = svc
            .add_rows(vec![row("1984", "George Orwell")])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let contents = String::from_utf8(store.inner.contents().unwrap()).unwrap();
        assert!(contents.contains("Solaris"));
        assert!(!contents.contains("1984"));
    }

    #[tokio::test]
    async fn test_unconditional_writes_last_writer_wins() {
        let store = Arc::new(InterleavingStore {
            inner: MemoryBlobStore::with_contents(SEED),
        });
        let svc = CatalogService::new(store.clone(), CatalogSchema::TitleAuthorLocation, false);

        svc.add_rows(vec![row("1984", "George Orwell")])
            .await
            .unwrap();
        let contents = String::from_utf8(store.inner.contents().unwrap()).unwrap();
        assert!(contents.contains("1984"));
        assert!(!contents.contains("Solaris"));
    }

    #[tokio::test]
    async fn test_search() {
        let store = Arc::new(MemoryBlobStore::with_contents(format!(
            "{}1984;George Orwell;Yatak odası\n",
            SEED
        )));
        let svc = service(&store);

        let hits = svc.search("orwell").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "1984");

        let hits = svc.search("SALON").await.unwrap();
        assert_eq!(hits[0].title, "Dune");

        assert_eq!(svc.search("  ").await.unwrap().len(), 2);
        assert!(svc.search("tolstoy").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let store = Arc::new(MemoryBlobStore::with_contents(SEED));
        let svc = service(&store);
        svc.save(&Catalog::from_rows(vec![row("Solaris", "Stanisław Lem")]))
            .await
            .unwrap();

        let catalog = svc.load().await.unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.contains_title("solaris"));
    }

    struct CannedTranscriber(&'static str);

    #[async_trait]
    impl Transcriber for CannedTranscriber {
        async fn transcribe(
            &self,
            _image: &ShelfImage,
            instructions: &str,
        ) -> Result<String, TranscriptionError> {
            assert!(instructions.contains("Title;Author"));
            Ok(self.0.to_string())
        }
    }

    fn png() -> ShelfImage {
        ShelfImage::from_bytes(vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0]).unwrap()
    }

    #[tokio::test]
    async fn test_scan_drops_malformed_lines() {
        let scanner = ShelfScanner::new(Arc::new(CannedTranscriber(
            "Dune;Frank Herbert\nnot a valid line\n1984;George Orwell",
        )));
        let result = scanner.scan(&png(), None).await.unwrap();
        assert_eq!(result.candidates.len(), 2);
        assert_eq!(result.rejected_lines, vec!["not a valid line"]);
    }

    #[tokio::test]
    async fn test_scan_applies_default_location() {
        let scanner = ShelfScanner::new(Arc::new(CannedTranscriber(
            "Dune;Frank Herbert\n1984;George Orwell;Mutfak",
        )));
        let result = scanner.scan(&png(), Some(" Salon ")).await.unwrap();
        assert_eq!(result.candidates[0].location.as_deref(), Some("Salon"));
        assert_eq!(result.candidates[1].location.as_deref(), Some("Mutfak"));
    }

    #[tokio::test]
    async fn test_scan_rejects_invalid_default_location() {
        let scanner = ShelfScanner::new(Arc::new(CannedTranscriber("Dune;Frank Herbert")));
        let err = scanner.scan(&png(), Some("Salon;Raf 2")).await.unwrap_err();
        assert!(matches!(
            err,
            TranscriptionError::InvalidLocation(ValidationError::ForbiddenCharacter {
                field: "location",
                character: ';'
            })
        ));
    }

    #[tokio::test]
    async fn test_scan_nothing_legible() {
        let scanner = ShelfScanner::new(Arc::new(CannedTranscriber("  \n ")));
        let result = scanner.scan(&png(), Some("Salon")).await.unwrap();
        assert!(result.is_empty());
    }
}
