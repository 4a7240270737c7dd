mod common;

use std::io::{self, Read};

use async_trait::async_trait;
use book_catalog_core::domain::{
    BookDetail, BookSnapshot, BookToneRecommendation, Bookshelf, BookshelfGrouping,
    BookshelfGroupingDraft, ImportedBook, NewBookToneRecommendation, NewTone, ReviewEntry,
    SavedImport, Tone,
};
use book_catalog_core::import::import_goodreads_csv;
use book_catalog_core::{CatalogStore, ImportError, InMemoryCatalog, PortError, PortResult};
use common::{export_csv, import_rows, options, ExportRow};
use uuid::Uuid;

/// Delegates to the in-memory store but refuses to save one title.
struct RejectingStore {
    inner: InMemoryCatalog,
    rejected_title: &'static str,
}

#[async_trait]
impl CatalogStore for RejectingStore {
    async fn load_import_snapshot(&self) -> PortResult<Vec<BookSnapshot>> {
        self.inner.load_import_snapshot().await
    }

    async fn list_bookshelves(&self) -> PortResult<Vec<Bookshelf>> {
        self.inner.list_bookshelves().await
    }

    async fn create_bookshelf(&self, name: &str) -> PortResult<Bookshelf> {
        self.inner.create_bookshelf(name).await
    }

    async fn save_imported_book(&self, imported: ImportedBook) -> PortResult<SavedImport> {
        if imported.book.title == self.rejected_title {
            return Err(PortError::Unexpected("connection reset".to_string()));
        }
        self.inner.save_imported_book(imported).await
    }

    async fn delete_book(&self, book_id: Uuid) -> PortResult<()> {
        self.inner.delete_book(book_id).await
    }

    async fn delete_bookshelves(&self, bookshelf_ids: &[Uuid]) -> PortResult<u64> {
        self.inner.delete_bookshelves(bookshelf_ids).await
    }

    async fn get_book(&self, book_id: Uuid) -> PortResult<BookDetail> {
        self.inner.get_book(book_id).await
    }

    async fn list_review_entries(&self) -> PortResult<Vec<ReviewEntry>> {
        self.inner.list_review_entries().await
    }

    async fn get_review_entry(&self, review_id: Uuid) -> PortResult<ReviewEntry> {
        self.inner.get_review_entry(review_id).await
    }

    async fn get_bookshelf(&self, bookshelf_id: Uuid) -> PortResult<Bookshelf> {
        self.inner.get_bookshelf(bookshelf_id).await
    }

    async fn list_bookshelf_groupings(&self) -> PortResult<Vec<BookshelfGrouping>> {
        self.inner.list_bookshelf_groupings().await
    }

    async fn list_tones(&self) -> PortResult<Vec<Tone>> {
        self.inner.list_tones().await
    }

    async fn update_bookshelf(&self, bookshelf: &Bookshelf) -> PortResult<()> {
        self.inner.update_bookshelf(bookshelf).await
    }

    async fn save_bookshelf_grouping(
        &self,
        draft: BookshelfGroupingDraft,
    ) -> PortResult<BookshelfGrouping> {
        self.inner.save_bookshelf_grouping(draft).await
    }

    async fn delete_bookshelf_groupings(&self, grouping_ids: &[Uuid]) -> PortResult<u64> {
        self.inner.delete_bookshelf_groupings(grouping_ids).await
    }

    async fn create_tone(&self, tone: NewTone) -> PortResult<Tone> {
        self.inner.create_tone(tone).await
    }

    async fn update_tone(&self, tone: &Tone) -> PortResult<()> {
        self.inner.update_tone(tone).await
    }

    async fn delete_tones(&self, tone_ids: &[Uuid]) -> PortResult<u64> {
        self.inner.delete_tones(tone_ids).await
    }

    async fn set_book_tones(&self, book_id: Uuid, tone_ids: &[Uuid]) -> PortResult<()> {
        self.inner.set_book_tones(book_id, tone_ids).await
    }

    async fn list_tone_recommendations(&self) -> PortResult<Vec<BookToneRecommendation>> {
        self.inner.list_tone_recommendations().await
    }

    async fn get_tone_recommendation(&self, id: Uuid) -> PortResult<BookToneRecommendation> {
        self.inner.get_tone_recommendation(id).await
    }

    async fn create_tone_recommendation(
        &self,
        recommendation: NewBookToneRecommendation,
    ) -> PortResult<BookToneRecommendation> {
        self.inner.create_tone_recommendation(recommendation).await
    }

    async fn update_tone_recommendation(
        &self,
        id: Uuid,
        feedback: i32,
        tone_id: Option<Uuid>,
    ) -> PortResult<BookToneRecommendation> {
        self.inner.update_tone_recommendation(id, feedback, tone_id).await
    }
}

/// Yields its chunks in order with one read error between the first two.
struct InterruptedUpload {
    chunks: Vec<Vec<u8>>,
    failed: bool,
}

impl Read for InterruptedUpload {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.chunks.len() == 1 && !self.failed {
            self.failed = true;
            return Err(io::Error::new(io::ErrorKind::ConnectionReset, "upload interrupted"));
        }
        let Some(chunk) = self.chunks.first_mut() else {
            return Ok(0);
        };
        let n = buf.len().min(chunk.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        chunk.drain(..n);
        if chunk.is_empty() {
            self.chunks.remove(0);
        }
        Ok(n)
    }
}

fn dune() -> ExportRow {
    ExportRow::new("Dune", "Herbert, Frank").shelves("sf, favorites")
}

#[tokio::test]
async fn imports_reviewed_rows_with_their_shelves() {
    let store = InMemoryCatalog::new();
    let summary = import_rows(&store, &[dune()], &options()).await;

    assert_eq!(summary.rows_read, 1);
    assert_eq!(summary.imported, 1);
    assert_eq!(summary.bookshelves_created, 2);

    let entries = store.list_review_entries().await.unwrap();
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.book.title, "Dune");
    assert_eq!(entry.book.author_first_name, "Frank");
    assert_eq!(entry.book.author_last_name, "Herbert");
    assert_eq!(entry.book.isbn10.as_deref(), Some("0441172717"));
    assert_eq!(entry.book.isbn13.as_deref(), Some("9780441172719"));
    assert_eq!(entry.book.number_of_pages, Some(412));
    assert_eq!(entry.book.original_publication_year, Some(1965));
    assert_eq!(entry.review.reviewer_rating, 4);
    assert_eq!(entry.review.reviewer_full_name, "Levi Hobbs");
    assert!(entry.review.has_review_content);
    assert!(entry.review.date_read.is_some());

    let searchable = entry.book.searchable_string.as_deref().unwrap();
    assert!(searchable.contains("dune frank herbert"));
    assert!(searchable.contains("science fiction"));

    let mut shelves: Vec<String> = entry.bookshelves.iter().map(|s| s.name.clone()).collect();
    shelves.sort();
    assert_eq!(shelves, vec!["favorites", "sf"]);
}

#[tokio::test]
async fn rows_without_review_text_write_nothing() {
    let store = InMemoryCatalog::new();
    let rows = [
        ExportRow::new("Emma", "Austen, Jane").shelves("classics").review("   "),
        ExportRow::new("Persuasion", "Austen, Jane").shelves("classics").review(""),
    ];
    let summary = import_rows(&store, &rows, &options().with_pruning(false)).await;

    assert_eq!(summary.skipped_without_review, 2);
    assert_eq!(summary.imported, 0);
    assert!(store.load_import_snapshot().await.unwrap().is_empty());
    assert!(store.list_bookshelves().await.unwrap().is_empty());
}

#[tokio::test]
async fn reimporting_the_same_export_only_reports_duplicates() {
    let store = InMemoryCatalog::new();
    let rows = [
        dune(),
        ExportRow::new("Kindred", "Butler, Octavia E.").shelves("favorites, time-travel"),
    ];

    let first = import_rows(&store, &rows, &options()).await;
    let second = import_rows(&store, &rows, &options()).await;

    assert_eq!(first.imported, 2);
    assert_eq!(second.imported, 0);
    assert_eq!(second.duplicates, first.imported);
    assert_eq!(second.bookshelves_created, 0);
    assert_eq!(second.bookshelves_pruned, 0);
    assert_eq!(store.load_import_snapshot().await.unwrap().len(), 2);
}

#[tokio::test]
async fn repeated_row_within_one_export_is_a_duplicate() {
    let store = InMemoryCatalog::new();
    let summary = import_rows(&store, &[dune(), dune()], &options()).await;

    assert_eq!(summary.imported, 1);
    assert_eq!(summary.duplicates, 1);
}

#[tokio::test]
async fn changed_shelf_count_replaces_the_stored_book() {
    let store = InMemoryCatalog::new();
    import_rows(&store, &[dune()], &options()).await;
    let original = store.load_import_snapshot().await.unwrap()[0].id;

    let reshelved = dune().shelves("sf, favorites, classics");
    let summary = import_rows(&store, &[reshelved], &options()).await;

    assert_eq!(summary.imported, 1);
    assert_eq!(summary.replaced, 1);
    let snapshot = store.load_import_snapshot().await.unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_ne!(snapshot[0].id, original);
    assert_eq!(snapshot[0].bookshelf_count, 3);
    assert_eq!(store.list_review_entries().await.unwrap().len(), 1);
}

#[tokio::test]
async fn out_of_range_rating_skips_the_row_and_keeps_the_stored_book() {
    let store = InMemoryCatalog::new();
    import_rows(&store, &[dune()], &options()).await;
    let original = store.load_import_snapshot().await.unwrap()[0].id;

    let rows = [
        dune().shelves("sf").rating("7"),
        ExportRow::new("Neuromancer", "Gibson, William").shelves("sf").rating("-1"),
    ];
    let summary = import_rows(&store, &rows, &options().with_pruning(false)).await;

    assert_eq!(summary.invalid, 2);
    assert_eq!(summary.imported, 0);
    let snapshot = store.load_import_snapshot().await.unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].id, original);
}

#[tokio::test]
async fn shelves_are_matched_case_insensitively() {
    let store = InMemoryCatalog::new();
    let rows = [
        ExportRow::new("Dune", "Herbert, Frank").shelves("Favorites"),
        ExportRow::new("Emma", "Austen, Jane").shelves("favorites, FAVORITES"),
    ];
    let summary = import_rows(&store, &rows, &options()).await;

    assert_eq!(summary.imported, 2);
    assert_eq!(summary.bookshelves_created, 1);
    let shelves = store.list_bookshelves().await.unwrap();
    assert_eq!(shelves.len(), 1);
    assert_eq!(shelves[0].name, "Favorites");

    let err = store.create_bookshelf("FAVORITES").await.unwrap_err();
    assert!(matches!(err, PortError::Conflict(_)));
}

#[tokio::test]
async fn shelves_missing_from_the_export_are_pruned() {
    let store = InMemoryCatalog::new();
    import_rows(&store, &[dune().shelves("sf, horror")], &options()).await;

    let summary = import_rows(&store, &[ExportRow::new("Emma", "Austen, Jane").shelves("sf")], &options()).await;
    assert_eq!(summary.bookshelves_pruned, 1);

    let names: Vec<String> = store
        .list_bookshelves()
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["sf"]);

    let dune_entry = store
        .list_review_entries()
        .await
        .unwrap()
        .into_iter()
        .find(|e| e.book.title == "Dune")
        .unwrap();
    assert!(dune_entry.bookshelves.iter().all(|s| s.name != "horror"));
}

#[tokio::test]
async fn pruning_can_be_switched_off() {
    let store = InMemoryCatalog::new();
    import_rows(&store, &[dune().shelves("sf, horror")], &options()).await;

    let rows = [ExportRow::new("Emma", "Austen, Jane").shelves("classics")];
    let summary = import_rows(&store, &rows, &options().with_pruning(false)).await;

    assert_eq!(summary.bookshelves_pruned, 0);
    assert_eq!(store.list_bookshelves().await.unwrap().len(), 3);
}

#[tokio::test]
async fn missing_required_columns_abort_before_any_write() {
    let store = InMemoryCatalog::new();
    let input = "Title,Author l-f,My Rating\nDune,\"Herbert, Frank\",5\n";

    let err = import_goodreads_csv(&store, input.as_bytes(), &options())
        .await
        .unwrap_err();

    match &err {
        ImportError::MissingColumns(missing) => {
            assert!(missing.contains(&"My Review".to_string()));
            assert!(missing.contains(&"Bookshelves".to_string()));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_client_error());
    assert!(store.load_import_snapshot().await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_upload_has_no_header() {
    let store = InMemoryCatalog::new();
    let err = import_goodreads_csv(&store, &b""[..], &options())
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::MissingHeader));
}

#[tokio::test]
async fn unparseable_fields_fall_back_to_defaults() {
    let store = InMemoryCatalog::new();
    let mut csv = String::from_utf8(export_csv(&[dune().date_read("someday").rating("")])).unwrap();
    csv = csv.replace("412", "n/a");
    import_goodreads_csv(&store, csv.as_bytes(), &options())
        .await
        .unwrap();

    let entry = &store.list_review_entries().await.unwrap()[0];
    assert_eq!(entry.review.reviewer_rating, 0);
    assert_eq!(entry.review.date_read, None);
    assert_eq!(entry.book.number_of_pages, None);
}

#[tokio::test]
async fn a_row_that_fails_to_save_does_not_stop_the_batch() {
    let store = RejectingStore {
        inner: InMemoryCatalog::new(),
        rejected_title: "Bad",
    };
    let rows = [
        dune(),
        ExportRow::new("Bad", "Writer, Some").shelves("favorites"),
        ExportRow::new("Unreviewed", "Writer, Some").shelves("favorites").review(""),
        ExportRow::new("Kindred", "Butler, Octavia E.").shelves("favorites"),
    ];

    let summary = import_goodreads_csv(&store, export_csv(&rows).as_slice(), &options())
        .await
        .unwrap();

    assert_eq!(summary.rows_read, 4);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.imported, 2);
    assert_eq!(summary.skipped_without_review, 1);
    let mut titles: Vec<String> = store
        .load_import_snapshot()
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.title)
        .collect();
    titles.sort();
    assert_eq!(titles, vec!["Dune", "Kindred"]);
}

#[tokio::test]
async fn an_undecodable_record_skips_pruning() {
    let store = InMemoryCatalog::new();
    import_rows(&store, &[dune().shelves("sf, horror")], &options()).await;

    let first = export_csv(&[dune()]);
    let second = export_csv(&[ExportRow::new("Kindred", "Butler, Octavia E.").shelves("favorites")]);
    let header_end = second.iter().position(|b| *b == b'\n').unwrap() + 1;
    let upload = InterruptedUpload {
        chunks: vec![first, second[header_end..].to_vec()],
        failed: false,
    };

    let summary = import_goodreads_csv(&store, upload, &options()).await.unwrap();

    assert_eq!(summary.rows_read, 3);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.duplicates, 1);
    assert_eq!(summary.imported, 1);
    assert_eq!(summary.bookshelves_pruned, 0);
    let shelves = store.list_bookshelves().await.unwrap();
    assert!(shelves.iter().any(|s| s.name == "horror"));
}
