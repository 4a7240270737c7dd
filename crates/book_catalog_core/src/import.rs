//! crates/book_catalog_core/src/import.rs
//!
//! The Goodreads import pipeline.
//!
//! One pass over the export, in file order. Each row ends up imported, skipped
//! as a duplicate, or skipped as unusable; row-level failures are logged and
//! never abort the batch. The stored books are loaded once into a working set
//! before the pass and kept current in memory as rows are reconciled. Shelf
//! pruning runs once, after the pass.

use std::io::Read;

use tracing::{debug, error, info, warn};

use crate::bookshelves::{prune_unreferenced, BookshelfWorkingSet, ReferencedBookshelves};
use crate::domain::{BookSnapshot, ImportedBook, NewBook, NewBookReview};
use crate::error::ImportError;
use crate::goodreads::{GoodreadsReader, GoodreadsRow};
use crate::normalize::{
    build_searchable_string, clean_isbn_value, parse_average_rating, parse_date_read,
    parse_page_count, parse_publication_year, parse_reviewer_rating, split_bookshelves,
    AuthorName, AuthorNameRef, SearchableParts,
};
use crate::ports::{CatalogStore, PortResult};

pub const MIN_REVIEWER_RATING: i32 = 0;
pub const MAX_REVIEWER_RATING: i32 = 5;

/// Caller-supplied settings for one import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    /// Stamped on every imported review.
    pub reviewer_name: String,
    /// Delete shelves the batch does not mention once the pass completes.
    pub prune_bookshelves: bool,
}

impl ImportOptions {
    pub fn new(reviewer_name: impl Into<String>) -> Self {
        Self {
            reviewer_name: reviewer_name.into(),
            prune_bookshelves: true,
        }
    }

    pub fn with_pruning(mut self, prune_bookshelves: bool) -> Self {
        self.prune_bookshelves = prune_bookshelves;
        self
    }
}

/// Counters reported back to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub rows_read: usize,
    /// New book + review pairs written, replacements included.
    pub imported: usize,
    /// Rows matching a stored book with the same shelf count.
    pub duplicates: usize,
    /// Rows rejected for an out-of-range rating.
    pub invalid: usize,
    /// Rows that failed to decode or to persist.
    pub failed: usize,
    /// Rows without written review text.
    pub skipped_without_review: usize,
    /// Stored books deleted because their shelf count changed.
    pub replaced: usize,
    pub bookshelves_created: usize,
    pub bookshelves_pruned: u64,
}

/// What happened to a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    Imported,
    Replaced,
    Duplicate,
    NoReview,
    InvalidRating,
}

/// Imports a Goodreads export into the store.
///
/// Fails only when the header is unusable or the store cannot provide the
/// initial working set; everything else is counted in the summary.
pub async fn import_goodreads_csv<R>(
    store: &dyn CatalogStore,
    input: R,
    options: &ImportOptions,
) -> Result<ImportSummary, ImportError>
where
    R: Read + Send,
{
    let reader = GoodreadsReader::new(input)?;

    let books = store.load_import_snapshot().await?;
    let shelves = store.list_bookshelves().await?;
    info!(
        books = books.len(),
        bookshelves = shelves.len(),
        "Loaded catalog working set for import"
    );

    let mut run = ImportRun {
        store,
        options,
        books,
        shelves: BookshelfWorkingSet::new(shelves),
        referenced: ReferencedBookshelves::default(),
        summary: ImportSummary::default(),
    };

    let mut complete = true;
    for next in reader {
        run.summary.rows_read += 1;
        let row = match next {
            Ok(row) => row,
            Err(e) => {
                error!(line = e.line, error = %e.message, "Could not decode CSV record");
                run.summary.failed += 1;
                complete = false;
                continue;
            }
        };

        let view = row.as_goodreads();
        let shelf_names = split_bookshelves(view.bookshelves);
        run.referenced.record(&shelf_names);

        match run.process_row(&view, &shelf_names).await {
            Ok(outcome) => run.tally(outcome),
            Err(e) => {
                error!(
                    line = row.line(),
                    title = view.title,
                    author = view.author_last_first,
                    error = %e,
                    "Failed to import row"
                );
                run.summary.failed += 1;
            }
        }
    }

    run.summary.bookshelves_created = run.shelves.created();

    if !options.prune_bookshelves {
        debug!("Bookshelf pruning disabled for this import");
    } else if !complete {
        warn!("Skipping bookshelf pruning because some records could not be decoded");
    } else {
        run.summary.bookshelves_pruned = prune_unreferenced(store, &run.referenced).await?;
    }

    let summary = run.summary;
    info!(
        rows = summary.rows_read,
        imported = summary.imported,
        duplicates = summary.duplicates,
        invalid = summary.invalid,
        failed = summary.failed,
        without_review = summary.skipped_without_review,
        replaced = summary.replaced,
        bookshelves_created = summary.bookshelves_created,
        bookshelves_pruned = summary.bookshelves_pruned,
        "Goodreads import finished"
    );
    Ok(summary)
}

struct ImportRun<'a> {
    store: &'a dyn CatalogStore,
    options: &'a ImportOptions,
    books: Vec<BookSnapshot>,
    shelves: BookshelfWorkingSet,
    referenced: ReferencedBookshelves,
    summary: ImportSummary,
}

impl ImportRun<'_> {
    fn tally(&mut self, outcome: RowOutcome) {
        match outcome {
            RowOutcome::Imported => self.summary.imported += 1,
            RowOutcome::Replaced => {
                self.summary.imported += 1;
                self.summary.replaced += 1;
            }
            RowOutcome::Duplicate => self.summary.duplicates += 1,
            RowOutcome::NoReview => self.summary.skipped_without_review += 1,
            RowOutcome::InvalidRating => self.summary.invalid += 1,
        }
    }

    async fn process_row(
        &mut self,
        row: &GoodreadsRow<'_>,
        shelf_names: &[String],
    ) -> PortResult<RowOutcome> {
        if !row.has_review() {
            debug!(title = row.title, "Skipping row without review text");
            return Ok(RowOutcome::NoReview);
        }

        let rating = parse_reviewer_rating(row.my_rating);
        if !(MIN_REVIEWER_RATING..=MAX_REVIEWER_RATING).contains(&rating) {
            warn!(
                title = row.title,
                author = row.author_last_first,
                rating,
                "Skipping row with out-of-range rating"
            );
            return Ok(RowOutcome::InvalidRating);
        }

        let author = AuthorName::from_last_first(row.author_last_first);

        let mut replaced = false;
        if let Some(index) = self.find_book(row.title, &author) {
            let existing = &self.books[index];
            if existing.bookshelf_count == shelf_names.len() {
                debug!(title = row.title, "Skipping duplicate book");
                return Ok(RowOutcome::Duplicate);
            }

            info!(
                title = row.title,
                author = %author.full_name(),
                stored_shelves = existing.bookshelf_count,
                row_shelves = shelf_names.len(),
                "Replacing book whose shelves changed"
            );
            self.store.delete_book(existing.id).await?;
            self.books.swap_remove(index);
            replaced = true;
        }

        let bookshelf_ids = self.shelves.resolve_all(self.store, shelf_names).await?;
        let imported = ImportedBook {
            book: build_book(row, &author),
            review: build_review(row, rating, &self.options.reviewer_name),
            bookshelf_ids,
        };
        let shelf_count = imported.bookshelf_ids.len();

        let saved = self.store.save_imported_book(imported).await?;
        self.books.push(BookSnapshot {
            id: saved.book_id,
            title: row.title.to_string(),
            author_first_name: author.first_name,
            author_last_name: author.last_name,
            bookshelf_count: shelf_count,
        });

        Ok(if replaced {
            RowOutcome::Replaced
        } else {
            RowOutcome::Imported
        })
    }

    fn find_book(&self, title: &str, author: &AuthorName) -> Option<usize> {
        self.books.iter().position(|book| {
            book.title == title
                && book.author_first_name == author.first_name
                && book.author_last_name == author.last_name
        })
    }
}

/// Derives a new book record from a row.
pub fn build_book(row: &GoodreadsRow<'_>, author: &AuthorName) -> NewBook {
    let searchable = build_searchable_string(&SearchableParts {
        title: row.title,
        author: AuthorNameRef {
            first_name: &author.first_name,
            last_name: &author.last_name,
        },
        additional_authors: row.additional_authors,
        publisher: row.publisher,
        raw_bookshelves: row.bookshelves,
    });

    NewBook {
        title: row.title.to_string(),
        author_first_name: author.first_name.clone(),
        author_last_name: author.last_name.clone(),
        isbn10: clean_isbn_value(row.isbn),
        isbn13: clean_isbn_value(row.isbn13),
        average_rating: parse_average_rating(row.average_rating),
        number_of_pages: parse_page_count(row.number_of_pages),
        original_publication_year: parse_publication_year(row.original_publication_year),
        searchable_string: (!searchable.is_empty()).then_some(searchable),
    }
}

/// Derives the review attached to a newly imported book.
pub fn build_review(row: &GoodreadsRow<'_>, rating: i32, reviewer_name: &str) -> NewBookReview {
    NewBookReview {
        reviewer_rating: rating,
        reviewer_full_name: reviewer_name.to_string(),
        date_read: parse_date_read(row.date_read),
        review: row.my_review.map(str::to_string),
    }
}
