//! crates/book_catalog_core/src/ports.rs
//!
//! Defines the persistence contract for the catalog core.
//! The import pipeline and every catalog operation talk to storage only through
//! `CatalogStore`, so the core stays independent of the concrete database.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Book, BookDetail, BookSnapshot, BookToneRecommendation, Bookshelf, BookshelfGrouping,
    BookshelfGroupingDraft, ImportedBook, NewBookToneRecommendation, NewTone, ReviewEntry,
    SavedImport, Tone,
};

//=========================================================================================
// Port Errors
//=========================================================================================

/// Store failures, classified so callers can tell bad input from outages.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    Invalid(String),
    #[error("Unexpected store failure: {0}")]
    Unexpected(String),
}

pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Persistence Port
//=========================================================================================

#[async_trait]
pub trait CatalogStore: Send + Sync {
    // --- Import ---

    /// Loads every stored book with its current shelf count.
    async fn load_import_snapshot(&self) -> PortResult<Vec<BookSnapshot>>;

    async fn list_bookshelves(&self) -> PortResult<Vec<Bookshelf>>;

    async fn create_bookshelf(&self, name: &str) -> PortResult<Bookshelf>;

    /// Writes a book, its review and its shelf links as one unit.
    async fn save_imported_book(&self, imported: ImportedBook) -> PortResult<SavedImport>;

    /// Deletes a book along with its review, tag links and tone feedback.
    async fn delete_book(&self, book_id: Uuid) -> PortResult<()>;

    /// Deletes the given shelves and detaches them from books and groupings.
    async fn delete_bookshelves(&self, bookshelf_ids: &[Uuid]) -> PortResult<u64>;

    // --- Catalog reads ---

    async fn get_book(&self, book_id: Uuid) -> PortResult<BookDetail>;

    async fn list_review_entries(&self) -> PortResult<Vec<ReviewEntry>>;

    async fn get_review_entry(&self, review_id: Uuid) -> PortResult<ReviewEntry>;

    async fn get_bookshelf(&self, bookshelf_id: Uuid) -> PortResult<Bookshelf>;

    async fn list_bookshelf_groupings(&self) -> PortResult<Vec<BookshelfGrouping>>;

    async fn list_tones(&self) -> PortResult<Vec<Tone>>;

    // --- Configuration ---

    async fn update_bookshelf(&self, bookshelf: &Bookshelf) -> PortResult<()>;

    async fn save_bookshelf_grouping(
        &self,
        draft: BookshelfGroupingDraft,
    ) -> PortResult<BookshelfGrouping>;

    async fn delete_bookshelf_groupings(&self, grouping_ids: &[Uuid]) -> PortResult<u64>;

    async fn create_tone(&self, tone: NewTone) -> PortResult<Tone>;

    async fn update_tone(&self, tone: &Tone) -> PortResult<()>;

    /// Deletes tones; callers remove subtones before their parents.
    async fn delete_tones(&self, tone_ids: &[Uuid]) -> PortResult<u64>;

    /// Replaces the full tone set of a book.
    async fn set_book_tones(&self, book_id: Uuid, tone_ids: &[Uuid]) -> PortResult<()>;

    // --- Tone recommendation feedback ---

    async fn list_tone_recommendations(&self) -> PortResult<Vec<BookToneRecommendation>>;

    async fn get_tone_recommendation(&self, id: Uuid) -> PortResult<BookToneRecommendation>;

    async fn create_tone_recommendation(
        &self,
        recommendation: NewBookToneRecommendation,
    ) -> PortResult<BookToneRecommendation>;

    async fn update_tone_recommendation(
        &self,
        id: Uuid,
        feedback: i32,
        tone_id: Option<Uuid>,
    ) -> PortResult<BookToneRecommendation>;
}

/// Convenience lookup shared by operations that only hold a book id.
pub async fn require_book(store: &dyn CatalogStore, book_id: Uuid) -> PortResult<Book> {
    store.get_book(book_id).await.map(|detail| detail.book)
}
