//! crates/book_catalog_core/src/domain.rs
//!
//! Defines the pure, core data structures for the catalog.
//! Plain data; storage and wire formats live in the adapters.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A catalogued book. Identity for import purposes is the exact
/// (title, author first name, author last name) triple.
#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author_first_name: String,
    pub author_last_name: String,
    pub isbn10: Option<String>,
    pub isbn13: Option<String>,
    /// 0-5, two decimal places.
    pub average_rating: f64,
    pub number_of_pages: Option<i32>,
    pub original_publication_year: Option<i32>,
    pub searchable_string: Option<String>,
    pub cover_image_id: Option<Uuid>,
}

impl Book {
    pub fn title_by_author(&self) -> String {
        crate::normalize::title_by_author(
            &self.title,
            &self.author_first_name,
            &self.author_last_name,
        )
    }

    pub fn author_name(&self) -> String {
        format!("{} {}", self.author_first_name, self.author_last_name)
            .trim()
            .to_string()
    }
}

/// A book that has not been persisted yet; the store assigns its id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub title: String,
    pub author_first_name: String,
    pub author_last_name: String,
    pub isbn10: Option<String>,
    pub isbn13: Option<String>,
    pub average_rating: f64,
    pub number_of_pages: Option<i32>,
    pub original_publication_year: Option<i32>,
    pub searchable_string: Option<String>,
}

/// The owner's review of a single book.
#[derive(Debug, Clone, PartialEq)]
pub struct BookReview {
    pub id: Uuid,
    pub book_id: Uuid,
    /// 0-5.
    pub reviewer_rating: i32,
    pub reviewer_full_name: String,
    pub date_read: Option<DateTime<Utc>>,
    pub review: Option<String>,
    /// Computed by the store from `review`; never set by callers.
    pub has_review_content: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewBookReview {
    pub reviewer_rating: i32,
    pub reviewer_full_name: String,
    pub date_read: Option<DateTime<Utc>>,
    pub review: Option<String>,
}

/// The stored rule behind `BookReview::has_review_content`.
pub fn review_has_content(review: Option<&str>) -> bool {
    review.is_some_and(|r| !r.is_empty())
}

/// A free-text tag taken from the export's shelves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookshelf {
    pub id: Uuid,
    pub name: String,
    /// `None` while custom display mappings are switched off.
    pub display: Option<bool>,
    pub is_genre_based: bool,
    pub is_non_fiction_genre: bool,
}

impl Bookshelf {
    pub fn is_non_fiction(&self) -> bool {
        self.is_genre_based && self.is_non_fiction_genre
    }
}

/// A curated cluster of bookshelves, usually a genre super-category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookshelfGrouping {
    pub id: Uuid,
    pub name: String,
    pub is_genre_based: bool,
    pub is_non_fiction_genre: bool,
    pub bookshelf_ids: Vec<Uuid>,
}

/// A grouping to create (`id == None`) or overwrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookshelfGroupingDraft {
    pub id: Option<Uuid>,
    pub name: String,
    pub is_genre_based: bool,
    pub is_non_fiction_genre: bool,
    pub bookshelf_ids: Vec<Uuid>,
}

/// A mood/style descriptor. Tones with a parent are subtones; nesting is a
/// single level deep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tone {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTone {
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
}

/// Feedback on a suggested tone, independent of whether it was assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookToneRecommendation {
    pub id: Uuid,
    pub book_id: Uuid,
    pub tone: String,
    pub tone_id: Option<Uuid>,
    /// -2..=1.
    pub feedback: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBookToneRecommendation {
    pub book_id: Uuid,
    pub tone: String,
    pub feedback: i32,
}

/// The slice of a stored book the importer needs to reconcile rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookSnapshot {
    pub id: Uuid,
    pub title: String,
    pub author_first_name: String,
    pub author_last_name: String,
    pub bookshelf_count: usize,
}

/// Everything the importer writes for one accepted row.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedBook {
    pub book: NewBook,
    pub review: NewBookReview,
    pub bookshelf_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedImport {
    pub book_id: Uuid,
    pub review_id: Uuid,
}

/// A book together with its tags.
#[derive(Debug, Clone, PartialEq)]
pub struct BookDetail {
    pub book: Book,
    pub bookshelves: Vec<Bookshelf>,
    pub tones: Vec<Tone>,
}

/// A review joined with its book and the book's tags.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewEntry {
    pub review: BookReview,
    pub book: Book,
    pub bookshelves: Vec<Bookshelf>,
    pub tones: Vec<Tone>,
}
