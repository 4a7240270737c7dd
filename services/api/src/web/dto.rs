//! services/api/src/web/dto.rs
//!
//! JSON request and response payloads, and their conversions from and into
//! the core types.

use book_catalog_core::assignment::{ToneAssignment, ToneAssignmentItem, ToneAssignmentUpdate};
use book_catalog_core::configuration::{
    BookshelfConfiguration, BookshelfConfigurationUpdate, BookshelfSetting, GroupingSetting,
};
use book_catalog_core::domain::{
    BookDetail, BookToneRecommendation, Bookshelf, BookshelfGrouping, ReviewEntry, Tone,
};
use book_catalog_core::import::ImportSummary;
use book_catalog_core::reviews::{preview_text, reading_time_minutes, ReviewListing};
use book_catalog_core::tones::{ToneConfigItem, ToneNode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

//=========================================================================================
// Import
//=========================================================================================

/// Counters reported after a Goodreads import.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ImportResponse {
    pub imported: usize,
    pub duplicates: usize,
    pub invalid: usize,
    pub failed: usize,
    pub skipped_without_review: usize,
    pub replaced: usize,
    pub bookshelves_created: usize,
    pub bookshelves_pruned: u64,
    pub message: String,
}

impl From<ImportSummary> for ImportResponse {
    fn from(summary: ImportSummary) -> Self {
        Self {
            message: format!("Successfully imported {} book reviews", summary.imported),
            imported: summary.imported,
            duplicates: summary.duplicates,
            invalid: summary.invalid,
            failed: summary.failed,
            skipped_without_review: summary.skipped_without_review,
            replaced: summary.replaced,
            bookshelves_created: summary.bookshelves_created,
            bookshelves_pruned: summary.bookshelves_pruned,
        }
    }
}

//=========================================================================================
// Tags
//=========================================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookshelfResponse {
    pub id: Uuid,
    pub name: String,
    pub display: Option<bool>,
    pub is_genre_based: bool,
    pub is_non_fiction_genre: bool,
}

impl From<Bookshelf> for BookshelfResponse {
    fn from(shelf: Bookshelf) -> Self {
        Self {
            id: shelf.id,
            name: shelf.name,
            display: shelf.display,
            is_genre_based: shelf.is_genre_based,
            is_non_fiction_genre: shelf.is_non_fiction_genre,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GroupingResponse {
    pub id: Uuid,
    pub name: String,
    pub is_genre_based: bool,
    pub is_non_fiction_genre: bool,
    pub bookshelf_ids: Vec<Uuid>,
}

impl From<BookshelfGrouping> for GroupingResponse {
    fn from(grouping: BookshelfGrouping) -> Self {
        Self {
            id: grouping.id,
            name: grouping.name,
            is_genre_based: grouping.is_genre_based,
            is_non_fiction_genre: grouping.is_non_fiction_genre,
            bookshelf_ids: grouping.bookshelf_ids,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ToneResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
}

impl From<Tone> for ToneResponse {
    fn from(tone: Tone) -> Self {
        Self {
            id: tone.id,
            name: tone.name,
            description: tone.description,
            parent_id: tone.parent_id,
        }
    }
}

/// A top-level tone with its subtones.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ToneNodeResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub subtones: Vec<ToneResponse>,
}

impl From<ToneNode> for ToneNodeResponse {
    fn from(node: ToneNode) -> Self {
        Self {
            id: node.tone.id,
            name: node.tone.name,
            description: node.tone.description,
            subtones: node.subtones.into_iter().map(Into::into).collect(),
        }
    }
}

/// Converts every item of a core collection into its payload type.
pub fn convert_all<T, U: From<T>>(items: Vec<T>) -> Vec<U> {
    items.into_iter().map(U::from).collect()
}

//=========================================================================================
// Books and Reviews
//=========================================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookResponse {
    pub id: Uuid,
    pub title: String,
    pub author_first_name: String,
    pub author_last_name: String,
    pub author_name: String,
    pub title_by_author: String,
    pub isbn10: Option<String>,
    pub isbn13: Option<String>,
    pub average_rating: f64,
    pub number_of_pages: Option<i32>,
    pub original_publication_year: Option<i32>,
    pub cover_image_id: Option<Uuid>,
    pub bookshelves: Vec<BookshelfResponse>,
    pub tones: Vec<ToneResponse>,
}

impl From<BookDetail> for BookResponse {
    fn from(detail: BookDetail) -> Self {
        let book = detail.book;
        Self {
            author_name: book.author_name(),
            title_by_author: book.title_by_author(),
            id: book.id,
            title: book.title,
            author_first_name: book.author_first_name,
            author_last_name: book.author_last_name,
            isbn10: book.isbn10,
            isbn13: book.isbn13,
            average_rating: book.average_rating,
            number_of_pages: book.number_of_pages,
            original_publication_year: book.original_publication_year,
            cover_image_id: book.cover_image_id,
            bookshelves: convert_all(detail.bookshelves),
            tones: convert_all(detail.tones),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub book_id: Uuid,
    pub title: String,
    pub author_name: String,
    pub title_by_author: String,
    pub reviewer_rating: i32,
    pub reviewer_full_name: String,
    pub date_read: Option<DateTime<Utc>>,
    pub review: Option<String>,
    pub preview_text: String,
    pub reading_time_minutes: usize,
    pub bookshelves: Vec<BookshelfResponse>,
    pub tones: Vec<ToneResponse>,
}

impl From<ReviewEntry> for ReviewResponse {
    fn from(entry: ReviewEntry) -> Self {
        let review = entry.review;
        Self {
            preview_text: preview_text(review.id, review.review.as_deref()),
            reading_time_minutes: reading_time_minutes(review.review.as_deref()),
            title_by_author: entry.book.title_by_author(),
            author_name: entry.book.author_name(),
            title: entry.book.title,
            id: review.id,
            book_id: review.book_id,
            reviewer_rating: review.reviewer_rating,
            reviewer_full_name: review.reviewer_full_name,
            date_read: review.date_read,
            review: review.review,
            bookshelves: convert_all(entry.bookshelves),
            tones: convert_all(entry.tones),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ReviewListQuery {
    /// Shelf name, matched case-insensitively.
    pub shelf: Option<String>,
    /// Grouping name, matched case-insensitively.
    pub grouping: Option<String>,
    /// Only the ten most recently read.
    #[serde(default)]
    pub recent: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReviewListingResponse {
    pub reviews: Vec<ReviewResponse>,
    pub bookshelves: Vec<BookshelfResponse>,
    pub groupings: Vec<GroupingResponse>,
    pub use_custom_mappings: bool,
    pub selected_shelf: Option<String>,
    pub selected_grouping: Option<String>,
    pub recent: bool,
}

impl From<ReviewListing> for ReviewListingResponse {
    fn from(listing: ReviewListing) -> Self {
        Self {
            reviews: convert_all(listing.reviews),
            bookshelves: convert_all(listing.bookshelves),
            groupings: convert_all(listing.groupings),
            use_custom_mappings: listing.use_custom_mappings,
            selected_shelf: listing.selected_shelf,
            selected_grouping: listing.selected_grouping,
            recent: listing.recent,
        }
    }
}

//=========================================================================================
// Bookshelf Configuration
//=========================================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookshelfConfigurationResponse {
    pub enable_custom_mappings: bool,
    pub bookshelves: Vec<BookshelfResponse>,
    pub groupings: Vec<GroupingResponse>,
}

impl From<BookshelfConfiguration> for BookshelfConfigurationResponse {
    fn from(config: BookshelfConfiguration) -> Self {
        Self {
            enable_custom_mappings: config.enable_custom_mappings,
            bookshelves: convert_all(config.bookshelves),
            groupings: convert_all(config.groupings),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookshelfSettingRequest {
    pub id: Uuid,
    #[serde(default)]
    pub display: bool,
    #[serde(default)]
    pub is_genre_based: bool,
    #[serde(default)]
    pub is_non_fiction_genre: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GroupingSettingRequest {
    /// Omit to create a new grouping.
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub is_genre_based: bool,
    #[serde(default)]
    pub is_non_fiction_genre: bool,
    #[serde(default)]
    pub bookshelf_ids: Vec<Uuid>,
    #[serde(default)]
    pub remove: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookshelfConfigurationRequest {
    pub enable_custom_mappings: bool,
    #[serde(default)]
    pub bookshelves: Vec<BookshelfSettingRequest>,
    #[serde(default)]
    pub groupings: Vec<GroupingSettingRequest>,
}

impl From<BookshelfConfigurationRequest> for BookshelfConfigurationUpdate {
    fn from(request: BookshelfConfigurationRequest) -> Self {
        Self {
            enable_custom_mappings: request.enable_custom_mappings,
            bookshelves: request
                .bookshelves
                .into_iter()
                .map(|s| BookshelfSetting {
                    id: s.id,
                    display: s.display,
                    is_genre_based: s.is_genre_based,
                    is_non_fiction_genre: s.is_non_fiction_genre,
                })
                .collect(),
            groupings: request
                .groupings
                .into_iter()
                .map(|g| GroupingSetting {
                    id: g.id,
                    name: g.name,
                    is_genre_based: g.is_genre_based,
                    is_non_fiction_genre: g.is_non_fiction_genre,
                    bookshelf_ids: g.bookshelf_ids,
                    remove: g.remove,
                })
                .collect(),
        }
    }
}

//=========================================================================================
// Tone Configuration and Assignment
//=========================================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubtoneConfigRequest {
    /// Omit to create a new subtone.
    pub id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub remove: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ToneConfigRequest {
    /// Omit to create a new tone.
    pub id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub remove: bool,
    #[serde(default)]
    pub subtones: Vec<SubtoneConfigRequest>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ToneConfigurationRequest {
    pub tones: Vec<ToneConfigRequest>,
}

impl From<ToneConfigRequest> for ToneConfigItem {
    fn from(request: ToneConfigRequest) -> Self {
        Self {
            id: request.id,
            name: request.name,
            description: request.description,
            remove: request.remove,
            subtones: request
                .subtones
                .into_iter()
                .map(|sub| ToneConfigItem {
                    id: sub.id,
                    name: sub.name,
                    description: sub.description,
                    remove: sub.remove,
                    subtones: Vec::new(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ToneAssignmentItemResponse {
    pub review_id: Uuid,
    pub book_id: Uuid,
    pub title: String,
    pub author_name: String,
    pub genres: Vec<String>,
    pub review: Option<String>,
    pub assigned_tone_ids: Vec<Uuid>,
    pub suggested_tone_ids: Vec<Uuid>,
}

impl From<ToneAssignmentItem> for ToneAssignmentItemResponse {
    fn from(item: ToneAssignmentItem) -> Self {
        Self {
            review_id: item.review_id,
            book_id: item.book_id,
            title: item.title,
            author_name: item.author_name,
            genres: item.genres,
            review: item.review,
            assigned_tone_ids: item.assigned_tone_ids,
            suggested_tone_ids: item.suggested_tone_ids,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ToneAssignmentResponse {
    pub books_without_tones: Vec<ToneAssignmentItemResponse>,
    pub books_with_tones: Vec<ToneAssignmentItemResponse>,
    pub tones: Vec<ToneNodeResponse>,
}

impl From<ToneAssignment> for ToneAssignmentResponse {
    fn from(assignment: ToneAssignment) -> Self {
        Self {
            books_without_tones: convert_all(assignment.books_without_tones),
            books_with_tones: convert_all(assignment.books_with_tones),
            tones: convert_all(assignment.tones),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ToneAssignmentUpdateRequest {
    pub review_id: Uuid,
    #[serde(default)]
    pub assigned_tone_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ToneAssignmentRequest {
    pub assignments: Vec<ToneAssignmentUpdateRequest>,
}

impl From<ToneAssignmentUpdateRequest> for ToneAssignmentUpdate {
    fn from(request: ToneAssignmentUpdateRequest) -> Self {
        Self {
            review_id: request.review_id,
            assigned_tone_ids: request.assigned_tone_ids,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ToneAssignmentSavedResponse {
    pub updated: usize,
}

//=========================================================================================
// Tone Recommendation Feedback
//=========================================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecommendationResponse {
    pub id: Uuid,
    pub book_id: Uuid,
    pub tone: String,
    pub tone_id: Option<Uuid>,
    pub feedback: i32,
    pub created_at: DateTime<Utc>,
}

impl From<BookToneRecommendation> for RecommendationResponse {
    fn from(r: BookToneRecommendation) -> Self {
        Self {
            id: r.id,
            book_id: r.book_id,
            tone: r.tone,
            tone_id: r.tone_id,
            feedback: r.feedback,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct RecommendationQuery {
    pub book_id: Option<Uuid>,
    /// Substring of the tone name.
    pub tone: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateRecommendationRequest {
    pub book_id: Uuid,
    pub tone: String,
    /// -2 (wrong) to 1 (good).
    pub feedback: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateRecommendationRequest {
    pub feedback: i32,
    pub tone_id: Option<Uuid>,
}
