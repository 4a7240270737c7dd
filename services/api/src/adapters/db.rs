//! services/api/src/adapters/db.rs
//!
//! PostgreSQL implementation of the `CatalogStore` port. Queries are built at
//! runtime with `sqlx` and map rows into the core domain types.

use std::collections::HashMap;

use async_trait::async_trait;
use book_catalog_core::domain::{
    Book, BookDetail, BookReview, BookSnapshot, BookToneRecommendation, Bookshelf,
    BookshelfGrouping, BookshelfGroupingDraft, ImportedBook, NewBookToneRecommendation, NewTone,
    ReviewEntry, SavedImport, Tone,
};
use book_catalog_core::ports::{CatalogStore, PortError, PortResult};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::debug;
use uuid::Uuid;

//=========================================================================================
// Adapter
//=========================================================================================

/// A database adapter that implements the `CatalogStore` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded schema migrations.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// Error Mapping
//=========================================================================================

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";

fn port_error(e: sqlx::Error) -> PortError {
    if let sqlx::Error::Database(db) = &e {
        match db.code().as_deref() {
            Some(UNIQUE_VIOLATION) | Some(FOREIGN_KEY_VIOLATION) => {
                return PortError::Conflict(db.message().to_string())
            }
            Some(CHECK_VIOLATION) => return PortError::Invalid(db.message().to_string()),
            _ => {}
        }
    }
    PortError::Unexpected(e.to_string())
}

/// Maps `RowNotFound` to a `NotFound` naming the missing item.
fn not_found(e: sqlx::Error, what: impl FnOnce() -> String) -> PortError {
    match e {
        sqlx::Error::RowNotFound => PortError::NotFound(format!("{} not found", what())),
        other => port_error(other),
    }
}

//=========================================================================================
// Row Records
//=========================================================================================

const BOOK_COLUMNS: &str = "id, title, author_first_name, author_last_name, isbn10, isbn13, \
    average_rating, number_of_pages, original_publication_year, searchable_string, cover_image_id";
const REVIEW_COLUMNS: &str =
    "id, book_id, reviewer_rating, reviewer_full_name, date_read, review, has_review_content";
const BOOKSHELF_COLUMNS: &str = "id, name, display, is_genre_based, is_non_fiction_genre";
const TONE_COLUMNS: &str = "id, name, description, parent_id";
const RECOMMENDATION_COLUMNS: &str = "id, book_id, tone, tone_id, feedback, created_at";

#[derive(FromRow)]
struct BookRecord {
    id: Uuid,
    title: String,
    author_first_name: String,
    author_last_name: String,
    isbn10: Option<String>,
    isbn13: Option<String>,
    average_rating: f64,
    number_of_pages: Option<i32>,
    original_publication_year: Option<i32>,
    searchable_string: Option<String>,
    cover_image_id: Option<Uuid>,
}
impl BookRecord {
    fn to_domain(self) -> Book {
        Book {
            id: self.id,
            title: self.title,
            author_first_name: self.author_first_name,
            author_last_name: self.author_last_name,
            isbn10: self.isbn10,
            isbn13: self.isbn13,
            average_rating: self.average_rating,
            number_of_pages: self.number_of_pages,
            original_publication_year: self.original_publication_year,
            searchable_string: self.searchable_string,
            cover_image_id: self.cover_image_id,
        }
    }
}

#[derive(FromRow)]
struct ReviewRecord {
    id: Uuid,
    book_id: Uuid,
    reviewer_rating: i32,
    reviewer_full_name: String,
    date_read: Option<DateTime<Utc>>,
    review: Option<String>,
    has_review_content: bool,
}
impl ReviewRecord {
    fn to_domain(self) -> BookReview {
        BookReview {
            id: self.id,
            book_id: self.book_id,
            reviewer_rating: self.reviewer_rating,
            reviewer_full_name: self.reviewer_full_name,
            date_read: self.date_read,
            review: self.review,
            has_review_content: self.has_review_content,
        }
    }
}

#[derive(FromRow)]
struct BookshelfRecord {
    id: Uuid,
    name: String,
    display: Option<bool>,
    is_genre_based: bool,
    is_non_fiction_genre: bool,
}
impl BookshelfRecord {
    fn to_domain(self) -> Bookshelf {
        Bookshelf {
            id: self.id,
            name: self.name,
            display: self.display,
            is_genre_based: self.is_genre_based,
            is_non_fiction_genre: self.is_non_fiction_genre,
        }
    }
}

/// A shelf joined to one of the books it tags.
#[derive(FromRow)]
struct BookBookshelfRecord {
    book_id: Uuid,
    #[sqlx(flatten)]
    bookshelf: BookshelfRecord,
}

#[derive(FromRow)]
struct GroupingRecord {
    id: Uuid,
    name: String,
    is_genre_based: bool,
    is_non_fiction_genre: bool,
}

#[derive(FromRow)]
struct GroupingMemberRecord {
    grouping_id: Uuid,
    bookshelf_id: Uuid,
}

#[derive(FromRow)]
struct ToneRecord {
    id: Uuid,
    name: String,
    description: Option<String>,
    parent_id: Option<Uuid>,
}
impl ToneRecord {
    fn to_domain(self) -> Tone {
        Tone {
            id: self.id,
            name: self.name,
            description: self.description,
            parent_id: self.parent_id,
        }
    }
}

/// A tone joined to one of the books it is assigned to.
#[derive(FromRow)]
struct BookToneRecord {
    book_id: Uuid,
    #[sqlx(flatten)]
    tone: ToneRecord,
}

#[derive(FromRow)]
struct SnapshotRecord {
    id: Uuid,
    title: String,
    author_first_name: String,
    author_last_name: String,
    bookshelf_count: i64,
}
impl SnapshotRecord {
    fn to_domain(self) -> BookSnapshot {
        BookSnapshot {
            id: self.id,
            title: self.title,
            author_first_name: self.author_first_name,
            author_last_name: self.author_last_name,
            bookshelf_count: usize::try_from(self.bookshelf_count).unwrap_or_default(),
        }
    }
}

#[derive(FromRow)]
struct RecommendationRecord {
    id: Uuid,
    book_id: Uuid,
    tone: String,
    tone_id: Option<Uuid>,
    feedback: i32,
    created_at: DateTime<Utc>,
}
impl RecommendationRecord {
    fn to_domain(self) -> BookToneRecommendation {
        BookToneRecommendation {
            id: self.id,
            book_id: self.book_id,
            tone: self.tone,
            tone_id: self.tone_id,
            feedback: self.feedback,
            created_at: self.created_at,
        }
    }
}

//=========================================================================================
// Shared Queries
//=========================================================================================

impl DbAdapter {
    /// Shelves per book, for one book or (with `None`) for all of them.
    async fn bookshelves_by_book(
        &self,
        book_id: Option<Uuid>,
    ) -> PortResult<HashMap<Uuid, Vec<Bookshelf>>> {
        let records = sqlx::query_as::<_, BookBookshelfRecord>(
            "SELECT bb.book_id, s.id, s.name, s.display, s.is_genre_based, s.is_non_fiction_genre \
             FROM book_bookshelves bb JOIN bookshelves s ON s.id = bb.bookshelf_id \
             WHERE ($1::uuid IS NULL OR bb.book_id = $1) ORDER BY s.name",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await
        .map_err(port_error)?;

        let mut by_book: HashMap<Uuid, Vec<Bookshelf>> = HashMap::new();
        for record in records {
            by_book
                .entry(record.book_id)
                .or_default()
                .push(record.bookshelf.to_domain());
        }
        Ok(by_book)
    }

    /// Assigned tones per book, for one book or (with `None`) for all of them.
    async fn tones_by_book(&self, book_id: Option<Uuid>) -> PortResult<HashMap<Uuid, Vec<Tone>>> {
        let records = sqlx::query_as::<_, BookToneRecord>(
            "SELECT bt.book_id, t.id, t.name, t.description, t.parent_id \
             FROM book_tones bt JOIN tones t ON t.id = bt.tone_id \
             WHERE ($1::uuid IS NULL OR bt.book_id = $1) ORDER BY t.name",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await
        .map_err(port_error)?;

        let mut by_book: HashMap<Uuid, Vec<Tone>> = HashMap::new();
        for record in records {
            by_book
                .entry(record.book_id)
                .or_default()
                .push(record.tone.to_domain());
        }
        Ok(by_book)
    }

    async fn fetch_book(&self, book_id: Uuid) -> PortResult<Book> {
        let record = sqlx::query_as::<_, BookRecord>(&format!(
            "SELECT {} FROM books WHERE id = $1",
            BOOK_COLUMNS
        ))
        .bind(book_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found(e, || format!("Book {}", book_id)))?;
        Ok(record.to_domain())
    }

    async fn review_entry(&self, review: BookReview) -> PortResult<ReviewEntry> {
        let book = self.fetch_book(review.book_id).await?;
        let bookshelves = self
            .bookshelves_by_book(Some(book.id))
            .await?
            .remove(&book.id)
            .unwrap_or_default();
        let tones = self
            .tones_by_book(Some(book.id))
            .await?
            .remove(&book.id)
            .unwrap_or_default();
        Ok(ReviewEntry {
            review,
            book,
            bookshelves,
            tones,
        })
    }
}

//=========================================================================================
// `CatalogStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl CatalogStore for DbAdapter {
    async fn load_import_snapshot(&self) -> PortResult<Vec<BookSnapshot>> {
        let records = sqlx::query_as::<_, SnapshotRecord>(
            "SELECT b.id, b.title, b.author_first_name, b.author_last_name, \
             COUNT(bb.bookshelf_id) AS bookshelf_count \
             FROM books b LEFT JOIN book_bookshelves bb ON bb.book_id = b.id \
             GROUP BY b.id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(port_error)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn list_bookshelves(&self) -> PortResult<Vec<Bookshelf>> {
        let records = sqlx::query_as::<_, BookshelfRecord>(&format!(
            "SELECT {} FROM bookshelves ORDER BY name",
            BOOKSHELF_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(port_error)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn create_bookshelf(&self, name: &str) -> PortResult<Bookshelf> {
        let record = sqlx::query_as::<_, BookshelfRecord>(&format!(
            "INSERT INTO bookshelves (id, name) VALUES ($1, $2) RETURNING {}",
            BOOKSHELF_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(port_error)?;
        Ok(record.to_domain())
    }

    async fn save_imported_book(&self, imported: ImportedBook) -> PortResult<SavedImport> {
        let ImportedBook {
            book,
            review,
            bookshelf_ids,
        } = imported;
        let book_id = Uuid::new_v4();
        let review_id = Uuid::new_v4();

        let mut tx = self.pool.begin().await.map_err(port_error)?;

        sqlx::query(
            "INSERT INTO books (id, title, author_first_name, author_last_name, isbn10, isbn13, \
             average_rating, number_of_pages, original_publication_year, searchable_string) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(book_id)
        .bind(&book.title)
        .bind(&book.author_first_name)
        .bind(&book.author_last_name)
        .bind(&book.isbn10)
        .bind(&book.isbn13)
        .bind(book.average_rating)
        .bind(book.number_of_pages)
        .bind(book.original_publication_year)
        .bind(&book.searchable_string)
        .execute(&mut *tx)
        .await
        .map_err(port_error)?;

        sqlx::query(
            "INSERT INTO book_reviews (id, book_id, reviewer_rating, reviewer_full_name, date_read, review) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(review_id)
        .bind(book_id)
        .bind(review.reviewer_rating)
        .bind(&review.reviewer_full_name)
        .bind(review.date_read)
        .bind(&review.review)
        .execute(&mut *tx)
        .await
        .map_err(port_error)?;

        sqlx::query(
            "INSERT INTO book_bookshelves (book_id, bookshelf_id) \
             SELECT $1, UNNEST($2::uuid[]) ON CONFLICT DO NOTHING",
        )
        .bind(book_id)
        .bind(&bookshelf_ids)
        .execute(&mut *tx)
        .await
        .map_err(port_error)?;

        tx.commit().await.map_err(port_error)?;
        debug!(book_id = %book_id, title = %book.title, "Saved imported book");
        Ok(SavedImport { book_id, review_id })
    }

    async fn delete_book(&self, book_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(book_id)
            .execute(&self.pool)
            .await
            .map_err(port_error)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Book {} not found", book_id)));
        }
        Ok(())
    }

    async fn delete_bookshelves(&self, bookshelf_ids: &[Uuid]) -> PortResult<u64> {
        let result = sqlx::query("DELETE FROM bookshelves WHERE id = ANY($1)")
            .bind(bookshelf_ids)
            .execute(&self.pool)
            .await
            .map_err(port_error)?;
        Ok(result.rows_affected())
    }

    async fn get_book(&self, book_id: Uuid) -> PortResult<BookDetail> {
        let book = self.fetch_book(book_id).await?;
        let bookshelves = self
            .bookshelves_by_book(Some(book_id))
            .await?
            .remove(&book_id)
            .unwrap_or_default();
        let tones = self
            .tones_by_book(Some(book_id))
            .await?
            .remove(&book_id)
            .unwrap_or_default();
        Ok(BookDetail {
            book,
            bookshelves,
            tones,
        })
    }

    async fn list_review_entries(&self) -> PortResult<Vec<ReviewEntry>> {
        let reviews = sqlx::query_as::<_, ReviewRecord>(&format!(
            "SELECT {} FROM book_reviews",
            REVIEW_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(port_error)?;
        let books: HashMap<Uuid, Book> = sqlx::query_as::<_, BookRecord>(&format!(
            "SELECT {} FROM books",
            BOOK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(port_error)?
        .into_iter()
        .map(|r| (r.id, r.to_domain()))
        .collect();
        let shelves = self.bookshelves_by_book(None).await?;
        let tones = self.tones_by_book(None).await?;

        let mut entries = Vec::with_capacity(reviews.len());
        for record in reviews {
            let review = record.to_domain();
            let Some(book) = books.get(&review.book_id) else {
                continue;
            };
            entries.push(ReviewEntry {
                bookshelves: shelves.get(&book.id).cloned().unwrap_or_default(),
                tones: tones.get(&book.id).cloned().unwrap_or_default(),
                book: book.clone(),
                review,
            });
        }
        Ok(entries)
    }

    async fn get_review_entry(&self, review_id: Uuid) -> PortResult<ReviewEntry> {
        let record = sqlx::query_as::<_, ReviewRecord>(&format!(
            "SELECT {} FROM book_reviews WHERE id = $1",
            REVIEW_COLUMNS
        ))
        .bind(review_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found(e, || format!("Book review {}", review_id)))?;
        self.review_entry(record.to_domain()).await
    }

    async fn get_bookshelf(&self, bookshelf_id: Uuid) -> PortResult<Bookshelf> {
        let record = sqlx::query_as::<_, BookshelfRecord>(&format!(
            "SELECT {} FROM bookshelves WHERE id = $1",
            BOOKSHELF_COLUMNS
        ))
        .bind(bookshelf_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found(e, || format!("Bookshelf {}", bookshelf_id)))?;
        Ok(record.to_domain())
    }

    async fn list_bookshelf_groupings(&self) -> PortResult<Vec<BookshelfGrouping>> {
        let groupings = sqlx::query_as::<_, GroupingRecord>(
            "SELECT id, name, is_genre_based, is_non_fiction_genre \
             FROM bookshelf_groupings ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(port_error)?;
        let members = sqlx::query_as::<_, GroupingMemberRecord>(
            "SELECT grouping_id, bookshelf_id FROM bookshelf_grouping_bookshelves",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(port_error)?;

        let mut by_grouping: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for member in members {
            by_grouping
                .entry(member.grouping_id)
                .or_default()
                .push(member.bookshelf_id);
        }

        Ok(groupings
            .into_iter()
            .map(|g| BookshelfGrouping {
                bookshelf_ids: by_grouping.remove(&g.id).unwrap_or_default(),
                id: g.id,
                name: g.name,
                is_genre_based: g.is_genre_based,
                is_non_fiction_genre: g.is_non_fiction_genre,
            })
            .collect())
    }

    async fn list_tones(&self) -> PortResult<Vec<Tone>> {
        let records = sqlx::query_as::<_, ToneRecord>(&format!(
            "SELECT {} FROM tones ORDER BY name",
            TONE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(port_error)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn update_bookshelf(&self, bookshelf: &Bookshelf) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE bookshelves SET name = $2, display = $3, is_genre_based = $4, \
             is_non_fiction_genre = $5 WHERE id = $1",
        )
        .bind(bookshelf.id)
        .bind(&bookshelf.name)
        .bind(bookshelf.display)
        .bind(bookshelf.is_genre_based)
        .bind(bookshelf.is_non_fiction_genre)
        .execute(&self.pool)
        .await
        .map_err(port_error)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Bookshelf {} not found", bookshelf.id)));
        }
        Ok(())
    }

    async fn save_bookshelf_grouping(
        &self,
        draft: BookshelfGroupingDraft,
    ) -> PortResult<BookshelfGrouping> {
        let mut tx = self.pool.begin().await.map_err(port_error)?;

        let id = match draft.id {
            Some(id) => {
                let result = sqlx::query(
                    "UPDATE bookshelf_groupings SET name = $2, is_genre_based = $3, \
                     is_non_fiction_genre = $4 WHERE id = $1",
                )
                .bind(id)
                .bind(&draft.name)
                .bind(draft.is_genre_based)
                .bind(draft.is_non_fiction_genre)
                .execute(&mut *tx)
                .await
                .map_err(port_error)?;
                if result.rows_affected() == 0 {
                    return Err(PortError::NotFound(format!(
                        "Bookshelf grouping {} not found",
                        id
                    )));
                }
                sqlx::query("DELETE FROM bookshelf_grouping_bookshelves WHERE grouping_id = $1")
                    .bind(id)
                    .execute(&mut *tx)
                    .await
                    .map_err(port_error)?;
                id
            }
            None => {
                let id = Uuid::new_v4();
                sqlx::query(
                    "INSERT INTO bookshelf_groupings (id, name, is_genre_based, is_non_fiction_genre) \
                     VALUES ($1, $2, $3, $4)",
                )
                .bind(id)
                .bind(&draft.name)
                .bind(draft.is_genre_based)
                .bind(draft.is_non_fiction_genre)
                .execute(&mut *tx)
                .await
                .map_err(port_error)?;
                id
            }
        };

        sqlx::query(
            "INSERT INTO bookshelf_grouping_bookshelves (grouping_id, bookshelf_id) \
             SELECT $1, UNNEST($2::uuid[]) ON CONFLICT DO NOTHING",
        )
        .bind(id)
        .bind(&draft.bookshelf_ids)
        .execute(&mut *tx)
        .await
        .map_err(port_error)?;

        tx.commit().await.map_err(port_error)?;
        Ok(BookshelfGrouping {
            id,
            name: draft.name,
            is_genre_based: draft.is_genre_based,
            is_non_fiction_genre: draft.is_non_fiction_genre,
            bookshelf_ids: draft.bookshelf_ids,
        })
    }

    async fn delete_bookshelf_groupings(&self, grouping_ids: &[Uuid]) -> PortResult<u64> {
        let result = sqlx::query("DELETE FROM bookshelf_groupings WHERE id = ANY($1)")
            .bind(grouping_ids)
            .execute(&self.pool)
            .await
            .map_err(port_error)?;
        Ok(result.rows_affected())
    }

    async fn create_tone(&self, tone: NewTone) -> PortResult<Tone> {
        let record = sqlx::query_as::<_, ToneRecord>(&format!(
            "INSERT INTO tones (id, name, description, parent_id) VALUES ($1, $2, $3, $4) \
             RETURNING {}",
            TONE_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&tone.name)
        .bind(&tone.description)
        .bind(tone.parent_id)
        .fetch_one(&self.pool)
        .await
        .map_err(port_error)?;
        Ok(record.to_domain())
    }

    async fn update_tone(&self, tone: &Tone) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE tones SET name = $2, description = $3, parent_id = $4 WHERE id = $1",
        )
        .bind(tone.id)
        .bind(&tone.name)
        .bind(&tone.description)
        .bind(tone.parent_id)
        .execute(&self.pool)
        .await
        .map_err(port_error)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Tone {} not found", tone.id)));
        }
        Ok(())
    }

    async fn delete_tones(&self, tone_ids: &[Uuid]) -> PortResult<u64> {
        let result = sqlx::query("DELETE FROM tones WHERE id = ANY($1)")
            .bind(tone_ids)
            .execute(&self.pool)
            .await
            .map_err(port_error)?;
        Ok(result.rows_affected())
    }

    async fn set_book_tones(&self, book_id: Uuid, tone_ids: &[Uuid]) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(port_error)?;

        sqlx::query("SELECT id FROM books WHERE id = $1")
            .bind(book_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| not_found(e, || format!("Book {}", book_id)))?;

        sqlx::query("DELETE FROM book_tones WHERE book_id = $1")
            .bind(book_id)
            .execute(&mut *tx)
            .await
            .map_err(port_error)?;

        sqlx::query(
            "INSERT INTO book_tones (book_id, tone_id) \
             SELECT $1, id FROM tones WHERE id = ANY($2) ON CONFLICT DO NOTHING",
        )
        .bind(book_id)
        .bind(tone_ids)
        .execute(&mut *tx)
        .await
        .map_err(port_error)?;

        tx.commit().await.map_err(port_error)?;
        Ok(())
    }

    async fn list_tone_recommendations(&self) -> PortResult<Vec<BookToneRecommendation>> {
        let records = sqlx::query_as::<_, RecommendationRecord>(&format!(
            "SELECT {} FROM book_tone_recommendations ORDER BY created_at",
            RECOMMENDATION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(port_error)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_tone_recommendation(&self, id: Uuid) -> PortResult<BookToneRecommendation> {
        let record = sqlx::query_as::<_, RecommendationRecord>(&format!(
            "SELECT {} FROM book_tone_recommendations WHERE id = $1",
            RECOMMENDATION_COLUMNS
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found(e, || format!("Book tone recommendation {}", id)))?;
        Ok(record.to_domain())
    }

    async fn create_tone_recommendation(
        &self,
        recommendation: NewBookToneRecommendation,
    ) -> PortResult<BookToneRecommendation> {
        let record = sqlx::query_as::<_, RecommendationRecord>(&format!(
            "INSERT INTO book_tone_recommendations (id, book_id, tone, feedback) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            RECOMMENDATION_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(recommendation.book_id)
        .bind(&recommendation.tone)
        .bind(recommendation.feedback)
        .fetch_one(&self.pool)
        .await
        .map_err(port_error)?;
        Ok(record.to_domain())
    }

    async fn update_tone_recommendation(
        &self,
        id: Uuid,
        feedback: i32,
        tone_id: Option<Uuid>,
    ) -> PortResult<BookToneRecommendation> {
        let record = sqlx::query_as::<_, RecommendationRecord>(&format!(
            "UPDATE book_tone_recommendations SET feedback = $2, tone_id = COALESCE($3, tone_id) \
             WHERE id = $1 RETURNING {}",
            RECOMMENDATION_COLUMNS
        ))
        .bind(id)
        .bind(feedback)
        .bind(tone_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found(e, || format!("Book tone recommendation {}", id)))?;
        Ok(record.to_domain())
    }
}
