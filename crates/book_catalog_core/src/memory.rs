//! crates/book_catalog_core/src/memory.rs
//!
//! An in-process `CatalogStore`. It mirrors the constraints of the SQL schema
//! (unique names, cascading deletes, the computed `has_review_content` flag)
//! so the import pipeline and the HTTP layer can be exercised without a
//! database.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::{
    review_has_content, Book, BookDetail, BookReview, BookSnapshot, BookToneRecommendation,
    Bookshelf, BookshelfGrouping, BookshelfGroupingDraft, ImportedBook,
    NewBookToneRecommendation, NewTone, ReviewEntry, SavedImport, Tone,
};
use crate::ports::{CatalogStore, PortError, PortResult};

#[derive(Debug, Default)]
struct CatalogState {
    books: Vec<Book>,
    reviews: Vec<BookReview>,
    bookshelves: Vec<Bookshelf>,
    book_bookshelves: Vec<(Uuid, Uuid)>,
    groupings: Vec<BookshelfGrouping>,
    tones: Vec<Tone>,
    book_tones: Vec<(Uuid, Uuid)>,
    recommendations: Vec<BookToneRecommendation>,
}

impl CatalogState {
    fn book(&self, book_id: Uuid) -> PortResult<&Book> {
        self.books
            .iter()
            .find(|b| b.id == book_id)
            .ok_or_else(|| PortError::NotFound(format!("Book {} not found", book_id)))
    }

    fn shelves_of(&self, book_id: Uuid) -> Vec<Bookshelf> {
        self.book_bookshelves
            .iter()
            .filter(|(b, _)| *b == book_id)
            .filter_map(|(_, s)| self.bookshelves.iter().find(|shelf| shelf.id == *s))
            .cloned()
            .collect()
    }

    fn tones_of(&self, book_id: Uuid) -> Vec<Tone> {
        self.book_tones
            .iter()
            .filter(|(b, _)| *b == book_id)
            .filter_map(|(_, t)| self.tones.iter().find(|tone| tone.id == *t))
            .cloned()
            .collect()
    }

    fn entry(&self, review: &BookReview) -> PortResult<ReviewEntry> {
        Ok(ReviewEntry {
            review: review.clone(),
            book: self.book(review.book_id)?.clone(),
            bookshelves: self.shelves_of(review.book_id),
            tones: self.tones_of(review.book_id),
        })
    }

    fn tone_name_taken(&self, name: &str, except: Option<Uuid>) -> bool {
        self.tones
            .iter()
            .any(|t| t.name == name && Some(t.id) != except)
    }
}

/// A `CatalogStore` held entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    state: Mutex<CatalogState>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> PortResult<MutexGuard<'_, CatalogState>> {
        self.state
            .lock()
            .map_err(|_| PortError::Unexpected("catalog state lock poisoned".to_string()))
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn load_import_snapshot(&self) -> PortResult<Vec<BookSnapshot>> {
        let state = self.lock()?;
        Ok(state
            .books
            .iter()
            .map(|book| BookSnapshot {
                id: book.id,
                title: book.title.clone(),
                author_first_name: book.author_first_name.clone(),
                author_last_name: book.author_last_name.clone(),
                bookshelf_count: state
                    .book_bookshelves
                    .iter()
                    .filter(|(b, _)| *b == book.id)
                    .count(),
            })
            .collect())
    }

    async fn list_bookshelves(&self) -> PortResult<Vec<Bookshelf>> {
        Ok(self.lock()?.bookshelves.clone())
    }

    async fn create_bookshelf(&self, name: &str) -> PortResult<Bookshelf> {
        let mut state = self.lock()?;
        let key = name.to_lowercase();
        if state.bookshelves.iter().any(|s| s.name.to_lowercase() == key) {
            return Err(PortError::Conflict(format!("Bookshelf '{}' already exists", name)));
        }
        let shelf = Bookshelf {
            id: Uuid::new_v4(),
            name: name.to_string(),
            display: None,
            is_genre_based: false,
            is_non_fiction_genre: false,
        };
        state.bookshelves.push(shelf.clone());
        Ok(shelf)
    }

    async fn save_imported_book(&self, imported: ImportedBook) -> PortResult<SavedImport> {
        let mut state = self.lock()?;
        for shelf_id in &imported.bookshelf_ids {
            if !state.bookshelves.iter().any(|s| s.id == *shelf_id) {
                return Err(PortError::NotFound(format!("Bookshelf {} not found", shelf_id)));
            }
        }

        let ImportedBook {
            book,
            review,
            bookshelf_ids,
        } = imported;
        let book_id = Uuid::new_v4();
        let review_id = Uuid::new_v4();

        state.books.push(Book {
            id: book_id,
            title: book.title,
            author_first_name: book.author_first_name,
            author_last_name: book.author_last_name,
            isbn10: book.isbn10,
            isbn13: book.isbn13,
            average_rating: book.average_rating,
            number_of_pages: book.number_of_pages,
            original_publication_year: book.original_publication_year,
            searchable_string: book.searchable_string,
            cover_image_id: None,
        });
        state.reviews.push(BookReview {
            id: review_id,
            book_id,
            reviewer_rating: review.reviewer_rating,
            reviewer_full_name: review.reviewer_full_name,
            date_read: review.date_read,
            has_review_content: review_has_content(review.review.as_deref()),
            review: review.review,
        });
        for shelf_id in bookshelf_ids {
            if !state.book_bookshelves.contains(&(book_id, shelf_id)) {
                state.book_bookshelves.push((book_id, shelf_id));
            }
        }

        Ok(SavedImport { book_id, review_id })
    }

    async fn delete_book(&self, book_id: Uuid) -> PortResult<()> {
        let mut state = self.lock()?;
        state.book(book_id)?;
        state.books.retain(|b| b.id != book_id);
        state.reviews.retain(|r| r.book_id != book_id);
        state.book_bookshelves.retain(|(b, _)| *b != book_id);
        state.book_tones.retain(|(b, _)| *b != book_id);
        state.recommendations.retain(|r| r.book_id != book_id);
        Ok(())
    }

    async fn delete_bookshelves(&self, bookshelf_ids: &[Uuid]) -> PortResult<u64> {
        let mut state = self.lock()?;
        let before = state.bookshelves.len();
        state.bookshelves.retain(|s| !bookshelf_ids.contains(&s.id));
        state
            .book_bookshelves
            .retain(|(_, s)| !bookshelf_ids.contains(s));
        for grouping in state.groupings.iter_mut() {
            grouping.bookshelf_ids.retain(|s| !bookshelf_ids.contains(s));
        }
        Ok((before - state.bookshelves.len()) as u64)
    }

    async fn get_book(&self, book_id: Uuid) -> PortResult<BookDetail> {
        let state = self.lock()?;
        Ok(BookDetail {
            book: state.book(book_id)?.clone(),
            bookshelves: state.shelves_of(book_id),
            tones: state.tones_of(book_id),
        })
    }

    async fn list_review_entries(&self) -> PortResult<Vec<ReviewEntry>> {
        let state = self.lock()?;
        state.reviews.iter().map(|r| state.entry(r)).collect()
    }

    async fn get_review_entry(&self, review_id: Uuid) -> PortResult<ReviewEntry> {
        let state = self.lock()?;
        let review = state
            .reviews
            .iter()
            .find(|r| r.id == review_id)
            .ok_or_else(|| PortError::NotFound(format!("Book review {} not found", review_id)))?;
        state.entry(review)
    }

    async fn get_bookshelf(&self, bookshelf_id: Uuid) -> PortResult<Bookshelf> {
        self.lock()?
            .bookshelves
            .iter()
            .find(|s| s.id == bookshelf_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Bookshelf {} not found", bookshelf_id)))
    }

    async fn list_bookshelf_groupings(&self) -> PortResult<Vec<BookshelfGrouping>> {
        Ok(self.lock()?.groupings.clone())
    }

    async fn list_tones(&self) -> PortResult<Vec<Tone>> {
        Ok(self.lock()?.tones.clone())
    }

    async fn update_bookshelf(&self, bookshelf: &Bookshelf) -> PortResult<()> {
        let mut state = self.lock()?;
        let stored = state
            .bookshelves
            .iter_mut()
            .find(|s| s.id == bookshelf.id)
            .ok_or_else(|| PortError::NotFound(format!("Bookshelf {} not found", bookshelf.id)))?;
        *stored = bookshelf.clone();
        Ok(())
    }

    async fn save_bookshelf_grouping(
        &self,
        draft: BookshelfGroupingDraft,
    ) -> PortResult<BookshelfGrouping> {
        let mut state = self.lock()?;
        if state
            .groupings
            .iter()
            .any(|g| g.name == draft.name && Some(g.id) != draft.id)
        {
            return Err(PortError::Conflict(format!(
                "Bookshelf grouping '{}' already exists",
                draft.name
            )));
        }

        let grouping = BookshelfGrouping {
            id: draft.id.unwrap_or_else(Uuid::new_v4),
            name: draft.name,
            is_genre_based: draft.is_genre_based,
            is_non_fiction_genre: draft.is_non_fiction_genre,
            bookshelf_ids: draft.bookshelf_ids,
        };
        match draft.id {
            Some(id) => {
                let stored = state
                    .groupings
                    .iter_mut()
                    .find(|g| g.id == id)
                    .ok_or_else(|| {
                        PortError::NotFound(format!("Bookshelf grouping {} not found", id))
                    })?;
                *stored = grouping.clone();
            }
            None => state.groupings.push(grouping.clone()),
        }
        Ok(grouping)
    }

    async fn delete_bookshelf_groupings(&self, grouping_ids: &[Uuid]) -> PortResult<u64> {
        let mut state = self.lock()?;
        let before = state.groupings.len();
        state.groupings.retain(|g| !grouping_ids.contains(&g.id));
        Ok((before - state.groupings.len()) as u64)
    }

    async fn create_tone(&self, tone: NewTone) -> PortResult<Tone> {
        let mut state = self.lock()?;
        if state.tone_name_taken(&tone.name, None) {
            return Err(PortError::Conflict(format!("Tone '{}' already exists", tone.name)));
        }
        if let Some(parent_id) = tone.parent_id {
            if !state.tones.iter().any(|t| t.id == parent_id) {
                return Err(PortError::NotFound(format!("Tone {} not found", parent_id)));
            }
        }
        let created = Tone {
            id: Uuid::new_v4(),
            name: tone.name,
            description: tone.description,
            parent_id: tone.parent_id,
        };
        state.tones.push(created.clone());
        Ok(created)
    }

    async fn update_tone(&self, tone: &Tone) -> PortResult<()> {
        let mut state = self.lock()?;
        if state.tone_name_taken(&tone.name, Some(tone.id)) {
            return Err(PortError::Conflict(format!("Tone '{}' already exists", tone.name)));
        }
        let stored = state
            .tones
            .iter_mut()
            .find(|t| t.id == tone.id)
            .ok_or_else(|| PortError::NotFound(format!("Tone {} not found", tone.id)))?;
        *stored = tone.clone();
        Ok(())
    }

    async fn delete_tones(&self, tone_ids: &[Uuid]) -> PortResult<u64> {
        let mut state = self.lock()?;
        if state
            .tones
            .iter()
            .any(|t| t.parent_id.is_some_and(|p| tone_ids.contains(&p)) && !tone_ids.contains(&t.id))
        {
            return Err(PortError::Conflict(
                "Cannot delete a tone that still has subtones".to_string(),
            ));
        }
        let before = state.tones.len();
        state.tones.retain(|t| !tone_ids.contains(&t.id));
        state.book_tones.retain(|(_, t)| !tone_ids.contains(t));
        for recommendation in state.recommendations.iter_mut() {
            if recommendation.tone_id.is_some_and(|t| tone_ids.contains(&t)) {
                recommendation.tone_id = None;
            }
        }
        Ok((before - state.tones.len()) as u64)
    }

    async fn set_book_tones(&self, book_id: Uuid, tone_ids: &[Uuid]) -> PortResult<()> {
        let mut state = self.lock()?;
        state.book(book_id)?;
        state.book_tones.retain(|(b, _)| *b != book_id);
        for tone_id in tone_ids {
            if state.tones.iter().any(|t| t.id == *tone_id) {
                state.book_tones.push((book_id, *tone_id));
            }
        }
        Ok(())
    }

    async fn list_tone_recommendations(&self) -> PortResult<Vec<BookToneRecommendation>> {
        Ok(self.lock()?.recommendations.clone())
    }

    async fn get_tone_recommendation(&self, id: Uuid) -> PortResult<BookToneRecommendation> {
        self.lock()?
            .recommendations
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Book tone recommendation {} not found", id)))
    }

    async fn create_tone_recommendation(
        &self,
        recommendation: NewBookToneRecommendation,
    ) -> PortResult<BookToneRecommendation> {
        let mut state = self.lock()?;
        state.book(recommendation.book_id)?;
        let created = BookToneRecommendation {
            id: Uuid::new_v4(),
            book_id: recommendation.book_id,
            tone: recommendation.tone,
            tone_id: None,
            feedback: recommendation.feedback,
            created_at: Utc::now(),
        };
        state.recommendations.push(created.clone());
        Ok(created)
    }

    async fn update_tone_recommendation(
        &self,
        id: Uuid,
        feedback: i32,
        tone_id: Option<Uuid>,
    ) -> PortResult<BookToneRecommendation> {
        let mut state = self.lock()?;
        let stored = state
            .recommendations
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| PortError::NotFound(format!("Book tone recommendation {} not found", id)))?;
        stored.feedback = feedback;
        if tone_id.is_some() {
            stored.tone_id = tone_id;
        }
        Ok(stored.clone())
    }
}
