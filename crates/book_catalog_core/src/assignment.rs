//! crates/book_catalog_core/src/assignment.rs
//!
//! The tone assignment workflow: fiction reviews with their assigned and
//! suggested tones, and the write path that replaces a book's tone set.

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{Bookshelf, BookshelfGrouping, ReviewEntry, Tone};
use crate::ports::{CatalogStore, PortResult};
use crate::tones::{build_tone_tree, suggest_tones, GenreToneLexicon, ToneNode, ToneSuggestionInput};

/// One review on the assignment screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToneAssignmentItem {
    pub review_id: Uuid,
    pub book_id: Uuid,
    pub title: String,
    pub author_name: String,
    pub genres: Vec<String>,
    pub review: Option<String>,
    pub assigned_tone_ids: Vec<Uuid>,
    pub suggested_tone_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToneAssignment {
    pub books_without_tones: Vec<ToneAssignmentItem>,
    pub books_with_tones: Vec<ToneAssignmentItem>,
    pub tones: Vec<ToneNode>,
}

/// The submitted tone set for one review's book.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToneAssignmentUpdate {
    pub review_id: Uuid,
    pub assigned_tone_ids: Vec<Uuid>,
}

/// Distinct names of the groupings that contain any of the shelves, sorted.
pub fn book_genres(bookshelves: &[Bookshelf], groupings: &[BookshelfGrouping]) -> Vec<String> {
    let shelf_ids: HashSet<Uuid> = bookshelves.iter().map(|s| s.id).collect();
    groupings
        .iter()
        .filter(|g| g.bookshelf_ids.iter().any(|id| shelf_ids.contains(id)))
        .map(|g| g.name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Tone suggestions for one review entry.
pub fn suggest_for_entry(
    entry: &ReviewEntry,
    genres: &[String],
    tones: &[Tone],
    lexicon: &GenreToneLexicon,
) -> BTreeSet<Uuid> {
    let shelf_names: Vec<String> = entry.bookshelves.iter().map(|s| s.name.clone()).collect();
    suggest_tones(
        &ToneSuggestionInput {
            bookshelf_names: &shelf_names,
            genres,
            searchable_string: entry.book.searchable_string.as_deref().unwrap_or_default(),
            review: entry.review.review.as_deref().unwrap_or_default(),
        },
        tones,
        lexicon,
    )
}

/// Reviews with content whose book is not shelved as non-fiction, ordered by
/// title and split on whether any tone is assigned yet.
pub async fn load_tone_assignment(
    store: &dyn CatalogStore,
    lexicon: &GenreToneLexicon,
) -> PortResult<ToneAssignment> {
    let groupings = store.list_bookshelf_groupings().await?;
    let tones = store.list_tones().await?;

    let mut entries: Vec<ReviewEntry> = store
        .list_review_entries()
        .await?
        .into_iter()
        .filter(|e| e.review.has_review_content)
        .filter(|e| !e.bookshelves.iter().any(Bookshelf::is_non_fiction))
        .collect();
    entries.sort_by(|a, b| a.book.title.cmp(&b.book.title));

    let mut assignment = ToneAssignment::default();
    for entry in entries {
        let genres = book_genres(&entry.bookshelves, &groupings);
        let suggested = suggest_for_entry(&entry, &genres, &tones, lexicon);
        let item = ToneAssignmentItem {
            review_id: entry.review.id,
            book_id: entry.book.id,
            title: entry.book.title.clone(),
            author_name: entry.book.author_name(),
            genres,
            review: entry.review.review.clone(),
            assigned_tone_ids: entry.tones.iter().map(|t| t.id).collect(),
            suggested_tone_ids: suggested.into_iter().collect(),
        };
        if item.assigned_tone_ids.is_empty() {
            assignment.books_without_tones.push(item);
        } else {
            assignment.books_with_tones.push(item);
        }
    }
    assignment.tones = build_tone_tree(tones);
    Ok(assignment)
}

/// Replaces the tone set of each listed review's book. Unknown tone ids are
/// dropped; unknown reviews are skipped. Returns the number of books updated.
pub async fn save_tone_assignment(
    store: &dyn CatalogStore,
    updates: &[ToneAssignmentUpdate],
) -> PortResult<usize> {
    let known_tones: HashSet<Uuid> = store.list_tones().await?.into_iter().map(|t| t.id).collect();
    let books_by_review: HashMap<Uuid, Uuid> = store
        .list_review_entries()
        .await?
        .into_iter()
        .map(|e| (e.review.id, e.book.id))
        .collect();

    let mut updated = 0usize;
    for update in updates {
        let Some(book_id) = books_by_review.get(&update.review_id) else {
            warn!(review_id = %update.review_id, "Skipping tone assignment for unknown review");
            continue;
        };
        let tone_ids: Vec<Uuid> = update
            .assigned_tone_ids
            .iter()
            .copied()
            .filter(|id| known_tones.contains(id))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        store.set_book_tones(*book_id, &tone_ids).await?;
        updated += 1;
    }

    info!(books = updated, "Saved tone assignments");
    Ok(updated)
}
