//! crates/book_catalog_core/src/reviews.rs
//!
//! Read-side operations over reviews: the listing shown on the front page,
//! free-text search, and the derived presentation fields of a review.

use std::cmp::Ordering;
use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::domain::{Bookshelf, BookshelfGrouping, ReviewEntry};
use crate::ports::{CatalogStore, PortResult};

pub const PREVIEW_LENGTH: usize = 300;
/// Truncated previews are cut back to a word boundary past this point.
const PREVIEW_MIN_WORD_BREAK: usize = 250;
pub const WORDS_PER_MINUTE: usize = 250;
pub const RECENT_REVIEW_LIMIT: usize = 10;
pub const SEARCH_RESULT_LIMIT: usize = 50;
pub const DEFAULT_SHELF: &str = "favorites";

/// Any tag other than `<b>`, `</b>`, `<i>`, `</i>`. The regex crate has no
/// lookahead, so the allowed tags are filtered in `strip_disallowed_tags`.
static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

fn is_inline_emphasis(tag: &str) -> bool {
    matches!(tag, "<b>" | "</b>" | "<i>" | "</i>")
}

fn strip_disallowed_tags(text: &str) -> String {
    ANY_TAG
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let tag = &caps[0];
            if is_inline_emphasis(tag) {
                tag.to_string()
            } else {
                String::new()
            }
        })
        .into_owned()
}

/// The first 300 characters of a review with only bold/italic markup kept,
/// followed by a "Read More" link when the text was cut.
pub fn preview_text(review_id: Uuid, review: Option<&str>) -> String {
    let Some(review) = review.filter(|r| !r.trim().is_empty()) else {
        return String::new();
    };

    let clean = strip_disallowed_tags(review);
    let total = clean.chars().count();
    if total <= PREVIEW_LENGTH {
        return clean;
    }

    let mut preview: String = clean.chars().take(PREVIEW_LENGTH).collect();
    if let Some(last_space) = preview.rfind(' ') {
        if preview[..last_space].chars().count() > PREVIEW_MIN_WORD_BREAK {
            preview.truncate(last_space);
        }
    }
    preview.push_str(&format!(
        "... <a href=\"/read/reviews/{}\">Read More</a>",
        review_id
    ));
    preview
}

/// Estimated minutes to read a review at 250 words per minute, at least one
/// for any non-empty review.
pub fn reading_time_minutes(review: Option<&str>) -> usize {
    let Some(review) = review.filter(|r| !r.trim().is_empty()) else {
        return 0;
    };
    let plain = ANY_TAG.replace_all(review, "");
    let words = plain.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1)
}

/// Filters accepted by the review listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewQuery {
    pub shelf: Option<String>,
    pub grouping: Option<String>,
    pub recent: bool,
}

/// The review listing plus the navigation it is shown with.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewListing {
    pub reviews: Vec<ReviewEntry>,
    pub bookshelves: Vec<Bookshelf>,
    pub groupings: Vec<BookshelfGrouping>,
    pub use_custom_mappings: bool,
    pub selected_shelf: Option<String>,
    pub selected_grouping: Option<String>,
    pub recent: bool,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Newest first; undated reviews last.
fn by_date_read_desc(a: &ReviewEntry, b: &ReviewEntry) -> Ordering {
    match (a.review.date_read, b.review.date_read) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Lists reviews with content. `recent` wins over `grouping`, which wins over
/// `shelf`; with none of them the `favorites` shelf is shown.
pub async fn list_reviews(store: &dyn CatalogStore, query: &ReviewQuery) -> PortResult<ReviewListing> {
    let mut shelves = store.list_bookshelves().await?;
    let mut groupings = store.list_bookshelf_groupings().await?;
    let use_custom_mappings = shelves.iter().any(|s| s.display.is_some());

    if use_custom_mappings {
        let grouped: HashSet<Uuid> = groupings
            .iter()
            .flat_map(|g| g.bookshelf_ids.iter().copied())
            .collect();
        shelves.retain(|s| s.display == Some(true) && !grouped.contains(&s.id));
        groupings.sort_by_key(|g| g.name.to_lowercase());
    } else {
        groupings.clear();
    }
    shelves.sort_by_key(|s| s.name.to_lowercase());

    let grouping = non_empty(&query.grouping).map(str::to_string);
    let mut shelf = non_empty(&query.shelf).map(str::to_string);
    if shelf.is_none() && grouping.is_none() && !query.recent {
        shelf = Some(DEFAULT_SHELF.to_string());
    }

    let mut reviews: Vec<ReviewEntry> = store
        .list_review_entries()
        .await?
        .into_iter()
        .filter(|entry| entry.review.has_review_content)
        .collect();
    reviews.sort_by(by_date_read_desc);

    if query.recent {
        reviews.truncate(RECENT_REVIEW_LIMIT);
    } else if let Some(grouping_name) = grouping.as_deref() {
        let member_ids: HashSet<Uuid> = store
            .list_bookshelf_groupings()
            .await?
            .into_iter()
            .filter(|g| g.name.eq_ignore_ascii_case(grouping_name))
            .flat_map(|g| g.bookshelf_ids)
            .collect();
        reviews.retain(|entry| entry.bookshelves.iter().any(|s| member_ids.contains(&s.id)));
    } else if let Some(shelf_name) = shelf.as_deref() {
        reviews.retain(|entry| {
            entry
                .bookshelves
                .iter()
                .any(|s| s.name.eq_ignore_ascii_case(shelf_name))
        });
    }

    Ok(ReviewListing {
        reviews,
        bookshelves: shelves,
        groupings,
        use_custom_mappings,
        selected_shelf: shelf,
        selected_grouping: grouping,
        recent: query.recent,
    })
}

/// Reviews whose book search string contains `term`, newest first, capped at
/// fifty. A blank term finds nothing.
pub async fn search_reviews(store: &dyn CatalogStore, term: &str) -> PortResult<Vec<ReviewEntry>> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return Ok(Vec::new());
    }

    let mut matches: Vec<ReviewEntry> = store
        .list_review_entries()
        .await?
        .into_iter()
        .filter(|entry| {
            entry
                .book
                .searchable_string
                .as_deref()
                .is_some_and(|s| s.contains(&term))
        })
        .collect();
    matches.sort_by(by_date_read_desc);
    matches.truncate(SEARCH_RESULT_LIMIT);
    Ok(matches)
}
