//! crates/book_catalog_core/src/recommendations.rs
//!
//! Feedback on tone suggestions. A recommendation records how useful a
//! suggested tone was for a book, whether or not it was assigned.

use uuid::Uuid;

use crate::domain::{BookToneRecommendation, NewBookToneRecommendation};
use crate::ports::{require_book, CatalogStore, PortError, PortResult};

pub const MIN_FEEDBACK: i32 = -2;
pub const MAX_FEEDBACK: i32 = 1;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecommendationFilter {
    pub book_id: Option<Uuid>,
    /// Substring of the tone name.
    pub tone: Option<String>,
}

fn check_feedback(feedback: i32) -> PortResult<()> {
    if (MIN_FEEDBACK..=MAX_FEEDBACK).contains(&feedback) {
        Ok(())
    } else {
        Err(PortError::Invalid(format!(
            "Feedback must be between {} and {}, got {}",
            MIN_FEEDBACK, MAX_FEEDBACK, feedback
        )))
    }
}

pub async fn list_recommendations(
    store: &dyn CatalogStore,
    filter: &RecommendationFilter,
) -> PortResult<Vec<BookToneRecommendation>> {
    let tone = filter.tone.as_deref().filter(|t| !t.is_empty());
    Ok(store
        .list_tone_recommendations()
        .await?
        .into_iter()
        .filter(|r| filter.book_id.map_or(true, |id| r.book_id == id))
        .filter(|r| tone.map_or(true, |t| r.tone.contains(t)))
        .collect())
}

/// Records feedback for a (book, tone) pair. The book must exist and the pair
/// must not have feedback yet.
pub async fn create_recommendation(
    store: &dyn CatalogStore,
    recommendation: NewBookToneRecommendation,
) -> PortResult<BookToneRecommendation> {
    check_feedback(recommendation.feedback)?;
    if recommendation.tone.trim().is_empty() {
        return Err(PortError::Invalid("Tone cannot be empty".to_string()));
    }

    require_book(store, recommendation.book_id)
        .await
        .map_err(|e| match e {
            PortError::NotFound(_) => PortError::Invalid(format!(
                "Book with ID {} does not exist",
                recommendation.book_id
            )),
            other => other,
        })?;

    let exists = store
        .list_tone_recommendations()
        .await?
        .iter()
        .any(|r| r.book_id == recommendation.book_id && r.tone == recommendation.tone);
    if exists {
        return Err(PortError::Conflict(format!(
            "A recommendation for book {} with tone '{}' already exists",
            recommendation.book_id, recommendation.tone
        )));
    }

    store.create_tone_recommendation(recommendation).await
}

/// Updates the feedback and, when given, the tone id of a recommendation.
pub async fn update_recommendation(
    store: &dyn CatalogStore,
    id: Uuid,
    feedback: i32,
    tone_id: Option<Uuid>,
) -> PortResult<BookToneRecommendation> {
    check_feedback(feedback)?;
    store.update_tone_recommendation(id, feedback, tone_id).await
}
