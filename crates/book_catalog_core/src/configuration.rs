//! crates/book_catalog_core/src/configuration.rs
//!
//! Bookshelf display settings and groupings.
//!
//! Custom mappings are "on" while any shelf carries an explicit display flag.
//! Switching them off resets every flag to `None`. Groupings push their genre
//! and non-fiction flags down onto their member shelves.

use std::collections::{HashMap, HashSet};

use tracing::info;
use uuid::Uuid;

use crate::domain::{Bookshelf, BookshelfGrouping, BookshelfGroupingDraft};
use crate::ports::{CatalogStore, PortError, PortResult};

/// Per-shelf settings as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BookshelfSetting {
    pub id: Uuid,
    pub display: bool,
    pub is_genre_based: bool,
    pub is_non_fiction_genre: bool,
}

/// A grouping as submitted. `id == None` creates it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroupingSetting {
    pub id: Option<Uuid>,
    pub name: String,
    pub is_genre_based: bool,
    pub is_non_fiction_genre: bool,
    pub bookshelf_ids: Vec<Uuid>,
    pub remove: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BookshelfConfiguration {
    pub enable_custom_mappings: bool,
    pub bookshelves: Vec<Bookshelf>,
    pub groupings: Vec<BookshelfGrouping>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BookshelfConfigurationUpdate {
    pub enable_custom_mappings: bool,
    pub bookshelves: Vec<BookshelfSetting>,
    pub groupings: Vec<GroupingSetting>,
}

/// Current shelves and groupings, both sorted by name.
pub async fn load_bookshelf_configuration(
    store: &dyn CatalogStore,
) -> PortResult<BookshelfConfiguration> {
    let mut bookshelves = store.list_bookshelves().await?;
    let mut groupings = store.list_bookshelf_groupings().await?;
    bookshelves.sort_by_key(|s| s.name.to_lowercase());
    groupings.sort_by_key(|g| g.name.to_lowercase());

    Ok(BookshelfConfiguration {
        enable_custom_mappings: bookshelves.iter().any(|s| s.display.is_some()),
        bookshelves,
        groupings,
    })
}

/// Saves display flags and groupings, then returns the new configuration.
pub async fn save_bookshelf_configuration(
    store: &dyn CatalogStore,
    update: &BookshelfConfigurationUpdate,
) -> PortResult<BookshelfConfiguration> {
    let stored = store.list_bookshelves().await?;
    let existing_groupings: HashSet<Uuid> = store
        .list_bookshelf_groupings()
        .await?
        .into_iter()
        .map(|g| g.id)
        .collect();

    let mut names = HashSet::new();
    for grouping in update.groupings.iter().filter(|g| !g.remove) {
        let name = grouping.name.trim();
        if name.is_empty() {
            return Err(PortError::Invalid("Grouping names cannot be empty".to_string()));
        }
        if !names.insert(name.to_lowercase()) {
            return Err(PortError::Invalid(format!("Duplicate grouping name '{}'", name)));
        }
    }
    for id in update.groupings.iter().filter_map(|g| g.id) {
        if !existing_groupings.contains(&id) {
            return Err(PortError::NotFound(format!("Bookshelf grouping {} not found", id)));
        }
    }

    let settings: HashMap<Uuid, &BookshelfSetting> =
        update.bookshelves.iter().map(|s| (s.id, s)).collect();
    let mut shelves: Vec<Bookshelf> = stored
        .iter()
        .cloned()
        .map(|mut shelf| {
            if update.enable_custom_mappings {
                let setting = settings.get(&shelf.id);
                shelf.display = Some(setting.is_some_and(|s| s.display));
                shelf.is_genre_based = setting.is_some_and(|s| s.is_genre_based);
                shelf.is_non_fiction_genre = setting.is_some_and(|s| s.is_non_fiction_genre);
            } else {
                shelf.display = None;
            }
            shelf
        })
        .collect();

    let removed: Vec<Uuid> = update
        .groupings
        .iter()
        .filter(|g| g.remove)
        .filter_map(|g| g.id)
        .collect();
    let removed_count = store.delete_bookshelf_groupings(&removed).await?;

    let known: HashSet<Uuid> = shelves.iter().map(|s| s.id).collect();
    let mut grouped: HashSet<Uuid> = HashSet::new();
    let mut saved = 0usize;
    for grouping in update.groupings.iter().filter(|g| !g.remove) {
        let members: Vec<Uuid> = grouping
            .bookshelf_ids
            .iter()
            .copied()
            .filter(|id| known.contains(id))
            .collect();

        for shelf in shelves.iter_mut().filter(|s| members.contains(&s.id)) {
            shelf.is_genre_based = grouping.is_genre_based;
            shelf.is_non_fiction_genre = grouping.is_non_fiction_genre;
        }
        grouped.extend(members.iter().copied());

        store
            .save_bookshelf_grouping(BookshelfGroupingDraft {
                id: grouping.id,
                name: grouping.name.trim().to_string(),
                is_genre_based: grouping.is_genre_based,
                is_non_fiction_genre: grouping.is_non_fiction_genre,
                bookshelf_ids: members,
            })
            .await?;
        saved += 1;
    }

    if update.enable_custom_mappings {
        for shelf in shelves.iter_mut() {
            if grouped.contains(&shelf.id) || shelf.is_genre_based {
                shelf.display = Some(true);
            }
        }
    }

    let mut changed = 0usize;
    for (before, after) in stored.iter().zip(shelves.iter()) {
        if before != after {
            store.update_bookshelf(after).await?;
            changed += 1;
        }
    }

    info!(
        custom_mappings = update.enable_custom_mappings,
        bookshelves_changed = changed,
        groupings_saved = saved,
        groupings_removed = removed_count,
        "Saved bookshelf configuration"
    );
    load_bookshelf_configuration(store).await
}
