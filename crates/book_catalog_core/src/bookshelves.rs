//! crates/book_catalog_core/src/bookshelves.rs
//!
//! Keeps the stored bookshelves in step with an import batch: shelves named by
//! imported rows are created on first sight and reused afterwards, and once the
//! batch is done every shelf no row mentioned is pruned.

use std::collections::HashSet;

use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::Bookshelf;
use crate::ports::{CatalogStore, PortResult};

/// In-memory list of shelves for the duration of one import.
#[derive(Debug, Default)]
pub struct BookshelfWorkingSet {
    shelves: Vec<Bookshelf>,
    created: usize,
}

impl BookshelfWorkingSet {
    pub fn new(shelves: Vec<Bookshelf>) -> Self {
        Self { shelves, created: 0 }
    }

    /// Case-insensitive lookup by name.
    pub fn find(&self, name: &str) -> Option<&Bookshelf> {
        let wanted = name.to_lowercase();
        self.shelves.iter().find(|s| s.name.to_lowercase() == wanted)
    }

    /// Returns the id of the shelf called `name`, creating it in the store
    /// when no shelf matches. New shelves are visible to later rows at once.
    pub async fn resolve(&mut self, store: &dyn CatalogStore, name: &str) -> PortResult<Uuid> {
        if let Some(existing) = self.find(name) {
            return Ok(existing.id);
        }

        let created = store.create_bookshelf(name).await?;
        debug!(bookshelf = %created.name, "Created bookshelf");
        let id = created.id;
        self.shelves.push(created);
        self.created += 1;
        Ok(id)
    }

    /// Resolves every name, in order.
    pub async fn resolve_all(
        &mut self,
        store: &dyn CatalogStore,
        names: &[String],
    ) -> PortResult<Vec<Uuid>> {
        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            let id = self.resolve(store, name).await?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    pub fn created(&self) -> usize {
        self.created
    }

    pub fn len(&self) -> usize {
        self.shelves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shelves.is_empty()
    }
}

/// Lowercased names of every shelf mentioned anywhere in a batch.
#[derive(Debug, Default, Clone)]
pub struct ReferencedBookshelves {
    names: HashSet<String>,
}

impl ReferencedBookshelves {
    pub fn record<'a>(&mut self, names: impl IntoIterator<Item = &'a String>) {
        self.names.extend(names.into_iter().map(|name| name.to_lowercase()));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Deletes every stored shelf whose name the batch did not reference.
/// Books and groupings lose their links to the deleted shelves.
pub async fn prune_unreferenced(
    store: &dyn CatalogStore,
    referenced: &ReferencedBookshelves,
) -> PortResult<u64> {
    let shelves = store.list_bookshelves().await?;
    let stale: Vec<&Bookshelf> = shelves
        .iter()
        .filter(|shelf| !referenced.contains(&shelf.name))
        .collect();

    if stale.is_empty() {
        debug!("No unreferenced bookshelves to prune");
        return Ok(0);
    }

    let names: Vec<&str> = stale.iter().map(|s| s.name.as_str()).collect();
    let ids: Vec<Uuid> = stale.iter().map(|s| s.id).collect();
    let deleted = store.delete_bookshelves(&ids).await?;
    info!(count = deleted, bookshelves = ?names, "Pruned bookshelves not referenced by the import");
    Ok(deleted)
}
