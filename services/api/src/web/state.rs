//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use book_catalog_core::import::ImportOptions;
use book_catalog_core::ports::CatalogStore;
use book_catalog_core::tones::GenreToneLexicon;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CatalogStore>,
    pub config: Arc<Config>,
    pub lexicon: Arc<GenreToneLexicon>,
}

impl AppState {
    pub fn new(store: Arc<dyn CatalogStore>, config: Arc<Config>, lexicon: GenreToneLexicon) -> Self {
        Self {
            store,
            config,
            lexicon: Arc::new(lexicon),
        }
    }

    /// Import settings derived from the loaded configuration.
    pub fn import_options(&self) -> ImportOptions {
        ImportOptions::new(self.config.reviewer_name.clone())
            .with_pruning(self.config.prune_bookshelves_on_import)
    }
}
