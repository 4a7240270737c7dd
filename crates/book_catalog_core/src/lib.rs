pub mod assignment;
pub mod bookshelves;
pub mod configuration;
pub mod domain;
pub mod error;
pub mod goodreads;
pub mod import;
pub mod memory;
pub mod normalize;
pub mod ports;
pub mod recommendations;
pub mod reviews;
pub mod tones;

pub use domain::{
    Book, BookDetail, BookReview, BookSnapshot, BookToneRecommendation, Bookshelf,
    BookshelfGrouping, BookshelfGroupingDraft, ImportedBook, NewBook, NewBookReview,
    NewBookToneRecommendation, NewTone, ReviewEntry, SavedImport, Tone,
};
pub use error::ImportError;
pub use import::{import_goodreads_csv, ImportOptions, ImportSummary};
pub use memory::InMemoryCatalog;
pub use ports::{CatalogStore, PortError, PortResult};
pub use tones::GenreToneLexicon;
