//! Builders for Goodreads export files used across the integration tests.

#![allow(dead_code)]

use book_catalog_core::import::{import_goodreads_csv, ImportOptions, ImportSummary};
use book_catalog_core::InMemoryCatalog;

pub const HEADER: [&str; 20] = [
    "Book Id",
    "Title",
    "Author",
    "Author l-f",
    "Additional Authors",
    "ISBN",
    "ISBN13",
    "My Rating",
    "Average Rating",
    "Publisher",
    "Binding",
    "Number of Pages",
    "Year Published",
    "Original Publication Year",
    "Date Read",
    "Date Added",
    "Bookshelves",
    "Exclusive Shelf",
    "My Review",
    "Read Count",
];

/// One export row with the columns the tests care about.
#[derive(Debug, Clone)]
pub struct ExportRow {
    pub title: String,
    pub author_last_first: String,
    pub rating: String,
    pub bookshelves: String,
    pub review: String,
    pub date_read: String,
}

impl ExportRow {
    pub fn new(title: &str, author_last_first: &str) -> Self {
        Self {
            title: title.to_string(),
            author_last_first: author_last_first.to_string(),
            rating: "4".to_string(),
            bookshelves: String::new(),
            review: format!("Notes on {}", title),
            date_read: "2023/05/14".to_string(),
        }
    }

    pub fn shelves(mut self, shelves: &str) -> Self {
        self.bookshelves = shelves.to_string();
        self
    }

    pub fn rating(mut self, rating: &str) -> Self {
        self.rating = rating.to_string();
        self
    }

    pub fn review(mut self, review: &str) -> Self {
        self.review = review.to_string();
        self
    }

    pub fn date_read(mut self, date_read: &str) -> Self {
        self.date_read = date_read.to_string();
        self
    }

    fn author(&self) -> String {
        match self.author_last_first.split_once(", ") {
            Some((last, first)) => format!("{} {}", first, last),
            None => self.author_last_first.clone(),
        }
    }
}

/// Renders rows under the full export header.
pub fn export_csv(rows: &[ExportRow]) -> Vec<u8> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER).expect("write header");
    for (index, row) in rows.iter().enumerate() {
        let id = (index + 1).to_string();
        let author = row.author();
        writer
            .write_record([
                id.as_str(),
                row.title.as_str(),
                author.as_str(),
                row.author_last_first.as_str(),
                "",
                "=\"0441172717\"",
                "=\"9780441172719\"",
                row.rating.as_str(),
                "4.27",
                "Ace",
                "Paperback",
                "412",
                "1990",
                "1965",
                row.date_read.as_str(),
                "2023/05/01",
                row.bookshelves.as_str(),
                "read",
                row.review.as_str(),
                "1",
            ])
            .expect("write row");
    }
    writer.into_inner().expect("flush csv")
}

pub async fn import_rows(
    store: &InMemoryCatalog,
    rows: &[ExportRow],
    options: &ImportOptions,
) -> ImportSummary {
    import_goodreads_csv(store, export_csv(rows).as_slice(), options)
        .await
        .expect("import should succeed")
}

pub fn options() -> ImportOptions {
    ImportOptions::new("Levi Hobbs")
}
