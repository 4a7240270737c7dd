//! crates/book_catalog_core/src/goodreads.rs
//!
//! Reads the Goodreads library export. The header is validated up front;
//! records are then decoded lazily, one `RawRow` at a time, and are never
//! rejected for the content of an individual field.

use std::collections::HashMap;
use std::io::Read;

use csv::{ByteRecord, ByteRecordsIntoIter, ReaderBuilder};

use crate::error::ImportError;

/// Exact header text of the export columns the importer reads.
pub mod columns {
    pub const TITLE: &str = "Title";
    pub const AUTHOR_LAST_FIRST: &str = "Author l-f";
    pub const ADDITIONAL_AUTHORS: &str = "Additional Authors";
    pub const ISBN: &str = "ISBN";
    pub const ISBN13: &str = "ISBN13";
    pub const MY_RATING: &str = "My Rating";
    pub const AVERAGE_RATING: &str = "Average Rating";
    pub const PUBLISHER: &str = "Publisher";
    pub const NUMBER_OF_PAGES: &str = "Number of Pages";
    pub const ORIGINAL_PUBLICATION_YEAR: &str = "Original Publication Year";
    pub const DATE_READ: &str = "Date Read";
    pub const BOOKSHELVES: &str = "Bookshelves";
    pub const EXCLUSIVE_SHELF: &str = "Exclusive Shelf";
    pub const MY_REVIEW: &str = "My Review";
}

/// Columns whose absence aborts the import.
pub const REQUIRED_COLUMNS: [&str; 10] = [
    columns::TITLE,
    columns::AUTHOR_LAST_FIRST,
    columns::MY_RATING,
    columns::AVERAGE_RATING,
    columns::NUMBER_OF_PAGES,
    columns::ORIGINAL_PUBLICATION_YEAR,
    columns::DATE_READ,
    columns::BOOKSHELVES,
    columns::EXCLUSIVE_SHELF,
    columns::MY_REVIEW,
];

/// One export record as column name -> raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    line: u64,
    fields: HashMap<String, String>,
}

impl RawRow {
    pub fn new(line: u64, fields: HashMap<String, String>) -> Self {
        Self { line, fields }
    }

    /// 1-based line of the record in the file.
    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Typed view over the columns the importer uses.
    pub fn as_goodreads(&self) -> GoodreadsRow<'_> {
        GoodreadsRow {
            title: self.get(columns::TITLE).unwrap_or_default(),
            author_last_first: self.get(columns::AUTHOR_LAST_FIRST).unwrap_or_default(),
            additional_authors: self.get(columns::ADDITIONAL_AUTHORS),
            isbn: self.get(columns::ISBN),
            isbn13: self.get(columns::ISBN13),
            my_rating: self.get(columns::MY_RATING),
            average_rating: self.get(columns::AVERAGE_RATING),
            publisher: self.get(columns::PUBLISHER),
            number_of_pages: self.get(columns::NUMBER_OF_PAGES),
            original_publication_year: self.get(columns::ORIGINAL_PUBLICATION_YEAR),
            date_read: self.get(columns::DATE_READ),
            bookshelves: self.get(columns::BOOKSHELVES),
            my_review: self.get(columns::MY_REVIEW),
        }
    }
}

/// Borrowed, still-unparsed fields of one export row.
#[derive(Debug, Clone, Copy)]
pub struct GoodreadsRow<'a> {
    pub title: &'a str,
    pub author_last_first: &'a str,
    pub additional_authors: Option<&'a str>,
    pub isbn: Option<&'a str>,
    pub isbn13: Option<&'a str>,
    pub my_rating: Option<&'a str>,
    pub average_rating: Option<&'a str>,
    pub publisher: Option<&'a str>,
    pub number_of_pages: Option<&'a str>,
    pub original_publication_year: Option<&'a str>,
    pub date_read: Option<&'a str>,
    pub bookshelves: Option<&'a str>,
    pub my_review: Option<&'a str>,
}

impl GoodreadsRow<'_> {
    /// True when the row carries written review text.
    pub fn has_review(&self) -> bool {
        self.my_review.is_some_and(|review| !review.trim().is_empty())
    }
}

/// A record the CSV layer itself could not decode.
#[derive(Debug, thiserror::Error)]
#[error("Unreadable record near line {line}: {message}")]
pub struct RowReadError {
    pub line: u64,
    pub message: String,
}

/// Lazy reader over a Goodreads export.
pub struct GoodreadsReader<R: Read> {
    headers: Vec<String>,
    records: ByteRecordsIntoIter<R>,
    last_line: u64,
}

impl<R: Read> std::fmt::Debug for GoodreadsReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoodreadsReader")
            .field("headers", &self.headers)
            .field("last_line", &self.last_line)
            .finish()
    }
}

impl<R: Read> GoodreadsReader<R> {
    /// Reads and validates the header row. Fails when the header is absent or
    /// any required column is missing.
    pub fn new(input: R) -> Result<Self, ImportError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(b',')
            .quote(b'"')
            .from_reader(input);

        let header_record = reader
            .byte_headers()
            .map_err(|e| ImportError::Unreadable(e.to_string()))?
            .clone();
        let headers: Vec<String> = header_record.iter().map(normalize_header).collect();

        if headers.iter().all(|h| h.is_empty()) {
            return Err(ImportError::MissingHeader);
        }

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|required| !headers.iter().any(|h| h == *required))
            .map(|required| required.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ImportError::MissingColumns(missing));
        }

        Ok(Self {
            headers,
            records: reader.into_byte_records(),
            last_line: 1,
        })
    }

    fn to_row(&self, record: &ByteRecord) -> RawRow {
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(self.last_line + 1);
        let fields = self
            .headers
            .iter()
            .zip(record.iter())
            .filter(|(header, _)| !header.is_empty())
            .map(|(header, value)| (header.clone(), String::from_utf8_lossy(value).into_owned()))
            .collect();
        RawRow::new(line, fields)
    }
}

impl<R: Read> Iterator for GoodreadsReader<R> {
    type Item = Result<RawRow, RowReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.records.next()?;
        Some(match next {
            Ok(record) => {
                let row = self.to_row(&record);
                self.last_line = row.line();
                Ok(row)
            }
            Err(e) => Err(RowReadError {
                line: e
                    .position()
                    .map(|p| p.line())
                    .unwrap_or(self.last_line + 1),
                message: e.to_string(),
            }),
        })
    }
}

/// Header names are matched after trimming whitespace, quotes and a BOM.
fn normalize_header(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim_start_matches('\u{feff}')
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Book Id,Title,Author,Author l-f,Additional Authors,ISBN,ISBN13,My Rating,Average Rating,Publisher,Binding,Number of Pages,Year Published,Original Publication Year,Date Read,Date Added,Bookshelves,Bookshelves with positions,Exclusive Shelf,My Review,Spoiler,Private Notes,Read Count,Owned Copies";

    #[test]
    fn reads_rows_keyed_by_header() {
        let csv = format!(
            "{HEADER}\n1,\"Dune\",Frank Herbert,\"Herbert, Frank\",,\"=\"\"0441013597\"\"\",,5,4.25,Ace,Paperback,604,2005,1965,2020/01/02,2019/12/01,\"sf, favorites\",,read,\"Spice, <b>sand</b>.\",,,1,0\n"
        );
        let mut reader = GoodreadsReader::new(csv.as_bytes()).unwrap();
        let row = reader.next().unwrap().unwrap();
        let view = row.as_goodreads();

        assert_eq!(view.title, "Dune");
        assert_eq!(view.author_last_first, "Herbert, Frank");
        assert_eq!(view.isbn, Some("=\"0441013597\""));
        assert_eq!(view.bookshelves, Some("sf, favorites"));
        assert_eq!(view.my_review, Some("Spice, <b>sand</b>."));
        assert!(view.has_review());
        assert_eq!(row.line(), 2);
        assert!(reader.next().is_none());
    }

    #[test]
    fn header_names_are_trimmed_of_quotes_and_whitespace() {
        let csv = "\u{feff} \"Title\" ,'Author l-f',My Rating,Average Rating,Number of Pages,Original Publication Year,Date Read,Bookshelves,Exclusive Shelf,My Review\nA,\"B, C\",3,4,100,2000,,,read,ok\n";
        let mut reader = GoodreadsReader::new(csv.as_bytes()).unwrap();
        let row = reader.next().unwrap().unwrap();
        assert_eq!(row.get(columns::TITLE), Some("A"));
        assert_eq!(row.get(columns::AUTHOR_LAST_FIRST), Some("B, C"));
    }

    #[test]
    fn missing_columns_are_reported_by_name() {
        let csv = "Title,Author l-f,My Rating\nA,B,1\n";
        match GoodreadsReader::new(csv.as_bytes()) {
            Err(ImportError::MissingColumns(missing)) => {
                assert!(missing.contains(&"My Review".to_string()));
                assert!(missing.contains(&"Bookshelves".to_string()));
                assert!(!missing.contains(&"Title".to_string()));
            }
            other => panic!("expected missing columns, got {other:?}"),
        }
    }

    #[test]
    fn empty_input_has_no_header() {
        assert!(matches!(
            GoodreadsReader::new("".as_bytes()),
            Err(ImportError::MissingHeader)
        ));
    }

    #[test]
    fn short_rows_are_tolerated() {
        let csv = "Title,Author l-f,My Rating,Average Rating,Number of Pages,Original Publication Year,Date Read,Bookshelves,Exclusive Shelf,My Review\nOnly Title\n";
        let mut reader = GoodreadsReader::new(csv.as_bytes()).unwrap();
        let row = reader.next().unwrap().unwrap();
        let view = row.as_goodreads();
        assert_eq!(view.title, "Only Title");
        assert_eq!(view.my_review, None);
        assert!(!view.has_review());
    }
}
