//! crates/book_catalog_core/src/normalize.rs
//!
//! Derives typed book and review fields from the raw text of an export row.
//! Every function here is total: malformed input yields `None` or a default,
//! never an error, so a single bad field cannot abort an import.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Shelves that describe reading status rather than content; they never
/// contribute to the searchable string.
pub const SEARCH_EXCLUDED_SHELVES: [&str; 5] = [
    "to-read",
    "to-look-into",
    "currently-reading",
    "decided-not-to-read",
    "anticipating-release",
];

/// Shelf name (lowercase) -> text added to the searchable string instead.
pub const SEARCH_SHELF_SYNONYMS: [(&str, &str); 1] = [("sf", "Science Fiction Sci-Fi Scifi")];

/// Native date format of the Goodreads export.
const EXPORT_DATE_FORMAT: &str = "%Y/%m/%d";

const FALLBACK_DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
];

const FALLBACK_DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// The reviewer's own rating. Unparseable values fall back to 0; range checks
/// are the importer's job.
pub fn parse_reviewer_rating(raw: Option<&str>) -> i32 {
    non_blank(raw)
        .and_then(|s| s.parse::<i32>().ok())
        .unwrap_or(0)
}

/// The community average rating, rounded to two decimals and held in 0..=5.
pub fn parse_average_rating(raw: Option<&str>) -> f64 {
    let value = non_blank(raw)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0);
    ((value.clamp(0.0, 5.0)) * 100.0).round() / 100.0
}

fn parse_positive(raw: Option<&str>) -> Option<i32> {
    non_blank(raw)
        .and_then(|s| s.parse::<i32>().ok())
        .filter(|v| *v > 0)
}

pub fn parse_page_count(raw: Option<&str>) -> Option<i32> {
    parse_positive(raw)
}

/// Non-positive years are stored as absent rather than zero.
pub fn parse_publication_year(raw: Option<&str>) -> Option<i32> {
    parse_positive(raw)
}

/// Parses the "Date Read" column, trying the export's own `yyyy/MM/dd` first.
/// Every result is midnight (or the given time) in UTC.
pub fn parse_date_read(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = non_blank(raw)?;

    if let Ok(date) = NaiveDate::parse_from_str(raw, EXPORT_DATE_FORMAT) {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in FALLBACK_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.and_utc());
        }
    }

    FALLBACK_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Strips the `="..."` spreadsheet wrapping Goodreads puts around ISBNs.
pub fn clean_isbn_value(raw: Option<&str>) -> Option<String> {
    let cleaned: String = raw?
        .trim()
        .chars()
        .filter(|c| !matches!(c, '=' | '"' | '\''))
        .collect();
    let cleaned = cleaned.trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

/// An author name split from the export's `"Last, First"` column.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthorName {
    pub first_name: String,
    pub last_name: String,
}

impl AuthorName {
    /// Splits on the first `", "`. A name without the separator is all last name.
    pub fn from_last_first(raw: &str) -> Self {
        match raw.split_once(", ") {
            Some((last, first)) => Self {
                first_name: first.trim().to_string(),
                last_name: last.trim().to_string(),
            },
            None => Self {
                first_name: String::new(),
                last_name: raw.trim().to_string(),
            },
        }
    }

    /// "First Last", trimmed.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Splits a raw shelf list on commas, trimming entries, dropping empties and
/// dropping case-insensitive repeats. The first spelling of a shelf wins.
pub fn split_bookshelves(raw: Option<&str>) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(name.to_lowercase()))
        .map(str::to_string)
        .collect()
}

/// Turns a raw shelf list into search text: status shelves are excluded,
/// hyphens become spaces and synonyms are expanded.
pub fn process_bookshelves_for_search(raw: Option<&str>) -> String {
    raw.unwrap_or_default()
        .split(',')
        .map(|shelf| shelf.trim().to_lowercase())
        .filter(|shelf| !shelf.is_empty())
        .filter(|shelf| !SEARCH_EXCLUDED_SHELVES.contains(&shelf.as_str()))
        .map(|shelf| shelf.replace('-', " "))
        .map(|shelf| {
            SEARCH_SHELF_SYNONYMS
                .iter()
                .find(|(name, _)| *name == shelf)
                .map(|(_, synonym)| synonym.to_lowercase())
                .unwrap_or(shelf)
        })
        .filter(|shelf| !shelf.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// The inputs of a book's searchable string.
#[derive(Debug, Clone, Copy)]
pub struct SearchableParts<'a> {
    pub title: &'a str,
    pub author: AuthorNameRef<'a>,
    pub additional_authors: Option<&'a str>,
    pub publisher: Option<&'a str>,
    pub raw_bookshelves: Option<&'a str>,
}

/// Borrowed author name parts.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorNameRef<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
}

/// Lowercase, space-joined search text; empty components are skipped.
pub fn build_searchable_string(parts: &SearchableParts<'_>) -> String {
    let author = format!("{} {}", parts.author.first_name, parts.author.last_name);
    let shelves = process_bookshelves_for_search(parts.raw_bookshelves);

    [
        Some(parts.title),
        Some(author.as_str()),
        parts.additional_authors,
        parts.publisher,
        Some(shelves.as_str()),
    ]
    .into_iter()
    .flatten()
    .map(str::trim)
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase()
}

pub fn title_by_author(title: &str, first_name: &str, last_name: &str) -> String {
    format!("{} by {} {}", title, first_name, last_name)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn isbn_cleaning_strips_spreadsheet_wrapping() {
        assert_eq!(
            clean_isbn_value(Some("=\"0141439513\"")),
            Some("0141439513".to_string())
        );
        assert_eq!(clean_isbn_value(Some("  ")), None);
        assert_eq!(clean_isbn_value(Some("=\"\"")), None);
        assert_eq!(clean_isbn_value(None), None);
    }

    #[test]
    fn shelves_for_search_apply_exclusions_hyphens_and_synonyms() {
        assert_eq!(
            process_bookshelves_for_search(Some("to-read, sf, hard-boiled")),
            "science fiction sci-fi scifi hard boiled"
        );
        assert_eq!(
            process_bookshelves_for_search(Some("currently-reading, ,Favorites")),
            "favorites"
        );
        assert_eq!(process_bookshelves_for_search(None), "");
    }

    #[test]
    fn author_is_split_on_first_comma_space() {
        let author = AuthorName::from_last_first("Le Guin, Ursula K.");
        assert_eq!(author.last_name, "Le Guin");
        assert_eq!(author.first_name, "Ursula K.");

        let mononym = AuthorName::from_last_first("Homer");
        assert_eq!(mononym.last_name, "Homer");
        assert_eq!(mononym.first_name, "");
        assert_eq!(mononym.full_name(), "Homer");
    }

    #[test]
    fn numbers_fall_back_gracefully() {
        assert_eq!(parse_reviewer_rating(Some("4")), 4);
        assert_eq!(parse_reviewer_rating(Some("four")), 0);
        assert_eq!(parse_average_rating(Some("4.126")), 4.13);
        assert_eq!(parse_average_rating(Some("NaN")), 0.0);
        assert_eq!(parse_page_count(Some("0")), None);
        assert_eq!(parse_page_count(Some("352")), Some(352));
        assert_eq!(parse_publication_year(Some("-800")), None);
        assert_eq!(parse_publication_year(Some("1954")), Some(1954));
        assert_eq!(parse_publication_year(Some("")), None);
    }

    #[test]
    fn date_read_prefers_export_format_and_is_utc() {
        let date = parse_date_read(Some("2023/07/04")).unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2023, 7, 4));
        assert_eq!(date.hour(), 0);

        let fallback = parse_date_read(Some("2021-01-15")).unwrap();
        assert_eq!((fallback.year(), fallback.month(), fallback.day()), (2021, 1, 15));

        assert_eq!(parse_date_read(Some("someday")), None);
        assert_eq!(parse_date_read(None), None);
    }

    #[test]
    fn shelf_split_dedupes_case_insensitively() {
        assert_eq!(
            split_bookshelves(Some("fantasy, Favorites,, fantasy ,FAVORITES")),
            vec!["fantasy".to_string(), "Favorites".to_string()]
        );
    }

    #[test]
    fn searchable_string_skips_empty_parts() {
        let author = AuthorNameRef {
            first_name: "Ursula K.",
            last_name: "Le Guin",
        };
        let parts = SearchableParts {
            title: "The Dispossessed",
            author,
            additional_authors: Some(""),
            publisher: Some("Harper Voyager"),
            raw_bookshelves: Some("sf, to-read"),
        };
        assert_eq!(
            build_searchable_string(&parts),
            "the dispossessed ursula k. le guin harper voyager science fiction sci-fi scifi"
        );
    }

    #[test]
    fn title_by_author_formats_label() {
        assert_eq!(title_by_author("Odyssey", "", "Homer"), "Odyssey by  Homer");
        assert_eq!(title_by_author("Dune", "Frank", "Herbert"), "Dune by Frank Herbert");
    }
}
