// src/sheet/import.rs
// =============================================================================
// This module extracts URLs from a tabular (CSV) file.
//
// How the column is picked:
// 1. Look at the first row: the first cell containing one of the keywords
//    {url, site, website, link} (case-insensitive substring) names the URL
//    column; if no cell matches, default to column 0
// 2. If the chosen column's first-row cell matched a keyword, that row is a
//    header and data starts at row 1; otherwise data starts at row 0
// 3. Only non-empty cells of the chosen column become URLs
//
// Example: a header ["Name", "Website", "Notes"] selects column 1 and data
// extraction starts at row 1.
//
// A file that cannot be read or parsed is rejected up front with an error -
// no partial processing, no checks started.
// =============================================================================

use anyhow::{Context, Result};
use std::path::Path;

// Header cells containing any of these (case-insensitively) mark the URL column
const URL_COLUMN_KEYWORDS: [&str; 4] = ["url", "site", "website", "link"];

// Reads a CSV file and returns the URLs found in its URL column
//
// Parameters:
//   path: the file to read
//
// Returns: the raw URL strings, in file order (normalization happens later,
// inside the resolver)
pub fn read_url_file(path: &Path) -> Result<Vec<String>> {
    // has_headers(false): we do our own header detection below, so the
    // reader must hand us row 0 like any other row.
    // flexible(true): rows with differing cell counts are common in
    // hand-edited sheets and must not abort the import.
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record =
            record.with_context(|| format!("Failed to parse {} as CSV", path.display()))?;
        rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }

    Ok(extract_urls(&rows))
}

// Applies the column/header detection rules to already-parsed rows
//
// Split out from the file reading so the detection logic is testable on
// plain in-memory data.
pub fn extract_urls(rows: &[Vec<String>]) -> Vec<String> {
    let Some(first_row) = rows.first() else {
        return Vec::new();
    };

    // The first column whose first-row cell names URLs wins; column 0 is
    // the fallback when nothing matches
    let column = first_row
        .iter()
        .position(|cell| cell_names_urls(cell))
        .unwrap_or(0);

    // Row 0 is a header exactly when the chosen column's cell matched
    let has_header = first_row.get(column).is_some_and(|cell| cell_names_urls(cell));
    let data_start = if has_header { 1 } else { 0 };

    rows[data_start..]
        .iter()
        .filter_map(|row| row.get(column))
        .map(|cell| cell.trim())
        .filter(|cell| !cell.is_empty())
        .map(String::from)
        .collect()
}

fn cell_names_urls(cell: &str) -> bool {
    let lowered = cell.to_lowercase();
    URL_COLUMN_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_header_keyword_selects_column_and_skips_header_row() {
        let data = rows(&[
            &["Name", "Website", "Notes"],
            &["Acme", "acme.com", "fine"],
            &["Globex", "globex.com", ""],
        ]);
        assert_eq!(extract_urls(&data), vec!["acme.com", "globex.com"]);
    }

    #[test]
    fn test_no_header_starts_at_row_zero_column_zero() {
        let data = rows(&[&["acme.com"], &["globex.com"]]);
        assert_eq!(extract_urls(&data), vec!["acme.com", "globex.com"]);
    }

    #[test]
    fn test_url_header_in_first_column() {
        let data = rows(&[&["URL", "Owner"], &["acme.com", "alice"]]);
        assert_eq!(extract_urls(&data), vec!["acme.com"]);
    }

    #[test]
    fn test_keyword_match_is_case_insensitive_substring() {
        // "Company LINK" contains "link"
        let data = rows(&[&["Id", "Company LINK"], &["1", "acme.com"]]);
        assert_eq!(extract_urls(&data), vec!["acme.com"]);
    }

    #[test]
    fn test_empty_cells_are_skipped() {
        let data = rows(&[
            &["url"],
            &["acme.com"],
            &[""],
            &["   "],
            &["globex.com"],
        ]);
        assert_eq!(extract_urls(&data), vec!["acme.com", "globex.com"]);
    }

    #[test]
    fn test_short_rows_are_skipped() {
        // The second data row has no cell in the URL column at all
        let data = rows(&[
            &["Name", "Site"],
            &["Acme", "acme.com"],
            &["Orphan"],
            &["Globex", "globex.com"],
        ]);
        assert_eq!(extract_urls(&data), vec!["acme.com", "globex.com"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(extract_urls(&[]).is_empty());
    }

    #[test]
    fn test_read_url_file_roundtrip() {
        let path = std::env::temp_dir().join(format!(
            "site-sentinel-import-test-{}.csv",
            std::process::id()
        ));
        std::fs::write(&path, "Name,Website\nAcme,acme.com\nGlobex,globex.com\n").unwrap();

        let urls = read_url_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(urls, vec!["acme.com", "globex.com"]);
    }

    #[test]
    fn test_read_url_file_missing_file_is_an_error() {
        let missing = Path::new("/definitely/not/here.csv");
        assert!(read_url_file(missing).is_err());
    }
}
