//! Turning outside input into ingredient entries.
//!
//! Three sources feed the inventory and the planner: comma-separated text
//! typed by the user, spreadsheet rows (exported as CSV), and receipt text
//! produced by an OCR tool. None of them touch the store; callers decide
//! what to write.

use crate::classify::{Category, classify};
use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;
use std::io::Read;
use std::sync::LazyLock;
use tracing::debug;

/// Words this short on a receipt line are never ingredients.
const MIN_SCANNED_WORD_LEN: usize = 3;

static QUANTITY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+\s?(?:g|kg|ml|l|oz|lb|pcs|pack|bottle|can)s?)")
        .expect("quantity pattern is valid")
});

/// A name with an optional quantity label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestEntry {
    pub name: String,
    pub quantity: Option<String>,
}

impl IngestEntry {
    fn new(name: impl Into<String>, quantity: Option<&str>) -> Self {
        Self {
            name: name.into(),
            quantity: quantity
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(ToString::to_string),
        }
    }
}

/// Split comma-separated text into lower-case names, dropping blanks.
#[must_use]
pub fn parse_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|part| part.trim().to_lowercase())
        .filter(|part| !part.is_empty())
        .collect()
}

/// Convert spreadsheet rows (`name, quantity, ...`) into entries.
///
/// Rows with fewer than two cells are skipped, as is a leading header row
/// whose first cell mentions "ingredient" or "name".
#[must_use]
pub fn entries_from_rows<R, C>(rows: &[R]) -> Vec<IngestEntry>
where
    R: AsRef<[C]>,
    C: AsRef<str>,
{
    let mut entries = Vec::new();
    for (idx, row) in rows.iter().enumerate() {
        let row = row.as_ref();
        if row.len() < 2 {
            continue;
        }
        let name = row[0].as_ref().trim();
        if idx == 0 && is_header(name) {
            continue;
        }
        if name.is_empty() {
            continue;
        }
        entries.push(IngestEntry::new(name, Some(row[1].as_ref())));
    }
    entries
}

fn is_header(first_cell: &str) -> bool {
    let lowered = first_cell.to_lowercase();
    lowered.contains("ingredient") || lowered.contains("name")
}

/// Read CSV rows from `reader` and convert them with [`entries_from_rows`].
///
/// Rows may differ in width. The first row is data unless it looks like a
/// header.
///
/// # Errors
///
/// Returns an error if the input is not valid CSV or not UTF-8.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<IngestEntry>> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let rows = csv
        .records()
        .enumerate()
        .map(|(idx, record)| {
            record
                .map(|r| r.iter().map(ToString::to_string).collect::<Vec<_>>())
                .with_context(|| format!("Failed to read spreadsheet row {}", idx + 1))
        })
        .collect::<Result<Vec<_>>>()?;

    let entries = entries_from_rows(&rows);
    debug!(rows = rows.len(), entries = entries.len(), "read spreadsheet rows");
    Ok(entries)
}

/// Pull ingredient mentions out of OCR'd receipt text.
///
/// Every word (longer than two characters) that classifies as something
/// other than [`Category::Other`] becomes an entry. The quantity is the
/// first `number + unit` on the same line, shared by every word on it.
#[must_use]
pub fn parse_scanned_text(text: &str) -> Vec<IngestEntry> {
    let cleaned: String = text
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c.is_whitespace() || c == ',' || c == '.' {
                c
            } else {
                ' '
            }
        })
        .collect::<String>()
        .to_lowercase();

    let mut detected = Vec::new();
    for line in cleaned.lines() {
        let quantity = QUANTITY_PATTERN
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str());

        for word in line.split_whitespace() {
            let word = word.trim_end_matches([',', '.']);
            if word.chars().count() < MIN_SCANNED_WORD_LEN {
                continue;
            }
            if classify(word).category != Category::Other {
                detected.push(IngestEntry::new(word, quantity));
            }
        }
    }
    detected
}
