use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use lazy_static::lazy_static;
use log::{error, info, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::cards::cardnumber::series_code_of;
use crate::catalog::UrlCatalog;
use crate::db::Database;
use crate::error::{CollectionError, Result};
use crate::utilities::constants::{CSV_HEADER, UNKNOWN_SERIES_CODE};
use crate::utilities::file_management::csv_files_in;
use crate::utilities::string_manipulators::{
    collapse_whitespace, leading_alphanumeric, placeholder_series_name,
};

lazy_static! {
    static ref SERIES_NAME_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"Set_Card_Lists:([^(]+?)_\(TCG-FR\)").unwrap(),
        Regex::new(r"Set_Card_Lists:([^(]+?)_\(TCG").unwrap(),
        Regex::new(r"Set_Card_Lists:([^/]+?)(?:\?|$)").unwrap(),
        Regex::new(r"wiki/([^/]+?)(?:\?|$)").unwrap(),
    ];
}

#[derive(Debug, Deserialize)]
struct CsvCardRow {
    #[serde(rename = "Code_Serie")]
    series_code: String,
    #[serde(rename = "Nom_Carte")]
    card_name: String,
    #[serde(rename = "Rareté")]
    rarity: String,
    #[serde(rename = "Numéro_Carte")]
    card_number: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportStats {
    pub cards_added: usize,
    pub links_created: usize,
    pub cards_existing: usize,
    pub errors: usize,
}

impl ImportStats {
    pub fn changed_anything(&self) -> bool {
        self.cards_added > 0 || self.links_created > 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FolderImportOutcome {
    Imported { stats: ImportStats, removed: bool },
    Failed(String),
}

/// Loads interchange CSV files into the collection database.
pub struct CsvImporter<'a> {
    db: &'a Database,
    catalog: Option<&'a UrlCatalog>,
}

impl<'a> CsvImporter<'a> {
    pub fn new(db: &'a Database, catalog: Option<&'a UrlCatalog>) -> Self {
        Self { db, catalog }
    }

    /// Checks the header and the first record without touching the database.
    pub fn validate_format(&self, path: &Path) -> Result<()> {
        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();

        if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
            return Err(CollectionError::Format(
                "empty file or missing header".to_string(),
            ));
        }

        let missing: Vec<&str> = CSV_HEADER
            .iter()
            .copied()
            .filter(|column| !headers.iter().any(|h| h.trim() == *column))
            .collect();
        if !missing.is_empty() {
            return Err(CollectionError::Format(format!(
                "missing columns: {}",
                missing.join(", ")
            )));
        }

        let first = match reader.records().next() {
            Some(record) => record?,
            None => return Err(CollectionError::Format("no data rows".to_string())),
        };

        for column in CSV_HEADER {
            let value = headers
                .iter()
                .position(|h| h.trim() == column)
                .and_then(|index| first.get(index))
                .unwrap_or("");
            if value.trim().is_empty() {
                return Err(CollectionError::Format(format!(
                    "first row has an empty '{}' column",
                    column
                )));
            }
        }
        Ok(())
    }

    pub fn import_file(&self, path: &Path) -> Result<ImportStats> {
        info!("Importing {}", path.display());
        self.validate_format(path)?;

        let mut reader = csv::Reader::from_path(path)?;
        let rows: Vec<csv::Result<CsvCardRow>> = reader.deserialize().collect();

        let first = match rows.iter().find_map(|row| row.as_ref().ok()) {
            Some(row) => row,
            None => return Err(CollectionError::Format("no readable data rows".to_string())),
        };
        let code = self.detect_series_code(path, first);
        let source_url = self.catalog.and_then(|c| c.url_for(&code));
        let name = source_url
            .and_then(series_name_from_url)
            .unwrap_or_else(|| placeholder_series_name(&code));
        info!("Series detected: {} - {}", code, name);

        let series_id = self.db.add_series(&code, &name, source_url)?;

        let mut stats = ImportStats::default();
        let mut seen_numbers = HashSet::new();

        for (index, row) in rows.iter().enumerate() {
            // Header is line 1.
            let line = index + 2;
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    error!("Line {}: unreadable row: {}", line, e);
                    stats.errors += 1;
                    continue;
                }
            };
            if let Err(e) = self.import_row(row, line, series_id, &mut seen_numbers, &mut stats) {
                error!("Line {}: {}", line, e);
                stats.errors += 1;
            }
        }

        info!(
            "Import of {} finished: {} cards added, {} links created, {} cards existing, {} errors",
            code, stats.cards_added, stats.links_created, stats.cards_existing, stats.errors
        );
        Ok(stats)
    }

    fn import_row(
        &self,
        row: &CsvCardRow,
        line: usize,
        series_id: i64,
        seen_numbers: &mut HashSet<String>,
        stats: &mut ImportStats,
    ) -> Result<()> {
        let number = row.card_number.trim();
        let name = row.card_name.trim();
        let rarity = row.rarity.trim();

        if number.is_empty() || name.is_empty() || rarity.is_empty() {
            warn!("Line {}: missing data, skipped", line);
            return Ok(());
        }

        if seen_numbers.insert(number.to_string()) {
            if self.db.card_id(number)?.is_some() {
                stats.cards_existing += 1;
            } else {
                self.db.add_card(number, name, series_id)?;
                stats.cards_added += 1;
            }
        }

        let card_id = match self.db.card_id(number)? {
            Some(id) => id,
            None => {
                error!("Line {}: card {} could not be found", line, number);
                stats.errors += 1;
                return Ok(());
            }
        };

        let rarity_id = self.db.get_or_create_rarity(rarity)?;
        if self.db.link_card_rarity(card_id, rarity_id)? {
            stats.links_created += 1;
        }
        Ok(())
    }

    fn detect_series_code(&self, path: &Path, first: &CsvCardRow) -> String {
        let from_number = series_code_of(&first.card_number);
        if from_number != UNKNOWN_SERIES_CODE {
            return from_number;
        }

        let from_column = first.series_code.trim();
        if !from_column.is_empty() {
            return from_column.to_uppercase();
        }

        path.file_stem()
            .and_then(|stem| leading_alphanumeric(&stem.to_string_lossy()))
            .unwrap_or_else(|| UNKNOWN_SERIES_CODE.to_string())
    }

    /// Imports every CSV file in `dir`. Files that added at least one card or
    /// link are deleted afterwards; failed files stay in place.
    pub fn import_folder(&self, dir: &Path) -> BTreeMap<String, FolderImportOutcome> {
        let mut results = BTreeMap::new();

        if !dir.is_dir() {
            warn!("Import folder {} does not exist", dir.display());
            return results;
        }

        let files = match csv_files_in(dir) {
            Ok(files) => files,
            Err(e) => {
                error!("Failed to list {}: {}", dir.display(), e);
                return results;
            }
        };
        if files.is_empty() {
            info!("No CSV files in {}", dir.display());
            return results;
        }
        info!("Importing {} CSV files from {}", files.len(), dir.display());

        for file in files {
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.display().to_string());

            let outcome = match self.import_file(&file) {
                Ok(stats) => {
                    let removed = stats.changed_anything() && remove_imported(&file);
                    FolderImportOutcome::Imported { stats, removed }
                }
                Err(e) => {
                    error!("Import of {} failed: {}", file_name, e);
                    FolderImportOutcome::Failed(e.to_string())
                }
            };
            results.insert(file_name, outcome);
        }
        results
    }
}

fn remove_imported(path: &Path) -> bool {
    match fs::remove_file(path) {
        Ok(()) => {
            info!("Removed imported file {}", path.display());
            true
        }
        Err(e) => {
            warn!("Could not remove {}: {}", path.display(), e);
            false
        }
    }
}

/// Human-readable set name taken from a wiki card-list URL.
pub fn series_name_from_url(url: &str) -> Option<String> {
    let raw = SERIES_NAME_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(url))
        .and_then(|caps| caps.get(1))?
        .as_str();

    let decoded = urlencoding::decode(raw)
        .map(|d| d.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    let name = collapse_whitespace(&decoded.replace('_', " ").replace(':', ": "));

    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}
