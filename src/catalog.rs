use std::collections::BTreeMap;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::utilities::constants::KNOWN_SET_LISTS;
use crate::utilities::file_management::{load_from_json_file, save_to_file};

/// Series code → card-list URL, shared between the converter (which records
/// what it scraped) and the importer (which backfills series metadata).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UrlCatalog {
    urls: BTreeMap<String, String>,
}

impl UrlCatalog {
    pub fn with_known_lists() -> Self {
        let urls = KNOWN_SET_LISTS
            .iter()
            .map(|(code, url)| (code.to_string(), url.to_string()))
            .collect();
        Self { urls }
    }

    /// Reads the catalog; a missing or unreadable file yields the built-in
    /// list of known set pages.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            info!(
                "No URL catalog at {}, starting from the known set lists",
                path.display()
            );
            return Self::with_known_lists();
        }
        match load_from_json_file::<UrlCatalog>(path) {
            Ok(catalog) => {
                info!("{} series URLs loaded from {}", catalog.len(), path.display());
                catalog
            }
            Err(e) => {
                warn!("Failed to read URL catalog {}: {}", path.display(), e);
                Self::with_known_lists()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        save_to_file(path, self)
    }

    pub fn url_for(&self, code: &str) -> Option<&str> {
        self.urls.get(code).map(String::as_str)
    }

    /// Records `url` under `code`. Returns false when the URL is already known.
    pub fn remember(&mut self, code: &str, url: &str) -> bool {
        if self.urls.values().any(|known| known == url) {
            return false;
        }
        self.urls.insert(code.to_string(), url.to_string());
        true
    }

    pub fn remove(&mut self, code: &str) -> bool {
        self.urls.remove(code).is_some()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.urls.iter().map(|(c, u)| (c.as_str(), u.as_str()))
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
