use std::env;
use std::path::PathBuf;
use std::time::Duration;

use log::error;

use crate::utilities::constants::{
    DEFAULT_CACHE_DIR, DEFAULT_CATALOG_PATH, DEFAULT_DB_PATH, DEFAULT_REGION,
    DEFAULT_STAGING_DIR,
};

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub staging_dir: PathBuf,
    pub catalog_path: PathBuf,
    pub cache_dir: PathBuf,
    pub region: String,
    pub request_delay_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            staging_dir: PathBuf::from(DEFAULT_STAGING_DIR),
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            region: DEFAULT_REGION.to_string(),
            request_delay_ms: 2000,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        let mut config = Config::default();
        config.update_from_env();
        config
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn update_from_env(&mut self) {
        if let Ok(db_path) = env::var("COLLECTION_DB") {
            self.db_path = PathBuf::from(db_path);
        }
        if let Ok(staging_dir) = env::var("STAGING_DIR") {
            self.staging_dir = PathBuf::from(staging_dir);
        }
        if let Ok(catalog_path) = env::var("URL_CATALOG") {
            self.catalog_path = PathBuf::from(catalog_path);
        }
        if let Ok(cache_dir) = env::var("PAGE_CACHE_DIR") {
            self.cache_dir = PathBuf::from(cache_dir);
        }
        if let Ok(region) = env::var("CARD_REGION") {
            let region = region.trim().to_uppercase();
            if !region.is_empty() && region.chars().all(|c| c.is_ascii_alphabetic()) {
                self.region = region;
            } else {
                error!("Ignoring invalid CARD_REGION value {:?}", region);
            }
        }
        if let Ok(delay) = env::var("REQUEST_DELAY_MS") {
            self.request_delay_ms = delay.parse().unwrap_or(self.request_delay_ms);
        }
        if let Ok(timeout) = env::var("REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = timeout.parse().unwrap_or(self.request_timeout_secs);
        }
    }
}
