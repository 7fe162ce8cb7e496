use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use log::{error, info, warn};
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, DNT, UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};
use reqwest::Client;
use url::Url;

use super::extractor::CardExtractor;
use crate::cards::card_record::CardRecord;
use crate::error::{CollectionError, Result};
use crate::utilities::config::Config;
use crate::utilities::file_management::ensure_parent_dir;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8";

/// Downloads set card list pages and turns them into card records, keeping a
/// copy of every page it fetched to fall back on when the site is unreachable.
pub struct CardListScraper {
    client: Client,
    extractor: CardExtractor,
    delay: Duration,
    cache_dir: PathBuf,
}

impl CardListScraper {
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
        headers.insert(ACCEPT_LANGUAGE, accept_language(&config.region)?);
        headers.insert(DNT, HeaderValue::from_static("1"));
        headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            extractor: CardExtractor::new(&config.region)?,
            delay: config.request_delay(),
            cache_dir: config.cache_dir.clone(),
        })
    }

    /// Cache file for `url`, named after the last segment of its path.
    pub fn cache_path(&self, url: &str) -> PathBuf {
        let segment = Url::parse(url)
            .ok()
            .and_then(|parsed| {
                parsed
                    .path_segments()
                    .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
                    .map(|s| {
                        urlencoding::decode(s)
                            .map(|d| d.into_owned())
                            .unwrap_or_else(|_| s.to_string())
                    })
            })
            .unwrap_or_default();

        let sanitized: String = segment
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        let stem = if sanitized.is_empty() { "page".to_string() } else { sanitized };
        self.cache_dir.join(format!("{}.html", stem))
    }

    pub async fn fetch_page(&self, url: &str) -> Result<String> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        info!("Fetching {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    /// Never fails: network trouble, or a page without any card (a bot check
    /// for instance), falls back to the cached copy of the page. Without one
    /// the result is empty. Only pages that yielded cards are cached.
    pub async fn scrape(&self, url: &str) -> Vec<CardRecord> {
        match self.fetch_page(url).await {
            Ok(body) => {
                let cards = self.extractor.extract_cards(&body);
                if !cards.is_empty() {
                    self.write_cache(url, &body);
                    return cards;
                }
                warn!("No cards found on {}, keeping the cached page", url);
            }
            Err(e) => error!("Fetching {} failed: {}", url, e),
        }

        match self.read_cache(url) {
            Some(cached) => self.extractor.extract_cards(&cached),
            None => Vec::new(),
        }
    }

    fn write_cache(&self, url: &str, body: &str) {
        let path = self.cache_path(url);
        let written = ensure_parent_dir(&path).and_then(|_| fs::write(&path, body));
        if let Err(e) = written {
            warn!("Could not cache {} in {}: {}", url, path.display(), e);
        }
    }

    fn read_cache(&self, url: &str) -> Option<String> {
        let path = self.cache_path(url);
        match fs::read_to_string(&path) {
            Ok(content) => {
                info!("Using cached page {}", path.display());
                Some(content)
            }
            Err(_) => {
                warn!("No cached page for {} at {}", url, path.display());
                None
            }
        }
    }
}

fn accept_language(region: &str) -> Result<HeaderValue> {
    let language = region.to_lowercase();
    HeaderValue::from_str(&format!(
        "{}-{},{};q=0.9,en;q=0.8",
        language,
        region.to_uppercase(),
        language
    ))
    .map_err(|e| CollectionError::Network(format!("invalid Accept-Language: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::helpers::init_logger;
    use std::io::Write;
    use tempfile::TempDir;

    static PAGE_PATH: &str = "/wiki/Set_Card_Lists:25th_Anniversary_Rarity_Collection_II_(TCG-FR)";

    fn scraper_with_cache(cache: &TempDir) -> CardListScraper {
        scraper_with_timeout(cache, 5)
    }

    fn scraper_with_timeout(cache: &TempDir, timeout_secs: u64) -> CardListScraper {
        let mut config = Config::new();
        config.region = "FR".to_string();
        config.cache_dir = cache.path().to_path_buf();
        config.request_delay_ms = 0;
        config.request_timeout_secs = timeout_secs;
        CardListScraper::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_scrape_sends_browser_headers_and_caches_page() {
        init_logger();
        let html = include_str!("../test/set_card_list.html");
        let cache = tempfile::tempdir().unwrap();

        let mut server = std::thread::spawn(|| mockito::Server::new())
            .join()
            .unwrap();
        let mock = server
            .mock("GET", PAGE_PATH)
            .match_header("accept-language", "fr-FR,fr;q=0.9,en;q=0.8")
            .match_header("dnt", "1")
            .match_header("upgrade-insecure-requests", "1")
            .match_header("user-agent", BROWSER_USER_AGENT)
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(html)
            .create();

        let scraper = scraper_with_cache(&cache);
        let url = format!("{}{}", server.url(), PAGE_PATH);
        let cards = scraper.scrape(&url).await;

        mock.assert();
        assert_eq!(cards.len(), 4);
        assert_eq!(
            fs::read_to_string(scraper.cache_path(&url)).unwrap(),
            html
        );
    }

    #[tokio::test]
    async fn test_http_error_falls_back_to_cached_page() {
        init_logger();
        let html = include_str!("../test/set_card_list.html");
        let cache = tempfile::tempdir().unwrap();

        let mut server = std::thread::spawn(|| mockito::Server::new())
            .join()
            .unwrap();
        let mock = server
            .mock("GET", PAGE_PATH)
            .with_status(500)
            .with_body("Internal Server Error")
            .create();

        let scraper = scraper_with_cache(&cache);
        let url = format!("{}{}", server.url(), PAGE_PATH);
        fs::write(scraper.cache_path(&url), html).unwrap();

        let cards = scraper.scrape(&url).await;

        mock.assert();
        let direct = CardExtractor::new("FR").unwrap().extract_cards(html);
        assert_eq!(cards.len(), direct.len());
        assert_eq!(cards, direct);
    }

    #[tokio::test]
    async fn test_page_without_cards_keeps_and_uses_cached_page() {
        init_logger();
        let html = include_str!("../test/set_card_list.html");
        let cache = tempfile::tempdir().unwrap();

        let mut server = std::thread::spawn(|| mockito::Server::new())
            .join()
            .unwrap();
        let mock = server
            .mock("GET", PAGE_PATH)
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html><body>Checking your browser...</body></html>")
            .create();

        let scraper = scraper_with_cache(&cache);
        let url = format!("{}{}", server.url(), PAGE_PATH);
        fs::write(scraper.cache_path(&url), html).unwrap();

        let cards = scraper.scrape(&url).await;

        mock.assert();
        assert_eq!(cards.len(), 4);
        assert_eq!(fs::read_to_string(scraper.cache_path(&url)).unwrap(), html);
    }

    #[tokio::test]
    async fn test_timeout_falls_back_to_cached_page() {
        init_logger();
        let html = include_str!("../test/set_card_list.html");
        let cache = tempfile::tempdir().unwrap();

        let mut server = std::thread::spawn(|| mockito::Server::new())
            .join()
            .unwrap();
        let _mock = server
            .mock("GET", PAGE_PATH)
            .with_status(200)
            .with_chunked_body(|w| {
                std::thread::sleep(Duration::from_secs(3));
                w.write_all(b"<html><body>Too late</body></html>")
            })
            .create();

        let scraper = scraper_with_timeout(&cache, 1);
        let url = format!("{}{}", server.url(), PAGE_PATH);
        fs::write(scraper.cache_path(&url), html).unwrap();

        let started = std::time::Instant::now();
        let cards = scraper.scrape(&url).await;

        assert!(started.elapsed() < Duration::from_secs(3));
        let direct = CardExtractor::new("FR").unwrap().extract_cards(html);
        assert_eq!(cards, direct);
        assert_eq!(fs::read_to_string(scraper.cache_path(&url)).unwrap(), html);
    }

    #[tokio::test]
    async fn test_unreachable_host_uses_cache_or_returns_nothing() {
        let html = include_str!("../test/set_card_list.html");
        let cache = tempfile::tempdir().unwrap();
        let scraper = scraper_with_cache(&cache);

        let url = "http://127.0.0.1:1/wiki/Set_Card_Lists:Unreachable_(TCG-FR)";
        assert!(scraper.scrape(url).await.is_empty());

        fs::write(scraper.cache_path(url), html).unwrap();
        assert_eq!(scraper.scrape(url).await.len(), 4);
    }

    #[test]
    fn test_cache_path_is_sanitized() {
        let cache = tempfile::tempdir().unwrap();
        let scraper = scraper_with_cache(&cache);

        assert_eq!(
            scraper.cache_path(
                "https://yugipedia.com/wiki/Set_Card_Lists:Battles_of_Legend:_Monster_Mayhem_(TCG-FR)"
            ),
            cache
                .path()
                .join("Set_Card_Lists_Battles_of_Legend__Monster_Mayhem__TCG-FR_.html")
        );
        assert_eq!(
            scraper.cache_path("https://example.com/"),
            cache.path().join("page.html")
        );
    }
}
