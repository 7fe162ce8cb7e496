use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use log::{error, info};

use crate::catalog::UrlCatalog;
use crate::scraper::{write_cards_csv_file, CardListScraper};
use crate::utilities::config::Config;

#[derive(Debug, Clone)]
pub struct ScrapeJob {
    pub url: String,
    /// Output file name without extension. Empty means "use the series code".
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeSummary {
    pub cards: usize,
    pub rows: usize,
    pub csv_path: PathBuf,
    pub series_code: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScrapeEvent {
    Progress(String),
    Log(String),
    Finished(Result<ScrapeSummary, String>),
}

/// Runs one scrape on a background thread. The receiver gets progress and
/// log events followed by exactly one `Finished`.
pub fn spawn_scrape(job: ScrapeJob, config: Config) -> Receiver<ScrapeEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = run_scrape(&job, &config, &tx);
        match &result {
            Ok(summary) => info!(
                "Scrape of {} done: {} cards, {} rows",
                job.url, summary.cards, summary.rows
            ),
            Err(e) => error!("Scrape of {} failed: {}", job.url, e),
        }
        let _ = tx.send(ScrapeEvent::Finished(result));
    });
    rx
}

fn run_scrape(
    job: &ScrapeJob,
    config: &Config,
    tx: &Sender<ScrapeEvent>,
) -> Result<ScrapeSummary, String> {
    let progress = |text: String| {
        let _ = tx.send(ScrapeEvent::Progress(text));
    };
    let log_line = |line: String| {
        let _ = tx.send(ScrapeEvent::Log(line));
    };

    progress(format!("Fetching {}", job.url));
    let scraper = CardListScraper::new(config).map_err(|e| e.to_string())?;
    let runtime = tokio::runtime::Runtime::new().map_err(|e| e.to_string())?;
    let cards = runtime.block_on(scraper.scrape(&job.url));

    let first = match cards.first() {
        Some(card) => card,
        None => return Err("no cards extracted".to_string()),
    };
    let series_code = first.series_code();
    log_line(format!("{} cards extracted ({})", cards.len(), series_code));

    let label = match job.label.trim() {
        "" => series_code.clone(),
        label => label.to_string(),
    };
    let csv_path = config.staging_dir.join(format!("{}.csv", label));
    progress(format!("Writing {}", csv_path.display()));
    let rows = write_cards_csv_file(&cards, &csv_path).map_err(|e| e.to_string())?;
    log_line(format!("{} rows written to {}", rows, csv_path.display()));

    let mut catalog = UrlCatalog::load(&config.catalog_path);
    if catalog.remember(&series_code, &job.url) {
        match catalog.save(&config.catalog_path) {
            Ok(()) => log_line(format!("URL saved for {}", series_code)),
            Err(e) => log_line(format!("Could not save URL catalog: {}", e)),
        }
    }

    progress("Done".to_string());
    Ok(ScrapeSummary {
        cards: cards.len(),
        rows,
        csv_path,
        series_code,
    })
}
