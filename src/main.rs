mod cards;
mod catalog;
mod db;
mod error;
#[cfg(feature = "gui")]
mod gui;
mod importer;
mod scraper;
#[cfg(test)]
mod test;
mod utilities;
mod worker;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use log::{error, info};

use crate::catalog::UrlCatalog;
use crate::db::records::{MissingCard, OwnershipUpdate};
use crate::db::Database;
use crate::error::{CollectionError, Result};
use crate::importer::{CsvImporter, FolderImportOutcome};
use crate::utilities::config::Config;
use crate::utilities::string_manipulators::{date_time_as_string, format_percentage};
use crate::worker::{spawn_scrape, ScrapeEvent, ScrapeJob};

#[derive(Debug, Parser)]
#[command(
    name = "ygo-collection",
    version,
    about = "Track a Yu-Gi-Oh! card collection built from wiki set card lists"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Open the collection window (default)
    Gui,
    /// Scrape a set card list page into a staging CSV
    Scrape {
        #[arg(long)]
        url: String,
        /// Output file name without extension, defaults to the series code
        #[arg(long, default_value = "")]
        name: String,
    },
    /// Import one interchange CSV file
    Import { file: PathBuf },
    /// Import every CSV file of a folder, the staging folder by default
    ImportFolder { dir: Option<PathBuf> },
    /// Completion per series
    Stats,
    /// Copies not owned yet
    Missing {
        #[arg(long)]
        series: Option<String>,
    },
    /// Mark one copy owned, or missing with --missing
    SetOwned {
        number: String,
        rarity: String,
        #[arg(long)]
        missing: bool,
        /// Acquisition date, today when omitted
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        condition: Option<String>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Write owned copies to a CSV file
    Export { path: PathBuf },
}

fn main() {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let config = Config::new();
    info!("Starting with database {}", config.db_path.display());

    if let Err(e) = run(cli.command.unwrap_or(Commands::Gui), config) {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Gui => open_gui(config),
        Commands::Scrape { url, name } => scrape(url, name, config),
        Commands::Import { file } => {
            let db = Database::open(&config.db_path)?;
            let catalog = UrlCatalog::load(&config.catalog_path);
            let stats = CsvImporter::new(&db, Some(&catalog)).import_file(&file)?;
            println!(
                "{}: {} cards added, {} links created, {} existing, {} errors",
                file.display(),
                stats.cards_added,
                stats.links_created,
                stats.cards_existing,
                stats.errors
            );
            Ok(())
        }
        Commands::ImportFolder { dir } => {
            let db = Database::open(&config.db_path)?;
            let catalog = UrlCatalog::load(&config.catalog_path);
            let dir = dir.unwrap_or_else(|| config.staging_dir.clone());
            let results = CsvImporter::new(&db, Some(&catalog)).import_folder(&dir);
            if results.is_empty() {
                println!("No CSV files to import in {}", dir.display());
            }
            for (file, outcome) in results {
                match outcome {
                    FolderImportOutcome::Imported { stats, removed } => println!(
                        "{}: {} cards added, {} links created{}",
                        file,
                        stats.cards_added,
                        stats.links_created,
                        if removed { ", file removed" } else { "" }
                    ),
                    FolderImportOutcome::Failed(reason) => println!("{}: failed, {}", file, reason),
                }
            }
            Ok(())
        }
        Commands::Stats => {
            let db = Database::open(&config.db_path)?;
            for stats in db.collection_stats()? {
                println!(
                    "{:<6} {:<45} {:>5}/{:<5} {}",
                    stats.series_code,
                    stats.series_name,
                    stats.owned_copies,
                    stats.total_copies,
                    format_percentage(stats.pct)
                );
            }
            Ok(())
        }
        Commands::Missing { series } => {
            let db = Database::open(&config.db_path)?;
            let missing = missing_in(&db, series.as_deref())?;
            for card in &missing {
                println!("{}  {}  {}", card.number, card.name, card.rarity);
            }
            println!("{} missing copies", missing.len());
            Ok(())
        }
        Commands::SetOwned {
            number,
            rarity,
            missing,
            date,
            condition,
            price,
            notes,
        } => {
            let db = Database::open(&config.db_path)?;
            let update = ownership_update(!missing, date, condition, price, notes);
            set_owned(&db, &number, &rarity, &update)?;
            println!(
                "{} / {} marked {}",
                number,
                rarity,
                if update.owned { "owned" } else { "missing" }
            );
            Ok(())
        }
        Commands::Export { path } => {
            let db = Database::open(&config.db_path)?;
            let count = db::export::export_owned_csv(&db, &path)?;
            println!("{} owned copies written to {}", count, path.display());
            Ok(())
        }
    }
}

#[cfg(feature = "gui")]
fn open_gui(config: Config) -> Result<()> {
    gui::run(config)
}

#[cfg(not(feature = "gui"))]
fn open_gui(_config: Config) -> Result<()> {
    Err(CollectionError::Gui(
        "this binary was built without the gui feature".to_string(),
    ))
}

fn scrape(url: String, name: String, config: Config) -> Result<()> {
    let rx = spawn_scrape(ScrapeJob { url, label: name }, config);
    for event in rx {
        match event {
            ScrapeEvent::Progress(text) => println!("{}", text),
            ScrapeEvent::Log(line) => println!("  {}", line),
            ScrapeEvent::Finished(Ok(summary)) => {
                println!(
                    "{} cards, {} rows written to {}",
                    summary.cards,
                    summary.rows,
                    summary.csv_path.display()
                );
                return Ok(());
            }
            ScrapeEvent::Finished(Err(reason)) => return Err(CollectionError::Network(reason)),
        }
    }
    Err(CollectionError::Network(
        "scrape worker stopped without a result".to_string(),
    ))
}

fn ownership_update(
    owned: bool,
    date: Option<String>,
    condition: Option<String>,
    purchase_price: Option<f64>,
    notes: Option<String>,
) -> OwnershipUpdate {
    let acquisition_date = match date {
        Some(date) => Some(date),
        None if owned => Some(date_time_as_string(None, Some("%Y-%m-%d"))),
        None => None,
    };
    OwnershipUpdate {
        owned,
        acquisition_date,
        condition,
        purchase_price,
        notes,
    }
}

/// Missing copies, optionally for one series. An unknown series code is an
/// error rather than an empty list.
fn missing_in(db: &Database, series: Option<&str>) -> Result<Vec<MissingCard>> {
    if let Some(code) = series {
        if db.series_id(code)?.is_none() {
            return Err(CollectionError::NotFound(format!("series {}", code)));
        }
    }
    db.missing_cards(series)
}

fn set_owned(db: &Database, number: &str, rarity: &str, update: &OwnershipUpdate) -> Result<()> {
    if db.set_ownership(number, rarity, update)? {
        Ok(())
    } else {
        Err(CollectionError::NotFound(format!(
            "no copy {} in rarity {}",
            number, rarity
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::helpers::{db_with_ra02, init_logger, write_file, RA02_CSV};

    #[test]
    fn test_no_subcommand_means_gui() {
        let cli = Cli::try_parse_from(["ygo-collection"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_set_owned_arguments() {
        let cli = Cli::try_parse_from([
            "ygo-collection",
            "set-owned",
            "RA02-FR001",
            "Secret Rare",
            "--price",
            "12.5",
            "--condition",
            "EX",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::SetOwned {
                number,
                rarity,
                missing,
                price,
                condition,
                date,
                ..
            }) => {
                assert_eq!(number, "RA02-FR001");
                assert_eq!(rarity, "Secret Rare");
                assert!(!missing);
                assert_eq!(price, Some(12.5));
                assert_eq!(condition.as_deref(), Some("EX"));
                assert!(date.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_owned_update_defaults_to_today() {
        let update = ownership_update(true, None, None, None, None);
        assert_eq!(
            update.acquisition_date,
            Some(date_time_as_string(None, Some("%Y-%m-%d")))
        );

        let update = ownership_update(false, None, None, None, None);
        assert!(!update.owned);
        assert!(update.acquisition_date.is_none());

        let update = ownership_update(true, Some("2024-01-02".to_string()), None, None, None);
        assert_eq!(update.acquisition_date.as_deref(), Some("2024-01-02"));
    }

    #[test]
    fn test_missing_checks_the_series_code() {
        let db = db_with_ra02();

        assert_eq!(missing_in(&db, None).unwrap().len(), 3);
        assert_eq!(missing_in(&db, Some("RA02")).unwrap().len(), 3);

        let err = missing_in(&db, Some("BLMM")).unwrap_err();
        assert!(matches!(err, CollectionError::NotFound(_)));
    }

    #[test]
    fn test_set_owned_reports_unknown_copies() {
        let db = db_with_ra02();
        let update = ownership_update(true, None, None, None, None);

        set_owned(&db, "RA02-FR001", "Rare", &update).unwrap();
        assert!(db.ownership("RA02-FR001", "Rare").unwrap().unwrap().owned);

        let err = set_owned(&db, "RA02-FR001", "Ghost Rare", &update).unwrap_err();
        assert!(matches!(err, CollectionError::NotFound(_)));
    }

    #[test]
    fn test_import_and_export_commands_use_configured_paths() {
        init_logger();
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::new();
        config.db_path = dir.path().join("db").join("collection.db");
        config.catalog_path = dir.path().join("urls_catalog.json");
        config.staging_dir = dir.path().join("staging");
        std::fs::create_dir_all(&config.staging_dir).unwrap();

        let csv = write_file(&config.staging_dir, "RA02.csv", RA02_CSV);
        run(Commands::Import { file: csv }, config.clone()).unwrap();

        let db = Database::open(&config.db_path).unwrap();
        assert_eq!(db.totals().unwrap().copies, 3);
        drop(db);

        run(
            Commands::SetOwned {
                number: "RA02-FR002".to_string(),
                rarity: "Common".to_string(),
                missing: false,
                date: None,
                condition: None,
                price: None,
                notes: None,
            },
            config.clone(),
        )
        .unwrap();

        let export = dir.path().join("out").join("owned.csv");
        run(Commands::Export { path: export.clone() }, config).unwrap();
        let content = std::fs::read_to_string(export).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("RA02-FR002"));
    }
}
