// Operations behind the buttons and menus. Layout stays in components/,
// these update the database, the cached views and the log.

use std::path::Path;

use crate::catalog::UrlCatalog;
use crate::db::export::export_owned_csv;
use crate::db::records::StatusFilter;
use crate::error::Result;
use crate::gui::app::App;
use crate::importer::{CsvImporter, FolderImportOutcome};
use crate::worker::{spawn_scrape, ScrapeJob, ScrapeSummary};

/// Reloads every cached view from the database.
pub fn refresh(app: &mut App) {
    if let Err(e) = load_views(app) {
        app.fail("Refresh", e);
    }
}

fn load_views(app: &mut App) -> Result<()> {
    app.totals = app.db.totals()?;
    app.series_stats = app.db.collection_stats()?;
    app.rarity_stats = app.db.rarity_stats()?;
    app.series = app.db.series_overview()?;

    let still_listed = app
        .selected_series
        .as_ref()
        .map(|code| app.series.iter().any(|s| &s.code == code))
        .unwrap_or(false);
    if still_listed {
        load_series(app)?;
    } else {
        app.selected_series = None;
        app.series_rarities.clear();
        app.rows.clear();
        app.selected_ids.clear();
    }
    Ok(())
}

pub fn select_series(app: &mut App, code: &str) {
    app.selected_series = Some(code.to_string());
    app.copy_filter.rarity = None;
    app.selected_ids.clear();
    if let Err(e) = load_series(app) {
        app.fail("Series", e);
    }
}

/// Re-runs the table query after a filter change.
pub fn reload_copies(app: &mut App) {
    if let Err(e) = load_series(app) {
        app.fail("Series", e);
    }
}

fn load_series(app: &mut App) -> Result<()> {
    let Some(code) = app.selected_series.clone() else {
        return Ok(());
    };
    app.series_rarities = app.db.series_rarities(&code)?;
    if let Some(rarity) = &app.copy_filter.rarity {
        if !app.series_rarities.contains(rarity) {
            app.copy_filter.rarity = None;
        }
    }

    let search = app.search_text.trim();
    app.copy_filter.search = (!search.is_empty()).then(|| search.to_string());
    app.rows = app.db.series_copies(&code, &app.copy_filter)?;

    let visible: Vec<i64> = app.rows.iter().map(|row| row.id).collect();
    app.selected_ids.retain(|id| visible.contains(id));
    Ok(())
}

pub fn import_file(app: &mut App) {
    let path = app.import_path.trim().to_string();
    if path.is_empty() {
        app.fail("Import", "no file selected");
        return;
    }

    let result = CsvImporter::new(&app.db, Some(&app.catalog)).import_file(Path::new(&path));
    match result {
        Ok(stats) => {
            app.log(format!(
                "{}: {} cards added, {} links created, {} existing, {} errors",
                path, stats.cards_added, stats.links_created, stats.cards_existing, stats.errors
            ));
            refresh(app);
        }
        Err(e) => app.fail("Import", e),
    }
}

pub fn import_staging_folder(app: &mut App) {
    let dir = app.config.staging_dir.clone();
    let results = CsvImporter::new(&app.db, Some(&app.catalog)).import_folder(&dir);
    if results.is_empty() {
        app.log(format!("No CSV files to import in {}", dir.display()));
        return;
    }

    let mut failures = Vec::new();
    for (file, outcome) in results {
        match outcome {
            FolderImportOutcome::Imported { stats, removed } => app.log(format!(
                "{}: {} cards added, {} links created{}",
                file,
                stats.cards_added,
                stats.links_created,
                if removed { ", file removed" } else { "" }
            )),
            FolderImportOutcome::Failed(reason) => failures.push(format!("{}: {}", file, reason)),
        }
    }
    if !failures.is_empty() {
        app.fail("Folder import", failures.join("\n"));
    }
    refresh(app);
}

pub fn export_owned(app: &mut App) {
    let path = app.export_path.trim().to_string();
    if path.is_empty() {
        app.fail("Export", "no output path");
        return;
    }
    match export_owned_csv(&app.db, Path::new(&path)) {
        Ok(count) => app.log(format!("{} owned copies exported to {}", count, path)),
        Err(e) => app.fail("Export", e),
    }
}

/// Marks every selected copy owned or missing.
pub fn mark_selected(app: &mut App, owned: bool) {
    let ids: Vec<i64> = app.selected_ids.iter().copied().collect();
    if ids.is_empty() {
        app.log("Nothing selected");
        return;
    }
    match app.db.set_owned_by_ids(&ids, owned) {
        Ok(changed) => {
            app.log(format!(
                "{} copies marked {}",
                changed,
                if owned { "owned" } else { "missing" }
            ));
            refresh(app);
        }
        Err(e) => app.fail("Update", e),
    }
}

pub fn delete_selected(app: &mut App) {
    app.confirm_delete = false;
    let ids: Vec<i64> = app.selected_ids.iter().copied().collect();
    if ids.is_empty() {
        return;
    }
    match app.db.delete_ownership(&ids) {
        Ok(deleted) => {
            app.selected_ids.clear();
            app.log(format!("{} copies deleted", deleted));
            refresh(app);
        }
        Err(e) => app.fail("Delete", e),
    }
}

pub fn show_copies(app: &mut App, status: StatusFilter) {
    match app.db.copies(status) {
        Ok(rows) => app.copies_view = Some((status, rows)),
        Err(e) => app.fail("View", e),
    }
}

pub fn start_scrape(app: &mut App) {
    if app.is_scraping() {
        return;
    }
    let url = app.scrape_url.trim().to_string();
    if url.is_empty() {
        app.fail("Extraction", "no URL given");
        return;
    }

    app.scrape_log.clear();
    app.scrape_progress = format!("Starting {}", url);
    app.log(format!("Extraction started for {}", url));
    app.scrape_rx = Some(spawn_scrape(
        ScrapeJob {
            url,
            label: app.scrape_name.trim().to_string(),
        },
        app.config.clone(),
    ));
}

pub fn forget_url(app: &mut App, code: &str) {
    if !app.catalog.remove(code) {
        return;
    }
    match app.catalog.save(&app.config.catalog_path) {
        Ok(()) => app.log(format!("URL for {} forgotten", code)),
        Err(e) => app.fail("URL catalog", e),
    }
}

pub fn scrape_finished(app: &mut App, result: std::result::Result<ScrapeSummary, String>) {
    match result {
        Ok(summary) => {
            app.scrape_progress = format!(
                "{} cards, {} rows written to {}",
                summary.cards,
                summary.rows,
                summary.csv_path.display()
            );
            app.log(format!(
                "Extraction of {} done, {} ready for import",
                summary.series_code,
                summary.csv_path.display()
            ));
            // The worker may have added the URL to the catalog file.
            app.catalog = UrlCatalog::load(&app.config.catalog_path);
            app.import_path = summary.csv_path.display().to_string();
        }
        Err(reason) => {
            app.scrape_progress = "Failed".to_string();
            app.fail("Extraction", reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::helpers::{init_logger, write_file, RA02_CSV};
    use crate::utilities::config::Config;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn app_in(dir: &TempDir) -> App {
        let mut config = Config::new();
        config.db_path = dir.path().join("collection.db");
        config.staging_dir = dir.path().join("staging");
        config.catalog_path = dir.path().join("urls_catalog.json");
        config.cache_dir = dir.path().join("cache");
        App::new(config).unwrap()
    }

    fn imported_app(dir: &TempDir) -> App {
        init_logger();
        let mut app = app_in(dir);
        let csv: PathBuf = write_file(dir.path(), "RA02.csv", RA02_CSV);
        app.import_path = csv.display().to_string();
        import_file(&mut app);
        assert!(app.popup.is_none());
        app
    }

    #[test]
    fn test_import_refreshes_overview() {
        let dir = tempfile::tempdir().unwrap();
        let app = imported_app(&dir);

        assert_eq!(app.totals.series, 1);
        assert_eq!(app.totals.copies, 3);
        assert_eq!(app.series_stats.len(), 1);
        assert_eq!(app.series_stats[0].total_copies, 3);
        assert!(app.log_lines.iter().any(|l| l.contains("2 cards added")));
    }

    #[test]
    fn test_import_failure_opens_popup() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        app.import_path = dir.path().join("absent.csv").display().to_string();

        import_file(&mut app);

        let popup = app.popup.as_ref().unwrap();
        assert_eq!(popup.title, "Import");
        assert!(app.log_lines.last().unwrap().contains("Import:"));
        assert_eq!(app.totals.copies, 0);
    }

    #[test]
    fn test_bulk_marking_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = imported_app(&dir);

        select_series(&mut app, "RA02");
        assert_eq!(app.rows.len(), 3);
        assert_eq!(app.series_rarities, vec!["Common", "Rare", "Secret Rare"]);

        app.selected_ids = app
            .rows
            .iter()
            .filter(|row| row.number == "RA02-FR001")
            .map(|row| row.id)
            .collect();
        mark_selected(&mut app, true);
        assert_eq!(app.totals.owned, 2);

        app.copy_filter.status = StatusFilter::Missing;
        reload_copies(&mut app);
        assert_eq!(app.rows.len(), 1);
        assert_eq!(app.rows[0].number, "RA02-FR002");
        assert!(app.selected_ids.is_empty());

        app.copy_filter.status = StatusFilter::All;
        app.search_text = "carte a".to_string();
        reload_copies(&mut app);
        assert_eq!(app.rows.len(), 2);
    }

    #[test]
    fn test_delete_selected_removes_copies() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = imported_app(&dir);
        select_series(&mut app, "RA02");

        app.selected_ids.insert(app.rows[0].id);
        app.confirm_delete = true;
        delete_selected(&mut app);

        assert!(!app.confirm_delete);
        assert_eq!(app.rows.len(), 2);
        assert_eq!(app.totals.copies, 2);
        assert!(app.selected_ids.is_empty());
    }

    #[test]
    fn test_view_menu_and_export() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = imported_app(&dir);

        show_copies(&mut app, StatusFilter::Missing);
        let (status, rows) = app.copies_view.as_ref().unwrap();
        assert_eq!(*status, StatusFilter::Missing);
        assert_eq!(rows.len(), 3);

        app.export_path = dir.path().join("out").join("owned.csv").display().to_string();
        export_owned(&mut app);
        assert!(app.popup.is_none());
        assert!(dir.path().join("out").join("owned.csv").exists());
    }

    #[test]
    fn test_forget_url_updates_catalog_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        assert!(app.catalog.url_for("BLMM").is_some());

        forget_url(&mut app, "BLMM");

        assert!(app.catalog.url_for("BLMM").is_none());
        let saved = UrlCatalog::load(&app.config.catalog_path);
        assert!(saved.url_for("BLMM").is_none());
        assert!(saved.url_for("RA02").is_some());
    }

    #[test]
    fn test_scrape_without_url_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);

        start_scrape(&mut app);

        assert!(!app.is_scraping());
        assert_eq!(app.popup.as_ref().unwrap().title, "Extraction");
    }

    #[test]
    fn test_finished_scrape_releases_the_worker_and_prefills_import() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/wiki/Set_Card_Lists:RA02_(TCG-FR)")
            .with_status(200)
            .with_body(include_str!("../test/set_card_list.html"))
            .create();
        app.config.request_delay_ms = 0;
        app.scrape_url = format!("{}/wiki/Set_Card_Lists:RA02_(TCG-FR)", server.url());

        start_scrape(&mut app);
        assert!(app.is_scraping());

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(20);
        while app.is_scraping() && std::time::Instant::now() < deadline {
            std::thread::sleep(std::time::Duration::from_millis(20));
            app.poll_scrape();
        }

        assert!(!app.is_scraping());
        assert!(app.popup.is_none());
        assert!(app.import_path.ends_with("RA02.csv"));
        assert!(app.catalog.url_for("RA02").unwrap().starts_with(&server.url()));
        assert!(!app.scrape_log.is_empty());
    }
}
