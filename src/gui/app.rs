use std::collections::BTreeSet;
use std::fmt;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

use eframe::egui;
use log::{error, info};
use strum_macros::Display;

use super::actions;
use super::components::{
    collection_browser, converter_panel, copies_window, import_panel, menu_bar, overview, tabs,
};
use crate::catalog::UrlCatalog;
use crate::db::records::{
    CollectionTotals, CopyFilter, CopyRow, RarityStats, SeriesStats, SeriesSummary, StatusFilter,
};
use crate::db::Database;
use crate::error::{CollectionError, Result};
use crate::utilities::config::Config;
use crate::utilities::string_manipulators::date_time_as_string;
use crate::worker::ScrapeEvent;

const MAX_LOG_LINES: usize = 500;

pub fn run(config: Config) -> Result<()> {
    let app = App::new(config)?;
    eframe::run_native(
        "Yu-Gi-Oh! Collection",
        eframe::NativeOptions::default(),
        Box::new(|_cc| Ok(Box::new(app))),
    )
    .map_err(|e| CollectionError::Gui(e.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Tab {
    Overview,
    Collection,
    Converter,
    Import,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Overview, Tab::Collection, Tab::Converter, Tab::Import];
}

pub struct Popup {
    pub title: String,
    pub message: String,
}

pub struct App {
    pub config: Config,
    pub db: Database,
    pub catalog: UrlCatalog,
    pub tab: Tab,
    pub log_lines: Vec<String>,
    pub popup: Option<Popup>,

    // overview
    pub totals: CollectionTotals,
    pub series_stats: Vec<SeriesStats>,
    pub rarity_stats: Vec<RarityStats>,

    // collection browser
    pub series: Vec<SeriesSummary>,
    pub series_filter: String,
    pub selected_series: Option<String>,
    pub series_rarities: Vec<String>,
    pub copy_filter: CopyFilter,
    pub search_text: String,
    pub rows: Vec<CopyRow>,
    pub selected_ids: BTreeSet<i64>,
    pub confirm_delete: bool,

    // View menu window
    pub copies_view: Option<(StatusFilter, Vec<CopyRow>)>,

    // converter, the receiver is only set while the worker runs
    pub scrape_url: String,
    pub scrape_name: String,
    pub scrape_progress: String,
    pub scrape_log: Vec<String>,
    pub scrape_rx: Option<Receiver<ScrapeEvent>>,

    pub import_path: String,
    pub export_path: String,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let db = Database::open(&config.db_path)?;
        let catalog = UrlCatalog::load(&config.catalog_path);
        let export_path = format!(
            "exports/owned_{}.csv",
            date_time_as_string(None, Some("%Y%m%d"))
        );

        let mut app = Self {
            config,
            db,
            catalog,
            tab: Tab::Overview,
            log_lines: Vec::new(),
            popup: None,
            totals: CollectionTotals::default(),
            series_stats: Vec::new(),
            rarity_stats: Vec::new(),
            series: Vec::new(),
            series_filter: String::new(),
            selected_series: None,
            series_rarities: Vec::new(),
            copy_filter: CopyFilter::default(),
            search_text: String::new(),
            rows: Vec::new(),
            selected_ids: BTreeSet::new(),
            confirm_delete: false,
            copies_view: None,
            scrape_url: String::new(),
            scrape_name: String::new(),
            scrape_progress: "Idle".to_string(),
            scrape_log: Vec::new(),
            scrape_rx: None,
            import_path: String::new(),
            export_path,
        };
        actions::refresh(&mut app);
        app.log(format!(
            "Opened {} ({} series)",
            app.config.db_path.display(),
            app.series.len()
        ));
        Ok(app)
    }

    pub fn is_scraping(&self) -> bool {
        self.scrape_rx.is_some()
    }

    pub fn log(&mut self, line: impl Into<String>) {
        let line = line.into();
        info!("{}", line);
        self.push_log(line);
    }

    /// Logs the failure and opens a popup. The app carries on.
    pub fn fail(&mut self, title: &str, err: impl fmt::Display) {
        let message = err.to_string();
        error!("{}: {}", title, message);
        self.push_log(format!("{}: {}", title, message));
        self.popup = Some(Popup {
            title: title.to_string(),
            message,
        });
    }

    fn push_log(&mut self, line: String) {
        self.log_lines.push(format!(
            "[{}] {}",
            date_time_as_string(None, Some("%H:%M:%S")),
            line
        ));
        if self.log_lines.len() > MAX_LOG_LINES {
            let excess = self.log_lines.len() - MAX_LOG_LINES;
            self.log_lines.drain(..excess);
        }
    }

    /// Drains worker events. The receiver is dropped on the terminal event,
    /// which re-enables the Extract button.
    pub fn poll_scrape(&mut self) {
        let Some(rx) = &self.scrape_rx else {
            return;
        };

        let mut events = Vec::new();
        let mut disconnected = false;
        loop {
            match rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    disconnected = true;
                    break;
                }
            }
        }

        let mut finished = false;
        for event in events {
            match event {
                ScrapeEvent::Progress(text) => self.scrape_progress = text,
                ScrapeEvent::Log(line) => self.scrape_log.push(line),
                ScrapeEvent::Finished(result) => {
                    finished = true;
                    actions::scrape_finished(self, result);
                }
            }
        }

        if finished || disconnected {
            self.scrape_rx = None;
            if disconnected && !finished {
                self.fail("Extraction", "worker stopped without a result");
            }
        }
    }

    fn draw_log(&self, ui: &mut egui::Ui) {
        ui.strong("Log");
        egui::ScrollArea::vertical()
            .id_salt("log_lines")
            .stick_to_bottom(true)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for line in &self.log_lines {
                    ui.monospace(line);
                }
            });
    }

    fn draw_popup(&mut self, ctx: &egui::Context) {
        let mut close = false;
        if let Some(popup) = &self.popup {
            egui::Window::new(popup.title.as_str())
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(popup.message.as_str());
                    if ui.button("OK").clicked() {
                        close = true;
                    }
                });
        }
        if close {
            self.popup = None;
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_scrape();
        if self.is_scraping() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            menu_bar::draw(ui, self);
        });

        egui::TopBottomPanel::bottom("log_panel")
            .resizable(true)
            .default_height(120.0)
            .show(ctx, |ui| {
                self.draw_log(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            tabs::draw(ui, self);
            ui.separator();

            match self.tab {
                Tab::Overview => overview::draw(ui, self),
                Tab::Collection => collection_browser::draw(ui, self),
                Tab::Converter => converter_panel::draw(ui, self),
                Tab::Import => import_panel::draw(ui, self),
            }
        });

        copies_window::draw(ctx, self);
        collection_browser::draw_delete_confirmation(ctx, self);
        self.draw_popup(ctx);
    }
}
