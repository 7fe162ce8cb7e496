use eframe::egui::{self, ProgressBar, RichText};

use crate::db::db::completion_pct;
use crate::gui::app::App;
use crate::utilities::string_manipulators::format_percentage;

const LABEL_WIDTH: f32 = 260.0;

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    let totals = app.totals;
    ui.horizontal(|ui| {
        ui.label(RichText::new(format!("{} series", totals.series)).strong());
        ui.separator();
        ui.label(format!("{} cards", totals.cards));
        ui.separator();
        ui.label(format!("{} copies", totals.copies));
        ui.separator();
        ui.label(format!(
            "{} owned ({})",
            totals.owned,
            format_percentage(completion_pct(totals.owned, totals.copies))
        ));
    });
    ui.add_space(8.0);

    if app.series_stats.is_empty() {
        ui.label("The collection is empty. Import a CSV file to get started.");
        return;
    }

    egui::ScrollArea::vertical()
        .id_salt("overview")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            ui.heading("Completion by series");
            for stats in &app.series_stats {
                completion_bar(
                    ui,
                    &format!("{}  {}", stats.series_code, stats.series_name),
                    stats.owned_copies,
                    stats.total_copies,
                );
            }

            ui.add_space(12.0);
            ui.heading("Completion by rarity");
            for stats in &app.rarity_stats {
                completion_bar(ui, &stats.rarity, stats.owned, stats.total);
            }
        });
}

fn completion_bar(ui: &mut egui::Ui, label: &str, owned: i64, total: i64) {
    let pct = completion_pct(owned, total);
    ui.horizontal(|ui| {
        ui.add_sized([LABEL_WIDTH, 18.0], egui::Label::new(label).truncate());
        ui.add(
            ProgressBar::new((pct / 100.0) as f32)
                .desired_width(ui.available_width().min(360.0))
                .text(format!("{}/{} ({})", owned, total, format_percentage(pct))),
        );
    });
}
