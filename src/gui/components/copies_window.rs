use eframe::egui;
use egui_extras::{Column, TableBuilder};

use super::collection_browser::status_text;
use crate::gui::app::App;

/// Cross-series list opened from the View menu.
pub fn draw(ctx: &egui::Context, app: &mut App) {
    let Some((status, rows)) = &app.copies_view else {
        return;
    };

    let mut open = true;
    egui::Window::new(format!("{} copies ({})", status, rows.len()))
        .id(egui::Id::new("copies_window"))
        .open(&mut open)
        .default_size([720.0, 480.0])
        .show(ctx, |ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .column(Column::initial(70.0))
                .column(Column::initial(110.0))
                .column(Column::initial(240.0).clip(true))
                .column(Column::initial(180.0).clip(true))
                .column(Column::remainder())
                .header(24.0, |mut header| {
                    for title in ["Series", "Number", "Name", "Rarity", "Status"] {
                        header.col(|ui| {
                            ui.strong(title);
                        });
                    }
                })
                .body(|body| {
                    body.rows(20.0, rows.len(), |mut row| {
                        let copy = &rows[row.index()];
                        row.col(|ui| {
                            ui.label(copy.series_code.as_str());
                        });
                        row.col(|ui| {
                            ui.label(copy.number.as_str());
                        });
                        row.col(|ui| {
                            ui.label(copy.name.as_str());
                        });
                        row.col(|ui| {
                            ui.label(copy.rarity.as_str());
                        });
                        row.col(|ui| {
                            ui.label(status_text(copy.owned));
                        });
                    });
                });
        });

    if !open {
        app.copies_view = None;
    }
}
