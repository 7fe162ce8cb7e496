// Series list on the left, the copies of the selected series on the right.

use eframe::egui::{self, Color32, RichText};
use egui_extras::{Column, TableBuilder};

use crate::db::records::StatusFilter;
use crate::gui::actions;
use crate::gui::app::App;
use crate::utilities::string_manipulators::format_percentage;

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    egui::SidePanel::left("series_list")
        .resizable(true)
        .default_width(280.0)
        .show_inside(ui, |ui| series_list(ui, app));

    egui::CentralPanel::default().show_inside(ui, |ui| {
        if app.selected_series.is_none() {
            ui.label("Select a series.");
            return;
        }
        filters(ui, app);
        ui.separator();
        bulk_actions(ui, app);
        ui.separator();
        completion_line(ui, app);
        copies_table(ui, app);
    });
}

fn series_list(ui: &mut egui::Ui, app: &mut App) {
    ui.horizontal(|ui| {
        ui.label("Filter");
        ui.text_edit_singleline(&mut app.series_filter);
    });
    ui.separator();

    let needle = app.series_filter.trim().to_lowercase();
    let mut clicked = None;
    egui::ScrollArea::vertical()
        .id_salt("series_list")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for series in app.series.iter().filter(|s| {
                needle.is_empty()
                    || s.code.to_lowercase().contains(&needle)
                    || s.name.to_lowercase().contains(&needle)
            }) {
                let selected = app.selected_series.as_deref() == Some(series.code.as_str());
                let label = format!(
                    "{}  {} ({} cards)",
                    series.code, series.name, series.card_count
                );
                if ui.selectable_label(selected, label).clicked() && !selected {
                    clicked = Some(series.code.clone());
                }
            }
        });

    if let Some(code) = clicked {
        actions::select_series(app, &code);
    }
}

fn filters(ui: &mut egui::Ui, app: &mut App) {
    let before = app.copy_filter.clone();
    let mut search_changed = false;

    ui.horizontal(|ui| {
        egui::ComboBox::from_label("Status")
            .selected_text(app.copy_filter.status.to_string())
            .show_ui(ui, |ui| {
                for status in StatusFilter::ALL {
                    ui.selectable_value(&mut app.copy_filter.status, status, status.to_string());
                }
            });

        let rarity_text = app
            .copy_filter
            .rarity
            .clone()
            .unwrap_or_else(|| "All rarities".to_string());
        egui::ComboBox::from_label("Rarity")
            .selected_text(rarity_text)
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut app.copy_filter.rarity, None, "All rarities");
                for rarity in &app.series_rarities {
                    ui.selectable_value(
                        &mut app.copy_filter.rarity,
                        Some(rarity.clone()),
                        rarity.as_str(),
                    );
                }
            });

        ui.label("Search");
        search_changed = ui
            .add(egui::TextEdit::singleline(&mut app.search_text).hint_text("name or number"))
            .changed();
    });

    if search_changed || app.copy_filter != before {
        actions::reload_copies(app);
    }
}

fn bulk_actions(ui: &mut egui::Ui, app: &mut App) {
    let has_selection = !app.selected_ids.is_empty();
    ui.horizontal(|ui| {
        let all_selected =
            !app.rows.is_empty() && app.rows.iter().all(|row| app.selected_ids.contains(&row.id));
        let mut select_all = all_selected;
        if ui.checkbox(&mut select_all, "Select all").changed() {
            if select_all {
                app.selected_ids.extend(app.rows.iter().map(|row| row.id));
            } else {
                app.selected_ids.clear();
            }
        }
        ui.label(format!("{} selected", app.selected_ids.len()));
        ui.separator();

        if ui.add_enabled(has_selection, egui::Button::new("Mark owned")).clicked() {
            actions::mark_selected(app, true);
        }
        if ui.add_enabled(has_selection, egui::Button::new("Mark missing")).clicked() {
            actions::mark_selected(app, false);
        }
        if ui
            .add_enabled(
                has_selection,
                egui::Button::new(RichText::new("Delete").color(Color32::LIGHT_RED)),
            )
            .clicked()
        {
            app.confirm_delete = true;
        }
    });
}

fn completion_line(ui: &mut egui::Ui, app: &App) {
    let Some(code) = app.selected_series.as_deref() else {
        return;
    };
    if let Some(stats) = app.series_stats.iter().find(|s| s.series_code == code) {
        ui.label(format!(
            "{}: {}/{} copies owned ({})",
            stats.series_name,
            stats.owned_copies,
            stats.total_copies,
            format_percentage(stats.pct)
        ));
    }
}

fn copies_table(ui: &mut egui::Ui, app: &mut App) {
    let rows = &app.rows;
    let selected_ids = &mut app.selected_ids;

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(Column::exact(24.0))
        .column(Column::initial(110.0).resizable(true))
        .column(Column::initial(260.0).resizable(true).clip(true))
        .column(Column::initial(200.0).resizable(true).clip(true))
        .column(Column::remainder())
        .header(24.0, |mut header| {
            header.col(|_ui| {});
            for title in ["Number", "Name", "Rarity", "Status"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(20.0, rows.len(), |mut row| {
                let copy = &rows[row.index()];
                row.col(|ui| {
                    let mut checked = selected_ids.contains(&copy.id);
                    if ui.checkbox(&mut checked, "").changed() {
                        if checked {
                            selected_ids.insert(copy.id);
                        } else {
                            selected_ids.remove(&copy.id);
                        }
                    }
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
}

pub fn status_text(owned: bool) -> RichText {
    if owned {
        RichText::new("Owned").color(Color32::LIGHT_GREEN)
    } else {
        RichText::new("Missing").color(Color32::GRAY)
    }
}

/// Deletion is permanent, so it goes through a confirmation window.
pub fn draw_delete_confirmation(ctx: &egui::Context, app: &mut App) {
    if !app.confirm_delete {
        return;
    }

    let count = app.selected_ids.len();
    let mut confirmed = false;
    let mut cancelled = false;
    egui::Window::new("Confirm deletion")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label(format!(
                "Permanently delete {} copies from the collection?",
                count
            ));
            ui.horizontal(|ui| {
                if ui.button("Delete").clicked() {
                    confirmed = true;
                }
                if ui.button("Cancel").clicked() {
                    cancelled = true;
                }
            });
        });

    if confirmed {
        actions::delete_selected(app);
    } else if cancelled {
        app.confirm_delete = false;
    }
}
