use eframe::egui;

use crate::db::records::StatusFilter;
use crate::gui::actions;
use crate::gui::app::{App, Tab};

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    egui::MenuBar::new().ui(ui, |ui| {
        ui.menu_button("File", |ui| {
            if ui.button("Import CSV file...").clicked() {
                app.tab = Tab::Import;
                ui.close();
            }
            if ui.button("Import staging folder").clicked() {
                actions::import_staging_folder(app);
                ui.close();
            }
            if ui.button("Export owned copies").clicked() {
                actions::export_owned(app);
                ui.close();
            }
            ui.separator();
            if ui.button("Quit").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });

        ui.menu_button("View", |ui| {
            if ui.button("Refresh").clicked() {
                actions::refresh(app);
                app.log("Views refreshed");
                ui.close();
            }
            ui.separator();
            for (label, status) in [
                ("Missing copies", StatusFilter::Missing),
                ("Owned copies", StatusFilter::Owned),
                ("All copies", StatusFilter::All),
            ] {
                if ui.button(label).clicked() {
                    actions::show_copies(app, status);
                    ui.close();
                }
            }
        });
    });
}
