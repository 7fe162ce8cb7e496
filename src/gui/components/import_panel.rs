use eframe::egui;

use crate::gui::actions;
use crate::gui::app::App;

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    ui.heading("Import");
    ui.horizontal(|ui| {
        ui.label("CSV file");
        ui.add(
            egui::TextEdit::singleline(&mut app.import_path)
                .desired_width(420.0)
                .hint_text("converter/staging/RA02.csv"),
        );
        if ui.button("Import file").clicked() {
            actions::import_file(app);
        }
    });

    ui.add_space(6.0);
    ui.horizontal(|ui| {
        ui.label(format!("Staging folder: {}", app.config.staging_dir.display()));
        if ui.button("Import folder").clicked() {
            actions::import_staging_folder(app);
        }
    });
    ui.label("Files that add cards are removed from the staging folder once imported.");

    ui.add_space(12.0);
    ui.heading("Export");
    ui.horizontal(|ui| {
        ui.label("Output file");
        ui.add(egui::TextEdit::singleline(&mut app.export_path).desired_width(420.0));
        if ui.button("Export owned copies").clicked() {
            actions::export_owned(app);
        }
    });
}
