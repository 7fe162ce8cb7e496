use eframe::egui;

use crate::gui::actions;
use crate::gui::app::App;

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    ui.heading("Set card list converter");
    ui.add_space(4.0);

    egui::Grid::new("converter_form")
        .num_columns(2)
        .spacing([8.0, 6.0])
        .show(ui, |ui| {
            ui.label("URL");
            ui.add(
                egui::TextEdit::singleline(&mut app.scrape_url)
                    .desired_width(520.0)
                    .hint_text("https://yugipedia.com/wiki/Set_Card_Lists:..."),
            );
            ui.end_row();

            ui.label("Output name");
            ui.add(
                egui::TextEdit::singleline(&mut app.scrape_name)
                    .desired_width(200.0)
                    .hint_text("series code"),
            );
            ui.end_row();
        });

    let mut picked = None;
    let mut forgotten = None;
    ui.horizontal_wrapped(|ui| {
        ui.label("Known lists:");
        if app.catalog.is_empty() {
            ui.weak("none");
        }
        for (code, url) in app.catalog.entries() {
            let response = ui.small_button(code).on_hover_text(url);
            if response.clicked() {
                picked = Some((code.to_string(), url.to_string()));
            }
            response.context_menu(|ui| {
                if ui.button("Forget this URL").clicked() {
                    forgotten = Some(code.to_string());
                    ui.close();
                }
            });
        }
    });
    if let Some((code, url)) = picked {
        app.scrape_url = url;
        app.scrape_name = code;
    }
    if let Some(code) = forgotten {
        actions::forget_url(app, &code);
    }

    ui.add_space(6.0);
    ui.horizontal(|ui| {
        let running = app.is_scraping();
        if ui
            .add_enabled(!running, egui::Button::new("Extract"))
            .clicked()
        {
            actions::start_scrape(app);
        }
        if running {
            ui.spinner();
        }
        ui.label(app.scrape_progress.as_str());
    });

    ui.separator();
    egui::ScrollArea::vertical()
        .id_salt("scrape_log")
        .stick_to_bottom(true)
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for line in &app.scrape_log {
                ui.monospace(line);
            }
        });
}
