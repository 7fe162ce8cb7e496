use eframe::egui;

use crate::gui::actions;
use crate::gui::app::{App, Tab};

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        for tab in Tab::ALL {
            let selected = app.tab == tab;
            if ui.selectable_label(selected, tab.to_string()).clicked() && !selected {
                log::debug!("Tab switch {} -> {}", app.tab, tab);
                app.tab = tab;
                // Figures may be stale after an import or a scrape.
                if tab == Tab::Overview {
                    actions::refresh(app);
                }
            }
        }
    });
}
