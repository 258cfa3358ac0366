use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::app::CytoViewApp;
use crate::data::model::{Axis, Channel};
use crate::events::ViewerEvent;
use crate::session::LOG_HEADER;
use crate::ui::plot::BrushMode;

const RECORD_COLOR: Color32 = Color32::from_rgb(0x5C, 0xB8, 0x5C);

// ---------------------------------------------------------------------------
// Left side panel – file / channel pickers and session log
// ---------------------------------------------------------------------------

/// Render the control panel. Widgets only queue events; the app dispatches
/// them after the frame's panels are drawn.
pub fn side_panel(ui: &mut Ui, app: &mut CytoViewApp) {
    ui.heading("Measurements");
    ui.separator();

    // ---- File selector ----
    ui.strong("File");
    let current_file = app
        .controller
        .state()
        .file_name()
        .unwrap_or("–")
        .to_string();
    egui::ComboBox::from_id_salt("file_selector")
        .selected_text(&current_file)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for file in &app.files {
                if ui.selectable_label(current_file == *file, file).clicked() {
                    app.pending.push(ViewerEvent::LoadFile(file.clone()));
                }
            }
        });
    if app.files.is_empty() {
        ui.label(RichText::new("No readable files found").weak());
    }

    ui.add_space(6.0);

    // ---- Channel selectors ----
    let channels = app.controller.state().channels();
    ui.add_enabled_ui(channels.is_some(), |ui: &mut Ui| {
        for (axis, title) in [(Axis::X, "X channel"), (Axis::Y, "Y channel")] {
            ui.strong(title);
            let current = channels.map(|pair| pair.get(axis));
            egui::ComboBox::from_id_salt(("channel_selector", title))
                .selected_text(current.map_or("–", Channel::name))
                .show_ui(ui, |ui: &mut Ui| {
                    for channel in Channel::ALL {
                        if ui
                            .selectable_label(current == Some(channel), channel.name())
                            .clicked()
                            && current != Some(channel)
                        {
                            app.pending.push(ViewerEvent::ChangeChannel(axis, channel));
                        }
                    }
                });
        }

        ui.add_space(6.0);
        let record = egui::Button::new(RichText::new("Record").color(Color32::WHITE))
            .fill(RECORD_COLOR);
        if ui.add(record).clicked() {
            app.pending.push(ViewerEvent::Record);
        }
    });

    ui.separator();
    session_log(ui, app);
}

fn session_log(ui: &mut Ui, app: &CytoViewApp) {
    let log = app.controller.log();

    ui.horizontal(|ui: &mut Ui| {
        ui.strong("Session log");
        if ui
            .add_enabled(!log.is_empty(), egui::Button::new("Copy"))
            .clicked()
        {
            ui.ctx().copy_text(log.render());
        }
    });

    TableBuilder::new(ui)
        .striped(true)
        .min_scrolled_height(0.0)
        .column(Column::remainder())
        .column(Column::auto())
        .column(Column::auto())
        .header(18.0, |mut header| {
            for title in LOG_HEADER.split(' ') {
                header.col(|ui: &mut Ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for entry in log.entries() {
                body.row(16.0, |mut row| {
                    row.col(|ui: &mut Ui| {
                        ui.monospace(&entry.file_name);
                    });
                    row.col(|ui: &mut Ui| {
                        ui.monospace(entry.selected.to_string());
                    });
                    row.col(|ui: &mut Ui| {
                        ui.monospace(entry.total.to_string());
                    });
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, app: &mut CytoViewApp) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Import directory…").clicked() {
                open_directory_dialog(app);
                ui.close_menu();
            }
            if ui.button("Rescan").clicked() {
                app.rescan();
                ui.close_menu();
            }
        });

        ui.separator();
        ui.label(format!("Import: {}", app.import_dir.display()));
        ui.separator();

        if ui
            .selectable_label(app.brush.enabled, "Brush select")
            .on_hover_text("Drag a box or lasso over the scatter plot; click to clear")
            .clicked()
        {
            app.brush.enabled = !app.brush.enabled;
        }
        ui.add_enabled_ui(app.brush.enabled, |ui: &mut Ui| {
            ui.selectable_value(&mut app.brush.mode, BrushMode::Box, "Box");
            ui.selectable_value(&mut app.brush.mode, BrushMode::Lasso, "Lasso");
        });

        if let Some(msg) = &app.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Directory dialog
// ---------------------------------------------------------------------------

pub fn open_directory_dialog(app: &mut CytoViewApp) {
    let dir = rfd::FileDialog::new()
        .set_title("Choose import directory")
        .set_directory(&app.import_dir)
        .pick_folder();

    if let Some(dir) = dir {
        app.set_import_dir(dir);
    }
}
