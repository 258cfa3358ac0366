use std::path::PathBuf;

use eframe::egui;

use crate::config::ViewerConfig;
use crate::data::loader::DirectoryLoader;
use crate::data::model::Axis;
use crate::events::{Controller, ViewerEvent};
use crate::ui::canvas::PlotCanvas;
use crate::ui::panels;
use crate::ui::plot::{self, Brush};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CytoViewApp {
    pub controller: Controller,
    /// What the panels paint; written only through the controller.
    pub canvas: PlotCanvas,
    /// Parseable files in `import_dir`, refreshed on rescan.
    pub files: Vec<String>,
    pub import_dir: PathBuf,
    pub brush: Brush,
    /// Events queued by widgets during the current frame.
    pub pending: Vec<ViewerEvent>,
    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
    point_radius: f32,
}

impl CytoViewApp {
    /// Scan the import directory and open its first readable file.
    pub fn new(config: &ViewerConfig) -> Self {
        let loader = DirectoryLoader::new(&config.import_dir);
        let mut app = Self {
            controller: Controller::new(Box::new(loader), config.bin_count),
            canvas: PlotCanvas::default(),
            files: Vec::new(),
            import_dir: config.import_dir.clone(),
            brush: Brush::default(),
            pending: Vec::new(),
            status_message: None,
            point_radius: config.point_radius,
        };
        app.controller.refresh(&mut app.canvas);
        app.rescan();
        if let Some(first) = app.files.first().cloned() {
            app.dispatch(ViewerEvent::LoadFile(first));
        }
        app
    }

    pub fn rescan(&mut self) {
        self.files = self.controller.available_files();
        log::info!(
            "{} readable files in {}",
            self.files.len(),
            self.import_dir.display()
        );
        if self.files.is_empty() {
            self.status_message = Some(format!(
                "No readable files in {}",
                self.import_dir.display()
            ));
        }
    }

    pub fn set_import_dir(&mut self, dir: PathBuf) {
        self.controller
            .set_loader(Box::new(DirectoryLoader::new(&dir)));
        self.import_dir = dir;
        self.status_message = None;
        self.rescan();
    }

    /// Route one event through the controller into the canvas.
    pub fn dispatch(&mut self, event: ViewerEvent) {
        self.status_message = match self.controller.dispatch(event, &mut self.canvas) {
            Ok(()) => self.controller.take_notice().map(|n| n.user_message()),
            Err(e) => Some(format!("{}: {}", e.title(), e.user_message())),
        };
    }
}

impl eframe::App for CytoViewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, self);
        });

        // ---- Left side panel: pickers and session log ----
        egui::SidePanel::left("control_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, self);
            });

        // ---- Bottom panel: X histogram ----
        egui::TopBottomPanel::bottom("x_histogram")
            .default_height(200.0)
            .resizable(true)
            .show(ctx, |ui| {
                plot::histogram_plot(ui, self.canvas.histogram(Axis::X), Axis::X);
            });

        // ---- Right panel: Y histogram ----
        egui::SidePanel::right("y_histogram")
            .default_width(200.0)
            .resizable(true)
            .show(ctx, |ui| {
                plot::histogram_plot(ui, self.canvas.histogram(Axis::Y), Axis::Y);
            });

        // ---- Central panel: scatter ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(selection) =
                plot::scatter_plot(ui, &self.canvas, &mut self.brush, self.point_radius)
            {
                self.pending.push(ViewerEvent::UpdateSelection(selection));
            }
        });

        for event in std::mem::take(&mut self.pending) {
            self.dispatch(event);
        }
    }
}
