use std::collections::BTreeSet;

use eframe::egui::{self, Color32, RichText, Stroke, Ui};
use egui_plot::{Bar, BarChart, Line, Plot, PlotPoints, Points, Polygon};

use crate::data::model::Axis;
use crate::ui::canvas::{HistogramLayer, PlotCanvas};

pub const BASE_COLOR: Color32 = Color32::from_rgb(0x3A, 0x57, 0x85);
// Premultiplied BASE_COLOR at 60% and 50% alpha.
const POINT_COLOR: Color32 = Color32::from_rgba_premultiplied(35, 52, 80, 153);
const OVERLAY_COLOR: Color32 = Color32::from_rgba_premultiplied(29, 44, 67, 128);
const BRUSH_FILL: Color32 = Color32::from_rgba_premultiplied(35, 22, 5, 40);

// ---------------------------------------------------------------------------
// Brush selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BrushMode {
    #[default]
    Box,
    Lasso,
}

/// Brush state. `path` holds the pointer trail of the current drag in plot
/// coordinates; box mode only looks at its first and last point.
#[derive(Debug, Clone, Default)]
pub struct Brush {
    pub enabled: bool,
    pub mode: BrushMode,
    path: Vec<[f64; 2]>,
}

impl Brush {
    fn begin(&mut self, at: [f64; 2]) {
        self.path.clear();
        self.path.push(at);
    }

    fn extend(&mut self, to: [f64; 2]) {
        match self.mode {
            BrushMode::Box => {
                self.path.truncate(1);
                self.path.push(to);
            }
            BrushMode::Lasso => {
                if self.path.last() != Some(&to) {
                    self.path.push(to);
                }
            }
        }
    }

    /// Rows enclosed by the finished gesture. Clears the trail.
    fn finish(&mut self, points: &[[f64; 2]]) -> Option<BTreeSet<usize>> {
        let path = std::mem::take(&mut self.path);
        let (&first, &last) = (path.first()?, path.last()?);
        Some(match self.mode {
            BrushMode::Box => points_in_box(points, first, last),
            BrushMode::Lasso => points_in_polygon(points, &path),
        })
    }
}

/// Indices of the points inside the box spanned by two opposite corners.
pub fn points_in_box(points: &[[f64; 2]], a: [f64; 2], b: [f64; 2]) -> BTreeSet<usize> {
    let (x0, x1) = (a[0].min(b[0]), a[0].max(b[0]));
    let (y0, y1) = (a[1].min(b[1]), a[1].max(b[1]));
    points
        .iter()
        .enumerate()
        .filter(|(_, p)| p[0] >= x0 && p[0] <= x1 && p[1] >= y0 && p[1] <= y1)
        .map(|(i, _)| i)
        .collect()
}

/// Indices of the points inside a closed polygon (even-odd rule). Fewer than
/// three vertices enclose nothing.
pub fn points_in_polygon(points: &[[f64; 2]], polygon: &[[f64; 2]]) -> BTreeSet<usize> {
    if polygon.len() < 3 {
        return BTreeSet::new();
    }
    points
        .iter()
        .enumerate()
        .filter(|(_, p)| polygon_contains(polygon, **p))
        .map(|(i, _)| i)
        .collect()
}

fn polygon_contains(polygon: &[[f64; 2]], [x, y]: [f64; 2]) -> bool {
    let mut inside = false;
    let mut prev = polygon[polygon.len() - 1];
    for &[xi, yi] in polygon {
        let [xj, yj] = prev;
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        prev = [xi, yi];
    }
    inside
}

// ---------------------------------------------------------------------------
// Scatter plot (central panel)
// ---------------------------------------------------------------------------

/// Render the scatter plot. Returns the new selection when a brush gesture
/// finished this frame; a plain click in brush mode clears it.
pub fn scatter_plot(
    ui: &mut Ui,
    canvas: &PlotCanvas,
    brush: &mut Brush,
    point_radius: f32,
) -> Option<BTreeSet<usize>> {
    let scatter = match &canvas.scatter {
        Some(scatter) => scatter,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Pick a file to view measurements");
            });
            return None;
        }
    };

    ui.label(RichText::new(&canvas.counter).strong().size(16.0));

    let trail = brush.path.clone();
    let mode = brush.mode;
    let plot_response = Plot::new("scatter_plot")
        .x_axis_label(scatter.x_label.name())
        .y_axis_label(scatter.y_label.name())
        .allow_boxed_zoom(!brush.enabled)
        .allow_drag(!brush.enabled)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            let points: PlotPoints = scatter.points.iter().copied().collect();
            plot_ui.points(Points::new(points).radius(point_radius).color(POINT_COLOR));

            match (mode, trail.first(), trail.last()) {
                (BrushMode::Box, Some(&a), Some(&b)) => {
                    let corners: PlotPoints = vec![a, [b[0], a[1]], b, [a[0], b[1]]].into();
                    plot_ui.polygon(
                        Polygon::new(corners)
                            .fill_color(BRUSH_FILL)
                            .stroke(Stroke::new(1.0, BASE_COLOR)),
                    );
                }
                (BrushMode::Lasso, Some(&first), Some(_)) if trail.len() > 1 => {
                    let mut outline = trail.clone();
                    outline.push(first);
                    plot_ui.line(Line::new(PlotPoints::from(outline)).color(BASE_COLOR));
                }
                _ => {}
            }
        });

    if !brush.enabled {
        return None;
    }

    let response = &plot_response.response;
    let to_plot = |pos: egui::Pos2| {
        let p = plot_response.transform.value_from_position(pos);
        [p.x, p.y]
    };

    if let Some(pos) = response.interact_pointer_pos() {
        if response.drag_started() {
            brush.begin(to_plot(pos));
        } else if response.dragged() {
            brush.extend(to_plot(pos));
        }
    }

    if response.drag_stopped() {
        return brush.finish(&scatter.points);
    }
    if response.clicked() {
        return Some(BTreeSet::new());
    }
    None
}

// ---------------------------------------------------------------------------
// Marginal histograms
// ---------------------------------------------------------------------------

/// Render one marginal histogram: full population as an outline, the
/// selection as a filled overlay. The Y histogram is drawn sideways.
pub fn histogram_plot(ui: &mut Ui, layer: Option<&HistogramLayer>, axis: Axis) {
    let Some(layer) = layer else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("No data");
        });
        return;
    };

    let bars = |counts: &[u64], fill: Color32, stroke: Stroke| -> Vec<Bar> {
        layer
            .bin_geometry()
            .zip(counts)
            .map(|((center, width), &count)| {
                Bar::new(center, count as f64)
                    .width(width)
                    .fill(fill)
                    .stroke(stroke)
            })
            .collect()
    };

    let full = bars(&layer.full, Color32::WHITE, Stroke::new(1.0, BASE_COLOR));
    let overlay = bars(&layer.overlay, OVERLAY_COLOR, Stroke::NONE);

    let (mut full_chart, mut overlay_chart) = (
        BarChart::new(full).name("All events"),
        BarChart::new(overlay).name("Selection"),
    );
    let plot = Plot::new(("histogram", axis == Axis::X))
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false);

    let plot = match axis {
        Axis::X => plot.include_y(0.0).x_axis_label(layer.channel.name()),
        Axis::Y => {
            full_chart = full_chart.horizontal();
            overlay_chart = overlay_chart.horizontal();
            plot.include_x(0.0).y_axis_label(layer.channel.name())
        }
    };

    plot.show(ui, |plot_ui| {
        plot_ui.bar_chart(full_chart);
        plot_ui.bar_chart(overlay_chart);
    });
}
