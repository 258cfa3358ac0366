use crate::data::model::{Axis, Channel};
use crate::view::{DrawCommand, View};

// ---------------------------------------------------------------------------
// PlotCanvas – the retained draw state the egui panels paint every frame
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterLayer {
    pub x_label: Channel,
    pub y_label: Channel,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramLayer {
    pub channel: Channel,
    pub edges: Vec<f64>,
    pub full: Vec<u64>,
    pub overlay: Vec<u64>,
}

impl HistogramLayer {
    /// `(center, width)` of every bin. Zero-width bins get a unit width so
    /// they stay visible.
    pub fn bin_geometry(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.edges.windows(2).map(|w| {
            let width = w[1] - w[0];
            let width = if width > 0.0 { width } else { 1.0 };
            ((w[0] + w[1]) / 2.0, width)
        })
    }
}

/// Latest draw commands, kept until replaced.
#[derive(Debug, Clone, Default)]
pub struct PlotCanvas {
    pub scatter: Option<ScatterLayer>,
    pub x_hist: Option<HistogramLayer>,
    pub y_hist: Option<HistogramLayer>,
    pub counter: String,
}

impl PlotCanvas {
    pub fn histogram(&self, axis: Axis) -> Option<&HistogramLayer> {
        match axis {
            Axis::X => self.x_hist.as_ref(),
            Axis::Y => self.y_hist.as_ref(),
        }
    }

    fn histogram_slot(&mut self, axis: Axis) -> &mut Option<HistogramLayer> {
        match axis {
            Axis::X => &mut self.x_hist,
            Axis::Y => &mut self.y_hist,
        }
    }
}

impl View for PlotCanvas {
    fn submit(&mut self, command: DrawCommand) {
        match command {
            DrawCommand::Clear => {
                self.scatter = None;
                self.x_hist = None;
                self.y_hist = None;
            }
            DrawCommand::Scatter {
                x_label,
                y_label,
                points,
            } => {
                self.scatter = Some(ScatterLayer {
                    x_label,
                    y_label,
                    points,
                });
            }
            DrawCommand::Histogram {
                axis,
                channel,
                edges,
                full,
                overlay,
            } => {
                *self.histogram_slot(axis) = Some(HistogramLayer {
                    channel,
                    edges,
                    full,
                    overlay,
                });
            }
            DrawCommand::Overlay { axis, counts } => match self.histogram_slot(axis) {
                Some(layer) if layer.full.len() == counts.len() => layer.overlay = counts,
                Some(layer) => log::warn!(
                    "Ignoring {axis} overlay of {} bins for a {}-bin histogram",
                    counts.len(),
                    layer.full.len()
                ),
                None => log::warn!("Ignoring {axis} overlay with no histogram drawn"),
            },
            DrawCommand::Counter(text) => self.counter = text,
        }
    }
}
