use crate::data::model::{Axis, Channel};
use crate::state::DatasetState;

// ---------------------------------------------------------------------------
// Draw commands
// ---------------------------------------------------------------------------

/// What the view layer is told to paint.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Nothing loaded: blank every panel.
    Clear,
    /// Every row as an `[x, y]` point, one static style.
    Scatter {
        x_label: Channel,
        y_label: Channel,
        points: Vec<[f64; 2]>,
    },
    /// A marginal histogram: outline for the full population, filled overlay
    /// for the selection (all zero when the selection is trivial).
    Histogram {
        axis: Axis,
        channel: Channel,
        edges: Vec<f64>,
        full: Vec<u64>,
        overlay: Vec<u64>,
    },
    /// New selection overlay for an already drawn histogram.
    Overlay { axis: Axis, counts: Vec<u64> },
    /// `"{selected} / {total}"`.
    Counter(String),
}

/// Sink for draw commands.
pub trait View {
    fn submit(&mut self, command: DrawCommand);
}

// ---------------------------------------------------------------------------
// ViewBinding – DatasetState → draw commands
// ---------------------------------------------------------------------------

pub fn counter_text(state: &DatasetState) -> String {
    format!("{} / {}", state.selected_count(), state.total_rows())
}

/// Repaint everything: scatter, both histograms, counter.
pub fn redraw_all(state: &DatasetState, view: &mut dyn View) {
    let (Some(channels), Some(xs), Some(ys)) = (
        state.channels(),
        state.column(Axis::X),
        state.column(Axis::Y),
    ) else {
        view.submit(DrawCommand::Clear);
        view.submit(DrawCommand::Counter(counter_text(state)));
        return;
    };

    view.submit(DrawCommand::Scatter {
        x_label: channels.x,
        y_label: channels.y,
        points: xs.iter().zip(ys).map(|(&x, &y)| [x, y]).collect(),
    });

    for axis in [Axis::X, Axis::Y] {
        if let (Some(bins), Some(overlay)) = (state.bins(axis), state.overlay(axis)) {
            view.submit(DrawCommand::Histogram {
                axis,
                channel: channels.get(axis),
                edges: bins.edges().to_vec(),
                full: bins.counts().to_vec(),
                overlay: overlay.to_vec(),
            });
        }
    }

    view.submit(DrawCommand::Counter(counter_text(state)));
}

/// Repaint only what a selection change touches: overlays and counter.
pub fn redraw_selection(state: &DatasetState, view: &mut dyn View) {
    for axis in [Axis::X, Axis::Y] {
        if let Some(overlay) = state.overlay(axis) {
            view.submit(DrawCommand::Overlay {
                axis,
                counts: overlay.to_vec(),
            });
        }
    }
    view.submit(DrawCommand::Counter(counter_text(state)));
}

/// Records every command, for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingView {
    pub commands: Vec<DrawCommand>,
}

#[cfg(test)]
impl View for RecordingView {
    fn submit(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }
}
