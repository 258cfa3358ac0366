use std::collections::BTreeSet;

use crate::data::binning::{HistogramBins, compute_bins, count_against_bins};
use crate::data::loader::DatasetLoader;
use crate::data::model::{Axis, Channel, ChannelPair, Dataset};
use crate::data::selection::SelectionIndex;
use crate::error::{Result, ViewerError};
use crate::session::SessionEntry;

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No dataset loaded.
    Empty,
    /// Dataset, channels and full histograms valid; overlay zeroed.
    Loaded,
    /// Non-trivial selection present; overlay valid.
    Selected,
}

// ---------------------------------------------------------------------------
// Loaded view of one dataset
// ---------------------------------------------------------------------------

/// Everything derived from one dataset and channel pair. Built whole and
/// swapped in, so a failed transition never leaves half of it behind.
#[derive(Debug, Clone, PartialEq)]
struct Active {
    dataset: Dataset,
    channels: ChannelPair,
    x_bins: HistogramBins,
    y_bins: HistogramBins,
    selection: SelectionIndex,
    x_overlay: Vec<u64>,
    y_overlay: Vec<u64>,
}

impl Active {
    fn new(dataset: Dataset, channels: ChannelPair, bin_count: usize) -> Result<Self> {
        let x_bins = bins_for(&dataset, channels.x, bin_count)?;
        let y_bins = bins_for(&dataset, channels.y, bin_count)?;
        Ok(Self {
            x_overlay: x_bins.zeroed(),
            y_overlay: y_bins.zeroed(),
            dataset,
            channels,
            x_bins,
            y_bins,
            selection: SelectionIndex::default(),
        })
    }

    fn bins(&self, axis: Axis) -> &HistogramBins {
        match axis {
            Axis::X => &self.x_bins,
            Axis::Y => &self.y_bins,
        }
    }

    fn overlay(&self, axis: Axis) -> &[u64] {
        match axis {
            Axis::X => &self.x_overlay,
            Axis::Y => &self.y_overlay,
        }
    }

    fn column(&self, axis: Axis) -> &[f64] {
        // Channels are checked against the dataset before they are stored.
        self.dataset
            .column(self.channels.get(axis).name())
            .unwrap_or(&[])
    }

    fn reset_overlay(&mut self) {
        self.selection.clear();
        self.x_overlay = self.x_bins.zeroed();
        self.y_overlay = self.y_bins.zeroed();
    }

    /// Selection values of one axis binned against that axis' frozen edges.
    fn selection_counts(&self, axis: Axis) -> Vec<u64> {
        let column = self.column(axis);
        let values: Vec<f64> = self.selection.iter().map(|i| column[i]).collect();
        count_against_bins(&values, self.bins(axis).edges())
    }
}

fn bins_for(dataset: &Dataset, channel: Channel, bin_count: usize) -> Result<HistogramBins> {
    let column = dataset
        .column(channel.name())
        .ok_or(ViewerError::ChannelNotFound { channel })?;
    let bins = compute_bins(column, bin_count);
    log::debug!(
        "Binned {channel}: {} of {} values in {} bins",
        bins.total(),
        column.len(),
        bins.bin_count()
    );
    Ok(bins)
}

// ---------------------------------------------------------------------------
// DatasetState
// ---------------------------------------------------------------------------

/// Owner of the loaded dataset, channel pair, histograms and selection.
///
/// Each field is written only by the named transitions below, and every
/// transition either completes or leaves the state exactly as it was.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetState {
    active: Option<Active>,
    bin_count: usize,
}

impl DatasetState {
    pub fn new(bin_count: usize) -> Self {
        Self {
            active: None,
            bin_count: bin_count.max(1),
        }
    }

    // ---- transitions ----

    /// Replace the dataset with `name` from `loader`.
    ///
    /// The current channel pair survives if the new dataset has both
    /// channels, otherwise it falls back to [`ChannelPair::first_valid`].
    pub fn load_file(&mut self, loader: &dyn DatasetLoader, name: &str) -> Result<()> {
        let dataset = loader.load(name)?;

        let channels = match self.active.as_ref().map(|a| a.channels) {
            Some(pair)
                if dataset.has_channel(pair.x.name()) && dataset.has_channel(pair.y.name()) =>
            {
                pair
            }
            _ => ChannelPair::first_valid(&dataset).ok_or_else(|| ViewerError::Load {
                name: name.to_string(),
                reason: "none of the recognized channels are present".to_string(),
            })?,
        };

        log::debug!(
            "{name} recognized channels: {:?}",
            dataset
                .channel_names()
                .filter_map(Channel::from_name)
                .collect::<Vec<_>>()
        );
        let active = Active::new(dataset, channels, self.bin_count)?;
        log::info!(
            "Loaded {name}: {} events, plotting {} vs {}",
            active.dataset.len(),
            channels.x,
            channels.y
        );
        self.active = Some(active);
        Ok(())
    }

    /// Plot `channel` on `axis`. Only that axis is rebinned.
    pub fn change_channel(&mut self, axis: Axis, channel: Channel) -> Result<()> {
        let bin_count = self.bin_count;
        let active = self.active.as_mut().ok_or(ViewerError::NoDataset)?;
        let bins = bins_for(&active.dataset, channel, bin_count)?;

        active.channels = active.channels.with(axis, channel);
        match axis {
            Axis::X => active.x_bins = bins,
            Axis::Y => active.y_bins = bins,
        }
        active.reset_overlay();
        log::info!("Plotting {channel} on the {axis} axis");
        Ok(())
    }

    /// Replace the selection and recompute the overlay against the frozen
    /// edges. Empty or whole-dataset selections zero the overlay instead.
    pub fn update_selection(&mut self, indices: BTreeSet<usize>) -> Result<()> {
        let active = self.active.as_mut().ok_or(ViewerError::NoDataset)?;
        let rows = active.dataset.len();
        if let Some(&index) = indices.iter().next_back().filter(|&&i| i >= rows) {
            return Err(ViewerError::SelectionOutOfRange { index, rows });
        }

        active.selection.replace(indices);
        if active.selection.is_trivial(rows) {
            active.x_overlay = active.x_bins.zeroed();
            active.y_overlay = active.y_bins.zeroed();
        } else {
            active.x_overlay = active.selection_counts(Axis::X);
            active.y_overlay = active.selection_counts(Axis::Y);
        }
        log::debug!("Selection now {} / {rows}", active.selection.len());
        Ok(())
    }

    /// `(file, selected, total)` for the session log. `None` before the first
    /// load.
    pub fn snapshot(&self) -> Option<SessionEntry> {
        self.active.as_ref().map(|a| SessionEntry {
            file_name: a.dataset.name().to_string(),
            selected: a.selection.len(),
            total: a.dataset.len(),
        })
    }

    // ---- accessors ----

    pub fn phase(&self) -> Phase {
        match &self.active {
            None => Phase::Empty,
            Some(a) if a.selection.is_trivial(a.dataset.len()) => Phase::Loaded,
            Some(_) => Phase::Selected,
        }
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.active.as_ref().map(|a| &a.dataset)
    }

    pub fn file_name(&self) -> Option<&str> {
        self.dataset().map(Dataset::name)
    }

    pub fn channels(&self) -> Option<ChannelPair> {
        self.active.as_ref().map(|a| a.channels)
    }

    pub fn bins(&self, axis: Axis) -> Option<&HistogramBins> {
        self.active.as_ref().map(|a| a.bins(axis))
    }

    /// Selection counts aligned to [`Self::bins`] for the same axis.
    pub fn overlay(&self, axis: Axis) -> Option<&[u64]> {
        self.active.as_ref().map(|a| a.overlay(axis))
    }

    /// Values plotted on `axis`, one per row.
    pub fn column(&self, axis: Axis) -> Option<&[f64]> {
        self.active.as_ref().map(|a| a.column(axis))
    }

    pub fn selection(&self) -> Option<&SelectionIndex> {
        self.active.as_ref().map(|a| &a.selection)
    }

    pub fn total_rows(&self) -> usize {
        self.dataset().map_or(0, Dataset::len)
    }

    pub fn selected_count(&self) -> usize {
        self.selection().map_or(0, SelectionIndex::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::testing::MemoryLoader;

    fn loader() -> MemoryLoader {
        MemoryLoader::default()
            .with("a.fcs", &[("FSC-H", vec![1.0, 2.0, 3.0, 9.0, 10.0])])
            .with(
                "b.fcs",
                &[
                    ("FSC-H", vec![5.0, 4.0, 3.0, 2.0]),
                    ("SSC-H", vec![1.0, 1.0, 2.0, 8.0]),
                    ("FL1-H", vec![0.5, 0.25, 0.75, 1.0]),
                ],
            )
            .with("time.fcs", &[("Time", vec![1.0, 2.0])])
            .with("empty.fcs", &[("FSC-H", vec![]), ("SSC-H", vec![])])
    }

    fn loaded(name: &str, bins: usize) -> DatasetState {
        let mut state = DatasetState::new(bins);
        state.load_file(&loader(), name).unwrap();
        state
    }

    fn sel(indices: &[usize]) -> BTreeSet<usize> {
        indices.iter().copied().collect()
    }

    fn overlay_sum(state: &DatasetState, axis: Axis) -> u64 {
        state.overlay(axis).unwrap().iter().sum()
    }

    #[test]
    fn test_starts_empty() {
        let state = DatasetState::new(40);
        assert_eq!(state.phase(), Phase::Empty);
        assert!(state.snapshot().is_none());
        assert_eq!(state.total_rows(), 0);
    }

    #[test]
    fn test_single_channel_scenario() {
        let mut state = loaded("a.fcs", 5);
        assert_eq!(state.phase(), Phase::Loaded);
        assert_eq!(
            state.channels(),
            Some(ChannelPair {
                x: Channel::FscH,
                y: Channel::FscH
            })
        );
        let bins = state.bins(Axis::X).unwrap().clone();
        assert_eq!(bins.bin_count(), 5);
        assert_eq!(bins.total(), 5);

        state.update_selection(sel(&[0, 1])).unwrap();
        assert_eq!(state.phase(), Phase::Selected);
        assert_eq!(overlay_sum(&state, Axis::X), 2);
        assert_eq!(overlay_sum(&state, Axis::Y), 2);
        assert_eq!(state.bins(Axis::X).unwrap(), &bins);

        state.update_selection(sel(&[0, 1, 2, 3, 4])).unwrap();
        assert_eq!(state.phase(), Phase::Loaded);
        assert_eq!(state.overlay(Axis::X).unwrap(), &[0, 0, 0, 0, 0]);
        assert_eq!(state.overlay(Axis::Y).unwrap(), &[0, 0, 0, 0, 0]);
        assert_eq!(state.selected_count(), 5);
    }

    #[test]
    fn test_full_counts_sum_to_rows() {
        let mut state = loaded("b.fcs", 3);
        for axis in [Axis::X, Axis::Y] {
            assert_eq!(state.bins(axis).unwrap().total(), 4);
        }
        state.change_channel(Axis::Y, Channel::Fl1H).unwrap();
        assert_eq!(state.bins(Axis::Y).unwrap().total(), 4);
    }

    #[test]
    fn test_empty_selection_after_selection() {
        let mut state = loaded("b.fcs", 4);
        state.update_selection(sel(&[3])).unwrap();
        assert_eq!(state.phase(), Phase::Selected);

        state.update_selection(BTreeSet::new()).unwrap();
        assert_eq!(state.phase(), Phase::Loaded);
        assert_eq!(overlay_sum(&state, Axis::X), 0);
        assert_eq!(overlay_sum(&state, Axis::Y), 0);
        assert_eq!(state.overlay(Axis::X).unwrap().len(), 4);
    }

    #[test]
    fn test_update_selection_idempotent() {
        let mut state = loaded("b.fcs", 4);
        state.update_selection(sel(&[0, 2])).unwrap();
        let first = state.clone();
        state.update_selection(sel(&[0, 2])).unwrap();
        assert_eq!(state, first);
    }

    #[test]
    fn test_edges_stable_across_selections() {
        let mut state = loaded("b.fcs", 4);
        let x = state.bins(Axis::X).unwrap().clone();
        let y = state.bins(Axis::Y).unwrap().clone();
        for s in [sel(&[0]), sel(&[1, 2]), BTreeSet::new(), sel(&[0, 1, 2, 3]), sel(&[3])] {
            state.update_selection(s).unwrap();
            assert_eq!(state.bins(Axis::X).unwrap(), &x);
            assert_eq!(state.bins(Axis::Y).unwrap(), &y);
        }
    }

    #[test]
    fn test_change_channel_only_rebins_that_axis() {
        let mut state = loaded("b.fcs", 4);
        state.update_selection(sel(&[1])).unwrap();
        let y = state.bins(Axis::Y).unwrap().clone();

        state.change_channel(Axis::X, Channel::Fl1H).unwrap();
        assert_eq!(state.channels().unwrap().x, Channel::Fl1H);
        assert_eq!(state.bins(Axis::X).unwrap().edges()[0], 0.25);
        assert_eq!(state.bins(Axis::Y).unwrap(), &y);
        assert_eq!(state.phase(), Phase::Loaded);
        assert_eq!(state.selected_count(), 0);
        assert_eq!(overlay_sum(&state, Axis::X), 0);
        assert_eq!(overlay_sum(&state, Axis::Y), 0);
    }

    #[test]
    fn test_change_to_missing_channel_rejected() {
        let mut state = loaded("b.fcs", 4);
        state.update_selection(sel(&[1])).unwrap();
        let before = state.clone();

        let err = state.change_channel(Axis::Y, Channel::Fl3H).unwrap_err();
        assert!(matches!(
            err,
            ViewerError::ChannelNotFound {
                channel: Channel::Fl3H
            }
        ));
        assert_eq!(state, before);
    }

    #[test]
    fn test_failed_load_rolls_back() {
        let mut state = loaded("b.fcs", 4);
        state.update_selection(sel(&[0, 1])).unwrap();
        let before = state.clone();

        assert!(matches!(
            state.load_file(&loader(), "missing.fcs"),
            Err(ViewerError::Load { .. })
        ));
        assert_eq!(state, before);

        assert!(matches!(
            state.load_file(&loader(), "time.fcs"),
            Err(ViewerError::Load { .. })
        ));
        assert_eq!(state, before);
    }

    #[test]
    fn test_load_keeps_pair_when_present() {
        let mut state = loaded("b.fcs", 4);
        state.change_channel(Axis::X, Channel::Fl1H).unwrap();
        state.change_channel(Axis::Y, Channel::FscH).unwrap();
        state.update_selection(sel(&[2])).unwrap();

        state.load_file(&loader(), "b.fcs").unwrap();
        assert_eq!(
            state.channels(),
            Some(ChannelPair {
                x: Channel::Fl1H,
                y: Channel::FscH
            })
        );
        assert_eq!(state.phase(), Phase::Loaded);

        state.load_file(&loader(), "a.fcs").unwrap();
        assert_eq!(
            state.channels(),
            Some(ChannelPair {
                x: Channel::FscH,
                y: Channel::FscH
            })
        );
    }

    #[test]
    fn test_empty_dataset_degenerates() {
        let mut state = loaded("empty.fcs", 40);
        assert_eq!(state.total_rows(), 0);
        assert_eq!(state.bins(Axis::X).unwrap().edges(), &[0.0, 0.0]);
        assert_eq!(state.overlay(Axis::X).unwrap(), &[0]);
        state.update_selection(BTreeSet::new()).unwrap();
        assert_eq!(state.phase(), Phase::Loaded);
    }

    #[test]
    fn test_out_of_range_selection_rejected() {
        let mut state = loaded("a.fcs", 5);
        state.update_selection(sel(&[1])).unwrap();
        let before = state.clone();

        let err = state.update_selection(sel(&[0, 5])).unwrap_err();
        assert!(matches!(
            err,
            ViewerError::SelectionOutOfRange { index: 5, rows: 5 }
        ));
        assert_eq!(state, before);
    }

    #[test]
    fn test_transitions_need_a_dataset() {
        let mut state = DatasetState::new(40);
        assert!(matches!(
            state.change_channel(Axis::X, Channel::SscH),
            Err(ViewerError::NoDataset)
        ));
        assert!(matches!(
            state.update_selection(sel(&[0])),
            Err(ViewerError::NoDataset)
        ));
        assert_eq!(state.phase(), Phase::Empty);
    }

    #[test]
    fn test_snapshot_is_side_effect_free() {
        let mut state = loaded("a.fcs", 5);
        state.update_selection(sel(&[0, 1])).unwrap();
        let before = state.clone();
        let entry = state.snapshot().unwrap();
        assert_eq!(state.snapshot().unwrap(), entry);
        assert_eq!(entry.file_name, "a.fcs");
        assert_eq!((entry.selected, entry.total), (2, 5));
        assert_eq!(state, before);
    }
}
