use std::collections::BTreeSet;

use crate::data::loader::DatasetLoader;
use crate::data::model::{Axis, Channel, Dataset};
use crate::error::{Result, ViewerError};
use crate::session::SessionLog;
use crate::state::DatasetState;
use crate::view::{self, View};

// ---------------------------------------------------------------------------
// Events – every user action that can change what is shown
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerEvent {
    LoadFile(String),
    ChangeChannel(Axis, Channel),
    UpdateSelection(BTreeSet<usize>),
    Record,
}

// ---------------------------------------------------------------------------
// Controller – routes events into DatasetState and back out to the view
// ---------------------------------------------------------------------------

/// Owns the state machine, the loader and the session log. Events are
/// handled one at a time, each running to completion.
pub struct Controller {
    loader: Box<dyn DatasetLoader>,
    state: DatasetState,
    log: SessionLog,
    notice: Option<ViewerError>,
}

impl Controller {
    pub fn new(loader: Box<dyn DatasetLoader>, bin_count: usize) -> Self {
        Self {
            loader,
            state: DatasetState::new(bin_count),
            log: SessionLog::default(),
            notice: None,
        }
    }

    pub fn state(&self) -> &DatasetState {
        &self.state
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    /// Swap the dataset source, e.g. after picking a new import directory.
    /// The loaded dataset stays until the next `LoadFile`.
    pub fn set_loader(&mut self, loader: Box<dyn DatasetLoader>) {
        self.loader = loader;
    }

    pub fn available_files(&self) -> Vec<String> {
        self.loader.list_available()
    }

    /// Repaint the whole view from the current state.
    pub fn refresh(&self, view: &mut dyn View) {
        view::redraw_all(&self.state, view);
    }

    /// Non-fatal condition raised by the last event (an empty dataset).
    pub fn take_notice(&mut self) -> Option<ViewerError> {
        self.notice.take()
    }

    /// Apply one event, then redraw what it changed. On error nothing is
    /// redrawn and the state is unchanged.
    pub fn dispatch(&mut self, event: ViewerEvent, view: &mut dyn View) -> Result<()> {
        self.notice = None;
        let outcome = self.apply(event, view);
        if let Err(e) = &outcome {
            log::error!("{e}");
        }
        outcome
    }

    fn apply(&mut self, event: ViewerEvent, view: &mut dyn View) -> Result<()> {
        match event {
            ViewerEvent::LoadFile(name) => {
                self.state.load_file(self.loader.as_ref(), &name)?;
                if self.state.dataset().is_some_and(Dataset::is_empty) {
                    log::warn!("{name} has no rows");
                    self.notice = Some(ViewerError::EmptyDataset { name });
                }
                view::redraw_all(&self.state, view);
            }
            ViewerEvent::ChangeChannel(axis, channel) => {
                self.state.change_channel(axis, channel)?;
                view::redraw_all(&self.state, view);
            }
            ViewerEvent::UpdateSelection(indices) => {
                self.state.update_selection(indices)?;
                log::debug!("Selection phase {:?}", self.state.phase());
                view::redraw_selection(&self.state, view);
            }
            ViewerEvent::Record => {
                let entry = self.state.snapshot().ok_or(ViewerError::NoDataset)?;
                self.log.record(entry);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::testing::MemoryLoader;
    use crate::state::Phase;
    use crate::view::{DrawCommand, RecordingView};

    fn controller() -> Controller {
        let loader = MemoryLoader::default()
            .with("a.fcs", &[("FSC-H", vec![1.0, 2.0, 3.0, 9.0, 10.0])])
            .with("empty.fcs", &[("FSC-H", vec![])]);
        Controller::new(Box::new(loader), 5)
    }

    #[test]
    fn test_record_scenario() {
        let mut ctl = controller();
        let mut view = RecordingView::default();
        ctl.dispatch(ViewerEvent::LoadFile("a.fcs".into()), &mut view)
            .unwrap();
        ctl.dispatch(
            ViewerEvent::UpdateSelection([0, 1].into_iter().collect()),
            &mut view,
        )
        .unwrap();

        let before = view.commands.len();
        ctl.dispatch(ViewerEvent::Record, &mut view).unwrap();
        ctl.dispatch(ViewerEvent::Record, &mut view).unwrap();

        assert_eq!(view.commands.len(), before);
        assert_eq!(
            ctl.log().render(),
            "FILE N_SEL N_TOTAL\na.fcs 2 5\na.fcs 2 5\n"
        );
    }

    #[test]
    fn test_selection_redraws_only_overlay() {
        let mut ctl = controller();
        let mut view = RecordingView::default();
        ctl.dispatch(ViewerEvent::LoadFile("a.fcs".into()), &mut view)
            .unwrap();
        view.commands.clear();

        ctl.dispatch(
            ViewerEvent::UpdateSelection([3, 4].into_iter().collect()),
            &mut view,
        )
        .unwrap();
        assert_eq!(ctl.state().phase(), Phase::Selected);
        assert!(view.commands.iter().all(|c| matches!(
            c,
            DrawCommand::Overlay { .. } | DrawCommand::Counter(_)
        )));
        assert_eq!(
            view.commands.last(),
            Some(&DrawCommand::Counter("2 / 5".to_string()))
        );
    }

    #[test]
    fn test_channel_change_redraws_everything() {
        let loader = MemoryLoader::default().with(
            "b.fcs",
            &[
                ("FSC-H", vec![1.0, 2.0, 3.0, 4.0]),
                ("SSC-H", vec![10.0, 20.0, 30.0, 40.0]),
            ],
        );
        let mut ctl = Controller::new(Box::new(loader), 2);
        let mut view = RecordingView::default();
        ctl.dispatch(ViewerEvent::LoadFile("b.fcs".into()), &mut view)
            .unwrap();
        ctl.dispatch(
            ViewerEvent::UpdateSelection([0, 1].into_iter().collect()),
            &mut view,
        )
        .unwrap();
        view.commands.clear();

        ctl.dispatch(ViewerEvent::ChangeChannel(Axis::X, Channel::SscH), &mut view)
            .unwrap();
        assert_eq!(ctl.state().phase(), Phase::Loaded);

        let [scatter, x_hist, y_hist, counter] = view.commands.as_slice() else {
            panic!("expected a full redraw, got {:?}", view.commands);
        };
        assert_eq!(
            scatter,
            &DrawCommand::Scatter {
                x_label: Channel::SscH,
                y_label: Channel::SscH,
                points: vec![[10.0, 10.0], [20.0, 20.0], [30.0, 30.0], [40.0, 40.0]],
            }
        );
        for (command, expected_axis) in [(x_hist, Axis::X), (y_hist, Axis::Y)] {
            let DrawCommand::Histogram {
                axis,
                channel,
                full,
                overlay,
                ..
            } = command
            else {
                panic!("expected a histogram, got {command:?}");
            };
            assert_eq!(*axis, expected_axis);
            assert_eq!(*channel, Channel::SscH);
            assert_eq!(full.iter().sum::<u64>(), 4);
            assert!(overlay.iter().all(|&c| c == 0));
        }
        assert_eq!(counter, &DrawCommand::Counter("0 / 4".to_string()));
    }

    #[test]
    fn test_failed_event_draws_nothing() {
        let mut ctl = controller();
        let mut view = RecordingView::default();

        assert!(ctl.dispatch(ViewerEvent::Record, &mut view).is_err());
        assert!(ctl
            .dispatch(ViewerEvent::LoadFile("nope.fcs".into()), &mut view)
            .is_err());
        assert!(ctl
            .dispatch(ViewerEvent::ChangeChannel(Axis::X, Channel::SscH), &mut view)
            .is_err());
        assert!(view.commands.is_empty());
        assert!(ctl.log().is_empty());
    }

    #[test]
    fn test_empty_dataset_is_a_notice() {
        let mut ctl = controller();
        let mut view = RecordingView::default();
        ctl.dispatch(ViewerEvent::LoadFile("empty.fcs".into()), &mut view)
            .unwrap();

        assert!(matches!(
            ctl.take_notice(),
            Some(ViewerError::EmptyDataset { .. })
        ));
        assert!(ctl.take_notice().is_none());
        assert_eq!(ctl.state().phase(), Phase::Loaded);
    }

    #[test]
    fn test_available_files() {
        assert_eq!(controller().available_files(), vec!["a.fcs", "empty.fcs"]);
    }
}
