//! Error types for cytoview.
//!
//! Every failure is local to the action that triggered it: the state stays
//! as it was and the message is shown in the status line.

use thiserror::Error;

use crate::data::model::Channel;

#[derive(Error, Debug)]
pub enum ViewerError {
    /// Dataset file missing or unparseable.
    #[error("Failed to load '{name}': {reason}")]
    Load { name: String, reason: String },

    /// Loaded fine but has no rows. Reported, never fatal.
    #[error("Dataset '{name}' has no rows")]
    EmptyDataset { name: String },

    /// Requested channel is not a column of the loaded dataset.
    #[error("Channel '{channel}' not found in dataset")]
    ChannelNotFound { channel: Channel },

    #[error("No dataset loaded")]
    NoDataset,

    #[error("Selected row {index} is out of range (dataset has {rows} rows)")]
    SelectionOutOfRange { index: usize, rows: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to access file: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ViewerError>;

impl ViewerError {
    /// Wrap a loader failure, keeping the full context chain.
    pub fn load(name: &str, err: &anyhow::Error) -> Self {
        ViewerError::Load {
            name: name.to_string(),
            reason: format!("{err:#}"),
        }
    }

    /// Message for the status line.
    pub fn user_message(&self) -> String {
        match self {
            ViewerError::Load { name, reason } => format!("Could not load {name}: {reason}"),
            ViewerError::EmptyDataset { name } => {
                format!("{name} contains no events; histograms are empty")
            }
            ViewerError::ChannelNotFound { channel } => {
                format!("{channel} is not recorded in this file")
            }
            ViewerError::NoDataset => "Load a file first".to_string(),
            ViewerError::SelectionOutOfRange { index, rows } => {
                format!("Selection index {index} exceeds {rows} rows")
            }
            ViewerError::Config(msg) => format!("Config error: {msg}"),
            ViewerError::Io(e) => format!("File error: {e}"),
            ViewerError::Json(e) => format!("JSON error: {e}"),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ViewerError::Load { .. } => "Load Error",
            ViewerError::EmptyDataset { .. } => "Empty Dataset",
            ViewerError::ChannelNotFound { .. } => "Channel Not Found",
            ViewerError::NoDataset => "No Dataset",
            ViewerError::SelectionOutOfRange { .. } => "Invalid Selection",
            ViewerError::Config(_) => "Configuration Error",
            ViewerError::Io(_) => "File Error",
            ViewerError::Json(_) => "JSON Error",
        }
    }
}
