use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ViewerError};

/// Config file looked up in the working directory.
pub const CONFIG_FILE: &str = "cytoview.json";

const ENV_IMPORT_DIR: &str = "CYTOVIEW_IMPORT_DIR";
const ENV_BINS: &str = "CYTOVIEW_BINS";

/// Viewer settings. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Directory scanned for measurement files.
    pub import_dir: PathBuf,
    /// Histogram bins per axis.
    pub bin_count: usize,
    /// Scatter marker radius in points.
    pub point_radius: f32,
    pub window_size: [f32; 2],
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            import_dir: PathBuf::from("import"),
            bin_count: 40,
            point_radius: 1.5,
            window_size: [1100.0, 820.0],
        }
    }
}

impl ViewerConfig {
    /// Defaults, then `cytoview.json` if present, then environment overrides.
    pub fn load() -> Result<Self> {
        let path = Path::new(CONFIG_FILE);
        let mut config = if path.exists() {
            log::info!("Reading {}", path.display());
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(dir) = var(ENV_IMPORT_DIR) {
            self.import_dir = PathBuf::from(dir);
        }
        if let Some(bins) = var(ENV_BINS) {
            self.bin_count = bins
                .trim()
                .parse()
                .map_err(|_| ViewerError::Config(format!("{ENV_BINS}={bins} is not a count")))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.bin_count == 0 {
            return Err(ViewerError::Config("bin_count must be at least 1".to_string()));
        }
        if !(self.point_radius > 0.0) {
            return Err(ViewerError::Config("point_radius must be positive".to_string()));
        }
        Ok(())
    }
}
