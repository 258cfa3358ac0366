use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::Dataset;
use crate::error::ViewerError;

// ---------------------------------------------------------------------------
// DatasetLoader – where datasets come from
// ---------------------------------------------------------------------------

/// Source of loadable datasets, addressed by name.
pub trait DatasetLoader {
    /// Parse the named dataset.
    fn load(&self, name: &str) -> Result<Dataset, ViewerError>;

    /// Every name the source knows about, parseable or not.
    fn candidates(&self) -> Vec<String>;

    /// Whether `name` parses as a dataset.
    fn is_parseable(&self, name: &str) -> bool {
        self.load(name).is_ok()
    }

    /// Names that parse, in source order. Failures are left out, not raised.
    fn list_available(&self) -> Vec<String> {
        self.candidates()
            .into_iter()
            .filter(|name| {
                let ok = self.is_parseable(name);
                if !ok {
                    log::warn!("Skipping unparseable file {name}");
                }
                ok
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// DirectoryLoader – flat numeric tables in one directory
// ---------------------------------------------------------------------------

/// Loads measurement tables from a single directory. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row of channel names, one event per row
/// * `.json`    – `[{ "FSC-H": 1.0, ... }, ...]` or `{ "FSC-H": [...], ... }`
/// * `.parquet` – one flat numeric column per channel
///
/// Non-numeric columns are skipped.
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    dir: PathBuf,
}

impl DirectoryLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DatasetLoader for DirectoryLoader {
    fn load(&self, name: &str) -> Result<Dataset, ViewerError> {
        load_file(&self.dir.join(name), name).map_err(|e| ViewerError::load(name, &e))
    }

    fn candidates(&self) -> Vec<String> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Cannot read import directory {}: {e}", self.dir.display());
                return Vec::new();
            }
        };
        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        names.sort();
        names
    }

    fn is_parseable(&self, name: &str) -> bool {
        supported_extension(Path::new(name)) && self.load(name).is_ok()
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

fn supported_extension(path: &Path) -> bool {
    matches!(extension(path).as_str(), "csv" | "json" | "parquet" | "pq")
}

/// Load a dataset from a file, naming it `name`.
pub fn load_file(path: &Path, name: &str) -> Result<Dataset> {
    let columns = match extension(path).as_str() {
        "parquet" | "pq" => load_parquet(path)?,
        "json" => load_json(path)?,
        "csv" => load_csv(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };
    if columns.is_empty() {
        bail!("no numeric channels found");
    }
    Dataset::from_columns(name, columns).map_err(anyhow::Error::msg)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with channel names, one numeric row per event.
/// Empty cells become NaN. A column with any non-numeric cell is skipped.
fn load_csv(path: &Path) -> Result<BTreeMap<String, Vec<f64>>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut columns: Vec<Option<Vec<f64>>> = vec![Some(Vec::new()); headers.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() != headers.len() {
            bail!(
                "CSV row {row_no}: {} fields but {} headers",
                record.len(),
                headers.len()
            );
        }
        for (col, cell) in columns.iter_mut().zip(record.iter()) {
            let Some(values) = col else { continue };
            let cell = cell.trim();
            if cell.is_empty() {
                values.push(f64::NAN);
            } else if let Ok(v) = cell.parse::<f64>() {
                values.push(v);
            } else {
                *col = None;
            }
        }
    }

    Ok(headers
        .into_iter()
        .zip(columns)
        .filter_map(|(name, values)| values.map(|v| (name, v)))
        .collect())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Two accepted shapes, matching pandas' `orient='records'` and
/// `orient='list'`:
///
/// ```json
/// [ { "FSC-H": 512.0, "SSC-H": 130.0 }, ... ]
/// { "FSC-H": [512.0, ...], "SSC-H": [130.0, ...] }
/// ```
fn load_json(path: &Path) -> Result<BTreeMap<String, Vec<f64>>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    match root {
        JsonValue::Array(records) => json_records(&records),
        JsonValue::Object(obj) => Ok(obj
            .iter()
            .filter_map(|(key, val)| {
                let arr = val.as_array()?;
                let values: Option<Vec<f64>> = arr.iter().map(json_number).collect();
                values.map(|v| (key.clone(), v))
            })
            .collect()),
        _ => bail!("Expected top-level JSON array or object"),
    }
}

fn json_records(records: &[JsonValue]) -> Result<BTreeMap<String, Vec<f64>>> {
    let Some(first) = records.first() else {
        return Ok(BTreeMap::new());
    };
    let first = first.as_object().context("Row 0 is not a JSON object")?;

    let mut columns: BTreeMap<String, Option<Vec<f64>>> = first
        .keys()
        .map(|k| (k.clone(), Some(Vec::with_capacity(records.len()))))
        .collect();

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        if obj.len() != columns.len() || obj.keys().any(|k| !columns.contains_key(k)) {
            bail!("Row {i}: channel set differs from row 0");
        }
        for (key, slot) in columns.iter_mut() {
            let Some(values) = slot else { continue };
            match obj.get(key).and_then(json_number) {
                Some(v) => values.push(v),
                None => *slot = None,
            }
        }
    }

    Ok(columns
        .into_iter()
        .filter_map(|(name, values)| values.map(|v| (name, v)))
        .collect())
}

fn json_number(val: &JsonValue) -> Option<f64> {
    match val {
        JsonValue::Null => Some(f64::NAN),
        other => other.as_f64(),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat numeric column per channel
/// (Float64, Float32, Int64 or Int32). Nulls become NaN; other column types
/// are skipped. Works with files written by pandas and polars.
fn load_parquet(path: &Path) -> Result<BTreeMap<String, Vec<f64>>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut columns: BTreeMap<String, Vec<f64>> = BTreeMap::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        for (idx, field) in schema.fields().iter().enumerate() {
            let Some(values) = extract_f64_column(batch.column(idx))? else {
                continue;
            };
            columns
                .entry(field.name().clone())
                .or_default()
                .extend(values);
        }
    }

    Ok(columns)
}

// -- Arrow helpers --

/// Convert a numeric Arrow column to `f64`. `None` for non-numeric columns.
fn extract_f64_column(col: &Arc<dyn Array>) -> Result<Option<Vec<f64>>> {
    let values = match col.data_type() {
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .context("expected Float64Array")?
            .iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect(),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .context("expected Float32Array")?
            .iter()
            .map(|v| v.map_or(f64::NAN, f64::from))
            .collect(),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .context("expected Int64Array")?
            .iter()
            .map(|v| v.map_or(f64::NAN, |i| i as f64))
            .collect(),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .context("expected Int32Array")?
            .iter()
            .map(|v| v.map_or(f64::NAN, f64::from))
            .collect(),
        other => {
            log::debug!("Skipping non-numeric parquet column of type {other:?}");
            return Ok(None);
        }
    };
    Ok(Some(values))
}

// ---------------------------------------------------------------------------
// In-memory loader for tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub mod testing {
    use std::collections::BTreeMap;

    use super::DatasetLoader;
    use crate::data::model::Dataset;
    use crate::error::ViewerError;

    /// Serves pre-built datasets; any other name fails to load.
    #[derive(Default)]
    pub struct MemoryLoader {
        datasets: BTreeMap<String, Dataset>,
    }

    impl MemoryLoader {
        pub fn with(mut self, name: &str, columns: &[(&str, Vec<f64>)]) -> Self {
            let dataset = Dataset::from_columns(
                name,
                columns.iter().map(|(c, v)| (c.to_string(), v.clone())),
            )
            .unwrap();
            self.datasets.insert(name.to_string(), dataset);
            self
        }
    }

    impl DatasetLoader for MemoryLoader {
        fn load(&self, name: &str) -> Result<Dataset, ViewerError> {
            self.datasets.get(name).cloned().ok_or_else(|| ViewerError::Load {
                name: name.to_string(),
                reason: "no such dataset".to_string(),
            })
        }

        fn candidates(&self) -> Vec<String> {
            self.datasets.keys().cloned().collect()
        }
    }
}
