/// Data layer: core types, loading, binning and selection.
///
/// Architecture:
/// ```text
///  import/*.csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  named f64 columns of equal length
///   └──────────┘
///        │
///        ├──────────────► binning    channel column → HistogramBins
///        │
///        └──────────────► selection  brushed row indices
/// ```

pub mod binning;
pub mod loader;
pub mod model;
pub mod selection;
