// ---------------------------------------------------------------------------
// Histogram binning
// ---------------------------------------------------------------------------
//
// Convention: every bin is left-closed / right-open, except the last one which
// is closed on both sides, so the maximum value lands in the final bin. Full
// and selection histograms go through the same `count_against_bins`.
//
// Non-finite values (NaN, ±inf) never contribute to the range or the counts.

/// Bin edges and counts for one channel. `edges.len() == counts.len() + 1`
/// and edges are non-decreasing. Immutable once built, so the edges can be
/// reused for selection overlays until the next full recompute.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBins {
    edges: Vec<f64>,
    counts: Vec<u64>,
}

impl HistogramBins {
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn bin_count(&self) -> usize {
        self.counts.len()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// An all-zero count vector aligned to these edges.
    pub fn zeroed(&self) -> Vec<u64> {
        vec![0; self.counts.len()]
    }
}

/// Partition `[min, max]` of `values` into `bin_count` equal-width bins.
///
/// Degenerate inputs collapse to a single zero-width bin instead of dividing
/// by zero:
/// * no finite values → edges `[0, 0]`, counts `[0]`
/// * constant values  → edges `[v, v]`, counts `[n]`
///
/// A `bin_count` of zero is treated as one.
pub fn compute_bins(values: &[f64], bin_count: usize) -> HistogramBins {
    let bin_count = bin_count.max(1);

    let (min, max) = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    let edges = if min > max {
        vec![0.0, 0.0]
    } else if min == max {
        vec![min, max]
    } else {
        // Interpolate instead of forming `max - min`, which overflows for
        // ranges wider than f64::MAX.
        let n = bin_count as f64;
        let mut edges = Vec::with_capacity(bin_count + 1);
        let mut prev = min;
        for i in 0..bin_count {
            let t = i as f64 / n;
            let edge = (min * (1.0 - t) + max * t).clamp(prev, max);
            edges.push(edge);
            prev = edge;
        }
        // Pin the last edge so rounding never drops the maximum.
        edges.push(max);
        edges
    };

    let counts = count_against_bins(values, &edges);
    HistogramBins { edges, counts }
}

/// Count `values` into pre-existing `edges`.
///
/// Values outside `[edges[0], edges[last]]` and non-finite values are
/// dropped. Fewer than two edges yields no bins.
pub fn count_against_bins(values: &[f64], edges: &[f64]) -> Vec<u64> {
    if edges.len() < 2 {
        return Vec::new();
    }
    let n_bins = edges.len() - 1;
    let first = edges[0];
    let last = edges[n_bins];
    let mut counts = vec![0u64; n_bins];

    for &v in values {
        if !v.is_finite() || v < first || v > last {
            continue;
        }
        // Index of the last edge <= v; the closing edge folds into the last bin.
        let bin = edges.partition_point(|&e| e <= v).saturating_sub(1);
        counts[bin.min(n_bins - 1)] += 1;
    }
    counts
}
