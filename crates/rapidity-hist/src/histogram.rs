use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{BinEdges, BinIndex, Geometry, HistogramError, summary::HistogramSummary};

const MAX_BAR_WIDTH: f64 = 50.0;

/// A fixed-width one-dimensional histogram with underflow and overflow buckets.
///
/// Values are accumulated with [`fill`](Self::fill) or
/// [`fill_weighted`](Self::fill_weighted). Every finite fill lands in exactly
/// one of the bins, the underflow bucket, or the overflow bucket, so
///
/// `counts().iter().sum() + underflow() + overflow() == sum_weights()`
///
/// holds after any sequence of fills (with unit weights `sum_weights()` equals
/// `entries()`). Out-of-range fills are tallied and still contribute to the
/// mean and variance; they are only excluded from the binned shape.
///
/// # Examples
///
/// ```
/// use rapidity_hist::Histogram;
///
/// let mut hist = Histogram::new("dn/dy", 10, 0.0, 10.0).unwrap();
/// for value in [0.5, 5.0, 5.5, 12.0] {
///     hist.fill(value);
/// }
/// assert_eq!(hist.count(5), 2.0);
/// assert_eq!(hist.overflow(), 1.0);
/// assert_eq!(hist.entries(), 4);
/// assert_eq!(hist.mean().unwrap(), 5.75);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "HistogramRecord")]
pub struct Histogram {
    title: String,
    geometry: Geometry,
    counts: Vec<f64>,
    underflow: f64,
    overflow: f64,
    entries: u64,
    sum_weights: f64,
    sum_values: f64,
    sum_squares: f64,
    non_finite: u64,
}

#[derive(Deserialize)]
struct HistogramRecord {
    title: String,
    geometry: Geometry,
    counts: Vec<f64>,
    underflow: f64,
    overflow: f64,
    entries: u64,
    sum_weights: f64,
    sum_values: f64,
    sum_squares: f64,
    #[serde(default)]
    non_finite: u64,
}

impl TryFrom<HistogramRecord> for Histogram {
    type Error = HistogramError;

    fn try_from(record: HistogramRecord) -> Result<Self, Self::Error> {
        if record.counts.len() != record.geometry.bin_count() {
            return Err(HistogramError::CountsLength {
                expected: record.geometry.bin_count(),
                actual: record.counts.len(),
            });
        }
        Ok(Self {
            title: record.title,
            geometry: record.geometry,
            counts: record.counts,
            underflow: record.underflow,
            overflow: record.overflow,
            entries: record.entries,
            sum_weights: record.sum_weights,
            sum_values: record.sum_values,
            sum_squares: record.sum_squares,
            non_finite: record.non_finite,
        })
    }
}

impl Histogram {
    /// Creates an empty histogram of `bin_count` bins over `[low, high)`.
    ///
    /// # Errors
    ///
    /// Returns [`HistogramError::InvalidGeometry`] if `bin_count` is zero,
    /// either edge is not finite, or `low >= high`.
    pub fn new(
        title: impl Into<String>,
        bin_count: usize,
        low: f64,
        high: f64,
    ) -> Result<Self, HistogramError> {
        Ok(Self::with_geometry(title, Geometry::new(bin_count, low, high)?))
    }

    /// Creates an empty histogram from an already validated geometry.
    #[must_use]
    pub fn with_geometry(title: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            title: title.into(),
            geometry,
            counts: vec![0.0; geometry.bin_count()],
            underflow: 0.0,
            overflow: 0.0,
            entries: 0,
            sum_weights: 0.0,
            sum_values: 0.0,
            sum_squares: 0.0,
            non_finite: 0,
        }
    }

    /// Adds `value` with unit weight.
    pub fn fill(&mut self, value: f64) {
        self.fill_weighted(value, 1.0);
    }

    /// Adds `value` with the given weight.
    ///
    /// A non-finite value or weight is not binned and does not count as an
    /// entry; it is only tallied in [`non_finite`](Self::non_finite).
    pub fn fill_weighted(&mut self, value: f64, weight: f64) {
        if !value.is_finite() || !weight.is_finite() {
            self.non_finite += 1;
            return;
        }
        match self.geometry.bin_index(value) {
            BinIndex::Underflow => self.underflow += weight,
            BinIndex::Bin(index) => self.counts[index] += weight,
            BinIndex::Overflow => self.overflow += weight,
        }
        self.entries += 1;
        self.sum_weights += weight;
        self.sum_values += weight * value;
        self.sum_squares += weight * value * value;
    }

    /// Adds the contents of `other` into this histogram.
    ///
    /// Lets a single configuration be filled in independent shards that are
    /// combined afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`HistogramError::GeometryMismatch`] if the binnings differ;
    /// `self` is left untouched in that case.
    pub fn merge(&mut self, other: &Histogram) -> Result<(), HistogramError> {
        if self.geometry != other.geometry {
            return Err(HistogramError::GeometryMismatch {
                expected: self.geometry,
                actual: other.geometry,
            });
        }
        for (count, other_count) in self.counts.iter_mut().zip(&other.counts) {
            *count += other_count;
        }
        self.underflow += other.underflow;
        self.overflow += other.overflow;
        self.entries += other.entries;
        self.sum_weights += other.sum_weights;
        self.sum_values += other.sum_values;
        self.sum_squares += other.sum_squares;
        self.non_finite += other.non_finite;
        Ok(())
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    #[must_use]
    pub fn bin_count(&self) -> usize {
        self.geometry.bin_count()
    }

    #[must_use]
    pub fn low(&self) -> f64 {
        self.geometry.low()
    }

    #[must_use]
    pub fn high(&self) -> f64 {
        self.geometry.high()
    }

    #[must_use]
    pub fn bin_width(&self) -> f64 {
        self.geometry.bin_width()
    }

    /// Per-bin contents, in bin order.
    #[must_use]
    pub fn counts(&self) -> &[f64] {
        &self.counts
    }

    /// Content of the bin with the given index.
    ///
    /// # Panics
    ///
    /// Panics if `index >= bin_count()`.
    #[must_use]
    pub fn count(&self, index: usize) -> f64 {
        self.counts[index]
    }

    #[must_use]
    pub fn bin_center(&self, index: usize) -> f64 {
        self.geometry.bin_center(index)
    }

    #[must_use]
    pub fn bin_index(&self, value: f64) -> BinIndex {
        self.geometry.bin_index(value)
    }

    /// Lazily yields the `bin_count() + 1` bin edges.
    #[must_use]
    pub fn bin_edges(&self) -> BinEdges {
        self.geometry.edges()
    }

    #[must_use]
    pub fn underflow(&self) -> f64 {
        self.underflow
    }

    #[must_use]
    pub fn overflow(&self) -> f64 {
        self.overflow
    }

    /// Number of accepted fill calls, in range or not.
    #[must_use]
    pub fn entries(&self) -> u64 {
        self.entries
    }

    #[must_use]
    pub fn sum_weights(&self) -> f64 {
        self.sum_weights
    }

    /// Number of fills rejected because the value or weight was not finite.
    #[must_use]
    pub fn non_finite(&self) -> u64 {
        self.non_finite
    }

    /// Total weight inside `[low, high)`.
    #[must_use]
    pub fn in_range_sum(&self) -> f64 {
        self.counts.iter().sum()
    }

    /// Largest bin content, or zero for a histogram without in-range fills.
    #[must_use]
    pub fn max_count(&self) -> f64 {
        self.counts.iter().copied().fold(0.0, f64::max)
    }

    /// Weighted mean of every accepted fill, including under/overflow.
    ///
    /// # Errors
    ///
    /// Returns [`HistogramError::Empty`] if nothing has been filled.
    pub fn mean(&self) -> Result<f64, HistogramError> {
        if self.entries == 0 || self.sum_weights == 0.0 {
            return Err(HistogramError::Empty);
        }
        Ok(self.sum_values / self.sum_weights)
    }

    /// Weighted population variance of every accepted fill.
    ///
    /// # Errors
    ///
    /// Returns [`HistogramError::Empty`] if nothing has been filled.
    pub fn variance(&self) -> Result<f64, HistogramError> {
        let mean = self.mean()?;
        let variance = self.sum_squares / self.sum_weights - mean * mean;
        // Cancellation can push the difference slightly below zero; an
        // overflowed NaN is passed through.
        Ok(if variance < 0.0 { 0.0 } else { variance })
    }

    /// Square root of [`variance`](Self::variance).
    ///
    /// # Errors
    ///
    /// Returns [`HistogramError::Empty`] if nothing has been filled.
    pub fn std_dev(&self) -> Result<f64, HistogramError> {
        self.variance().map(f64::sqrt)
    }

    /// Collects the headline statistics into a serializable record.
    #[must_use]
    pub fn summary(&self) -> HistogramSummary {
        HistogramSummary {
            title: self.title.clone(),
            geometry: self.geometry,
            entries: self.entries,
            sum_weights: self.sum_weights,
            in_range: self.in_range_sum(),
            underflow: self.underflow,
            overflow: self.overflow,
            non_finite: self.non_finite,
            mean: self.mean().ok(),
            variance: self.variance().ok(),
            std_dev: self.std_dev().ok(),
        }
    }
}

/// Text rendering: one row per bin with a proportional bar, then statistics.
impl fmt::Display for Histogram {
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        let max_count = self.max_count();
        for (index, count) in self.counts.iter().enumerate() {
            let bar_width = if max_count > 0.0 {
                (count.max(0.0) / max_count * MAX_BAR_WIDTH).round() as usize
            } else {
                0
            };
            writeln!(
                f,
                "  [{:>9.3}, {:>9.3}) | {:>10} {}",
                self.geometry.edge(index),
                self.geometry.edge(index + 1),
                count,
                "#".repeat(bar_width),
            )?;
        }
        writeln!(
            f,
            "  entries = {}, underflow = {}, overflow = {}, in range = {}",
            self.entries,
            self.underflow,
            self.overflow,
            self.in_range_sum(),
        )?;
        match (self.mean(), self.std_dev()) {
            (Ok(mean), Ok(std_dev)) => {
                write!(f, "  mean = {mean:.5}, std dev = {std_dev:.5}")
            }
            _ => write!(f, "  mean = n/a, std dev = n/a"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_conserved(hist: &Histogram) {
        let total = hist.in_range_sum() + hist.underflow() + hist.overflow();
        assert!(
            (total - hist.sum_weights()).abs() < 1e-9,
            "{total} != {}",
            hist.sum_weights()
        );
    }

    #[test]
    fn test_new_starts_empty() {
        let hist = Histogram::new("h", 5, -1.0, 1.0).unwrap();
        assert_eq!(hist.counts(), &[0.0; 5]);
        assert_eq!(hist.underflow(), 0.0);
        assert_eq!(hist.overflow(), 0.0);
        assert_eq!(hist.entries(), 0);
        assert_eq!(hist.sum_weights(), 0.0);
    }

    #[test]
    fn test_new_rejects_invalid_geometry() {
        assert!(matches!(
            Histogram::new("h", 0, 0.0, 1.0),
            Err(HistogramError::InvalidGeometry { bin_count: 0, .. })
        ));
        assert!(matches!(
            Histogram::new("h", 10, 2.0, 1.0),
            Err(HistogramError::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn test_bin_placement() {
        let mut hist = Histogram::new("h", 10, 0.0, 10.0).unwrap();
        hist.fill(5.0);
        assert_eq!(hist.count(5), 1.0);
        hist.fill(9.999);
        assert_eq!(hist.count(9), 1.0);
        hist.fill(10.0);
        assert_eq!(hist.overflow(), 1.0);
        hist.fill(-0.001);
        assert_eq!(hist.underflow(), 1.0);
        assert_eq!(hist.entries(), 4);
        assert_eq!(hist.in_range_sum(), 2.0);
    }

    #[test]
    fn test_count_conservation_unit_weights() {
        let mut hist = Histogram::new("h", 7, -2.0, 3.0).unwrap();
        let n = 1000;
        for i in 0..n {
            hist.fill(f64::from(i) * 0.013 - 4.0);
        }
        assert_eq!(hist.entries(), 1000);
        assert_eq!(
            hist.in_range_sum() + hist.underflow() + hist.overflow(),
            1000.0
        );
        assert!(hist.underflow() > 0.0);
        assert!(hist.overflow() > 0.0);
    }

    #[test]
    fn test_count_conservation_weighted() {
        let mut hist = Histogram::new("h", 4, 0.0, 4.0).unwrap();
        let fills = [(0.5, 2.0), (1.5, 0.25), (-3.0, 1.5), (8.0, 0.75), (3.9, 4.0)];
        for (value, weight) in fills {
            hist.fill_weighted(value, weight);
        }
        let total_weight = fills.iter().map(|(_, w)| w).sum::<f64>();
        assert_eq!(hist.sum_weights(), total_weight);
        assert_eq!(hist.entries(), 5);
        assert_eq!(hist.underflow(), 1.5);
        assert_eq!(hist.overflow(), 0.75);
        assert_conserved(&hist);
    }

    #[test]
    fn test_out_of_range_values_contribute_to_statistics() {
        let mut hist = Histogram::new("h", 2, 0.0, 1.0).unwrap();
        hist.fill(-1.0);
        hist.fill(3.0);
        assert_eq!(hist.in_range_sum(), 0.0);
        assert_eq!(hist.mean().unwrap(), 1.0);
        assert_eq!(hist.variance().unwrap(), 4.0);
        assert_eq!(hist.std_dev().unwrap(), 2.0);
    }

    #[test]
    fn test_empty_statistics_fail() {
        let hist = Histogram::new("h", 2, 0.0, 1.0).unwrap();
        assert_eq!(hist.mean(), Err(HistogramError::Empty));
        assert_eq!(hist.variance(), Err(HistogramError::Empty));
        assert!(hist.summary().mean.is_none());
    }

    #[test]
    fn test_zero_total_weight_counts_as_empty() {
        let mut hist = Histogram::new("h", 2, 0.0, 1.0).unwrap();
        hist.fill_weighted(0.5, 0.0);
        assert_eq!(hist.entries(), 1);
        assert_eq!(hist.mean(), Err(HistogramError::Empty));
    }

    #[test]
    fn test_variance_never_negative() {
        let mut hist = Histogram::new("h", 10, 1.0e8, 1.0e8 + 10.0).unwrap();
        for _ in 0..1000 {
            hist.fill(1.0e8 + 0.1);
        }
        let variance = hist.variance().unwrap();
        assert!(variance >= 0.0);
        assert!(variance.is_finite());
    }

    #[test]
    fn test_variance_reports_overflowed_moments() {
        let mut hist = Histogram::new("h", 10, -1.0, 1.0).unwrap();
        for value in [1.0e300, 1.0e300, 3.0e300] {
            hist.fill(value);
        }
        assert!(hist.mean().unwrap().is_finite());
        assert!(hist.variance().unwrap().is_nan());
        assert!(hist.std_dev().unwrap().is_nan());
    }

    #[test]
    fn test_non_finite_fills_are_set_aside() {
        let mut hist = Histogram::new("h", 2, 0.0, 1.0).unwrap();
        hist.fill(f64::NAN);
        hist.fill(f64::INFINITY);
        hist.fill_weighted(0.5, f64::NAN);
        hist.fill(0.25);
        assert_eq!(hist.non_finite(), 3);
        assert_eq!(hist.entries(), 1);
        assert_eq!(hist.mean().unwrap(), 0.25);
        assert_conserved(&hist);
    }

    #[test]
    fn test_merge_adds_everything() {
        let mut a = Histogram::new("a", 4, 0.0, 4.0).unwrap();
        let mut b = Histogram::new("b", 4, 0.0, 4.0).unwrap();
        let mut all = Histogram::new("all", 4, 0.0, 4.0).unwrap();
        for value in [0.5, 1.5, -1.0, 9.0] {
            a.fill(value);
            all.fill(value);
        }
        for value in [2.5, 3.5, 3.6] {
            b.fill(value);
            all.fill(value);
        }
        a.merge(&b).unwrap();
        assert_eq!(a.counts(), all.counts());
        assert_eq!(a.entries(), 7);
        assert!((a.mean().unwrap() - all.mean().unwrap()).abs() < 1e-12);
        assert_conserved(&a);
    }

    #[test]
    fn test_merge_rejects_other_geometry() {
        let mut a = Histogram::new("a", 4, 0.0, 4.0).unwrap();
        a.fill(1.0);
        let b = Histogram::new("b", 4, 0.0, 5.0).unwrap();
        assert!(matches!(
            a.merge(&b),
            Err(HistogramError::GeometryMismatch { .. })
        ));
        assert_eq!(a.entries(), 1);
    }

    #[test]
    fn test_bin_edges_match_geometry() {
        let hist = Histogram::new("h", 100, -10.0, 10.0).unwrap();
        let edges = hist.bin_edges().collect::<Vec<_>>();
        assert_eq!(edges.len(), 101);
        assert_eq!(edges.first(), Some(&-10.0));
        assert_eq!(edges.last(), Some(&10.0));
    }

    #[test]
    fn test_display_lists_bins_and_statistics() {
        let mut hist = Histogram::new("rapidity", 2, 0.0, 2.0).unwrap();
        hist.fill(0.5);
        hist.fill(0.5);
        hist.fill(1.5);
        let text = hist.to_string();
        assert!(text.starts_with("rapidity\n"));
        assert_eq!(text.lines().count(), 5);
        assert!(text.contains(&"#".repeat(50)));
        assert!(text.contains("entries = 3"));
        assert!(text.contains("mean = 0.83333"));
    }

    #[test]
    fn test_serde_roundtrip_preserves_contents() {
        let mut hist = Histogram::new("h", 3, 0.0, 3.0).unwrap();
        hist.fill(0.5);
        hist.fill_weighted(2.5, 2.0);
        hist.fill(-1.0);
        let json = serde_json::to_string(&hist).unwrap();
        let restored: Histogram = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, hist);
    }

    #[test]
    fn test_deserialize_rejects_wrong_counts_length() {
        let json = r#"{
            "title": "h",
            "geometry": {"bin_count": 3, "low": 0.0, "high": 3.0},
            "counts": [1.0, 2.0],
            "underflow": 0.0, "overflow": 0.0, "entries": 3,
            "sum_weights": 3.0, "sum_values": 3.0, "sum_squares": 5.0
        }"#;
        assert!(serde_json::from_str::<Histogram>(json).is_err());
    }
}
