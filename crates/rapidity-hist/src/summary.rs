use serde::{Deserialize, Serialize};

use crate::Geometry;

/// Headline statistics of a [`Histogram`](crate::Histogram).
///
/// The moments are `None` for a histogram without entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramSummary {
    pub title: String,
    pub geometry: Geometry,
    /// Number of accepted fills.
    pub entries: u64,
    pub sum_weights: f64,
    /// Total weight inside the binned range.
    pub in_range: f64,
    pub underflow: f64,
    pub overflow: f64,
    /// Fills rejected for a non-finite value or weight.
    pub non_finite: u64,
    pub mean: Option<f64>,
    pub variance: Option<f64>,
    pub std_dev: Option<f64>,
}
