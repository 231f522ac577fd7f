//! Fixed-width histogram accumulation for rapidity distributions.
//!
//! This crate provides the statistical accumulator used by the rapidity
//! comparison tool:
//!
//! - **Geometry**: fixed binning with a consistent edge and bin-index rule
//! - **Histogram**: 1-D accumulator with underflow/overflow and running moments
//! - **Summary**: serializable headline statistics of a histogram
//!
//! # Modules
//!
//! - [`geometry`]: bin layout, edge generation and value lookup
//! - [`histogram`]: the accumulator and its text rendering
//! - [`summary`]: statistics records for reports
//!
//! # Examples
//!
//! ## Filling a histogram
//!
//! ```
//! use rapidity_hist::Histogram;
//!
//! let mut hist = Histogram::new("dn/dy", 100, -10.0, 10.0).unwrap();
//! hist.fill(0.3);
//! hist.fill(-1.2);
//! hist.fill(42.0); // overflow, still counted as an entry
//!
//! assert_eq!(hist.entries(), 3);
//! assert_eq!(hist.in_range_sum() + hist.underflow() + hist.overflow(), 3.0);
//! ```
//!
//! ## Walking the bin edges
//!
//! ```
//! use rapidity_hist::Geometry;
//!
//! let geometry = Geometry::new(4, 0.0, 1.0).unwrap();
//! let edges = geometry.edges().collect::<Vec<_>>();
//! assert_eq!(edges, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
//! ```

pub use self::{
    geometry::{BinEdges, BinIndex, Geometry},
    histogram::Histogram,
    summary::HistogramSummary,
};

pub mod geometry;
pub mod histogram;
pub mod summary;

/// Errors raised by histogram construction, merging and statistics.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum HistogramError {
    #[display("invalid histogram geometry: {bin_count} bins over [{low}, {high})")]
    InvalidGeometry { bin_count: usize, low: f64, high: f64 },
    #[display("histogram geometry mismatch: expected {expected}, got {actual}")]
    GeometryMismatch { expected: Geometry, actual: Geometry },
    #[display("histogram has {actual} bin contents but {expected} bins")]
    CountsLength { expected: usize, actual: usize },
    #[display("histogram has no entries")]
    Empty,
}
