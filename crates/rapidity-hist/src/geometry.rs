use std::{fmt, iter::FusedIterator};

use serde::{Deserialize, Serialize};

use crate::HistogramError;

/// Fixed binning of a one-dimensional histogram.
///
/// `bin_count` equal-width bins cover the half-open range `[low, high)`.
/// Every edge is produced by [`Geometry::edge`], and [`Geometry::bin_index`]
/// is corrected against it, so a value lying exactly on an interior edge
/// always opens the upper bin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeometry")]
pub struct Geometry {
    bin_count: usize,
    low: f64,
    high: f64,
}

#[derive(Deserialize)]
struct RawGeometry {
    bin_count: usize,
    low: f64,
    high: f64,
}

impl TryFrom<RawGeometry> for Geometry {
    type Error = HistogramError;

    fn try_from(raw: RawGeometry) -> Result<Self, Self::Error> {
        Self::new(raw.bin_count, raw.low, raw.high)
    }
}

/// Location of a value relative to a [`Geometry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinIndex {
    /// Below the low edge.
    Underflow,
    /// Inside the bin with this index.
    Bin(usize),
    /// At or above the high edge.
    Overflow,
}

impl Geometry {
    /// Creates a geometry of `bin_count` bins over `[low, high)`.
    ///
    /// # Errors
    ///
    /// Returns [`HistogramError::InvalidGeometry`] if `bin_count` is zero,
    /// either edge is not finite, or `low >= high`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rapidity_hist::Geometry;
    ///
    /// assert!(Geometry::new(100, -10.0, 10.0).is_ok());
    /// assert!(Geometry::new(0, -10.0, 10.0).is_err());
    /// assert!(Geometry::new(10, 1.0, 1.0).is_err());
    /// ```
    pub fn new(bin_count: usize, low: f64, high: f64) -> Result<Self, HistogramError> {
        let valid = bin_count > 0
            && low.is_finite()
            && high.is_finite()
            && low < high
            && (high - low).is_finite();
        if !valid {
            return Err(HistogramError::InvalidGeometry {
                bin_count,
                low,
                high,
            });
        }
        Ok(Self {
            bin_count,
            low,
            high,
        })
    }

    #[must_use]
    pub fn bin_count(&self) -> usize {
        self.bin_count
    }

    #[must_use]
    pub fn low(&self) -> f64 {
        self.low
    }

    #[must_use]
    pub fn high(&self) -> f64 {
        self.high
    }

    /// Width shared by every bin.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn bin_width(&self) -> f64 {
        (self.high - self.low) / self.bin_count as f64
    }

    /// Returns the `index`-th edge; `edge(0) == low` and `edge(bin_count) == high`.
    ///
    /// # Panics
    ///
    /// Panics if `index > bin_count`.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn edge(&self, index: usize) -> f64 {
        assert!(
            index <= self.bin_count,
            "edge index {index} out of range for {} bins",
            self.bin_count
        );
        if index == self.bin_count {
            return self.high;
        }
        self.low + (self.high - self.low) * index as f64 / self.bin_count as f64
    }

    /// Center of the bin with the given index.
    #[must_use]
    pub fn bin_center(&self, index: usize) -> f64 {
        0.5 * (self.edge(index) + self.edge(index + 1))
    }

    /// Locates `value` using left-inclusive, right-exclusive bins.
    ///
    /// NaN compares below every edge and is reported as underflow.
    ///
    /// # Examples
    ///
    /// ```
    /// use rapidity_hist::{BinIndex, Geometry};
    ///
    /// let geometry = Geometry::new(10, 0.0, 10.0).unwrap();
    /// assert_eq!(geometry.bin_index(5.0), BinIndex::Bin(5));
    /// assert_eq!(geometry.bin_index(9.999), BinIndex::Bin(9));
    /// assert_eq!(geometry.bin_index(10.0), BinIndex::Overflow);
    /// assert_eq!(geometry.bin_index(-0.001), BinIndex::Underflow);
    /// ```
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_sign_loss,
        clippy::cast_possible_truncation
    )]
    #[must_use]
    pub fn bin_index(&self, value: f64) -> BinIndex {
        if value.is_nan() || value < self.low {
            return BinIndex::Underflow;
        }
        if value >= self.high {
            return BinIndex::Overflow;
        }
        let position = (value - self.low) / (self.high - self.low) * self.bin_count as f64;
        let mut index = (position.floor() as usize).min(self.bin_count - 1);
        // The direct quotient can land one bin off near an edge; settle on the
        // bin whose generated edges bracket the value.
        while index > 0 && value < self.edge(index) {
            index -= 1;
        }
        while index + 1 < self.bin_count && value >= self.edge(index + 1) {
            index += 1;
        }
        BinIndex::Bin(index)
    }

    /// Lazily yields the `bin_count + 1` edges from `low` to `high`.
    ///
    /// The iterator is cheap to clone, so it can be restarted at any time.
    #[must_use]
    pub fn edges(&self) -> BinEdges {
        BinEdges {
            geometry: *self,
            front: 0,
            back: self.bin_count + 1,
        }
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} bins over [{}, {})",
            self.bin_count, self.low, self.high
        )
    }
}

/// Iterator over the edges of a [`Geometry`], created by [`Geometry::edges`].
#[derive(Debug, Clone)]
pub struct BinEdges {
    geometry: Geometry,
    front: usize,
    back: usize,
}

impl Iterator for BinEdges {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.front >= self.back {
            return None;
        }
        let edge = self.geometry.edge(self.front);
        self.front += 1;
        Some(edge)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }
}

impl DoubleEndedIterator for BinEdges {
    fn next_back(&mut self) -> Option<f64> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(self.geometry.edge(self.back))
    }
}

impl ExactSizeIterator for BinEdges {}

impl FusedIterator for BinEdges {}
