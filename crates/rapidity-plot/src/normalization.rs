use rapidity_hist::Histogram;
use serde::{Deserialize, Serialize};

/// Render-time rescaling of a series' bin contents.
///
/// Applied only when curve heights are computed; the underlying
/// [`Histogram`] is never modified.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    /// Raw bin contents.
    #[default]
    None,
    /// Divide by the total fill weight.
    Entries,
    /// Divide by the bin width.
    BinWidth,
    /// Divide by total weight and bin width; the curve integrates to the
    /// in-range fraction.
    Density,
    /// Multiply by a fixed factor, e.g. `1 / (trials * bin_width)` for dn/dy.
    Scale(f64),
}

impl Normalization {
    /// Factor every bin content is multiplied by.
    ///
    /// Zero when the divisor is zero, so an empty histogram stays flat.
    #[must_use]
    pub fn factor(self, histogram: &Histogram) -> f64 {
        let inverse = |divisor: f64| if divisor == 0.0 { 0.0 } else { 1.0 / divisor };
        match self {
            Self::None => 1.0,
            Self::Entries => inverse(histogram.sum_weights()),
            Self::BinWidth => inverse(histogram.bin_width()),
            Self::Density => inverse(histogram.sum_weights() * histogram.bin_width()),
            Self::Scale(factor) => factor,
        }
    }

    /// Rescaled copy of the histogram's bin contents.
    #[must_use]
    pub fn apply(self, histogram: &Histogram) -> Vec<f64> {
        let factor = self.factor(histogram);
        histogram.counts().iter().map(|count| count * factor).collect()
    }
}
