use rapidity_hist::{Geometry, Histogram};
use serde::{Deserialize, Serialize};

use crate::{
    normalization::Normalization,
    style::{ParseStyleError, SeriesStyle},
};

/// A finished histogram together with its legend label and line style.
///
/// A `Series` is an immutable snapshot: the histogram is expected to be
/// complete when it is wrapped, and nothing here mutates it. Compatibility
/// with other series is checked when it is added to a
/// [`PlotComposer`](crate::PlotComposer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    histogram: Histogram,
    style: SeriesStyle,
    label: String,
    #[serde(default)]
    normalization: Normalization,
}

impl Series {
    #[must_use]
    pub fn new(histogram: Histogram, style: SeriesStyle, label: impl Into<String>) -> Self {
        Self {
            histogram,
            style,
            label: label.into(),
            normalization: Normalization::None,
        }
    }

    /// Creates a series from a style token such as `"dashed, steelblue"`.
    pub fn from_style_token(
        histogram: Histogram,
        token: &str,
        label: impl Into<String>,
    ) -> Result<Self, ParseStyleError> {
        Ok(Self::new(histogram, token.parse()?, label))
    }

    /// Sets the render-time normalization.
    #[must_use]
    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    #[must_use]
    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    #[must_use]
    pub fn style(&self) -> SeriesStyle {
        self.style
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn normalization(&self) -> Normalization {
        self.normalization
    }

    #[must_use]
    pub fn geometry(&self) -> Geometry {
        self.histogram.geometry()
    }

    /// Bin heights as drawn: the bin contents after normalization.
    #[must_use]
    pub fn heights(&self) -> Vec<f64> {
        self.normalization.apply(&self.histogram)
    }

    /// Returns the wrapped histogram.
    #[must_use]
    pub fn into_histogram(self) -> Histogram {
        self.histogram
    }
}
