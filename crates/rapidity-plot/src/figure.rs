use serde::{Deserialize, Serialize};

use crate::style::SeriesStyle;

/// Title and axis labels of a comparison plot.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
}

impl Frame {
    pub fn new(
        title: impl Into<String>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
        }
    }
}

/// One piecewise-constant curve: `heights[i]` spans `edges[i]..edges[i + 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct StepCurve {
    pub label: String,
    pub style: SeriesStyle,
    pub edges: Vec<f64>,
    pub heights: Vec<f64>,
}

impl StepCurve {
    /// Outline of the curve as a polyline.
    ///
    /// Starts and ends on the zero baseline; each bin contributes a flat
    /// segment across its two edges, and neighbouring bins are joined by a
    /// vertical jump at the shared edge.
    ///
    /// # Examples
    ///
    /// ```
    /// use rapidity_plot::{SeriesStyle, StepCurve};
    ///
    /// let curve = StepCurve {
    ///     label: "a".into(),
    ///     style: SeriesStyle::default(),
    ///     edges: vec![0.0, 1.0, 2.0],
    ///     heights: vec![3.0, 1.0],
    /// };
    /// assert_eq!(
    ///     curve.points(),
    ///     vec![(0.0, 0.0), (0.0, 3.0), (1.0, 3.0), (1.0, 1.0), (2.0, 1.0), (2.0, 0.0)],
    /// );
    /// ```
    #[must_use]
    pub fn points(&self) -> Vec<(f64, f64)> {
        let (Some(&first), Some(&last)) = (self.edges.first(), self.edges.last()) else {
            return vec![];
        };
        let mut points = Vec::with_capacity(2 * self.heights.len() + 2);
        points.push((first, 0.0));
        for (edges, &height) in self.edges.windows(2).zip(&self.heights) {
            points.push((edges[0], height));
            points.push((edges[1], height));
        }
        points.push((last, 0.0));
        points
    }

    #[must_use]
    pub fn max_height(&self) -> f64 {
        self.heights.iter().copied().fold(0.0, f64::max)
    }
}

/// Renderer-neutral description of a composed plot.
///
/// Curves are in insertion order, which is both legend order and drawing
/// order (later curves are drawn on top).
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub frame: Frame,
    /// Shared x range of every curve; `0..1` for an empty figure.
    pub x_range: (f64, f64),
    pub curves: Vec<StepCurve>,
}

impl Figure {
    /// Largest height over all curves, or zero.
    #[must_use]
    pub fn max_height(&self) -> f64 {
        self.curves
            .iter()
            .map(StepCurve::max_height)
            .fold(0.0, f64::max)
    }
}

/// Turns a [`Figure`] into the text of an output artifact.
///
/// Implementations must be pure: the same figure always yields the same text.
pub trait FigureRenderer {
    fn render(&self, figure: &Figure) -> String;
}
