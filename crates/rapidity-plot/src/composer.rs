use std::{
    fs::File,
    io::{self, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use log::info;
use rapidity_hist::Geometry;

use crate::{
    figure::{Figure, FigureRenderer, Frame, StepCurve},
    matplotlib::MatplotlibRenderer,
    series::Series,
    svg::SvgRenderer,
};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum PlotError {
    #[display(
        "series '{label}' has geometry {actual}, but the plot was started with {expected}"
    )]
    GeometryMismatch {
        label: String,
        expected: Geometry,
        actual: Geometry,
    },
    #[display("cannot add series '{label}': the plot has already been rendered")]
    AlreadyRendered { label: String },
    #[display("cannot infer plot format from '{}' (expected .svg or .py)", path.display())]
    UnsupportedFormat { path: PathBuf },
    #[display("cannot create plot file '{}'", path.display())]
    RenderTargetUnavailable { path: PathBuf, source: io::Error },
    #[display("failed to write plot")]
    Write { source: io::Error },
}

/// Lifecycle of a [`PlotComposer`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum ComposerState {
    #[default]
    Empty,
    Accumulating,
    Rendered,
}

/// Output artifact kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotFormat {
    Svg,
    Matplotlib,
}

impl PlotFormat {
    /// Infers the format from a file extension: `.svg` or `.py`.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("svg") {
            Some(Self::Svg)
        } else if ext.eq_ignore_ascii_case("py") {
            Some(Self::Matplotlib)
        } else {
            None
        }
    }

    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Matplotlib => "py",
        }
    }

    #[must_use]
    pub fn render(self, figure: &Figure) -> String {
        match self {
            Self::Svg => SvgRenderer::default().render(figure),
            Self::Matplotlib => MatplotlibRenderer.render(figure),
        }
    }
}

/// Collects series with identical binning and renders them as one overlaid
/// step plot.
///
/// The first added series fixes the reference geometry. Series are drawn and
/// listed in the legend in insertion order.
#[derive(Debug, Clone)]
pub struct PlotComposer {
    frame: Frame,
    series: Vec<Series>,
    state: ComposerState,
}

impl PlotComposer {
    pub fn new(
        title: impl Into<String>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
    ) -> Self {
        Self::with_frame(Frame::new(title, x_label, y_label))
    }

    #[must_use]
    pub fn with_frame(frame: Frame) -> Self {
        Self {
            frame,
            series: Vec::new(),
            state: ComposerState::Empty,
        }
    }

    /// Appends a series.
    ///
    /// # Errors
    ///
    /// [`PlotError::GeometryMismatch`] if the series' bin count or range
    /// differs from the first series, [`PlotError::AlreadyRendered`] once the
    /// composer has been rendered to a target.
    pub fn add(&mut self, series: Series) -> Result<(), PlotError> {
        if self.state.is_rendered() {
            return Err(PlotError::AlreadyRendered {
                label: series.label().to_owned(),
            });
        }
        if let Some(expected) = self.reference_geometry() {
            let actual = series.geometry();
            if actual != expected {
                return Err(PlotError::GeometryMismatch {
                    label: series.label().to_owned(),
                    expected,
                    actual,
                });
            }
        }
        self.series.push(series);
        self.state = ComposerState::Accumulating;
        Ok(())
    }

    #[must_use]
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    #[must_use]
    pub fn series(&self) -> &[Series] {
        &self.series
    }

    #[must_use]
    pub fn state(&self) -> ComposerState {
        self.state
    }

    /// Geometry shared by all series, defined by the first one.
    #[must_use]
    pub fn reference_geometry(&self) -> Option<Geometry> {
        self.series.first().map(Series::geometry)
    }

    /// Renderer-neutral view of the current series list.
    #[must_use]
    pub fn figure(&self) -> Figure {
        let x_range = self
            .reference_geometry()
            .map_or((0.0, 1.0), |geometry| (geometry.low(), geometry.high()));
        let curves = self
            .series
            .iter()
            .map(|series| StepCurve {
                label: series.label().to_owned(),
                style: series.style(),
                edges: series.histogram().bin_edges().collect(),
                heights: series.heights(),
            })
            .collect();
        Figure {
            frame: self.frame.clone(),
            x_range,
            curves,
        }
    }

    /// Renders to a string without changing the composer state.
    #[must_use]
    pub fn render_string(&self, format: PlotFormat) -> String {
        format.render(&self.figure())
    }

    /// Renders into `writer` and marks the composer as rendered.
    ///
    /// # Errors
    ///
    /// [`PlotError::Write`] if writing fails.
    pub fn render_to<W>(&mut self, writer: &mut W, format: PlotFormat) -> Result<(), PlotError>
    where
        W: io::Write,
    {
        let output = self.render_string(format);
        writer
            .write_all(output.as_bytes())
            .map_err(|source| PlotError::Write { source })?;
        self.state = ComposerState::Rendered;
        Ok(())
    }

    /// Renders to the file at `path`, choosing the format from its extension.
    ///
    /// # Errors
    ///
    /// [`PlotError::UnsupportedFormat`] for an unknown extension,
    /// [`PlotError::RenderTargetUnavailable`] if the file cannot be created,
    /// [`PlotError::Write`] if writing fails.
    pub fn render<P>(&mut self, path: P) -> Result<(), PlotError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let format = PlotFormat::from_path(path).ok_or_else(|| PlotError::UnsupportedFormat {
            path: path.to_owned(),
        })?;
        let file = File::create(path).map_err(|source| PlotError::RenderTargetUnavailable {
            path: path.to_owned(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        self.render_to(&mut writer, format)?;
        writer
            .flush()
            .map_err(|source| PlotError::Write { source })?;
        info!(
            "rendered {} series to {}",
            self.series.len(),
            path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::env;

    use rapidity_hist::Histogram;

    use super::*;
    use crate::normalization::Normalization;

    fn series(label: &str, bins: usize, high: f64, style: &str) -> Series {
        let mut hist = Histogram::new(label, bins, 0.0, high).unwrap();
        for i in 0..20 {
            hist.fill(f64::from(i) * high / 20.0);
        }
        Series::from_style_token(hist, style, label).unwrap()
    }

    fn composer() -> PlotComposer {
        PlotComposer::new("Rapidity distributions", "y", "n")
    }

    #[test]
    fn test_state_transitions() {
        let mut plot = composer();
        assert!(plot.state().is_empty());
        plot.add(series("a", 10, 10.0, "--,steelblue")).unwrap();
        assert!(plot.state().is_accumulating());
        plot.render_to(&mut Vec::new(), PlotFormat::Svg).unwrap();
        assert!(plot.state().is_rendered());
    }

    #[test]
    fn test_geometry_mismatch_is_rejected() {
        let mut plot = composer();
        plot.add(series("a", 10, 10.0, "steelblue")).unwrap();
        let err = plot.add(series("b", 10, 5.0, "seagreen")).unwrap_err();
        assert!(matches!(
            err,
            PlotError::GeometryMismatch { ref label, .. } if label == "b"
        ));
        let err = plot.add(series("c", 5, 10.0, "seagreen")).unwrap_err();
        assert!(matches!(err, PlotError::GeometryMismatch { .. }));
        assert_eq!(plot.series().len(), 1);
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let mut plot = composer();
        for label in ["first", "second", "third"] {
            plot.add(series(label, 4, 1.0, "dashed")).unwrap();
        }
        let labels: Vec<_> = plot.figure().curves.into_iter().map(|c| c.label).collect();
        assert_eq!(labels, ["first", "second", "third"]);
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut plot = composer();
        plot.add(series("a", 10, 10.0, "--,steelblue")).unwrap();
        plot.add(series("b", 10, 10.0, "--,indianred")).unwrap();
        for format in [PlotFormat::Svg, PlotFormat::Matplotlib] {
            let mut first = Vec::new();
            let mut second = Vec::new();
            plot.render_to(&mut first, format).unwrap();
            plot.render_to(&mut second, format).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_add_after_render_is_rejected() {
        let mut plot = composer();
        plot.add(series("a", 10, 10.0, "red")).unwrap();
        plot.render_to(&mut Vec::new(), PlotFormat::Svg).unwrap();
        let err = plot.add(series("b", 10, 10.0, "blue")).unwrap_err();
        assert!(matches!(err, PlotError::AlreadyRendered { .. }));
    }

    #[test]
    fn test_empty_composer_renders_unit_frame() {
        let plot = composer();
        let figure = plot.figure();
        assert_eq!(figure.x_range, (0.0, 1.0));
        assert!(figure.curves.is_empty());
        assert!(plot.render_string(PlotFormat::Svg).contains("Rapidity distributions"));
    }

    #[test]
    fn test_figure_uses_normalized_heights() {
        let mut hist = Histogram::new("h", 2, 0.0, 2.0).unwrap();
        hist.fill(0.5);
        hist.fill(1.5);
        hist.fill(1.5);
        let series = Series::new(hist, "red".parse().unwrap(), "h")
            .with_normalization(Normalization::Scale(0.5));
        let mut plot = composer();
        plot.add(series).unwrap();
        let curve = &plot.figure().curves[0];
        assert_eq!(curve.edges, vec![0.0, 1.0, 2.0]);
        assert_eq!(curve.heights, vec![0.5, 1.0]);
        assert_eq!(plot.series()[0].histogram().counts(), &[1.0, 2.0]);
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            PlotFormat::from_path(Path::new("out/plot.SVG")),
            Some(PlotFormat::Svg)
        );
        assert_eq!(
            PlotFormat::from_path(Path::new("plot.py")),
            Some(PlotFormat::Matplotlib)
        );
        assert_eq!(PlotFormat::from_path(Path::new("plot.png")), None);
        assert_eq!(PlotFormat::from_path(Path::new("plot")), None);
    }

    #[test]
    fn test_unsupported_extension() {
        let mut plot = composer();
        let err = plot.render("plot.png").unwrap_err();
        assert!(matches!(err, PlotError::UnsupportedFormat { .. }));
        assert!(plot.state().is_empty());
    }

    #[test]
    fn test_unavailable_target() {
        let mut plot = composer();
        let path = env::temp_dir()
            .join("rapidity-plot-missing-dir")
            .join("nested")
            .join("plot.svg");
        let err = plot.render(&path).unwrap_err();
        assert!(matches!(err, PlotError::RenderTargetUnavailable { .. }));
        assert!(!plot.state().is_rendered());
    }

    #[test]
    fn test_render_to_file() {
        let mut plot = composer();
        plot.add(series("a", 10, 10.0, "--,steelblue")).unwrap();
        let path = env::temp_dir().join(format!("rapidity-plot-{}.svg", std::process::id()));
        plot.render(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(written, plot.render_string(PlotFormat::Svg));
    }
}
