//! Composition of finished histograms into overlaid step plots.
//!
//! - **Series**: a histogram paired with a legend label and a line style
//! - **Composer**: collects series with identical binning, in order
//! - **Renderers**: SVG documents and matplotlib scripts
//!
//! # Modules
//!
//! - [`series`], [`style`], [`color`]: what one curve looks like
//! - [`normalization`]: render-time rescaling of bin contents
//! - [`composer`]: [`PlotComposer`] and output targets
//! - [`figure`]: the renderer-neutral [`Figure`] and the [`FigureRenderer`] trait
//! - [`svg`], [`canvas`], [`axis`]: the SVG backend
//! - [`matplotlib`]: the Python script backend
//!
//! # Examples
//!
//! ```
//! use rapidity_hist::Histogram;
//! use rapidity_plot::{PlotComposer, PlotFormat, Series};
//!
//! let mut plot = PlotComposer::new("Rapidity distributions", "y", "n");
//! for (energy, color) in [(5.0, "steelblue"), (20.0, "seagreen")] {
//!     let mut hist = Histogram::new("dn/dy", 100, -10.0, 10.0).unwrap();
//!     hist.fill(0.5);
//!     let style = format!("--,{color}");
//!     let label = format!("{energy:.2} GeV string");
//!     let series = Series::from_style_token(hist, &style, label).unwrap();
//!     plot.add(series).unwrap();
//! }
//!
//! let svg = plot.render_string(PlotFormat::Svg);
//! assert!(svg.contains("5.00 GeV string"));
//! assert_eq!(svg, plot.render_string(PlotFormat::Svg));
//! ```

pub use self::{
    axis::Axis,
    color::{Color, ParseColorError},
    composer::{ComposerState, PlotComposer, PlotError, PlotFormat},
    figure::{Figure, FigureRenderer, Frame, StepCurve},
    matplotlib::MatplotlibRenderer,
    normalization::Normalization,
    series::Series,
    style::{LineDash, ParseStyleError, SeriesStyle},
    svg::SvgRenderer,
};

pub mod axis;
pub mod canvas;
pub mod color;
pub mod composer;
pub mod figure;
pub mod matplotlib;
pub mod normalization;
pub mod series;
pub mod style;
pub mod svg;
