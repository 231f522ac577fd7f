//! Parameter sweeps that fill one rapidity histogram per configuration.
//!
//! A [`ConfigurationSweep`] asks a [`TrialSourceFactory`] for a fresh
//! [`TrialSource`] per [`Configuration`], generates the requested number of
//! trials, and fills the rapidity of every entity accepted by an
//! [`EntitySelector`] into that configuration's histogram. The finished
//! histograms become [`Series`](rapidity_plot::Series) for a
//! [`PlotComposer`](rapidity_plot::PlotComposer).
//!
//! # Modules
//!
//! - [`source`]: the trial-source contract and its errors
//! - [`selection`]: entity selectors such as [`StatusRange`]
//! - [`sweep`]: the sweep driver and its per-configuration outcomes
//! - [`string_model`]: a toy q-qbar string fragmentation source
//!
//! # Examples
//!
//! ```
//! use rapidity_plot::Frame;
//! use rapidity_sweep::{
//!     Configuration, ConfigurationSweep, HistogramSpec, StatusRange, StringFragmentation,
//!     StringParams,
//! };
//!
//! let sweep = ConfigurationSweep::new(
//!     StringFragmentation,
//!     HistogramSpec::primary_rapidity(),
//!     StatusRange::PRIMARY_HADRONS,
//! )
//! .unwrap();
//!
//! let configurations: Vec<_> = [5.0, 20.0]
//!     .into_iter()
//!     .map(|energy| Configuration {
//!         label: format!("{energy:.2} GeV string"),
//!         style: "--,steelblue".parse().unwrap(),
//!         params: StringParams { energy, ..StringParams::default() },
//!         trials: 50,
//!     })
//!     .collect();
//!
//! let outcome = sweep.run(&configurations).unwrap();
//! let composer = outcome.into_composer(Frame::new("Rapidity", "y", "n")).unwrap();
//! assert_eq!(composer.series().len(), 2);
//! ```

pub use self::{
    selection::{EntitySelector, StatusRange},
    source::{Entity, GenerationError, InitializationError, Trial, TrialSource, TrialSourceFactory},
    string_model::{Quark, StringEvents, StringFragmentation, StringParams},
    sweep::{
        Configuration, ConfigurationRun, ConfigurationSweep, FilledRun, HistogramSpec,
        InitFailurePolicy, SweepError, SweepOutcome, Termination,
    },
};

pub mod selection;
pub mod source;
pub mod string_model;
pub mod sweep;
