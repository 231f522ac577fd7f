use std::{panic, thread};

use log::{debug, info, warn};
use rapidity_hist::{Geometry, Histogram, HistogramError};
use rapidity_plot::{Frame, Normalization, PlotComposer, PlotError, Series, SeriesStyle};
use serde::{Deserialize, Serialize};

use crate::{
    selection::EntitySelector,
    source::{GenerationError, InitializationError, TrialSource, TrialSourceFactory},
};

/// One point of the parameter sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration<P> {
    /// Legend label of the resulting series.
    pub label: String,
    pub style: SeriesStyle,
    /// Parameters handed to [`TrialSourceFactory::configure`].
    pub params: P,
    /// Number of trials to generate.
    pub trials: u64,
}

/// Title and binning shared by every configuration's histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramSpec {
    pub title: String,
    pub bin_count: usize,
    pub low: f64,
    pub high: f64,
}

impl HistogramSpec {
    pub fn new(title: impl Into<String>, bin_count: usize, low: f64, high: f64) -> Self {
        Self {
            title: title.into(),
            bin_count,
            low,
            high,
        }
    }

    /// Rapidity distribution of primary hadrons: 100 bins over `[-10, 10)`.
    #[must_use]
    pub fn primary_rapidity() -> Self {
        Self::new(
            "Rapidity distribution dn/dy of primary hadrons",
            100,
            -10.0,
            10.0,
        )
    }
}

impl Default for HistogramSpec {
    fn default() -> Self {
        Self::primary_rapidity()
    }
}

/// What to do when a configuration's trial source cannot be set up.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitFailurePolicy {
    /// Record the configuration as skipped and continue with the next one.
    #[default]
    Skip,
    /// Stop the sweep with an error.
    Abort,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum SweepError {
    #[display("invalid histogram specification")]
    InvalidHistogram { source: HistogramError },
    #[display("configuration '{label}' could not be initialized")]
    InitializationFailed {
        label: String,
        source: InitializationError,
    },
}

/// Why the trial loop of a configuration ended.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::IsVariant)]
pub enum Termination {
    /// All requested trials were generated.
    Completed,
    /// The source failed; the histogram holds the trials generated before.
    GenerationFailed(GenerationError),
}

/// A configuration whose trial loop ran, completely or up to a failure.
#[derive(Debug, Clone, PartialEq)]
pub struct FilledRun {
    pub label: String,
    pub style: SeriesStyle,
    pub histogram: Histogram,
    pub trials_requested: u64,
    pub trials_completed: u64,
    pub termination: Termination,
}

impl FilledRun {
    /// Scale turning bin contents into a per-trial density, `dn/dy`.
    #[must_use]
    pub fn per_trial_density(&self) -> Normalization {
        #[expect(clippy::cast_precision_loss)]
        let divisor = self.trials_completed as f64 * self.histogram.bin_width();
        Normalization::Scale(if divisor > 0.0 { 1.0 / divisor } else { 0.0 })
    }

    #[must_use]
    pub fn into_series(self) -> Series {
        Series::new(self.histogram, self.style, self.label)
    }
}

/// Outcome of one configuration.
#[derive(Debug, Clone, PartialEq, derive_more::IsVariant)]
pub enum ConfigurationRun {
    Filled(FilledRun),
    /// The trial source could not be initialized; no histogram exists.
    Skipped {
        label: String,
        error: InitializationError,
    },
}

impl ConfigurationRun {
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Filled(run) => &run.label,
            Self::Skipped { label, .. } => label,
        }
    }

    #[must_use]
    pub fn as_filled(&self) -> Option<&FilledRun> {
        match self {
            Self::Filled(run) => Some(run),
            Self::Skipped { .. } => None,
        }
    }

    /// The finished series, or `None` for a skipped configuration.
    #[must_use]
    pub fn into_series(self) -> Option<Series> {
        match self {
            Self::Filled(run) => Some(run.into_series()),
            Self::Skipped { .. } => None,
        }
    }
}

/// Per-configuration results, in configuration order.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepOutcome {
    runs: Vec<ConfigurationRun>,
}

impl SweepOutcome {
    #[must_use]
    pub fn runs(&self) -> &[ConfigurationRun] {
        &self.runs
    }

    pub fn filled(&self) -> impl Iterator<Item = &FilledRun> + '_ {
        self.runs.iter().filter_map(ConfigurationRun::as_filled)
    }

    pub fn skipped(&self) -> impl Iterator<Item = &ConfigurationRun> + '_ {
        self.runs.iter().filter(|run| run.is_skipped())
    }

    #[must_use]
    pub fn into_runs(self) -> Vec<ConfigurationRun> {
        self.runs
    }

    /// Series of all filled configurations, in configuration order.
    #[must_use]
    pub fn into_series(self) -> Vec<Series> {
        self.runs
            .into_iter()
            .filter_map(ConfigurationRun::into_series)
            .collect()
    }

    /// Adds every filled configuration to a new composer, in order.
    pub fn into_composer(self, frame: Frame) -> Result<PlotComposer, PlotError> {
        let mut composer = PlotComposer::with_frame(frame);
        for series in self.into_series() {
            composer.add(series)?;
        }
        Ok(composer)
    }
}

/// Runs a trial loop per configuration and fills one histogram for each.
///
/// Every configuration gets its own source from the factory and its own
/// histogram with the shared binning; nothing is shared between
/// configurations.
///
/// # Examples
///
/// ```
/// use rapidity_sweep::{
///     Configuration, ConfigurationSweep, Entity, GenerationError, HistogramSpec,
///     InitializationError, StatusRange, Trial, TrialSource, TrialSourceFactory,
/// };
///
/// struct Fixed;
/// struct FixedSource(f64);
///
/// impl TrialSource for FixedSource {
///     fn generate_trial(&mut self) -> Result<Trial, GenerationError> {
///         Ok(Trial::new(vec![Entity::new(83, self.0), Entity::new(-71, 9.0)]))
///     }
/// }
///
/// impl TrialSourceFactory for Fixed {
///     type Params = f64;
///     type Source = FixedSource;
///
///     fn configure(&self, params: &f64) -> Result<FixedSource, InitializationError> {
///         Ok(FixedSource(*params))
///     }
/// }
///
/// let sweep = ConfigurationSweep::new(
///     Fixed,
///     HistogramSpec::new("y", 10, -5.0, 5.0),
///     StatusRange::PRIMARY_HADRONS,
/// )
/// .unwrap();
/// let configurations = [Configuration {
///     label: "central".into(),
///     style: "--,steelblue".parse().unwrap(),
///     params: 0.5,
///     trials: 100,
/// }];
///
/// let outcome = sweep.run(&configurations).unwrap();
/// let run = outcome.filled().next().unwrap();
/// assert_eq!(run.histogram.entries(), 100);
/// assert_eq!(run.histogram.count(5), 100.0);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigurationSweep<F, S> {
    factory: F,
    histogram: HistogramSpec,
    geometry: Geometry,
    selector: S,
    policy: InitFailurePolicy,
    progress_interval: u64,
}

impl<F, S> ConfigurationSweep<F, S>
where
    F: TrialSourceFactory,
    S: EntitySelector,
{
    /// Creates a sweep, validating the histogram binning up front.
    pub fn new(factory: F, histogram: HistogramSpec, selector: S) -> Result<Self, SweepError> {
        let geometry = Geometry::new(histogram.bin_count, histogram.low, histogram.high)
            .map_err(|source| SweepError::InvalidHistogram { source })?;
        Ok(Self {
            factory,
            histogram,
            geometry,
            selector,
            policy: InitFailurePolicy::Skip,
            progress_interval: 100_000,
        })
    }

    #[must_use]
    pub fn with_policy(mut self, policy: InitFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Logs progress every `interval` trials; zero disables progress logs.
    #[must_use]
    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval;
        self
    }

    #[must_use]
    pub fn factory(&self) -> &F {
        &self.factory
    }

    #[must_use]
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    #[must_use]
    pub fn policy(&self) -> InitFailurePolicy {
        self.policy
    }

    /// Runs the configurations one after another.
    ///
    /// With [`InitFailurePolicy::Abort`] the sweep stops at the first
    /// configuration that fails to initialize.
    pub fn run(
        &self,
        configurations: &[Configuration<F::Params>],
    ) -> Result<SweepOutcome, SweepError> {
        let mut runs = Vec::with_capacity(configurations.len());
        for configuration in configurations {
            let run = self.run_configuration(configuration);
            runs.push(self.apply_policy(run)?);
        }
        Ok(SweepOutcome { runs })
    }

    /// Runs every configuration on its own scoped thread.
    ///
    /// Results are identical to [`Self::run`] for deterministic sources. With
    /// [`InitFailurePolicy::Abort`] all configurations still run to the end;
    /// the first failure in configuration order is reported.
    pub fn run_parallel(
        &self,
        configurations: &[Configuration<F::Params>],
    ) -> Result<SweepOutcome, SweepError>
    where
        F::Params: Sync,
        S: Sync,
    {
        let runs = thread::scope(|s| {
            let handles = configurations
                .iter()
                .map(|configuration| s.spawn(move || self.run_configuration(configuration)))
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|payload| panic::resume_unwind(payload))
                })
                .collect::<Vec<_>>()
        });
        let runs = runs
            .into_iter()
            .map(|run| self.apply_policy(run))
            .collect::<Result<_, _>>()?;
        Ok(SweepOutcome { runs })
    }

    fn apply_policy(&self, run: ConfigurationRun) -> Result<ConfigurationRun, SweepError> {
        match (run, self.policy) {
            (ConfigurationRun::Skipped { label, error }, InitFailurePolicy::Abort) => {
                Err(SweepError::InitializationFailed {
                    label,
                    source: error,
                })
            }
            (run, _) => Ok(run),
        }
    }

    fn run_configuration(&self, configuration: &Configuration<F::Params>) -> ConfigurationRun {
        let label = &configuration.label;
        let mut source = match self.factory.configure(&configuration.params) {
            Ok(source) => source,
            Err(error) => {
                warn!("{label}: skipping configuration: {error}");
                return ConfigurationRun::Skipped {
                    label: label.clone(),
                    error,
                };
            }
        };

        info!("{label}: generating {} trials", configuration.trials);
        let mut histogram = Histogram::with_geometry(self.histogram.title.clone(), self.geometry);
        let mut trials_completed = 0;
        let mut termination = Termination::Completed;
        while trials_completed < configuration.trials {
            let trial = match source.generate_trial() {
                Ok(trial) => trial,
                Err(error) => {
                    warn!("{label}: stopping after {trials_completed} trials: {error}");
                    termination = Termination::GenerationFailed(error);
                    break;
                }
            };
            for entity in trial.entities() {
                if self.selector.accepts(&entity) {
                    histogram.fill(entity.rapidity);
                }
            }
            trials_completed += 1;
            if self.progress_interval > 0 && trials_completed % self.progress_interval == 0 {
                debug!(
                    "{label}: {trials_completed}/{} trials",
                    configuration.trials
                );
            }
        }
        info!(
            "{label}: finished {trials_completed} trials, {} entries",
            histogram.entries()
        );

        ConfigurationRun::Filled(FilledRun {
            label: label.clone(),
            style: configuration.style,
            histogram,
            trials_requested: configuration.trials,
            trials_completed,
            termination,
        })
    }
}
