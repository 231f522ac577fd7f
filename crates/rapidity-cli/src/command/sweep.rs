use std::path::{Path, PathBuf};

use anyhow::Context;
use rand::Rng as _;
use rapidity_plot::{Frame, PlotComposer, PlotFormat, Series, SeriesStyle};
use rapidity_sweep::{
    ConfigurationRun, ConfigurationSweep, HistogramSpec, InitFailurePolicy, Quark, StatusRange,
    StringFragmentation, SweepOutcome, Termination,
};

use crate::{
    config::{
        ConfigurationEntry, DEFAULT_ENERGIES, DEFAULT_TITLE, DEFAULT_TRIALS, ModelSettings,
        Normalize, SweepFile,
    },
    schema::{saved_plot::SavedPlot, stats_report::StatsReport},
    util,
};

const DEFAULT_OUTPUT: &str = "rapidityplot.py";
const DEFAULT_PROGRESS_INTERVAL: u64 = 100_000;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SweepArg {
    /// JSON sweep file; replaces the model, histogram and run options below
    /// (progress and output options still apply)
    #[arg(long)]
    config: Option<PathBuf>,
    /// String energies in GeV
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_ENERGIES)]
    energies: Vec<f64>,
    /// Line style per energy, e.g. "--,steelblue" (defaults cycle through dashed colors)
    #[arg(long = "style")]
    styles: Vec<SeriesStyle>,
    /// Trials per energy
    #[arg(long, default_value_t = DEFAULT_TRIALS)]
    trials: u64,
    /// PDG id of the string endpoint quark (1-5)
    #[arg(long, default_value_t = 1)]
    quark: i32,
    /// Give the endpoint quarks their constituent mass
    #[arg(long)]
    massive_quarks: bool,
    /// Transverse momentum width of new quark pairs in GeV
    #[arg(long, default_value_t = 0.0)]
    pt_sigma: f64,
    /// Let unstable primary hadrons decay
    #[arg(long)]
    hadron_decays: bool,
    /// Base random seed (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Number of histogram bins
    #[arg(long, default_value_t = 100)]
    bins: usize,
    /// Lower histogram edge
    #[arg(long, default_value_t = -10.0, allow_hyphen_values = true)]
    low: f64,
    /// Upper histogram edge
    #[arg(long, default_value_t = 10.0, allow_hyphen_values = true)]
    high: f64,
    /// Scaling of bin contents in the plot
    #[arg(long, value_enum, default_value_t = Normalize::None)]
    normalize: Normalize,
    /// Run energies on parallel threads
    #[arg(long)]
    parallel: bool,
    /// Stop when a configuration fails to initialize instead of skipping it
    #[arg(long)]
    abort_on_init_failure: bool,
    /// Log progress every N trials (0 disables)
    #[arg(long, default_value_t = DEFAULT_PROGRESS_INTERVAL)]
    progress_interval: u64,
    /// Plot output path (.py for a matplotlib script, .svg for SVG)
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,
    /// Statistics report output path (stdout if omitted)
    #[arg(long)]
    stats: Option<PathBuf>,
    /// Save the finished histograms for the `render` command
    #[arg(long)]
    save_histograms: Option<PathBuf>,
    /// Print text histograms to stderr
    #[arg(long)]
    print_histograms: bool,
}

impl Default for SweepArg {
    fn default() -> Self {
        Self {
            config: None,
            energies: DEFAULT_ENERGIES.to_vec(),
            styles: vec![],
            trials: DEFAULT_TRIALS,
            quark: 1,
            massive_quarks: false,
            pt_sigma: 0.0,
            hadron_decays: false,
            seed: None,
            bins: 100,
            low: -10.0,
            high: 10.0,
            normalize: Normalize::None,
            parallel: false,
            abort_on_init_failure: false,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            output: PathBuf::from(DEFAULT_OUTPUT),
            stats: None,
            save_histograms: None,
            print_histograms: false,
        }
    }
}

impl SweepArg {
    fn to_sweep_file(&self) -> anyhow::Result<SweepFile> {
        let quark = Quark::try_from(self.quark)?;
        let configurations = self
            .energies
            .iter()
            .enumerate()
            .map(|(i, &energy)| ConfigurationEntry {
                style: self.styles.get(i).copied(),
                ..ConfigurationEntry::from_energy(energy)
            })
            .collect();
        Ok(SweepFile {
            frame: Frame::new(DEFAULT_TITLE, "y", "n"),
            histogram: HistogramSpec {
                bin_count: self.bins,
                low: self.low,
                high: self.high,
                ..HistogramSpec::primary_rapidity()
            },
            status: StatusRange::PRIMARY_HADRONS,
            model: ModelSettings {
                quark,
                massless_quarks: !self.massive_quarks,
                pt_sigma: self.pt_sigma,
                hadron_decays: self.hadron_decays,
            },
            trials: self.trials,
            seed: self.seed,
            parallel: self.parallel,
            on_init_failure: if self.abort_on_init_failure {
                InitFailurePolicy::Abort
            } else {
                InitFailurePolicy::Skip
            },
            normalize: self.normalize,
            configurations,
        })
    }
}

pub(crate) fn run(arg: &SweepArg) -> anyhow::Result<()> {
    check_plot_output(&arg.output)?;
    for path in [&arg.stats, &arg.save_histograms].into_iter().flatten() {
        check_parent_dir(path)?;
    }

    let plan: SweepFile = match &arg.config {
        Some(path) => util::read_json_file("sweep", path)?,
        None => arg.to_sweep_file()?,
    };
    let base_seed = plan.seed.unwrap_or_else(|| rand::rng().random());
    let configurations = plan.configurations(base_seed);

    let sweep = ConfigurationSweep::new(StringFragmentation, plan.histogram.clone(), plan.status)
        .context("Failed to set up the sweep")?
        .with_policy(plan.on_init_failure)
        .with_progress_interval(arg.progress_interval);

    eprintln!(
        "Fragmenting {} string configurations (seed {base_seed}{})...",
        configurations.len(),
        if plan.parallel { ", parallel" } else { "" }
    );
    let outcome = if plan.parallel {
        sweep.run_parallel(&configurations)?
    } else {
        sweep.run(&configurations)?
    };

    print_summary(&outcome, arg.print_histograms);

    let report = StatsReport::new(&plan.histogram, plan.status, &outcome);
    util::save_json(&report, arg.stats.as_deref())?;

    let mut composer = compose(plan.frame, plan.normalize, &outcome)?;
    if let Some(path) = &arg.save_histograms {
        util::save_json(&SavedPlot::from_composer(&composer), Some(path.as_path()))?;
        eprintln!("Histograms saved to {}", path.display());
    }

    composer
        .render(&arg.output)
        .with_context(|| format!("Failed to render plot to {}", arg.output.display()))?;
    eprintln!(
        "Plot with {} series written to {}",
        composer.series().len(),
        arg.output.display()
    );

    Ok(())
}

/// Fails before any event is generated if the plot cannot be written.
fn check_plot_output(path: &Path) -> anyhow::Result<PlotFormat> {
    let format = PlotFormat::from_path(path).with_context(|| {
        format!(
            "Unsupported plot format: {} (expected .svg or .py)",
            path.display()
        )
    })?;
    check_parent_dir(path)?;
    Ok(format)
}

fn check_parent_dir(path: &Path) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    anyhow::ensure!(
        dir.is_dir(),
        "Output directory does not exist: {}",
        dir.display()
    );
    Ok(())
}

fn compose(
    frame: Frame,
    normalize: Normalize,
    outcome: &SweepOutcome,
) -> anyhow::Result<PlotComposer> {
    let mut composer = PlotComposer::with_frame(frame);
    for run in outcome.filled() {
        let series = Series::new(run.histogram.clone(), run.style, run.label.clone())
            .with_normalization(normalize.for_run(run));
        composer.add(series)?;
    }
    Ok(composer)
}

fn print_summary(outcome: &SweepOutcome, print_histograms: bool) {
    eprintln!();
    eprintln!("Sweep summary:");
    for run in outcome.runs() {
        match run {
            ConfigurationRun::Filled(run) => {
                let histogram = &run.histogram;
                eprintln!("  {}:", run.label);
                eprintln!(
                    "    Trials:   {}/{}",
                    run.trials_completed, run.trials_requested
                );
                eprintln!("    Entries:  {}", histogram.entries());
                if let (Ok(mean), Ok(std_dev)) = (histogram.mean(), histogram.std_dev()) {
                    eprintln!("    Mean:     {mean:.4}");
                    eprintln!("    Std dev:  {std_dev:.4}");
                }
                eprintln!(
                    "    Outside:  {} below, {} above",
                    histogram.underflow(),
                    histogram.overflow()
                );
                if let Termination::GenerationFailed(error) = &run.termination {
                    eprintln!("    Stopped early: {error}");
                }
                if print_histograms {
                    eprintln!();
                    eprintln!("{histogram}");
                }
            }
            ConfigurationRun::Skipped { label, error } => {
                eprintln!("  {label}: skipped ({error})");
            }
        }
    }
    eprintln!();
}
