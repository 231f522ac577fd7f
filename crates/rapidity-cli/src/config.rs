use rapidity_plot::{Color, Frame, LineDash, Normalization, SeriesStyle};
use rapidity_sweep::{
    Configuration, FilledRun, HistogramSpec, InitFailurePolicy, Quark, StatusRange, StringParams,
};
use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_ENERGIES: [f64; 3] = [5.0, 20.0, 100.0];
pub(crate) const DEFAULT_COLORS: [&str; 3] = ["steelblue", "seagreen", "indianred"];
pub(crate) const DEFAULT_TRIALS: u64 = 1_000_000;
pub(crate) const DEFAULT_TITLE: &str =
    "Rapidity distributions of primary hadrons for differing string energies";

/// How bin contents are scaled in the plot.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum Normalize {
    /// Raw counts
    #[default]
    None,
    /// Fraction of all filled hadrons
    Entries,
    /// Counts per unit rapidity
    BinWidth,
    /// Probability density
    Density,
    /// Hadrons per trial and unit rapidity (dn/dy)
    PerTrial,
}

impl Normalize {
    pub(crate) fn for_run(self, run: &FilledRun) -> Normalization {
        match self {
            Self::None => Normalization::None,
            Self::Entries => Normalization::Entries,
            Self::BinWidth => Normalization::BinWidth,
            Self::Density => Normalization::Density,
            Self::PerTrial => run.per_trial_density(),
        }
    }
}

/// String model settings shared by every configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ModelSettings {
    pub quark: Quark,
    pub massless_quarks: bool,
    pub pt_sigma: f64,
    pub hadron_decays: bool,
}

impl Default for ModelSettings {
    fn default() -> Self {
        let params = StringParams::default();
        Self {
            quark: params.quark,
            massless_quarks: params.massless_quarks,
            pt_sigma: params.pt_sigma,
            hadron_decays: params.hadron_decays,
        }
    }
}

/// One string energy of the sweep; unset fields fall back to sweep defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct ConfigurationEntry {
    pub energy: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<SeriesStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trials: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl ConfigurationEntry {
    pub(crate) fn from_energy(energy: f64) -> Self {
        Self {
            energy,
            label: None,
            style: None,
            trials: None,
            seed: None,
        }
    }
}

/// A complete sweep description, as read from a JSON sweep file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct SweepFile {
    pub frame: Frame,
    pub histogram: HistogramSpec,
    pub status: StatusRange,
    pub model: ModelSettings,
    /// Default trial count of configurations that do not set their own.
    pub trials: u64,
    /// Base seed; configuration `i` uses `seed + i` unless it sets its own.
    pub seed: Option<u64>,
    pub parallel: bool,
    pub on_init_failure: InitFailurePolicy,
    pub normalize: Normalize,
    pub configurations: Vec<ConfigurationEntry>,
}

impl Default for SweepFile {
    fn default() -> Self {
        Self {
            frame: Frame::new(DEFAULT_TITLE, "y", "n"),
            histogram: HistogramSpec::primary_rapidity(),
            status: StatusRange::PRIMARY_HADRONS,
            model: ModelSettings::default(),
            trials: DEFAULT_TRIALS,
            seed: None,
            parallel: false,
            on_init_failure: InitFailurePolicy::Skip,
            normalize: Normalize::None,
            configurations: DEFAULT_ENERGIES
                .into_iter()
                .map(ConfigurationEntry::from_energy)
                .collect(),
        }
    }
}

impl SweepFile {
    /// Resolves every entry into a sweep configuration.
    ///
    /// Entries without a style get a dashed line, cycling through the default
    /// colors in order.
    pub(crate) fn configurations(&self, base_seed: u64) -> Vec<Configuration<StringParams>> {
        self.configurations
            .iter()
            .zip(0_u64..)
            .map(|(entry, index)| {
                let style = entry.style.unwrap_or_else(|| default_style(index));
                Configuration {
                    label: entry
                        .label
                        .clone()
                        .unwrap_or_else(|| energy_label(entry.energy)),
                    style,
                    params: StringParams {
                        energy: entry.energy,
                        quark: self.model.quark,
                        massless_quarks: self.model.massless_quarks,
                        pt_sigma: self.model.pt_sigma,
                        hadron_decays: self.model.hadron_decays,
                        seed: entry.seed.unwrap_or(base_seed.wrapping_add(index)),
                    },
                    trials: entry.trials.unwrap_or(self.trials),
                }
            })
            .collect()
    }
}

pub(crate) fn energy_label(energy: f64) -> String {
    format!("{energy:.2} GeV string")
}

fn default_style(index: u64) -> SeriesStyle {
    let colors = DEFAULT_COLORS.len() as u64;
    #[expect(clippy::cast_possible_truncation)]
    let name = DEFAULT_COLORS[(index % colors) as usize];
    SeriesStyle::new(LineDash::Dashed, Color::named(name).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sweep_matches_reference_run() {
        let file = SweepFile::default();
        let configurations = file.configurations(100);
        let labels: Vec<_> = configurations.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(
            labels,
            ["5.00 GeV string", "20.00 GeV string", "100.00 GeV string"]
        );
        assert!(configurations.iter().all(|c| c.trials == 1_000_000));
        assert_eq!(configurations[2].style, "--,indianred".parse().unwrap());
        assert_eq!(configurations[1].params.seed, 101);
    }

    #[test]
    fn test_partial_sweep_file() {
        let json = r#"{
            "trials": 500,
            "model": { "pt_sigma": 0.3 },
            "configurations": [
                { "energy": 10.0 },
                { "energy": 40.0, "style": "dotted, navy", "label": "forty", "trials": 7, "seed": 9 }
            ]
        }"#;
        let file: SweepFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.histogram, HistogramSpec::primary_rapidity());
        let configurations = file.configurations(0);
        assert_eq!(configurations[0].label, "10.00 GeV string");
        assert_eq!(configurations[0].trials, 500);
        assert_eq!(configurations[1].label, "forty");
        assert_eq!(configurations[1].trials, 7);
        assert_eq!(configurations[1].params.seed, 9);
        assert_eq!(configurations[1].params.pt_sigma, 0.3);
        assert_eq!(configurations[1].style.dash, LineDash::Dotted);
    }
}
