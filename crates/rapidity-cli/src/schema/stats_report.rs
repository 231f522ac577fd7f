use chrono::{DateTime, Utc};
use rapidity_hist::HistogramSummary;
use rapidity_sweep::{ConfigurationRun, HistogramSpec, StatusRange, SweepOutcome, Termination};
use serde::{Deserialize, Serialize};

/// Statistics of a finished sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsReport {
    /// Timestamp when the sweep finished
    pub generated_at: DateTime<Utc>,
    pub histogram: HistogramSpec,
    /// Status codes of the filled entities
    pub status: StatusRange,
    pub configurations: Vec<ConfigurationReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigurationReport {
    pub label: String,
    pub result: RunResult,
    pub trials_requested: Option<u64>,
    pub trials_completed: u64,
    /// Error that ended or prevented the trial loop
    pub error: Option<String>,
    pub summary: Option<HistogramSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunResult {
    Completed,
    GenerationFailed,
    Skipped,
}

impl StatsReport {
    pub fn new(histogram: &HistogramSpec, status: StatusRange, outcome: &SweepOutcome) -> Self {
        Self {
            generated_at: Utc::now(),
            histogram: histogram.clone(),
            status,
            configurations: outcome.runs().iter().map(ConfigurationReport::new).collect(),
        }
    }
}

impl ConfigurationReport {
    fn new(run: &ConfigurationRun) -> Self {
        match run {
            ConfigurationRun::Filled(run) => {
                let (result, error) = match &run.termination {
                    Termination::Completed => (RunResult::Completed, None),
                    Termination::GenerationFailed(error) => {
                        (RunResult::GenerationFailed, Some(error.to_string()))
                    }
                };
                Self {
                    label: run.label.clone(),
                    result,
                    trials_requested: Some(run.trials_requested),
                    trials_completed: run.trials_completed,
                    error,
                    summary: Some(run.histogram.summary()),
                }
            }
            ConfigurationRun::Skipped { label, error } => Self {
                label: label.clone(),
                result: RunResult::Skipped,
                trials_requested: None,
                trials_completed: 0,
                error: Some(error.to_string()),
                summary: None,
            },
        }
    }
}
