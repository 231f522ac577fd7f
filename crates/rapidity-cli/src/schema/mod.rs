pub(crate) mod saved_plot;
pub(crate) mod stats_report;
