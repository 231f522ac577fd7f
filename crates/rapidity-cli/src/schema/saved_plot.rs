use rapidity_plot::{Frame, PlotComposer, PlotError, Series};
use serde::{Deserialize, Serialize};

/// Finished series of a sweep, saved so the plot can be rendered again
/// without regenerating events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedPlot {
    pub frame: Frame,
    /// Series in legend order
    pub series: Vec<Series>,
}

impl SavedPlot {
    pub fn from_composer(composer: &PlotComposer) -> Self {
        Self {
            frame: composer.frame().clone(),
            series: composer.series().to_vec(),
        }
    }

    pub fn into_composer(self) -> Result<PlotComposer, PlotError> {
        let mut composer = PlotComposer::with_frame(self.frame);
        for series in self.series {
            composer.add(series)?;
        }
        Ok(composer)
    }
}
