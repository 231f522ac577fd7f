use std::path::PathBuf;

use anyhow::Context;

use crate::{schema::saved_plot::SavedPlot, util};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct RenderArg {
    /// Histograms saved by `sweep --save-histograms`
    input: PathBuf,
    /// Plot output path (.py for a matplotlib script, .svg for SVG)
    #[arg(long)]
    output: PathBuf,
    /// Replace the plot title
    #[arg(long)]
    title: Option<String>,
}

pub(crate) fn run(arg: &RenderArg) -> anyhow::Result<()> {
    let RenderArg {
        input,
        output,
        title,
    } = arg;
    let mut saved: SavedPlot = util::read_json_file("saved histograms", input)?;
    if let Some(title) = title {
        saved.frame.title.clone_from(title);
    }
    eprintln!(
        "Loaded {} series from {}",
        saved.series.len(),
        input.display()
    );

    let mut composer = saved
        .into_composer()
        .with_context(|| format!("Inconsistent histograms in {}", input.display()))?;
    composer
        .render(output)
        .with_context(|| format!("Failed to render plot to {}", output.display()))?;
    eprintln!("Plot written to {}", output.display());
    Ok(())
}
