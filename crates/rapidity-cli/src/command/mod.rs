use clap::{Parser, Subcommand};

use self::{render::RenderArg, sweep::SweepArg};

mod render;
mod sweep;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Fragment strings of several energies and plot primary hadron rapidities
    Sweep(#[clap(flatten)] SweepArg),
    /// Re-render a plot from saved histograms
    Render(#[clap(flatten)] RenderArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Sweep(SweepArg::default())) {
        Mode::Sweep(arg) => sweep::run(&arg)?,
        Mode::Render(arg) => render::run(&arg)?,
    }
    Ok(())
}
