//! Solar meter CLI - record daily meter readings and summarize usage.

use clap::Parser;
use log::debug;

#[derive(Parser)]
#[command(
    name = "sol-cli",
    version,
    about = "Residential solar meter reading toolkit"
)]
struct Cli {
    /// JSON settings file with default paths and rates
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: sol_cmd::Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let settings = sol_cmd::config::Settings::load(cli.config.as_deref())?;
    debug!("Using settings {:?}", settings);
    sol_cmd::run(cli.command, &settings)
}
