mod cli;
mod commands;
mod fetch_ui;
mod format;
mod output;

use clap::Parser;
use commands::AppContext;
use urlpad::{config, error::Result, utils};

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    // Initialize logger; -g turns on debug output for the pad and its pipeline
    let default_filter = if args.debug { "urlpad=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let pad_path = match &args.pad {
        Some(path) => path.clone(),
        None => utils::get_default_pad_dir().join("pad.json"),
    };

    // Load configuration
    let cfg = if let Some(config_path) = &args.config {
        config::Config::load_from_path(config_path)?
    } else {
        config::Config::load()
    };
    log::debug!("Using pad {}", pad_path.display());

    let ctx = AppContext {
        config: &cfg,
        pad_path: &pad_path,
        no_color: args.nc,
    };
    cli::handle_args(args, &ctx)
}
