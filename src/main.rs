use clap::Parser;
use std::io;
use std::path::Path;

use termlayer::cache::ImageCache;
use termlayer::cancel::{install_ctrlc_handler, CancelSignal};
use termlayer::canvas::TerminalCanvas;
use termlayer::cli::{handle_cache_action, handle_config_action, Args, Command, LayerArgs};
use termlayer::config::Config;
use termlayer::coordinator::{Coordinator, CoordinatorOptions};
use termlayer::loader::DiskLoader;
use termlayer::process;

/// Run the `layer` subcommand until stdin closes or a stop is requested.
fn run_layer(layer: &LayerArgs, config_path: Option<&Path>) -> Result<(), String> {
    let mut config = Config::load(config_path).map_err(|e| e.to_string())?;
    layer.apply_to(&mut config);
    let options = CoordinatorOptions::from_config(&config).map_err(|e| e.to_string())?;

    if let Err(e) = process::silence_stderr(config.layer.silent) {
        eprintln!("Warning: unable to silence stderr: {}", e);
    }

    let loader = if config.layer.no_cache {
        DiskLoader::uncached()
    } else {
        DiskLoader::with_cache(
            ImageCache::new(config.cache.resolved_dir()),
            config.cache.max_size_mb,
        )
    };

    let painter = config.layer.output;
    let invert = config.layer.invert;
    let mut coordinator = Coordinator::start(
        options,
        |_| TerminalCanvas::stdout(painter, invert),
        loader,
    );

    let cancel = CancelSignal::new();
    if let Err(e) = install_ctrlc_handler(&cancel) {
        log::warn!("Failed to set Ctrl+C handler: {}", e);
    }

    let stdin = io::stdin();
    coordinator
        .run(stdin.lock(), &cancel)
        .map_err(|e| e.to_string())?;
    Ok(())
}

fn main() {
    let args = Args::parse();
    let config_path = args.config.as_deref();

    let result = match args.command {
        Command::Layer(layer) => run_layer(&layer, config_path),
        Command::Cache { action } => Config::load(config_path)
            .map_err(|e| e.to_string())
            .and_then(|config| handle_cache_action(action, &config)),
        Command::Config { action } => handle_config_action(action, config_path),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
