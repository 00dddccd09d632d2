//! CLI argument parsing with clap.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use super::enums::Output;
use crate::config::Config;

/// Draws images over the terminal, driven by JSON commands on stdin
#[derive(Parser, Debug)]
#[command(name = "termlayer")]
#[command(version, about = "Image overlay for terminal programs", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read commands from stdin and display images
    Layer(LayerArgs),
    /// Image cache management
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(ClapArgs, Debug, Clone, Default, PartialEq)]
pub struct LayerArgs {
    /// Redirect stderr to /dev/null
    #[arg(long, short)]
    pub silent: bool,

    /// Cell painter
    #[arg(long, short)]
    pub output: Option<Output>,

    /// Decode every image from scratch
    #[arg(long)]
    pub no_cache: bool,

    /// Invert brightness (for light terminals)
    #[arg(long)]
    pub invert: bool,
}

impl LayerArgs {
    /// Merge settings: CLI args > config file > built-in defaults.
    pub fn apply_to(&self, config: &mut Config) {
        config.layer.silent |= self.silent;
        config.layer.no_cache |= self.no_cache;
        config.layer.invert |= self.invert;
        if let Some(output) = self.output {
            config.layer.output = output.into();
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum CacheAction {
    /// List cached images
    List,
    /// Remove all cached images
    Clear,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Painter;

    fn layer_args(argv: &[&str]) -> LayerArgs {
        let mut full = vec!["termlayer", "layer"];
        full.extend_from_slice(argv);
        match Args::parse_from(full).command {
            Command::Layer(args) => args,
            other => panic!("Expected layer subcommand, got {:?}", other),
        }
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Args::try_parse_from(["termlayer"]).is_err());
    }

    #[test]
    fn test_layer_defaults() {
        let args = layer_args(&[]);
        assert_eq!(args, LayerArgs::default());
    }

    #[test]
    fn test_layer_silent_flag() {
        assert!(layer_args(&["--silent"]).silent);
        assert!(layer_args(&["-s"]).silent);
    }

    #[test]
    fn test_layer_output_values() {
        assert_eq!(layer_args(&["--output", "halfblock"]).output, Some(Output::Halfblock));
        assert_eq!(layer_args(&["--output", "ascii"]).output, Some(Output::Ascii));
        assert_eq!(layer_args(&["-o", "braille"]).output, Some(Output::Braille));
    }

    #[test]
    fn test_layer_rejects_unknown_output() {
        assert!(Args::try_parse_from(["termlayer", "layer", "--output", "sixel"]).is_err());
    }

    #[test]
    fn test_layer_no_cache_and_invert() {
        let args = layer_args(&["--no-cache", "--invert"]);
        assert!(args.no_cache);
        assert!(args.invert);
    }

    #[test]
    fn test_config_option_is_global() {
        let args = Args::parse_from(["termlayer", "layer", "--config", "/tmp/config.toml"]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/config.toml")));

        let args = Args::parse_from(["termlayer", "-c", "/tmp/test.toml", "cache", "list"]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/test.toml")));
    }

    #[test]
    fn test_cache_subcommands() {
        let args = Args::parse_from(["termlayer", "cache", "list"]);
        assert!(matches!(args.command, Command::Cache { action: CacheAction::List }));

        let args = Args::parse_from(["termlayer", "cache", "clear"]);
        assert!(matches!(args.command, Command::Cache { action: CacheAction::Clear }));
    }

    #[test]
    fn test_config_subcommands() {
        let args = Args::parse_from(["termlayer", "config", "show"]);
        assert!(matches!(args.command, Command::Config { action: ConfigAction::Show }));

        let args = Args::parse_from(["termlayer", "config", "init"]);
        assert!(matches!(args.command, Command::Config { action: ConfigAction::Init }));
    }

    #[test]
    fn test_cli_overrides_config() {
        let mut config = Config::default();
        config.layer.output = Painter::Braille;
        config.layer.invert = true;

        layer_args(&["--output", "ascii", "--silent"]).apply_to(&mut config);
        assert_eq!(config.layer.output, Painter::Ascii);
        assert!(config.layer.silent);
        // flags only ever switch things on
        assert!(config.layer.invert);
    }

    #[test]
    fn test_no_flags_keep_config() {
        let mut config = Config::default();
        config.layer.output = Painter::Braille;
        let before = config.clone();
        LayerArgs::default().apply_to(&mut config);
        assert_eq!(config, before);
    }
}
