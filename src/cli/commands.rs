//! Subcommand handlers for cache and config actions.

use std::path::{Path, PathBuf};

use super::args::{CacheAction, ConfigAction};
use crate::cache::ImageCache;
use crate::config::{default_path, Config, DEFAULT_CONFIG_TEMPLATE};

/// Format bytes as human-readable string (KB, MB, GB)
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Handle cache subcommand actions against the configured cache directory.
pub fn handle_cache_action(action: CacheAction, config: &Config) -> Result<(), String> {
    let cache = ImageCache::new(config.cache.resolved_dir());

    match action {
        CacheAction::List => {
            let entries = cache
                .list_entries()
                .map_err(|e| format!("Failed to list cache entries: {}", e))?;

            if entries.is_empty() {
                println!("Cache is empty ({}).", cache.cache_dir().display());
                return Ok(());
            }

            println!("Cached images in {}:\n", cache.cache_dir().display());
            for entry in &entries {
                println!("  {} {}", entry.key, format_size(entry.size_bytes));
            }

            let total_size = cache
                .total_size_bytes()
                .map_err(|e| format!("Failed to calculate total size: {}", e))?;
            println!(
                "\nTotal: {} images, {} (limit {} MB)",
                entries.len(),
                format_size(total_size),
                config.cache.max_size_mb
            );
            Ok(())
        }
        CacheAction::Clear => {
            let count = cache
                .clear_all()
                .map_err(|e| format!("Failed to clear cache: {}", e))?;

            if count == 0 {
                println!("Cache is already empty.");
            } else {
                println!("Removed {} cached image{}.", count, if count == 1 { "" } else { "s" });
            }
            Ok(())
        }
    }
}

/// Handle config subcommand actions. `path` overrides the default location.
pub fn handle_config_action(action: ConfigAction, path: Option<&Path>) -> Result<(), String> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(default_path);

    match action {
        ConfigAction::Show => {
            let config = Config::load(Some(&config_path)).map_err(|e| e.to_string())?;
            if config_path.exists() {
                println!("Config file: {} (exists)", config_path.display());
            } else {
                println!("Config file: {} (not found, using defaults)", config_path.display());
            }
            println!();
            print!("{}", config.to_toml().map_err(|e| e.to_string())?);
            Ok(())
        }
        ConfigAction::Init => {
            init_config_file(&config_path)?;
            println!("Created config file: {}", config_path.display());
            Ok(())
        }
    }
}

/// Write the default config template to `path`, refusing to overwrite.
pub fn init_config_file(path: &Path) -> Result<(), String> {
    if path.exists() {
        return Err(format!(
            "Config file already exists: {}\nUse 'termlayer config show' to view current settings.",
            path.display()
        ));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Error creating config directory: {}", e))?;
    }

    std::fs::write(path, DEFAULT_CONFIG_TEMPLATE)
        .map_err(|e| format!("Error writing config file: {}", e))
}
