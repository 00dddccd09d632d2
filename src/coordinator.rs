//! Process coordinator: owns the diagnostic sink, the overlay and its canvas,
//! and runs the command loop between an ordered startup and shutdown.
//!
//! Startup order: diagnostic sink, cache directory, terminal context, canvas,
//! empty overlay. Shutdown happens exactly once, after the loop returns or
//! when the coordinator is dropped, and consists of an unconditional canvas
//! clear followed by flushing and closing the sink.

use log::LevelFilter;
use std::io::BufRead;
use std::path::PathBuf;

use crate::cache::ImageCache;
use crate::cancel::CancelSignal;
use crate::canvas::Canvas;
use crate::command_loop::{CommandLoop, LoopSummary};
use crate::config::{Config, ConfigError};
use crate::loader::ImageLoader;
use crate::logging::{default_log_path, DiagnosticSink};
use crate::overlay::Overlay;
use crate::terminal::TerminalContext;

/// Errors raised by the coordinator.
#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    #[error("coordinator has already shut down")]
    AlreadyShutDown,
}

/// Startup parameters for a [`Coordinator`].
#[derive(Debug, Clone)]
pub struct CoordinatorOptions {
    /// Log file; `None` runs without diagnostics
    pub log_path: Option<PathBuf>,
    pub log_level: LevelFilter,
    /// Image cache directory to create at startup
    pub cache_dir: Option<PathBuf>,
    /// Fixed terminal metrics; `None` queries the controlling terminal
    pub terminal: Option<TerminalContext>,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            log_path: None,
            log_level: LevelFilter::Info,
            cache_dir: None,
            terminal: None,
        }
    }
}

impl CoordinatorOptions {
    /// Options for the `layer` command as described by `config`.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            log_path: Some(config.log.path.clone().unwrap_or_else(default_log_path)),
            log_level: config.log.level_filter()?,
            cache_dir: Some(config.cache.resolved_dir()),
            terminal: None,
        })
    }
}

/// Owner of every long-lived piece of state in the process.
pub struct Coordinator<C: Canvas, L: ImageLoader> {
    sink: DiagnosticSink,
    terminal: TerminalContext,
    loader: L,
    overlay: Overlay<C>,
    shut_down: bool,
}

impl<C: Canvas, L: ImageLoader> Coordinator<C, L> {
    /// Run startup in order and return a coordinator with an empty overlay.
    ///
    /// Nothing here is fatal: a sink that cannot be installed degrades to no
    /// logging and a cache directory that cannot be created is only logged.
    /// `make_canvas` is called once the terminal context is known.
    pub fn start<F>(options: CoordinatorOptions, make_canvas: F, loader: L) -> Self
    where
        F: FnOnce(&TerminalContext) -> C,
    {
        let sink = match &options.log_path {
            Some(path) => DiagnosticSink::install_or_disabled(path, options.log_level),
            None => DiagnosticSink::disabled(),
        };
        log::info!("Started termlayer {}", env!("CARGO_PKG_VERSION"));

        if let Some(dir) = &options.cache_dir {
            if let Err(e) = ImageCache::new(dir.clone()).ensure_dir_exists() {
                log::warn!("Unable to create cache directory {}: {}", dir.display(), e);
            }
        }

        let terminal = options.terminal.unwrap_or_else(TerminalContext::query);
        log::debug!(
            "Terminal {}x{} cells, {}x{} px, pid {}, ppid {:?}, tty {:?}",
            terminal.cols,
            terminal.rows,
            terminal.pixel_width,
            terminal.pixel_height,
            terminal.pid,
            terminal.ppid,
            terminal.tty
        );

        let canvas = make_canvas(&terminal);

        Self {
            sink,
            terminal,
            loader,
            overlay: Overlay::new(canvas),
            shut_down: false,
        }
    }

    /// Run the command loop over `input`, then shut down.
    ///
    /// # Errors
    /// Returns [`CoordinatorError::AlreadyShutDown`] if called after shutdown.
    pub fn run<R: BufRead>(
        &mut self,
        input: R,
        cancel: &CancelSignal,
    ) -> Result<LoopSummary, CoordinatorError> {
        if self.shut_down {
            return Err(CoordinatorError::AlreadyShutDown);
        }

        let summary = CommandLoop::new(&self.terminal, &self.loader, &mut self.overlay).run(input, cancel);
        log::info!(
            "Command loop ended ({:?}): {} lines, {} dispatched, {} parse errors",
            summary.exit,
            summary.lines,
            summary.dispatched,
            summary.parse_errors
        );

        self.shutdown();
        Ok(summary)
    }

    /// Clear the canvas and close the sink. Only the first call does anything.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;

        log::info!("Shutting down.");
        self.overlay.clear_all();
        self.sink.flush();
        self.sink.close();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    pub fn overlay(&self) -> &Overlay<C> {
        &self.overlay
    }

    pub fn terminal(&self) -> &TerminalContext {
        &self.terminal
    }

    pub fn sink(&self) -> &DiagnosticSink {
        &self.sink
    }
}

impl<C: Canvas, L: ImageLoader> Drop for Coordinator<C, L> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
