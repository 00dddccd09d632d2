//! The command loop: read a line, parse it, apply it, repeat.
//!
//! Commands are handled one at a time on the calling thread, in arrival
//! order. A slow canvas or loader therefore delays every later command;
//! there are no per-command timeouts. A line is buffered whole before it is
//! parsed, with no length limit, until a newline or end of input arrives.
//!
//! Cancellation is checked after each completed read, before the line is
//! processed. A read that is blocked waiting for input is not interrupted,
//! so a stop request takes effect at the next line (or end of input).

use std::io::{BufRead, ErrorKind};
use std::path::Path;

use crate::cancel::CancelSignal;
use crate::canvas::Canvas;
use crate::command::{self, Command};
use crate::geometry;
use crate::loader::ImageLoader;
use crate::overlay::Overlay;
use crate::terminal::TerminalContext;

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The input stream reached end-of-file.
    EndOfInput,
    /// The cancellation signal was observed at a read boundary.
    Cancelled,
    /// Reading from the input stream itself failed.
    ReadError,
}

/// Counters describing one run of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSummary {
    /// Lines read and processed (excludes a line read after cancellation)
    pub lines: usize,
    /// Lines that parsed into a command and were dispatched
    pub dispatched: usize,
    /// Lines rejected by the parser
    pub parse_errors: usize,
    /// Dispatched commands with an unsupported action
    pub unrecognized: usize,
    pub exit: LoopExit,
}

impl Default for LoopSummary {
    fn default() -> Self {
        Self {
            lines: 0,
            dispatched: 0,
            parse_errors: 0,
            unrecognized: 0,
            exit: LoopExit::EndOfInput,
        }
    }
}

/// Borrowed view of everything a command can touch.
pub struct CommandLoop<'a, C: Canvas, L: ImageLoader> {
    ctx: &'a TerminalContext,
    loader: &'a L,
    overlay: &'a mut Overlay<C>,
}

impl<'a, C: Canvas, L: ImageLoader> CommandLoop<'a, C, L> {
    pub fn new(ctx: &'a TerminalContext, loader: &'a L, overlay: &'a mut Overlay<C>) -> Self {
        Self {
            ctx,
            loader,
            overlay,
        }
    }

    /// Process `input` line by line until end of input, cancellation or a
    /// read failure. Malformed lines are logged and skipped.
    pub fn run<R: BufRead>(&mut self, mut input: R, cancel: &CancelSignal) -> LoopSummary {
        let mut summary = LoopSummary::default();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            match input.read_until(b'\n', &mut buf) {
                Ok(0) => {
                    summary.exit = LoopExit::EndOfInput;
                    break;
                }
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    log::error!("Failed to read command input: {}", e);
                    summary.exit = LoopExit::ReadError;
                    break;
                }
            }

            if cancel.is_cancelled() {
                log::info!("Stop requested, leaving command loop.");
                summary.exit = LoopExit::Cancelled;
                break;
            }

            summary.lines += 1;
            let line = trim_line_ending(&buf);
            match command::parse_bytes(line) {
                Ok(cmd) => {
                    log::info!(
                        "Command received ({}): {}",
                        cmd.name(),
                        String::from_utf8_lossy(line)
                    );
                    if matches!(cmd, Command::Unrecognized { .. }) {
                        summary.unrecognized += 1;
                    }
                    self.dispatch(cmd);
                    summary.dispatched += 1;
                }
                Err(e) => {
                    log::error!("There was an error parsing the command: {}", e);
                    summary.parse_errors += 1;
                }
            }
        }

        summary
    }

    /// Apply one command to the overlay.
    pub fn dispatch(&mut self, cmd: Command) {
        match cmd {
            Command::AddImage {
                x,
                y,
                max_width,
                max_height,
                path,
            } => {
                let placement = geometry::compute(self.ctx, x, y, max_width, max_height);
                let image = self.loader.load(self.ctx, &placement, Path::new(&path));
                self.overlay.apply_add(placement, image);
            }
            Command::RemoveImage => self.overlay.apply_remove(),
            Command::Unrecognized { raw } => {
                log::warn!("Command not supported: {}", raw);
            }
        }
    }
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
