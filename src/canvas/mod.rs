//! Backend canvases: paint and erase the overlay image on the terminal.
//!
//! The coordinator only relies on the [`Canvas`] contract. The shipped
//! implementation, [`TerminalCanvas`], paints cells with ANSI escape
//! sequences using one of several [`Painter`] styles:
//!
//! - `Halfblock` - two vertical pixels per cell using `▀` with 24-bit colors
//! - `Ascii` - density ramp characters colored per cell
//! - `Braille` - 2x4 dot matrix per cell

mod cells;
mod terminal_canvas;

pub use cells::{brightness, grid_to_braille, render_cells, Cell, BRAILLE_BASE, DENSITY_RAMP};
pub use terminal_canvas::TerminalCanvas;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::geometry::Placement;
use crate::loader::ImageHandle;

/// Capabilities the coordinator needs from a rendering backend.
///
/// `clear()` must fully remove whatever the previous `draw()` put on screen
/// before any later `draw()` happens.
pub trait Canvas {
    /// Prepare for drawing at `placement`.
    fn init(&mut self, placement: &Placement);
    /// Paint `image` at the placement given to the last `init`.
    fn draw(&mut self, image: &ImageHandle) -> std::io::Result<()>;
    /// Erase the last painted image. Does nothing if nothing is painted.
    fn clear(&mut self) -> std::io::Result<()>;
}

/// How image pixels are turned into terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Painter {
    #[default]
    Halfblock,
    Ascii,
    Braille,
}

impl Painter {
    pub fn name(&self) -> &'static str {
        match self {
            Painter::Halfblock => "halfblock",
            Painter::Ascii => "ascii",
            Painter::Braille => "braille",
        }
    }

    /// Image sub-pixels sampled per cell, as (columns, rows).
    pub fn samples_per_cell(&self) -> (u32, u32) {
        match self {
            Painter::Halfblock => (1, 2),
            Painter::Ascii => (1, 1),
            Painter::Braille => (2, 4),
        }
    }
}

impl fmt::Display for Painter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown painter name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown output '{0}' (expected halfblock, ascii or braille)")]
pub struct UnknownPainter(pub String);

impl FromStr for Painter {
    type Err = UnknownPainter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "halfblock" => Ok(Painter::Halfblock),
            "ascii" => Ok(Painter::Ascii),
            "braille" => Ok(Painter::Braille),
            _ => Err(UnknownPainter(s.to_string())),
        }
    }
}
