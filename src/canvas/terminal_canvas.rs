//! Canvas that paints cells straight onto the terminal with ANSI escapes.
//!
//! Every paint saves the cursor, hides it, moves to each row of the
//! placement, writes the cells, then resets attributes, shows the cursor and
//! restores its position, so the program owning the terminal is not
//! disturbed.

use std::fmt::Write as _;
use std::io::{self, Write};

use super::cells::{render_cells, Cell};
use super::{Canvas, Painter};
use crate::geometry::Placement;
use crate::loader::ImageHandle;

const SAVE_CURSOR: &str = "\x1b7";
const RESTORE_CURSOR: &str = "\x1b8";
const HIDE_CURSOR: &str = "\x1b[?25l";
const SHOW_CURSOR: &str = "\x1b[?25h";
const RESET_ATTRS: &str = "\x1b[0m";

/// Area of the terminal currently covered by the overlay, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PaintedArea {
    x: u16,
    y: u16,
    width: u16,
    height: u16,
}

/// ANSI cell painter writing to `W` (stdout in production).
pub struct TerminalCanvas<W: Write> {
    out: W,
    painter: Painter,
    invert: bool,
    placement: Option<Placement>,
    painted: Option<PaintedArea>,
}

impl TerminalCanvas<io::Stdout> {
    /// Canvas painting on the process's stdout.
    pub fn stdout(painter: Painter, invert: bool) -> Self {
        Self::new(io::stdout(), painter, invert)
    }
}

impl<W: Write> TerminalCanvas<W> {
    pub fn new(out: W, painter: Painter, invert: bool) -> Self {
        Self {
            out,
            painter,
            invert,
            placement: None,
            painted: None,
        }
    }

    pub fn painter(&self) -> Painter {
        self.painter
    }

    /// Whether an image is currently on screen.
    pub fn has_painted(&self) -> bool {
        self.painted.is_some()
    }

    /// The underlying writer, for inspecting output in tests.
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    fn write_frame(&mut self, body: &str) -> io::Result<()> {
        let mut output = String::with_capacity(body.len() + 32);
        output.push_str(SAVE_CURSOR);
        output.push_str(HIDE_CURSOR);
        output.push_str(body);
        output.push_str(RESET_ATTRS);
        output.push_str(SHOW_CURSOR);
        output.push_str(RESTORE_CURSOR);

        self.out.write_all(output.as_bytes())?;
        self.out.flush()
    }
}

/// Append a cursor move to the 0-based cell (x, y).
fn move_to(output: &mut String, x: u16, y: u16) {
    // ANSI coordinates are 1-based, row first
    let _ = write!(output, "\x1b[{};{}H", y as u32 + 1, x as u32 + 1);
}

fn paint_cells(output: &mut String, cells: &[Cell], area: PaintedArea) {
    for (row, line) in cells.chunks(area.width as usize).enumerate() {
        move_to(output, area.x, area.y + row as u16);
        let mut fg = None;
        let mut bg = None;
        for cell in line {
            if fg != Some(cell.fg) {
                let [r, g, b] = cell.fg;
                let _ = write!(output, "\x1b[38;2;{};{};{}m", r, g, b);
                fg = Some(cell.fg);
            }
            if cell.bg != bg {
                match cell.bg {
                    Some([r, g, b]) => {
                        let _ = write!(output, "\x1b[48;2;{};{};{}m", r, g, b);
                    }
                    None => output.push_str("\x1b[49m"),
                }
                bg = cell.bg;
            }
            output.push(cell.ch);
        }
        output.push_str(RESET_ATTRS);
    }
}

fn blank_area(output: &mut String, area: PaintedArea) {
    let spaces = " ".repeat(area.width as usize);
    for row in 0..area.height {
        move_to(output, area.x, area.y + row);
        output.push_str(&spaces);
    }
}

impl<W: Write> Canvas for TerminalCanvas<W> {
    fn init(&mut self, placement: &Placement) {
        self.placement = Some(*placement);
    }

    fn draw(&mut self, image: &ImageHandle) -> io::Result<()> {
        let placement = self.placement.ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "draw called before init")
        })?;

        let (width, height) = placement.cells_for(image.width(), image.height());
        if width == 0 || height == 0 {
            return Ok(());
        }

        let cells = render_cells(image, width, height, self.painter, self.invert);
        let area = PaintedArea {
            x: placement.x,
            y: placement.y,
            width,
            height,
        };

        let mut body = String::new();
        paint_cells(&mut body, &cells, area);
        // recorded before writing so a partial write is still cleared later
        self.painted = Some(area);
        self.write_frame(&body)
    }

    fn clear(&mut self) -> io::Result<()> {
        let Some(area) = self.painted.take() else {
            return Ok(());
        };
        let mut body = String::new();
        blank_area(&mut body, area);
        self.write_frame(&body)
    }
}
