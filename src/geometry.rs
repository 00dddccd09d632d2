//! Placement calculation: where on the terminal an image goes and how big
//! it may get.

use crate::terminal::TerminalContext;

/// A rectangle on the terminal grid, in cells, plus the pixel size of one
/// cell so images can be scaled in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Placement {
    /// Column of the top-left cell (0-based)
    pub x: u16,
    /// Row of the top-left cell (0-based)
    pub y: u16,
    /// Width in cells
    pub width: u16,
    /// Height in cells
    pub height: u16,
    /// Width of one cell in pixels
    pub cell_width: u32,
    /// Height of one cell in pixels
    pub cell_height: u32,
}

impl Placement {
    /// Width of the bounding box in pixels.
    pub fn pixel_width(&self) -> u32 {
        self.width as u32 * self.cell_width
    }

    /// Height of the bounding box in pixels.
    pub fn pixel_height(&self) -> u32 {
        self.height as u32 * self.cell_height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of cells an image of the given pixel size covers, clamped to
    /// this placement.
    pub fn cells_for(&self, img_width: u32, img_height: u32) -> (u16, u16) {
        if self.is_empty() || img_width == 0 || img_height == 0 {
            return (0, 0);
        }
        let cols = img_width.div_ceil(self.cell_width.max(1));
        let rows = img_height.div_ceil(self.cell_height.max(1));
        (
            (cols.min(self.width as u32) as u16).max(1),
            (rows.min(self.height as u32) as u16).max(1),
        )
    }
}

/// Compute the effective placement for a requested bounding box.
///
/// The origin is clamped inside the terminal and the box is clamped to the
/// space remaining to the right of and below the origin. A non-empty
/// terminal always yields at least one cell.
pub fn compute(
    ctx: &TerminalContext,
    x: u32,
    y: u32,
    max_width: u32,
    max_height: u32,
) -> Placement {
    let cell_width = ctx.cell_width();
    let cell_height = ctx.cell_height();

    if ctx.cols == 0 || ctx.rows == 0 {
        return Placement {
            cell_width,
            cell_height,
            ..Placement::default()
        };
    }

    let cols = ctx.cols as u32;
    let rows = ctx.rows as u32;
    let x = x.min(cols - 1);
    let y = y.min(rows - 1);
    let width = max_width.min(cols - x).max(1);
    let height = max_height.min(rows - y).max(1);

    Placement {
        x: x as u16,
        y: y as u16,
        width: width as u16,
        height: height as u16,
        cell_width,
        cell_height,
    }
}

/// Fit an image inside a pixel box, preserving aspect ratio.
///
/// Images that already fit are left at their original size. Returns at
/// least 1x1 for non-empty input, and (0, 0) if either side is empty.
pub fn fit_within(img_width: u32, img_height: u32, box_width: u32, box_height: u32) -> (u32, u32) {
    if img_width == 0 || img_height == 0 || box_width == 0 || box_height == 0 {
        return (0, 0);
    }
    if img_width <= box_width && img_height <= box_height {
        return (img_width, img_height);
    }

    // Compare img_w/img_h against box_w/box_h without floating point
    let width_bound = (img_width as u64) * (box_height as u64) >= (img_height as u64) * (box_width as u64);
    if width_bound {
        let height = (img_height as u64 * box_width as u64 / img_width as u64) as u32;
        (box_width, height.max(1))
    } else {
        let width = (img_width as u64 * box_height as u64 / img_height as u64) as u32;
        (width.max(1), box_height)
    }
}
