//! Conversion of a decoded image into a grid of colored terminal cells.

use super::Painter;
use crate::loader::ImageHandle;

/// ASCII density ramp (10 levels), darkest (space) to brightest (@).
pub const DENSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Braille base character (U+2800, empty braille pattern).
pub const BRAILLE_BASE: char = '\u{2800}';

const HALF_BLOCK: char = '▀';
const BRAILLE_THRESHOLD: u8 = 128;

/// One terminal cell: a glyph, its foreground color and optional background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: [u8; 3],
    pub bg: Option<[u8; 3]>,
}

/// Perceived brightness of an RGB color (ITU-R BT.601, integer math).
pub fn brightness(rgb: [u8; 3]) -> u8 {
    let [r, g, b] = rgb.map(u32::from);
    ((299 * r + 587 * g + 114 * b) / 1000) as u8
}

/// Convert a 2x4 dot grid to a braille character.
///
/// `grid[x][y]` is the dot in column `x`, row `y`. Bit positions:
/// ```text
/// [0,0]=1   [1,0]=8
/// [0,1]=2   [1,1]=16
/// [0,2]=4   [1,2]=32
/// [0,3]=64  [1,3]=128
/// ```
pub fn grid_to_braille(grid: [[bool; 4]; 2]) -> char {
    const BITS: [[u8; 4]; 2] = [[0x01, 0x02, 0x04, 0x40], [0x08, 0x10, 0x20, 0x80]];
    let mut code = 0u8;
    for (x, column) in grid.iter().enumerate() {
        for (y, &on) in column.iter().enumerate() {
            if on {
                code |= BITS[x][y];
            }
        }
    }
    char::from_u32(BRAILLE_BASE as u32 + code as u32).unwrap_or(BRAILLE_BASE)
}

/// Maps a sample grid laid over the image back to averaged pixel colors.
struct Sampler<'a> {
    image: &'a ImageHandle,
    grid_width: u32,
    grid_height: u32,
}

impl Sampler<'_> {
    /// Average color of the image region under grid position (gx, gy).
    fn sample(&self, gx: u32, gy: u32) -> [u8; 3] {
        let (w, h) = (self.image.width(), self.image.height());
        let (x0, x1) = span(gx, self.grid_width, w);
        let (y0, y1) = span(gy, self.grid_height, h);

        let mut sum = [0u32; 3];
        let mut count = 0u32;
        for y in y0..y1 {
            for x in x0..x1 {
                let px = self.image.pixel(x, y);
                for (acc, v) in sum.iter_mut().zip(px) {
                    *acc += v as u32;
                }
                count += 1;
            }
        }
        if count == 0 {
            return [0, 0, 0];
        }
        sum.map(|v| (v / count) as u8)
    }
}

/// Pixel range covered by grid slot `index` of `slots` over `len` pixels.
/// Always at least one pixel wide when `len > 0`.
fn span(index: u32, slots: u32, len: u32) -> (u32, u32) {
    let start = (index as u64 * len as u64 / slots as u64) as u32;
    let end = ((index as u64 + 1) * len as u64 / slots as u64) as u32;
    let start = start.min(len.saturating_sub(1));
    (start, end.max(start + 1).min(len))
}

/// Render `image` into `cols` x `rows` cells, row-major.
///
/// Returns an empty vector when either the grid or the image is empty.
pub fn render_cells(
    image: &ImageHandle,
    cols: u16,
    rows: u16,
    painter: Painter,
    invert: bool,
) -> Vec<Cell> {
    if cols == 0 || rows == 0 || image.width() == 0 || image.height() == 0 {
        return Vec::new();
    }

    let (per_x, per_y) = painter.samples_per_cell();
    let sampler = Sampler {
        image,
        grid_width: cols as u32 * per_x,
        grid_height: rows as u32 * per_y,
    };
    let level = |rgb: [u8; 3]| {
        let b = brightness(rgb);
        if invert {
            255 - b
        } else {
            b
        }
    };

    let mut cells = Vec::with_capacity(cols as usize * rows as usize);
    for cy in 0..rows as u32 {
        for cx in 0..cols as u32 {
            let cell = match painter {
                Painter::Halfblock => Cell {
                    ch: HALF_BLOCK,
                    fg: sampler.sample(cx, cy * 2),
                    bg: Some(sampler.sample(cx, cy * 2 + 1)),
                },
                Painter::Ascii => {
                    let color = sampler.sample(cx, cy);
                    let idx = level(color) as usize * (DENSITY_RAMP.len() - 1) / 255;
                    Cell {
                        ch: DENSITY_RAMP[idx],
                        fg: color,
                        bg: None,
                    }
                }
                Painter::Braille => {
                    let mut grid = [[false; 4]; 2];
                    let mut sum = [0u32; 3];
                    for (dx, column) in grid.iter_mut().enumerate() {
                        for (dy, dot) in column.iter_mut().enumerate() {
                            let color = sampler.sample(cx * 2 + dx as u32, cy * 4 + dy as u32);
                            *dot = level(color) >= BRAILLE_THRESHOLD;
                            for (acc, v) in sum.iter_mut().zip(color) {
                                *acc += v as u32;
                            }
                        }
                    }
                    Cell {
                        ch: grid_to_braille(grid),
                        fg: sum.map(|v| (v / 8) as u8),
                        bg: None,
                    }
                }
            };
            cells.push(cell);
        }
    }
    cells
}
