//! Terminal and process identification.
//!
//! Queried once when the coordinator starts; the result is treated as fixed
//! for the rest of the process lifetime.

use std::path::PathBuf;

/// Fallback cell size in pixels when the terminal does not report pixels.
pub const DEFAULT_CELL_WIDTH: u32 = 8;
pub const DEFAULT_CELL_HEIGHT: u32 = 16;

/// Cell and pixel metrics of the controlling terminal plus process identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalContext {
    /// Terminal width in cells
    pub cols: u16,
    /// Terminal height in cells
    pub rows: u16,
    /// Terminal width in pixels (0 if unknown)
    pub pixel_width: u32,
    /// Terminal height in pixels (0 if unknown)
    pub pixel_height: u32,
    /// Our own process id
    pub pid: u32,
    /// Parent process id, when it could be determined
    pub ppid: Option<u32>,
    /// Device path of the controlling terminal, when it could be determined
    pub tty: Option<PathBuf>,
}

impl Default for TerminalContext {
    fn default() -> Self {
        Self::with_size(80, 24, 0, 0)
    }
}

impl TerminalContext {
    /// Build a context from known metrics, without touching the system.
    pub fn with_size(cols: u16, rows: u16, pixel_width: u32, pixel_height: u32) -> Self {
        Self {
            cols,
            rows,
            pixel_width,
            pixel_height,
            pid: std::process::id(),
            ppid: None,
            tty: None,
        }
    }

    /// Query the controlling terminal and the process table.
    pub fn query() -> Self {
        let (cols, rows, pixel_width, pixel_height) = match crossterm::terminal::window_size() {
            Ok(ws) => (ws.columns, ws.rows, ws.width as u32, ws.height as u32),
            Err(e) => {
                log::debug!("window_size unavailable ({}), falling back to cell size", e);
                let (cols, rows) = crossterm::terminal::size().unwrap_or((80, 24));
                (cols, rows, 0, 0)
            }
        };

        let mut ctx = Self::with_size(cols, rows, pixel_width, pixel_height);
        ctx.ppid = read_ppid(ctx.pid);
        ctx.tty = find_tty();
        ctx
    }

    /// Width of one cell in pixels.
    pub fn cell_width(&self) -> u32 {
        if self.pixel_width == 0 || self.cols == 0 {
            DEFAULT_CELL_WIDTH
        } else {
            (self.pixel_width / self.cols as u32).max(1)
        }
    }

    /// Height of one cell in pixels.
    pub fn cell_height(&self) -> u32 {
        if self.pixel_height == 0 || self.rows == 0 {
            DEFAULT_CELL_HEIGHT
        } else {
            (self.pixel_height / self.rows as u32).max(1)
        }
    }
}

/// Extract the parent pid from the contents of `/proc/<pid>/stat`.
///
/// The command name in field 2 may contain spaces and parentheses, so
/// parsing starts after the last `)`.
pub fn parse_stat_ppid(stat: &str) -> Option<u32> {
    let rest = &stat[stat.rfind(')')? + 1..];
    let mut fields = rest.split_whitespace();
    let _state = fields.next()?;
    fields.next()?.parse().ok()
}

#[cfg(target_os = "linux")]
fn read_ppid(pid: u32) -> Option<u32> {
    let stat = std::fs::read_to_string(format!("/proc/{}/stat", pid)).ok()?;
    parse_stat_ppid(&stat)
}

#[cfg(not(target_os = "linux"))]
fn read_ppid(_pid: u32) -> Option<u32> {
    #[cfg(unix)]
    {
        // SAFETY: getppid has no preconditions and cannot fail.
        Some(unsafe { libc::getppid() } as u32)
    }
    #[cfg(not(unix))]
    {
        None
    }
}

#[cfg(target_os = "linux")]
fn find_tty() -> Option<PathBuf> {
    // stdin carries commands, so the terminal is usually on stdout or stderr
    for fd in [1, 2, 0] {
        if let Ok(target) = std::fs::read_link(format!("/proc/self/fd/{}", fd)) {
            if is_tty_path(&target) {
                return Some(target);
            }
        }
    }
    None
}

#[cfg(not(target_os = "linux"))]
fn find_tty() -> Option<PathBuf> {
    None
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn is_tty_path(path: &std::path::Path) -> bool {
    let s = path.to_string_lossy();
    s.starts_with("/dev/pts/") || s.starts_with("/dev/tty")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_default_context() {
        let ctx = TerminalContext::default();
        assert_eq!(ctx.cols, 80);
        assert_eq!(ctx.rows, 24);
        assert_eq!(ctx.pid, std::process::id());
    }

    #[test]
    fn test_cell_size_from_pixels() {
        let ctx = TerminalContext::with_size(100, 50, 1000, 1000);
        assert_eq!(ctx.cell_width(), 10);
        assert_eq!(ctx.cell_height(), 20);
    }

    #[test]
    fn test_cell_size_fallback_without_pixels() {
        let ctx = TerminalContext::with_size(100, 50, 0, 0);
        assert_eq!(ctx.cell_width(), DEFAULT_CELL_WIDTH);
        assert_eq!(ctx.cell_height(), DEFAULT_CELL_HEIGHT);
    }

    #[test]
    fn test_cell_size_never_zero() {
        let ctx = TerminalContext::with_size(200, 100, 50, 50);
        assert_eq!(ctx.cell_width(), 1);
        assert_eq!(ctx.cell_height(), 1);
    }

    #[test]
    fn test_parse_stat_ppid() {
        let stat = "1234 (bash) S 1200 1234 1234 34816 1234 4194304";
        assert_eq!(parse_stat_ppid(stat), Some(1200));
    }

    #[test]
    fn test_parse_stat_ppid_with_tricky_name() {
        let stat = "77 (my (weird) prog) R 42 77 77 0 -1";
        assert_eq!(parse_stat_ppid(stat), Some(42));
    }

    #[test]
    fn test_parse_stat_ppid_garbage() {
        assert_eq!(parse_stat_ppid(""), None);
        assert_eq!(parse_stat_ppid("no parens here"), None);
        assert_eq!(parse_stat_ppid("1 (x) S"), None);
    }

    #[test]
    fn test_is_tty_path() {
        assert!(is_tty_path(Path::new("/dev/pts/3")));
        assert!(is_tty_path(Path::new("/dev/tty1")));
        assert!(!is_tty_path(Path::new("pipe:[12345]")));
        assert!(!is_tty_path(Path::new("/dev/null")));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_read_own_ppid() {
        assert!(read_ppid(std::process::id()).is_some());
    }
}
