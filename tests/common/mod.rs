//! Shared test doubles for the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use termlayer::canvas::Canvas;
use termlayer::coordinator::{Coordinator, CoordinatorOptions};
use termlayer::geometry::Placement;
use termlayer::loader::{ImageHandle, ImageLoader};
use termlayer::terminal::TerminalContext;

/// One call made on a [`RecordingCanvas`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Init(Placement),
    Draw { width: u32, height: u32 },
    Clear,
}

/// Canvas that records every call into a log shared with the test.
#[derive(Clone, Default)]
pub struct RecordingCanvas {
    calls: Rc<RefCell<Vec<Call>>>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| matches(c)).count()
    }

    pub fn draws(&self) -> usize {
        self.count(|c| matches!(c, Call::Draw { .. }))
    }

    pub fn clears(&self) -> usize {
        self.count(|c| *c == Call::Clear)
    }
}

impl Canvas for RecordingCanvas {
    fn init(&mut self, placement: &Placement) {
        self.calls.borrow_mut().push(Call::Init(*placement));
    }

    fn draw(&mut self, image: &ImageHandle) -> io::Result<()> {
        self.calls.borrow_mut().push(Call::Draw {
            width: image.width(),
            height: image.height(),
        });
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        self.calls.borrow_mut().push(Call::Clear);
        Ok(())
    }
}

/// Loader that serves fixed images by path and fails for anything else.
#[derive(Default)]
pub struct StubLoader {
    images: HashMap<PathBuf, ImageHandle>,
    requests: RefCell<Vec<PathBuf>>,
}

impl StubLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, path: &str, width: u32, height: u32) -> Self {
        self.images
            .insert(PathBuf::from(path), ImageHandle::solid(width, height, [200, 100, 50]));
        self
    }

    pub fn requests(&self) -> Vec<PathBuf> {
        self.requests.borrow().clone()
    }
}

impl ImageLoader for StubLoader {
    fn load(&self, _ctx: &TerminalContext, _placement: &Placement, path: &Path) -> Option<ImageHandle> {
        self.requests.borrow_mut().push(path.to_path_buf());
        self.images.get(path).cloned()
    }
}

/// An 80x24 terminal with 10x20 pixel cells.
pub fn terminal() -> TerminalContext {
    TerminalContext::with_size(80, 24, 800, 480)
}

/// Coordinator over a recording canvas, without diagnostics or cache.
pub fn coordinator(
    canvas: &RecordingCanvas,
    loader: StubLoader,
) -> Coordinator<RecordingCanvas, StubLoader> {
    let options = CoordinatorOptions {
        terminal: Some(terminal()),
        ..CoordinatorOptions::default()
    };
    let canvas = canvas.clone();
    Coordinator::start(options, move |_| canvas, loader)
}

/// Join command values into newline-terminated input.
pub fn lines(values: &[serde_json::Value]) -> Vec<u8> {
    let mut out = String::new();
    for value in values {
        out.push_str(&value.to_string());
        out.push('\n');
    }
    out.into_bytes()
}
