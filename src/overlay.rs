//! The single overlay slot and its two transitions.

use crate::canvas::Canvas;
use crate::geometry::Placement;
use crate::loader::ImageHandle;

/// The image currently on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveImage {
    pub placement: Placement,
    pub image: ImageHandle,
}

/// Zero or one active image plus the canvas it is drawn on.
///
/// Only the command loop mutates an `Overlay`, through [`Overlay::apply_add`]
/// and [`Overlay::apply_remove`]. Canvas errors are logged and never
/// propagate.
pub struct Overlay<C: Canvas> {
    canvas: C,
    active: Option<ActiveImage>,
}

impl<C: Canvas> Overlay<C> {
    /// An empty overlay drawing on `canvas`.
    pub fn new(canvas: C) -> Self {
        Self {
            canvas,
            active: None,
        }
    }

    pub fn active(&self) -> Option<&ActiveImage> {
        self.active.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_none()
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    /// Show `image` at `placement`, replacing whatever is on screen.
    ///
    /// A previously active image is cleared before the new one is drawn.
    /// `None` means the image could not be loaded: a warning is logged and
    /// the overlay, including any image already on screen, is left as it
    /// was. Returns whether a new image became active.
    pub fn apply_add(&mut self, placement: Placement, image: Option<ImageHandle>) -> bool {
        let Some(image) = image else {
            log::warn!("Unable to load image file.");
            return false;
        };

        if self.active.take().is_some() {
            if let Err(e) = self.canvas.clear() {
                log::warn!("Failed to clear previous image: {}", e);
            }
        }

        self.canvas.init(&placement);
        if let Err(e) = self.canvas.draw(&image) {
            log::warn!("Failed to draw image: {}", e);
        }
        self.active = Some(ActiveImage { placement, image });
        true
    }

    /// Remove the active image. Without one this does nothing at all.
    pub fn apply_remove(&mut self) {
        if self.active.take().is_none() {
            return;
        }
        log::info!("Removing image.");
        if let Err(e) = self.canvas.clear() {
            log::warn!("Failed to clear image: {}", e);
        }
    }

    /// Shutdown path: forget the active image and clear the canvas
    /// unconditionally.
    pub fn clear_all(&mut self) {
        self.active = None;
        if let Err(e) = self.canvas.clear() {
            log::warn!("Failed to clear canvas on shutdown: {}", e);
        }
    }
}
