//! Cooperative stop flag shared between the command loop and a controller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Stop flag observed by the command loop between input reads.
///
/// Cloning shares the same flag. Once set it stays set for the rest of the
/// run.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    flag: Arc<AtomicBool>,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the loop to stop at its next read boundary.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Set up the Ctrl+C / SIGTERM handler to trip `signal`.
///
/// This should be called once at program startup.
pub fn install_ctrlc_handler(signal: &CancelSignal) -> Result<(), ctrlc::Error> {
    let signal = signal.clone();
    ctrlc::set_handler(move || {
        signal.cancel();
    })
}
