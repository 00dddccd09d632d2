//! Diagnostic sink: a per-user append-only log file behind the `log` facade.
//!
//! The sink is installed once by the coordinator. If it cannot be opened or
//! installed the process keeps running with diagnostics suppressed.

use log::{LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

/// Errors raised while setting up the diagnostic sink.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("failed to open log file '{}': {source}", .path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("a global logger is already installed")]
    AlreadyInstalled,
}

/// Path of the log file for the invoking user, in the temp directory.
pub fn default_log_path() -> PathBuf {
    std::env::temp_dir().join(format!("termlayer_{}.log", current_user()))
}

fn current_user() -> String {
    for var in ["USER", "LOGNAME"] {
        if let Ok(name) = std::env::var(var) {
            if !name.is_empty() {
                return name;
            }
        }
    }
    #[cfg(unix)]
    {
        // SAFETY: getuid has no preconditions and cannot fail.
        let uid = unsafe { libc::getuid() };
        format!("uid{}", uid)
    }
    #[cfg(not(unix))]
    {
        "unknown".to_string()
    }
}

struct SinkState {
    file: Mutex<Option<File>>,
    level: LevelFilter,
}

impl SinkState {
    fn open(path: &Path, level: LevelFilter) -> Result<Self, SinkError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| SinkError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            file: Mutex::new(Some(file)),
            level,
        })
    }

    fn closed() -> Self {
        Self {
            file: Mutex::new(None),
            level: LevelFilter::Off,
        }
    }

    fn with_file(&self, f: impl FnOnce(&mut File)) {
        let mut guard = self
            .file
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(file) = guard.as_mut() {
            f(file);
        }
    }
}

/// The `log::Log` implementation registered with the facade.
struct FileLogger {
    state: Arc<SinkState>,
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.state.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!("{} [{}] {}\n", timestamp(), record.level(), record.args());
        let flush = record.level() <= log::Level::Info;
        self.state.with_file(|file| {
            if file.write_all(line.as_bytes()).is_ok() && flush {
                let _ = file.flush();
            }
        });
    }

    fn flush(&self) {
        self.state.with_file(|file| {
            let _ = file.flush();
        });
    }
}

fn timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:03}", now.as_secs(), now.subsec_millis())
}

/// Handle to the process-wide diagnostic sink, owned by the coordinator.
pub struct DiagnosticSink {
    state: Arc<SinkState>,
    path: Option<PathBuf>,
}

impl DiagnosticSink {
    /// Open `path` for appending and register it as the global logger.
    ///
    /// # Errors
    /// Fails if the file cannot be opened or a logger is already installed
    /// for this process.
    pub fn install(path: &Path, level: LevelFilter) -> Result<Self, SinkError> {
        let state = Arc::new(SinkState::open(path, level)?);
        log::set_boxed_logger(Box::new(FileLogger {
            state: Arc::clone(&state),
        }))
        .map_err(|_| SinkError::AlreadyInstalled)?;
        log::set_max_level(level);
        Ok(Self {
            state,
            path: Some(path.to_path_buf()),
        })
    }

    /// Install the sink, falling back to a disabled sink on failure.
    ///
    /// The failure is reported on stderr since there is nowhere else to put it.
    pub fn install_or_disabled(path: &Path, level: LevelFilter) -> Self {
        match Self::install(path, level) {
            Ok(sink) => sink,
            Err(e) => {
                eprintln!("Log init failed: {}", e);
                Self::disabled()
            }
        }
    }

    /// A sink that swallows everything.
    pub fn disabled() -> Self {
        Self {
            state: Arc::new(SinkState::closed()),
            path: None,
        }
    }

    /// Whether records currently reach a file.
    pub fn is_enabled(&self) -> bool {
        let guard = self
            .state
            .file
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn flush(&self) {
        self.state.with_file(|file| {
            let _ = file.flush();
        });
    }

    /// Flush and close the file. Records logged afterwards are dropped.
    /// Calling this more than once is harmless.
    pub fn close(&self) {
        let mut guard = self
            .state
            .file
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(mut file) = guard.take() {
            let _ = file.flush();
        }
    }
}
