//! Rolling Logger
//!
//! Installs a tracing subscriber that writes to stderr and to a size-bounded
//! set of log files under a directory, keeping the most recent lines in
//! memory for diagnostics. Records emitted through the `log` facade are
//! bridged into the same subscriber.

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use thiserror::Error;
use tracing_subscriber::fmt::{self, format::Writer, time::FormatTime, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Size after which the active file is rotated
pub const DEFAULT_MAX_BYTES: u64 = 5 * 1024 * 1024;
/// Rotated files kept next to the active one
pub const DEFAULT_MAX_FILES: usize = 3;
/// Lines kept in the in-memory ring
pub const RECENT_LINES: usize = 200;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("log file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("logger already initialized: {0}")]
    AlreadyInitialized(String),

    #[error("logger not initialized")]
    NotInitialized,
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub dir: PathBuf,
    pub app_name: String,
    pub max_bytes: u64,
    pub max_files: usize,
    /// Filter directives. `None` reads `RUST_LOG`, falling back to `info`.
    pub filter: Option<String>,
}

impl LoggerConfig {
    pub fn new(dir: impl Into<PathBuf>, app_name: &str) -> Self {
        Self {
            dir: dir.into(),
            app_name: app_name.to_string(),
            max_bytes: DEFAULT_MAX_BYTES,
            max_files: DEFAULT_MAX_FILES,
            filter: None,
        }
    }
}

struct RollingFile {
    path: PathBuf,
    file: File,
    written: u64,
    max_bytes: u64,
    max_files: usize,
}

impl RollingFile {
    fn open(config: &LoggerConfig) -> Result<Self, LoggerError> {
        fs::create_dir_all(&config.dir).map_err(|source| LoggerError::Io {
            path: config.dir.clone(),
            source,
        })?;

        let path = config.dir.join(format!("{}.log", config.app_name));
        let file = open_append(&path).map_err(|source| LoggerError::Io {
            path: path.clone(),
            source,
        })?;
        let written = file.metadata().map(|m| m.len()).unwrap_or(0);

        Ok(Self {
            path,
            file,
            written,
            max_bytes: config.max_bytes,
            max_files: config.max_files,
        })
    }

    fn write_record(&mut self, buf: &[u8]) -> io::Result<()> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        self.file.write_all(buf)?;
        self.written += buf.len() as u64;
        Ok(())
    }

    /// `<app>.log` becomes `<app>.log.1`, `.1` becomes `.2`, and the oldest is dropped.
    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        if self.max_files > 0 {
            let oldest = self.rotated_path(self.max_files);
            if oldest.exists() {
                fs::remove_file(&oldest)?;
            }
            for n in (1..self.max_files).rev() {
                let from = self.rotated_path(n);
                if from.exists() {
                    fs::rename(&from, self.rotated_path(n + 1))?;
                }
            }
            fs::rename(&self.path, self.rotated_path(1))?;
            self.file = open_append(&self.path)?;
        } else {
            self.file = File::create(&self.path)?;
        }

        self.written = 0;
        Ok(())
    }

    fn rotated_path(&self, n: usize) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(format!(".{}", n));
        PathBuf::from(name)
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

struct Inner {
    file: RollingFile,
    recent: VecDeque<String>,
    /// Unterminated tail of the last write
    pending: String,
}

impl Inner {
    fn remember(&mut self, buf: &[u8]) {
        self.pending.push_str(&String::from_utf8_lossy(buf));
        while let Some(end) = self.pending.find('\n') {
            let line: String = self.pending.drain(..=end).collect();
            if self.recent.len() == RECENT_LINES {
                self.recent.pop_front();
            }
            self.recent.push_back(line.trim_end_matches(['\n', '\r']).to_string());
        }
    }
}

/// Writer handed to the fmt layer. Cheap to clone; all clones share one file.
#[derive(Clone)]
pub struct RollingWriter {
    inner: Arc<Mutex<Inner>>,
}

impl RollingWriter {
    pub fn open(config: &LoggerConfig) -> Result<Self, LoggerError> {
        let file = RollingFile::open(config)?;
        Ok(Self {
            inner: Arc::new(Mutex::new(Inner {
                file,
                recent: VecDeque::with_capacity(RECENT_LINES),
                pending: String::new(),
            })),
        })
    }

    /// Active log file path
    pub fn path(&self) -> PathBuf {
        match self.inner.lock() {
            Ok(inner) => inner.file.path.clone(),
            Err(poisoned) => poisoned.into_inner().file.path.clone(),
        }
    }

    /// Most recent lines, oldest first.
    pub fn recent_lines(&self) -> Vec<String> {
        match self.inner.lock() {
            Ok(inner) => inner.recent.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().recent.iter().cloned().collect(),
        }
    }
}

impl Write for RollingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| io::Error::other("log writer poisoned"))?;

        inner.file.write_record(buf)?;
        inner.remember(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| io::Error::other("log writer poisoned"))?;
        inner.file.file.flush()
    }
}

impl<'a> MakeWriter<'a> for RollingWriter {
    type Writer = RollingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Local wall-clock timestamps, millisecond precision.
struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

static WRITER: OnceLock<RollingWriter> = OnceLock::new();

/// Initialize logging into `log_dir/<app_name>.log` with default limits.
pub fn init_logger(log_dir: impl Into<PathBuf>, app_name: &str) -> Result<(), LoggerError> {
    init_with(LoggerConfig::new(log_dir, app_name))
}

/// Initialize logging. Fails if a global subscriber is already installed.
pub fn init_with(config: LoggerConfig) -> Result<(), LoggerError> {
    let writer = RollingWriter::open(&config)?;

    let filter = match &config.filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_timer(LocalTime).with_writer(io::stderr))
        .with(
            fmt::layer()
                .with_timer(LocalTime)
                .with_ansi(false)
                .with_writer(writer.clone()),
        )
        .try_init()
        .map_err(|e| LoggerError::AlreadyInitialized(e.to_string()))?;

    let path = writer.path();
    // try_init above succeeds at most once per process
    let _ = WRITER.set(writer);
    tracing::info!(path = %path.display(), "rolling logger initialized");
    Ok(())
}

pub fn info(message: &str) -> Result<(), LoggerError> {
    ensure_initialized()?;
    tracing::info!("{}", message);
    Ok(())
}

pub fn error(message: &str) -> Result<(), LoggerError> {
    ensure_initialized()?;
    tracing::error!("{}", message);
    Ok(())
}

/// Most recent log lines, empty before initialization.
pub fn recent_lines() -> Vec<String> {
    WRITER.get().map(RollingWriter::recent_lines).unwrap_or_default()
}

fn ensure_initialized() -> Result<(), LoggerError> {
    WRITER.get().map(|_| ()).ok_or(LoggerError::NotInitialized)
}
