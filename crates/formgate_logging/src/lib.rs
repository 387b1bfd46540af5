//! Tracing setup for programs and test harnesses embedding formgate.

use anyhow::{anyhow, Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Once};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "formgate=info";
const HOME_ENV: &str = "FORMGATE_HOME";
const MAX_LOG_FILES: usize = 5;
const MAX_LOG_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// What [`init_logging`] installs.
#[derive(Debug, Clone)]
pub struct LogConfig<'a> {
    /// Base name of the log file.
    pub app_name: &'a str,
    /// Show engine debug output on stderr even when `RUST_LOG` is unset.
    pub verbose: bool,
    /// Also write to `<home>/logs/<app_name>.log`, rotated by size.
    pub log_to_file: bool,
}

/// Install the global subscriber: stderr output plus an optional log file.
///
/// `RUST_LOG` overrides the default `formgate=info` filter.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let default_filter = if config.verbose {
        "formgate=debug"
    } else {
        DEFAULT_LOG_FILTER
    };
    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
    };

    let file_layer = if config.log_to_file {
        let dir = ensure_logs_dir()?;
        let writer = SharedLogWriter::open(&dir, config.app_name)?;
        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(filter()),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_filter(filter()),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;
    Ok(())
}

/// Route engine logs to the test harness output. Safe to call from every test.
pub fn init_test_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("formgate=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// `$FORMGATE_HOME`, else `~/.formgate`.
pub fn formgate_home() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(HOME_ENV) {
        return Ok(PathBuf::from(path));
    }
    dirs::home_dir()
        .map(|home| home.join(".formgate"))
        .ok_or_else(|| anyhow!("Could not determine home directory; set {}", HOME_ENV))
}

pub fn logs_dir() -> Result<PathBuf> {
    Ok(formgate_home()?.join("logs"))
}

pub fn ensure_logs_dir() -> Result<PathBuf> {
    let logs = logs_dir()?;
    fs::create_dir_all(&logs)
        .with_context(|| format!("Failed to create logs directory: {}", logs.display()))?;
    Ok(logs)
}

/// Append-only log file that moves itself to `<name>.log.1` (shifting older
/// files up to `max_files - 1`) once it would grow past `max_size`.
struct RotatingFile {
    dir: PathBuf,
    name: String,
    max_files: usize,
    max_size: u64,
    file: Option<File>,
    size: u64,
}

impl RotatingFile {
    fn open(dir: &Path, app_name: &str, max_files: usize, max_size: u64) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let mut log = Self {
            dir: dir.to_path_buf(),
            name: file_stem(app_name),
            max_files: max_files.max(1),
            max_size,
            file: None,
            size: 0,
        };
        log.reopen()?;
        if log.size > log.max_size {
            log.rotate()?;
        }
        Ok(log)
    }

    fn path(&self, generation: usize) -> PathBuf {
        match generation {
            0 => self.dir.join(format!("{}.log", self.name)),
            n => self.dir.join(format!("{}.log.{}", self.name, n)),
        }
    }

    fn reopen(&mut self) -> io::Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path(0))?;
        self.size = file.metadata()?.len();
        self.file = Some(file);
        Ok(())
    }

    fn rotate(&mut self) -> io::Result<()> {
        if let Some(mut file) = self.file.take() {
            let _ = file.flush();
        }
        let oldest = self.max_files - 1;
        if oldest > 0 {
            let _ = fs::remove_file(self.path(oldest));
            for generation in (0..oldest).rev() {
                let from = self.path(generation);
                if from.exists() {
                    fs::rename(&from, self.path(generation + 1))?;
                }
            }
        } else {
            let _ = fs::remove_file(self.path(0));
        }
        self.reopen()
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.size > 0 && self.size + buf.len() as u64 > self.max_size {
            self.rotate()?;
        }
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "log file unavailable"))?;
        let written = file.write(buf)?;
        self.size += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

#[derive(Clone)]
struct SharedLogWriter(Arc<Mutex<RotatingFile>>);

impl SharedLogWriter {
    fn open(dir: &Path, app_name: &str) -> Result<Self> {
        let file = RotatingFile::open(dir, app_name, MAX_LOG_FILES, MAX_LOG_FILE_SIZE)
            .with_context(|| format!("Failed to open log file for {}", app_name))?;
        Ok(Self(Arc::new(Mutex::new(file))))
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SharedLogWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

impl Write for SharedLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?
            .write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?
            .flush()
    }
}

fn file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' { ch } else { '_' })
        .collect();
    if stem.is_empty() {
        "formgate".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("my app/v1"), "my_app_v1");
        assert_eq!(file_stem(""), "formgate");
    }

    #[test]
    fn test_rotation_keeps_bounded_generations() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = RotatingFile::open(dir.path(), "app", 3, 8).unwrap();
        for _ in 0..5 {
            log.write_all(b"12345678").unwrap();
        }
        log.flush().unwrap();

        assert!(dir.path().join("app.log").exists());
        assert!(dir.path().join("app.log.1").exists());
        assert!(dir.path().join("app.log.2").exists());
        assert!(!dir.path().join("app.log.3").exists());
        assert_eq!(fs::read(dir.path().join("app.log")).unwrap(), b"12345678");
    }

    #[test]
    fn test_single_generation_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = RotatingFile::open(dir.path(), "one", 1, 4).unwrap();
        log.write_all(b"abcd").unwrap();
        log.write_all(b"efgh").unwrap();
        log.flush().unwrap();
        assert_eq!(fs::read(dir.path().join("one.log")).unwrap(), b"efgh");
        assert!(!dir.path().join("one.log.1").exists());
    }

    #[test]
    fn test_init_test_logging_is_idempotent() {
        init_test_logging();
        init_test_logging();
        tracing::debug!("still fine");
    }
}
