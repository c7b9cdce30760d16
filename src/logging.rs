//! Logging setup for the command-line binary
//!
//! Library code only emits `tracing` events. The binary installs one
//! subscriber at startup: human-readable output on stderr, optionally teed
//! to a log file without ANSI colors.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Builds the event filter for a verbosity level
///
/// `RUST_LOG` is ignored so that the CLI flags stay authoritative.
pub fn build_filter(verbose: u8, quiet: bool) -> EnvFilter {
    if quiet {
        // Only show errors
        return EnvFilter::new("error");
    }

    match verbose {
        0 => EnvFilter::new("topic_harvest=info,warn"),
        1 => EnvFilter::new("topic_harvest=debug,info"),
        2 => EnvFilter::new("topic_harvest=trace,debug"),
        _ => EnvFilter::new("trace"),
    }
}

/// Append-only log file shared by every event
#[derive(Clone)]
struct LogFile(Arc<Mutex<BufWriter<File>>>);

impl LogFile {
    fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self(Arc::new(Mutex::new(BufWriter::new(file)))))
    }
}

impl Write for LogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).flush()
    }
}

/// Flushes the log file when dropped
///
/// Keep it alive for the whole of `main`.
#[must_use = "dropping the guard flushes and stops file logging"]
pub struct LogGuard {
    file: Option<LogFile>,
}

impl LogGuard {
    /// Returns true when events are also written to a file
    pub fn has_file(&self) -> bool {
        self.file.is_some()
    }
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        if let Some(file) = &mut self.file {
            let _ = file.flush();
        }
    }
}

/// Installs the global subscriber
///
/// # Arguments
///
/// * `verbose` - Verbosity count from `-v` flags
/// * `quiet` - Show errors only
/// * `log_path` - Optional file that receives a copy of every event
///
/// # Returns
///
/// * `Ok(LogGuard)` - Logging is active until the guard is dropped
/// * `Err(io::Error)` - The log file could not be opened, or a subscriber was already set
pub fn init_logging(verbose: u8, quiet: bool, log_path: Option<&Path>) -> io::Result<LogGuard> {
    let file = log_path.map(LogFile::open).transpose()?;

    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(io::stderr);

    let file_layer = file.clone().map(|file| {
        fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_writer(move || file.clone())
    });

    tracing_subscriber::registry()
        .with(build_filter(verbose, quiet))
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    Ok(LogGuard { file })
}
