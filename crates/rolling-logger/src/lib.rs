//! Rolling Logger
//!
//! `tracing` setup for chip-order: a compact stderr layer plus an optional
//! bounded ring that keeps the most recent formatted lines in memory.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::{SubscriberInitExt as _, TryInitError};
use tracing_subscriber::EnvFilter;

/// Default number of lines kept by [`LogRing::default`]
pub const DEFAULT_CAPACITY: usize = 256;

/// Local wall-clock timestamps via chrono
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%H:%M:%S%.3f"))
    }
}

/// Circular buffer of formatted log lines
///
/// Cloning shares the same buffer, so one handle can be given to the
/// subscriber and another kept for reading.
#[derive(Debug, Clone)]
pub struct LogRing {
    lines: Arc<Mutex<VecDeque<String>>>,
    capacity: usize,
}

impl LogRing {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a line, evicting the oldest one when full
    pub fn push(&self, line: impl Into<String>) {
        let mut lines = self.lock();
        if lines.len() == self.capacity {
            lines.pop_front();
        }
        lines.push_back(line.into());
    }

    /// Snapshot of the retained lines, oldest first
    pub fn lines(&self) -> Vec<String> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<String>> {
        // A panic while holding the lock cannot leave the deque half-updated.
        self.lines.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for LogRing {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Writer handed out per event; lines are committed to the ring on drop
pub struct RingWriter {
    ring: LogRing,
    buf: Vec<u8>,
}

impl io::Write for RingWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.commit();
        Ok(())
    }
}

impl RingWriter {
    /// Move buffered lines into the ring
    fn commit(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let text = String::from_utf8_lossy(&self.buf).into_owned();
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            self.ring.push(line);
        }
        self.buf.clear();
    }
}

impl Drop for RingWriter {
    fn drop(&mut self) {
        self.commit();
    }
}

impl<'a> MakeWriter<'a> for LogRing {
    type Writer = RingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        RingWriter {
            ring: self.clone(),
            buf: Vec::new(),
        }
    }
}

/// Logging options
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Use `debug` instead of `info` when `RUST_LOG` is not set
    pub verbose: bool,
    /// Also copy every line into this ring
    pub ring: Option<LogRing>,
}

fn build_env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    })
}

/// Install the global subscriber
///
/// Fails if a global subscriber is already set.
pub fn init(config: LogConfig) -> Result<(), TryInitError> {
    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_timer(LocalTime)
        .compact();

    let ring_layer = config.ring.map(|ring| {
        fmt::layer()
            .with_writer(ring)
            .with_ansi(false)
            .with_timer(LocalTime)
            .compact()
    });

    tracing_subscriber::registry()
        .with(build_env_filter(config.verbose))
        .with(stderr_layer)
        .with(ring_layer)
        .try_init()
}
