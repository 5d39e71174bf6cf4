/*!
 * Progress reporting sinks.
 *
 * The pipeline writes free-text progress lines ("Translating incident reports
 * for [es]", "Stored 2 new reports to [es]", ...) to a `Reporter`. Reporting is
 * fire-and-forget: a sink never fails the run.
 */

use log::info;
use parking_lot::Mutex;

/// Sink for progress lines
pub trait Reporter: Send + Sync {
    /// Record one progress line
    fn log(&self, line: &str);
}

/// Forwards every line to the `log` facade at info level
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn log(&self, line: &str) {
        info!("{}", line);
    }
}

/// Keeps every line in memory
#[derive(Debug, Default)]
pub struct MemoryReporter {
    lines: Mutex<Vec<String>>,
}

impl MemoryReporter {
    /// Create an empty reporter
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines recorded so far, in arrival order
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Whether any recorded line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.lock().iter().any(|line| line.contains(needle))
    }
}

impl Reporter for MemoryReporter {
    fn log(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}
